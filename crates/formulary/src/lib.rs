//! # formulary
//!
//! Named variables and formulas, evaluated to a single number.
//!
//! Variables are either constants (`BASIC = 10000`) or dynamic expressions
//! over other variables (`GROSS = BASIC + DA + HRA`). Formulas combine
//! variables with contextual values supplied at evaluation time through
//! `{{#name}}` placeholders.
//!
//! ## Features
//!
//! - Arithmetic with `+ - * /` and parentheses, left-associative
//! - Dependency resolution with cycle and undefined-reference detection
//! - Contextual placeholders bound per evaluation
//! - Validated in-memory catalog, loadable from JSON definitions files
//!
//! ## Example
//!
//! ```rust
//! use formulary::prelude::*;
//! use formulary::ContextualValues;
//!
//! let mut catalog = Catalog::new();
//! catalog.add_variable(Variable::constant("BASIC", "10000").unwrap()).unwrap();
//! catalog.add_variable(Variable::constant("PF", "1200").unwrap()).unwrap();
//! catalog.add_variable(Variable::dynamic("NET", "BASIC - PF").unwrap()).unwrap();
//!
//! let values = catalog.resolve().unwrap();
//! assert_eq!(values.get("NET"), Some(8800.0));
//!
//! let bonus = catalog
//!     .evaluate("NET * {{#rate}} / 100", &ContextualValues::from([("rate".to_string(), 10.0)]))
//!     .unwrap();
//! assert_eq!(bonus, 880.0);
//! ```

pub mod calculation;
pub mod error;
pub mod prelude;

// Re-export calculation types
pub use calculation::{
    evaluate_formula, evaluate_formula_detailed, CatalogExt, ContextualValues, FormulaEvaluation,
};
pub use error::{Error, Result};

// Re-export core types
pub use formulary_core::{
    parse_constant, Catalog, Definition, Formula, Identifier, Variable, VariableKind,
};

// Re-export formula types
pub use formulary_formula::{
    dependencies_of, evaluate_expression, extract_contextual_placeholders, format_number,
    resolve_variables, FormulaError, FormulaResult, ResolvedValues, Resolver,
};
