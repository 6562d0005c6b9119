//! # formulary-core
//!
//! Core data structures for formulary.
//!
//! This crate provides the types shared by the rest of the workspace:
//! - [`Identifier`] - Validated, upper-case variable and formula names
//! - [`Variable`] and [`Definition`] - Constant or dynamic variables
//! - [`Formula`] - Named expressions evaluated on demand
//! - [`Catalog`] - In-memory store that validates definitions on entry
//!
//! ## Example
//!
//! ```rust
//! use formulary_core::{Catalog, Variable};
//!
//! let mut catalog = Catalog::new();
//! catalog.add_variable(Variable::constant("PF", "1200").unwrap()).unwrap();
//! catalog.add_variable(Variable::constant("TAX", "500").unwrap()).unwrap();
//! catalog.add_variable(Variable::dynamic("DEDUCTIONS", "PF + TAX").unwrap()).unwrap();
//!
//! assert_eq!(catalog.variables().len(), 3);
//! ```

pub mod catalog;
pub mod error;
pub mod formula;
pub mod identifier;
pub mod variable;

// Re-exports for convenience
pub use catalog::Catalog;
pub use error::{Error, Result};
pub use formula::Formula;
pub use identifier::Identifier;
pub use variable::{parse_constant, Definition, Variable, VariableKind};
