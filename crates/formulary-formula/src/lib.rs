//! # formulary-formula
//!
//! Expression tokenizer, evaluator and variable resolver for formulary.
//!
//! This crate provides:
//! - Tokenizing (text → tokens, with optional identifiers and placeholders)
//! - Evaluation (tokens → RPN → number)
//! - Contextual placeholder extraction (`{{#name}}`)
//! - Variable resolution with cycle detection
//!
//! ## Example
//!
//! ```rust
//! use formulary_core::Variable;
//! use formulary_formula::{evaluate_expression, resolve_variables};
//!
//! assert_eq!(evaluate_expression("8/4/2").unwrap(), 1.0);
//!
//! let variables = vec![
//!     Variable::constant("A", "2").unwrap(),
//!     Variable::dynamic("B", "A * 21").unwrap(),
//! ];
//! assert_eq!(resolve_variables(&variables).unwrap().get("B"), Some(42.0));
//! ```

pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod placeholder;
pub mod resolver;

pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate_expression, evaluate_tokens};
pub use lexer::{format_number, Lexeme, Syntax, Token};
pub use placeholder::extract_contextual_placeholders;
pub use resolver::{dependencies_of, resolve_variables, ResolvedValues, Resolver};
