//! Prelude module - common imports for formulary users
//!
//! ```rust
//! use formulary::prelude::*;
//! ```

pub use crate::{
    // Main types
    Catalog,
    // Extension traits
    CatalogExt,
    Definition,
    // Error types
    Error,
    Formula,
    FormulaError,
    Identifier,
    Result,
    Variable,
    VariableKind,
};
