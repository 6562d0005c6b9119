//! Formula definitions

use crate::error::Result;
use crate::identifier::Identifier;

/// A named formula
///
/// The expression may reference variables by name and contextual values
/// as `{{#name}}` placeholders. A formula is never itself a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Formula {
    pub name: Identifier,
    pub expression: String,
}

impl Formula {
    /// Create a formula, normalizing the name
    pub fn new(name: &str, expression: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: Identifier::new(name)?,
            expression: expression.into(),
        })
    }
}
