//! Variable definitions
//!
//! A variable is either a literal number ([`Definition::Constant`]) or an
//! arithmetic expression over other variables ([`Definition::Dynamic`]).
//!
//! # Example
//!
//! ```rust
//! use formulary_core::{Definition, Variable, VariableKind};
//!
//! let basic = Variable::constant("BASIC", "10000").unwrap();
//! let gross = Variable::dynamic("gross", "BASIC + DA + HRA").unwrap();
//!
//! assert_eq!(gross.name.as_str(), "GROSS");
//! assert_eq!(basic.kind(), VariableKind::Constant);
//! assert!(matches!(gross.definition, Definition::Dynamic(_)));
//! ```

use crate::error::Result;
use crate::identifier::Identifier;
use lazy_regex::regex_is_match;
use std::fmt;

/// How a variable gets its value
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "kind", content = "expression", rename_all = "lowercase")
)]
pub enum Definition {
    /// Source text of a bare decimal literal, e.g. `"10000"` or `"-2.5"`
    Constant(String),
    /// Arithmetic expression over other variables, e.g. `"BASIC + DA"`
    Dynamic(String),
}

impl Definition {
    pub fn kind(&self) -> VariableKind {
        match self {
            Definition::Constant(_) => VariableKind::Constant,
            Definition::Dynamic(_) => VariableKind::Dynamic,
        }
    }

    /// The stored text, whichever the kind
    pub fn expression(&self) -> &str {
        match self {
            Definition::Constant(text) | Definition::Dynamic(text) => text,
        }
    }

    /// Same kind, new text
    pub fn with_expression(&self, expression: impl Into<String>) -> Self {
        match self {
            Definition::Constant(_) => Definition::Constant(expression.into()),
            Definition::Dynamic(_) => Definition::Dynamic(expression.into()),
        }
    }
}

/// Discriminant of [`Definition`], for display and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Constant,
    Dynamic,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableKind::Constant => f.pad("CONSTANT"),
            VariableKind::Dynamic => f.pad("DYNAMIC"),
        }
    }
}

/// A named variable
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    pub name: Identifier,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub definition: Definition,
}

impl Variable {
    pub fn new(name: Identifier, definition: Definition) -> Self {
        Self { name, definition }
    }

    /// Create a constant variable, normalizing the name
    pub fn constant(name: &str, value: impl Into<String>) -> Result<Self> {
        Ok(Self::new(Identifier::new(name)?, Definition::Constant(value.into())))
    }

    /// Create a dynamic variable, normalizing the name
    pub fn dynamic(name: &str, expression: impl Into<String>) -> Result<Self> {
        Ok(Self::new(
            Identifier::new(name)?,
            Definition::Dynamic(expression.into()),
        ))
    }

    pub fn kind(&self) -> VariableKind {
        self.definition.kind()
    }

    pub fn expression(&self) -> &str {
        self.definition.expression()
    }
}

/// Parse the text of a constant as a bare decimal literal
///
/// Accepts an optional sign, digits and at most one decimal point,
/// surrounded by optional whitespace. Exponents, hex, and empty text are
/// rejected, as are literals too large to be finite.
pub fn parse_constant(text: &str) -> Option<f64> {
    let text = text.trim();
    if !regex_is_match!(r"^[+-]?(\d+(\.\d*)?|\.\d+)$", text) {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_constant() {
        assert_eq!(parse_constant("10000"), Some(10000.0));
        assert_eq!(parse_constant(" -2.5 "), Some(-2.5));
        assert_eq!(parse_constant("+3"), Some(3.0));
        assert_eq!(parse_constant(".5"), Some(0.5));
        assert_eq!(parse_constant("7."), Some(7.0));
    }

    #[test]
    fn test_parse_constant_rejects_non_literals() {
        assert_eq!(parse_constant(""), None);
        assert_eq!(parse_constant("abc"), None);
        assert_eq!(parse_constant("1e3"), None);
        assert_eq!(parse_constant("0x10"), None);
        assert_eq!(parse_constant("1 + 2"), None);
        assert_eq!(parse_constant("1.2.3"), None);
        assert_eq!(parse_constant(&"9".repeat(400)), None);
    }

    #[test]
    fn test_definition_kind() {
        let v = Variable::dynamic("net", "GROSS - DEDUCTIONS").unwrap();
        assert_eq!(v.kind(), VariableKind::Dynamic);
        assert_eq!(v.expression(), "GROSS - DEDUCTIONS");
        assert_eq!(v.kind().to_string(), "DYNAMIC");

        let updated = v.definition.with_expression("GROSS");
        assert_eq!(updated, Definition::Dynamic("GROSS".into()));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_shape() {
        let v: Variable =
            serde_json::from_str(r#"{"name":"basic","kind":"constant","expression":"10000"}"#)
                .unwrap();
        assert_eq!(v, Variable::constant("BASIC", "10000").unwrap());

        let json = serde_json::to_value(Variable::dynamic("GROSS", "BASIC + DA").unwrap()).unwrap();
        assert_eq!(json["kind"], "dynamic");
        assert_eq!(json["expression"], "BASIC + DA");
        assert_eq!(json["name"], "GROSS");
    }
}
