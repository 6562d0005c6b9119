//! Variable and formula names
//!
//! Names are case-normalized on entry: `basic_pay` and ` BASIC_PAY ` both
//! become `BASIC_PAY`. After normalization a name must match
//! `[A-Z_][A-Z0-9_]*`.

use crate::error::{Error, Result};
use lazy_regex::regex_is_match;
use std::borrow::Borrow;
use std::fmt;

/// A validated, upper-case name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Identifier(String);

impl Identifier {
    /// Normalize and validate a name
    pub fn new(raw: &str) -> Result<Self> {
        let name = raw.trim().to_uppercase();
        if Self::is_valid(&name) {
            Ok(Self(name))
        } else {
            Err(Error::InvalidIdentifier(raw.trim().to_string()))
        }
    }

    /// Check a name that is already upper-case
    pub fn is_valid(name: &str) -> bool {
        regex_is_match!(r"^[A-Z_][A-Z0-9_]*$", name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}
