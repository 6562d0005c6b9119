//! In-memory store of variables and formulas
//!
//! The catalog validates definitions as they are added, the way a form
//! would before accepting input:
//! - names are normalized to upper case and must be unique
//! - constants must hold a numeric literal
//! - dynamic expressions and formula expressions must not be empty
//!
//! Whether a dynamic expression only references known variables is
//! checked later, during resolution. Variables and formulas live in
//! separate namespaces.
//!
//! # Example
//!
//! ```rust
//! use formulary_core::{Catalog, Formula, Variable};
//!
//! let mut catalog = Catalog::new();
//! catalog.add_variable(Variable::constant("BASIC", "10000")?)?;
//! catalog.add_variable(Variable::dynamic("GROSS", "BASIC * 2")?)?;
//! catalog.add_formula(Formula::new("net_salary", "GROSS - 100")?)?;
//!
//! assert!(catalog.variable("gross").is_some());
//! assert!(catalog.add_variable(Variable::constant("basic", "1")?).is_err());
//! # Ok::<(), formulary_core::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::formula::Formula;
use crate::variable::{parse_constant, Definition, Variable};

/// Ordered collection of variables and formulas
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "CatalogFile", into = "CatalogFile")
)]
pub struct Catalog {
    variables: Vec<Variable>,
    formulas: Vec<Formula>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize(name: &str) -> String {
        name.trim().to_uppercase()
    }

    fn validate_definition(name: &str, definition: &Definition) -> Result<()> {
        match definition {
            Definition::Constant(text) => {
                if parse_constant(text).is_none() {
                    return Err(Error::InvalidDefinition {
                        name: name.to_string(),
                        reason: "constant variables must have a numeric value",
                    });
                }
            }
            Definition::Dynamic(text) => {
                if text.trim().is_empty() {
                    return Err(Error::InvalidDefinition {
                        name: name.to_string(),
                        reason: "dynamic variables must have an expression",
                    });
                }
            }
        }
        Ok(())
    }

    // === Variables ===

    /// Add a new variable
    ///
    /// Returns an error if the name is taken or the definition is invalid.
    pub fn add_variable(&mut self, variable: Variable) -> Result<()> {
        if self.variable(variable.name.as_str()).is_some() {
            return Err(Error::DuplicateName(variable.name.to_string()));
        }
        Self::validate_definition(variable.name.as_str(), &variable.definition)?;

        let definition = variable
            .definition
            .with_expression(variable.expression().trim());
        self.variables.push(Variable::new(variable.name, definition));
        Ok(())
    }

    /// Replace the expression of an existing variable, keeping its kind
    pub fn update_variable(&mut self, name: &str, expression: &str) -> Result<()> {
        let key = Self::normalize(name);
        let variable = self
            .variables
            .iter_mut()
            .find(|v| v.name.as_str() == key)
            .ok_or(Error::NotFound(key))?;

        let definition = variable.definition.with_expression(expression.trim());
        Self::validate_definition(variable.name.as_str(), &definition)?;
        variable.definition = definition;
        Ok(())
    }

    /// Remove a variable, returning it if it existed
    pub fn remove_variable(&mut self, name: &str) -> Option<Variable> {
        let key = Self::normalize(name);
        let index = self.variables.iter().position(|v| v.name.as_str() == key)?;
        Some(self.variables.remove(index))
    }

    /// Look up a variable by name (case-insensitive)
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        let key = Self::normalize(name);
        self.variables.iter().find(|v| v.name.as_str() == key)
    }

    /// All variables in definition order
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    // === Formulas ===

    /// Add a new formula
    pub fn add_formula(&mut self, formula: Formula) -> Result<()> {
        if self.formula(formula.name.as_str()).is_some() {
            return Err(Error::DuplicateName(formula.name.to_string()));
        }
        if formula.expression.trim().is_empty() {
            return Err(Error::InvalidDefinition {
                name: formula.name.to_string(),
                reason: "formula expression is required",
            });
        }

        let expression = formula.expression.trim().to_string();
        self.formulas.push(Formula {
            name: formula.name,
            expression,
        });
        Ok(())
    }

    /// Remove a formula, returning it if it existed
    pub fn remove_formula(&mut self, name: &str) -> Option<Formula> {
        let key = Self::normalize(name);
        let index = self.formulas.iter().position(|f| f.name.as_str() == key)?;
        Some(self.formulas.remove(index))
    }

    /// Look up a formula by name (case-insensitive)
    pub fn formula(&self, name: &str) -> Option<&Formula> {
        let key = Self::normalize(name);
        self.formulas.iter().find(|f| f.name.as_str() == key)
    }

    /// All formulas in definition order
    pub fn formulas(&self) -> &[Formula] {
        &self.formulas
    }

    /// Check if the catalog holds neither variables nor formulas
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.formulas.is_empty()
    }
}

/// On-disk shape of a catalog
///
/// Deserializing goes through [`Catalog::add_variable`] and
/// [`Catalog::add_formula`], so a definitions file gets the same checks as
/// interactive input.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct CatalogFile {
    #[serde(default)]
    variables: Vec<Variable>,
    #[serde(default)]
    formulas: Vec<Formula>,
}

#[cfg(feature = "serde")]
impl TryFrom<CatalogFile> for Catalog {
    type Error = Error;

    fn try_from(file: CatalogFile) -> Result<Self> {
        let mut catalog = Catalog::new();
        for variable in file.variables {
            catalog.add_variable(variable)?;
        }
        for formula in file.formulas {
            catalog.add_formula(formula)?;
        }
        Ok(catalog)
    }
}

#[cfg(feature = "serde")]
impl From<Catalog> for CatalogFile {
    fn from(catalog: Catalog) -> Self {
        Self {
            variables: catalog.variables,
            formulas: catalog.formulas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .add_variable(Variable::constant("BASIC", "10000").unwrap())
            .unwrap();
        catalog
            .add_variable(Variable::dynamic("GROSS", " BASIC * 2 ").unwrap())
            .unwrap();
        catalog
    }

    #[test]
    fn test_add_and_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.variables().len(), 2);
        assert_eq!(catalog.variable("gross").unwrap().expression(), "BASIC * 2");
        assert!(catalog.variable("NET").is_none());
    }

    #[test]
    fn test_duplicate_names() {
        let mut catalog = catalog();
        assert_eq!(
            catalog.add_variable(Variable::constant("basic", "1").unwrap()),
            Err(Error::DuplicateName("BASIC".into()))
        );
    }

    #[test]
    fn test_constant_must_be_numeric() {
        let mut catalog = Catalog::new();
        let err = catalog
            .add_variable(Variable::constant("X", "abc").unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition { ref name, .. } if name == "X"));

        let err = catalog
            .add_variable(Variable::constant("Y", "  ").unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition { .. }));
    }

    #[test]
    fn test_dynamic_must_not_be_empty() {
        let mut catalog = Catalog::new();
        assert!(catalog
            .add_variable(Variable::dynamic("X", "").unwrap())
            .is_err());
    }

    #[test]
    fn test_update_keeps_kind() {
        let mut catalog = catalog();
        catalog.update_variable("basic", " 12000 ").unwrap();
        assert_eq!(
            catalog.variable("BASIC").unwrap().definition,
            Definition::Constant("12000".into())
        );

        assert!(catalog.update_variable("BASIC", "ten").is_err());
        assert_eq!(
            catalog.update_variable("MISSING", "1"),
            Err(Error::NotFound("MISSING".into()))
        );
    }

    #[test]
    fn test_remove() {
        let mut catalog = catalog();
        let removed = catalog.remove_variable("Basic").unwrap();
        assert_eq!(removed.name.as_str(), "BASIC");
        assert!(catalog.remove_variable("BASIC").is_none());
        assert_eq!(catalog.variables().len(), 1);
    }

    #[test]
    fn test_formulas() {
        let mut catalog = catalog();
        catalog
            .add_formula(Formula::new("NET", "GROSS - 1").unwrap())
            .unwrap();
        assert!(catalog
            .add_formula(Formula::new("net", "GROSS").unwrap())
            .is_err());
        assert!(catalog
            .add_formula(Formula::new("EMPTY", "   ").unwrap())
            .is_err());

        // Formula names do not clash with variable names
        catalog
            .add_formula(Formula::new("GROSS", "GROSS").unwrap())
            .unwrap();

        assert_eq!(catalog.formulas().len(), 2);
        assert!(catalog.remove_formula("net").is_some());
        assert!(catalog.formula("NET").is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates() {
        let json = r#"{
            "variables": [
                {"name": "basic", "kind": "constant", "expression": "100"},
                {"name": "basic", "kind": "constant", "expression": "200"}
            ]
        }"#;
        assert!(serde_json::from_str::<Catalog>(json).is_err());

        let json = r#"{"variables": [{"name": "A", "kind": "constant", "expression": "1"}]}"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.variables().len(), 1);
        assert!(catalog.formulas().is_empty());
    }
}
