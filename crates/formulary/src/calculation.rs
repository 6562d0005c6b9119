//! Formula evaluation
//!
//! Evaluates a formula against a set of variables and the contextual
//! values supplied for this call. The steps always run in this order:
//!
//! 1. every `{{#name}}` placeholder must have a contextual value
//! 2. all variables are resolved
//! 3. placeholders and variable identifiers are bound to numbers
//! 4. the numeric expression is evaluated
//!
//! Nothing is cached between calls.
//!
//! # Example
//!
//! ```rust
//! use formulary::prelude::*;
//! use formulary::ContextualValues;
//!
//! let mut catalog = Catalog::new();
//! catalog.add_variable(Variable::constant("GROSS", "15000").unwrap()).unwrap();
//! catalog
//!     .add_formula(Formula::new("MONTHLY_SALARY", "(GROSS / 30) * {{#num_of_days}}").unwrap())
//!     .unwrap();
//!
//! let mut context = ContextualValues::new();
//! context.insert("num_of_days".to_string(), 30.0);
//!
//! let result = catalog.evaluate_named("MONTHLY_SALARY", &context).unwrap();
//! assert_eq!(result.value, 15000.0);
//! assert_eq!(result.numeric_expression, "( 15000 / 30 ) * 30");
//! ```

use crate::{Catalog, Error, Formula, Result};
use formulary_formula::lexer::{bind, lex, render, Lexeme, Syntax};
use formulary_formula::{
    evaluate_tokens, extract_contextual_placeholders, resolve_variables, FormulaError,
    FormulaResult, ResolvedValues,
};
use formulary_core::Variable;
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Values for `{{#name}}` placeholders, supplied per evaluation
pub type ContextualValues = HashMap<String, f64>;

/// Outcome of a successful formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaEvaluation {
    /// The result
    pub value: f64,
    /// The expression after binding every symbol, e.g. `15000 - 1700`
    pub numeric_expression: String,
    /// Placeholder names the formula referenced
    pub placeholders: BTreeSet<String>,
}

/// Evaluate a formula expression to a number
pub fn evaluate_formula(
    expression: &str,
    variables: &[Variable],
    contextual: &ContextualValues,
) -> FormulaResult<f64> {
    evaluate_formula_detailed(expression, variables, contextual).map(|result| result.value)
}

/// Evaluate a formula expression, keeping the bound numeric expression
pub fn evaluate_formula_detailed(
    expression: &str,
    variables: &[Variable],
    contextual: &ContextualValues,
) -> FormulaResult<FormulaEvaluation> {
    let placeholders = extract_contextual_placeholders(expression);
    if let Some(missing) = placeholders.iter().find(|name| !contextual.contains_key(*name)) {
        return Err(FormulaError::MissingContextualValue(missing.clone()));
    }

    let resolved = resolve_variables(variables)?;

    let lexemes = lex(expression, Syntax::FORMULA)?;
    let tokens = bind(&lexemes, |symbol| bind_symbol(symbol, &resolved, contextual))?;
    let numeric_expression = render(&tokens);
    tracing::debug!(expression, numeric = %numeric_expression, "evaluating formula");

    let value = evaluate_tokens(&tokens)?;
    Ok(FormulaEvaluation {
        value,
        numeric_expression,
        placeholders,
    })
}

fn bind_symbol(
    symbol: &Lexeme<'_>,
    resolved: &ResolvedValues,
    contextual: &ContextualValues,
) -> FormulaResult<f64> {
    match *symbol {
        Lexeme::Placeholder(name) => contextual
            .get(name)
            .copied()
            .ok_or_else(|| FormulaError::MissingContextualValue(name.to_string())),
        Lexeme::Variable(name) => resolved
            .get(name)
            .ok_or_else(|| FormulaError::UndefinedVariable(name.to_string())),
        Lexeme::Token(token) => Err(FormulaError::MalformedExpression(format!(
            "unexpected token '{}'",
            token
        ))),
    }
}

/// Extension trait for Catalog to add evaluation and file I/O
pub trait CatalogExt {
    /// Load a catalog from a JSON definitions file
    fn open<P: AsRef<Path>>(path: P) -> Result<Catalog>;

    /// Write the catalog to a JSON definitions file
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Resolve every variable in the catalog
    fn resolve(&self) -> FormulaResult<ResolvedValues>;

    /// Evaluate an ad-hoc formula expression against the catalog's variables
    fn evaluate(&self, expression: &str, contextual: &ContextualValues) -> FormulaResult<f64>;

    /// Evaluate a stored formula by name
    fn evaluate_named(&self, name: &str, contextual: &ContextualValues)
        -> Result<FormulaEvaluation>;

    /// Placeholder names a stored formula needs values for
    fn placeholders(&self, name: &str) -> Result<BTreeSet<String>>;

    /// Check that a formula expression tokenizes and only references
    /// variables defined in the catalog
    fn validate_formula(&self, expression: &str) -> FormulaResult<()>;

    /// Validate a formula against the catalog, then add it
    fn add_checked_formula(&mut self, formula: Formula) -> Result<()>;
}

impl CatalogExt for Catalog {
    fn open<P: AsRef<Path>>(path: P) -> Result<Catalog> {
        let file = File::open(path.as_ref())?;
        let catalog: Catalog = serde_json::from_reader(BufReader::new(file))?;
        tracing::info!(
            path = %path.as_ref().display(),
            variables = catalog.variables().len(),
            formulas = catalog.formulas().len(),
            "loaded definitions"
        );
        Ok(catalog)
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        tracing::info!("Saved definitions to {}", path.as_ref().display());
        Ok(())
    }

    fn resolve(&self) -> FormulaResult<ResolvedValues> {
        resolve_variables(self.variables())
    }

    fn evaluate(&self, expression: &str, contextual: &ContextualValues) -> FormulaResult<f64> {
        evaluate_formula(expression, self.variables(), contextual)
    }

    fn evaluate_named(
        &self,
        name: &str,
        contextual: &ContextualValues,
    ) -> Result<FormulaEvaluation> {
        let formula = self
            .formula(name)
            .ok_or_else(|| Error::UnknownFormula(name.trim().to_uppercase()))?;
        let result = evaluate_formula_detailed(&formula.expression, self.variables(), contextual)?;
        tracing::debug!(formula = %formula.name, value = result.value, "formula evaluated");
        Ok(result)
    }

    fn placeholders(&self, name: &str) -> Result<BTreeSet<String>> {
        self.formula(name)
            .map(|formula| extract_contextual_placeholders(&formula.expression))
            .ok_or_else(|| Error::UnknownFormula(name.trim().to_uppercase()))
    }

    fn validate_formula(&self, expression: &str) -> FormulaResult<()> {
        for lexeme in lex(expression, Syntax::FORMULA)? {
            if let Lexeme::Variable(name) = lexeme {
                if self.variable(name).is_none() {
                    return Err(FormulaError::UndefinedVariable(name.to_string()));
                }
            }
        }
        Ok(())
    }

    fn add_checked_formula(&mut self, formula: Formula) -> Result<()> {
        self.validate_formula(&formula.expression)?;
        self.add_formula(formula)?;
        Ok(())
    }
}
