//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while tokenizing, evaluating or resolving
///
/// Every failure is terminal for the call that produced it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Character outside the accepted alphabet
    #[error("Invalid character '{character}' at position {position}")]
    InvalidCharacter { character: char, position: usize },

    /// Unbalanced `(` or `)`
    #[error("Mismatched parentheses")]
    MismatchedParentheses,

    /// Token sequence does not form an expression
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    /// Divisor evaluated to exactly zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Result overflowed to infinity
    #[error("Result is not a finite number")]
    NonFiniteResult,

    /// Identifier with no matching variable
    #[error("Variable {0} is not defined")]
    UndefinedVariable(String),

    /// Constant whose text is not a number
    #[error("Constant {0} has a non-numeric value")]
    NonNumericConstant(String),

    /// Variable that (transitively) depends on itself
    #[error("Circular dependency detected at {0}")]
    CircularDependency(String),

    /// `{{#name}}` placeholder with no supplied value
    #[error("Missing contextual value: {0}")]
    MissingContextualValue(String),

    /// Two variables share a name
    #[error("Variable {0} is defined more than once")]
    DuplicateVariable(String),

    /// Failure raised while resolving a dynamic variable
    #[error("In variable {variable}: {source}")]
    InVariable {
        variable: String,
        #[source]
        source: Box<FormulaError>,
    },
}

impl FormulaError {
    /// Attach the originating variable, unless one is already attached
    pub fn in_variable(self, variable: &str) -> Self {
        match self {
            tagged @ FormulaError::InVariable { .. } => tagged,
            other => FormulaError::InVariable {
                variable: variable.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost failure, with any variable context stripped
    pub fn root_cause(&self) -> &FormulaError {
        match self {
            FormulaError::InVariable { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The variable a resolution failure originated in, if any
    pub fn variable(&self) -> Option<&str> {
        match self {
            FormulaError::InVariable { variable, .. } => Some(variable),
            _ => None,
        }
    }
}
