//! Variable resolution
//!
//! Turns a list of variable definitions into a flat name → number map.
//! Dynamic variables are resolved depth-first: every identifier in the
//! expression is resolved and bound to its value, left to right, before
//! the expression is evaluated. Results are memoized for the duration of
//! one pass, and a variable met again while it is still being resolved is
//! a circular dependency.
//!
//! The depth-first walk keeps its own stack of [`Frame`]s instead of
//! recursing, so dependency chains of any length resolve without growing
//! the thread stack.
//!
//! All bookkeeping lives in a [`Resolver`] owned by the caller, so
//! independent resolutions never share state.

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::evaluate_tokens;
use crate::lexer::{bind, lex, Lexeme, Syntax};
use ahash::{AHashMap, AHashSet};
use formulary_core::{parse_constant, Definition, Variable};
use std::collections::BTreeSet;

/// Resolved value of every variable, produced fresh per resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedValues {
    values: AHashMap<String, f64>,
}

impl ResolvedValues {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

/// Bookkeeping for one resolution pass
#[derive(Debug, Default)]
struct ResolutionState {
    /// Variables whose value is final
    finalized: AHashMap<String, f64>,
    /// Variables on the active dependency chain
    in_progress: AHashSet<String>,
}

/// A dynamic variable whose references are being bound
#[derive(Debug)]
struct Frame<'a> {
    name: &'a str,
    lexemes: Vec<Lexeme<'a>>,
    /// Index of the next lexeme to inspect
    cursor: usize,
    /// Values of the references seen so far, in source order
    bound: Vec<f64>,
}

impl<'a> Frame<'a> {
    /// Advance to the next identifier, if any remain
    fn next_reference(&mut self) -> Option<&'a str> {
        while let Some(&lexeme) = self.lexemes.get(self.cursor) {
            self.cursor += 1;
            if let Lexeme::Variable(name) = lexeme {
                return Some(name);
            }
        }
        None
    }

    /// Evaluate once every reference is bound
    fn evaluate(&self) -> FormulaResult<f64> {
        let mut values = self.bound.iter().copied();
        let tokens = bind(&self.lexemes, |symbol| {
            values.next().ok_or_else(|| {
                FormulaError::MalformedExpression(format!("unexpected symbol '{}'", symbol))
            })
        })?;
        evaluate_tokens(&tokens)
    }
}

/// Outcome of looking up one name
enum Step<'a> {
    /// Already final, or a constant
    Value(f64),
    /// Dynamic variable that now has to be walked
    Descend(Frame<'a>),
}

/// Resolver over an immutable snapshot of variable definitions
///
/// # Example
/// ```rust
/// use formulary_core::Variable;
/// use formulary_formula::Resolver;
///
/// let variables = vec![
///     Variable::constant("PF", "1200").unwrap(),
///     Variable::constant("TAX", "500").unwrap(),
///     Variable::dynamic("DEDUCTIONS", "PF + TAX").unwrap(),
/// ];
/// let mut resolver = Resolver::new(&variables).unwrap();
/// assert_eq!(resolver.resolve_one("DEDUCTIONS").unwrap(), 1700.0);
/// ```
#[derive(Debug)]
pub struct Resolver<'a> {
    /// Definitions in their original order
    variables: &'a [Variable],
    /// Name → definition
    definitions: AHashMap<&'a str, &'a Definition>,
    state: ResolutionState,
}

impl<'a> Resolver<'a> {
    /// Index the definitions, failing on the first duplicate name
    pub fn new(variables: &'a [Variable]) -> FormulaResult<Self> {
        let mut definitions = AHashMap::with_capacity(variables.len());
        for variable in variables {
            let name = variable.name.as_str();
            if definitions.insert(name, &variable.definition).is_some() {
                return Err(FormulaError::DuplicateVariable(name.to_string()));
            }
        }

        Ok(Self {
            variables,
            definitions,
            state: ResolutionState::default(),
        })
    }

    /// Resolve every variable
    pub fn resolve_all(mut self) -> FormulaResult<ResolvedValues> {
        tracing::debug!(variables = self.variables.len(), "resolving variables");

        for variable in self.variables {
            let name = variable.name.as_str();
            if !self.state.finalized.contains_key(name) {
                self.resolve(name)?;
            }
        }

        tracing::debug!(resolved = self.state.finalized.len(), "variables resolved");
        Ok(ResolvedValues {
            values: self.state.finalized,
        })
    }

    /// Resolve one variable and whatever it transitively references
    ///
    /// Values stay cached in this resolver, so later calls reuse them.
    pub fn resolve_one(&mut self, name: &str) -> FormulaResult<f64> {
        self.resolve(name)
    }

    fn resolve(&mut self, name: &str) -> FormulaResult<f64> {
        let root = match self.enter(name)? {
            Step::Value(value) => return Ok(value),
            Step::Descend(frame) => frame,
        };

        let mut stack = vec![root];
        let result = self.walk(&mut stack);
        // Whatever is left was abandoned by a failure
        for frame in &stack {
            self.state.in_progress.remove(frame.name);
        }
        result
    }

    /// Drive the depth-first walk until the bottom frame has a value
    ///
    /// A failure is tagged with the frame whose expression was being
    /// bound or evaluated; outer frames leave that tag alone.
    fn walk(&mut self, stack: &mut Vec<Frame<'a>>) -> FormulaResult<f64> {
        while let Some(frame) = stack.last_mut() {
            if let Some(reference) = frame.next_reference() {
                let owner = frame.name;
                match self.enter(reference).map_err(|err| err.in_variable(owner))? {
                    Step::Value(value) => frame.bound.push(value),
                    Step::Descend(child) => stack.push(child),
                }
                continue;
            }

            let name = frame.name;
            let value = frame.evaluate().map_err(|err| err.in_variable(name))?;
            stack.pop();
            self.state.in_progress.remove(name);
            self.finalize(name, value);

            match stack.last_mut() {
                Some(parent) => parent.bound.push(value),
                None => return Ok(value),
            }
        }

        Err(FormulaError::MalformedExpression(
            "nothing left to resolve".into(),
        ))
    }

    /// Look up a name, finishing it on the spot when no walk is needed
    fn enter(&mut self, name: &str) -> FormulaResult<Step<'a>> {
        if let Some(&value) = self.state.finalized.get(name) {
            return Ok(Step::Value(value));
        }
        let (&name, &definition) = self
            .definitions
            .get_key_value(name)
            .ok_or_else(|| FormulaError::UndefinedVariable(name.to_string()))?;
        if self.state.in_progress.contains(name) {
            return Err(FormulaError::CircularDependency(name.to_string()));
        }

        match definition {
            Definition::Constant(text) => {
                let value = parse_constant(text)
                    .ok_or_else(|| FormulaError::NonNumericConstant(name.to_string()))?;
                self.finalize(name, value);
                Ok(Step::Value(value))
            }
            Definition::Dynamic(expression) => {
                let lexemes =
                    lex(expression, Syntax::VARIABLES).map_err(|err| err.in_variable(name))?;
                self.state.in_progress.insert(name.to_string());
                Ok(Step::Descend(Frame {
                    name,
                    lexemes,
                    cursor: 0,
                    bound: Vec::new(),
                }))
            }
        }
    }

    fn finalize(&mut self, name: &str, value: f64) {
        tracing::trace!(variable = name, value, "resolved");
        self.state.finalized.insert(name.to_string(), value);
    }
}

/// Resolve a full set of variable definitions
///
/// # Example
/// ```rust
/// use formulary_core::Variable;
/// use formulary_formula::resolve_variables;
///
/// let variables = vec![
///     Variable::constant("BASIC", "10000").unwrap(),
///     Variable::dynamic("GROSS", "BASIC * 1.5").unwrap(),
/// ];
/// let values = resolve_variables(&variables).unwrap();
/// assert_eq!(values.get("GROSS"), Some(15000.0));
/// ```
pub fn resolve_variables(variables: &[Variable]) -> FormulaResult<ResolvedValues> {
    Resolver::new(variables)?.resolve_all()
}

/// Identifiers referenced by a dynamic expression, deduplicated
///
/// Fails if the expression cannot be tokenized.
pub fn dependencies_of(expression: &str) -> FormulaResult<BTreeSet<String>> {
    Ok(lex(expression, Syntax::VARIABLES)?
        .into_iter()
        .filter_map(|lexeme| match lexeme {
            Lexeme::Variable(name) => Some(name.to_string()),
            _ => None,
        })
        .collect())
}
