//! Expression evaluator
//!
//! Shunting-yard conversion to Reverse Polish Notation followed by a
//! stack evaluation. All four operators are left-associative, so
//! `8/4/2` is `1`. The evaluator never sees identifiers; callers bind
//! every symbol to a number first.

use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{tokenize, Token};

/// Evaluate a numeric-only expression
///
/// # Example
/// ```rust
/// use formulary_formula::{evaluate_expression, FormulaError};
///
/// assert_eq!(evaluate_expression("2+3*4").unwrap(), 14.0);
/// assert_eq!(evaluate_expression("(2+3)*4").unwrap(), 20.0);
/// assert_eq!(evaluate_expression("5/0"), Err(FormulaError::DivisionByZero));
/// ```
pub fn evaluate_expression(expression: &str) -> FormulaResult<f64> {
    let tokens = tokenize(expression)?;
    evaluate_tokens(&tokens)
}

/// Evaluate an infix token sequence
pub fn evaluate_tokens(tokens: &[Token]) -> FormulaResult<f64> {
    let rpn = to_rpn(tokens)?;
    evaluate_rpn(&rpn)
}

/// Convert infix tokens to RPN (shunting-yard)
///
/// Parentheses are consumed; the output holds only numbers and operators.
pub fn to_rpn(tokens: &[Token]) -> FormulaResult<Vec<Token>> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut operators: Vec<Token> = Vec::new();

    for &token in tokens {
        match token {
            Token::Number(_) => output.push(token),
            Token::Plus | Token::Minus | Token::Star | Token::Slash => {
                // Pop while the stacked operator binds at least as tightly
                while let Some(&top) = operators.last() {
                    if !top.is_operator() || top.precedence() < token.precedence() {
                        break;
                    }
                    output.push(top);
                    operators.pop();
                }
                operators.push(token);
            }
            Token::LeftParen => operators.push(token),
            Token::RightParen => loop {
                match operators.pop() {
                    Some(Token::LeftParen) => break,
                    Some(op) => output.push(op),
                    None => return Err(FormulaError::MismatchedParentheses),
                }
            },
        }
    }

    while let Some(op) = operators.pop() {
        if matches!(op, Token::LeftParen | Token::RightParen) {
            return Err(FormulaError::MismatchedParentheses);
        }
        output.push(op);
    }

    Ok(output)
}

/// Evaluate RPN tokens on a single number stack
pub fn evaluate_rpn(rpn: &[Token]) -> FormulaResult<f64> {
    let mut stack: Vec<f64> = Vec::new();

    for &token in rpn {
        let (right, left) = match token {
            Token::Number(n) => {
                stack.push(n);
                continue;
            }
            Token::LeftParen | Token::RightParen => {
                return Err(FormulaError::MalformedExpression(format!(
                    "unexpected '{}' in RPN",
                    token
                )))
            }
            _ => match (stack.pop(), stack.pop()) {
                (Some(right), Some(left)) => (right, left),
                _ => {
                    return Err(FormulaError::MalformedExpression(format!(
                        "operator '{}' is missing an operand",
                        token
                    )))
                }
            },
        };

        let value = match token {
            Token::Plus => left + right,
            Token::Minus => left - right,
            Token::Star => left * right,
            Token::Slash => {
                if right == 0.0 {
                    return Err(FormulaError::DivisionByZero);
                }
                left / right
            }
            _ => unreachable!("non-operators are handled above"),
        };
        stack.push(value);
    }

    match stack.as_slice() {
        [value] if value.is_finite() => Ok(*value),
        [_] => Err(FormulaError::NonFiniteResult),
        [] => Err(FormulaError::MalformedExpression("empty expression".into())),
        values => Err(FormulaError::MalformedExpression(format!(
            "{} values left without an operator",
            values.len()
        ))),
    }
}
