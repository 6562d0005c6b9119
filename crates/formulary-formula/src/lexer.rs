//! Expression tokenizer
//!
//! Turns expression text into tokens. The plain numeric form accepted by
//! [`tokenize`] only knows numbers, `+ - * /` and parentheses. The
//! symbolic form ([`lex`] with a wider [`Syntax`]) also recognizes
//! variable identifiers and `{{#name}}` placeholders, which callers then
//! [`bind`] to numbers before evaluation. Binding at the token level means
//! a value is never spliced back into text, so negative values and names
//! that prefix other names need no special care.

use crate::error::{FormulaError, FormulaResult};
use crate::placeholder::placeholder_spans;
use lazy_regex::regex_is_match;
use std::fmt;
use std::ops::Range;

/// Numeric token, as consumed by the evaluator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
}

impl Token {
    /// Binding power of an operator; 0 for anything else
    pub fn precedence(&self) -> u8 {
        match self {
            Token::Star | Token::Slash => 2,
            Token::Plus | Token::Minus => 1,
            _ => 0,
        }
    }

    pub fn is_operator(&self) -> bool {
        self.precedence() > 0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => f.write_str(&format_number(*n)),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
        }
    }
}

/// Format a number the way expressions show it: whole values without `.0`
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Token or unbound symbol produced by [`lex`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lexeme<'a> {
    Token(Token),
    /// Upper-case identifier naming a variable
    Variable(&'a str),
    /// Name inside a `{{#name}}` placeholder
    Placeholder(&'a str),
}

impl fmt::Display for Lexeme<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lexeme::Token(token) => token.fmt(f),
            Lexeme::Variable(name) => f.write_str(name),
            Lexeme::Placeholder(name) => write!(f, "{{{{#{}}}}}", name),
        }
    }
}

/// Which symbols the lexer accepts besides numeric tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Syntax {
    pub variables: bool,
    pub placeholders: bool,
}

impl Syntax {
    /// Numbers, operators and parentheses only
    pub const NUMERIC: Syntax = Syntax {
        variables: false,
        placeholders: false,
    };
    /// Dynamic variable expressions: identifiers allowed
    pub const VARIABLES: Syntax = Syntax {
        variables: true,
        placeholders: false,
    };
    /// Formula expressions: identifiers and placeholders allowed
    pub const FORMULA: Syntax = Syntax {
        variables: true,
        placeholders: true,
    };

    fn allows(&self, c: char) -> bool {
        matches!(c, '0'..='9' | '+' | '-' | '*' | '/' | '(' | ')' | '.')
            || is_separator(c)
            || (self.variables && matches!(c, 'A'..='Z' | '_'))
    }
}

/// Tokenize a numeric-only expression
///
/// # Example
/// ```rust
/// use formulary_formula::lexer::{tokenize, Token};
///
/// let tokens = tokenize("(1 + 2.5) * 4").unwrap();
/// assert_eq!(tokens[0], Token::LeftParen);
/// assert_eq!(tokens[3], Token::Number(2.5));
/// assert!(tokenize("1 + a").is_err());
/// ```
pub fn tokenize(input: &str) -> FormulaResult<Vec<Token>> {
    let lexemes = lex(input, Syntax::NUMERIC)?;
    bind(&lexemes, |symbol| {
        Err(FormulaError::MalformedExpression(format!(
            "unexpected symbol '{}'",
            symbol
        )))
    })
}

/// Split an expression into lexemes
///
/// The whole input is checked against the allowed alphabet before any
/// lexeme is produced, so an illegal character anywhere fails the call
/// without partial output. This check also runs before any symbol is
/// bound: in `"UNKNOWN + a"` the error is `InvalidCharacter('a')`, not
/// `UndefinedVariable("UNKNOWN")`.
pub fn lex(input: &str, syntax: Syntax) -> FormulaResult<Vec<Lexeme<'_>>> {
    let placeholders: Vec<(Range<usize>, &str)> = if syntax.placeholders {
        placeholder_spans(input).collect()
    } else {
        Vec::new()
    };

    check_alphabet(input, syntax, &placeholders)?;

    Lexer {
        input,
        pos: 0,
        syntax,
        placeholders,
        next_placeholder: 0,
    }
    .run()
}

/// Replace every symbol with the number `value_of` returns for it
///
/// Symbols are visited left to right; the first failure is returned.
pub fn bind<'a, F>(lexemes: &[Lexeme<'a>], mut value_of: F) -> FormulaResult<Vec<Token>>
where
    F: FnMut(&Lexeme<'a>) -> FormulaResult<f64>,
{
    lexemes
        .iter()
        .map(|lexeme| match lexeme {
            Lexeme::Token(token) => Ok(*token),
            symbol => value_of(symbol).map(Token::Number),
        })
        .collect()
}

/// Render tokens back into expression text, for display
pub fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Space and tab separate tokens; any other whitespace is invalid
fn is_separator(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn check_alphabet(
    input: &str,
    syntax: Syntax,
    placeholders: &[(Range<usize>, &str)],
) -> FormulaResult<()> {
    let mut spans = placeholders.iter().map(|(range, _)| range).peekable();

    for (position, (offset, c)) in input.char_indices().enumerate() {
        while spans.peek().map_or(false, |range| range.end <= offset) {
            spans.next();
        }
        if spans.peek().map_or(false, |range| range.contains(&offset)) {
            continue;
        }
        if !syntax.allows(c) {
            return Err(FormulaError::InvalidCharacter {
                character: c,
                position,
            });
        }
    }

    Ok(())
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    syntax: Syntax,
    placeholders: Vec<(Range<usize>, &'a str)>,
    next_placeholder: usize,
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> FormulaResult<Vec<Lexeme<'a>>> {
        let mut lexemes = Vec::new();

        loop {
            self.skip_whitespace();
            let Some(c) = self.peek_char() else {
                break;
            };

            if let Some(name) = self.take_placeholder() {
                lexemes.push(Lexeme::Placeholder(name));
                continue;
            }

            let lexeme = match c {
                '+' => self.single(Token::Plus),
                '-' => self.single(Token::Minus),
                '*' => self.single(Token::Star),
                '/' => self.single(Token::Slash),
                '(' => self.single(Token::LeftParen),
                ')' => self.single(Token::RightParen),
                '0'..='9' | '.' => self.scan_number()?,
                'A'..='Z' | '_' if self.syntax.variables => self.scan_identifier(),
                other => return Err(self.invalid(other)),
            };
            lexemes.push(lexeme);
        }

        Ok(lexemes)
    }

    // === Scanning ===

    fn single(&mut self, token: Token) -> Lexeme<'a> {
        self.advance();
        Lexeme::Token(token)
    }

    fn take_placeholder(&mut self) -> Option<&'a str> {
        let (range, name) = self.placeholders.get(self.next_placeholder)?;
        if range.start != self.pos {
            return None;
        }
        self.pos = range.end;
        self.next_placeholder += 1;
        Some(*name)
    }

    fn scan_number(&mut self) -> FormulaResult<Lexeme<'a>> {
        let start = self.pos;
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_digit() || c == '.')
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];
        if !regex_is_match!(r"^\d+(\.\d+)?$", text) {
            return Err(FormulaError::MalformedExpression(format!(
                "invalid number '{}'",
                text
            )));
        }

        // "2ABC" is neither a number nor an identifier
        if let Some(c) = self
            .peek_char()
            .filter(|c| c.is_ascii_alphabetic() || *c == '_')
        {
            return Err(self.invalid(c));
        }

        text.parse::<f64>()
            .map(|n| Lexeme::Token(Token::Number(n)))
            .map_err(|_| FormulaError::MalformedExpression(format!("invalid number '{}'", text)))
    }

    fn scan_identifier(&mut self) -> Lexeme<'a> {
        let start = self.pos;
        while self
            .peek_char()
            .map_or(false, |c| matches!(c, 'A'..='Z' | '0'..='9' | '_'))
        {
            self.advance();
        }
        Lexeme::Variable(&self.input[start..self.pos])
    }

    // === Helper methods ===

    fn invalid(&self, character: char) -> FormulaError {
        FormulaError::InvalidCharacter {
            character,
            position: self.input[..self.pos].chars().count(),
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, is_separator) {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tokenize_numbers_and_operators() {
        assert_eq!(
            tokenize("12.5+3 * (4-1)/2").unwrap(),
            vec![
                Token::Number(12.5),
                Token::Plus,
                Token::Number(3.0),
                Token::Star,
                Token::LeftParen,
                Token::Number(4.0),
                Token::Minus,
                Token::Number(1.0),
                Token::RightParen,
                Token::Slash,
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn test_whitespace_only_separates() {
        assert_eq!(
            tokenize(" 1\t2 ").unwrap(),
            vec![Token::Number(1.0), Token::Number(2.0)]
        );
        assert_eq!(tokenize("   ").unwrap(), vec![]);
    }

    #[test]
    fn test_only_space_and_tab_separate() {
        assert_eq!(
            tokenize("1\n+2"),
            Err(FormulaError::InvalidCharacter {
                character: '\n',
                position: 1
            })
        );
        assert!(matches!(
            tokenize("1\r+2"),
            Err(FormulaError::InvalidCharacter { character: '\r', .. })
        ));
        assert!(matches!(
            lex("A\u{c}+ B", Syntax::VARIABLES),
            Err(FormulaError::InvalidCharacter { character: '\u{c}', .. })
        ));
        // Placeholder interiors follow the placeholder grammar instead
        assert_eq!(
            lex("{{\n#x\n}}", Syntax::FORMULA).unwrap(),
            vec![Lexeme::Placeholder("x")]
        );
    }

    #[test]
    fn test_number_display() {
        assert_eq!(format_number(13300.0), "13300");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(Token::Number(-1.5).to_string(), "-1.5");
    }

    #[test]
    fn test_invalid_character_wins_over_undefined_identifier() {
        let lexemes = lex("UNKNOWN + 1", Syntax::VARIABLES).unwrap();
        assert_eq!(lexemes[0], Lexeme::Variable("UNKNOWN"));
        assert!(matches!(
            lex("UNKNOWN + a", Syntax::VARIABLES),
            Err(FormulaError::InvalidCharacter { character: 'a', .. })
        ));
    }

    #[test]
    fn test_minus_is_always_an_operator() {
        assert_eq!(
            tokenize("-5").unwrap(),
            vec![Token::Minus, Token::Number(5.0)]
        );
    }

    #[test]
    fn test_invalid_character_checked_up_front() {
        // The malformed number comes first, but the letter is reported
        assert_eq!(
            tokenize("1..2 + a"),
            Err(FormulaError::InvalidCharacter {
                character: 'a',
                position: 7
            })
        );
        assert!(matches!(
            tokenize("2^3"),
            Err(FormulaError::InvalidCharacter { character: '^', .. })
        ));
        assert!(matches!(
            tokenize("BASIC + 1"),
            Err(FormulaError::InvalidCharacter { character: 'B', .. })
        ));
    }

    #[test]
    fn test_malformed_numbers() {
        for input in ["5.", ".", ".5", "1.2.3"] {
            assert!(
                matches!(tokenize(input), Err(FormulaError::MalformedExpression(_))),
                "{input}"
            );
        }
    }

    #[test]
    fn test_lex_identifiers() {
        assert_eq!(
            lex("GROSS - PF_2", Syntax::VARIABLES).unwrap(),
            vec![
                Lexeme::Variable("GROSS"),
                Lexeme::Token(Token::Minus),
                Lexeme::Variable("PF_2"),
            ]
        );
    }

    #[test]
    fn test_lex_rejects_lowercase_and_glued_numbers() {
        assert!(matches!(
            lex("gross + 1", Syntax::VARIABLES),
            Err(FormulaError::InvalidCharacter { character: 'g', position: 0 })
        ));
        assert_eq!(
            lex("2ABC", Syntax::VARIABLES),
            Err(FormulaError::InvalidCharacter {
                character: 'A',
                position: 1
            })
        );
    }

    #[test]
    fn test_lex_placeholders() {
        let lexemes = lex("(GROSS / 30) * {{ #num_of_days }}", Syntax::FORMULA).unwrap();
        assert_eq!(lexemes.len(), 7);
        assert_eq!(lexemes[6], Lexeme::Placeholder("num_of_days"));

        // Placeholders are only recognized where the syntax allows them
        assert!(matches!(
            lex("A * {{#x}}", Syntax::VARIABLES),
            Err(FormulaError::InvalidCharacter { character: '{', .. })
        ));
        // A lone brace is never valid
        assert!(matches!(
            lex("A * {x}", Syntax::FORMULA),
            Err(FormulaError::InvalidCharacter { character: '{', .. })
        ));
    }

    #[test]
    fn test_bind_and_render() {
        let lexemes = lex("PAY + PAYROLL * {{#k}}", Syntax::FORMULA).unwrap();
        let tokens = bind(&lexemes, |symbol| match symbol {
            Lexeme::Variable("PAY") => Ok(1.0),
            Lexeme::Variable("PAYROLL") => Ok(2.5),
            Lexeme::Placeholder("k") => Ok(-3.0),
            other => Err(FormulaError::UndefinedVariable(other.to_string())),
        })
        .unwrap();
        assert_eq!(render(&tokens), "1 + 2.5 * -3");
    }

    #[test]
    fn test_bind_reports_first_failure() {
        let lexemes = lex("A + B", Syntax::VARIABLES).unwrap();
        let err = bind(&lexemes, |symbol| {
            Err(FormulaError::UndefinedVariable(symbol.to_string()))
        })
        .unwrap_err();
        assert_eq!(err, FormulaError::UndefinedVariable("A".into()));
    }
}
