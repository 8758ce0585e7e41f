//! Coefficient expressions.
//!
//! Each coefficient is a numeric literal or an arithmetic expression in at
//! most one free variable (`x`, `K`, ...). Supported: numbers (with optional
//! exponent), one identifier, `+ - * /`, `^` or `**` with a non-negative
//! integer exponent, parentheses and implicit multiplication (`2x`).
//! Expressions evaluate to polynomials in the free variable.

use lti_core::Polynomial;

use crate::error::{StabilityError, StabilityResult};

/// Largest exponent accepted by `^`.
const MAX_POWER: u32 = 32;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

/// Parsed coefficient list.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedCoefficients {
    /// Polynomials in the free variable, highest `s` power first
    pub coeffs: Vec<Polynomial>,
    /// Name of the free variable, if any coefficient uses one
    pub variable: Option<String>,
}

impl ParsedCoefficients {
    pub fn is_symbolic(&self) -> bool {
        self.coeffs.iter().any(|c| c.degree() > 0)
    }
}

/// Parse every coefficient, sharing one free-variable slot across all of them.
///
/// # Errors
///
/// - `InvalidInput` for syntax errors or empty input
/// - `UnsupportedSymbolicExpression` for a second distinct variable or
///   division by a non-constant expression
pub fn parse_coefficients<S: AsRef<str>>(inputs: &[S]) -> StabilityResult<ParsedCoefficients> {
    if inputs.is_empty() {
        return Err(StabilityError::invalid("no coefficients supplied"));
    }
    let mut variable: Option<String> = None;
    let mut coeffs = Vec::with_capacity(inputs.len());
    for (i, text) in inputs.iter().enumerate() {
        let text = text.as_ref();
        let tokens = tokenize(text)
            .map_err(|e| StabilityError::invalid(format!("coefficient {i} ('{text}'): {e}")))?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            variable: &mut variable,
        };
        let poly = parser.parse_all().map_err(|e| match e {
            StabilityError::InvalidInput { what } => {
                StabilityError::invalid(format!("coefficient {i} ('{text}'): {what}"))
            }
            other => other,
        })?;
        coeffs.push(poly);
    }
    Ok(ParsedCoefficients { coeffs, variable })
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::Caret);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // exponent part, only when followed by digits
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let lexeme: String = chars[start..i].iter().collect();
                let value: f64 = lexeme
                    .parse()
                    .map_err(|_| format!("malformed number '{lexeme}'"))?;
                tokens.push(Token::Num(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }
    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    variable: &'a mut Option<String>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn parse_all(&mut self) -> StabilityResult<Polynomial> {
        let value = self.expr()?;
        if let Some(t) = self.peek() {
            return Err(StabilityError::invalid(format!("unexpected token {t:?}")));
        }
        Ok(value)
    }

    fn expr(&mut self) -> StabilityResult<Polynomial> {
        let mut acc = self.term()?;
        while let Some(t) = self.peek() {
            match t {
                Token::Plus => {
                    self.pos += 1;
                    acc = &acc + &self.term()?;
                }
                Token::Minus => {
                    self.pos += 1;
                    acc = &acc - &self.term()?;
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    fn term(&mut self) -> StabilityResult<Polynomial> {
        let mut acc = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    acc = &acc * &self.unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor.degree() > 0 {
                        return Err(StabilityError::unsupported(
                            "division by an expression in the free variable",
                        ));
                    }
                    if divisor.is_zero() {
                        return Err(StabilityError::invalid("division by zero"));
                    }
                    acc = acc.scale(1.0 / divisor.leading());
                }
                // implicit multiplication: 2x, 3(x + 1)
                Some(Token::Num(_)) | Some(Token::Ident(_)) | Some(Token::LParen) => {
                    acc = &acc * &self.power()?;
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    fn unary(&mut self) -> StabilityResult<Polynomial> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-&self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> StabilityResult<Polynomial> {
        let base = self.primary()?;
        if self.peek() != Some(&Token::Caret) {
            return Ok(base);
        }
        self.pos += 1;
        let exponent = self.unary()?;
        if exponent.degree() > 0 {
            return Err(StabilityError::unsupported(
                "exponent depends on the free variable",
            ));
        }
        let e = exponent.leading();
        if e < 0.0 || e.fract() != 0.0 || e > MAX_POWER as f64 {
            return Err(StabilityError::invalid(format!(
                "exponent must be an integer in 0..={MAX_POWER}"
            )));
        }
        let mut out = Polynomial::constant(1.0);
        for _ in 0..(e as u32) {
            out = &out * &base;
        }
        Ok(out)
    }

    fn primary(&mut self) -> StabilityResult<Polynomial> {
        match self.next() {
            Some(Token::Num(v)) => Ok(Polynomial::constant(v)),
            Some(Token::Ident(name)) => {
                match self.variable.as_deref() {
                    None => *self.variable = Some(name),
                    Some(existing) if existing == name => {}
                    Some(existing) => {
                        return Err(StabilityError::unsupported(format!(
                            "more than one free variable ('{existing}' and '{name}')"
                        )));
                    }
                }
                Ok(Polynomial::s())
            }
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(StabilityError::invalid("missing closing parenthesis")),
                }
            }
            Some(t) => Err(StabilityError::invalid(format!("unexpected token {t:?}"))),
            None => Err(StabilityError::invalid("unexpected end of expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_literals() {
        let p = parse_coefficients(&["1", "2.5", "-3", "1e-3"]).unwrap();
        assert!(!p.is_symbolic());
        assert_eq!(p.variable, None);
        assert_eq!(p.coeffs[1].coeffs(), &[2.5]);
        assert_eq!(p.coeffs[2].coeffs(), &[-3.0]);
        assert_eq!(p.coeffs[3].coeffs(), &[1e-3]);
    }

    #[test]
    fn expressions_in_one_variable() {
        let p = parse_coefficients(&["x", "2x + 1", "(x - 1)^2", "x**2/2", "3*(x+1)"]).unwrap();
        assert!(p.is_symbolic());
        assert_eq!(p.variable.as_deref(), Some("x"));
        assert_eq!(p.coeffs[0].coeffs(), &[1.0, 0.0]);
        assert_eq!(p.coeffs[1].coeffs(), &[2.0, 1.0]);
        assert_eq!(p.coeffs[2].coeffs(), &[1.0, -2.0, 1.0]);
        assert_eq!(p.coeffs[3].coeffs(), &[0.5, 0.0, 0.0]);
        assert_eq!(p.coeffs[4].coeffs(), &[3.0, 3.0]);
    }

    #[test]
    fn second_variable_is_unsupported() {
        let err = parse_coefficients(&["x", "y"]).unwrap_err();
        assert!(matches!(
            err,
            StabilityError::UnsupportedSymbolicExpression { .. }
        ));
        let err = parse_coefficients(&["1/x"]).unwrap_err();
        assert!(matches!(
            err,
            StabilityError::UnsupportedSymbolicExpression { .. }
        ));
    }

    #[test]
    fn syntax_errors_are_invalid_input() {
        for bad in ["", "1 +", "(x", "2 $ 3", "x^-1", "1/0"] {
            let err = parse_coefficients(&[bad]).unwrap_err();
            assert!(
                matches!(err, StabilityError::InvalidInput { .. }),
                "{bad}: {err:?}"
            );
        }
    }
}
