//! Unit-aware arithmetic expressions.
//!
//! Users type lengths like `3.5m` or `=2ft+6in`. Evaluation happens in two
//! passes:
//!
//! 1. Every numeric token, with its optional unit suffix, is rewritten to a
//!    plain number in internal units (feet). Bare numbers are multiplied by
//!    the caller's default-unit scale.
//! 2. The resulting arithmetic is evaluated with `+ - * / ( )` and unary
//!    minus.
//!
//! ```
//! use sifter_convert::expr;
//!
//! assert_eq!(expr::evaluate("=2ft+6in", 1.0).unwrap(), 2.5);
//! assert_eq!(expr::evaluate("(1+2)*4", 1.0).unwrap(), 12.0);
//! ```

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::ExprError;
use crate::units::LengthUnit;

// `mm` must precede `m` so the longer suffix wins.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(-?\d+(?:\.\d+)?)(mm|cm|ft|in|m)?").expect("token pattern is valid")
});

/// Evaluates a unit expression to internal units.
///
/// A leading `=` is optional and stripped. `default_scale` converts bare
/// numbers to internal units (1.0 when the display unit is feet).
pub fn evaluate(input: &str, default_scale: f64) -> Result<f64, ExprError> {
    let rewritten = rewrite(input, default_scale)?;
    let mut parser = Parser::new(&rewritten);
    let value = parser.parse()?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ExprError::NotFinite)
    }
}

/// Rewrites every unit-bearing token to a plain number in internal units.
pub fn rewrite(input: &str, default_scale: f64) -> Result<String, ExprError> {
    let body = input.trim();
    let body = body.strip_prefix('=').unwrap_or(body).trim();
    if body.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut bad_number = None;
    let rewritten = TOKEN.replace_all(body, |caps: &Captures<'_>| {
        let literal = &caps[1];
        let Ok(number) = literal.parse::<f64>() else {
            bad_number.get_or_insert_with(|| literal.to_string());
            return String::new();
        };
        let scale = caps
            .get(2)
            .and_then(|m| LengthUnit::from_suffix(m.as_str()))
            .map(LengthUnit::feet_per_unit)
            .unwrap_or(default_scale);
        format!("{}", number * scale)
    });

    match bad_number {
        Some(literal) => Err(ExprError::InvalidNumber(literal)),
        None => Ok(rewritten.into_owned()),
    }
}

/// Recursive-descent evaluator over plain arithmetic.
///
/// ```text
/// expr   := term (('+' | '-') term)*
/// term   := factor (('*' | '/') factor)*
/// factor := ('-' | '+') factor | number | '(' expr ')'
/// ```
struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Parser { src, pos: 0 }
    }

    fn parse(&mut self) -> Result<f64, ExprError> {
        let value = self.expr()?;
        self.skip_ws();
        match self.peek() {
            None => Ok(value),
            Some(ch) => Err(ExprError::UnexpectedChar { ch, pos: self.pos }),
        }
    }

    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut acc = self.term()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('+') => {
                    self.bump();
                    acc += self.term()?;
                }
                Some('-') => {
                    self.bump();
                    acc -= self.term()?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn term(&mut self) -> Result<f64, ExprError> {
        let mut acc = self.factor()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('*') => {
                    self.bump();
                    acc *= self.factor()?;
                }
                Some('/') => {
                    self.bump();
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(ExprError::DivisionByZero);
                    }
                    acc /= divisor;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn factor(&mut self) -> Result<f64, ExprError> {
        self.skip_ws();
        match self.peek() {
            Some('-') => {
                self.bump();
                Ok(-self.factor()?)
            }
            Some('+') => {
                self.bump();
                self.factor()
            }
            Some('(') => {
                self.bump();
                let inner = self.expr()?;
                self.skip_ws();
                match self.peek() {
                    Some(')') => {
                        self.bump();
                        Ok(inner)
                    }
                    Some(ch) => Err(ExprError::UnexpectedChar { ch, pos: self.pos }),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.number(),
            Some(ch) => Err(ExprError::UnexpectedChar { ch, pos: self.pos }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn number(&mut self) -> Result<f64, ExprError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '.' {
                self.bump();
            } else {
                break;
            }
        }
        let literal = &self.src[start..self.pos];
        literal
            .parse::<f64>()
            .map_err(|_| ExprError::InvalidNumber(literal.to_string()))
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.bump();
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::FEET_PER_METER;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn feet_and_inches() {
        assert_eq!(evaluate("=2ft+6in", 1.0), Ok(2.5));
        assert_eq!(evaluate("2ft+6in", 1.0), Ok(2.5));
    }

    #[test]
    fn metric_suffixes() {
        assert!(close(evaluate("3.5m", 1.0).unwrap(), 3.5 * FEET_PER_METER));
        assert!(close(evaluate("100cm", 1.0).unwrap(), FEET_PER_METER));
        assert!(close(evaluate("1000mm", 1.0).unwrap(), FEET_PER_METER));
    }

    #[test]
    fn bare_numbers_use_default_scale() {
        assert!(close(evaluate("12", 1.0 / 12.0).unwrap(), 1.0));
        // Explicit units ignore the default scale.
        assert!(close(evaluate("1ft", 1.0 / 12.0).unwrap(), 1.0));
    }

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(evaluate("1+2*3", 1.0), Ok(7.0));
        assert_eq!(evaluate("(1+2)*3", 1.0), Ok(9.0));
        assert_eq!(evaluate("10/4", 1.0), Ok(2.5));
        assert_eq!(evaluate("2 - 3", 1.0), Ok(-1.0));
        assert_eq!(evaluate("2*-3", 1.0), Ok(-6.0));
        assert_eq!(evaluate("-(2+3)", 1.0), Ok(-5.0));
    }

    #[test]
    fn subtraction_of_scaled_tokens() {
        assert!(close(evaluate("2ft-3in", 1.0).unwrap(), 1.75));
    }

    #[test]
    fn failures() {
        assert_eq!(evaluate("", 1.0), Err(ExprError::Empty));
        assert_eq!(evaluate("=", 1.0), Err(ExprError::Empty));
        assert_eq!(evaluate("1/0", 1.0), Err(ExprError::DivisionByZero));
        assert_eq!(evaluate("(1+2", 1.0), Err(ExprError::UnexpectedEnd));
        assert!(matches!(
            evaluate("abc", 1.0),
            Err(ExprError::UnexpectedChar { ch: 'a', .. })
        ));
        assert!(matches!(
            evaluate("2yd", 1.0),
            Err(ExprError::UnexpectedChar { ch: 'y', .. })
        ));
    }

    #[test]
    fn rewrite_scales_tokens() {
        assert_eq!(rewrite("=2ft+6in", 1.0).unwrap(), "2+0.5");
        assert_eq!(rewrite("4", 0.5).unwrap(), "2");
    }
}
