use tinyconf_errors::LexError;
use tinyconf_syntax::SyntaxKind::{self, *};

use crate::{LexMode, Lexer};

impl Lexer<'_> {
    pub(crate) fn toml_token(&mut self) -> Result<SyntaxKind, LexError> {
        let start = self.cursor.offset();

        if self.eat_newline() {
            return Ok(NEWLINE);
        }
        if self.cursor.starts_with("\"\"\"") {
            self.cursor.advance_by(3);
            self.triple_quoted('"', true)?;
            return Ok(MULTILINE_BASIC_STRING);
        }
        if self.cursor.starts_with("'''") {
            self.cursor.advance_by(3);
            self.triple_quoted('\'', false)?;
            return Ok(MULTILINE_LITERAL_STRING);
        }

        let kind = match self.cursor.peek() {
            '[' => LEFT_BRACKET,
            ']' => RIGHT_BRACKET,
            '{' => LEFT_BRACE,
            '}' => RIGHT_BRACE,
            '=' => EQ,
            ',' => COMMA,
            '.' => DOT,
            '"' => {
                self.cursor.advance();
                self.quoted('"', true, false)?;
                return Ok(BASIC_STRING);
            }
            '\'' => {
                self.cursor.advance();
                self.quoted('\'', false, false)?;
                return Ok(LITERAL_STRING);
            }
            c if self.mode == LexMode::Key && is_bare_key_char(c) => {
                self.cursor.advance_while(is_bare_key_char);
                return Ok(BARE_KEY);
            }
            c if self.mode == LexMode::Value && (c.is_ascii_alphanumeric() || matches!(c, '+' | '-')) => {
                return self.toml_scalar(start);
            }
            _ => {
                let expected = match self.mode {
                    LexMode::Key => "a key",
                    LexMode::Value => "a value",
                };
                return Err(self.error(start, expected));
            }
        };

        self.cursor.advance();
        Ok(kind)
    }

    fn toml_scalar(&mut self, start: text_size::TextSize) -> Result<SyntaxKind, LexError> {
        self.cursor.advance_while(is_scalar_char);

        // `1979-05-27 07:32:00` separates date and time with a single space.
        let rest = self.cursor.rest().as_bytes();
        if is_full_date(self.slice_from(start))
            && rest.len() >= 4
            && rest[0] == b' '
            && rest[1].is_ascii_digit()
            && rest[2].is_ascii_digit()
            && rest[3] == b':'
        {
            self.cursor.advance();
            self.cursor.advance_while(is_scalar_char);
        }

        classify_scalar(self.slice_from(start)).ok_or_else(|| self.error(start, "a value"))
    }
}

pub(crate) fn is_bare_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-')
}

fn is_scalar_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-' | '.' | ':')
}

fn is_full_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && [0, 1, 2, 3, 5, 6, 8, 9].iter().all(|&i| b[i].is_ascii_digit())
}

fn is_datetime(s: &str) -> bool {
    let b = s.as_bytes();
    let date = b.len() >= 10 && is_full_date(&s[..10]);
    let time = b.len() >= 8
        && b[2] == b':'
        && b[5] == b':'
        && [0, 1, 3, 4, 6, 7].iter().all(|&i| b[i].is_ascii_digit());
    (date || time)
        && s.chars().all(|c| c.is_ascii_digit() || matches!(c, '-' | ':' | '.' | '+' | 'T' | 't' | 'Z' | 'z' | ' '))
}

/// Decides what a run of value characters is, or `None` if it is nothing
/// TOML knows.
pub(crate) fn classify_scalar(s: &str) -> Option<SyntaxKind> {
    match s {
        "true" => return Some(TRUE_KW),
        "false" => return Some(FALSE_KW),
        "inf" | "+inf" | "-inf" | "nan" | "+nan" | "-nan" => return Some(FLOAT),
        _ => {}
    }
    if is_datetime(s) {
        return Some(DATETIME);
    }

    let (signed, body) = match s.strip_prefix(['+', '-']) {
        Some(body) => (true, body),
        None => (false, s),
    };

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = body.strip_prefix(prefix) {
            let valid = !signed && valid_digits(digits, |c| c.is_digit(radix));
            return valid.then_some(INTEGER);
        }
    }

    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(at) => (&body[..at], Some(&body[at + 1..])),
        None => (body, None),
    };
    let (integral, fraction) = match mantissa.split_once('.') {
        Some((integral, fraction)) => (integral, Some(fraction)),
        None => (mantissa, None),
    };

    let leading_zero = integral.len() > 1 && integral.starts_with('0');
    if leading_zero || !valid_digits(integral, |c| c.is_ascii_digit()) {
        return None;
    }
    if fraction.is_some_and(|fraction| !valid_digits(fraction, |c| c.is_ascii_digit())) {
        return None;
    }
    if let Some(exponent) = exponent {
        let exponent = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        if !valid_digits(exponent, |c| c.is_ascii_digit()) {
            return None;
        }
    }

    Some(if fraction.is_some() || exponent.is_some() { FLOAT } else { INTEGER })
}

/// Digits with single underscores strictly between them.
fn valid_digits(s: &str, digit: impl Fn(char) -> bool) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && !s.contains("__")
        && s.chars().all(|c| c == '_' || digit(c))
}
