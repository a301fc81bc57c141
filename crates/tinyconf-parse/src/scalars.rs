//! Turning already-validated literal text into values.

use std::str::Chars;

use tinyconf_syntax::SyntaxKind::{self, *};
use tinyconf_tokenizer::Syntax;

/// Decodes a string token of `kind`, quotes included.
pub(crate) fn string(raw: &str, kind: SyntaxKind, syntax: Syntax) -> Result<String, &'static str> {
    match kind {
        LITERAL_STRING => Ok(strip(raw, 1).to_string()),
        MULTILINE_LITERAL_STRING => Ok(trim_first_newline(strip(raw, 3)).to_string()),
        MULTILINE_BASIC_STRING => unescape(trim_first_newline(strip(raw, 3)), syntax),
        _ => unescape(strip(raw, 1), syntax),
    }
}

fn strip(raw: &str, quotes: usize) -> &str {
    raw.get(quotes..raw.len().saturating_sub(quotes)).unwrap_or_default()
}

/// A newline right after an opening `"""` or `'''` is not part of the value.
fn trim_first_newline(body: &str) -> &str {
    body.strip_prefix('\n').or_else(|| body.strip_prefix("\r\n")).unwrap_or(body)
}

fn unescape(body: &str, syntax: Syntax) -> Result<String, &'static str> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(escape) = chars.next() else {
            return Err("valid escape sequence");
        };
        match escape {
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'u' => out.push(unicode(&mut chars, 4, syntax)?),
            'U' => out.push(unicode(&mut chars, 8, syntax)?),
            // TOML line-ending backslash and env line continuation.
            ' ' | '\t' | '\n' | '\r' => {
                let rest = chars.as_str();
                chars = rest.trim_start_matches([' ', '\t', '\n', '\r']).chars();
                if syntax == Syntax::Env {
                    // Only the line break itself is swallowed.
                    let skipped = &rest[..rest.len() - chars.as_str().len()];
                    let kept = skipped.trim_start_matches(['\r', '\n']);
                    if escape == '\n' || escape == '\r' {
                        out.push_str(kept);
                    }
                }
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

fn unicode(chars: &mut Chars<'_>, digits: usize, syntax: Syntax) -> Result<char, &'static str> {
    let code = hex(chars, digits)?;
    if syntax == Syntax::Json && (0xD800..0xDC00).contains(&code) {
        // A high surrogate must be followed by `\u` and a low one.
        let rest = chars.as_str();
        let low = rest
            .strip_prefix("\\u")
            .and_then(|low| u32::from_str_radix(low.get(..4)?, 16).ok())
            .filter(|low| (0xDC00..0xE000).contains(low))
            .ok_or("low surrogate after high surrogate")?;
        *chars = rest[6..].chars();
        let code = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
        return char::from_u32(code).ok_or("valid unicode escape");
    }
    char::from_u32(code).ok_or("valid unicode escape")
}

fn hex(chars: &mut Chars<'_>, digits: usize) -> Result<u32, &'static str> {
    let rest = chars.as_str();
    let text = rest.get(..digits).ok_or("hexadecimal digit")?;
    let code = u32::from_str_radix(text, 16).map_err(|_error| "hexadecimal digit")?;
    *chars = rest[digits..].chars();
    Ok(code)
}

/// A TOML integer: decimal with sign, or `0x`/`0o`/`0b`, underscores allowed.
pub(crate) fn toml_integer(raw: &str) -> Option<i64> {
    let digits = raw.replace('_', "");
    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = digits.strip_prefix(prefix) {
            return i64::from_str_radix(digits, radix).ok();
        }
    }
    digits.parse().ok()
}

pub(crate) fn toml_float(raw: &str) -> Option<f64> {
    match raw.trim_start_matches('+') {
        "inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        "nan" | "-nan" => Some(f64::NAN),
        digits => digits.replace('_', "").parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_escapes_and_surrogates() {
        assert_eq!(string(r#""a\"b\\c\/\n""#, BASIC_STRING, Syntax::Json), Ok("a\"b\\c/\n".to_string()));
        assert_eq!(string(r#""\ud83d\ude00""#, BASIC_STRING, Syntax::Json), Ok("😀".to_string()));
        assert_eq!(string(r#""\u00e9""#, BASIC_STRING, Syntax::Json), Ok("é".to_string()));
        assert!(string(r#""\ud83d""#, BASIC_STRING, Syntax::Json).is_err());
    }

    #[test]
    fn toml_strings() {
        assert_eq!(string(r"'C:\dir'", LITERAL_STRING, Syntax::Toml), Ok(r"C:\dir".to_string()));
        assert_eq!(string("'''\nraw\n'''", MULTILINE_LITERAL_STRING, Syntax::Toml), Ok("raw\n".to_string()));
        assert_eq!(
            string("\"\"\"\none \\\n    two\"\"\"", MULTILINE_BASIC_STRING, Syntax::Toml),
            Ok("one two".to_string())
        );
        assert_eq!(string(r#""\U0001F600""#, BASIC_STRING, Syntax::Toml), Ok("😀".to_string()));
        assert_eq!(string(r#""""a"""""#, MULTILINE_BASIC_STRING, Syntax::Toml), Ok("a\"".to_string()));
    }

    #[test]
    fn env_line_continuation() {
        assert_eq!(string("\"a\\\n  b\"", BASIC_STRING, Syntax::Env), Ok("a  b".to_string()));
        assert_eq!(string(r#""cost \$5""#, BASIC_STRING, Syntax::Env), Ok("cost $5".to_string()));
    }

    #[test]
    fn toml_numbers() {
        assert_eq!(toml_integer("0xff"), Some(255));
        assert_eq!(toml_integer("-1_000"), Some(-1000));
        assert_eq!(toml_integer("0b11"), Some(3));
        assert_eq!(toml_integer("9223372036854775808"), None);
        assert_eq!(toml_float("1_000.5"), Some(1000.5));
        assert_eq!(toml_float("-inf"), Some(f64::NEG_INFINITY));
        assert!(toml_float("+nan").is_some_and(f64::is_nan));
    }
}
