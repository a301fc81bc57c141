//! Canonical literal text for each syntax.

use std::fmt::Write as _;

use tinyconf_tree::is_bare_key;

/// A double-quoted string with JSON escapes, which TOML basic strings
/// accept too.
pub(crate) fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub(crate) fn toml_key(name: &str) -> String {
    if is_bare_key(name) { name.to_string() } else { quoted(name) }
}

/// Always carries a fraction or an exponent, so it reads back as a float.
pub(crate) fn toml_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        format!("{f:?}")
    }
}

/// `None` for non-finite values, which JSON has no literal for.
pub(crate) fn json_float(f: f64) -> Option<String> {
    f.is_finite().then(|| format!("{f:?}"))
}

/// An env value, quoted only when the raw form would not read back.
pub(crate) fn env_value(s: &str) -> String {
    let raw = s.chars().all(|c| !c.is_whitespace() && !c.is_control() && !matches!(c, '#' | '"' | '\'' | '\\' | '$' | '`'));
    if raw {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A variable name made of ASCII letters, digits and `_`, not starting with
/// a digit.
pub(crate) fn env_key(name: &str) -> String {
    let mut key: String = name.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }).collect();
    if key.is_empty() || key.starts_with(|c: char| c.is_ascii_digit()) {
        key.insert(0, '_');
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting() {
        assert_eq!(quoted("a\"b\\c\nd\u{1}"), r#""a\"b\\c\nd\u0001""#);
        assert_eq!(toml_key("plain-key_1"), "plain-key_1");
        assert_eq!(toml_key("a.b"), r#""a.b""#);
    }

    #[test]
    fn floats() {
        assert_eq!(toml_float(1.0), "1.0");
        assert_eq!(toml_float(1e300), "1e300");
        assert_eq!(toml_float(f64::NEG_INFINITY), "-inf");
        assert_eq!(json_float(0.5).as_deref(), Some("0.5"));
        assert_eq!(json_float(f64::NAN), None);
    }

    #[test]
    fn env_values_and_keys() {
        assert_eq!(env_value("localhost"), "localhost");
        assert_eq!(env_value(""), "");
        assert_eq!(env_value("two words"), r#""two words""#);
        assert_eq!(env_value("cost $5\n"), r#""cost \$5\n""#);
        assert_eq!(env_key("db.host-name"), "db_host_name");
        assert_eq!(env_key("1st"), "_1st");
    }
}
