use tinyconf_errors::LexError;
use tinyconf_syntax::SyntaxKind::{self, *};

use crate::{LexMode, Lexer};

impl Lexer<'_> {
    pub(crate) fn env_token(&mut self) -> Result<SyntaxKind, LexError> {
        let start = self.cursor.offset();

        if self.eat_newline() {
            return Ok(NEWLINE);
        }

        match self.mode {
            LexMode::Key => match self.cursor.peek() {
                '=' => {
                    self.cursor.advance();
                    Ok(EQ)
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    self.cursor.advance_while(is_key_char);
                    let export = self.slice_from(start) == "export"
                        && matches!(self.cursor.peek(), ' ' | '\t')
                        && self.cursor.rest().trim_start_matches([' ', '\t']).starts_with(is_key_start);
                    Ok(if export { EXPORT_KW } else { BARE_KEY })
                }
                _ => Err(self.error(start, "a variable name")),
            },
            LexMode::Value => match self.cursor.peek() {
                '"' => {
                    self.cursor.advance();
                    self.quoted('"', true, true)?;
                    Ok(BASIC_STRING)
                }
                '\'' => {
                    self.cursor.advance();
                    self.quoted('\'', false, true)?;
                    Ok(LITERAL_STRING)
                }
                _ => {
                    self.raw_value();
                    Ok(ENV_VALUE)
                }
            },
        }
    }

    /// An unquoted value runs to the end of the line, stopping before a
    /// ` #` comment and excluding trailing blanks.
    fn raw_value(&mut self) {
        let rest = self.cursor.rest();
        let line_end = rest.find('\n').unwrap_or(rest.len());
        let line = rest[..line_end].strip_suffix('\r').unwrap_or(&rest[..line_end]);

        let bytes = line.as_bytes();
        let comment = (1..bytes.len())
            .find(|&i| bytes[i] == b'#' && matches!(bytes[i - 1], b' ' | b'\t'))
            .unwrap_or(line.len());
        let value = line[..comment].trim_end_matches([' ', '\t']);

        self.cursor.advance_by(value.chars().count());
    }
}

fn is_key_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}
