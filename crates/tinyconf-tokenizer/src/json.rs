use text_size::TextSize;
use tinyconf_errors::LexError;
use tinyconf_syntax::SyntaxKind::{self, *};

use crate::Lexer;

impl Lexer<'_> {
    pub(crate) fn json_token(&mut self) -> Result<SyntaxKind, LexError> {
        let start = self.cursor.offset();

        let kind = match self.cursor.advance() {
            '{' => LEFT_BRACE,
            '}' => RIGHT_BRACE,
            '[' => LEFT_BRACKET,
            ']' => RIGHT_BRACKET,
            ':' => COLON,
            ',' => COMMA,
            '"' => {
                self.quoted('"', true, false)?;
                BASIC_STRING
            }
            '-' | '0'..='9' => self.json_number()?,
            'a'..='z' => {
                self.cursor.advance_while(|c| c.is_ascii_alphanumeric());
                match self.slice_from(start) {
                    "true" => TRUE_KW,
                    "false" => FALSE_KW,
                    "null" => NULL_KW,
                    _ => return Err(self.error(start, "`true`, `false` or `null`")),
                }
            }
            _ => return Err(self.error(start, "a JSON value or punctuation")),
        };

        Ok(kind)
    }

    fn json_number(&mut self) -> Result<SyntaxKind, LexError> {
        let first = self.cursor.previous();
        let leading = if first == '-' { self.cursor.advance() } else { first };

        match leading {
            '0' => {}
            '1'..='9' => self.cursor.advance_while(|c| c.is_ascii_digit()),
            _ => return Err(self.error(self.cursor.offset() - TextSize::new(1), "digit")),
        }

        let mut kind = INTEGER;
        if self.cursor.eat('.') {
            self.required_digits()?;
            kind = FLOAT;
        }
        if self.cursor.eat('e') || self.cursor.eat('E') {
            if !self.cursor.eat('+') {
                self.cursor.eat('-');
            }
            self.required_digits()?;
            kind = FLOAT;
        }

        Ok(kind)
    }

    fn required_digits(&mut self) -> Result<(), LexError> {
        if self.cursor.is_eof() || !self.cursor.peek().is_ascii_digit() {
            return Err(self.error_here("digit"));
        }
        self.cursor.advance_while(|c| c.is_ascii_digit());
        Ok(())
    }
}
