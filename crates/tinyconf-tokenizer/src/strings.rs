use text_size::TextSize;
use tinyconf_errors::LexError;
use tinyconf_syntax::Syntax;

use crate::Lexer;

impl Lexer<'_> {
    /// Scans the rest of a string whose opening `quote` was consumed.
    pub(crate) fn quoted(&mut self, quote: char, escapes: bool, multiline: bool) -> Result<(), LexError> {
        loop {
            if self.cursor.is_eof() || (!multiline && self.at_newline()) {
                return Err(self.error_here(format!("closing `{quote}`")));
            }

            let c = self.cursor.peek();
            if c == quote {
                self.cursor.advance();
                return Ok(());
            }
            if c == '\\' && escapes {
                self.cursor.advance();
                self.escape(multiline)?;
                continue;
            }
            self.check_printable(c)?;
            self.cursor.advance();
        }
    }

    /// Scans the rest of a TOML `"""` or `'''` string whose opening delimiter
    /// was consumed. Up to two quotes may sit right before the closing
    /// delimiter, as in `""""quoted""""`.
    pub(crate) fn triple_quoted(&mut self, quote: char, escapes: bool) -> Result<(), LexError> {
        let delimiter: String = [quote; 3].iter().collect();

        loop {
            if self.cursor.is_eof() {
                return Err(self.error_here(format!("closing `{delimiter}`")));
            }

            if self.cursor.starts_with(&delimiter) {
                let run = self.cursor.rest().chars().take_while(|&c| c == quote).count();
                if run > 5 {
                    self.cursor.advance_by(5);
                    return Err(self.error_here("end of string after closing delimiter"));
                }
                self.cursor.advance_by(run);
                return Ok(());
            }

            let c = self.cursor.peek();
            if c == '\\' && escapes {
                self.cursor.advance();
                self.escape(true)?;
                continue;
            }
            if c != '\n' && c != '\r' {
                self.check_printable(c)?;
            }
            self.cursor.advance();
        }
    }

    fn check_printable(&self, c: char) -> Result<(), LexError> {
        let allowed = match self.syntax {
            Syntax::Json => !c.is_control(),
            Syntax::Toml => c == '\t' || !c.is_control(),
            Syntax::Env => true,
        };
        if allowed { Ok(()) } else { Err(self.error_here("printable character or escape sequence")) }
    }

    /// Validates one escape sequence; the backslash was already consumed.
    fn escape(&mut self, multiline: bool) -> Result<(), LexError> {
        let backslash = self.cursor.offset() - TextSize::new(1);
        let invalid = |lexer: &Self| Err(lexer.error(backslash, "valid escape sequence"));

        match (self.syntax, self.cursor.peek()) {
            (_, _) if self.cursor.is_eof() => invalid(self),
            (Syntax::Json, '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't')
            | (Syntax::Toml, '"' | '\\' | 'b' | 'f' | 'n' | 'r' | 't')
            | (Syntax::Env, '"' | '\\' | '$' | '\'' | '`' | 'n' | 'r' | 't') => {
                self.cursor.advance();
                Ok(())
            }
            (Syntax::Json | Syntax::Toml, 'u') => {
                self.cursor.advance();
                self.hex_digits(4)
            }
            (Syntax::Toml, 'U') => {
                self.cursor.advance();
                self.hex_digits(8)
            }
            // A line-ending backslash trims the newline and following whitespace.
            (Syntax::Toml, ' ' | '\t' | '\n' | '\r') if multiline => {
                self.cursor.advance_while(|c| matches!(c, ' ' | '\t'));
                if !self.eat_newline() {
                    return invalid(self);
                }
                self.cursor.advance_while(|c| matches!(c, ' ' | '\t' | '\n' | '\r'));
                Ok(())
            }
            (Syntax::Env, '\n' | '\r') => {
                if self.eat_newline() { Ok(()) } else { invalid(self) }
            }
            _ => invalid(self),
        }
    }

    fn hex_digits(&mut self, count: usize) -> Result<(), LexError> {
        for _ in 0..count {
            if self.cursor.is_eof() || !self.cursor.peek().is_ascii_hexdigit() {
                return Err(self.error_here("hexadecimal digit"));
            }
            self.cursor.advance();
        }
        Ok(())
    }
}
