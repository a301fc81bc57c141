use text_size::TextSize;
use tinyconf_errors::SyntaxError;
use tinyconf_syntax::SyntaxKind::*;
use tinyconf_syntax::SyntaxSet;
use tinyconf_tokenizer::LexMode;

use crate::parser::Parser;

pub(crate) mod env;
pub(crate) mod json;
pub(crate) mod toml;

pub(crate) const COMMA_OR_RIGHT_BRACE: SyntaxSet = SyntaxSet::new([COMMA, RIGHT_BRACE]);
pub(crate) const COMMA_OR_RIGHT_BRACKET: SyntaxSet = SyntaxSet::new([COMMA, RIGHT_BRACKET]);
pub(crate) const LINE_END: SyntaxSet = SyntaxSet::new([NEWLINE, EOF]);

/// Finishes a line of a line-based grammar. Returns the text from `from`
/// to the end of the line, terminator included, and the offset where the
/// next line starts. `EOF` is peeked, never consumed.
pub(crate) fn rest_of_line<'t>(p: &mut Parser<'t>, from: TextSize) -> Result<(&'t str, TextSize), SyntaxError> {
    p.set_mode(LexMode::Key);
    match p.peek_kind()? {
        NEWLINE => {
            let newline = p.bump()?;
            Ok((p.between(from, newline.range.end()), newline.range.end()))
        }
        EOF => {
            let end = p.peek()?.range.start();
            Ok((p.between(from, end), end))
        }
        _ => Err(p.unexpected(LINE_END.describe())),
    }
}
