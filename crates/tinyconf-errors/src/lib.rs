//! Error taxonomy shared by every stage of the engine, plus source-snippet
//! rendering for positioned errors.

mod edit;
mod plugin;
mod position;
mod syntax;
mod warning;

use std::fmt::Display;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use edit::{EditError, InvalidPermutationError, PathNotFoundError, TypeMismatchError};
pub use plugin::{CapabilityError, PluginError};
pub use position::Position;
pub use syntax::{DuplicateKeyError, LexError, ParseError, SyntaxError};
pub use text_size::{TextRange, TextSize};
pub use warning::{Loss, LossyConversionWarning};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

/// A message anchored to a byte range of a source buffer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    severity: Severity,
    message: String,
    range: TextRange,
}

impl Diagnostic {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self { severity: Severity::Error, message: message.into(), range }
    }

    pub fn warning(message: impl Into<String>, range: TextRange) -> Self {
        Self { severity: Severity::Warning, message: message.into(), range }
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        origin: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let level = match self.severity {
            Severity::Error => Level::Error,
            Severity::Warning => Level::Warning,
        };
        let end = usize::from(self.range.end()).min(text.len());
        let start = usize::from(self.range.start()).min(end);

        let message = level.title(&self.message).snippet(
            Snippet::source(text)
                .origin(origin)
                .annotation(level.span(start..end).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}
