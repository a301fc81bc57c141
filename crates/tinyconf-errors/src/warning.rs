use std::fmt;

/// What a cross-dialect conversion could not carry over.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Loss {
    /// Comments in trivia that the target dialect cannot express.
    Comments,
    /// A table flattened into prefixed keys.
    NestedTable,
    /// An array written as a single string.
    Array,
    /// A value the target dialect has no literal for.
    Value,
    /// A key rewritten to fit the target's key syntax.
    Key,
}

/// Non-fatal: returned next to a successful conversion, never as a failure.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LossyConversionWarning {
    pub path: String,
    pub loss: Loss,
    pub message: String,
}

impl fmt::Display for LossyConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "lossy conversion at document root: {}", self.message)
        } else {
            write!(f, "lossy conversion at `{}`: {}", self.path, self.message)
        }
    }
}
