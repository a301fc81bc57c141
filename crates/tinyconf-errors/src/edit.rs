use thiserror::Error;

use crate::DuplicateKeyError;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("path `{path}` not found: no `{segment}`")]
pub struct PathNotFoundError {
    pub path: String,
    pub segment: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("type mismatch at `{path}`: expected {expected}, found {found}")]
pub struct TypeMismatchError {
    pub path: String,
    pub expected: &'static str,
    pub found: &'static str,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("new key order for `{path}` is not a permutation of its keys: {reason}")]
pub struct InvalidPermutationError {
    pub path: String,
    pub reason: String,
}

/// Every way a Tree Editor call can fail. A failed call leaves the tree
/// untouched.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum EditError {
    #[error(transparent)]
    PathNotFound(#[from] PathNotFoundError),
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatchError),
    #[error(transparent)]
    InvalidPermutation(#[from] InvalidPermutationError),
    #[error(transparent)]
    DuplicateKey(#[from] DuplicateKeyError),
    #[error("index {index} out of range for `{path}` (length {len})")]
    IndexOutOfRange { path: String, index: usize, len: usize },
    #[error("the root node cannot be {action}")]
    RootNotEditable { action: &'static str },
}
