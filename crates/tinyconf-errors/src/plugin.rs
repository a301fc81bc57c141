use thiserror::Error;

use crate::EditError;

/// A transform attempted an operation outside its declared capability set.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("plugin `{plugin}` may not {operation} `{path}`")]
pub struct CapabilityError {
    pub plugin: String,
    pub operation: &'static str,
    pub path: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PluginError {
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error("plugin `{plugin}` failed: {source}")]
    Edit {
        plugin: String,
        #[source]
        source: EditError,
    },
    #[error("plugin `{plugin}` reported an error: {message}")]
    Failed { plugin: String, message: String },
    #[error("a plugin named `{name}` is already registered")]
    DuplicateRegistration { name: String },
    #[error("no plugin named `{name}` is registered")]
    UnknownPlugin { name: String },
}
