//! Capability-scoped access to a document for external code: transforms
//! that edit it and validators that only look.

mod capability;
mod diagnostic;
mod registry;
mod tree;


pub use capability::Capability;
pub use diagnostic::Diagnostic;
pub use registry::Registry;
pub use tinyconf_errors::{CapabilityError, PluginError, Severity};
pub use tree::PluginTree;
