use tinyconf_errors::{CapabilityError, EditError, PluginError};
use tinyconf_tree::{Document, Path, Segment, Value};

use crate::capability::{Capability, Operation};

/// What a transform sees: the document it runs on, filtered through the
/// capabilities it declared.
pub struct PluginTree<'a> {
    plugin: &'a str,
    capabilities: &'a [Capability],
    document: &'a mut Document,
}

impl<'a> PluginTree<'a> {
    pub(crate) fn new(plugin: &'a str, capabilities: &'a [Capability], document: &'a mut Document) -> Self {
        Self { plugin, capabilities, document }
    }

    pub fn plugin(&self) -> &str {
        self.plugin
    }

    /// The value at `path`, without trivia.
    pub fn read_path(&self, path: impl Into<Path>) -> Result<Value, PluginError> {
        let path = path.into();
        self.check(Operation::Read, &path)?;
        let node = self.document.resolve(&path).map_err(|source| self.edit_error(source))?;
        Ok(node.to_value())
    }

    /// Keys or indices under `path`, in document order.
    pub fn list_children(&self, path: impl Into<Path>) -> Result<Vec<Segment>, PluginError> {
        let path = path.into();
        self.check(Operation::Read, &path)?;
        let node = self.document.resolve(&path).map_err(|source| self.edit_error(source))?;
        Ok(node.children().into_iter().map(|(segment, _)| segment).collect())
    }

    pub fn set(&mut self, path: impl Into<Path>, value: impl Into<Value>) -> Result<(), PluginError> {
        let path = path.into();
        self.check(Operation::Set, &path)?;
        let result = self.document.editor().set(path, value);
        result.map_err(|source| self.edit_error(source))
    }

    pub fn insert(
        &mut self,
        path: impl Into<Path>,
        at: impl Into<Segment>,
        value: impl Into<Value>,
    ) -> Result<(), PluginError> {
        let path = path.into();
        self.check(Operation::Insert, &path)?;
        let result = self.document.editor().insert(path, at, value);
        result.map_err(|source| self.edit_error(source))
    }

    pub fn delete(&mut self, path: impl Into<Path>) -> Result<(), PluginError> {
        let path = path.into();
        self.check(Operation::Delete, &path)?;
        let result = self.document.editor().delete(path);
        result.map_err(|source| self.edit_error(source))
    }

    pub fn reorder<K: AsRef<str>>(
        &mut self,
        path: impl Into<Path>,
        order: impl IntoIterator<Item = K>,
    ) -> Result<(), PluginError> {
        let path = path.into();
        self.check(Operation::Reorder, &path)?;
        let result = self.document.editor().reorder(path, order);
        result.map_err(|source| self.edit_error(source))
    }

    pub fn rename(&mut self, path: impl Into<Path>, new_key: impl Into<String>) -> Result<(), PluginError> {
        let path = path.into();
        self.check(Operation::Rename, &path)?;
        let result = self.document.editor().rename(path, new_key);
        result.map_err(|source| self.edit_error(source))
    }

    /// An error for the transform to return when it decides to give up.
    pub fn fail(&self, message: impl Into<String>) -> PluginError {
        PluginError::Failed { plugin: self.plugin.to_string(), message: message.into() }
    }

    fn check(&self, operation: Operation, path: &Path) -> Result<(), CapabilityError> {
        if self.capabilities.iter().any(|capability| capability.allows(operation, path)) {
            return Ok(());
        }
        tracing::debug!(plugin = self.plugin, %path, operation = operation.name(), "capability denied");
        Err(CapabilityError { plugin: self.plugin.to_string(), operation: operation.name(), path: path.to_string() })
    }

    fn edit_error(&self, source: EditError) -> PluginError {
        PluginError::Edit { plugin: self.plugin.to_string(), source }
    }
}
