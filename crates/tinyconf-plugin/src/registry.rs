use rustc_hash::FxHashMap;
use tinyconf_errors::PluginError;
use tinyconf_tree::Document;

use crate::{Capability, Diagnostic, PluginTree};

type TransformFn = dyn Fn(&mut PluginTree<'_>) -> Result<(), PluginError> + Send + Sync;
type ValidatorFn = dyn Fn(&Document) -> Vec<Diagnostic> + Send + Sync;

struct Transform {
    capabilities: Vec<Capability>,
    run: Box<TransformFn>,
}

/// Named transforms and validators.
#[derive(Default)]
pub struct Registry {
    transforms: FxHashMap<String, Transform>,
    validators: FxHashMap<String, Box<ValidatorFn>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_transform<F>(
        &mut self,
        name: impl Into<String>,
        capabilities: impl IntoIterator<Item = Capability>,
        transform: F,
    ) -> Result<(), PluginError>
    where
        F: Fn(&mut PluginTree<'_>) -> Result<(), PluginError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.transforms.contains_key(&name) {
            return Err(PluginError::DuplicateRegistration { name });
        }
        let capabilities: Vec<Capability> = capabilities.into_iter().collect();
        tracing::debug!(%name, ?capabilities, "register transform");
        self.transforms.insert(name, Transform { capabilities, run: Box::new(transform) });
        Ok(())
    }

    pub fn register_validator<F>(&mut self, name: impl Into<String>, validator: F) -> Result<(), PluginError>
    where
        F: Fn(&Document) -> Vec<Diagnostic> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.validators.contains_key(&name) {
            return Err(PluginError::DuplicateRegistration { name });
        }
        tracing::debug!(%name, "register validator");
        self.validators.insert(name, Box::new(validator));
        Ok(())
    }

    /// Runs a transform on a copy of `document` and keeps the result only
    /// if the transform succeeds.
    pub fn run_transform(&self, name: &str, document: &mut Document) -> Result<(), PluginError> {
        let transform =
            self.transforms.get(name).ok_or_else(|| PluginError::UnknownPlugin { name: name.to_string() })?;

        let mut scratch = document.clone();
        let mut tree = PluginTree::new(name, &transform.capabilities, &mut scratch);
        if let Err(error) = (transform.run)(&mut tree) {
            tracing::debug!(plugin = name, %error, "transform rejected");
            return Err(error);
        }

        *document = scratch;
        tracing::debug!(plugin = name, "transform applied");
        Ok(())
    }

    pub fn run_validator(&self, name: &str, document: &Document) -> Result<Vec<Diagnostic>, PluginError> {
        let validator =
            self.validators.get(name).ok_or_else(|| PluginError::UnknownPlugin { name: name.to_string() })?;

        let mut diagnostics = validator(document);
        for diagnostic in &mut diagnostics {
            diagnostic.plugin = name.to_string();
        }
        tracing::debug!(plugin = name, count = diagnostics.len(), "validator ran");
        Ok(diagnostics)
    }

    pub fn transform_names(&self) -> impl Iterator<Item = &str> {
        self.transforms.keys().map(String::as_str)
    }

    pub fn validator_names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }
}
