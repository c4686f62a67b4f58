//! Template set registry
//!
//! Holds template sets by name. Registering a set under an existing name replaces it.

use std::collections::HashMap;

use super::template::TemplateSet;
use super::{builtin, CodeGenerator, CodegenError, GenerationOptions};
use crate::model::ComponentModel;

#[derive(Debug)]
pub struct TemplateRegistry {
    sets: HashMap<String, TemplateSet>,
}

impl TemplateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        TemplateRegistry {
            sets: HashMap::new(),
        }
    }

    pub fn register(&mut self, set: TemplateSet) {
        self.sets.insert(set.name().to_string(), set);
    }

    pub fn get(&self, name: &str) -> Result<&TemplateSet, CodegenError> {
        self.sets
            .get(name)
            .ok_or_else(|| CodegenError::UnknownTemplateSet {
                name: name.to_string(),
                available: self.list_sets().join(", "),
            })
    }

    pub fn has(&self, name: &str) -> bool {
        self.sets.contains_key(name)
    }

    /// Set names, sorted.
    pub fn list_sets(&self) -> Vec<String> {
        let mut names: Vec<_> = self.sets.keys().cloned().collect();
        names.sort();
        names
    }

    /// Render `model` with the named set.
    pub fn generate(
        &self,
        model: &ComponentModel,
        set: &str,
        options: &GenerationOptions,
    ) -> Result<String, CodegenError> {
        let set = self.get(set)?;
        Ok(CodeGenerator::new(set).generate(model, options))
    }

    /// A registry with the `html` and `tkinter` sets.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(builtin::html());
        registry.register(builtin::tkinter());
        registry
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
