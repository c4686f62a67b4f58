//! Pattern registry
//!
//!     The registry owns every [PatternDefinition] of one recognition run, keyed by id, plus
//!     a tag index for [PatternRegistry::find_patterns_by_tag] and the host-supplied
//!     [CustomMatcher]s attached to individual patterns.
//!
//!     Registration never overwrites: a second definition with an existing id is rejected
//!     and the first stays in place.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::definition::PatternDefinition;
use crate::dsl::ast::Level;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("pattern `{id}` is already registered")]
    DuplicatePattern { id: String },
    #[error("cannot attach a matcher to unknown pattern `{id}`")]
    UnknownPattern { id: String },
    #[error("{level} command `{command}` is registered twice")]
    DuplicateCommand { level: Level, command: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("unknown pattern `{id}`")]
    UnknownPattern { id: String },
    #[error("no pattern carries tag `{tag}`")]
    UnknownTag { tag: String },
    #[error("pattern `{id}` has no custom matcher")]
    UnknownMatcher { id: String },
}

/// Host-supplied scoring that contributes one extra rule score to a pattern.
pub trait CustomMatcher: Send + Sync {
    fn name(&self) -> &str;

    /// Score in `[0, 1]` for a component's rendered lines. Out-of-range values are clamped.
    fn score(&self, lines: &[String]) -> f64;
}

#[derive(Default)]
pub struct PatternRegistry {
    definitions: BTreeMap<String, PatternDefinition>,
    tag_index: BTreeMap<String, BTreeSet<String>>,
    matchers: HashMap<String, Box<dyn CustomMatcher>>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: PatternDefinition) -> Result<(), RegistrationError> {
        if self.definitions.contains_key(&definition.id) {
            return Err(RegistrationError::DuplicatePattern { id: definition.id });
        }
        for tag in &definition.tags {
            self.tag_index
                .entry(tag.clone())
                .or_default()
                .insert(definition.id.clone());
        }
        tracing::debug!(id = %definition.id, kind = %definition.kind, "pattern registered");
        self.definitions.insert(definition.id.clone(), definition);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&PatternDefinition, LookupError> {
        self.definitions
            .get(id)
            .ok_or_else(|| LookupError::UnknownPattern { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Definitions carrying `tag`, ordered by id.
    pub fn find_patterns_by_tag(&self, tag: &str) -> Result<Vec<&PatternDefinition>, LookupError> {
        let ids = self
            .tag_index
            .get(tag)
            .ok_or_else(|| LookupError::UnknownTag { tag: tag.to_string() })?;
        Ok(ids.iter().filter_map(|id| self.definitions.get(id)).collect())
    }

    pub fn attach_matcher(
        &mut self,
        id: &str,
        matcher: Box<dyn CustomMatcher>,
    ) -> Result<(), RegistrationError> {
        if !self.definitions.contains_key(id) {
            return Err(RegistrationError::UnknownPattern { id: id.to_string() });
        }
        self.matchers.insert(id.to_string(), matcher);
        Ok(())
    }

    pub fn matcher(&self, id: &str) -> Result<&dyn CustomMatcher, LookupError> {
        self.matchers
            .get(id)
            .map(|m| m.as_ref())
            .ok_or_else(|| LookupError::UnknownMatcher { id: id.to_string() })
    }

    pub(crate) fn matcher_for(&self, id: &str) -> Option<&dyn CustomMatcher> {
        self.matchers.get(id).map(|m| m.as_ref())
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> Vec<&str> {
        self.definitions.keys().map(String::as_str).collect()
    }

    /// Definitions in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &PatternDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl std::fmt::Debug for PatternRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRegistry")
            .field("definitions", &self.definitions)
            .field("matchers", &self.matchers.keys().collect::<Vec<_>>())
            .finish()
    }
}
