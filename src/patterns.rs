//! Pattern definitions, their registry and the matcher that scores them against components.
//!
//! Definitions are normally produced by the DSL interpreter (see [crate::dsl]) but can be
//! built and registered directly.

pub mod definition;
pub mod matching;
pub mod registry;

pub use definition::{PatternDefinition, PatternKind, Rule, RuleCommand};
pub use matching::{
    Candidate, MatchResult, PatternMatcher, RelationEvaluator, RelationMatch, TagRelationEvaluator,
    DEFAULT_THRESHOLD,
};
pub use registry::{CustomMatcher, LookupError, PatternRegistry, RegistrationError};
