//! Pattern definitions produced by the interpreter

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// What a pattern is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Recognizes a component and may assign its UI role.
    Track,
    /// Extracts properties from a component.
    Gather,
    /// Relates a pair of components.
    Relate,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Track => "track",
            PatternKind::Gather => "gather",
            PatternKind::Relate => "relate",
        }
    }

    /// Track and Gather patterns are evaluated per component.
    pub fn applies_to_components(&self) -> bool {
        matches!(self, PatternKind::Track | PatternKind::Gather)
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCommand {
    /// Passes when any value occurs literally in the content.
    Tag,
    /// Passes when any value, read as a regex, matches the content.
    Pluck,
}

impl RuleCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCommand::Tag => "tag",
            RuleCommand::Pluck => "pluck",
        }
    }

    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "tag" => Some(RuleCommand::Tag),
            "pluck" => Some(RuleCommand::Pluck),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub command: RuleCommand,
    pub target: String,
    pub values: Vec<String>,
}

impl Rule {
    pub fn new(command: RuleCommand, target: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            command,
            target: target.into(),
            values,
        }
    }

    pub fn tag(target: impl Into<String>, values: &[&str]) -> Self {
        Self::new(
            RuleCommand::Tag,
            target,
            values.iter().map(|v| v.to_string()).collect(),
        )
    }

    pub fn pluck(target: impl Into<String>, patterns: &[&str]) -> Self {
        Self::new(
            RuleCommand::Pluck,
            target,
            patterns.iter().map(|v| v.to_string()).collect(),
        )
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} = ({})", self.command.as_str(), self.target, self.values.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub id: String,
    pub kind: PatternKind,
    pub rules: Vec<Rule>,
    pub tags: BTreeSet<String>,
}

impl PatternDefinition {
    pub fn new(id: impl Into<String>, kind: PatternKind) -> Self {
        Self {
            id: id.into(),
            kind,
            rules: Vec::new(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Targets of the tag rules, in rule order.
    pub fn tag_targets(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|r| r.command == RuleCommand::Tag)
            .map(|r| r.target.as_str())
    }
}
