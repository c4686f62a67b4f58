//! Pattern matching
//!
//!     Each rule of a pattern scores 1.0 (pass) or 0.0 (fail) against a component's rendered
//!     lines:
//!
//!     - tag: passes when any non-empty value occurs literally in any line, and sets
//!       `has_<target>` to true.
//!     - pluck: every value is a regular expression; the first match (values in order, then
//!       lines in order) passes and its text is stored under the target. A value that is not
//!       a valid regex simply fails.
//!
//!     A custom matcher attached to the pattern adds one more score. Confidence is the mean
//!     of all scores and a pattern matches when confidence is strictly above the threshold.
//!     A pattern with nothing to score never matches. Scoring never errors.
//!
//!     For Track patterns the first passing tag target also becomes `ui_role`.
//!
//!     Relate patterns are scored over component pairs through a [RelationEvaluator]. The
//!     default evaluator understands tag rules only (a value found in the second component);
//!     rules it returns `None` for are left out of the mean.

use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::definition::{PatternDefinition, PatternKind, Rule, RuleCommand};
use super::registry::PatternRegistry;
use crate::model::PropertyValue;

pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// A component as seen by the matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub component_id: usize,
    pub lines: Vec<String>,
}

impl Candidate {
    pub fn new(component_id: usize, lines: Vec<String>) -> Self {
        Self {
            component_id,
            lines,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub pattern_id: String,
    pub kind: PatternKind,
    pub matched: bool,
    pub confidence: f64,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl MatchResult {
    pub fn ui_role(&self) -> Option<&str> {
        match self.properties.get("ui_role") {
            Some(PropertyValue::Text(role)) => Some(role),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationMatch {
    pub pattern_id: String,
    pub from: usize,
    pub to: usize,
    pub confidence: f64,
}

/// Scores one rule of a Relate pattern for an ordered component pair.
pub trait RelationEvaluator: Send + Sync {
    /// `None` when the rule does not apply to pairs.
    fn evaluate(&self, rule: &Rule, from: &[String], to: &[String]) -> Option<f64>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TagRelationEvaluator;

impl RelationEvaluator for TagRelationEvaluator {
    fn evaluate(&self, rule: &Rule, _from: &[String], to: &[String]) -> Option<f64> {
        match rule.command {
            RuleCommand::Tag => Some(if contains_any(&rule.values, to) { 1.0 } else { 0.0 }),
            RuleCommand::Pluck => None,
        }
    }
}

pub struct PatternMatcher {
    threshold: f64,
    regexes: HashMap<String, Option<Regex>>,
    evaluator: Box<dyn RelationEvaluator>,
}

impl PatternMatcher {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            regexes: HashMap::new(),
            evaluator: Box::new(TagRelationEvaluator),
        }
    }

    /// A matcher with every pluck regex of `registry` compiled up front.
    pub fn compile(registry: &PatternRegistry, threshold: f64) -> Self {
        let mut matcher = Self::new(threshold);
        for definition in registry.iter() {
            for rule in &definition.rules {
                if rule.command != RuleCommand::Pluck {
                    continue;
                }
                for pattern in &rule.values {
                    matcher
                        .regexes
                        .entry(pattern.clone())
                        .or_insert_with(|| compile_regex(pattern));
                }
            }
        }
        tracing::debug!(regexes = matcher.regexes.len(), "pattern matcher compiled");
        matcher
    }

    pub fn with_evaluator<E: RelationEvaluator + 'static>(mut self, evaluator: E) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score one pattern against `lines`.
    pub fn evaluate(
        &self,
        registry: &PatternRegistry,
        definition: &PatternDefinition,
        lines: &[String],
    ) -> MatchResult {
        let mut scores = Vec::with_capacity(definition.rules.len() + 1);
        let mut properties = BTreeMap::new();

        for rule in &definition.rules {
            let passed = match rule.command {
                RuleCommand::Tag => {
                    let passed = contains_any(&rule.values, lines);
                    if passed {
                        properties.insert(format!("has_{}", rule.target), PropertyValue::Bool(true));
                        if definition.kind == PatternKind::Track
                            && !properties.contains_key("ui_role")
                        {
                            properties.insert(
                                "ui_role".to_string(),
                                PropertyValue::Text(rule.target.clone()),
                            );
                        }
                    }
                    passed
                }
                RuleCommand::Pluck => match self.first_capture(&rule.values, lines) {
                    Some(text) => {
                        properties.insert(rule.target.clone(), PropertyValue::Text(text));
                        true
                    }
                    None => false,
                },
            };
            scores.push(if passed { 1.0 } else { 0.0 });
        }

        if let Some(custom) = registry.matcher_for(&definition.id) {
            scores.push(clamp_score(custom.score(lines)));
        }

        let confidence = mean(&scores);
        MatchResult {
            pattern_id: definition.id.clone(),
            kind: definition.kind,
            matched: !scores.is_empty() && confidence > self.threshold,
            confidence,
            properties,
        }
    }

    /// Matching Track and Gather patterns, best first (ties by id).
    pub fn match_component(
        &self,
        registry: &PatternRegistry,
        candidate: &Candidate,
    ) -> Vec<MatchResult> {
        let mut results: Vec<MatchResult> = registry
            .iter()
            .filter(|d| d.kind.applies_to_components())
            .map(|d| self.evaluate(registry, d, &candidate.lines))
            .filter(|r| r.matched)
            .collect();
        results.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.pattern_id.cmp(&b.pattern_id))
        });
        results
    }

    /// Matching Relate patterns for the ordered pair `from -> to`, best first.
    pub fn match_relationship(
        &self,
        registry: &PatternRegistry,
        from: &Candidate,
        to: &Candidate,
    ) -> Vec<RelationMatch> {
        let mut results: Vec<RelationMatch> = registry
            .iter()
            .filter(|d| d.kind == PatternKind::Relate)
            .filter_map(|d| {
                let scores: Vec<f64> = d
                    .rules
                    .iter()
                    .filter_map(|rule| self.evaluator.evaluate(rule, &from.lines, &to.lines))
                    .map(clamp_score)
                    .collect();
                let confidence = mean(&scores);
                (!scores.is_empty() && confidence > self.threshold).then(|| RelationMatch {
                    pattern_id: d.id.clone(),
                    from: from.component_id,
                    to: to.component_id,
                    confidence,
                })
            })
            .collect();
        results.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.pattern_id.cmp(&b.pattern_id))
        });
        results
    }

    fn first_capture(&self, patterns: &[String], lines: &[String]) -> Option<String> {
        for pattern in patterns {
            let compiled;
            let regex = match self.regexes.get(pattern) {
                Some(cached) => cached.as_ref(),
                None => {
                    compiled = compile_regex(pattern);
                    compiled.as_ref()
                }
            };
            let Some(regex) = regex else {
                continue;
            };
            if let Some(found) = lines.iter().find_map(|line| regex.find(line)) {
                return Some(found.as_str().to_string());
            }
        }
        None
    }
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

fn compile_regex(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            tracing::debug!(pattern, error = %err, "pluck pattern is not a valid regex");
            None
        }
    }
}

fn contains_any(values: &[String], lines: &[String]) -> bool {
    values
        .iter()
        .filter(|v| !v.is_empty())
        .any(|v| lines.iter().any(|line| line.contains(v.as_str())))
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::registry::CustomMatcher;

    fn lines(rows: &[&str]) -> Vec<String> {
        rows.iter().map(|r| r.to_string()).collect()
    }

    fn button_registry() -> PatternRegistry {
        let mut registry = PatternRegistry::new();
        registry
            .register(
                PatternDefinition::new("button", PatternKind::Track)
                    .with_rule(Rule::tag("button", &["[", "]"])),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_tag_rule_sets_role() {
        let registry = button_registry();
        let matcher = PatternMatcher::compile(&registry, DEFAULT_THRESHOLD);
        let results = matcher.match_component(&registry, &Candidate::new(1, lines(&["[OK]"])));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].confidence, 1.0);
        assert_eq!(results[0].ui_role(), Some("button"));
        assert_eq!(
            results[0].properties.get("has_button"),
            Some(&PropertyValue::Bool(true))
        );
        assert!(matcher
            .match_component(&registry, &Candidate::new(2, lines(&["Name"])))
            .is_empty());
    }

    #[test]
    fn test_pluck_stores_first_match() {
        let registry = PatternRegistry::new();
        let definition = PatternDefinition::new("caption", PatternKind::Gather)
            .with_rule(Rule::pluck("caption", &["(", r"[A-Z][a-z]+"]));
        let result = PatternMatcher::default().evaluate(
            &registry,
            &definition,
            &lines(&["+--+", "[Save now]"]),
        );
        assert!(result.matched);
        assert_eq!(
            result.properties.get("caption"),
            Some(&PropertyValue::Text("Save".into()))
        );
    }

    #[test]
    fn test_half_is_not_a_match() {
        let registry = PatternRegistry::new();
        let definition = PatternDefinition::new("half", PatternKind::Track)
            .with_rule(Rule::tag("a", &["x"]))
            .with_rule(Rule::tag("b", &["y"]));
        let result = PatternMatcher::default().evaluate(&registry, &definition, &lines(&["x"]));
        assert_eq!(result.confidence, 0.5);
        assert!(!result.matched);
    }

    #[test]
    fn test_zero_rules_never_match() {
        let registry = PatternRegistry::new();
        let definition = PatternDefinition::new("empty", PatternKind::Track);
        let result = PatternMatcher::new(0.0).evaluate(&registry, &definition, &lines(&["x"]));
        assert_eq!(result.confidence, 0.0);
        assert!(!result.matched);
    }

    struct Fixed(f64);

    impl CustomMatcher for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn score(&self, _: &[String]) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_custom_matcher_is_clamped_into_the_mean() {
        let mut registry = button_registry();
        registry.attach_matcher("button", Box::new(Fixed(7.0))).unwrap();
        let result = PatternMatcher::default().evaluate(
            &registry,
            registry.get("button").unwrap(),
            &lines(&["plain"]),
        );
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_relationship_uses_tag_rules_only() {
        let mut registry = PatternRegistry::new();
        registry
            .register(
                PatternDefinition::new("labels", PatternKind::Relate)
                    .with_rule(Rule::tag("input", &["_"]))
                    .with_rule(Rule::pluck("ignored", &["zzz"])),
            )
            .unwrap();
        let matcher = PatternMatcher::compile(&registry, DEFAULT_THRESHOLD);
        let from = Candidate::new(0, lines(&["Name:"]));
        let to = Candidate::new(1, lines(&["[____]"]));

        let found = matcher.match_relationship(&registry, &from, &to);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].confidence, 1.0);
        assert!(matcher.match_relationship(&registry, &to, &from).is_empty());
    }

    #[test]
    fn test_sorted_by_confidence_then_id() {
        let mut registry = PatternRegistry::new();
        for id in ["b", "a"] {
            registry
                .register(
                    PatternDefinition::new(id, PatternKind::Gather).with_rule(Rule::tag("t", &["x"])),
                )
                .unwrap();
        }
        registry
            .register(
                PatternDefinition::new("c", PatternKind::Gather)
                    .with_rule(Rule::tag("t", &["x"]))
                    .with_rule(Rule::tag("u", &["x"]))
                    .with_rule(Rule::tag("v", &["nope"])),
            )
            .unwrap();
        let results =
            PatternMatcher::default().match_component(&registry, &Candidate::new(0, lines(&["x"])));
        let ids: Vec<&str> = results.iter().map(|r| r.pattern_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
