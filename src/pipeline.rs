//! Recognition pipeline
//!
//!     [Recognizer::recognize] runs every stage over one grid, each to completion:
//!
//!         discover -> cluster -> classify -> match -> model -> adjacency -> relate
//!
//!     The classifier's role is a first guess. When a Track or Gather pattern matches, the
//!     best one (highest confidence, then lowest id) overrides the role and supplies the
//!     properties; other matching Gather patterns add properties without overwriting.
//!
//!     Node `i` of the model is component `i`. Containment edges become `contains`
//!     relationships, the forest becomes the tree, and Relate patterns are tried on every
//!     adjacent or containing pair, recorded under the pattern id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::classify::{Classifier, FeatureExtractor, DEFAULT_MAX_DEPTH};
use crate::codegen::{GenerationOptions, TemplateRegistry};
use crate::dsl::{load_patterns, InterpreterOptions, LoadReport};
use crate::error::{Error, Warning};
use crate::grid::{normalize_lines, Grid};
use crate::model::{ComponentId, ComponentModel, PropertyValue};
use crate::patterns::{Candidate, MatchResult, PatternKind, PatternMatcher, PatternRegistry};
use crate::recognition::{
    discover_components, Component, ContainmentClusterer, ContainmentForest, DiscoveryOptions,
};

pub const DEFAULT_ADJACENCY_GAP: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerOptions {
    pub discovery: DiscoveryOptions,
    /// Largest blank gap, in cells, between adjacent siblings.
    pub adjacency_gap: usize,
    pub match_threshold: f64,
}

impl Default for RecognizerOptions {
    fn default() -> Self {
        Self {
            discovery: DiscoveryOptions::default(),
            adjacency_gap: DEFAULT_ADJACENCY_GAP,
            match_threshold: crate::patterns::DEFAULT_THRESHOLD,
        }
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct Recognition {
    pub model: ComponentModel,
    pub components: Vec<Component>,
    pub forest: ContainmentForest,
    /// Matching Track/Gather results per component, best first.
    pub matches: Vec<Vec<MatchResult>>,
    pub warnings: Vec<Warning>,
}

pub struct Recognizer {
    registry: PatternRegistry,
    classifier: Classifier,
    options: RecognizerOptions,
    extractor: FeatureExtractor,
    matcher: PatternMatcher,
    templates: TemplateRegistry,
    generation: GenerationOptions,
}

impl Recognizer {
    pub fn new(registry: PatternRegistry, classifier: Classifier, options: RecognizerOptions) -> Self {
        let matcher = PatternMatcher::compile(&registry, options.match_threshold);
        let extractor = FeatureExtractor::new(options.discovery.border_chars.clone());
        Self {
            registry,
            classifier,
            options,
            extractor,
            matcher,
            templates: TemplateRegistry::with_defaults(),
            generation: GenerationOptions::default(),
        }
    }

    /// No patterns, the default classifier and default options.
    pub fn with_defaults() -> Result<Self, Error> {
        let classifier = Classifier::with_defaults(DEFAULT_MAX_DEPTH)?;
        Ok(Self::new(
            PatternRegistry::new(),
            classifier,
            RecognizerOptions::default(),
        ))
    }

    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_generation_options(mut self, generation: GenerationOptions) -> Self {
        self.generation = generation;
        self
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn options(&self) -> &RecognizerOptions {
        &self.options
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Interpret pattern source into this recognizer's registry.
    pub fn load_patterns(&mut self, source: &str, options: &InterpreterOptions) -> LoadReport {
        let report = load_patterns(source, &mut self.registry, options);
        self.matcher = PatternMatcher::compile(&self.registry, self.options.match_threshold);
        report
    }

    pub fn recognize(&self, grid: &Grid) -> Result<Recognition, Error> {
        let components = discover_components(grid, &self.options.discovery);
        let boxes: Vec<_> = components.iter().map(|c| c.bounding_box).collect();
        let forest = ContainmentClusterer::new().cluster(&boxes);

        let vectors = self.extractor.extract_batch(&components, grid);
        let mut roles = Vec::with_capacity(components.len());
        for vector in &vectors {
            roles.push(self.classifier.classify(vector)?.to_string());
        }

        let mut warnings = Vec::new();
        let mut model = ComponentModel::new();
        let mut matches = Vec::with_capacity(components.len());
        for (component, role) in components.iter().zip(roles) {
            let candidate = Candidate::new(component.id, component.render_lines(grid));
            let results = self.matcher.match_component(&self.registry, &candidate);

            let id = model.add(role, component.bounding_box, candidate.lines);
            if let Some(node) = model.get_mut(id) {
                node.properties.insert(
                    "kind".to_string(),
                    PropertyValue::Text(component.kind.as_str().to_string()),
                );
                if let Some(warning) = apply_matches(node, &results) {
                    warnings.push(warning);
                }
            }
            matches.push(results);
        }

        for node in forest.depth_first() {
            if let Some(parent) = forest.parent[node] {
                model.attach(ComponentId(parent), ComponentId(node))?;
            }
        }
        model.sort_by_position();
        for edge in &forest.edges {
            model.add_relationship(
                ComponentId(edge.container),
                "contains",
                ComponentId(edge.contained),
            )?;
        }

        let mut pairs: BTreeSet<(ComponentId, ComponentId)> = model
            .analyze_adjacency(self.options.adjacency_gap)
            .into_iter()
            .collect();
        pairs.extend(
            forest
                .edges
                .iter()
                .map(|e| (ComponentId(e.container), ComponentId(e.contained))),
        );
        let related = self.relate(&mut model, &pairs)?;

        let applied = matches.iter().filter(|m| !m.is_empty()).count();
        tracing::info!(
            components = components.len(),
            matched = applied,
            relations = related,
            warnings = warnings.len(),
            "grid recognized"
        );

        Ok(Recognition {
            model,
            components,
            forest,
            matches,
            warnings,
        })
    }

    fn relate(
        &self,
        model: &mut ComponentModel,
        pairs: &BTreeSet<(ComponentId, ComponentId)>,
    ) -> Result<usize, Error> {
        if !self.registry.iter().any(|d| d.kind == PatternKind::Relate) {
            return Ok(0);
        }
        let candidate = |model: &ComponentModel, id: ComponentId| {
            Candidate::new(
                id.0,
                model.get(id).map(|n| n.text.clone()).unwrap_or_default(),
            )
        };

        let mut found = Vec::new();
        for &(from, to) in pairs {
            let (a, b) = (candidate(&*model, from), candidate(&*model, to));
            for result in self.matcher.match_relationship(&self.registry, &a, &b) {
                found.push((from, result.pattern_id, to));
            }
        }
        let count = found.len();
        for (from, kind, to) in found {
            model.add_relationship(from, kind, to)?;
        }
        Ok(count)
    }

    /// Render a recognized model with the named template set.
    pub fn generate(&self, model: &ComponentModel, template_set: &str) -> Result<String, Error> {
        Ok(self.templates.generate(model, template_set, &self.generation)?)
    }

    /// Recognize free-form diagram text and render it in one step.
    pub fn compile(&self, source_text: &str, template_set: &str) -> Result<String, Error> {
        let grid = Grid::new(&normalize_lines(source_text))?;
        let recognition = self.recognize(&grid)?;
        self.generate(&recognition.model, template_set)
    }
}

/// Apply the best match to `node`. Returns a warning when the best two tie with
/// different roles.
fn apply_matches(
    node: &mut crate::model::AbstractComponent,
    results: &[MatchResult],
) -> Option<Warning> {
    let top = results.first()?;
    if let Some(role) = top.ui_role() {
        node.ui_role = role.to_string();
    }
    for (key, value) in &top.properties {
        node.properties.insert(key.clone(), value.clone());
    }
    node.properties.insert(
        "pattern".to_string(),
        PropertyValue::Text(top.pattern_id.clone()),
    );
    node.properties.insert(
        "confidence".to_string(),
        PropertyValue::Number(top.confidence),
    );

    for extra in results[1..].iter().filter(|r| r.kind == PatternKind::Gather) {
        for (key, value) in &extra.properties {
            node.properties
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    let runner_up = results.get(1)?;
    let ambiguous = runner_up.confidence == top.confidence
        && runner_up.ui_role().is_some()
        && runner_up.ui_role() != top.ui_role();
    ambiguous.then(|| {
        Warning::new(format!(
            "component {} matches `{}` and `{}` equally; using `{}`",
            node.id, top.pattern_id, runner_up.pattern_id, top.pattern_id
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUTTON_PATTERN: &str =
        "< hunt Track:button [INIT GATHER = {param tag:button = (val \"[\", \"]\")}] >\n";

    fn ok_grid() -> Grid {
        Grid::new(&["+----+", "|[OK]|", "+----+"]).unwrap()
    }

    #[test]
    fn test_recognize_without_patterns() {
        let recognizer = Recognizer::with_defaults().unwrap();
        let recognition = recognizer.recognize(&ok_grid()).unwrap();
        let model = &recognition.model;

        assert_eq!(model.len(), 2);
        assert_eq!(model.roots(), &[ComponentId(0)]);
        assert_eq!(model.children(ComponentId(0)), &[ComponentId(1)]);
        assert_eq!(model.get(ComponentId(0)).unwrap().ui_role, "container");
        assert_eq!(
            model.relationships_of(ComponentId(0))[0].kind,
            "contains"
        );
        assert!(recognition.forest.has_edge(0, 1));
        assert!(recognition.warnings.is_empty());
    }

    #[test]
    fn test_pattern_overrides_role() {
        let mut recognizer = Recognizer::with_defaults().unwrap();
        let report = recognizer.load_patterns(BUTTON_PATTERN, &InterpreterOptions::default());
        assert!(report.is_clean(), "{:?}", report.errors);

        let recognition = recognizer.recognize(&ok_grid()).unwrap();
        let button = recognition.model.get(ComponentId(1)).unwrap();
        assert_eq!(button.ui_role, "button");
        assert_eq!(
            button.property("confidence"),
            Some(&PropertyValue::Number(1.0))
        );
        assert_eq!(button.property("pattern"), Some(&PropertyValue::Text("button".into())));
        assert_eq!(recognition.matches[1][0].confidence, 1.0);
        assert!(recognition.matches[0].is_empty());
    }

    #[test]
    fn test_gather_properties_do_not_override() {
        let mut node = {
            let mut model = ComponentModel::new();
            model.add("label", crate::grid::BoundingBox::new(0, 0, 3, 0), vec![]);
            model.get(ComponentId(0)).unwrap().clone()
        };
        let result = |id: &str, kind, key: &str, value: &str, confidence| MatchResult {
            pattern_id: id.to_string(),
            kind,
            matched: true,
            confidence,
            properties: [(key.to_string(), PropertyValue::Text(value.to_string()))]
                .into_iter()
                .collect(),
        };
        let results = vec![
            result("a", PatternKind::Track, "label", "first", 1.0),
            result("b", PatternKind::Gather, "label", "second", 1.0),
            result("c", PatternKind::Gather, "name", "extra", 0.75),
        ];
        assert!(apply_matches(&mut node, &results).is_none());
        assert_eq!(node.property("label"), Some(&PropertyValue::Text("first".into())));
        assert_eq!(node.property("name"), Some(&PropertyValue::Text("extra".into())));
    }

    #[test]
    fn test_compile_html() {
        let mut recognizer = Recognizer::with_defaults().unwrap();
        recognizer.load_patterns(BUTTON_PATTERN, &InterpreterOptions::default());
        let out = recognizer.compile("+----+\n|[OK]|\n+----+\n", "html").unwrap();
        assert!(out.contains("<button id=\"w1\">OK</button>"));
    }

    #[test]
    fn test_compile_unknown_set() {
        let recognizer = Recognizer::with_defaults().unwrap();
        let err = recognizer.compile("[OK]", "qt").unwrap_err();
        assert!(matches!(err, Error::Codegen(_)));
    }
}
