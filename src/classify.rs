//! UI-role classification
//!
//!     Components are turned into [FeatureVector]s by the [FeatureExtractor] and labeled by a
//!     [DecisionTree]. The tree works on numeric labels; [Classifier] keeps the role names
//!     alongside it so callers deal in strings.
//!
//!     [training] holds the built-in sample set the default recognizer is trained on.

pub mod features;
pub mod training;
pub mod tree;

pub use features::{FeatureExtractor, FeatureProbe, FeatureVector, BASE_FEATURES, FEATURE_NAMES};
pub use tree::{DecisionNode, DecisionTree, FitError};

pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Labeled feature vectors, with role names interned to tree labels.
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    roles: Vec<String>,
    samples: Vec<FeatureVector>,
    labels: Vec<usize>,
}

impl TrainingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, role: impl Into<String>, vector: FeatureVector) {
        let role = role.into();
        let label = match self.roles.iter().position(|r| *r == role) {
            Some(label) => label,
            None => {
                self.roles.push(role);
                self.roles.len() - 1
            }
        };
        self.samples.push(vector);
        self.labels.push(label);
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn samples(&self) -> &[FeatureVector] {
        &self.samples
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A fitted tree plus its role vocabulary.
#[derive(Debug, Clone)]
pub struct Classifier {
    roles: Vec<String>,
    tree: DecisionTree,
}

impl Classifier {
    pub fn train(set: &TrainingSet, max_depth: usize) -> Result<Self, FitError> {
        let mut tree = DecisionTree::new(max_depth);
        tree.fit(set.samples(), set.labels())?;
        tracing::info!(
            samples = set.len(),
            roles = set.roles().len(),
            depth = tree.depth(),
            "classifier trained"
        );
        Self::from_tree(tree, set.roles().to_vec())
    }

    /// Pair an already fitted tree with role names, indexed by tree label.
    pub fn from_tree(tree: DecisionTree, roles: Vec<String>) -> Result<Self, FitError> {
        if !tree.is_fitted() {
            return Err(FitError::NotFitted);
        }
        if let Some(label) = tree.leaf_labels().find(|&label| label >= roles.len()) {
            return Err(FitError::UnknownLabel {
                label,
                roles: roles.len(),
            });
        }
        Ok(Self { roles, tree })
    }

    /// Trained on [training::default_training_set].
    pub fn with_defaults(max_depth: usize) -> Result<Self, FitError> {
        Self::train(&training::default_training_set(), max_depth)
    }

    pub fn classify(&self, vector: &FeatureVector) -> Result<&str, FitError> {
        let label = self.tree.predict(vector)?;
        self.roles
            .get(label)
            .map(String::as_str)
            .ok_or(FitError::UnknownLabel {
                label,
                roles: self.roles.len(),
            })
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn tree(&self) -> &DecisionTree {
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::recognition::{discover_components, DiscoveryOptions};

    #[test]
    fn test_training_set_interns_roles() {
        let mut set = TrainingSet::new();
        set.add("button", FeatureVector(vec![1.0]));
        set.add("label", FeatureVector(vec![2.0]));
        set.add("button", FeatureVector(vec![3.0]));
        assert_eq!(set.roles(), &["button".to_string(), "label".to_string()]);
        assert_eq!(set.labels(), &[0, 1, 0]);
    }

    #[test]
    fn test_empty_training_set_fails() {
        assert_eq!(
            Classifier::train(&TrainingSet::new(), 4).unwrap_err(),
            FitError::EmptyTrainingSet
        );
    }

    #[test]
    fn test_labels_without_role_names_are_rejected() {
        let mut tree = DecisionTree::new(4);
        tree.fit(
            &[FeatureVector(vec![1.0]), FeatureVector(vec![5.0])],
            &[0, 1],
        )
        .unwrap();

        let err = Classifier::from_tree(tree.clone(), vec!["button".into()]).unwrap_err();
        assert_eq!(err, FitError::UnknownLabel { label: 1, roles: 1 });

        let classifier = Classifier::from_tree(tree, vec!["button".into(), "label".into()]).unwrap();
        assert_eq!(classifier.classify(&FeatureVector(vec![6.0])).unwrap(), "label");
    }

    #[test]
    fn test_unfitted_tree_is_rejected() {
        let err = Classifier::from_tree(DecisionTree::new(4), vec!["button".into()]).unwrap_err();
        assert_eq!(err, FitError::NotFitted);
    }

    #[test]
    fn test_default_classifier_labels_training_snippets() {
        let classifier = Classifier::with_defaults(DEFAULT_MAX_DEPTH).unwrap();
        let extractor = FeatureExtractor::default();
        let grid = Grid::new(&["+----+", "|[OK]|", "+----+"]).unwrap();
        let components = discover_components(&grid, &DiscoveryOptions::default());

        let frame = extractor.extract(&components[0], &grid);
        let text = extractor.extract(&components[1], &grid);
        assert_eq!(classifier.classify(&frame).unwrap(), "container");
        assert_eq!(classifier.classify(&text).unwrap(), "button");
        assert_eq!(
            classifier.classify(&text).unwrap(),
            classifier.classify(&text).unwrap()
        );
    }
}
