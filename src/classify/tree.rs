//! Binary decision tree
//!
//!     The tree is fitted once from labeled feature vectors and stored as an arena of
//!     [DecisionNode]s with node 0 as the root. Fitting walks an explicit work stack: each
//!     pending entry owns the sample indices that reached it, the depth, and the arena slot
//!     reserved for it.
//!
//!     Split search is exhaustive and ordered. Features are tried in ascending index order
//!     and, per feature, every distinct sample value in ascending order is a candidate
//!     threshold (left side is `value <= threshold`). A candidate only replaces the current
//!     best when its information gain is strictly greater, so equal gains keep the first
//!     pair seen. Candidates that leave one side empty are skipped. A node becomes a leaf at
//!     the depth limit, when it is pure, or when no candidate separates its samples.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::features::FeatureVector;

/// Errors raised by fitting and prediction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FitError {
    #[error("the classifier has not been fitted")]
    NotFitted,
    #[error("cannot fit on an empty training set")]
    EmptyTrainingSet,
    #[error("{samples} samples but {labels} labels")]
    LengthMismatch { samples: usize, labels: usize },
    #[error("tree label {label} has no role name ({roles} roles known)")]
    UnknownLabel { label: usize, roles: usize },
}

/// One arena node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum DecisionNode {
    Leaf {
        label: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    max_depth: usize,
    nodes: Vec<DecisionNode>,
    n_features: usize,
}

struct Pending {
    samples: Vec<usize>,
    depth: usize,
    slot: usize,
}

struct Split {
    feature: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

impl DecisionTree {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            nodes: Vec::new(),
            n_features: 0,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[DecisionNode] {
        &self.nodes
    }

    /// Every label a leaf can predict.
    pub fn leaf_labels(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            DecisionNode::Leaf { label } => Some(*label),
            DecisionNode::Split { .. } => None,
        })
    }

    /// Fit the tree, replacing any previous fit.
    pub fn fit(&mut self, samples: &[FeatureVector], labels: &[usize]) -> Result<(), FitError> {
        if samples.is_empty() {
            return Err(FitError::EmptyTrainingSet);
        }
        if samples.len() != labels.len() {
            return Err(FitError::LengthMismatch {
                samples: samples.len(),
                labels: labels.len(),
            });
        }

        self.n_features = samples.iter().map(FeatureVector::len).max().unwrap_or(0);
        self.nodes = vec![DecisionNode::Leaf { label: 0 }];

        let mut stack = vec![Pending {
            samples: (0..samples.len()).collect(),
            depth: 0,
            slot: 0,
        }];

        while let Some(pending) = stack.pop() {
            let label = majority(&pending.samples, labels);
            let pure = pending.samples.iter().all(|&i| labels[i] == label);
            if pure || pending.depth >= self.max_depth {
                self.nodes[pending.slot] = DecisionNode::Leaf { label };
                continue;
            }

            let Some(split) = self.best_split(&pending.samples, samples, labels) else {
                self.nodes[pending.slot] = DecisionNode::Leaf { label };
                continue;
            };

            let left = self.nodes.len();
            let right = left + 1;
            self.nodes.push(DecisionNode::Leaf { label });
            self.nodes.push(DecisionNode::Leaf { label });
            self.nodes[pending.slot] = DecisionNode::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };

            stack.push(Pending {
                samples: split.right,
                depth: pending.depth + 1,
                slot: right,
            });
            stack.push(Pending {
                samples: split.left,
                depth: pending.depth + 1,
                slot: left,
            });
        }

        tracing::debug!(
            nodes = self.nodes.len(),
            depth = self.depth(),
            "decision tree fitted"
        );
        Ok(())
    }

    fn best_split(
        &self,
        indices: &[usize],
        samples: &[FeatureVector],
        labels: &[usize],
    ) -> Option<Split> {
        let parent = entropy(indices, labels);
        let total = indices.len() as f64;
        let mut best: Option<(f64, Split)> = None;

        for feature in 0..self.n_features {
            let mut thresholds: Vec<f64> =
                indices.iter().map(|&i| samples[i].get(feature)).collect();
            thresholds.sort_by(f64::total_cmp);
            thresholds.dedup();

            for threshold in thresholds {
                let (left, right): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| samples[i].get(feature) <= threshold);
                if left.is_empty() || right.is_empty() {
                    continue;
                }

                let weighted = (left.len() as f64 / total) * entropy(&left, labels)
                    + (right.len() as f64 / total) * entropy(&right, labels);
                let gain = parent - weighted;

                if best.as_ref().map_or(true, |(g, _)| gain > *g) {
                    best = Some((
                        gain,
                        Split {
                            feature,
                            threshold,
                            left,
                            right,
                        },
                    ));
                }
            }
        }
        best.map(|(_, split)| split)
    }

    pub fn predict(&self, vector: &FeatureVector) -> Result<usize, FitError> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                None => return Err(FitError::NotFitted),
                Some(DecisionNode::Leaf { label }) => return Ok(*label),
                Some(DecisionNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    index = if vector.get(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Number of edges on the longest root-to-leaf path; zero for a single leaf or an
    /// unfitted tree.
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Some(DecisionNode::Split { left, right, .. }) = self.nodes.get(index) {
                stack.push((*left, depth + 1));
                stack.push((*right, depth + 1));
            }
        }
        deepest
    }
}

impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nodes.is_empty() {
            return write!(f, "(unfitted)");
        }
        let mut stack = vec![(0usize, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            let pad = "  ".repeat(depth);
            match &self.nodes[index] {
                DecisionNode::Leaf { label } => writeln!(f, "{pad}leaf {label}")?,
                DecisionNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    writeln!(f, "{pad}x[{feature}] <= {threshold}")?;
                    stack.push((*right, depth + 1));
                    stack.push((*left, depth + 1));
                }
            }
        }
        Ok(())
    }
}

fn class_counts(indices: &[usize], labels: &[usize]) -> BTreeMap<usize, usize> {
    let mut counts = BTreeMap::new();
    for &i in indices {
        *counts.entry(labels[i]).or_insert(0) += 1;
    }
    counts
}

fn entropy(indices: &[usize], labels: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let total = indices.len() as f64;
    class_counts(indices, labels)
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Most frequent label; the smallest label wins ties.
fn majority(indices: &[usize], labels: &[usize]) -> usize {
    let mut best = (0, 0);
    for (label, count) in class_counts(indices, labels) {
        if count > best.1 {
            best = (label, count);
        }
    }
    best.0
}
