//! Feature extraction
//!
//!     Every component becomes a fixed-order numeric vector. The first
//!     [BASE_FEATURES] columns are always present; [FeatureProbe]s append
//!     extension columns, and [FeatureExtractor::extract_batch] zero-pads so all vectors in one
//!     batch share a length.

use serde::{Deserialize, Serialize};
use std::ops::Index;

use crate::grid::Grid;
use crate::recognition::discovery::DEFAULT_BORDER_CHARS;
use crate::recognition::Component;

/// Column names of the base features, in order.
pub const FEATURE_NAMES: [&str; 11] = [
    "width",
    "height",
    "area",
    "aspect_ratio",
    "border_density",
    "content_density",
    "distinct_chars",
    "border_glyph_ratio",
    "bracket_ratio",
    "underscore_ratio",
    "alnum_ratio",
];

pub const BASE_FEATURES: usize = FEATURE_NAMES.len();

const BRACKETS: &str = "[](){}<>";

/// A component's features.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(pub Vec<f64>);

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The value at `index`, or `0.0` past the end (missing extension slots read as zero).
    pub fn get(&self, index: usize) -> f64 {
        self.0.get(index).copied().unwrap_or(0.0)
    }

    pub fn pad_to(&mut self, len: usize) {
        if self.0.len() < len {
            self.0.resize(len, 0.0);
        }
    }
}

impl Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        FeatureVector(values)
    }
}

/// Extra feature columns computed by the host.
pub trait FeatureProbe: Send + Sync {
    fn name(&self) -> &str;

    fn probe(&self, component: &Component, grid: &Grid) -> Vec<f64>;
}

/// Derives [FeatureVector]s from components.
pub struct FeatureExtractor {
    border_chars: String,
    probes: Vec<Box<dyn FeatureProbe>>,
}

impl FeatureExtractor {
    pub fn new(border_chars: impl Into<String>) -> Self {
        Self {
            border_chars: border_chars.into(),
            probes: Vec::new(),
        }
    }

    pub fn with_probe<P: FeatureProbe + 'static>(mut self, probe: P) -> Self {
        self.probes.push(Box::new(probe));
        self
    }

    /// Base features followed by every probe's columns.
    pub fn extract(&self, component: &Component, grid: &Grid) -> FeatureVector {
        let bounds = component.bounding_box;
        let width = bounds.width() as f64;
        let height = bounds.height() as f64;
        let area = width * height;
        let cells = component.cell_count().max(1) as f64;

        let count_where = |pred: &dyn Fn(char) -> bool| -> f64 {
            component
                .content
                .iter()
                .filter(|(glyph, _)| pred(**glyph))
                .map(|(_, n)| *n)
                .sum::<usize>() as f64
        };

        let mut values = vec![
            width,
            height,
            area,
            width / height.max(1.0),
            component.boundary.len() as f64 / (2.0 * (width + height)),
            component.interior.len() as f64 / area,
            component.distinct_glyphs() as f64,
            count_where(&|g| self.border_chars.contains(g)) / cells,
            count_where(&|g| BRACKETS.contains(g)) / cells,
            count_where(&|g| g == '_') / cells,
            count_where(&|g| g.is_alphanumeric()) / cells,
        ];

        for probe in &self.probes {
            values.extend(probe.probe(component, grid));
        }
        FeatureVector(values)
    }

    /// Extract a whole batch and zero-pad every vector to the longest one.
    pub fn extract_batch(&self, components: &[Component], grid: &Grid) -> Vec<FeatureVector> {
        let mut vectors: Vec<FeatureVector> =
            components.iter().map(|c| self.extract(c, grid)).collect();
        let len = vectors.iter().map(FeatureVector::len).max().unwrap_or(0);
        for vector in &mut vectors {
            vector.pad_to(len);
        }
        vectors
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_BORDER_CHARS)
    }
}
