//! Built-in training data
//!
//!     Each sample is a small ASCII snippet run through the same discovery and extraction
//!     the recognizer uses, so the vectors match what recognition produces for the same
//!     drawing. The largest component of each snippet is the labeled one.

use super::features::FeatureExtractor;
use super::TrainingSet;
use crate::grid::{normalize_lines, Grid};
use crate::recognition::{discover_components, DiscoveryOptions};

const SNIPPETS: &[(&str, &[&str])] = &[
    ("container", &["+----+", "|    |", "+----+"]),
    ("container", &["+--------+", "|        |", "|        |", "+--------+"]),
    ("container", &["+------------+", "|            |", "|            |", "|            |", "+------------+"]),
    ("container", &["+===+", "|   |", "+===+"]),
    ("container", &["+------------------+", "|                  |", "+------------------+"]),
    ("container", &[
        "+------------------------+",
        "|                        |",
        "|                        |",
        "+------------------------+",
    ]),
    ("button", &["[OK]"]),
    ("button", &["[Cancel]"]),
    ("button", &["[ Submit ]"]),
    ("button", &["<Back>"]),
    ("input", &["[______]"]),
    ("input", &["[__________]"]),
    ("input", &["____________"]),
    ("checkbox", &["[x]"]),
    ("checkbox", &["[ ]"]),
    ("checkbox", &["[X]"]),
    ("label", &["Name:"]),
    ("label", &["Hello world"]),
    ("label", &["Username"]),
    ("label", &["Total: 42"]),
    ("label", &["First-name:"]),
    ("label", &["Log-in"]),
    ("separator", &["--------"]),
    ("separator", &["========"]),
    ("separator", &["----------------"]),
];

/// Roles covered by [default_training_set], in first-seen order.
pub fn default_roles() -> Vec<&'static str> {
    let mut roles: Vec<&'static str> = Vec::new();
    for (role, _) in SNIPPETS {
        if !roles.contains(role) {
            roles.push(role);
        }
    }
    roles
}

/// The built-in samples extracted with default discovery and features.
pub fn default_training_set() -> TrainingSet {
    training_set_with(&DiscoveryOptions::default(), &FeatureExtractor::default())
}

/// The built-in samples extracted with the given discovery options and extractor.
pub fn training_set_with(options: &DiscoveryOptions, extractor: &FeatureExtractor) -> TrainingSet {
    let mut set = TrainingSet::new();
    for (role, rows) in SNIPPETS {
        let Ok(grid) = Grid::new(&normalize_lines(&rows.join("\n"))) else {
            continue;
        };
        let components = discover_components(&grid, options);
        let largest = components
            .iter()
            .rev()
            .max_by_key(|c| c.cell_count());
        if let Some(component) = largest {
            set.add(*role, extractor.extract(component, &grid));
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_snippet_yields_a_sample() {
        let set = default_training_set();
        assert_eq!(set.len(), SNIPPETS.len());
        assert_eq!(
            default_roles(),
            vec!["container", "button", "input", "checkbox", "label", "separator"]
        );
        assert_eq!(set.roles(), default_roles().as_slice());
    }

    #[test]
    fn test_container_sample_is_the_frame() {
        let set = default_training_set();
        let first = &set.samples()[0];
        assert_eq!(first[0], 6.0);
        assert_eq!(first[1], 3.0);
        assert_eq!(first[7], 1.0);
    }
}
