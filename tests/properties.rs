//! Property-based tests over the recognition and DSL stages
//!
//! Each block generates small random inputs and checks one invariant that must hold for
//! every input, not just the hand-picked samples in the unit tests.

use proptest::prelude::*;
use std::collections::BTreeSet;

use glyphic::dsl::{detokenize, parse, tokenize, Token, TokenKind};
use glyphic::grid::{BoundingBox, Grid, Point};
use glyphic::patterns::{PatternDefinition, PatternKind, PatternMatcher, PatternRegistry, Rule};
use glyphic::recognition::{Connectivity, ContainmentClusterer, FloodFillEngine};

fn grid_strategy() -> impl Strategy<Value = Vec<String>> {
    (1usize..8, 1usize..8).prop_flat_map(|(width, height)| {
        prop::collection::vec(
            prop::collection::vec(prop::sample::select(vec!['#', '.', '+']), width)
                .prop_map(|row| row.into_iter().collect::<String>()),
            height,
        )
    })
}

fn kinds_and_literals(tokens: &[Token]) -> Vec<(TokenKind, Option<String>)> {
    tokens
        .iter()
        .filter(|t| !t.kind.is_layout())
        .map(|t| (t.kind, t.literal.clone()))
        .collect()
}

/// One line built from pieces that lex to exactly one token each.
fn dsl_line_strategy() -> impl Strategy<Value = String> {
    let piece = prop::sample::select(vec![
        "<", ">", "[", "]", "{", "}", "(", ")", "=", ":", ",", "@@", "hunt", "Track", "GATHER",
        "param", "val", "x1", "snake_case", "42", "-3.5", "\"a b\"", "\"q\\\"uote\"", "\"\"",
    ]);
    prop::collection::vec(piece, 0..12).prop_map(|pieces| pieces.join(" "))
}

mod flood_fill_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_components_partition_target_cells(
            rows in grid_strategy(),
            connectivity in prop::sample::select(vec![
                Connectivity::Four,
                Connectivity::Eight,
                Connectivity::Row,
            ]),
        ) {
            let grid = Grid::new(&rows).unwrap();
            let components = FloodFillEngine::new(connectivity).find_connected_components(&grid, '#');

            let expected: BTreeSet<Point> = (0..grid.height())
                .flat_map(|y| (0..grid.width()).map(move |x| Point::new(x, y)))
                .filter(|p| grid.get(*p) == Some('#'))
                .collect();

            let mut union = BTreeSet::new();
            let mut total = 0;
            for component in &components {
                for cell in component.cells() {
                    union.insert(*cell);
                    total += 1;
                }
            }

            prop_assert_eq!(&union, &expected);
            // No cell belongs to two components.
            prop_assert_eq!(total, expected.len());
        }
    }
}

mod containment_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_nested_boxes_reduce_to_a_chain(
            inner in (0usize..4, 0usize..4),
            margins in prop::collection::vec(1usize..4, 8),
        ) {
            let c = BoundingBox::new(20, 20, 20 + inner.0, 20 + inner.1);
            let b = BoundingBox::new(
                c.x_min - margins[0],
                c.y_min - margins[1],
                c.x_max + margins[2],
                c.y_max + margins[3],
            );
            let a = BoundingBox::new(
                b.x_min - margins[4],
                b.y_min - margins[5],
                b.x_max + margins[6],
                b.y_max + margins[7],
            );

            let forest = ContainmentClusterer::new().cluster(&[c, a, b]);
            prop_assert!(forest.has_edge(1, 2));
            prop_assert!(forest.has_edge(2, 0));
            prop_assert!(!forest.has_edge(1, 0));
            prop_assert_eq!(forest.roots.clone(), vec![1]);
            prop_assert_eq!(forest.depth_first(), vec![1, 2, 0]);
        }
    }
}

mod confidence_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_confidence_is_bounded(
            tag_values in prop::collection::vec("[a-c\\[\\]]{0,2}", 0..4),
            pluck_values in prop::collection::vec("[a-c\\[\\]()*+]{0,3}", 0..3),
            lines in prop::collection::vec("[a-c\\[\\] ]{0,6}", 0..4),
        ) {
            let tags: Vec<&str> = tag_values.iter().map(String::as_str).collect();
            let plucks: Vec<&str> = pluck_values.iter().map(String::as_str).collect();

            let mut definition = PatternDefinition::new("p", PatternKind::Track)
                .with_rule(Rule::tag("t", &tags));
            if !plucks.is_empty() {
                definition = definition.with_rule(Rule::pluck("v", &plucks));
            }
            let mut registry = PatternRegistry::new();
            registry.register(definition.clone()).unwrap();

            let matcher = PatternMatcher::compile(&registry, 0.5);
            let result = matcher.evaluate(&registry, &definition, &lines);

            prop_assert!((0.0..=1.0).contains(&result.confidence));
            prop_assert_eq!(result.matched, result.confidence > 0.5);
        }
    }

    #[test]
    fn test_pattern_without_rules_never_matches() {
        let definition = PatternDefinition::new("empty", PatternKind::Track);
        let mut registry = PatternRegistry::new();
        registry.register(definition.clone()).unwrap();
        let result =
            PatternMatcher::default().evaluate(&registry, &definition, &["anything".to_string()]);
        assert!(!result.matched);
        assert_eq!(result.confidence, 0.0);
    }
}

mod tokenizer_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_tokenizer_accepts_anything(source in "\\PC{0,40}(\n[ \t]{0,9}\\PC{0,20}){0,5}") {
            let tokens = tokenize(&source);
            let indents = tokens.iter().filter(|t| t.kind == TokenKind::Indent).count();
            let dedents = tokens.iter().filter(|t| t.kind == TokenKind::Dedent).count();
            prop_assert_eq!(indents, dedents);
        }

        #[test]
        fn test_detokenize_relexes_to_the_same_stream(
            lines in prop::collection::vec((0usize..3, dsl_line_strategy()), 1..6),
        ) {
            let source = lines
                .iter()
                .map(|(depth, line)| format!("{}{}", "    ".repeat(*depth), line))
                .collect::<Vec<_>>()
                .join("\n");
            let tokens = tokenize(&source);
            let again = tokenize(&detokenize(&tokens));
            prop_assert_eq!(kinds_and_literals(&again), kinds_and_literals(&tokens));
        }
    }

    #[test]
    fn test_sample_round_trip_is_deterministic() {
        let source =
            r#"< hunt Track:sample [INIT GATHER = {param tag:button = (val "[","]")}] ><EXEC>"#;
        let original = parse(&tokenize(source)).unwrap();

        let first = parse(&tokenize(&detokenize(&tokenize(source)))).unwrap();
        let second = parse(&tokenize(&detokenize(&tokenize(source)))).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, original);
    }
}
