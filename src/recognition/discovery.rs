//! Component discovery
//!
//!     A diagram is read as two overlapping layers. Border glyphs (`+`, `-`, `|`, `=` by
//!     default) connect into frames; every other visible glyph connects into text runs. Text
//!     runs never leave their row. A single blank between two text glyphs on the same row is
//!     bridged so that `Sign in` is one run, while a wider gap separates runs.
//!
//!     A stretch of border glyphs with text glyphs directly on both sides of it in its row is
//!     part of the text, so `E-mail:` stays one run even right under a frame's top edge.
//!
//!     Frames are listed first, then text runs, and ids are renumbered across both lists so
//!     they index the combined vector.

use serde::{Deserialize, Serialize};

use super::component::{Component, ComponentKind};
use super::flood::{Connectivity, FloodFillEngine};
use crate::grid::{Grid, Point};

pub const DEFAULT_BORDER_CHARS: &str = "+-|=";

/// Knobs for [discover_components].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryOptions {
    pub border_chars: String,
    pub connectivity: Connectivity,
    pub bridge_single_spaces: bool,
    /// Components with fewer cells are dropped.
    pub min_cells: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            border_chars: DEFAULT_BORDER_CHARS.to_string(),
            connectivity: Connectivity::Four,
            bridge_single_spaces: true,
            min_cells: 1,
        }
    }
}

impl DiscoveryOptions {
    pub fn is_border(&self, glyph: char) -> bool {
        self.border_chars.contains(glyph)
    }

    fn is_text_glyph(&self, glyph: char) -> bool {
        !glyph.is_whitespace() && !self.is_border(glyph)
    }

    /// Whether the cell at `point` reads as text: a text glyph, or a border glyph embedded in
    /// a word.
    fn reads_as_text(&self, grid: &Grid, point: Point) -> bool {
        match grid.get(point) {
            Some(glyph) if self.is_border(glyph) => self.is_inline_border(grid, point),
            Some(glyph) => self.is_text_glyph(glyph),
            None => false,
        }
    }

    /// A border glyph whose run of border glyphs along the row has text glyphs on both ends.
    fn is_inline_border(&self, grid: &Grid, point: Point) -> bool {
        let glyph_at = |x: usize| grid.get(Point::new(x, point.y));
        let is_border_at = |x: usize| glyph_at(x).is_some_and(|g| self.is_border(g));
        let is_text_at = |x: usize| glyph_at(x).is_some_and(|g| self.is_text_glyph(g));

        let mut start = point.x;
        while start > 0 && is_border_at(start - 1) {
            start -= 1;
        }
        let mut end = point.x;
        while is_border_at(end + 1) {
            end += 1;
        }
        start > 0 && is_text_at(start - 1) && is_text_at(end + 1)
    }
}

/// Find frames and text runs in `grid`.
pub fn discover_components(grid: &Grid, options: &DiscoveryOptions) -> Vec<Component> {
    let engine = FloodFillEngine::new(options.connectivity);
    let runs = FloodFillEngine::new(Connectivity::Row);

    let frames = engine.find_components_where(grid, ComponentKind::Frame, |point, glyph| {
        options.is_border(glyph) && !options.is_inline_border(grid, point)
    });

    let texts = runs.find_components_where(grid, ComponentKind::Text, |point, glyph| {
        if options.reads_as_text(grid, point) {
            return true;
        }
        options.bridge_single_spaces && glyph == ' ' && is_bridged_gap(grid, point, options)
    });

    let components: Vec<Component> = frames
        .into_iter()
        .chain(texts)
        .filter(|c| c.cell_count() >= options.min_cells)
        .enumerate()
        .map(|(id, mut component)| {
            component.id = id;
            component
        })
        .collect();

    tracing::debug!(count = components.len(), "discovered components");
    components
}

fn is_bridged_gap(grid: &Grid, point: Point, options: &DiscoveryOptions) -> bool {
    if point.x == 0 {
        return false;
    }
    options.reads_as_text(grid, Point::new(point.x - 1, point.y))
        && options.reads_as_text(grid, Point::new(point.x + 1, point.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::BoundingBox;

    #[test]
    fn test_box_with_bracketed_text() {
        let grid = Grid::new(&["+----+", "|[OK]|", "+----+"]).unwrap();
        let components = discover_components(&grid, &DiscoveryOptions::default());

        assert_eq!(components.len(), 2);
        assert_eq!(components[0].kind, ComponentKind::Frame);
        assert_eq!(components[0].bounding_box, BoundingBox::new(0, 0, 5, 2));
        assert_eq!(components[0].cell_count(), 14);
        assert_eq!(components[1].kind, ComponentKind::Text);
        assert_eq!(components[1].id, 1);
        assert_eq!(components[1].bounding_box, BoundingBox::new(1, 1, 4, 1));
        assert_eq!(components[1].text(&grid), "[OK]");
    }

    #[test]
    fn test_single_spaces_are_bridged() {
        let grid = Grid::new(&["Sign in  now"]).unwrap();
        let components = discover_components(&grid, &DiscoveryOptions::default());
        let texts: Vec<String> = components.iter().map(|c| c.text(&grid)).collect();
        assert_eq!(texts, vec!["Sign in".to_string(), "now".to_string()]);
    }

    #[test]
    fn test_bridging_can_be_disabled() {
        let grid = Grid::new(&["a b"]).unwrap();
        let options = DiscoveryOptions {
            bridge_single_spaces: false,
            ..DiscoveryOptions::default()
        };
        assert_eq!(discover_components(&grid, &options).len(), 2);
    }

    #[test]
    fn test_hyphen_inside_a_word_is_text() {
        let grid = Grid::new(&["+----------+", "| E-mail:  |", "+----------+"]).unwrap();
        let components = discover_components(&grid, &DiscoveryOptions::default());

        assert_eq!(components.len(), 2);
        assert_eq!(components[0].kind, ComponentKind::Frame);
        assert_eq!(components[0].cell_count(), 26);
        assert_eq!(components[1].kind, ComponentKind::Text);
        assert_eq!(components[1].text(&grid), "E-mail:");
    }

    #[test]
    fn test_border_runs_touching_one_word_stay_borders() {
        let grid = Grid::new(&["Total----", "a--b  ==="]).unwrap();
        let components = discover_components(&grid, &DiscoveryOptions::default());
        let texts: Vec<String> = components
            .iter()
            .filter(|c| c.kind == ComponentKind::Text)
            .map(|c| c.text(&grid))
            .collect();
        assert_eq!(texts, vec!["Total".to_string(), "a--b".to_string()]);
    }

    #[test]
    fn test_stacked_words_are_separate_runs() {
        let grid = Grid::new(&["Name:", "[x]"]).unwrap();
        let components = discover_components(&grid, &DiscoveryOptions::default());
        let texts: Vec<String> = components.iter().map(|c| c.text(&grid)).collect();
        assert_eq!(texts, vec!["Name:".to_string(), "[x]".to_string()]);
    }

    #[test]
    fn test_min_cells_filter() {
        let grid = Grid::new(&["x   [Save]"]).unwrap();
        let options = DiscoveryOptions {
            min_cells: 2,
            ..DiscoveryOptions::default()
        };
        let components = discover_components(&grid, &options);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].id, 0);
        assert_eq!(components[0].text(&grid), "[Save]");
    }
}
