//! Connected components produced by flood fill

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::grid::{BoundingBox, Grid, Point};

/// What a component was grown from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Grown from a single target glyph or an arbitrary predicate.
    Region,
    /// Grown from border glyphs (`+`, `-`, `|`, ...).
    Frame,
    /// Grown from any other visible glyph.
    Text,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Region => "region",
            ComponentKind::Frame => "frame",
            ComponentKind::Text => "text",
        }
    }
}

/// A maximal connected region of cells.
///
/// `boundary` and `interior` partition the region's cells: a boundary cell has at least one
/// orthogonal neighbour outside the region (or off the grid), an interior cell has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: usize,
    pub kind: ComponentKind,
    pub bounding_box: BoundingBox,
    pub boundary: BTreeSet<Point>,
    pub interior: BTreeSet<Point>,
    /// Glyph -> number of cells holding it.
    pub content: BTreeMap<char, usize>,
}

impl Component {
    /// Build a component from its cells. `cells` must be non-empty and connected.
    pub(crate) fn from_cells(
        id: usize,
        kind: ComponentKind,
        cells: &BTreeSet<Point>,
        grid: &Grid,
    ) -> Self {
        let mut boundary = BTreeSet::new();
        let mut interior = BTreeSet::new();
        let mut content = BTreeMap::new();
        let mut bounds: Option<BoundingBox> = None;

        for &cell in cells {
            match bounds.as_mut() {
                Some(b) => b.include(cell),
                None => bounds = Some(BoundingBox::at(cell)),
            }
            if let Some(glyph) = grid.get(cell) {
                *content.entry(glyph).or_insert(0) += 1;
            }
            if Self::touches_outside(cell, cells, grid) {
                boundary.insert(cell);
            } else {
                interior.insert(cell);
            }
        }

        Self {
            id,
            kind,
            bounding_box: bounds.unwrap_or_else(|| BoundingBox::at(Point::new(0, 0))),
            boundary,
            interior,
            content,
        }
    }

    fn touches_outside(cell: Point, cells: &BTreeSet<Point>, grid: &Grid) -> bool {
        let inside = grid.neighbours4(cell).filter(|n| cells.contains(n)).count();
        inside < 4
    }

    pub fn cell_count(&self) -> usize {
        self.boundary.len() + self.interior.len()
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.boundary.contains(point) || self.interior.contains(point)
    }

    /// All cells, boundary first.
    pub fn cells(&self) -> impl Iterator<Item = &Point> {
        self.boundary.iter().chain(self.interior.iter())
    }

    /// Number of distinct glyphs.
    pub fn distinct_glyphs(&self) -> usize {
        self.content.len()
    }

    /// The component's own cells drawn inside its bounding box, everything else blank.
    /// Trailing blanks are trimmed from each line.
    pub fn render_lines(&self, grid: &Grid) -> Vec<String> {
        let b = self.bounding_box;
        (b.y_min..=b.y_max)
            .map(|y| {
                let line: String = (b.x_min..=b.x_max)
                    .map(|x| {
                        let p = Point::new(x, y);
                        if self.contains(&p) {
                            grid.get(p).unwrap_or(' ')
                        } else {
                            ' '
                        }
                    })
                    .collect();
                line.trim_end().to_string()
            })
            .collect()
    }

    /// The rendered lines joined by newlines, trimmed.
    pub fn text(&self, grid: &Grid) -> String {
        self.render_lines(grid).join("\n").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_and_interior() {
        let grid = Grid::new(&["###", "###", "###"]).unwrap();
        let cells: BTreeSet<Point> = (0..3)
            .flat_map(|y| (0..3).map(move |x| Point::new(x, y)))
            .collect();
        let component = Component::from_cells(0, ComponentKind::Region, &cells, &grid);

        // Cells on the grid edge count as boundary: off-grid is outside.
        assert_eq!(component.interior, BTreeSet::from([Point::new(1, 1)]));
        assert_eq!(component.boundary.len(), 8);
        assert_eq!(component.bounding_box, BoundingBox::new(0, 0, 2, 2));
        assert_eq!(component.content.get(&'#'), Some(&9));
    }

    #[test]
    fn test_render_lines_blanks_foreign_cells() {
        let grid = Grid::new(&["+--+", "|ab|", "+--+"]).unwrap();
        let cells: BTreeSet<Point> = [(1, 1), (2, 1)]
            .into_iter()
            .map(|(x, y)| Point::new(x, y))
            .collect();
        let component = Component::from_cells(0, ComponentKind::Text, &cells, &grid);
        assert_eq!(component.render_lines(&grid), vec!["ab".to_string()]);
        assert_eq!(component.text(&grid), "ab");
    }
}
