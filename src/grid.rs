//! Grid
//!
//!     A rectangular buffer of characters. The grid never pads: every row must have the same
//!     length or construction fails. Callers that read free-form text normalize it first with
//!     [normalize_lines].
//!
//!     Coordinates are `(x, y)` with `0 <= x < width` and `0 <= y < height`; `y` counts rows
//!     from the top.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("cell ({x}, {y}) is outside a {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// A cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An inclusive, axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: usize,
    pub y_min: usize,
    pub x_max: usize,
    pub y_max: usize,
}

impl BoundingBox {
    pub fn new(x_min: usize, y_min: usize, x_max: usize, y_max: usize) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// The single-cell box around `point`.
    pub fn at(point: Point) -> Self {
        Self::new(point.x, point.y, point.x, point.y)
    }

    /// Grow the box so it covers `point`.
    pub fn include(&mut self, point: Point) {
        self.x_min = self.x_min.min(point.x);
        self.y_min = self.y_min.min(point.y);
        self.x_max = self.x_max.max(point.x);
        self.y_max = self.y_max.max(point.y);
    }

    pub fn width(&self) -> usize {
        self.x_max - self.x_min + 1
    }

    pub fn height(&self) -> usize {
        self.y_max - self.y_min + 1
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    pub fn contains_point(&self, point: Point) -> bool {
        (self.x_min..=self.x_max).contains(&point.x) && (self.y_min..=self.y_max).contains(&point.y)
    }

    /// True when `other` lies strictly inside on all four sides. Shared or touching edges
    /// do not count.
    pub fn strictly_contains(&self, other: &BoundingBox) -> bool {
        self.x_min < other.x_min
            && self.y_min < other.y_min
            && self.x_max > other.x_max
            && self.y_max > other.y_max
    }

    /// Rows covered by both boxes, if any.
    pub fn rows_overlap(&self, other: &BoundingBox) -> bool {
        self.y_min <= other.y_max && other.y_min <= self.y_max
    }

    /// Columns covered by both boxes, if any.
    pub fn columns_overlap(&self, other: &BoundingBox) -> bool {
        self.x_min <= other.x_max && other.x_min <= self.x_max
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{} .. {},{}]",
            self.x_min, self.y_min, self.x_max, self.y_max
        )
    }
}

/// Rectangular character buffer with bounds-checked access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<char>>,
}

impl Grid {
    /// Build a grid from rows. Fails if rows differ in length.
    pub fn new<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let cells: Vec<Vec<char>> = rows.iter().map(|r| r.as_ref().chars().collect()).collect();
        let width = cells.first().map(|row| row.len()).unwrap_or(0);
        for (row, line) in cells.iter().enumerate() {
            if line.len() != width {
                return Err(GridError::Ragged {
                    row,
                    expected: width,
                    found: line.len(),
                });
            }
        }
        Ok(Self {
            width,
            height: cells.len(),
            cells,
        })
    }

    /// Build a grid from text, one row per line.
    pub fn from_text(text: &str) -> Result<Self, GridError> {
        let rows: Vec<&str> = text.lines().collect();
        Self::new(&rows)
    }

    /// A `width` x `height` grid filled with `fill`.
    pub fn blank(width: usize, height: usize, fill: char) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![fill; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    pub fn get(&self, point: Point) -> Option<char> {
        self.cells.get(point.y).and_then(|row| row.get(point.x)).copied()
    }

    pub fn set(&mut self, point: Point, value: char) -> Result<(), GridError> {
        if !self.in_bounds(point) {
            return Err(self.out_of_bounds(point));
        }
        self.cells[point.y][point.x] = value;
        Ok(())
    }

    /// Copy the cells under `bounds` into a new grid.
    pub fn region(&self, bounds: BoundingBox) -> Result<Grid, GridError> {
        self.check_box(bounds)?;
        let cells = self.cells[bounds.y_min..=bounds.y_max]
            .iter()
            .map(|row| row[bounds.x_min..=bounds.x_max].to_vec())
            .collect();
        Ok(Grid {
            width: bounds.width(),
            height: bounds.height(),
            cells,
        })
    }

    /// Overwrite the cells starting at `origin` with `patch`. The patch must fit entirely.
    pub fn replace_region(&mut self, origin: Point, patch: &Grid) -> Result<(), GridError> {
        if patch.is_empty() {
            return Ok(());
        }
        let bounds = BoundingBox::new(
            origin.x,
            origin.y,
            origin.x + patch.width - 1,
            origin.y + patch.height - 1,
        );
        self.check_box(bounds)?;
        for (dy, row) in patch.cells.iter().enumerate() {
            let target = &mut self.cells[origin.y + dy][origin.x..origin.x + patch.width];
            target.copy_from_slice(row);
        }
        Ok(())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.cells.iter().map(|row| row.as_slice())
    }

    pub fn row_string(&self, y: usize) -> Option<String> {
        self.cells.get(y).map(|row| row.iter().collect())
    }

    /// The 4 orthogonal neighbours of `point` that lie inside the grid.
    pub fn neighbours4(&self, point: Point) -> impl Iterator<Item = Point> + '_ {
        self.offsets(point, &[(0, -1), (-1, 0), (1, 0), (0, 1)])
    }

    /// The left and right neighbours of `point` that lie inside the grid.
    pub fn neighbours_row(&self, point: Point) -> impl Iterator<Item = Point> + '_ {
        self.offsets(point, &[(-1, 0), (1, 0)])
    }

    /// The 8 orthogonal and diagonal neighbours of `point` that lie inside the grid.
    pub fn neighbours8(&self, point: Point) -> impl Iterator<Item = Point> + '_ {
        self.offsets(
            point,
            &[
                (-1, -1),
                (0, -1),
                (1, -1),
                (-1, 0),
                (1, 0),
                (-1, 1),
                (0, 1),
                (1, 1),
            ],
        )
    }

    fn offsets<'a>(
        &'a self,
        point: Point,
        deltas: &'a [(isize, isize)],
    ) -> impl Iterator<Item = Point> + 'a {
        deltas.iter().filter_map(move |(dx, dy)| {
            let x = point.x.checked_add_signed(*dx)?;
            let y = point.y.checked_add_signed(*dy)?;
            let candidate = Point::new(x, y);
            self.in_bounds(candidate).then_some(candidate)
        })
    }

    fn check_box(&self, bounds: BoundingBox) -> Result<(), GridError> {
        let corner = Point::new(bounds.x_max, bounds.y_max);
        if bounds.x_min > bounds.x_max || bounds.y_min > bounds.y_max || !self.in_bounds(corner) {
            return Err(self.out_of_bounds(corner));
        }
        Ok(())
    }

    fn out_of_bounds(&self, point: Point) -> GridError {
        GridError::OutOfBounds {
            x: point.x,
            y: point.y,
            width: self.width,
            height: self.height,
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", row.iter().collect::<String>())?;
        }
        Ok(())
    }
}

/// Pad every line of `text` with spaces to the width of the widest line.
///
/// The grid itself refuses ragged input; this is the normalization callers apply before
/// handing free-form text to [Grid::new].
pub fn normalize_lines(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    lines
        .iter()
        .map(|line| {
            let mut padded = line.to_string();
            padded.extend(std::iter::repeat(' ').take(width - line.chars().count()));
            padded
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        Grid::new(&["+----+", "|[OK]|", "+----+"]).unwrap()
    }

    #[test]
    fn test_dimensions() {
        let grid = sample();
        assert_eq!(grid.width(), 6);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.get(Point::new(1, 1)), Some('['));
        assert_eq!(grid.get(Point::new(6, 0)), None);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let err = Grid::new(&["abc", "ab"]).unwrap_err();
        assert_eq!(
            err,
            GridError::Ragged {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_empty_grid() {
        let grid = Grid::from_text("").unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.get(Point::new(0, 0)), None);
    }

    #[test]
    fn test_set_out_of_bounds() {
        let mut grid = sample();
        assert!(grid.set(Point::new(2, 2), '=').is_ok());
        assert_eq!(grid.get(Point::new(2, 2)), Some('='));
        assert!(matches!(
            grid.set(Point::new(9, 0), 'x'),
            Err(GridError::OutOfBounds { x: 9, .. })
        ));
    }

    #[test]
    fn test_region_and_replace() {
        let mut grid = sample();
        let inner = grid.region(BoundingBox::new(1, 1, 4, 1)).unwrap();
        assert_eq!(inner.to_string(), "[OK]");

        let patch = Grid::new(&["ab"]).unwrap();
        grid.replace_region(Point::new(2, 1), &patch).unwrap();
        assert_eq!(grid.row_string(1).unwrap(), "|[ab]|");

        assert!(grid.replace_region(Point::new(5, 1), &patch).is_err());
        assert!(grid.region(BoundingBox::new(0, 0, 6, 0)).is_err());
    }

    #[test]
    fn test_strict_containment() {
        let outer = BoundingBox::new(0, 0, 5, 2);
        assert!(outer.strictly_contains(&BoundingBox::new(1, 1, 4, 1)));
        assert!(!outer.strictly_contains(&BoundingBox::new(0, 1, 4, 1)));
        assert!(!outer.strictly_contains(&outer));
    }

    #[test]
    fn test_neighbours_at_corner() {
        let grid = sample();
        let n4: Vec<Point> = grid.neighbours4(Point::new(0, 0)).collect();
        assert_eq!(n4, vec![Point::new(1, 0), Point::new(0, 1)]);
        assert_eq!(grid.neighbours8(Point::new(0, 0)).count(), 3);
        assert_eq!(grid.neighbours8(Point::new(2, 1)).count(), 8);
    }

    #[test]
    fn test_normalize_lines() {
        let lines = normalize_lines("ab\nabcd\n");
        assert_eq!(lines, vec!["ab  ".to_string(), "abcd".to_string()]);
        assert!(Grid::new(&lines).is_ok());
    }
}
