//! Flood fill
//!
//!     Both entry points grow regions with an explicit work stack. Grids can be large enough
//!     that a recursive fill would exhaust the call stack, so recursion is not an option here.
//!
//!     [flood_fill] is the classic paint-bucket: it rewrites the target glyph in place and
//!     uses the rewrite itself as the visited marker.
//!
//!     [FloodFillEngine] is the discovery variant. It keeps an explicit visited set so the
//!     source grid stays intact, scans in row-major order, and grows one component from every
//!     unvisited matching cell. Every matching cell ends up in exactly one component and
//!     components are maximal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::component::{Component, ComponentKind};
use crate::grid::{Grid, Point};

/// Which neighbours count as connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connectivity {
    /// Orthogonal neighbours only.
    #[default]
    Four,
    /// Orthogonal and diagonal neighbours.
    Eight,
    /// Same-row neighbours only, so every region is a horizontal run.
    Row,
}

impl Connectivity {
    fn neighbours(&self, grid: &Grid, point: Point) -> Vec<Point> {
        match self {
            Connectivity::Four => grid.neighbours4(point).collect(),
            Connectivity::Eight => grid.neighbours8(point).collect(),
            Connectivity::Row => grid.neighbours_row(point).collect(),
        }
    }
}

/// Replace the region of `target` glyphs connected to `start` with `replacement`.
///
/// Returns the number of cells rewritten. Nothing happens when `start` is off the grid, does
/// not hold `target`, or `target == replacement`.
pub fn flood_fill(
    grid: &mut Grid,
    start: Point,
    target: char,
    replacement: char,
    connectivity: Connectivity,
) -> usize {
    if target == replacement || grid.get(start) != Some(target) {
        return 0;
    }

    let mut filled = 0;
    let mut stack = vec![start];
    while let Some(point) = stack.pop() {
        if grid.get(point) != Some(target) {
            continue;
        }
        if grid.set(point, replacement).is_err() {
            continue;
        }
        filled += 1;
        stack.extend(
            connectivity
                .neighbours(grid, point)
                .into_iter()
                .filter(|n| grid.get(*n) == Some(target)),
        );
    }
    filled
}

/// Finds connected components without mutating the grid.
#[derive(Debug, Clone, Default)]
pub struct FloodFillEngine {
    connectivity: Connectivity,
}

impl FloodFillEngine {
    pub fn new(connectivity: Connectivity) -> Self {
        Self { connectivity }
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Every maximal region of `target`, in row-major order of each region's first cell.
    pub fn find_connected_components(&self, grid: &Grid, target: char) -> Vec<Component> {
        self.find_components_where(grid, ComponentKind::Region, |_, glyph| glyph == target)
    }

    /// Every maximal region of cells accepted by `predicate`.
    ///
    /// Component ids are assigned sequentially from zero in discovery order.
    pub fn find_components_where<F>(
        &self,
        grid: &Grid,
        kind: ComponentKind,
        mut predicate: F,
    ) -> Vec<Component>
    where
        F: FnMut(Point, char) -> bool,
    {
        let mut accepted = vec![vec![false; grid.width()]; grid.height()];
        for (y, row) in grid.rows().enumerate() {
            for (x, &glyph) in row.iter().enumerate() {
                accepted[y][x] = predicate(Point::new(x, y), glyph);
            }
        }

        let mut visited = vec![vec![false; grid.width()]; grid.height()];
        let mut components = Vec::new();

        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if !accepted[y][x] || visited[y][x] {
                    continue;
                }
                let cells = self.grow(grid, Point::new(x, y), &accepted, &mut visited);
                components.push(Component::from_cells(components.len(), kind, &cells, grid));
            }
        }

        tracing::debug!(
            count = components.len(),
            kind = kind.as_str(),
            "flood fill discovered components"
        );
        components
    }

    fn grow(
        &self,
        grid: &Grid,
        start: Point,
        accepted: &[Vec<bool>],
        visited: &mut [Vec<bool>],
    ) -> BTreeSet<Point> {
        let mut cells = BTreeSet::new();
        let mut stack = vec![start];
        visited[start.y][start.x] = true;

        while let Some(point) = stack.pop() {
            cells.insert(point);
            for next in self.connectivity.neighbours(grid, point) {
                if accepted[next.y][next.x] && !visited[next.y][next.x] {
                    visited[next.y][next.x] = true;
                    stack.push(next);
                }
            }
        }
        cells
    }
}
