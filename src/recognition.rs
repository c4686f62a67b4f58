//! Geometric recognition
//!
//!     Turns a [Grid](crate::grid::Grid) into components and nests them.
//!
//!     1. [flood]: iterative flood fill. Finds maximal connected regions of a target glyph
//!        (or of any cell satisfying a predicate) without touching the source grid.
//!     2. [discovery]: runs flood fill twice, once over border glyphs (frames) and once over
//!        every other visible glyph (text runs).
//!     3. [containment]: builds the strict "box encloses box" relation, drops the edges
//!        implied by composition, and reads a forest off what remains.

pub mod component;
pub mod containment;
pub mod discovery;
pub mod flood;

pub use component::{Component, ComponentKind};
pub use containment::{ContainmentClusterer, ContainmentEdge, ContainmentForest};
pub use discovery::{discover_components, DiscoveryOptions};
pub use flood::{flood_fill, Connectivity, FloodFillEngine};
