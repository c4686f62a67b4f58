//! # glyphic
//!
//! Recognizes user-interface structure inside ASCII-art diagrams and compiles it into
//! target-toolkit source code.
//!
//! The Pipeline
//!
//!     1. [grid]: a rectangular character buffer, loaded once before anything runs.
//!     2. [recognition]: flood fill partitions the grid into frames (border glyphs) and text
//!        runs, then the containment clusterer nests them into a forest.
//!     3. [classify]: a feature vector per component feeds a small decision tree that
//!        assigns each component a UI role.
//!     4. [dsl] and [patterns]: pattern definitions written in the bracket DSL are
//!        interpreted into a [patterns::PatternRegistry]; the matcher scores them against
//!        each component and the best match overrides the tree's guess.
//!     5. [model]: the recognized components as an arena-backed tree with relationships.
//!     6. [codegen]: a template set walks the model and emits toolkit source.
//!
//!     [pipeline::Recognizer] strings the stages together. Every stage consumes its
//!     predecessor's output completely before the next one starts.
//!
//! Errors
//!
//!     Each module owns its error enum. [Error] aggregates them for the pipeline. Lexing and
//!     pattern scoring never fail; parsing, registration and lookups fail immediately.

pub mod classify;
pub mod codegen;
pub mod dsl;
pub mod error;
pub mod grid;
pub mod model;
pub mod patterns;
pub mod pipeline;
pub mod recognition;

pub use error::{Error, Warning};
pub use grid::{BoundingBox, Grid, Point};
pub use pipeline::{Recognition, Recognizer, RecognizerOptions};
