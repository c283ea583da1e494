//! Error types for diagram construction.

use thiserror::Error;

/// Errors that can occur while building an Apollonius diagram.
///
/// All of these are precondition violations: the input cannot produce a
/// topologically valid diagram, so no partial result is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagramError {
    /// The bounding rectangle has a non-finite corner or a non-positive size.
    #[error("invalid bounds: x={x}, y={y}, w={w}, h={h}")]
    InvalidBounds { x: f64, y: f64, w: f64, h: f64 },

    /// The segment density must be strictly positive and finite.
    #[error("segment density must be positive and finite, got {0}")]
    InvalidSegmentDensity(f64),

    /// A site has a non-finite coordinate.
    #[error("site {index} has a non-finite position")]
    InvalidPosition { index: usize },

    /// A site has a weight that is not strictly positive and finite.
    #[error("site {index} has an invalid weight {weight} (must be positive and finite)")]
    InvalidWeight { index: usize, weight: f64 },

    /// Two sites share the exact same position.
    #[error("sites {first} and {second} share the same position")]
    DuplicateSites { first: usize, second: usize },

    /// The blocked ranges along the edge between two sites kept merging past
    /// the iteration cap. This indicates malformed input.
    #[error("blocked ranges between sites {site} and {other} did not settle within {limit} merges")]
    BlockMergeLimit {
        site: usize,
        other: usize,
        limit: usize,
    },
}
