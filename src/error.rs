//! Error types for texture synthesis

use std::fmt;

/// Errors that can occur during texture synthesis
///
/// Every variant carries enough context (stage, offending cell or seed index)
/// to reproduce the failure with the same configuration. Stages never retry
/// internally: all stages are deterministic functions of their inputs, so
/// retrying with identical inputs would reproduce the identical error.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureError {
    /// Configuration validation failed before any stage ran
    InvalidConfig(String),
    /// Poisson-disc sampling could not place the requested number of seeds
    /// within the attempt budget
    SeedDensity {
        /// Number of seeds requested
        requested: usize,
        /// Number of seeds actually placed before the budget ran out
        placed: usize,
        /// Configured minimum pairwise distance
        min_distance: f32,
    },
    /// A polygon collapsed below 3 distinct vertices after epsilon cleanup
    DegenerateGeometry {
        /// Cell id the polygon belonged to, if known
        cell: Option<usize>,
        /// Number of distinct vertices that survived cleanup
        vertices: usize,
    },
    /// The partition's cell areas do not reconcile with the canvas area
    ///
    /// This is always a defect and is always surfaced, never corrected
    /// silently.
    PartitionIntegrity {
        /// Canvas area the cells should cover
        expected_area: f32,
        /// Sum of cell areas actually produced
        actual_area: f32,
    },
    /// The run was cancelled cooperatively between stages
    ///
    /// This is an outcome, not a defect: the caller asked the pipeline to
    /// stop and no partial data result is returned.
    Cancelled {
        /// Name of the stage that would have run next
        stage: &'static str,
    },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            TextureError::SeedDensity {
                requested,
                placed,
                min_distance,
            } => write!(
                f,
                "seed density infeasible: placed {} of {} seeds at min distance {}",
                placed, requested, min_distance
            ),
            TextureError::DegenerateGeometry { cell, vertices } => match cell {
                Some(id) => write!(
                    f,
                    "degenerate geometry in cell {}: {} distinct vertices after cleanup",
                    id, vertices
                ),
                None => write!(
                    f,
                    "degenerate geometry: {} distinct vertices after cleanup",
                    vertices
                ),
            },
            TextureError::PartitionIntegrity {
                expected_area,
                actual_area,
            } => write!(
                f,
                "partition integrity violated: cell areas sum to {} but canvas area is {}",
                actual_area, expected_area
            ),
            TextureError::Cancelled { stage } => {
                write!(f, "synthesis cancelled before stage '{}'", stage)
            }
        }
    }
}

impl std::error::Error for TextureError {}

/// Result type alias for texture synthesis operations
pub type Result<T> = std::result::Result<T, TextureError>;
