//! Synthesis pipeline orchestration
//!
//! Runs the stages in their fixed order: validate, seed generation,
//! tessellation, attribute assignment, rasterization. All randomness flows
//! through one stream keyed by the configured random seed, so a given
//! configuration always produces the identical result bundle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::attributes::{self, CellAttributes};
use crate::config::TextureConfig;
use crate::error::{Result, TextureError};
use crate::generation::{generate_seeds, tessellate};
use crate::geom::Rect;
use crate::partition::Partition;
use crate::raster::{rasterize, Raster};
use crate::stream::RandomStream;

/// Cooperative cancellation handle
///
/// Cheap to clone and share across threads; the pipeline polls it between
/// stages. Cancellation never yields a partial result.
///
/// # Example
///
/// ```rust
/// use texture_genius::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// assert!(!handle.is_cancelled());
/// token.cancel();
/// assert!(handle.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Pipeline stages, reported to the progress callback as each begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    /// Generating seed points
    Seeding,
    /// Building the cell partition
    Tessellating,
    /// Assigning per-cell attributes
    Assigning,
    /// Rendering the output raster
    Rasterizing,
}

impl ProgressStage {
    /// Get a human-readable name for this stage
    pub fn name(&self) -> &'static str {
        match self {
            ProgressStage::Seeding => "seed generation",
            ProgressStage::Tessellating => "tessellation",
            ProgressStage::Assigning => "attribute assignment",
            ProgressStage::Rasterizing => "rasterization",
        }
    }
}

/// The complete output bundle of one synthesis run
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisResult {
    /// The rendered RGBA image
    pub raster: Raster,
    /// The cell partition with seeds, polygons and adjacency
    pub partition: Partition,
    /// The per-cell attribute records
    pub attributes: CellAttributes,
}

/// Run the full synthesis pipeline
///
/// # Errors
///
/// Returns `InvalidConfig` before any stage runs when the configuration is
/// invalid, and propagates `SeedDensity`, `DegenerateGeometry` and
/// `PartitionIntegrity` from the stages.
///
/// # Example
///
/// ```rust
/// use texture_genius::*;
///
/// let config = TextureConfigBuilder::new()
///     .random_seed(42)
///     .seed_count(20)
///     .build()
///     .unwrap();
/// let result = synthesize(&config).unwrap();
/// assert_eq!(result.partition.cell_count(), 20);
/// ```
pub fn synthesize(config: &TextureConfig) -> Result<SynthesisResult> {
    synthesize_with(config, &CancelToken::new(), |_| {})
}

/// Run the pipeline with a cancellation token
///
/// # Errors
///
/// As [`synthesize`], plus `Cancelled` naming the stage that would have run
/// next when the token fires.
pub fn synthesize_with_cancel(
    config: &TextureConfig,
    token: &CancelToken,
) -> Result<SynthesisResult> {
    synthesize_with(config, token, |_| {})
}

/// Run the pipeline with cancellation and a per-stage progress callback
///
/// The callback fires once as each stage begins, after the cancellation
/// check for that stage.
///
/// # Errors
///
/// As [`synthesize_with_cancel`].
pub fn synthesize_with(
    config: &TextureConfig,
    token: &CancelToken,
    mut progress: impl FnMut(ProgressStage),
) -> Result<SynthesisResult> {
    config.validate()?;

    let mut stream = RandomStream::new(config.random_seed);
    let bounds = Rect::from_size(config.canvas_width, config.canvas_height);

    check_cancelled(token, ProgressStage::Seeding)?;
    progress(ProgressStage::Seeding);
    let seeds = generate_seeds(config, &mut stream)?;

    check_cancelled(token, ProgressStage::Tessellating)?;
    progress(ProgressStage::Tessellating);
    let partition = tessellate(&seeds, bounds, config.epsilon)?;

    check_cancelled(token, ProgressStage::Assigning)?;
    progress(ProgressStage::Assigning);
    let attributes = attributes::assign(&partition, &config.rules, &mut stream);

    check_cancelled(token, ProgressStage::Rasterizing)?;
    progress(ProgressStage::Rasterizing);
    let raster = rasterize(&partition, &attributes, config);

    Ok(SynthesisResult {
        raster,
        partition,
        attributes,
    })
}

fn check_cancelled(token: &CancelToken, stage: ProgressStage) -> Result<()> {
    if token.is_cancelled() {
        return Err(TextureError::Cancelled { stage: stage.name() });
    }
    Ok(())
}
