//! Texture synthesis configuration and builder
//!
//! This module provides the immutable configuration value consumed by one
//! synthesis run. The same configuration always produces the identical
//! raster, partition and attributes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::attributes::RuleSet;
use crate::error::{Result, TextureError};
use crate::raster::Overlay;

/// Seed point distribution policies
///
/// Determines how seed points are spread across the canvas before
/// tessellation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeedDistribution {
    /// Independent uniform draws across the canvas
    Uniform,
    /// Regular grid cell centers perturbed by a bounded random offset
    ///
    /// Keeps spatial spread even and avoids the clustering of pure uniform
    /// draws.
    JitteredGrid,
    /// Rejection sampling enforcing a minimum pairwise distance
    ///
    /// Fails with `SeedDensity` if the minimum distance makes the requested
    /// count infeasible within the attempt budget.
    PoissonDisc {
        /// Minimum pairwise distance between seeds, in canvas units
        min_distance: f32,
    },
    /// Uniform draws refined by Lloyd relaxation
    ///
    /// Each iteration tessellates and moves every seed to its cell centroid,
    /// evening out cell sizes.
    LloydRelaxed {
        /// Maximum number of relaxation iterations
        ///
        /// Engine limit: at most 20. Each iteration is a full tessellation,
        /// and layouts converge well before that; higher values are rejected
        /// as `InvalidConfig`.
        iterations: usize,
        /// Convergence threshold as a fraction of the canvas diagonal;
        /// 0.0 disables early termination
        convergence: f32,
    },
}

impl SeedDistribution {
    /// Get a human-readable name for this distribution
    pub fn name(&self) -> &'static str {
        match self {
            SeedDistribution::Uniform => "uniform",
            SeedDistribution::JitteredGrid => "jittered-grid",
            SeedDistribution::PoissonDisc { .. } => "poisson-disc",
            SeedDistribution::LloydRelaxed { .. } => "lloyd-relaxed",
        }
    }
}

impl Default for SeedDistribution {
    fn default() -> Self {
        SeedDistribution::JitteredGrid
    }
}

/// Configuration for one deterministic texture synthesis run
///
/// Created once per synthesis request and never mutated after validation.
/// Two runs with an identical configuration produce bit-identical rasters
/// and identical partitions and attributes.
///
/// # Coordinate spaces
///
/// Seeds and cell polygons live in canvas space (`canvas_width` ×
/// `canvas_height`, floating point). The raster output is `output_width` ×
/// `output_height` pixels; each pixel center is mapped into canvas space for
/// cell resolution.
///
/// # Example
///
/// ```rust
/// use texture_genius::*;
///
/// let config = TextureConfigBuilder::new()
///     .random_seed(42)
///     .seed_count(20)
///     .canvas_size(256.0, 256.0).unwrap()
///     .output_size(256, 256).unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(config.seed_count, 20);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TextureConfig {
    /// Number of seed points (and therefore cells) to generate
    pub seed_count: usize,
    /// Seed point distribution policy
    pub distribution: SeedDistribution,
    /// Random seed keying the run's deterministic stream
    pub random_seed: u64,
    /// Canvas width in canvas units
    pub canvas_width: f32,
    /// Canvas height in canvas units
    pub canvas_height: f32,
    /// Output raster width in pixels
    pub output_width: u32,
    /// Output raster height in pixels
    pub output_height: u32,
    /// Color, noise and edge rules applied per cell
    pub rules: RuleSet,
    /// Width of the edge blending band in canvas units; 0 disables blending
    pub edge_blend_width: f32,
    /// Optional global overlay applied after per-cell compositing
    pub overlay: Overlay,
    /// Epsilon tolerance for geometric equality and collinearity tests
    ///
    /// Defaults to a value proportional to the canvas scale.
    pub epsilon: f32,
}

impl TextureConfig {
    /// Canvas area in canvas units squared
    #[inline]
    pub fn canvas_area(&self) -> f32 {
        self.canvas_width * self.canvas_height
    }

    /// Canvas diagonal length, used to scale convergence thresholds
    #[inline]
    pub fn canvas_diagonal(&self) -> f32 {
        (self.canvas_width * self.canvas_width + self.canvas_height * self.canvas_height).sqrt()
    }

    /// Validate the configuration before any stage runs
    ///
    /// The orchestrator calls this first and fails fast with `InvalidConfig`
    /// rather than partially running.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the offending field on any violation.
    pub fn validate(&self) -> Result<()> {
        if self.seed_count < 1 {
            return Err(TextureError::InvalidConfig(format!(
                "seed_count must be >= 1 (got {})",
                self.seed_count
            )));
        }
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return Err(TextureError::InvalidConfig(format!(
                "canvas dimensions must be positive (got {}x{})",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.output_width == 0 || self.output_height == 0 {
            return Err(TextureError::InvalidConfig(format!(
                "output dimensions must be positive (got {}x{})",
                self.output_width, self.output_height
            )));
        }
        if !(self.edge_blend_width >= 0.0) {
            return Err(TextureError::InvalidConfig(format!(
                "edge_blend_width must be non-negative (got {})",
                self.edge_blend_width
            )));
        }
        if !(self.epsilon > 0.0) {
            return Err(TextureError::InvalidConfig(format!(
                "epsilon must be positive (got {})",
                self.epsilon
            )));
        }
        match self.distribution {
            SeedDistribution::PoissonDisc { min_distance } => {
                if !(min_distance > 0.0) {
                    return Err(TextureError::InvalidConfig(format!(
                        "poisson-disc min_distance must be positive (got {})",
                        min_distance
                    )));
                }
            }
            SeedDistribution::LloydRelaxed {
                iterations,
                convergence,
            } => {
                if iterations > 20 {
                    return Err(TextureError::InvalidConfig(format!(
                        "lloyd iterations must be <= 20 (got {})",
                        iterations
                    )));
                }
                if !(convergence >= 0.0) {
                    return Err(TextureError::InvalidConfig(format!(
                        "lloyd convergence must be >= 0 (got {})",
                        convergence
                    )));
                }
            }
            SeedDistribution::Uniform | SeedDistribution::JitteredGrid => {}
        }
        self.rules.validate()?;
        self.overlay.validate()?;
        Ok(())
    }
}

impl Default for TextureConfig {
    fn default() -> Self {
        TextureConfigBuilder::new().build().unwrap()
    }
}

/// Builder for creating `TextureConfig` with validation
///
/// # Example
///
/// ```rust
/// use texture_genius::*;
///
/// let config = TextureConfigBuilder::new()
///     .random_seed(12345)
///     .seed_count(64)
///     .distribution(SeedDistribution::PoissonDisc { min_distance: 12.0 })
///     .edge_blend_width(1.5)
///     .unwrap()
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct TextureConfigBuilder {
    seed_count: usize,
    distribution: SeedDistribution,
    random_seed: Option<u64>,
    canvas_width: f32,
    canvas_height: f32,
    output_width: u32,
    output_height: u32,
    rules: RuleSet,
    edge_blend_width: f32,
    overlay: Overlay,
    epsilon: Option<f32>,
}

impl TextureConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed_count: 20 (matches the classic Voronoi texture default)
    /// - distribution: jittered grid
    /// - random_seed: random (from thread_rng)
    /// - canvas: 256.0 × 256.0, output: 256 × 256
    /// - edge_blend_width: 1.0 canvas unit
    /// - overlay: none
    /// - epsilon: canvas-scale proportional (max dimension × 1e-4)
    pub fn new() -> Self {
        Self {
            seed_count: 20,
            distribution: SeedDistribution::default(),
            random_seed: None,
            canvas_width: 256.0,
            canvas_height: 256.0,
            output_width: 256,
            output_height: 256,
            rules: RuleSet::default(),
            edge_blend_width: 1.0,
            overlay: Overlay::None,
            epsilon: None,
        }
    }

    /// Set the number of seed points
    pub fn seed_count(mut self, count: usize) -> Self {
        self.seed_count = count;
        self
    }

    /// Set the seed distribution policy
    ///
    /// Distribution parameters are validated at build time: Poisson-disc
    /// needs a positive minimum distance, and Lloyd relaxation accepts at
    /// most 20 iterations (each iteration is a full tessellation).
    pub fn distribution(mut self, distribution: SeedDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Set the random seed for the run's deterministic stream
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Set the canvas dimensions in canvas units
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either dimension is not positive.
    pub fn canvas_size(mut self, width: f32, height: f32) -> Result<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(TextureError::InvalidConfig(format!(
                "canvas dimensions must be positive (got {}x{})",
                width, height
            )));
        }
        self.canvas_width = width;
        self.canvas_height = height;
        Ok(self)
    }

    /// Set the output raster dimensions in pixels
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either dimension is zero.
    pub fn output_size(mut self, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::InvalidConfig(format!(
                "output dimensions must be positive (got {}x{})",
                width, height
            )));
        }
        self.output_width = width;
        self.output_height = height;
        Ok(self)
    }

    /// Set the color/noise/edge rule set
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Set the edge blending band width in canvas units
    ///
    /// A width of 0 produces hard cell boundaries with no intermediate
    /// colors.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the width is negative.
    pub fn edge_blend_width(mut self, width: f32) -> Result<Self> {
        if !(width >= 0.0) {
            return Err(TextureError::InvalidConfig(format!(
                "edge_blend_width must be non-negative (got {})",
                width
            )));
        }
        self.edge_blend_width = width;
        Ok(self)
    }

    /// Set the global overlay applied after per-cell compositing
    pub fn overlay(mut self, overlay: Overlay) -> Self {
        self.overlay = overlay;
        self
    }

    /// Override the epsilon tolerance
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if epsilon is not positive.
    pub fn epsilon(mut self, epsilon: f32) -> Result<Self> {
        if !(epsilon > 0.0) {
            return Err(TextureError::InvalidConfig(format!(
                "epsilon must be positive (got {})",
                epsilon
            )));
        }
        self.epsilon = Some(epsilon);
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no random seed was provided, one is generated from thread_rng.
    /// If no epsilon was provided, it defaults to the maximum canvas
    /// dimension × 1e-4.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` on any remaining validation failure.
    pub fn build(self) -> Result<TextureConfig> {
        let random_seed = self.random_seed.unwrap_or_else(rand::random);
        let epsilon = self
            .epsilon
            .unwrap_or_else(|| self.canvas_width.max(self.canvas_height) * 1e-4);

        let config = TextureConfig {
            seed_count: self.seed_count,
            distribution: self.distribution,
            random_seed,
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            output_width: self.output_width,
            output_height: self.output_height,
            rules: self.rules,
            edge_blend_width: self.edge_blend_width,
            overlay: self.overlay,
            epsilon,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for TextureConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
