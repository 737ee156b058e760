//! Deterministic geometric texture synthesis
//!
//! A standalone library for generating seamless procedural textures from
//! planar Voronoi tessellations: seed placement, cell carving, per-cell
//! styling and RGBA rasterization, all keyed by a single random seed.
//!
//! # Quick Start
//!
//! ```rust
//! use texture_genius::*;
//!
//! // Configure a run
//! let config = TextureConfigBuilder::new()
//!     .random_seed(42)
//!     .seed_count(20)
//!     .output_size(256, 256).unwrap()
//!     .build().unwrap();
//!
//! // Synthesize: raster + partition + per-cell attributes
//! let result = synthesize(&config).unwrap();
//! println!("Rendered {} cells", result.partition.cell_count());
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) pixel-to-cell lookups using KD-tree
//! - `serde`: Enables serialization support for configuration, attributes and rasters
//! - `png`: Enables PNG export for rendered rasters

// Modules
pub mod error;
pub mod config;
pub mod stream;
pub mod geom;
pub mod generation;
pub mod partition;
pub mod attributes;
pub mod noise;
pub mod raster;
pub mod pipeline;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{TextureError, Result};
pub use config::{TextureConfig, TextureConfigBuilder, SeedDistribution};
pub use stream::RandomStream;
pub use geom::{Polygon, PolygonSet, Rect};
pub use partition::{Cell, Partition};
pub use attributes::{
    CellAttributes, CellStyle, EdgeStyle, FillMode, NoiseDescriptor, PaletteColor, Rgba, RuleSet,
};
pub use raster::{Overlay, Raster};
pub use pipeline::{
    synthesize, synthesize_with, synthesize_with_cancel, CancelToken, ProgressStage,
    SynthesisResult,
};
pub use generation::LloydOptions;

#[cfg(feature = "spatial-index")]
pub use spatial::SeedIndex;

// Re-export glam::Vec2 for convenience
pub use glam::Vec2;
