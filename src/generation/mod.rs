//! Seed generation and planar Voronoi tessellation
//!
//! Turns a configuration and its random stream into a validated partition:
//! seeds are placed according to the configured distribution, then the
//! nearest-seed partition is carved by perpendicular-bisector clipping.

mod lloyd;
mod seeds;
mod voronoi;

pub use lloyd::{relax, LloydOptions};
pub use seeds::generate_seeds;
pub use voronoi::tessellate;

use crate::config::TextureConfig;
use crate::error::Result;
use crate::geom::Rect;
use crate::partition::Partition;
use crate::stream::RandomStream;

/// Generate a validated partition from a configuration
///
/// Convenience wrapper running the seed and tessellation stages back to
/// back. The pipeline orchestrator calls the stages individually so it can
/// check for cancellation in between.
pub fn generate_partition(config: &TextureConfig, stream: &mut RandomStream) -> Result<Partition> {
    let bounds = Rect::from_size(config.canvas_width, config.canvas_height);
    let seeds = seeds::generate_seeds(config, stream)?;
    voronoi::tessellate(&seeds, bounds, config.epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TextureConfigBuilder;

    #[test]
    fn test_generate_partition_matches_seed_count() {
        let config = TextureConfigBuilder::new()
            .random_seed(42)
            .seed_count(12)
            .build()
            .unwrap();
        let mut stream = RandomStream::new(config.random_seed);
        let partition = generate_partition(&config, &mut stream).unwrap();
        assert_eq!(partition.cell_count(), 12);
    }
}
