//! Lloyd relaxation for uniform seed distribution
//!
//! Iteratively moves each seed to the centroid of its Voronoi cell,
//! producing a more even, honeycomb-like cell layout.

use glam::Vec2;

use crate::error::Result;
use crate::geom::Rect;

use super::voronoi;

/// Options for Lloyd relaxation
#[derive(Debug, Clone, Copy)]
pub struct LloydOptions {
    /// Maximum number of iterations to run
    pub max_iterations: usize,
    /// Convergence threshold as a fraction of the canvas diagonal;
    /// 0.0 disables early termination
    pub convergence_threshold: f32,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            convergence_threshold: 0.01,
        }
    }
}

/// Apply Lloyd relaxation to a seed set
///
/// Each iteration tessellates the current seeds and moves every seed to its
/// cell's area centroid. Seeds whose cells are empty (coincident duplicates)
/// stay in place so the sequence length and ordering never change.
///
/// # Errors
///
/// Propagates `PartitionIntegrity` from the per-iteration tessellations.
pub fn relax(
    mut seeds: Vec<Vec2>,
    bounds: Rect,
    epsilon: f32,
    options: LloydOptions,
) -> Result<Vec<Vec2>> {
    let threshold = options.convergence_threshold * bounds.diagonal();

    for iteration in 0..options.max_iterations {
        let partition = voronoi::tessellate(&seeds, bounds, epsilon)?;

        let mut max_displacement: f32 = 0.0;
        for cell in partition.cells() {
            if cell.polygon.is_empty() {
                continue;
            }
            let centroid = cell.polygon.centroid().clamp(bounds.min, bounds.max);
            max_displacement = max_displacement.max(seeds[cell.id].distance(centroid));
            seeds[cell.id] = centroid;
        }

        eprintln!(
            "[Lloyd] iter {}/{}: max displacement {:.4}",
            iteration + 1,
            options.max_iterations,
            max_displacement
        );

        if threshold > 0.0 && max_displacement < threshold {
            eprintln!(
                "[Lloyd] converged at iteration {} (max displacement {:.4} < {:.4})",
                iteration + 1,
                max_displacement,
                threshold
            );
            break;
        }
    }

    Ok(seeds)
}

/// Spread of cell areas, used to measure how uniform a layout is
#[cfg(test)]
fn area_spread(seeds: &[Vec2], bounds: Rect, epsilon: f32) -> f32 {
    let partition = voronoi::tessellate(seeds, bounds, epsilon).unwrap();
    let mean = bounds.area() / seeds.len() as f32;
    partition
        .cells()
        .iter()
        .map(|c| (c.area() - mean).abs())
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::RandomStream;

    const EPS: f32 = 0.0256;

    fn scattered_seeds(count: usize, seed: u64) -> Vec<Vec2> {
        let mut stream = RandomStream::new(seed);
        (0..count)
            .map(|_| {
                Vec2::new(
                    stream.next_range(0.0, 256.0),
                    stream.next_range(0.0, 256.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_relax_preserves_count_and_bounds() {
        let bounds = Rect::from_size(256.0, 256.0);
        let seeds = scattered_seeds(20, 42);
        let relaxed = relax(seeds, bounds, EPS, LloydOptions::default()).unwrap();
        assert_eq!(relaxed.len(), 20);
        for s in &relaxed {
            assert!(bounds.contains(*s));
        }
    }

    #[test]
    fn test_relax_improves_uniformity() {
        let bounds = Rect::from_size(256.0, 256.0);
        let seeds = scattered_seeds(24, 7);
        let before = area_spread(&seeds, bounds, EPS);
        let relaxed = relax(
            seeds,
            bounds,
            EPS,
            LloydOptions {
                max_iterations: 5,
                convergence_threshold: 0.0,
            },
        )
        .unwrap();
        let after = area_spread(&relaxed, bounds, EPS);
        assert!(
            after < before,
            "relaxation should even out cell areas ({} -> {})",
            before,
            after
        );
    }

    #[test]
    fn test_relax_determinism() {
        let bounds = Rect::from_size(256.0, 256.0);
        let a = relax(scattered_seeds(15, 9), bounds, EPS, LloydOptions::default()).unwrap();
        let b = relax(scattered_seeds(15, 9), bounds, EPS, LloydOptions::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let bounds = Rect::from_size(256.0, 256.0);
        let seeds = scattered_seeds(10, 3);
        let relaxed = relax(
            seeds.clone(),
            bounds,
            EPS,
            LloydOptions {
                max_iterations: 0,
                convergence_threshold: 0.0,
            },
        )
        .unwrap();
        assert_eq!(relaxed, seeds);
    }
}
