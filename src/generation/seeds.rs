//! Seed point generation
//!
//! Produces the ordered seed sequence for one synthesis run. All draws come
//! from the run's random stream in a fixed order, so identical configuration
//! and stream state always yield the identical sequence regardless of
//! execution environment.

use glam::Vec2;

use crate::config::{SeedDistribution, TextureConfig};
use crate::error::{Result, TextureError};
use crate::geom::Rect;
use crate::stream::RandomStream;

use super::lloyd::{self, LloydOptions};

/// Attempt budget multiplier for Poisson-disc rejection sampling
///
/// Sampling gives up and reports `SeedDensity` after this many attempts per
/// requested seed, rather than looping forever on an infeasible density.
const POISSON_ATTEMPTS_PER_SEED: usize = 30;

/// Fraction of a grid cell a jittered seed may move from its center
const GRID_JITTER: f32 = 0.45;

/// Generate the run's seed points
///
/// The returned sequence has exactly `config.seed_count` points, all within
/// canvas bounds, ordered by generation (this order defines cell ids).
///
/// # Errors
///
/// Returns `SeedDensity` when Poisson-disc sampling cannot place the
/// requested count within its attempt budget. Lloyd-relaxed generation can
/// propagate tessellation errors from its refinement iterations.
pub fn generate_seeds(config: &TextureConfig, stream: &mut RandomStream) -> Result<Vec<Vec2>> {
    let bounds = Rect::from_size(config.canvas_width, config.canvas_height);
    match config.distribution {
        SeedDistribution::Uniform => Ok(uniform(config.seed_count, bounds, stream)),
        SeedDistribution::JitteredGrid => Ok(jittered_grid(config.seed_count, bounds, stream)),
        SeedDistribution::PoissonDisc { min_distance } => {
            poisson_disc(config.seed_count, min_distance, bounds, stream)
        }
        SeedDistribution::LloydRelaxed {
            iterations,
            convergence,
        } => {
            let initial = uniform(config.seed_count, bounds, stream);
            let options = LloydOptions {
                max_iterations: iterations,
                convergence_threshold: convergence,
            };
            lloyd::relax(initial, bounds, config.epsilon, options)
        }
    }
}

/// Independent uniform draws across the canvas
fn uniform(count: usize, bounds: Rect, stream: &mut RandomStream) -> Vec<Vec2> {
    (0..count)
        .map(|_| {
            let x = stream.next_range(bounds.min.x, bounds.max.x);
            let y = stream.next_range(bounds.min.y, bounds.max.y);
            Vec2::new(x, y)
        })
        .collect()
}

/// Regular grid cell centers perturbed by a bounded random offset
///
/// The grid aspect follows the canvas aspect so cells stay roughly square.
/// Jitter is bounded to keep every seed inside its own grid cell, which
/// preserves even spatial spread without the clustering of uniform draws.
fn jittered_grid(count: usize, bounds: Rect, stream: &mut RandomStream) -> Vec<Vec2> {
    let aspect = bounds.width() / bounds.height();
    let cols = ((count as f32 * aspect).sqrt().ceil() as usize).max(1);
    let rows = count.div_ceil(cols);
    let cell_w = bounds.width() / cols as f32;
    let cell_h = bounds.height() / rows as f32;

    (0..count)
        .map(|k| {
            let col = k % cols;
            let row = k / cols;
            let center = bounds.min
                + Vec2::new(
                    (col as f32 + 0.5) * cell_w,
                    (row as f32 + 0.5) * cell_h,
                );
            let dx = stream.next_range(-GRID_JITTER, GRID_JITTER) * cell_w;
            let dy = stream.next_range(-GRID_JITTER, GRID_JITTER) * cell_h;
            (center + Vec2::new(dx, dy)).clamp(bounds.min, bounds.max)
        })
        .collect()
}

/// Rejection sampling enforcing a minimum pairwise distance
///
/// Candidates are drawn uniformly and rejected when any accepted seed lies
/// closer than `min_distance`. A background bucket grid keeps each check
/// local. Placement is strictly sequential: each draw depends on the
/// previously placed points, so this stage must not be parallelized without
/// breaking the stream's ordering contract.
fn poisson_disc(
    count: usize,
    min_distance: f32,
    bounds: Rect,
    stream: &mut RandomStream,
) -> Result<Vec<Vec2>> {
    // Bucket size is capped below so a tiny min_distance cannot explode the
    // grid; the scan radius widens to compensate.
    let ideal = min_distance / std::f32::consts::SQRT_2;
    let cell = ideal.max(bounds.width().max(bounds.height()) / 256.0);
    let cols = ((bounds.width() / cell).ceil() as usize).max(1);
    let rows = ((bounds.height() / cell).ceil() as usize).max(1);
    let reach = (min_distance / cell).ceil() as isize + 1;

    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); cols * rows];
    let mut points: Vec<Vec2> = Vec::with_capacity(count);

    let budget = count.saturating_mul(POISSON_ATTEMPTS_PER_SEED);
    let mut attempts = 0usize;
    let min_dist_sq = min_distance * min_distance;

    while points.len() < count && attempts < budget {
        attempts += 1;
        let candidate = Vec2::new(
            stream.next_range(bounds.min.x, bounds.max.x),
            stream.next_range(bounds.min.y, bounds.max.y),
        );
        let cx = (((candidate.x - bounds.min.x) / cell) as isize).clamp(0, cols as isize - 1);
        let cy = (((candidate.y - bounds.min.y) / cell) as isize).clamp(0, rows as isize - 1);

        let mut ok = true;
        'scan: for gy in (cy - reach).max(0)..=(cy + reach).min(rows as isize - 1) {
            for gx in (cx - reach).max(0)..=(cx + reach).min(cols as isize - 1) {
                for &idx in &buckets[gy as usize * cols + gx as usize] {
                    if points[idx].distance_squared(candidate) < min_dist_sq {
                        ok = false;
                        break 'scan;
                    }
                }
            }
        }
        if ok {
            buckets[cy as usize * cols + cx as usize].push(points.len());
            points.push(candidate);
        }
    }

    if points.len() < count {
        return Err(TextureError::SeedDensity {
            requested: count,
            placed: points.len(),
            min_distance,
        });
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TextureConfigBuilder;

    fn config_with(distribution: SeedDistribution, count: usize) -> TextureConfig {
        TextureConfigBuilder::new()
            .random_seed(42)
            .seed_count(count)
            .distribution(distribution)
            .build()
            .unwrap()
    }

    fn assert_in_bounds(seeds: &[Vec2], config: &TextureConfig) {
        for s in seeds {
            assert!(s.x >= 0.0 && s.x <= config.canvas_width);
            assert!(s.y >= 0.0 && s.y <= config.canvas_height);
        }
    }

    #[test]
    fn test_uniform_count_and_bounds() {
        let config = config_with(SeedDistribution::Uniform, 50);
        let mut stream = RandomStream::new(config.random_seed);
        let seeds = generate_seeds(&config, &mut stream).unwrap();
        assert_eq!(seeds.len(), 50);
        assert_in_bounds(&seeds, &config);
    }

    #[test]
    fn test_jittered_grid_count_and_bounds() {
        let config = config_with(SeedDistribution::JitteredGrid, 37);
        let mut stream = RandomStream::new(config.random_seed);
        let seeds = generate_seeds(&config, &mut stream).unwrap();
        assert_eq!(seeds.len(), 37);
        assert_in_bounds(&seeds, &config);
    }

    #[test]
    fn test_determinism() {
        let config = config_with(SeedDistribution::Uniform, 25);
        let mut a = RandomStream::new(config.random_seed);
        let mut b = RandomStream::new(config.random_seed);
        let seeds_a = generate_seeds(&config, &mut a).unwrap();
        let seeds_b = generate_seeds(&config, &mut b).unwrap();
        assert_eq!(seeds_a, seeds_b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let config = config_with(SeedDistribution::Uniform, 25);
        let mut a = RandomStream::new(42);
        let mut b = RandomStream::new(43);
        let seeds_a = generate_seeds(&config, &mut a).unwrap();
        let seeds_b = generate_seeds(&config, &mut b).unwrap();
        assert_ne!(seeds_a, seeds_b);
    }

    #[test]
    fn test_poisson_respects_min_distance() {
        let config = config_with(SeedDistribution::PoissonDisc { min_distance: 20.0 }, 30);
        let mut stream = RandomStream::new(config.random_seed);
        let seeds = generate_seeds(&config, &mut stream).unwrap();
        assert_eq!(seeds.len(), 30);
        assert_in_bounds(&seeds, &config);
        for i in 0..seeds.len() {
            for j in (i + 1)..seeds.len() {
                assert!(
                    seeds[i].distance(seeds[j]) >= 20.0,
                    "seeds {} and {} closer than min distance",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn test_poisson_infeasible_density_errors() {
        // A 256-unit canvas cannot hold 50 seeds 200 units apart
        let config = config_with(SeedDistribution::PoissonDisc { min_distance: 200.0 }, 50);
        let mut stream = RandomStream::new(config.random_seed);
        let result = generate_seeds(&config, &mut stream);
        match result {
            Err(TextureError::SeedDensity {
                requested, placed, ..
            }) => {
                assert_eq!(requested, 50);
                assert!(placed < 50);
            }
            other => panic!("expected SeedDensity, got {:?}", other),
        }
    }

    #[test]
    fn test_lloyd_relaxed_count_and_bounds() {
        let config = config_with(
            SeedDistribution::LloydRelaxed {
                iterations: 2,
                convergence: 0.0,
            },
            16,
        );
        let mut stream = RandomStream::new(config.random_seed);
        let seeds = generate_seeds(&config, &mut stream).unwrap();
        assert_eq!(seeds.len(), 16);
        assert_in_bounds(&seeds, &config);
    }

    #[test]
    fn test_single_seed() {
        for dist in [
            SeedDistribution::Uniform,
            SeedDistribution::JitteredGrid,
            SeedDistribution::PoissonDisc { min_distance: 10.0 },
        ] {
            let config = config_with(dist, 1);
            let mut stream = RandomStream::new(config.random_seed);
            let seeds = generate_seeds(&config, &mut stream).unwrap();
            assert_eq!(seeds.len(), 1);
        }
    }
}
