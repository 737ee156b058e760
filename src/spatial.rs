//! Spatial indexing for fast point-to-cell lookups
//!
//! This module is only available with the `spatial-index` feature. It is an
//! internal optimization for the rasterizer's point location: results always
//! agree with the exact `Partition::locate` semantics, including the
//! lower-index tie-break on cell boundaries.

use std::num::NonZero;

use glam::Vec2;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// KD-tree over seed points for O(log n) nearest-seed queries
#[derive(Clone)]
pub struct SeedIndex {
    tree: ImmutableKdTree<f32, usize, 2, 32>,
    count: usize,
}

impl SeedIndex {
    /// Build the index from seed positions in cell-id order
    pub fn new(seeds: &[Vec2]) -> Self {
        let points: Vec<[f32; 2]> = seeds.iter().map(|s| [s.x, s.y]).collect();
        Self {
            tree: ImmutableKdTree::new_from_slice(&points),
            count: seeds.len(),
        }
    }

    /// Resolve the owning cell for a canvas point
    ///
    /// The KD-tree returns an arbitrary member among exactly equidistant
    /// seeds, so candidates are re-ranked by (distance, id) to honor the
    /// partition's lower-index tie-break.
    pub fn nearest(&self, p: Vec2) -> usize {
        self.candidates(p).first().map_or(0, |&(id, _)| id)
    }

    /// Owning cell plus runner-up with their distances
    ///
    /// The runner-up drives edge blending. Returns `None` for the runner-up
    /// when only one seed exists.
    pub fn nearest_two(&self, p: Vec2) -> (usize, f32, Option<(usize, f32)>) {
        let ranked = self.candidates(p);
        let (owner, d1) = ranked[0];
        let second = ranked.get(1).copied();
        (owner, d1, second)
    }

    /// A small candidate set around `p`, sorted by (distance, id)
    ///
    /// Querying a few extra neighbors makes the tie-break deterministic even
    /// when several seeds are equidistant within float precision.
    fn candidates(&self, p: Vec2) -> Vec<(usize, f32)> {
        let Some(qty) = NonZero::new(self.count.min(4)) else {
            return Vec::new();
        };
        let neighbours = self.tree.nearest_n::<SquaredEuclidean>(&[p.x, p.y], qty);
        let mut ranked: Vec<(usize, f32)> = neighbours
            .into_iter()
            .map(|n| (n.item as usize, n.distance.sqrt()))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_basic() {
        let seeds = vec![
            Vec2::new(10.0, 10.0),
            Vec2::new(100.0, 10.0),
            Vec2::new(10.0, 100.0),
            Vec2::new(100.0, 100.0),
        ];
        let index = SeedIndex::new(&seeds);
        assert_eq!(index.nearest(Vec2::new(12.0, 11.0)), 0);
        assert_eq!(index.nearest(Vec2::new(95.0, 99.0)), 3);
    }

    #[test]
    fn test_tie_break_prefers_lower_id() {
        let seeds = vec![Vec2::new(10.0, 50.0), Vec2::new(90.0, 50.0)];
        let index = SeedIndex::new(&seeds);
        // Exactly equidistant between seeds 0 and 1
        assert_eq!(index.nearest(Vec2::new(50.0, 50.0)), 0);
    }

    #[test]
    fn test_nearest_two() {
        let seeds = vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)];
        let index = SeedIndex::new(&seeds);
        let (owner, d1, second) = index.nearest_two(Vec2::new(4.0, 0.0));
        assert_eq!(owner, 0);
        assert!((d1 - 4.0).abs() < 1e-5);
        let (runner, d2) = second.unwrap();
        assert_eq!(runner, 1);
        assert!((d2 - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_single_seed_has_no_runner_up() {
        let seeds = vec![Vec2::new(5.0, 5.0)];
        let index = SeedIndex::new(&seeds);
        let (owner, _, second) = index.nearest_two(Vec2::new(1.0, 1.0));
        assert_eq!(owner, 0);
        assert!(second.is_none());
    }

    #[test]
    fn test_agrees_with_exact_location() {
        let seeds: Vec<Vec2> = (0..25)
            .map(|k| Vec2::new((k % 5) as f32 * 20.0 + 7.0, (k / 5) as f32 * 20.0 + 3.0))
            .collect();
        let index = SeedIndex::new(&seeds);
        for i in 0..40 {
            let p = Vec2::new((i * 7 % 100) as f32, (i * 13 % 100) as f32);
            let exact = seeds
                .iter()
                .enumerate()
                .min_by(|(ai, a), (bi, b)| {
                    a.distance_squared(p)
                        .total_cmp(&b.distance_squared(p))
                        .then(ai.cmp(bi))
                })
                .map(|(id, _)| id)
                .unwrap();
            assert_eq!(index.nearest(p), exact);
        }
    }
}
