//! Planar partition produced by the tessellator
//!
//! A partition is a gap-free, overlap-free division of the canvas into
//! polygonal cells, one per seed, with stable cell identifiers assigned in
//! seed order.

use glam::Vec2;

use crate::geom::{Polygon, Rect};

/// A single cell of the partition
///
/// Cell ids are stable and contiguous with seed indices: cell `i` belongs to
/// seed `i`, even when the cell's polygon is empty because the seed is fully
/// dominated by its neighbors (coincident seeds).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Unique cell identifier (0 to seed_count − 1, in seed order)
    pub id: usize,
    /// The seed point anchoring this cell
    pub seed: Vec2,
    /// Boundary polygon, clipped to the canvas; empty for dominated seeds
    pub polygon: Polygon,
    /// Ids of cells sharing an edge with this cell, ascending
    pub neighbors: Vec<usize>,
}

impl Cell {
    /// Number of neighboring cells
    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Check adjacency with another cell
    #[inline]
    pub fn is_neighbor_of(&self, other_id: usize) -> bool {
        self.neighbors.binary_search(&other_id).is_ok()
    }

    /// Cell area in canvas units squared
    #[inline]
    pub fn area(&self) -> f32 {
        self.polygon.area()
    }
}

/// The tessellation result: cells indexed by id over a bounding region
///
/// Invariant (checked by the tessellator on every run, not just in tests):
/// the union of all cell polygons exactly covers the canvas region and any
/// two distinct cells' interiors are disjoint, verified by total-area
/// reconciliation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    cells: Vec<Cell>,
    bounds: Rect,
}

impl Partition {
    /// Assemble a partition (crate-internal; the tessellator validates it)
    pub(crate) fn new(cells: Vec<Cell>, bounds: Rect) -> Self {
        Self { cells, bounds }
    }

    /// Number of cells (equals the configured seed count)
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// All cells in id order
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Look up a cell by id
    #[inline]
    pub fn cell(&self, id: usize) -> Option<&Cell> {
        self.cells.get(id)
    }

    /// The bounding region the partition covers
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Seed points in id order
    pub fn seeds(&self) -> Vec<Vec2> {
        self.cells.iter().map(|c| c.seed).collect()
    }

    /// Sum of all cell areas, reconciled against the canvas area by the
    /// tessellator's integrity check
    pub fn total_cell_area(&self) -> f32 {
        self.cells.iter().map(Cell::area).sum()
    }

    /// Resolve the cell owning a canvas point
    ///
    /// Nearest-seed membership with the partition's tie-break rule: a point
    /// equidistant between two seeds belongs to the lower-indexed one. This
    /// is the reference semantics the rasterizer's pixel resolution must
    /// agree with.
    ///
    /// Returns 0 for an empty partition only in the degenerate case of zero
    /// cells, which a validated configuration never produces.
    pub fn locate(&self, p: Vec2) -> usize {
        let mut best = 0usize;
        let mut best_dist = f32::INFINITY;
        for cell in &self.cells {
            let d = cell.seed.distance_squared(p);
            // Strict comparison in ascending id order keeps the lowest id
            // on exact ties
            if d < best_dist {
                best_dist = d;
                best = cell.id;
            }
        }
        best
    }

    /// Resolve the owning cell and the runner-up cell for a canvas point
    ///
    /// The runner-up is the nearest cell other than the owner; the distance
    /// pair drives edge blending (`(d2 − d1) / 2` is the distance to the
    /// shared bisector). Returns `None` for the runner-up when the partition
    /// has a single cell.
    pub fn locate_two(&self, p: Vec2) -> (usize, f32, Option<(usize, f32)>) {
        let mut best = 0usize;
        let mut best_dist = f32::INFINITY;
        let mut second: Option<(usize, f32)> = None;
        for cell in &self.cells {
            let d = cell.seed.distance_squared(p);
            if d < best_dist {
                second = Some((best, best_dist));
                best_dist = d;
                best = cell.id;
            } else if second.map_or(true, |(_, sd)| d < sd) {
                second = Some((cell.id, d));
            }
        }
        let second = second
            .filter(|(_, d)| d.is_finite())
            .map(|(id, d)| (id, d.sqrt()));
        (best, best_dist.sqrt(), second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cell_partition() -> Partition {
        let bounds = Rect::from_size(2.0, 1.0);
        let eps = 1e-4;
        let left = Polygon::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
            eps,
        )
        .unwrap();
        let right = Polygon::new(
            vec![
                Vec2::new(1.0, 0.0),
                Vec2::new(2.0, 0.0),
                Vec2::new(2.0, 1.0),
                Vec2::new(1.0, 1.0),
            ],
            eps,
        )
        .unwrap();
        Partition::new(
            vec![
                Cell {
                    id: 0,
                    seed: Vec2::new(0.5, 0.5),
                    polygon: left,
                    neighbors: vec![1],
                },
                Cell {
                    id: 1,
                    seed: Vec2::new(1.5, 0.5),
                    polygon: right,
                    neighbors: vec![0],
                },
            ],
            bounds,
        )
    }

    #[test]
    fn test_locate_nearest() {
        let partition = two_cell_partition();
        assert_eq!(partition.locate(Vec2::new(0.2, 0.5)), 0);
        assert_eq!(partition.locate(Vec2::new(1.8, 0.5)), 1);
    }

    #[test]
    fn test_locate_tie_break_lower_id() {
        let partition = two_cell_partition();
        // Exactly on the bisector between seeds 0 and 1
        assert_eq!(partition.locate(Vec2::new(1.0, 0.5)), 0);
    }

    #[test]
    fn test_locate_two_runner_up() {
        let partition = two_cell_partition();
        let (owner, d1, second) = partition.locate_two(Vec2::new(0.9, 0.5));
        assert_eq!(owner, 0);
        let (runner, d2) = second.unwrap();
        assert_eq!(runner, 1);
        assert!(d2 > d1);
        // Distance to the bisector at x=1.0
        assert!(((d2 - d1) * 0.5 - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_area_reconciliation_helpers() {
        let partition = two_cell_partition();
        assert!((partition.total_cell_area() - partition.bounds().area()).abs() < 1e-5);
    }

    #[test]
    fn test_neighbor_helpers() {
        let partition = two_cell_partition();
        let cell = partition.cell(0).unwrap();
        assert_eq!(cell.neighbor_count(), 1);
        assert!(cell.is_neighbor_of(1));
        assert!(!cell.is_neighbor_of(0));
    }
}
