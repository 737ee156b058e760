//! Nearest-seed partition construction
//!
//! Each cell is the set of canvas points closer to its seed than to any
//! other seed: the cell polygon starts as the canvas rect and is clipped
//! against the perpendicular bisector of every other seed, keeping the side
//! containing the cell's own seed.

use std::collections::BTreeSet;

use glam::Vec2;

use crate::error::{Result, TextureError};
use crate::geom::{Polygon, Rect};
use crate::partition::{Cell, Partition};

/// Build the nearest-seed partition over the bounding region
///
/// Guarantees a gap-free, overlap-free cell cover: the area-reconciliation
/// invariant runs as part of every tessellation, not just in tests. A seed
/// fully dominated by its neighbors (a coincident duplicate) is retained as
/// an empty-polygon cell so that cell ids stay stable and contiguous with
/// seed indices.
///
/// # Errors
///
/// Returns `PartitionIntegrity` when the sum of cell areas does not
/// reconcile with the bounding-region area within tolerance. A malformed
/// partition is never returned silently.
pub fn tessellate(seeds: &[Vec2], bounds: Rect, epsilon: f32) -> Result<Partition> {
    let polygons: Vec<Polygon> = (0..seeds.len())
        .map(|i| carve_cell(i, seeds, &bounds, epsilon))
        .collect();

    check_area_reconciliation(&polygons, &bounds, epsilon)?;

    let neighbor_sets = find_neighbors(seeds, &polygons, epsilon);
    let cells: Vec<Cell> = polygons
        .into_iter()
        .zip(neighbor_sets)
        .enumerate()
        .map(|(id, (polygon, neighbors))| Cell {
            id,
            seed: seeds[id],
            polygon,
            neighbors,
        })
        .collect();

    Ok(Partition::new(cells, bounds))
}

/// Carve one cell by successive bisector clips
///
/// Other seeds are visited in ascending distance order so the polygon
/// shrinks fast, and clipping stops once the next seed is more than twice
/// the polygon's radius away: its bisector cannot reach the polygon, and
/// neither can any later (more distant) one.
fn carve_cell(i: usize, seeds: &[Vec2], bounds: &Rect, epsilon: f32) -> Polygon {
    let si = seeds[i];
    let mut order: Vec<usize> = (0..seeds.len()).filter(|&j| j != i).collect();
    order.sort_by(|&a, &b| {
        seeds[a]
            .distance_squared(si)
            .total_cmp(&seeds[b].distance_squared(si))
            .then(a.cmp(&b))
    });

    let mut polygon = bounds.to_polygon();
    for j in order {
        if polygon.is_empty() {
            break;
        }
        let sj = seeds[j];
        let dist = si.distance(sj);
        if dist <= epsilon {
            // Coincident seeds: the boundary tie-break awards the shared
            // region to the lower index, the higher index keeps nothing
            if j < i {
                return Polygon::empty();
            }
            continue;
        }
        if dist > 2.0 * polygon.max_distance_from(si) {
            break;
        }
        let midpoint = (si + sj) * 0.5;
        polygon = polygon.clip_half_plane(midpoint, si - sj, epsilon);
    }
    polygon
}

/// Verify the coverage invariant by total-area reconciliation
///
/// The cells are interiors of disjoint half-plane intersections, so equal
/// total area implies no gaps and no overlaps beyond tolerance. Tolerance
/// combines a relative term with an epsilon band along all cell boundaries.
fn check_area_reconciliation(polygons: &[Polygon], bounds: &Rect, epsilon: f32) -> Result<()> {
    let expected = bounds.area();
    let actual: f32 = polygons.iter().map(Polygon::area).sum();
    let perimeter_sum: f32 = polygons.iter().map(Polygon::perimeter).sum();
    let tolerance = (expected * 1e-4).max(epsilon * perimeter_sum);
    if (actual - expected).abs() > tolerance {
        return Err(TextureError::PartitionIntegrity {
            expected_area: expected,
            actual_area: actual,
        });
    }
    Ok(())
}

/// Recover cell adjacency from the finished polygons
///
/// An edge of cell `i` is shared with cell `j` exactly when its midpoint is
/// equidistant from both seeds. Edges on the canvas boundary have no such
/// partner and are skipped. The relation is recorded symmetrically and each
/// list is returned ascending for deterministic output.
fn find_neighbors(seeds: &[Vec2], polygons: &[Polygon], epsilon: f32) -> Vec<Vec<usize>> {
    let tolerance = epsilon * 8.0;
    let mut sets: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); seeds.len()];

    for (i, polygon) in polygons.iter().enumerate() {
        let verts = polygon.vertices();
        let n = verts.len();
        for k in 0..n {
            let midpoint = (verts[k] + verts[(k + 1) % n]) * 0.5;
            let own_dist = seeds[i].distance(midpoint);

            let mut best: Option<(usize, f32)> = None;
            for (j, &sj) in seeds.iter().enumerate() {
                if j == i {
                    continue;
                }
                let d = sj.distance(midpoint);
                if best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((j, d));
                }
            }
            if let Some((j, d)) = best {
                if (d - own_dist).abs() <= tolerance {
                    sets[i].insert(j);
                    sets[j].insert(i);
                }
            }
        }
    }

    sets.into_iter()
        .map(|s| s.into_iter().collect())
        .collect()
}
