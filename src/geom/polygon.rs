//! Immutable polygon values and clipping predicates

use glam::Vec2;

use crate::error::{Result, TextureError};

/// An immutable simple polygon: an ordered ring of points
///
/// Invariants enforced at construction:
/// - at least 3 distinct, non-collinear vertices after epsilon cleanup
/// - no self-intersecting edges
///
/// The explicitly empty polygon (`Polygon::empty`) represents a cell whose
/// seed is fully dominated by its neighbors; it has zero area and contains
/// no points.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
}

impl Polygon {
    /// Construct a polygon from an ordered ring of points
    ///
    /// Near-duplicate and near-collinear vertices are removed using the
    /// epsilon tolerance before validation.
    ///
    /// # Errors
    ///
    /// Returns `DegenerateGeometry` when fewer than 3 usable vertices remain
    /// after cleanup, or when the ring self-intersects.
    pub fn new(vertices: Vec<Vec2>, epsilon: f32) -> Result<Self> {
        let cleaned = cleanup_ring(vertices, epsilon);
        if cleaned.len() < 3 {
            return Err(TextureError::DegenerateGeometry {
                cell: None,
                vertices: cleaned.len(),
            });
        }
        if ring_self_intersects(&cleaned) {
            return Err(TextureError::DegenerateGeometry {
                cell: None,
                vertices: cleaned.len(),
            });
        }
        Ok(Self { vertices: cleaned })
    }

    /// The empty polygon: zero area, contains no points
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
        }
    }

    /// Construct from clipping output
    ///
    /// Clipping a valid ring against a half-plane cannot introduce a
    /// self-intersection, so only cleanup runs. Fewer than 3 surviving
    /// vertices yields the empty polygon, never an error: a clip that
    /// removes everything is a valid result.
    pub(crate) fn from_clip(vertices: Vec<Vec2>, epsilon: f32) -> Self {
        let cleaned = cleanup_ring(vertices, epsilon);
        if cleaned.len() < 3 {
            Self::empty()
        } else {
            Self { vertices: cleaned }
        }
    }

    /// Construct from a ring known to be valid (crate-internal)
    pub(crate) fn from_raw(vertices: Vec<Vec2>) -> Self {
        debug_assert!(vertices.len() >= 3);
        Self { vertices }
    }

    /// The polygon's vertices in ring order
    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Whether this is the empty polygon
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Signed area via the shoelace formula (positive for counter-clockwise)
    pub fn signed_area(&self) -> f32 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            sum += a.x * b.y - b.x * a.y;
        }
        sum * 0.5
    }

    /// Absolute area
    #[inline]
    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    /// Total boundary length
    pub fn perimeter(&self) -> f32 {
        let n = self.vertices.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| self.vertices[i].distance(self.vertices[(i + 1) % n]))
            .sum()
    }

    /// Area centroid
    ///
    /// Falls back to the vertex average for near-zero-area rings where the
    /// area-weighted formula is numerically meaningless.
    pub fn centroid(&self) -> Vec2 {
        let n = self.vertices.len();
        if n == 0 {
            return Vec2::ZERO;
        }
        let signed = self.signed_area();
        if signed.abs() < f32::EPSILON {
            let sum: Vec2 = self.vertices.iter().copied().sum();
            return sum / n as f32;
        }
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let cross = a.x * b.y - b.x * a.y;
            cx += (a.x + b.x) * cross;
            cy += (a.y + b.y) * cross;
        }
        Vec2::new(cx, cy) / (6.0 * signed)
    }

    /// Point containment test, boundary inclusive
    ///
    /// Points within `epsilon` of the boundary count as contained, matching
    /// the rasterizer's convention that boundary pixels always resolve to a
    /// cell rather than falling through a seam.
    pub fn contains(&self, p: Vec2, epsilon: f32) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            if point_segment_distance(p, a, b) <= epsilon {
                return true;
            }
            if (a.y > p.y) != (b.y > p.y) {
                let t = (p.y - a.y) / (b.y - a.y);
                if a.x + t * (b.x - a.x) > p.x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Whether all interior angles turn the same way
    pub fn is_convex(&self, epsilon: f32) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut sign = 0.0f32;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let c = self.vertices[(i + 2) % n];
            let cross = (b - a).perp_dot(c - b);
            if cross.abs() <= epsilon {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }

    /// Largest distance from `p` to any vertex
    ///
    /// Used by the tessellator's early-out: a bisector further than twice
    /// this radius cannot cut the polygon.
    pub fn max_distance_from(&self, p: Vec2) -> f32 {
        self.vertices
            .iter()
            .map(|v| v.distance(p))
            .fold(0.0, f32::max)
    }

    /// Clip to the half-plane `{ x : normal · (x − origin) ≥ 0 }`
    ///
    /// Sutherland–Hodgman against a single boundary line. Returns the empty
    /// polygon when nothing survives; never an error.
    pub fn clip_half_plane(&self, origin: Vec2, normal: Vec2, epsilon: f32) -> Polygon {
        let n = self.vertices.len();
        if n < 3 {
            return Polygon::empty();
        }
        let mut out: Vec<Vec2> = Vec::with_capacity(n + 1);
        for i in 0..n {
            let cur = self.vertices[i];
            let nxt = self.vertices[(i + 1) % n];
            let dc = normal.dot(cur - origin);
            let dn = normal.dot(nxt - origin);
            if dc >= 0.0 {
                out.push(cur);
            }
            if (dc > 0.0 && dn < 0.0) || (dc < 0.0 && dn > 0.0) {
                let t = dc / (dc - dn);
                out.push(cur + (nxt - cur) * t);
            }
        }
        Polygon::from_clip(out, epsilon)
    }

    /// Clip to an axis-aligned bounding region
    ///
    /// Returns the empty polygon (not an error) when no overlap exists.
    pub fn clip_rect(&self, rect: &super::Rect, epsilon: f32) -> Polygon {
        self.clip_half_plane(rect.min, Vec2::X, epsilon)
            .clip_half_plane(rect.max, -Vec2::X, epsilon)
            .clip_half_plane(rect.min, Vec2::Y, epsilon)
            .clip_half_plane(rect.max, -Vec2::Y, epsilon)
    }
}

/// Remove near-duplicate and near-collinear vertices from a ring
fn cleanup_ring(points: Vec<Vec2>, epsilon: f32) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::with_capacity(points.len());
    for p in points {
        if let Some(&last) = out.last() {
            if last.distance(p) <= epsilon {
                continue;
            }
        }
        out.push(p);
    }
    while out.len() >= 2 {
        let first = out[0];
        let last = *out.last().unwrap_or(&first);
        if first.distance(last) <= epsilon {
            out.pop();
        } else {
            break;
        }
    }

    // Drop vertices whose removal changes the boundary by less than epsilon
    let mut i = 0;
    while out.len() >= 3 && i < out.len() {
        let n = out.len();
        let a = out[(i + n - 1) % n];
        let b = out[i];
        let c = out[(i + 1) % n];
        let ac = c - a;
        let deviation = if ac.length() <= epsilon {
            0.0
        } else {
            ac.perp_dot(b - a).abs() / ac.length()
        };
        if deviation <= epsilon {
            out.remove(i);
        } else {
            i += 1;
        }
    }
    out
}

/// Distance from a point to a segment
fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Check whether any two non-adjacent edges of the ring properly cross
fn ring_self_intersects(ring: &[Vec2]) -> bool {
    let n = ring.len();
    for i in 0..n {
        let (a1, a2) = (ring[i], ring[(i + 1) % n]);
        for j in (i + 1)..n {
            // Skip adjacent edges (they share an endpoint)
            if j == i || (j + 1) % n == i || (i + 1) % n == j {
                continue;
            }
            let (b1, b2) = (ring[j], ring[(j + 1) % n]);
            if segments_properly_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

/// Proper crossing test: segments intersect at an interior point of both
fn segments_properly_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let d1 = (a2 - a1).perp_dot(b1 - a1);
    let d2 = (a2 - a1).perp_dot(b2 - a1);
    let d3 = (b2 - b1).perp_dot(a1 - b1);
    let d4 = (b2 - b1).perp_dot(a2 - b1);
    (d1 > 0.0) != (d2 > 0.0) && (d3 > 0.0) != (d4 > 0.0) && d1 != 0.0 && d2 != 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Rect;

    const EPS: f32 = 1e-4;

    fn unit_square() -> Polygon {
        Polygon::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
            EPS,
        )
        .unwrap()
    }

    #[test]
    fn test_area_and_centroid() {
        let square = unit_square();
        assert!((square.area() - 1.0).abs() < 1e-6);
        assert!(square.centroid().distance(Vec2::new(0.5, 0.5)) < 1e-5);
        assert!((square.perimeter() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_rejected() {
        let result = Polygon::new(vec![Vec2::ZERO, Vec2::new(1.0, 0.0)], EPS);
        assert!(matches!(
            result,
            Err(TextureError::DegenerateGeometry { vertices: 2, .. })
        ));
    }

    #[test]
    fn test_collinear_ring_rejected() {
        let result = Polygon::new(
            vec![Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)],
            EPS,
        );
        assert!(matches!(
            result,
            Err(TextureError::DegenerateGeometry { .. })
        ));
    }

    #[test]
    fn test_self_intersecting_rejected() {
        // Bowtie
        let result = Polygon::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 1.0),
            ],
            EPS,
        );
        assert!(matches!(
            result,
            Err(TextureError::DegenerateGeometry { .. })
        ));
    }

    #[test]
    fn test_duplicate_vertices_cleaned() {
        let poly = Polygon::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 0.00001),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
            EPS,
        )
        .unwrap();
        assert_eq!(poly.vertices().len(), 4);
    }

    #[test]
    fn test_contains() {
        let square = unit_square();
        assert!(square.contains(Vec2::new(0.5, 0.5), EPS));
        assert!(!square.contains(Vec2::new(1.5, 0.5), EPS));
        // Boundary points count as contained
        assert!(square.contains(Vec2::new(1.0, 0.5), EPS));
        assert!(square.contains(Vec2::new(0.0, 0.0), EPS));
    }

    #[test]
    fn test_empty_contains_nothing() {
        assert!(!Polygon::empty().contains(Vec2::ZERO, EPS));
        assert_eq!(Polygon::empty().area(), 0.0);
    }

    #[test]
    fn test_clip_half_plane_splits_area() {
        let square = unit_square();
        // Keep the half with x >= 0.5
        let clipped = square.clip_half_plane(Vec2::new(0.5, 0.0), Vec2::X, EPS);
        assert!((clipped.area() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_clip_half_plane_no_overlap_is_empty() {
        let square = unit_square();
        let clipped = square.clip_half_plane(Vec2::new(2.0, 0.0), Vec2::X, EPS);
        assert!(clipped.is_empty());
    }

    #[test]
    fn test_clip_half_plane_full_keep() {
        let square = unit_square();
        let clipped = square.clip_half_plane(Vec2::new(-1.0, 0.0), Vec2::X, EPS);
        assert!((clipped.area() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_clip_rect() {
        let square = unit_square();
        let rect = Rect::new(Vec2::new(0.25, 0.25), Vec2::new(2.0, 2.0));
        let clipped = square.clip_rect(&rect, EPS);
        assert!((clipped.area() - 0.5625).abs() < 1e-4);

        let far = Rect::new(Vec2::new(5.0, 5.0), Vec2::new(6.0, 6.0));
        assert!(square.clip_rect(&far, EPS).is_empty());
    }

    #[test]
    fn test_convexity() {
        assert!(unit_square().is_convex(EPS));
        let l_shape = Polygon::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(2.0, 0.0),
                Vec2::new(2.0, 1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, 2.0),
                Vec2::new(0.0, 2.0),
            ],
            EPS,
        )
        .unwrap();
        assert!(!l_shape.is_convex(EPS));
    }

    #[test]
    fn test_max_distance_from() {
        let square = unit_square();
        let d = square.max_distance_from(Vec2::new(0.5, 0.5));
        assert!((d - (0.5f32 * 0.5 + 0.5 * 0.5).sqrt()).abs() < 1e-5);
    }
}
