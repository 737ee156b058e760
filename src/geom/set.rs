//! Boolean set operations over polygon collections
//!
//! A `PolygonSet` is a collection of disjoint-or-adjacent polygons. The
//! boolean operations are implemented by half-plane decomposition: every
//! clip step reduces to `Polygon::clip_half_plane`, which keeps the whole
//! kernel on one numeric code path. The decomposition is exact for convex
//! clip operands; every polygon the tessellator produces is convex (an
//! intersection of half-planes clipped to a rect), so the engine-facing
//! contract is fully covered. Non-convex clip operands are rejected rather
//! than silently dropping area.

use glam::Vec2;

use super::Polygon;
use crate::error::{Result, TextureError};

/// A collection of disjoint-or-adjacent polygons
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolygonSet {
    polygons: Vec<Polygon>,
}

impl PolygonSet {
    /// Create a set from polygons, dropping empty members
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self {
            polygons: polygons.into_iter().filter(|p| !p.is_empty()).collect(),
        }
    }

    /// The member polygons
    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Whether the set has no members
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Total area of all members
    pub fn area(&self) -> f32 {
        self.polygons.iter().map(Polygon::area).sum()
    }

    /// Intersection: pieces of `self` lying inside `other`
    ///
    /// # Errors
    ///
    /// Returns an error if a member of `other` is not convex.
    pub fn intersect(&self, other: &PolygonSet, epsilon: f32) -> Result<PolygonSet> {
        let mut result = Vec::new();
        for b in &other.polygons {
            let planes = convex_half_planes(b, epsilon)?;
            for a in &self.polygons {
                let mut piece = a.clone();
                for &(origin, normal) in &planes {
                    piece = piece.clip_half_plane(origin, normal, epsilon);
                    if piece.is_empty() {
                        break;
                    }
                }
                if !piece.is_empty() {
                    result.push(piece);
                }
            }
        }
        Ok(PolygonSet::new(result))
    }

    /// Difference: pieces of `self` lying outside `other`
    ///
    /// Each subtrahend member splits the subject into its half-plane cuts and
    /// keeps the outside piece of every cut, so concave results appear as
    /// multiple convex pieces and no area is lost.
    ///
    /// # Errors
    ///
    /// Returns an error if a member of `other` is not convex.
    pub fn difference(&self, other: &PolygonSet, epsilon: f32) -> Result<PolygonSet> {
        let mut pieces = self.polygons.clone();
        for b in &other.polygons {
            let planes = convex_half_planes(b, epsilon)?;
            let mut carved = Vec::with_capacity(pieces.len());
            for piece in pieces {
                let mut remaining = piece;
                for &(origin, normal) in &planes {
                    let outside = remaining.clip_half_plane(origin, -normal, epsilon);
                    if !outside.is_empty() {
                        carved.push(outside);
                    }
                    remaining = remaining.clip_half_plane(origin, normal, epsilon);
                    if remaining.is_empty() {
                        break;
                    }
                }
                // Whatever remains lies inside `b` and is removed
            }
            pieces = carved;
        }
        Ok(PolygonSet::new(pieces))
    }

    /// Union: all of `self` plus the parts of `other` outside `self`
    ///
    /// # Errors
    ///
    /// Returns an error if a member of `self` is not convex.
    pub fn union(&self, other: &PolygonSet, epsilon: f32) -> Result<PolygonSet> {
        let mut polygons = self.polygons.clone();
        let added = other.difference(self, epsilon)?;
        polygons.extend(added.polygons);
        Ok(PolygonSet::new(polygons))
    }
}

impl From<Polygon> for PolygonSet {
    fn from(polygon: Polygon) -> Self {
        PolygonSet::new(vec![polygon])
    }
}

/// Decompose a convex polygon into its interior half-planes
///
/// Each returned pair is (edge origin, inward normal). The ring is walked
/// counter-clockwise so the interior lies to the left of every edge.
fn convex_half_planes(polygon: &Polygon, epsilon: f32) -> Result<Vec<(Vec2, Vec2)>> {
    if !polygon.is_convex(epsilon) {
        return Err(TextureError::InvalidConfig(
            "boolean set operation requires convex clip polygons".to_string(),
        ));
    }
    let ccw: Vec<Vec2> = if polygon.signed_area() >= 0.0 {
        polygon.vertices().to_vec()
    } else {
        polygon.vertices().iter().rev().copied().collect()
    };
    let n = ccw.len();
    Ok((0..n)
        .map(|i| {
            let p = ccw[i];
            let q = ccw[(i + 1) % n];
            (p, (q - p).perp())
        })
        .collect())
}
