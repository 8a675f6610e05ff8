//! Planar geometry for move validation
//!
//! Positions are (longitude, latitude) pairs treated as a flat Euclidean
//! plane; at survey scale the geodetic distortion is far below the step
//! distance. The active zone set is always an explicit parameter - no
//! hidden state, so every function here is testable in isolation.

use glam::DVec2;

use super::state::Heading;
use crate::error::SurveyError;

/// Closed polygon the flight path must never cross
#[derive(Debug, Clone, PartialEq)]
pub struct NoFlyZone {
    vertices: Vec<DVec2>,
}

impl NoFlyZone {
    /// A zone from its vertices in boundary order; needs at least 3
    pub fn new(vertices: Vec<DVec2>) -> Result<Self, SurveyError> {
        if vertices.len() < 3 {
            return Err(SurveyError::DegenerateZone(vertices.len()));
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    /// Edges in vertex order, closing edge (last -> first) included
    pub fn edges(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// Bearing from `from` to `to`, rounded to the nearest multiple of 10
/// degrees and reduced modulo 360.
///
/// Total for all distinct point pairs; callers must not pass `from == to`.
pub fn quantized_bearing(from: DVec2, to: DVec2) -> Heading {
    let delta = to - from;
    let mut radians = delta.y.atan2(delta.x);
    if radians < 0.0 {
        radians += std::f64::consts::TAU;
    }
    let degrees = radians.to_degrees();
    Heading::from_index(((degrees / 10.0).round() as u16) % Heading::COUNT)
}

/// Direction of `p` relative to the segment `a -> b` (positive = left)
#[inline]
fn direction(a: DVec2, b: DVec2, p: DVec2) -> f64 {
    (b - a).perp_dot(p - a)
}

/// Whether `p`, known collinear with segment `a -> b`, lies on it
fn on_segment(a: DVec2, b: DVec2, p: DVec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Segment intersection test, endpoints and collinear overlap included
pub fn segments_intersect(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> bool {
    let d1 = direction(p3, p4, p1);
    let d2 = direction(p3, p4, p2);
    let d3 = direction(p1, p2, p3);
    let d4 = direction(p1, p2, p4);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(p3, p4, p1))
        || (d2 == 0.0 && on_segment(p3, p4, p2))
        || (d3 == 0.0 && on_segment(p1, p2, p3))
        || (d4 == 0.0 && on_segment(p1, p2, p4))
}

/// Test a candidate move segment against every zone edge.
///
/// On the first intersecting edge found, returns that edge's quantized
/// bearing (first vertex to second) as a deflection suggestion. Zones are
/// scanned in load order and edges in vertex order; the first hit wins, no
/// attempt is made to find a "best" intersection.
pub fn blocking_deflection(from: DVec2, to: DVec2, zones: &[NoFlyZone]) -> Option<Heading> {
    for zone in zones {
        for (a, b) in zone.edges() {
            if segments_intersect(from, to, a, b) {
                return Some(quantized_bearing(a, b));
            }
        }
    }
    None
}
