//! Collision tests
//!
//! Every body is a centered circle whose radius is half its size. Beams are
//! capsules: a segment with an explicit band thickness.

use glam::Vec2;

/// Centered-circle overlap for two bodies given by their sizes (diameters)
#[inline]
pub fn circles_overlap(a: Vec2, size_a: f32, b: Vec2, size_b: f32) -> bool {
    let reach = (size_a + size_b) * 0.5;
    a.distance_squared(b) < reach * reach
}

/// Closest point to `p` on segment `a`-`b`
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Distance from `p` to segment `a`-`b`
#[inline]
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    p.distance(closest_point_on_segment(p, a, b))
}

/// Whether a point lies inside the band of width `thickness` around a segment
#[inline]
pub fn point_in_band(p: Vec2, a: Vec2, b: Vec2, thickness: f32) -> bool {
    point_segment_distance(p, a, b) <= thickness * 0.5
}

/// Capsule-vs-circle: segment with band thickness against a sized body
#[inline]
pub fn capsule_circle_overlap(a: Vec2, b: Vec2, thickness: f32, center: Vec2, size: f32) -> bool {
    point_in_band(center, a, b, thickness + size)
}
