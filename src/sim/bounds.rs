//! World bounds and axis-aligned rectangles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Axis-aligned rectangle, `min` inclusive, `max` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Grow on every side by `margin`
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }
}

/// The playable rectangle `[0, W) × [0, H)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Bounds of the square tile map described by the tuning table
    pub fn from_tuning(tuning: &Tuning) -> Self {
        let extent = tuning.world_extent();
        Self::new(extent, extent)
    }

    pub fn rect(&self) -> Aabb {
        Aabb::new(Vec2::ZERO, Vec2::new(self.width, self.height))
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width, self.height) * 0.5
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.rect().contains(p)
    }

    /// Clamp a point into the bounds
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(0.0, next_down(self.width)),
            p.y.clamp(0.0, next_down(self.height)),
        )
    }

    /// Clamp the center of a body of the given size so the body stays inside.
    ///
    /// Returns the clamped center and, per axis, whether clamping occurred.
    pub fn clamp_body(&self, center: Vec2, size: f32) -> (Vec2, bool, bool) {
        let half = (size * 0.5).min(self.width * 0.5).min(self.height * 0.5);
        let x = center.x.clamp(half, self.width - half);
        let y = center.y.clamp(half, self.height - half);
        (Vec2::new(x, y), x != center.x, y != center.y)
    }
}

/// Largest float strictly below `v` (for half-open upper edges)
fn next_down(v: f32) -> f32 {
    if v <= 0.0 {
        0.0
    } else {
        f32::from_bits(v.to_bits() - 1)
    }
}
