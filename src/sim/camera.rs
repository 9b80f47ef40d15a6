//! Delayed-follow camera
//!
//! Holds still for a few ticks after the player starts moving, then eases
//! toward the player. Stopping snaps it onto the target.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bounds::{Aabb, WorldBounds};
use crate::tuning::Tuning;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Top-left corner of the viewport in world units
    pub pos: Vec2,
    pub viewport: Vec2,
    /// Ticks left before the camera starts following
    pub delay_timer: u32,
    was_moving: bool,
}

impl Camera {
    /// Camera already centered on `focus`
    pub fn new(focus: Vec2, tuning: &Tuning, bounds: &WorldBounds) -> Self {
        let mut camera = Self {
            pos: Vec2::ZERO,
            viewport: Vec2::new(tuning.viewport_width, tuning.viewport_height),
            delay_timer: 0,
            was_moving: false,
        };
        camera.pos = camera.target_for(focus, bounds);
        camera
    }

    /// Clamped top-left position that centers `focus`
    pub fn target_for(&self, focus: Vec2, bounds: &WorldBounds) -> Vec2 {
        let desired = focus - self.viewport * 0.5;
        let max = Vec2::new(
            (bounds.width - self.viewport.x).max(0.0),
            (bounds.height - self.viewport.y).max(0.0),
        );
        desired.clamp(Vec2::ZERO, max)
    }

    pub fn update(&mut self, focus: Vec2, moving: bool, bounds: &WorldBounds, tuning: &Tuning) {
        let target = self.target_for(focus, bounds);

        if !moving {
            self.delay_timer = 0;
            self.pos = target;
            self.was_moving = false;
            return;
        }

        // The tick motion starts on counts toward the delay
        if !self.was_moving {
            self.delay_timer = tuning.camera_delay;
        }
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        } else {
            self.pos += (target - self.pos) * tuning.camera_follow;
        }

        self.was_moving = moving;
    }

    /// Adopt a new viewport size (tuning swap on resize)
    pub fn resize(&mut self, viewport: Vec2, bounds: &WorldBounds) {
        let center = self.pos + self.viewport * 0.5;
        self.viewport = viewport;
        self.pos = self.target_for(center, bounds);
    }

    /// Visible area in world units
    pub fn view_rect(&self) -> Aabb {
        Aabb::from_origin_size(self.pos, self.viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Tuning, WorldBounds) {
        let tuning = Tuning::default();
        let bounds = WorldBounds::from_tuning(&tuning);
        (tuning, bounds)
    }

    #[test]
    fn test_target_is_clamped_to_world() {
        let (tuning, bounds) = setup();
        let camera = Camera::new(Vec2::new(10.0, 10.0), &tuning, &bounds);
        assert_eq!(camera.pos, Vec2::ZERO);

        let far = Camera::new(Vec2::new(5000.0, 5000.0), &tuning, &bounds);
        assert_eq!(far.pos, Vec2::new(3200.0 - 1280.0, 3200.0 - 720.0));
    }

    #[test]
    fn test_delay_then_ease() {
        let (tuning, bounds) = setup();
        let start = bounds.center();
        let mut camera = Camera::new(start, &tuning, &bounds);
        let origin = camera.pos;
        let moved = start + Vec2::new(200.0, 0.0);

        // Held for exactly `camera_delay` ticks, the starting one included
        for held in 0..tuning.camera_delay {
            camera.update(moved, true, &bounds, &tuning);
            assert_eq!(camera.pos, origin, "moved on held tick {held}");
        }
        assert_eq!(camera.delay_timer, 0);

        camera.update(moved, true, &bounds, &tuning);
        let expected = origin.x + 200.0 * tuning.camera_follow;
        assert!((camera.pos.x - expected).abs() < 1e-3);
    }

    #[test]
    fn test_zero_delay_follows_at_once() {
        let (tuning, bounds) = setup();
        let tuning = Tuning {
            camera_delay: 0,
            ..tuning
        };
        let start = bounds.center();
        let mut camera = Camera::new(start, &tuning, &bounds);
        let origin = camera.pos;
        camera.update(start + Vec2::new(100.0, 0.0), true, &bounds, &tuning);
        assert!(camera.pos.x > origin.x);
    }

    #[test]
    fn test_stop_snaps() {
        let (tuning, bounds) = setup();
        let start = bounds.center();
        let mut camera = Camera::new(start, &tuning, &bounds);
        let moved = start + Vec2::new(300.0, 100.0);
        camera.update(moved, true, &bounds, &tuning);
        camera.update(moved, false, &bounds, &tuning);
        assert_eq!(camera.pos, camera.target_for(moved, &bounds));
    }
}
