//! Horde Survivor - top-down wave survival arena
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, weapons, waves, upgrade draft)
//! - `tuning`: Data-driven game balance
//! - `settings`: Persisted player preferences
//! - `error`: Error type for the file-backed layers

pub mod error;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{GameError, Result};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;

    /// Map grid dimensions (tiles per side)
    pub const MAP_TILES: u32 = 100;
    /// Scaled tile size in world units
    pub const TILE_SIZE: f32 = 32.0;

    /// Roster caps
    pub const MAX_WEAPONS: usize = 7;
    pub const MAX_SKILLS: usize = 14;
}

/// Unit vector for an angle in radians
#[inline]
pub fn unit_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(std::f32::consts::TAU)
}
