//! Game balance table
//!
//! Every distance is in world units, every speed in world units per tick and
//! every duration in ticks (60 Hz). A `Tuning` value is immutable once handed
//! to a [`GameState`](crate::sim::GameState); a resize builds a new value with
//! [`Tuning::with_viewport`] and swaps it in between ticks.
//!
//! JSON overrides may name any subset of fields; the rest keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{MAP_TILES, MAX_SKILLS, MAX_WEAPONS, TILE_SIZE};
use crate::error::GameError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // ── World ────────────────────────────────────────────────────────────
    pub map_tiles: u32,
    pub tile_size: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,

    // ── Player ───────────────────────────────────────────────────────────
    pub player_size: f32,
    pub player_max_health: f32,
    /// Acceleration per tick on each commanded axis
    pub player_speed: f32,
    /// Velocity retention per tick, in (0, 1)
    pub player_friction: f32,

    // ── Enemies ──────────────────────────────────────────────────────────
    pub enemy_size: f32,
    pub enemy_speed: f32,
    pub enemy_max_speed: f32,
    pub enemy_health: f32,
    /// Contact damage per tick of overlap
    pub enemy_damage: f32,
    /// Fractional health growth per wave past the first
    pub enemy_health_per_wave: f32,
    /// Fractional speed growth per wave past the first
    pub enemy_speed_per_wave: f32,
    pub enemy_jitter_interval: u32,
    pub enemy_jitter: f32,
    pub special_chance: f64,
    pub special_health_mult: f32,
    pub special_size_mult: f32,
    pub special_damage_mult: f32,

    // ── Waves ────────────────────────────────────────────────────────────
    pub wave_base_target: u32,
    pub wave_target_step: u32,
    pub spawn_base_delay: u32,
    pub spawn_min_delay: u32,
    /// Spawn delay ratio per wave, in (0, 1)
    pub spawn_delay_ratio: f32,
    /// Spawn halo around the camera, in tiles
    pub spawn_margin_tiles: f32,
    pub wave_bonus_multiplier: u64,
    /// First wave whose arrival opens an upgrade draft
    pub draft_start_wave: u32,

    // ── Score ────────────────────────────────────────────────────────────
    pub score_per_kill: u64,
    pub score_per_lightning_kill: u64,

    // ── Rosters ──────────────────────────────────────────────────────────
    pub max_weapons: usize,
    pub max_skills: usize,
    pub weapon_max_level: u32,
    pub skill_max_level: u32,

    // ── Cannon ───────────────────────────────────────────────────────────
    pub cannon_range: f32,
    pub cannon_cooldown: u32,
    pub cannon_cooldown_step: u32,
    pub cannon_min_cooldown: u32,
    pub cannon_damage: f32,
    pub cannon_damage_step: f32,
    pub zap_speed: f32,
    pub zap_size: f32,
    /// Zaps die once they leave the camera rect grown by this much
    pub zap_cull_margin: f32,

    // ── Lightning ────────────────────────────────────────────────────────
    pub lightning_range: f32,
    pub lightning_chain_range: f32,
    /// Extra hops after the primary strike at level 1
    pub lightning_chain_count: u32,
    pub lightning_chain_step: u32,
    pub lightning_damage: f32,
    pub lightning_damage_step: f32,
    pub lightning_cooldown: u32,
    pub lightning_life: u32,
    /// Interior zig-zag points per hop
    pub lightning_zigzag_points: u32,
    pub lightning_zigzag_offset: f32,

    // ── Beam ─────────────────────────────────────────────────────────────
    pub beam_range: f32,
    pub beam_length: f32,
    pub beam_thickness: f32,
    pub beam_cadence: u32,
    pub beam_damage: f32,
    pub beam_damage_step: f32,
    pub beam_lifetime: u32,
    pub beam_lifetime_step: u32,
    pub beam_cooldown: u32,

    // ── Orb ──────────────────────────────────────────────────────────────
    pub orb_radius: f32,
    /// Radians per tick
    pub orb_angular_speed: f32,
    pub orb_size: f32,
    pub orb_damage: f32,
    pub orb_damage_step: f32,

    // ── Skills ───────────────────────────────────────────────────────────
    /// Acceleration multiplier added per Speed level
    pub speed_skill_step: f32,
    pub shield_skill_refresh: u32,
    pub shield_skill_refresh_step: u32,
    pub shield_skill_min_refresh: u32,
    pub shield_max_charges: u32,
    /// Health restored per tick per Regen level
    pub regen_per_level: f32,

    // ── Bonuses ──────────────────────────────────────────────────────────
    pub time_slow_frames: u32,
    pub time_slow_factor: f32,
    pub freeze_frames: u32,
    pub invincibility_frames: u32,
    pub damage_boost_frames: u32,
    pub damage_boost_factor: f32,
    pub shield_bonus_charges: u32,
    pub heal_amount: f32,

    // ── Camera ───────────────────────────────────────────────────────────
    pub camera_delay: u32,
    /// Easing factor per tick, in (0, 1)
    pub camera_follow: f32,

    // ── Draft ────────────────────────────────────────────────────────────
    pub draft_options: usize,
    pub draft_rolls: u32,
    pub draft_bans: u32,

    // ── Particles ────────────────────────────────────────────────────────
    pub max_particles: usize,
    pub particle_life: u32,
    pub particle_gravity: f32,
    pub particle_drag: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            map_tiles: MAP_TILES,
            tile_size: TILE_SIZE,
            viewport_width: 1280.0,
            viewport_height: 720.0,

            player_size: 32.0,
            player_max_health: 100.0,
            player_speed: 0.6,
            player_friction: 0.85,

            enemy_size: 28.0,
            enemy_speed: 1.2,
            enemy_max_speed: 3.0,
            enemy_health: 20.0,
            enemy_damage: 0.5,
            enemy_health_per_wave: 0.15,
            enemy_speed_per_wave: 0.03,
            enemy_jitter_interval: 30,
            enemy_jitter: 0.5,
            special_chance: 0.08,
            special_health_mult: 3.0,
            special_size_mult: 1.3,
            special_damage_mult: 1.5,

            wave_base_target: 10,
            wave_target_step: 5,
            spawn_base_delay: 60,
            spawn_min_delay: 12,
            spawn_delay_ratio: 0.9,
            spawn_margin_tiles: 2.0,
            wave_bonus_multiplier: 50,
            draft_start_wave: 3,

            score_per_kill: 10,
            score_per_lightning_kill: 15,

            max_weapons: MAX_WEAPONS,
            max_skills: MAX_SKILLS,
            weapon_max_level: 5,
            skill_max_level: 5,

            cannon_range: 450.0,
            cannon_cooldown: 45,
            cannon_cooldown_step: 6,
            cannon_min_cooldown: 15,
            cannon_damage: 10.0,
            cannon_damage_step: 4.0,
            zap_speed: 9.0,
            zap_size: 10.0,
            zap_cull_margin: 64.0,

            lightning_range: 350.0,
            lightning_chain_range: 150.0,
            lightning_chain_count: 3,
            lightning_chain_step: 1,
            lightning_damage: 14.0,
            lightning_damage_step: 5.0,
            lightning_cooldown: 90,
            lightning_life: 12,
            lightning_zigzag_points: 5,
            lightning_zigzag_offset: 8.0,

            beam_range: 500.0,
            beam_length: 300.0,
            beam_thickness: 16.0,
            beam_cadence: 10,
            beam_damage: 5.0,
            beam_damage_step: 2.0,
            beam_lifetime: 30,
            beam_lifetime_step: 10,
            beam_cooldown: 150,

            orb_radius: 96.0,
            orb_angular_speed: std::f32::consts::PI / 60.0,
            orb_size: 22.0,
            orb_damage: 1.5,
            orb_damage_step: 0.5,

            speed_skill_step: 0.1,
            shield_skill_refresh: 600,
            shield_skill_refresh_step: 90,
            shield_skill_min_refresh: 180,
            shield_max_charges: 5,
            regen_per_level: 0.01,

            time_slow_frames: 300,
            time_slow_factor: 0.5,
            freeze_frames: 180,
            invincibility_frames: 240,
            damage_boost_frames: 300,
            damage_boost_factor: 2.0,
            shield_bonus_charges: 2,
            heal_amount: 30.0,

            camera_delay: 12,
            camera_follow: 0.1,

            draft_options: 3,
            draft_rolls: 3,
            draft_bans: 3,

            max_particles: 512,
            particle_life: 30,
            particle_gravity: 0.05,
            particle_drag: 0.94,
        }
    }
}

impl Tuning {
    /// Parse overrides from a JSON document; the result is validated
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load overrides from a JSON file
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject tables the simulation cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        let unit_open = |v: f32| v > 0.0 && v < 1.0;
        let bad = |msg: String| -> crate::Result<()> { Err(GameError::InvalidTuning(msg)) };

        if self.map_tiles == 0 || !(self.tile_size > 0.0) {
            return bad("empty world".to_string());
        }
        if !(self.viewport_width > 0.0 && self.viewport_height > 0.0) {
            return bad("viewport must be positive".to_string());
        }
        if !unit_open(self.player_friction) {
            return bad(format!("player_friction {} outside (0, 1)", self.player_friction));
        }
        if !unit_open(self.spawn_delay_ratio) {
            return bad(format!("spawn_delay_ratio {} outside (0, 1)", self.spawn_delay_ratio));
        }
        if !(self.camera_follow > 0.0 && self.camera_follow <= 1.0) {
            return bad(format!("camera_follow {} outside (0, 1]", self.camera_follow));
        }
        if self.enemy_jitter_interval == 0 {
            return bad("enemy_jitter_interval must be at least 1".to_string());
        }
        if !(self.enemy_jitter >= 0.0 && self.enemy_jitter.is_finite()) {
            return bad(format!("enemy_jitter {} must be finite and >= 0", self.enemy_jitter));
        }
        if !(self.lightning_zigzag_offset >= 0.0 && self.lightning_zigzag_offset.is_finite()) {
            return bad(format!(
                "lightning_zigzag_offset {} must be finite and >= 0",
                self.lightning_zigzag_offset
            ));
        }
        if self.shield_skill_min_refresh == 0 {
            return bad("shield_skill_min_refresh must be at least 1".to_string());
        }
        if self.max_weapons > MAX_WEAPONS || self.max_skills > MAX_SKILLS {
            return bad(format!(
                "rosters capped at {MAX_WEAPONS} weapons and {MAX_SKILLS} skills"
            ));
        }
        if self.weapon_max_level == 0 || self.skill_max_level == 0 {
            return bad("max levels must be at least 1".to_string());
        }
        Ok(())
    }

    /// Copy of this table for a new viewport size
    pub fn with_viewport(&self, width: f32, height: f32) -> Self {
        Self {
            viewport_width: width.max(1.0),
            viewport_height: height.max(1.0),
            ..self.clone()
        }
    }

    /// World extent along one axis
    pub fn world_extent(&self) -> f32 {
        self.map_tiles as f32 * self.tile_size
    }

    /// Spawn halo width in world units
    pub fn spawn_margin(&self) -> f32 {
        self.spawn_margin_tiles * self.tile_size
    }
}
