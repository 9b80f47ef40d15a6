//! Wave pacing and enemy spawning
//!
//! A wave is cleared once its quota has spawned and every enemy is dead.
//! Each new wave raises the quota and shortens the spawn delay geometrically.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bonus::BonusKind;
use super::bounds::{Aabb, WorldBounds};
use super::state::Enemy;
use crate::tuning::Tuning;

/// What the controller asks the orchestrator to do this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveEvent {
    Idle,
    /// Spawn one enemy
    Spawn,
    /// A new wave began
    Advanced { wave: u32, open_draft: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveController {
    pub wave_number: u32,
    pub target_this_wave: u32,
    pub spawned_this_wave: u32,
    pub spawn_timer: u32,
    pub spawn_delay: u32,
}

impl WaveController {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            wave_number: 1,
            target_this_wave: tuning.wave_base_target,
            spawned_this_wave: 0,
            spawn_timer: 0,
            spawn_delay: Self::spawn_delay_for(1, tuning),
        }
    }

    /// `max(min_delay, ⌊base · r^(wave−1)⌋)`
    pub fn spawn_delay_for(wave: u32, tuning: &Tuning) -> u32 {
        let exp = wave.saturating_sub(1) as i32;
        // Nudge so exact products like 60 · 0.9 don't floor one short in f32
        let scaled =
            (tuning.spawn_base_delay as f32 * tuning.spawn_delay_ratio.powi(exp) + 1e-3).floor();
        (scaled as u32).max(tuning.spawn_min_delay)
    }

    pub fn update(&mut self, enemies_alive: usize, tuning: &Tuning) -> WaveEvent {
        if self.spawned_this_wave < self.target_this_wave {
            self.spawn_timer += 1;
            if self.spawn_timer >= self.spawn_delay {
                self.spawn_timer = 0;
                self.spawned_this_wave += 1;
                return WaveEvent::Spawn;
            }
            return WaveEvent::Idle;
        }

        if enemies_alive == 0 {
            let wave = self.advance(tuning);
            return WaveEvent::Advanced {
                wave,
                open_draft: wave >= tuning.draft_start_wave,
            };
        }
        WaveEvent::Idle
    }

    /// Begin the next wave; returns its number
    pub fn advance(&mut self, tuning: &Tuning) -> u32 {
        self.wave_number += 1;
        self.target_this_wave += tuning.wave_target_step;
        self.spawned_this_wave = 0;
        self.spawn_timer = 0;
        self.spawn_delay = Self::spawn_delay_for(self.wave_number, tuning);
        self.wave_number
    }

    /// Enemies still to defeat this wave
    pub fn remaining(&self, enemies_alive: usize) -> u32 {
        self.target_this_wave.saturating_sub(self.spawned_this_wave) + enemies_alive as u32
    }
}

/// Point on a random side of the camera rect grown by `margin`, clamped to the world
pub fn spawn_position(view: Aabb, margin: f32, bounds: &WorldBounds, rng: &mut Pcg32) -> Vec2 {
    let halo = view.expanded(margin);
    let size = halo.size();
    let along: f32 = rng.random();
    let pos = match rng.random_range(0..4u8) {
        0 => Vec2::new(halo.min.x + along * size.x, halo.min.y),
        1 => Vec2::new(halo.max.x, halo.min.y + along * size.y),
        2 => Vec2::new(halo.min.x + along * size.x, halo.max.y),
        _ => Vec2::new(halo.min.x, halo.min.y + along * size.y),
    };
    bounds.clamp_point(pos)
}

/// Enemy stats for a wave tier; a bonus kind makes it special
pub fn make_enemy(id: u32, pos: Vec2, wave: u32, bonus: Option<BonusKind>, tuning: &Tuning) -> Enemy {
    let tier = wave.saturating_sub(1) as f32;
    let mut health = tuning.enemy_health * (1.0 + tuning.enemy_health_per_wave * tier);
    let speed = (tuning.enemy_speed * (1.0 + tuning.enemy_speed_per_wave * tier)).min(tuning.enemy_max_speed);
    let mut size = tuning.enemy_size;
    let mut damage = tuning.enemy_damage;
    if bonus.is_some() {
        health *= tuning.special_health_mult;
        size *= tuning.special_size_mult;
        damage *= tuning.special_damage_mult;
    }
    Enemy {
        id,
        pos,
        size,
        speed,
        max_health: health,
        health,
        damage,
        is_special: bonus.is_some(),
        bonus_type: bonus,
        wave_tier: wave,
        jitter: Vec2::ZERO,
        jitter_timer: 0,
        last_hit: None,
        purged: false,
    }
}

/// Roll a spawn: position in the halo, special with `special_chance`
pub fn roll_enemy(
    id: u32,
    view: Aabb,
    wave: u32,
    bounds: &WorldBounds,
    tuning: &Tuning,
    rng: &mut Pcg32,
) -> Enemy {
    let pos = spawn_position(view, tuning.spawn_margin(), bounds, rng);
    let bonus = if rng.random_bool(tuning.special_chance.clamp(0.0, 1.0)) {
        Some(BonusKind::ALL[rng.random_range(0..BonusKind::ALL.len())])
    } else {
        None
    };
    make_enemy(id, pos, wave, bonus, tuning)
}
