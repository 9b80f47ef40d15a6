//! Game state and core simulation types
//!
//! The orchestrator (`GameState`) exclusively owns every entity list and
//! manager. Entities refer to one another only by stable `u32` ids.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bonus::{BonusKind, BonusManager, BonusOutcome};
use super::bounds::WorldBounds;
use super::camera::Camera;
use super::draft::UpgradeDraft;
use super::skills::SkillManager;
use super::wave::WaveController;
use super::weapons::{Orb, WeaponKind, WeaponManager};
use crate::tuning::Tuning;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay (the upgrade draft may still suspend it)
    Playing,
    /// Game is paused
    Paused,
    /// Skills inspection overlay (simulation suspended)
    SkillsOverlay,
    /// Exit menu open (simulation suspended)
    ExitMenu,
    /// Player died; waiting for restart
    GameOver,
    /// Orchestrator should stop
    Quit,
}

/// What dealt a hit (lightning kills score differently)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    Zap,
    Lightning,
    Beam,
    Orb,
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Center position
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub max_health: f32,
    pub health: f32,
    pub friction: f32,
    pub base_speed: f32,
}

impl Player {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: tuning.player_size,
            max_health: tuning.player_max_health,
            health: tuning.player_max_health,
            friction: tuning.player_friction,
            base_speed: tuning.player_speed,
        }
    }

    /// Integrate one tick of movement for an axis intent in {-1, 0, 1}²
    pub fn step(&mut self, intent: Vec2, speed_mult: f32) {
        let accel = intent * self.base_speed * speed_mult;
        self.vel = (self.vel + accel) * self.friction;
        self.pos += self.vel;
    }

    /// Keep the body inside the world, zeroing velocity on contact axes
    pub fn clamp_to(&mut self, bounds: &WorldBounds) {
        let (pos, hit_x, hit_y) = bounds.clamp_body(self.pos, self.size);
        self.pos = pos;
        if hit_x {
            self.vel.x = 0.0;
        }
        if hit_y {
            self.vel.y = 0.0;
        }
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount.max(0.0)).min(self.max_health);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// A pursuing enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    /// Center position
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
    pub max_health: f32,
    pub health: f32,
    /// Contact damage per tick
    pub damage: f32,
    pub is_special: bool,
    pub bonus_type: Option<BonusKind>,
    pub wave_tier: u32,
    pub jitter: Vec2,
    pub jitter_timer: u32,
    /// Source of the most recent hit
    pub last_hit: Option<DamageSource>,
    /// Removed by a nuke rather than killed by a weapon
    #[serde(default)]
    pub purged: bool,
}

impl Enemy {
    /// Chase `target`, refreshing the wander jitter on its interval.
    ///
    /// An enemy sitting exactly on its target does not move.
    pub fn step(&mut self, target: Vec2, speed_mult: f32, tuning: &Tuning, rng: &mut Pcg32) {
        if self.jitter_timer == 0 {
            let j = tuning.enemy_jitter.max(0.0);
            self.jitter = if j > 0.0 && j.is_finite() {
                Vec2::new(rng.random_range(-j..=j), rng.random_range(-j..=j))
            } else {
                Vec2::ZERO
            };
            self.jitter_timer = tuning.enemy_jitter_interval.max(1);
        }
        self.jitter_timer -= 1;

        let to_target = target - self.pos;
        if to_target.length_squared() == 0.0 {
            return;
        }
        let dir = to_target.normalize_or_zero();
        self.pos += (dir + self.jitter) * self.speed * speed_mult;
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Subtract damage; returns true if this hit killed the enemy
    pub fn hit(&mut self, amount: f32, source: DamageSource) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        self.last_hit = Some(source);
        !self.is_alive()
    }
}

/// Ballistic cannon projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zap {
    pub id: u32,
    pub pos: Vec2,
    /// Unit direction
    pub dir: Vec2,
    pub speed: f32,
    pub damage: f32,
    pub size: f32,
    /// Tick on which it was fired; it starts moving the tick after
    pub spawn_tick: u64,
}

/// Instantaneous zig-zag strike; damage was dealt when it was created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lightning {
    pub id: u32,
    /// Polyline, at least two points
    pub points: Vec<Vec2>,
    pub damage: f32,
    pub remaining_life: u32,
    pub is_chain_segment: bool,
}

/// Persistent piercing ray anchored on the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub id: u32,
    pub origin: Vec2,
    /// Unit direction, fixed at fire time
    pub dir: Vec2,
    pub length: f32,
    pub thickness: f32,
    /// Ticks between damage pulses
    pub cadence: u32,
    pub damage: f32,
    pub lifetime: u32,
    /// Ticks since creation
    pub age: u32,
    /// Enemies already damaged by the current pulse
    pub pulse_hits: Vec<u32>,
}

impl Beam {
    pub fn end(&self) -> Vec2 {
        self.origin + self.dir * self.length
    }

    pub fn remaining_life(&self) -> u32 {
        self.lifetime.saturating_sub(self.age)
    }

    /// Whether this tick is a damage pulse
    pub fn is_pulse_tick(&self) -> bool {
        self.age <= self.lifetime && self.age % self.cadence.max(1) == 0
    }

    pub fn is_expired(&self) -> bool {
        self.age > self.lifetime
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: u32,
    pub remaining_life: u32,
    pub gravity: f32,
    pub drag: f32,
}

impl Particle {
    pub fn step(&mut self) {
        self.vel.y += self.gravity;
        self.vel *= self.drag;
        self.pos += self.vel;
        self.remaining_life = self.remaining_life.saturating_sub(1);
    }
}

/// Particle palette indices
pub mod palette {
    pub const SPARK: u32 = 0;
    pub const ENEMY: u32 = 1;
    pub const SPECIAL: u32 = 2;
}

/// Run statistics reported on game over
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub enemies_killed: u64,
    /// Starts at 1, +1 per applied upgrade
    pub level: u32,
    pub wave: u32,
    pub elapsed_ticks: u64,
    pub score: u64,
}

impl RunStats {
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_ticks as f32 * crate::consts::SIM_DT
    }
}

/// Complete run state (deterministic given seed + input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub bounds: WorldBounds,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    pub camera: Camera,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    pub zaps: Vec<Zap>,
    pub lightnings: Vec<Lightning>,
    pub beams: Vec<Beam>,
    /// Read-only copy of the Orb weapon's bodies, refreshed every tick
    pub orbs: Vec<Orb>,
    /// Visual only, but simulated deterministically
    pub particles: Vec<Particle>,
    pub weapons: WeaponManager,
    pub skills: SkillManager,
    pub bonuses: BonusManager,
    pub wave: WaveController,
    pub draft: UpgradeDraft,
    pub stats: RunStats,
    /// Weapon granted at run start (kept across restarts)
    pub starting_weapon: WeaponKind,
    /// Debug: contact damage ignored
    pub god_mode: bool,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// New run starting with the cannon
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self::with_loadout(seed, tuning, WeaponKind::Cannon)
    }

    /// New run starting with the given weapon
    pub fn with_loadout(seed: u64, tuning: Tuning, starting_weapon: WeaponKind) -> Self {
        let bounds = WorldBounds::from_tuning(&tuning);
        let player = Player::new(bounds.center(), &tuning);
        let camera = Camera::new(player.pos, &tuning, &bounds);

        let mut weapons = WeaponManager::new(&tuning);
        weapons.add_weapon(starting_weapon, &tuning);

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            bounds,
            phase: GamePhase::Playing,
            time_ticks: 0,
            player,
            camera,
            enemies: Vec::new(),
            zaps: Vec::new(),
            lightnings: Vec::new(),
            beams: Vec::new(),
            orbs: Vec::new(),
            particles: Vec::new(),
            weapons,
            skills: SkillManager::new(&tuning),
            bonuses: BonusManager::new(&tuning),
            wave: WaveController::new(&tuning),
            draft: UpgradeDraft::new(&tuning),
            stats: RunStats {
                level: 1,
                wave: 1,
                ..Default::default()
            },
            starting_weapon,
            god_mode: false,
            next_id: 1,
            tuning,
        };
        state.orbs = state.weapons.orbs().to_vec();
        state
    }

    /// Reset all run state; the next seed comes from this run's RNG
    pub fn restart(&mut self) {
        let seed = self.rng.random::<u64>();
        log::info!("Restarting run with seed {}", seed);
        let god_mode = self.god_mode;
        *self = Self::with_loadout(seed, self.tuning.clone(), self.starting_weapon);
        self.god_mode = god_mode;
    }

    /// Swap in a new tuning table (call between ticks)
    pub fn set_tuning(&mut self, tuning: Tuning) {
        let viewport = Vec2::new(tuning.viewport_width, tuning.viewport_height);
        self.camera.resize(viewport, &self.bounds);
        self.tuning = tuning;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Enemies still to defeat this wave (unspawned + alive)
    pub fn enemies_remaining(&self) -> u32 {
        self.wave.remaining(self.enemies.len())
    }

    /// Spawn a regular enemy of the current wave tier at `pos`
    pub fn spawn_enemy_at(&mut self, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let enemy = super::wave::make_enemy(id, pos, self.wave.wave_number, None, &self.tuning);
        self.enemies.push(enemy);
        id
    }

    /// Apply the contact damage of one hit to the player
    pub fn damage_player(&mut self, amount: f32) {
        if amount <= 0.0 || self.god_mode {
            return;
        }
        if !self.bonuses.can_take_damage() {
            self.bonuses.absorb_hit();
            return;
        }
        self.player.take_damage(amount);
    }

    /// Apply a bonus now, including instantaneous effects
    pub fn apply_bonus(&mut self, kind: BonusKind) {
        if self.trigger_bonus(kind) {
            self.reap_enemies();
        }
    }

    /// Apply a bonus; returns true if enemies were purged and need reaping
    fn trigger_bonus(&mut self, kind: BonusKind) -> bool {
        log::debug!("Bonus applied: {}", kind.name());
        match self.bonuses.apply(kind, &self.tuning) {
            BonusOutcome::Handled => false,
            BonusOutcome::Heal(amount) => {
                self.player.heal(amount);
                false
            }
            BonusOutcome::Nuke => {
                for enemy in self.enemies.iter_mut().filter(|e| e.is_alive()) {
                    enemy.health = 0.0;
                    enemy.purged = true;
                }
                true
            }
        }
    }

    /// Damage an enemy by id, scaled by the active damage multiplier
    pub fn damage_enemy(&mut self, id: u32, amount: f32, source: DamageSource) -> bool {
        let scaled = amount * self.bonuses.damage_multiplier();
        match self.enemies.binary_search_by_key(&id, |e| e.id) {
            Ok(idx) => self.enemies[idx].hit(scaled, source),
            Err(_) => false,
        }
    }

    /// Remove dead enemies, scoring kills and triggering special bonuses.
    ///
    /// A special's bonus fires while it is still in the list; enemies a nuke
    /// purges are reaped in the same call but never chain their own bonus.
    pub fn reap_enemies(&mut self) {
        while let Some(idx) = self.enemies.iter().position(|e| !e.is_alive()) {
            let (id, pos, size, bonus, purged, last_hit) = {
                let e = &self.enemies[idx];
                (e.id, e.pos, e.size, e.bonus_type, e.purged, e.last_hit)
            };

            self.stats.enemies_killed += 1;
            self.stats.score += match (purged, last_hit) {
                (false, Some(DamageSource::Lightning)) => self.tuning.score_per_lightning_kill,
                _ => self.tuning.score_per_kill,
            };

            let color = if bonus.is_some() {
                palette::SPECIAL
            } else {
                palette::ENEMY
            };
            self.burst_particles(pos, size, 10, color);

            if let Some(kind) = bonus.filter(|_| !purged) {
                self.trigger_bonus(kind);
            }

            if let Ok(idx) = self.enemies.binary_search_by_key(&id, |e| e.id) {
                self.enemies.remove(idx);
            }
        }
    }

    /// Spray particles outward from a point
    pub fn burst_particles(&mut self, pos: Vec2, size: f32, count: usize, color: u32) {
        let cap = self.tuning.max_particles;
        if cap == 0 {
            return;
        }
        for _ in 0..count {
            if self.particles.len() >= cap {
                // Remove oldest particles to make room
                self.particles.remove(0);
            }
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.random_range(0.5..2.5);
            let life_jitter = self.rng.random_range(0..=self.tuning.particle_life / 2);
            self.particles.push(Particle {
                pos: pos + crate::unit_from_angle(angle) * size * 0.25,
                vel: crate::unit_from_angle(angle) * speed,
                size: self.rng.random_range(2.0..5.0),
                color,
                remaining_life: self.tuning.particle_life / 2 + life_jitter,
                gravity: self.tuning.particle_gravity,
                drag: self.tuning.particle_drag,
            });
        }
    }

    /// Ensure entity lists are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.zaps.sort_by_key(|z| z.id);
        self.lightnings.sort_by_key(|l| l.id);
        self.beams.sort_by_key(|b| b.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::wave::make_enemy;

    fn close(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-4
    }

    #[test]
    fn test_player_step_integrates_velocity() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::new(500.0, 500.0), &tuning);
        let a = tuning.player_speed;
        let f = tuning.player_friction;

        player.step(Vec2::X, 1.0);
        let v1 = a * f;
        assert!(close(player.vel, Vec2::new(v1, 0.0)));
        assert!(close(player.pos, Vec2::new(500.0 + v1, 500.0)));

        player.step(Vec2::X, 1.0);
        let v2 = (v1 + a) * f;
        assert!(close(player.vel, Vec2::new(v2, 0.0)));
        assert!(close(player.pos, Vec2::new(500.0 + v1 + v2, 500.0)));
    }

    #[test]
    fn test_player_speed_multiplier_scales_acceleration() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::new(500.0, 500.0), &tuning);
        player.step(Vec2::new(0.0, -1.0), 2.0);
        let v = 2.0 * tuning.player_speed * tuning.player_friction;
        assert!(close(player.vel, Vec2::new(0.0, -v)));
    }

    #[test]
    fn test_player_coasts_down_without_intent() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::new(500.0, 500.0), &tuning);
        player.vel = Vec2::new(4.0, -2.0);
        player.step(Vec2::ZERO, 1.0);
        let v = Vec2::new(4.0, -2.0) * tuning.player_friction;
        assert!(close(player.vel, v));
        assert!(close(player.pos, Vec2::new(500.0, 500.0) + v));
    }

    #[test]
    fn test_clamp_zeroes_only_the_blocked_axis() {
        let tuning = Tuning::default();
        let bounds = WorldBounds::from_tuning(&tuning);
        let mut player = Player::new(Vec2::new(5.0, 500.0), &tuning);
        player.vel = Vec2::new(-5.0, 3.0);

        player.clamp_to(&bounds);
        assert_eq!(player.pos, Vec2::new(tuning.player_size * 0.5, 500.0));
        assert_eq!(player.vel, Vec2::new(0.0, 3.0));

        // Far corner blocks both axes
        player.pos = Vec2::new(bounds.width + 50.0, bounds.height + 50.0);
        player.vel = Vec2::new(2.0, 2.0);
        player.clamp_to(&bounds);
        assert_eq!(player.vel, Vec2::ZERO);
        assert!(bounds.contains(player.pos));
    }

    #[test]
    fn test_heal_caps_at_max_health() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::ZERO, &tuning);
        player.health = player.max_health - 10.0;
        player.heal(tuning.heal_amount);
        assert_eq!(player.health, player.max_health);

        player.health = 40.0;
        player.heal(-5.0);
        assert_eq!(player.health, 40.0);
    }

    #[test]
    fn test_heal_bonus_caps_at_max_health() {
        let tuning = Tuning::default();
        let mut state = GameState::new(3, tuning.clone());
        state.player.health = state.player.max_health - 1.0;
        state.apply_bonus(BonusKind::Heal);
        assert_eq!(state.player.health, state.player.max_health);

        state.player.health = 10.0;
        state.apply_bonus(BonusKind::Heal);
        assert_eq!(state.player.health, 10.0 + tuning.heal_amount);
    }

    #[test]
    fn test_enemy_chases_at_scaled_speed() {
        let tuning = Tuning {
            enemy_jitter: 0.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let mut enemy = make_enemy(1, Vec2::new(100.0, 100.0), 1, None, &tuning);
        let target = Vec2::new(100.0, 400.0);

        enemy.step(target, 0.5, &tuning, &mut rng);
        let expected = Vec2::new(100.0, 100.0 + enemy.speed * 0.5);
        assert!(close(enemy.pos, expected), "{:?}", enemy.pos);

        // Direction is normalized: distance does not change the step
        let mut far = make_enemy(2, Vec2::new(100.0, 100.0), 1, None, &tuning);
        far.step(Vec2::new(3000.0, 100.0), 1.0, &tuning, &mut rng);
        assert!(close(far.pos, Vec2::new(100.0 + far.speed, 100.0)));
    }

    #[test]
    fn test_enemy_on_target_stays_put() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let spot = Vec2::new(250.0, 250.0);
        let mut enemy = make_enemy(1, spot, 1, None, &tuning);
        for _ in 0..5 {
            enemy.step(spot, 1.0, &tuning, &mut rng);
        }
        assert_eq!(enemy.pos, spot);
    }

    #[test]
    fn test_enemy_jitter_refreshes_on_interval() {
        let tuning = Tuning::default();
        let interval = tuning.enemy_jitter_interval;
        let j = tuning.enemy_jitter;
        let mut rng = Pcg32::seed_from_u64(9);
        let mut enemy = make_enemy(1, Vec2::new(100.0, 100.0), 1, None, &tuning);
        let target = Vec2::new(2000.0, 2000.0);

        enemy.step(target, 1.0, &tuning, &mut rng);
        let first = enemy.jitter;
        assert!(first.x.abs() <= j && first.y.abs() <= j);
        assert_eq!(enemy.jitter_timer, interval - 1);

        for _ in 1..interval {
            enemy.step(target, 1.0, &tuning, &mut rng);
            assert_eq!(enemy.jitter, first);
        }
        assert_eq!(enemy.jitter_timer, 0);

        enemy.step(target, 1.0, &tuning, &mut rng);
        assert_eq!(enemy.jitter_timer, interval - 1);
        assert_ne!(enemy.jitter, first);
        assert!(enemy.jitter.x.abs() <= j && enemy.jitter.y.abs() <= j);
    }

    #[test]
    fn test_contact_damage_respects_shield_and_invincibility() {
        let mut state = GameState::new(5, Tuning::default());
        state.bonuses.add_shield(1, 5);
        state.damage_player(10.0);
        assert_eq!(state.player.health, state.player.max_health);
        assert_eq!(state.bonuses.shield_charges(), 0);

        state.bonuses.apply_timed(BonusKind::Invincibility, 10);
        state.damage_player(10.0);
        assert_eq!(state.player.health, state.player.max_health);

        let mut exposed = GameState::new(5, Tuning::default());
        exposed.damage_player(10.0);
        assert_eq!(exposed.player.health, exposed.player.max_health - 10.0);
    }
}
