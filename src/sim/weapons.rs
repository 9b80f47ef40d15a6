//! Auto-firing weapons
//!
//! Each weapon is a small state machine: its cooldown counts down every tick,
//! and once ready it looks for a target and fires. A weapon that finds no
//! target stays ready and fires on the first tick one appears. The Orb weapon
//! is ambient and damages whatever its bodies touch.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::circles_overlap;
use super::state::{Beam, DamageSource, Enemy, Lightning, Zap};
use crate::tuning::Tuning;
use crate::{unit_from_angle, wrap_angle};

/// Weapon kinds (registry keyed by name)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Cannon,
    Lightning,
    Beam,
    Orb,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 4] = [
        WeaponKind::Cannon,
        WeaponKind::Lightning,
        WeaponKind::Beam,
        WeaponKind::Orb,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WeaponKind::Cannon => "cannon",
            WeaponKind::Lightning => "lightning",
            WeaponKind::Beam => "beam",
            WeaponKind::Orb => "orb",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Starting weapon of a player profile (1..=3)
    pub fn for_profile(profile: u8) -> Self {
        match profile {
            2 => WeaponKind::Lightning,
            3 => WeaponKind::Orb,
            _ => WeaponKind::Cannon,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WeaponKind::Cannon => "Zap Cannon",
            WeaponKind::Lightning => "Chain Lightning",
            WeaponKind::Beam => "Piercing Beam",
            WeaponKind::Orb => "Energy Orbs",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WeaponKind::Cannon => "Fires a zap at the nearest enemy",
            WeaponKind::Lightning => "Strikes the nearest enemy and chains to its neighbours",
            WeaponKind::Beam => "Projects a ray that pierces every enemy in its path",
            WeaponKind::Orb => "Bodies orbit you and burn whatever they touch",
        }
    }
}

/// A body orbiting the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orb {
    /// Angular phase in radians, [0, 2π)
    pub phase: f32,
    pub radius: f32,
    /// Radians per tick
    pub angular_speed: f32,
    pub size: f32,
    pub damage: f32,
    /// World position as of the last advance
    pub pos: Vec2,
}

/// Damage to be applied by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub enemy_id: u32,
    pub damage: f32,
    pub source: DamageSource,
}

/// Entity spawned by a weapon; the orchestrator assigns its id
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Zap(Zap),
    Lightning(Lightning),
    Beam(Beam),
}

/// Everything a single firing produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Volley {
    pub effects: Vec<Effect>,
    pub hits: Vec<Hit>,
}

/// World view a weapon fires into
pub struct FireContext<'a> {
    /// Player center
    pub origin: Vec2,
    /// Sorted by id
    pub enemies: &'a [Enemy],
    pub tuning: &'a Tuning,
    pub tick: u64,
}

impl FireContext<'_> {
    /// Nearest living enemy to `from` within `range`, skipping `exclude`.
    /// Ties go to the lower id.
    fn nearest(&self, from: Vec2, range: f32, exclude: &[u32]) -> Option<&Enemy> {
        let range_sq = range * range;
        let mut best: Option<(&Enemy, f32)> = None;
        for enemy in self.enemies.iter().filter(|e| e.is_alive()) {
            if exclude.contains(&enemy.id) {
                continue;
            }
            let d = enemy.pos.distance_squared(from);
            if d > range_sq {
                continue;
            }
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((enemy, d));
            }
        }
        best.map(|(e, _)| e)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub level: u32,
    /// Ticks until ready
    pub cooldown: u32,
    /// Orb ring rotation in radians
    rotation: f32,
    /// Orb bodies; empty for every other kind
    orbs: Vec<Orb>,
}

impl Weapon {
    pub fn new(kind: WeaponKind, tuning: &Tuning) -> Self {
        let mut weapon = Self {
            kind,
            level: 1,
            cooldown: 0,
            rotation: 0.0,
            orbs: Vec::new(),
        };
        weapon.on_level_change(tuning);
        weapon
    }

    /// Count down the cooldown
    pub fn update(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    pub fn is_ready(&self) -> bool {
        self.kind == WeaponKind::Orb || self.cooldown == 0
    }

    pub fn orbs(&self) -> &[Orb] {
        &self.orbs
    }

    /// Ticks between firings at the current level
    pub fn cooldown_ticks(&self, tuning: &Tuning) -> u32 {
        let steps = self.level - 1;
        match self.kind {
            WeaponKind::Cannon => tuning
                .cannon_cooldown
                .saturating_sub(tuning.cannon_cooldown_step * steps)
                .max(tuning.cannon_min_cooldown),
            WeaponKind::Lightning => tuning.lightning_cooldown,
            WeaponKind::Beam => tuning.beam_cooldown,
            WeaponKind::Orb => 0,
        }
    }

    /// Base damage per hit at the current level (before bonuses)
    pub fn damage(&self, tuning: &Tuning) -> f32 {
        let steps = (self.level - 1) as f32;
        match self.kind {
            WeaponKind::Cannon => tuning.cannon_damage + tuning.cannon_damage_step * steps,
            WeaponKind::Lightning => tuning.lightning_damage + tuning.lightning_damage_step * steps,
            WeaponKind::Beam => tuning.beam_damage + tuning.beam_damage_step * steps,
            WeaponKind::Orb => tuning.orb_damage + tuning.orb_damage_step * steps,
        }
    }

    /// Extra enemies a lightning strike jumps to
    pub fn chain_count(&self, tuning: &Tuning) -> u32 {
        tuning.lightning_chain_count + tuning.lightning_chain_step * (self.level - 1)
    }

    pub fn beam_lifetime(&self, tuning: &Tuning) -> u32 {
        tuning.beam_lifetime + tuning.beam_lifetime_step * (self.level - 1)
    }

    /// Change level and rebuild anything derived from it
    pub fn set_level(&mut self, level: u32, tuning: &Tuning) {
        self.level = level.clamp(1, tuning.weapon_max_level.max(1));
        self.on_level_change(tuning);
    }

    /// The only place the orb set is rebuilt: `level` bodies, evenly spaced
    fn on_level_change(&mut self, tuning: &Tuning) {
        if self.kind != WeaponKind::Orb {
            return;
        }
        let count = self.level as usize;
        let damage = self.damage(tuning);
        let spacing = std::f32::consts::TAU / count as f32;
        self.orbs = (0..count)
            .map(|i| Orb {
                phase: wrap_angle(self.rotation + spacing * i as f32),
                radius: tuning.orb_radius,
                angular_speed: tuning.orb_angular_speed,
                size: tuning.orb_size,
                damage,
                pos: Vec2::ZERO,
            })
            .collect();
    }

    /// Orb count matches level (rebuilds if it ever drifted)
    pub fn sync_orbs(&mut self, tuning: &Tuning) {
        if self.kind == WeaponKind::Orb && self.orbs.len() != self.level as usize {
            log::warn!(
                "Orb count {} out of step with level {}, rebuilding",
                self.orbs.len(),
                self.level
            );
            self.on_level_change(tuning);
        }
    }

    /// Rotate the orb ring one tick and place bodies around `origin`
    pub fn advance_orbs(&mut self, origin: Vec2) {
        let Some(speed) = self.orbs.first().map(|o| o.angular_speed) else {
            return;
        };
        self.rotation = wrap_angle(self.rotation + speed);
        let spacing = std::f32::consts::TAU / self.orbs.len() as f32;
        for (i, orb) in self.orbs.iter_mut().enumerate() {
            orb.phase = wrap_angle(self.rotation + spacing * i as f32);
            orb.pos = origin + unit_from_angle(orb.phase) * orb.radius;
        }
    }

    /// Fire if ready and a target exists
    pub fn fire(&mut self, ctx: &FireContext, rng: &mut Pcg32) -> Option<Volley> {
        if !self.is_ready() {
            return None;
        }
        let volley = match self.kind {
            WeaponKind::Cannon => self.fire_cannon(ctx),
            WeaponKind::Lightning => self.fire_lightning(ctx, rng),
            WeaponKind::Beam => self.fire_beam(ctx),
            WeaponKind::Orb => return Some(self.fire_orbs(ctx)),
        }?;
        self.cooldown = self.cooldown_ticks(ctx.tuning);
        Some(volley)
    }

    fn fire_cannon(&self, ctx: &FireContext) -> Option<Volley> {
        let target = ctx.nearest(ctx.origin, ctx.tuning.cannon_range, &[])?;
        let dir = (target.pos - ctx.origin).normalize_or_zero();
        if dir == Vec2::ZERO {
            return None;
        }
        let zap = Zap {
            id: 0,
            pos: ctx.origin,
            dir,
            speed: ctx.tuning.zap_speed,
            damage: self.damage(ctx.tuning),
            size: ctx.tuning.zap_size,
            spawn_tick: ctx.tick,
        };
        Some(Volley {
            effects: vec![Effect::Zap(zap)],
            hits: Vec::new(),
        })
    }

    fn fire_lightning(&self, ctx: &FireContext, rng: &mut Pcg32) -> Option<Volley> {
        let tuning = ctx.tuning;
        let primary = ctx.nearest(ctx.origin, tuning.lightning_range, &[])?;
        let damage = self.damage(tuning);

        let mut hit_ids = vec![primary.id];
        let mut hops = vec![(ctx.origin, primary.pos)];
        let mut prev = primary.pos;
        for _ in 0..self.chain_count(tuning) {
            let Some(next) = ctx.nearest(prev, tuning.lightning_chain_range, &hit_ids) else {
                break;
            };
            hit_ids.push(next.id);
            hops.push((prev, next.pos));
            prev = next.pos;
        }

        let effects = hops
            .into_iter()
            .enumerate()
            .map(|(i, (from, to))| {
                Effect::Lightning(Lightning {
                    id: 0,
                    points: zigzag(from, to, tuning, rng),
                    damage,
                    remaining_life: tuning.lightning_life,
                    is_chain_segment: i > 0,
                })
            })
            .collect();
        let hits = hit_ids
            .into_iter()
            .map(|enemy_id| Hit {
                enemy_id,
                damage,
                source: DamageSource::Lightning,
            })
            .collect();
        Some(Volley { effects, hits })
    }

    fn fire_beam(&self, ctx: &FireContext) -> Option<Volley> {
        let tuning = ctx.tuning;
        let target = ctx.nearest(ctx.origin, tuning.beam_range, &[])?;
        let dir = (target.pos - ctx.origin).normalize_or_zero();
        if dir == Vec2::ZERO {
            return None;
        }
        let beam = Beam {
            id: 0,
            origin: ctx.origin,
            dir,
            length: tuning.beam_length,
            thickness: tuning.beam_thickness,
            cadence: tuning.beam_cadence,
            damage: self.damage(tuning),
            lifetime: self.beam_lifetime(tuning),
            age: 0,
            pulse_hits: Vec::new(),
        };
        Some(Volley {
            effects: vec![Effect::Beam(beam)],
            hits: Vec::new(),
        })
    }

    /// Each orb hits at most one enemy per tick (lowest id among overlaps)
    fn fire_orbs(&mut self, ctx: &FireContext) -> Volley {
        self.advance_orbs(ctx.origin);
        let hits = self
            .orbs
            .iter()
            .filter_map(|orb| {
                ctx.enemies
                    .iter()
                    .filter(|e| e.is_alive())
                    .find(|e| circles_overlap(orb.pos, orb.size, e.pos, e.size))
                    .map(|e| Hit {
                        enemy_id: e.id,
                        damage: orb.damage,
                        source: DamageSource::Orb,
                    })
            })
            .collect();
        Volley {
            effects: Vec::new(),
            hits,
        }
    }
}

/// Polyline from `from` to `to` with interior points pushed sideways
fn zigzag(from: Vec2, to: Vec2, tuning: &Tuning, rng: &mut Pcg32) -> Vec<Vec2> {
    let interior = tuning.lightning_zigzag_points as usize;
    let normal = (to - from).normalize_or_zero().perp();
    let offset = tuning.lightning_zigzag_offset;

    let mut points = Vec::with_capacity(interior + 2);
    points.push(from);
    for k in 1..=interior {
        let t = k as f32 / (interior + 1) as f32;
        let jitter = if offset > 0.0 && offset.is_finite() {
            rng.random_range(-offset..=offset)
        } else {
            0.0
        };
        points.push(from.lerp(to, t) + normal * jitter);
    }
    points.push(to);
    points
}

/// Ordered weapon roster, at most one of each kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponManager {
    weapons: Vec<Weapon>,
    max_weapons: usize,
    max_level: u32,
}

impl WeaponManager {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            weapons: Vec::new(),
            max_weapons: tuning.max_weapons,
            max_level: tuning.weapon_max_level,
        }
    }

    /// Add a level-1 weapon; fails if owned already or the roster is full
    pub fn add_weapon(&mut self, kind: WeaponKind, tuning: &Tuning) -> bool {
        if self.contains(kind) || self.weapons.len() >= self.max_weapons {
            return false;
        }
        self.weapons.push(Weapon::new(kind, tuning));
        true
    }

    /// Raise a weapon one level; fails if missing or maxed
    pub fn upgrade(&mut self, kind: WeaponKind, tuning: &Tuning) -> bool {
        let max_level = self.max_level;
        match self.get_mut(kind) {
            Some(weapon) if weapon.level < max_level => {
                let level = weapon.level + 1;
                weapon.set_level(level, tuning);
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, kind: WeaponKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn get(&self, kind: WeaponKind) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.kind == kind)
    }

    pub fn get_mut(&mut self, kind: WeaponKind) -> Option<&mut Weapon> {
        self.weapons.iter_mut().find(|w| w.kind == kind)
    }

    pub fn level(&self, kind: WeaponKind) -> Option<u32> {
        self.get(kind).map(|w| w.level)
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.weapons.len() >= self.max_weapons
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn iter(&self) -> impl Iterator<Item = &Weapon> {
        self.weapons.iter()
    }

    /// Orb bodies of the Orb weapon, if owned
    pub fn orbs(&self) -> &[Orb] {
        self.get(WeaponKind::Orb).map(|w| w.orbs()).unwrap_or(&[])
    }

    pub fn sync_orbs(&mut self, tuning: &Tuning) {
        for weapon in &mut self.weapons {
            weapon.sync_orbs(tuning);
        }
    }
}
