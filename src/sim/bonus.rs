//! Timed global modifiers dropped by special enemies

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Bonus kinds (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    TimeSlow,
    Freeze,
    Invincibility,
    DamageBoost,
    Shield,
    Heal,
    Nuke,
}

impl BonusKind {
    pub const ALL: [BonusKind; 7] = [
        BonusKind::TimeSlow,
        BonusKind::Freeze,
        BonusKind::Invincibility,
        BonusKind::DamageBoost,
        BonusKind::Shield,
        BonusKind::Heal,
        BonusKind::Nuke,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BonusKind::TimeSlow => "time_slow",
            BonusKind::Freeze => "freeze",
            BonusKind::Invincibility => "invincibility",
            BonusKind::DamageBoost => "damage_boost",
            BonusKind::Shield => "shield",
            BonusKind::Heal => "heal",
            BonusKind::Nuke => "nuke",
        }
    }

    /// Whether this kind runs on a frame timer
    pub fn is_timed(&self) -> bool {
        matches!(
            self,
            BonusKind::TimeSlow | BonusKind::Freeze | BonusKind::Invincibility | BonusKind::DamageBoost
        )
    }

    /// Timer length for timed kinds
    pub fn frames(&self, tuning: &Tuning) -> u32 {
        match self {
            BonusKind::TimeSlow => tuning.time_slow_frames,
            BonusKind::Freeze => tuning.freeze_frames,
            BonusKind::Invincibility => tuning.invincibility_frames,
            BonusKind::DamageBoost => tuning.damage_boost_frames,
            _ => 0,
        }
    }
}

/// What the orchestrator still has to do after a bonus is applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BonusOutcome {
    /// Fully handled inside the manager (timers, shield charges)
    Handled,
    /// Restore this much player health
    Heal(f32),
    /// Purge every living enemy
    Nuke,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct BonusTimer {
    frames_left: u32,
    /// Set when applied; the next update leaves the timer alone
    fresh: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BonusManager {
    timers: BTreeMap<BonusKind, BonusTimer>,
    shield_charges: u32,
    time_slow_factor: f32,
    damage_boost_factor: f32,
}

impl BonusManager {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            timers: BTreeMap::new(),
            shield_charges: 0,
            time_slow_factor: tuning.time_slow_factor,
            damage_boost_factor: tuning.damage_boost_factor,
        }
    }

    /// Apply a bonus with its configured strength
    pub fn apply(&mut self, kind: BonusKind, tuning: &Tuning) -> BonusOutcome {
        match kind {
            BonusKind::Shield => {
                self.add_shield(tuning.shield_bonus_charges, tuning.shield_max_charges);
                BonusOutcome::Handled
            }
            BonusKind::Heal => BonusOutcome::Heal(tuning.heal_amount),
            BonusKind::Nuke => BonusOutcome::Nuke,
            timed => {
                self.apply_timed(timed, timed.frames(tuning));
                BonusOutcome::Handled
            }
        }
    }

    /// Start or extend a timer; an active timer keeps the larger remainder
    pub fn apply_timed(&mut self, kind: BonusKind, frames: u32) {
        if !kind.is_timed() || frames == 0 {
            return;
        }
        let timer = self.timers.entry(kind).or_insert(BonusTimer {
            frames_left: 0,
            fresh: true,
        });
        if frames >= timer.frames_left {
            timer.frames_left = frames;
            timer.fresh = true;
        }
    }

    /// Add shield charges, capped
    pub fn add_shield(&mut self, charges: u32, cap: u32) {
        self.shield_charges = (self.shield_charges + charges).min(cap);
    }

    /// Advance all timers by one tick and drop the elapsed ones
    pub fn update(&mut self) {
        for timer in self.timers.values_mut() {
            if timer.fresh {
                timer.fresh = false;
            } else {
                timer.frames_left = timer.frames_left.saturating_sub(1);
            }
        }
        self.timers.retain(|_, t| t.frames_left > 0);
    }

    pub fn is_active(&self, kind: BonusKind) -> bool {
        self.frames_left(kind) > 0
    }

    pub fn frames_left(&self, kind: BonusKind) -> u32 {
        self.timers.get(&kind).map_or(0, |t| t.frames_left)
    }

    /// Active timed bonuses with remaining ticks, in kind order
    pub fn active(&self) -> impl Iterator<Item = (BonusKind, u32)> + '_ {
        self.timers.iter().map(|(k, t)| (*k, t.frames_left))
    }

    pub fn shield_charges(&self) -> u32 {
        self.shield_charges
    }

    /// Enemy movement scale; freeze and slow compose by minimum
    pub fn enemy_speed_multiplier(&self) -> f32 {
        let mut mult: f32 = 1.0;
        if self.is_active(BonusKind::TimeSlow) {
            mult = mult.min(self.time_slow_factor);
        }
        if self.is_active(BonusKind::Freeze) {
            mult = 0.0;
        }
        mult.max(0.0)
    }

    pub fn damage_multiplier(&self) -> f32 {
        if self.is_active(BonusKind::DamageBoost) {
            self.damage_boost_factor
        } else {
            1.0
        }
    }

    /// Whether an incoming hit would reach the player's health (no side effects)
    pub fn can_take_damage(&self) -> bool {
        self.shield_charges == 0 && !self.is_active(BonusKind::Invincibility)
    }

    /// Settle a hit `can_take_damage` refused.
    ///
    /// A shield charge is spent first, even under invincibility.
    pub fn absorb_hit(&mut self) {
        self.shield_charges = self.shield_charges.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (BonusManager, Tuning) {
        let tuning = Tuning::default();
        (BonusManager::new(&tuning), tuning)
    }

    #[test]
    fn test_timer_counts_full_frames() {
        let (mut bonuses, _) = manager();
        bonuses.apply_timed(BonusKind::Invincibility, 3);
        for _ in 0..3 {
            bonuses.update();
            assert!(bonuses.is_active(BonusKind::Invincibility));
        }
        bonuses.update();
        assert!(!bonuses.is_active(BonusKind::Invincibility));
        assert_eq!(bonuses.active().count(), 0);
    }

    #[test]
    fn test_reapply_takes_maximum() {
        let (mut bonuses, _) = manager();
        bonuses.apply_timed(BonusKind::DamageBoost, 100);
        bonuses.update();
        bonuses.update();
        bonuses.apply_timed(BonusKind::DamageBoost, 10);
        assert_eq!(bonuses.frames_left(BonusKind::DamageBoost), 99);
        bonuses.apply_timed(BonusKind::DamageBoost, 500);
        assert_eq!(bonuses.frames_left(BonusKind::DamageBoost), 500);
    }

    #[test]
    fn test_slow_and_freeze_compose_by_minimum() {
        let (mut bonuses, tuning) = manager();
        assert_eq!(bonuses.enemy_speed_multiplier(), 1.0);
        bonuses.apply(BonusKind::TimeSlow, &tuning);
        assert_eq!(bonuses.enemy_speed_multiplier(), tuning.time_slow_factor);
        bonuses.apply(BonusKind::Freeze, &tuning);
        assert_eq!(bonuses.enemy_speed_multiplier(), 0.0);
    }

    #[test]
    fn test_shield_charge_spent_before_invincibility() {
        let (mut bonuses, tuning) = manager();
        bonuses.apply(BonusKind::Shield, &tuning);
        bonuses.apply(BonusKind::Invincibility, &tuning);
        assert_eq!(bonuses.shield_charges(), 2);
        assert!(!bonuses.can_take_damage());
        bonuses.absorb_hit();
        assert_eq!(bonuses.shield_charges(), 1);
    }

    #[test]
    fn test_invincibility_blocks_without_charges() {
        let (mut bonuses, tuning) = manager();
        assert!(bonuses.can_take_damage());
        bonuses.apply(BonusKind::Invincibility, &tuning);
        assert!(!bonuses.can_take_damage());
        bonuses.absorb_hit();
        assert_eq!(bonuses.shield_charges(), 0);
    }

    #[test]
    fn test_shield_cap() {
        let (mut bonuses, tuning) = manager();
        for _ in 0..10 {
            bonuses.apply(BonusKind::Shield, &tuning);
        }
        assert_eq!(bonuses.shield_charges(), tuning.shield_max_charges);
        assert!(!bonuses.can_take_damage());
    }

    #[test]
    fn test_instant_kinds_leave_no_timer() {
        let (mut bonuses, tuning) = manager();
        assert_eq!(bonuses.apply(BonusKind::Nuke, &tuning), BonusOutcome::Nuke);
        assert_eq!(
            bonuses.apply(BonusKind::Heal, &tuning),
            BonusOutcome::Heal(tuning.heal_amount)
        );
        assert_eq!(bonuses.active().count(), 0);
    }

    #[test]
    fn test_damage_multiplier() {
        let (mut bonuses, tuning) = manager();
        assert_eq!(bonuses.damage_multiplier(), 1.0);
        bonuses.apply(BonusKind::DamageBoost, &tuning);
        assert_eq!(bonuses.damage_multiplier(), tuning.damage_boost_factor);
    }
}
