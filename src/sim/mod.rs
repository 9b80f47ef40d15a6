//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod bonus;
pub mod bounds;
pub mod camera;
pub mod collision;
pub mod draft;
pub mod skills;
pub mod state;
pub mod tick;
pub mod wave;
pub mod weapons;

pub use bonus::{BonusKind, BonusManager};
pub use bounds::{Aabb, WorldBounds};
pub use camera::Camera;
pub use draft::{DraftCommand, DraftPhase, DraftView, UpgradeDraft, UpgradeId, UpgradeOption};
pub use skills::{SkillKind, SkillManager};
pub use state::{
    Beam, DamageSource, Enemy, GamePhase, GameState, Lightning, Particle, Player, RunStats, Zap,
};
pub use tick::{TickInput, tick};
pub use wave::WaveController;
pub use weapons::{Orb, Weapon, WeaponKind, WeaponManager};
