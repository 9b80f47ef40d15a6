//! Between-wave upgrade draft
//!
//! ```text
//! Idle ──enter──▶ Presenting ──pick──▶ (apply) ──▶ Idle
//!                   │   │ ▲
//!                   │   └─┴─ roll (budget > 0, something could change)
//!                   ├─ ban ──▶ Banning ──pick──▶ option removed ──▶ Presenting
//!                   └─ skip ──▶ Idle
//! ```
//!
//! Roll and ban budgets are per run, not per draft. Banned upgrades are
//! never offered again in the same run.

use rand::seq::index;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::skills::{SkillKind, SkillManager};
use super::weapons::{WeaponKind, WeaponManager};
use crate::tuning::Tuning;

/// Which upgrade an option refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UpgradeId {
    Weapon(WeaponKind),
    Skill(SkillKind),
}

impl UpgradeId {
    /// Stable string key, e.g. `weapon:cannon`
    pub fn key(&self) -> String {
        match self {
            UpgradeId::Weapon(k) => format!("weapon:{}", k.name()),
            UpgradeId::Skill(k) => format!("skill:{}", k.name()),
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        let (family, name) = key.split_once(':')?;
        match family {
            "weapon" => WeaponKind::from_name(name).map(UpgradeId::Weapon),
            "skill" => SkillKind::from_name(name).map(UpgradeId::Skill),
            _ => None,
        }
    }
}

/// A presentable upgrade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeOption {
    pub id: UpgradeId,
    /// Not owned yet (weapon gets the NEW_WEAPON tag in the UI)
    pub is_new: bool,
    /// Level the pick would reach
    pub next_level: u32,
}

impl UpgradeOption {
    pub fn is_new_weapon(&self) -> bool {
        self.is_new && matches!(self.id, UpgradeId::Weapon(_))
    }

    pub fn display_name(&self) -> &'static str {
        match self.id {
            UpgradeId::Weapon(k) => k.display_name(),
            UpgradeId::Skill(k) => k.display_name(),
        }
    }

    pub fn description(&self) -> String {
        let base = match self.id {
            UpgradeId::Weapon(k) => k.description(),
            UpgradeId::Skill(k) => k.description(),
        };
        if self.is_new {
            base.to_string()
        } else {
            format!("{} (level {})", base, self.next_level)
        }
    }
}

/// Every upgrade the rosters currently allow
pub fn eligible_options(weapons: &WeaponManager, skills: &SkillManager) -> Vec<UpgradeOption> {
    let mut out = Vec::new();
    for kind in WeaponKind::ALL {
        match weapons.level(kind) {
            None if !weapons.is_full() => out.push(UpgradeOption {
                id: UpgradeId::Weapon(kind),
                is_new: true,
                next_level: 1,
            }),
            Some(level) if level < weapons.max_level() => out.push(UpgradeOption {
                id: UpgradeId::Weapon(kind),
                is_new: false,
                next_level: level + 1,
            }),
            _ => {}
        }
    }
    for kind in SkillKind::ALL {
        match skills.level(kind) {
            None if !skills.is_full() => out.push(UpgradeOption {
                id: UpgradeId::Skill(kind),
                is_new: true,
                next_level: 1,
            }),
            Some(level) if level < skills.max_level() => out.push(UpgradeOption {
                id: UpgradeId::Skill(kind),
                is_new: false,
                next_level: level + 1,
            }),
            _ => {}
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftPhase {
    Idle,
    Presenting,
    Banning,
}

/// Player command while the draft is open (the UI's buttons)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftCommand {
    Pick(usize),
    Roll,
    Ban,
    Skip,
}

/// UI-facing view of one option
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionView {
    pub id: String,
    pub display_name: String,
    pub is_new_weapon: bool,
    pub description: String,
}

/// UI-facing view of the whole draft
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftView {
    pub phase: DraftPhase,
    pub options: Vec<OptionView>,
    pub rolls_left: u32,
    pub bans_left: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDraft {
    pub phase: DraftPhase,
    pub options: Vec<UpgradeOption>,
    pub rolls_left: u32,
    pub bans_left: u32,
    pub banned: Vec<UpgradeId>,
    max_options: usize,
}

impl UpgradeDraft {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            phase: DraftPhase::Idle,
            options: Vec::new(),
            rolls_left: tuning.draft_rolls,
            bans_left: tuning.draft_bans,
            banned: Vec::new(),
            max_options: tuning.draft_options,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase != DraftPhase::Idle
    }

    /// Open the draft; stays idle if nothing is eligible
    pub fn enter(&mut self, eligible: &[UpgradeOption], rng: &mut Pcg32) -> bool {
        self.options = self.sample(eligible, rng);
        if self.options.is_empty() {
            log::info!("Upgrade draft skipped: nothing eligible");
            self.phase = DraftPhase::Idle;
            return false;
        }
        self.phase = DraftPhase::Presenting;
        true
    }

    /// Handle a command; returns the option to apply when one is picked
    pub fn handle(
        &mut self,
        command: DraftCommand,
        eligible: &[UpgradeOption],
        rng: &mut Pcg32,
    ) -> Option<UpgradeOption> {
        match (self.phase, command) {
            (DraftPhase::Idle, _) => None,
            (DraftPhase::Presenting, DraftCommand::Pick(i)) => {
                let Some(choice) = self.options.get(i).cloned() else {
                    log::info!("Draft pick {} out of range", i);
                    return None;
                };
                self.close();
                Some(choice)
            }
            (DraftPhase::Presenting, DraftCommand::Roll) => {
                self.roll(eligible, rng);
                None
            }
            (DraftPhase::Presenting, DraftCommand::Ban) => {
                self.begin_ban();
                None
            }
            (DraftPhase::Presenting, DraftCommand::Skip) => {
                self.close();
                None
            }
            (DraftPhase::Banning, DraftCommand::Pick(i)) => {
                self.ban(i, eligible, rng);
                None
            }
            (DraftPhase::Banning, DraftCommand::Skip) => {
                // Cancel the ban; nothing spent
                self.phase = DraftPhase::Presenting;
                None
            }
            (DraftPhase::Banning, _) => None,
        }
    }

    /// Resample every option; free if it could not change anything
    pub fn roll(&mut self, eligible: &[UpgradeOption], rng: &mut Pcg32) -> bool {
        if self.rolls_left == 0 {
            return false;
        }
        let candidates = self.candidates(eligible);
        if candidates.len() <= self.options.len() {
            log::debug!("Roll would not change the offer; budget kept");
            return false;
        }
        self.rolls_left -= 1;
        self.options = self.sample(eligible, rng);
        true
    }

    pub fn begin_ban(&mut self) -> bool {
        if self.bans_left == 0 || self.options.is_empty() {
            return false;
        }
        self.phase = DraftPhase::Banning;
        true
    }

    /// Remove option `index` for the rest of the run
    fn ban(&mut self, index: usize, eligible: &[UpgradeOption], rng: &mut Pcg32) {
        if index >= self.options.len() {
            log::info!("Ban target {} out of range", index);
            return;
        }
        let banned = self.options.remove(index);
        self.banned.push(banned.id);
        self.bans_left -= 1;
        self.phase = DraftPhase::Presenting;

        if self.options.is_empty() {
            self.options = self.sample(eligible, rng);
            if self.options.is_empty() {
                self.close();
            }
        }
    }

    fn close(&mut self) {
        self.phase = DraftPhase::Idle;
        self.options.clear();
    }

    fn candidates<'a>(&self, eligible: &'a [UpgradeOption]) -> Vec<&'a UpgradeOption> {
        eligible.iter().filter(|o| !self.banned.contains(&o.id)).collect()
    }

    /// Up to `max_options` distinct candidates, uniformly without replacement
    fn sample(&self, eligible: &[UpgradeOption], rng: &mut Pcg32) -> Vec<UpgradeOption> {
        let candidates = self.candidates(eligible);
        let amount = self.max_options.min(candidates.len());
        index::sample(rng, candidates.len(), amount)
            .into_iter()
            .map(|i| candidates[i].clone())
            .collect()
    }

    pub fn view(&self) -> DraftView {
        DraftView {
            phase: self.phase,
            options: self
                .options
                .iter()
                .map(|o| OptionView {
                    id: o.id.key(),
                    display_name: o.display_name().to_string(),
                    is_new_weapon: o.is_new_weapon(),
                    description: o.description(),
                })
                .collect(),
            rolls_left: self.rolls_left,
            bans_left: self.bans_left,
        }
    }
}
