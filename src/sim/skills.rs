//! Passive skills applied every tick

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    Speed,
    Shield,
    Regen,
}

impl SkillKind {
    pub const ALL: [SkillKind; 3] = [SkillKind::Speed, SkillKind::Shield, SkillKind::Regen];

    pub fn name(&self) -> &'static str {
        match self {
            SkillKind::Speed => "speed",
            SkillKind::Shield => "shield",
            SkillKind::Regen => "regen",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SkillKind::Speed => "Swift Boots",
            SkillKind::Shield => "Aegis",
            SkillKind::Regen => "Regeneration",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SkillKind::Speed => "Move faster",
            SkillKind::Shield => "Periodically gain a charge that absorbs one hit",
            SkillKind::Regen => "Slowly restore health",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub kind: SkillKind,
    pub level: u32,
    /// Ticks until the next shield refresh; 0 grants on the next apply
    pub timer: u32,
}

impl Skill {
    pub fn new(kind: SkillKind) -> Self {
        Self {
            kind,
            level: 1,
            timer: 0,
        }
    }

    /// Shield refresh interval for the current level
    pub fn refresh_ticks(&self, tuning: &Tuning) -> u32 {
        tuning
            .shield_skill_refresh
            .saturating_sub(
                tuning
                    .shield_skill_refresh_step
                    .saturating_mul(self.level.saturating_sub(1)),
            )
            .max(tuning.shield_skill_min_refresh)
            .max(1)
    }
}

/// What one tick of skills yields for the player
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkillTick {
    pub heal: f32,
    pub shield_charges: u32,
}

/// Ordered skill roster, at most one of each kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillManager {
    skills: Vec<Skill>,
    max_skills: usize,
    max_level: u32,
}

impl SkillManager {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            skills: Vec::new(),
            max_skills: tuning.max_skills,
            max_level: tuning.skill_max_level,
        }
    }

    pub fn add_skill(&mut self, kind: SkillKind) -> bool {
        if self.contains(kind) || self.skills.len() >= self.max_skills {
            return false;
        }
        self.skills.push(Skill::new(kind));
        true
    }

    pub fn upgrade(&mut self, kind: SkillKind) -> bool {
        let max_level = self.max_level;
        match self.skills.iter_mut().find(|s| s.kind == kind) {
            Some(skill) if skill.level < max_level => {
                skill.level += 1;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, kind: SkillKind) -> bool {
        self.level(kind).is_some()
    }

    pub fn level(&self, kind: SkillKind) -> Option<u32> {
        self.skills.iter().find(|s| s.kind == kind).map(|s| s.level)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.skills.len() >= self.max_skills
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter()
    }

    /// Product of every skill's acceleration factor
    pub fn speed_multiplier(&self, tuning: &Tuning) -> f32 {
        self.skills
            .iter()
            .filter(|s| s.kind == SkillKind::Speed)
            .map(|s| 1.0 + tuning.speed_skill_step * s.level as f32)
            .product()
    }

    /// Advance skill timers and collect this tick's effects
    pub fn apply(&mut self, tuning: &Tuning) -> SkillTick {
        let mut out = SkillTick::default();
        for skill in &mut self.skills {
            match skill.kind {
                SkillKind::Speed => {}
                SkillKind::Regen => {
                    out.heal += tuning.regen_per_level * skill.level as f32;
                }
                SkillKind::Shield => {
                    if skill.timer == 0 {
                        out.shield_charges += 1;
                        skill.timer = skill.refresh_ticks(tuning);
                    }
                    skill.timer -= 1;
                }
            }
        }
        out
    }
}
