//! Game settings and preferences
//!
//! Persisted as a JSON file next to the executable. Missing keys fall back to
//! defaults and unknown keys are carried through a save untouched.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::tuning::Tuning;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 128,
            QualityPreset::Medium => 512,
            QualityPreset::High => 2048,
        }
    }
}

/// Forced window size (overrides the monitor-derived default)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Selected player profile (1..=3)
    pub profile: u8,
    /// Forced screen size, if any
    pub screen_size: Option<ScreenSize>,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Debug ===
    pub show_fps: bool,
    pub show_hitboxes: bool,
    pub god_mode: bool,

    // === Input ===
    /// Action name -> key name overrides
    pub key_binds: BTreeMap<String, String>,

    // === Graphics ===
    pub quality: QualityPreset,
    pub particles: bool,

    /// Keys written by newer versions, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profile: 1,
            screen_size: None,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,

            show_fps: false,
            show_hitboxes: false,
            god_mode: false,

            key_binds: BTreeMap::new(),

            quality: QualityPreset::Medium,
            particles: true,

            extra: serde_json::Map::new(),
        }
    }
}

impl Settings {
    pub const MIN_PROFILE: u8 = 1;
    pub const MAX_PROFILE: u8 = 3;

    /// Parse settings, clamping out-of-range values
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Load settings from disk, falling back to defaults on any failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(GameError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Settings at {} unusable ({e}), using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Write settings to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Reject values a frontend cannot honor
    pub fn validate(&self) -> Result<()> {
        if !(Self::MIN_PROFILE..=Self::MAX_PROFILE).contains(&self.profile) {
            return Err(GameError::InvalidSettings(format!(
                "profile {} outside {}..={}",
                self.profile,
                Self::MIN_PROFILE,
                Self::MAX_PROFILE
            )));
        }
        if matches!(self.screen_size, Some(s) if s.width == 0 || s.height == 0) {
            return Err(GameError::InvalidSettings("zero screen size".to_string()));
        }
        Ok(())
    }

    fn sanitize(&mut self) {
        self.profile = self.profile.clamp(Self::MIN_PROFILE, Self::MAX_PROFILE);
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        if matches!(self.screen_size, Some(s) if s.width == 0 || s.height == 0) {
            self.screen_size = None;
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Tuning adjusted for these preferences (forced viewport, particle cap)
    pub fn apply_to(&self, tuning: &Tuning) -> Tuning {
        let mut tuning = match self.screen_size {
            Some(size) => tuning.with_viewport(size.width as f32, size.height as f32),
            None => tuning.clone(),
        };
        tuning.max_particles = self.max_particles();
        tuning
    }
}
