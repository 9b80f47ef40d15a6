//! Horde Survivor headless entry point
//!
//! Loads settings, runs the simulation against a scripted autopilot and
//! reports the run. A windowed frontend drives `tick` the same way, feeding
//! real input snapshots instead.
//!
//! Usage: `horde-survivor [settings.json] [--tuning balance.json] [--ticks N] [--seed S]
//! [--quality low|medium|high]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use glam::Vec2;

    use horde_survivor::consts::TICK_RATE;
    use horde_survivor::sim::{DraftCommand, GamePhase, GameState, TickInput, WeaponKind, tick};
    use horde_survivor::{QualityPreset, Settings, Tuning};

    const DEFAULT_SETTINGS: &str = "settings.json";
    /// Five minutes of play
    const DEFAULT_TICKS: u64 = 5 * 60 * TICK_RATE as u64;

    struct Options {
        settings_path: String,
        tuning_path: Option<String>,
        max_ticks: u64,
        seed: u64,
        quality: Option<QualityPreset>,
    }

    fn parse_args() -> Options {
        let mut options = Options {
            settings_path: DEFAULT_SETTINGS.to_string(),
            tuning_path: None,
            max_ticks: DEFAULT_TICKS,
            seed: 0x5eed,
            quality: None,
        };
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--tuning" => options.tuning_path = args.next(),
                "--ticks" => match args.next().and_then(|v| v.parse().ok()) {
                    Some(n) => options.max_ticks = n,
                    None => log::warn!("--ticks expects a number, keeping {}", options.max_ticks),
                },
                "--seed" => match args.next().and_then(|v| v.parse().ok()) {
                    Some(s) => options.seed = s,
                    None => log::warn!("--seed expects a number, keeping {}", options.seed),
                },
                "--quality" => {
                    options.quality = args.next().as_deref().and_then(QualityPreset::parse);
                    if options.quality.is_none() {
                        log::warn!("--quality expects low, medium or high; using settings");
                    }
                }
                path => options.settings_path = path.to_string(),
            }
        }
        options
    }

    /// Kite away from the closest enemy, circling when nothing is near
    fn autopilot(state: &GameState) -> TickInput {
        let mut input = TickInput::default();
        if state.draft.is_active() {
            log::debug!("Draft offer: {:?}", state.draft.view());
            input.draft = Some(DraftCommand::Pick(0));
            return input;
        }
        if state.phase == GamePhase::GameOver {
            return input;
        }

        let me = state.player.pos;
        let threat = state
            .enemies
            .iter()
            .map(|e| (e.pos, e.pos.distance_squared(me)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let mut away = match threat {
            Some((pos, d)) if d < 250.0 * 250.0 => me - pos,
            _ => {
                let t = state.time_ticks as f32 / TICK_RATE as f32;
                Vec2::new(t.cos(), t.sin())
            }
        };
        // Steer back toward the middle near the walls
        let center = state.bounds.center();
        if (me - center).abs().max_element() > center.x * 0.8 {
            away = center - me;
        }

        input.left = away.x < -0.1;
        input.right = away.x > 0.1;
        input.up = away.y < -0.1;
        input.down = away.y > 0.1;
        input
    }

    pub fn run() {
        env_logger::init();
        let options = parse_args();

        let mut settings = Settings::load(&options.settings_path);
        if let Err(e) = settings.validate() {
            log::warn!("{e}; using default settings");
            settings = Settings::default();
        }
        if let Some(quality) = options.quality {
            settings.quality = quality;
        }

        let base = match &options.tuning_path {
            Some(path) => Tuning::load(path).unwrap_or_else(|e| {
                log::warn!("Tuning overrides at {path} unusable ({e}), using defaults");
                Tuning::default()
            }),
            None => Tuning::default(),
        };
        let tuning = settings.apply_to(&base);
        let weapon = WeaponKind::for_profile(settings.profile);
        log::info!(
            "Horde Survivor starting: profile {} ({}), quality {}, viewport {}x{}, seed {}",
            settings.profile,
            weapon.display_name(),
            settings.quality.as_str(),
            tuning.viewport_width,
            tuning.viewport_height,
            options.seed
        );

        let mut state = GameState::with_loadout(options.seed, tuning, weapon);
        state.god_mode = settings.god_mode;

        let mut frames = 0u64;
        while frames < options.max_ticks {
            if matches!(state.phase, GamePhase::GameOver | GamePhase::Quit) {
                break;
            }
            let input = autopilot(&state);
            tick(&mut state, &input);
            frames += 1;
        }

        let stats = &state.stats;
        log::info!(
            "Run finished after {} frames: wave {}, level {}, {} kills, score {}, {:.1}s simulated",
            frames,
            stats.wave,
            stats.level,
            stats.enemies_killed,
            stats.score,
            stats.elapsed_secs()
        );
        for weapon in state.weapons.iter() {
            log::info!("  {} level {}", weapon.kind.display_name(), weapon.level);
        }
        for skill in state.skills.iter() {
            log::info!("  {} level {}", skill.kind.display_name(), skill.level);
        }

        if let Err(e) = settings.save(&options.settings_path) {
            log::warn!("Could not save settings: {e}");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Headless runner is native only; a web frontend links the library directly
}
