//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. One call is
//! one 1/60 s step; phases run in a fixed order and nothing inside a tick
//! can fail.

use glam::Vec2;

use super::collision::{capsule_circle_overlap, circles_overlap};
use super::draft::{DraftCommand, UpgradeId, UpgradeOption, eligible_options};
use super::state::{DamageSource, GamePhase, GameState, palette};
use super::wave::{WaveEvent, roll_enemy};
use super::weapons::{Effect, FireContext, Volley, WeaponKind};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Pause toggle
    pub pause: bool,
    /// Skills overlay toggle
    pub skills_menu: bool,
    /// Exit menu toggle
    pub exit_menu: bool,
    /// Cursor in screen space (UI hit-testing happens in the frontend)
    pub mouse_position: Vec2,
    pub mouse_click: bool,
    /// Upgrade draft button pressed this tick
    pub draft: Option<DraftCommand>,
    /// Quit chosen in the exit menu
    pub quit: bool,
    /// Start a new run (game over or exit menu)
    pub restart: bool,
    /// Window close event
    pub close_requested: bool,
}

impl TickInput {
    /// Axis intent in {-1, 0, 1}²; screen y grows downward
    pub fn intent(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| pos as i32 as f32 - neg as i32 as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.close_requested {
        if state.phase != GamePhase::Quit {
            log::info!("Close requested, quitting");
        }
        state.phase = GamePhase::Quit;
        return;
    }

    if !handle_menus(state, input) {
        return;
    }

    // Draft open: only its buttons do anything
    if state.draft.is_active() {
        if let Some(command) = input.draft {
            run_draft(state, command);
        }
        return;
    }

    simulate(state, input);
}

/// Menu and lifecycle transitions; returns true if the sim should run
fn handle_menus(state: &mut GameState, input: &TickInput) -> bool {
    match state.phase {
        GamePhase::Quit => return false,
        GamePhase::GameOver => {
            if input.restart {
                state.restart();
            }
            return false;
        }
        GamePhase::ExitMenu => {
            if input.quit {
                log::info!("Quit from exit menu");
                state.phase = GamePhase::Quit;
            } else if input.restart {
                state.restart();
            } else if input.exit_menu {
                state.phase = GamePhase::Playing;
            }
            return false;
        }
        GamePhase::Paused => {
            if input.pause {
                state.phase = GamePhase::Playing;
            }
            return false;
        }
        GamePhase::SkillsOverlay => {
            if input.skills_menu {
                state.phase = GamePhase::Playing;
            }
            return false;
        }
        GamePhase::Playing => {}
    }

    if input.exit_menu {
        state.phase = GamePhase::ExitMenu;
    } else if input.pause {
        state.phase = GamePhase::Paused;
    } else if input.skills_menu {
        state.phase = GamePhase::SkillsOverlay;
    }
    state.phase == GamePhase::Playing
}

fn run_draft(state: &mut GameState, command: DraftCommand) {
    let eligible = eligible_options(&state.weapons, &state.skills);
    if let Some(choice) = state.draft.handle(command, &eligible, &mut state.rng) {
        apply_upgrade(state, &choice);
    }
}

/// Mutate the rosters for a picked option; a rejected change is a no-op
pub fn apply_upgrade(state: &mut GameState, option: &UpgradeOption) -> bool {
    let tuning = &state.tuning;
    let applied = match option.id {
        UpgradeId::Weapon(kind) if option.is_new => state.weapons.add_weapon(kind, tuning),
        UpgradeId::Weapon(kind) => state.weapons.upgrade(kind, tuning),
        UpgradeId::Skill(kind) if option.is_new => state.skills.add_skill(kind),
        UpgradeId::Skill(kind) => state.skills.upgrade(kind),
    };

    if applied {
        state.stats.level += 1;
        state.orbs.clear();
        state.orbs.extend_from_slice(state.weapons.orbs());
        log::info!(
            "Upgrade {} applied (player level {})",
            option.id.key(),
            state.stats.level
        );
    } else {
        log::info!("Upgrade {} rejected, ignoring", option.id.key());
    }
    applied
}

fn simulate(state: &mut GameState, input: &TickInput) {
    state.time_ticks += 1;

    // Player
    let intent = input.intent();
    let speed_mult = state.skills.speed_multiplier(&state.tuning);
    state.player.step(intent, speed_mult);
    state.player.clamp_to(&state.bounds);

    let moving = intent != Vec2::ZERO;
    state
        .camera
        .update(state.player.pos, moving, &state.bounds, &state.tuning);

    state.bonuses.update();

    if update_wave(state) {
        // Draft opened: the rest of the world waits for the pick
        finish_tick(state);
        return;
    }

    update_enemies(state);
    if state.player.is_dead() {
        state.phase = GamePhase::GameOver;
        finish_tick(state);
        let stats = &state.stats;
        log::info!(
            "Game over: wave {}, level {}, {} kills, score {}, {:.1}s",
            stats.wave,
            stats.level,
            stats.enemies_killed,
            stats.score,
            stats.elapsed_secs()
        );
        return;
    }

    fire_weapons(state);
    state.reap_enemies();

    let skill_tick = state.skills.apply(&state.tuning);
    state.player.heal(skill_tick.heal);
    if skill_tick.shield_charges > 0 {
        state
            .bonuses
            .add_shield(skill_tick.shield_charges, state.tuning.shield_max_charges);
    }

    state.weapons.sync_orbs(&state.tuning);
    state.orbs.clear();
    state.orbs.extend_from_slice(state.weapons.orbs());

    update_zaps(state);
    update_lightnings(state);
    update_beams(state);
    update_particles(state);

    state.reap_enemies();
    finish_tick(state);
}

/// Spawn or advance; returns true if an upgrade draft opened
fn update_wave(state: &mut GameState) -> bool {
    match state.wave.update(state.enemies.len(), &state.tuning) {
        WaveEvent::Idle => false,
        WaveEvent::Spawn => {
            let id = state.next_entity_id();
            let view = state.camera.view_rect();
            let enemy = roll_enemy(
                id,
                view,
                state.wave.wave_number,
                &state.bounds,
                &state.tuning,
                &mut state.rng,
            );
            if let Some(kind) = enemy.bonus_type {
                log::debug!("Special enemy {} carries {}", id, kind.name());
            }
            state.enemies.push(enemy);
            false
        }
        WaveEvent::Advanced { wave, open_draft } => {
            state.stats.score += state.tuning.wave_bonus_multiplier * wave as u64;
            state.stats.wave = wave;
            log::info!(
                "Wave {} begins: {} enemies, spawn delay {}",
                wave,
                state.wave.target_this_wave,
                state.wave.spawn_delay
            );
            if !open_draft {
                return false;
            }
            let eligible = eligible_options(&state.weapons, &state.skills);
            state.draft.enter(&eligible, &mut state.rng)
        }
    }
}

fn update_enemies(state: &mut GameState) {
    let target = state.player.pos;
    let player_size = state.player.size;
    let speed_mult = state.bonuses.enemy_speed_multiplier();

    let mut contacts = Vec::new();
    for enemy in &mut state.enemies {
        enemy.step(target, speed_mult, &state.tuning, &mut state.rng);
        if circles_overlap(enemy.pos, enemy.size, target, player_size) {
            contacts.push(enemy.damage);
        }
    }
    for damage in contacts {
        state.damage_player(damage);
    }
}

/// Each weapon sees the damage dealt by the ones before it this tick
fn fire_weapons(state: &mut GameState) {
    let kinds: Vec<WeaponKind> = state.weapons.iter().map(|w| w.kind).collect();
    for kind in kinds {
        let volley = {
            let ctx = FireContext {
                origin: state.player.pos,
                enemies: &state.enemies,
                tuning: &state.tuning,
                tick: state.time_ticks,
            };
            let Some(weapon) = state.weapons.get_mut(kind) else {
                continue;
            };
            weapon.update();
            weapon.fire(&ctx, &mut state.rng)
        };
        if let Some(volley) = volley {
            apply_volley(state, volley);
        }
    }
}

fn apply_volley(state: &mut GameState, volley: Volley) {
    for effect in volley.effects {
        let id = state.next_entity_id();
        match effect {
            Effect::Zap(mut zap) => {
                zap.id = id;
                state.zaps.push(zap);
            }
            Effect::Lightning(mut bolt) => {
                bolt.id = id;
                state.lightnings.push(bolt);
            }
            Effect::Beam(mut beam) => {
                beam.id = id;
                state.beams.push(beam);
            }
        }
    }
    for hit in volley.hits {
        state.damage_enemy(hit.enemy_id, hit.damage, hit.source);
    }
}

/// Move zaps, resolve first hits and cull strays outside the extended view
fn update_zaps(state: &mut GameState) {
    let now = state.time_ticks;
    let keep_area = state
        .camera
        .view_rect()
        .expanded(state.tuning.zap_cull_margin);

    let zaps = std::mem::take(&mut state.zaps);
    let mut kept = Vec::with_capacity(zaps.len());
    for mut zap in zaps {
        // Fired this tick: starts moving next tick
        if zap.spawn_tick != now {
            zap.pos += zap.dir * zap.speed;
        }

        let struck = state
            .enemies
            .iter()
            .find(|e| e.is_alive() && circles_overlap(zap.pos, zap.size, e.pos, e.size))
            .map(|e| e.id);
        if let Some(id) = struck {
            state.damage_enemy(id, zap.damage, DamageSource::Zap);
            state.burst_particles(zap.pos, zap.size, 4, palette::SPARK);
            continue;
        }

        if keep_area.contains(zap.pos) {
            kept.push(zap);
        }
    }
    state.zaps = kept;
}

fn update_lightnings(state: &mut GameState) {
    for bolt in &mut state.lightnings {
        bolt.remaining_life = bolt.remaining_life.saturating_sub(1);
    }
    state.lightnings.retain(|l| l.remaining_life > 0);
}

/// Beams ride on the player and pulse on their cadence
fn update_beams(state: &mut GameState) {
    let origin = state.player.pos;
    let mut beams = std::mem::take(&mut state.beams);
    for beam in &mut beams {
        beam.origin = origin;
        if beam.is_pulse_tick() {
            beam.pulse_hits.clear();
            let (a, b) = (beam.origin, beam.end());
            let targets: Vec<u32> = state
                .enemies
                .iter()
                .filter(|e| e.is_alive())
                .filter(|e| capsule_circle_overlap(a, b, beam.thickness, e.pos, e.size))
                .map(|e| e.id)
                .collect();
            for id in targets {
                if beam.pulse_hits.contains(&id) {
                    continue;
                }
                state.damage_enemy(id, beam.damage, DamageSource::Beam);
                beam.pulse_hits.push(id);
            }
        }
        beam.age += 1;
    }
    beams.retain(|b| !b.is_expired());
    state.beams = beams;
}

fn update_particles(state: &mut GameState) {
    for p in &mut state.particles {
        p.step();
    }
    state.particles.retain(|p| p.remaining_life > 0);
}

fn finish_tick(state: &mut GameState) {
    state.stats.elapsed_ticks = state.time_ticks;
    state.stats.wave = state.wave.wave_number;
    state.normalize_order();
}
