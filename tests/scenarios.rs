//! End-to-end gameplay scenarios driven through `tick`

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use horde_survivor::Tuning;
use horde_survivor::sim::bonus::BonusKind;
use horde_survivor::sim::draft::DraftPhase;
use horde_survivor::sim::wave::{WaveController, make_enemy};
use horde_survivor::sim::{
    DamageSource, DraftCommand, GameState, SkillKind, TickInput, WeaponKind, WeaponManager, tick,
};
use horde_survivor::wrap_angle;

/// Tuning whose first spawn never comes
fn quiet() -> Tuning {
    Tuning {
        spawn_base_delay: 1_000_000,
        ..Default::default()
    }
}

/// Run with only `weapon` equipped (or nothing)
fn armed_with(tuning: Tuning, weapon: Option<WeaponKind>) -> GameState {
    let mut state = GameState::new(1, tuning);
    state.weapons = WeaponManager::new(&state.tuning);
    if let Some(kind) = weapon {
        let tuning = state.tuning.clone();
        state.weapons.add_weapon(kind, &tuning);
    }
    state.orbs = state.weapons.orbs().to_vec();
    state
}

/// Enemy that stands still at an offset from the player
fn place_still(state: &mut GameState, offset: Vec2) -> u32 {
    let pos = state.player.pos + offset;
    let id = state.spawn_enemy_at(pos);
    let enemy = state.enemies.iter_mut().find(|e| e.id == id).unwrap();
    enemy.speed = 0.0;
    id
}

fn idle() -> TickInput {
    TickInput::default()
}

#[test]
fn lightning_chain_stops_at_gap() {
    let tuning = Tuning {
        lightning_range: 100.0,
        lightning_chain_range: 50.0,
        ..quiet()
    };
    let mut state = armed_with(tuning, Some(WeaponKind::Lightning));
    let ids: Vec<u32> = [30.0, 60.0, 90.0, 200.0]
        .into_iter()
        .map(|x| place_still(&mut state, Vec2::new(x, 0.0)))
        .collect();

    tick(&mut state, &idle());

    let damaged: Vec<u32> = state
        .enemies
        .iter()
        .filter(|e| e.health < e.max_health)
        .map(|e| e.id)
        .collect();
    assert_eq!(damaged, ids[..3].to_vec());
    assert!(state.enemies.iter().all(|e| e.is_alive()));
    assert_eq!(state.lightnings.len(), 3);
    assert!(!state.lightnings[0].is_chain_segment);
    assert!(state.lightnings[1..].iter().all(|l| l.is_chain_segment));

    // Damage is dealt once, not per lifetime tick
    let health: Vec<f32> = state.enemies.iter().map(|e| e.health).collect();
    for _ in 0..5 {
        tick(&mut state, &idle());
    }
    let later: Vec<f32> = state.enemies.iter().map(|e| e.health).collect();
    assert_eq!(health, later);
}

#[test]
fn orbs_complete_a_revolution_in_120_ticks() {
    let tuning = Tuning {
        orb_angular_speed: PI / 60.0,
        ..quiet()
    };
    let mut state = armed_with(tuning.clone(), Some(WeaponKind::Orb));
    state.weapons.upgrade(WeaponKind::Orb, &tuning);
    state.weapons.upgrade(WeaponKind::Orb, &tuning);
    state.orbs = state.weapons.orbs().to_vec();

    let start: Vec<f32> = state.orbs.iter().map(|o| o.phase).collect();
    for (i, phase) in start.iter().enumerate() {
        let expected = TAU * i as f32 / 3.0;
        assert!((phase - expected).abs() < 1e-4);
    }

    for _ in 0..120 {
        tick(&mut state, &idle());
    }

    assert_eq!(state.orbs.len(), 3);
    for (orb, phase) in state.orbs.iter().zip(&start) {
        let drift = wrap_angle(orb.phase - phase);
        assert!(drift < 1e-3 || TAU - drift < 1e-3, "drift {drift}");
        let home = state.player.pos + Vec2::new(phase.cos(), phase.sin()) * orb.radius;
        assert!(orb.pos.distance(home) < 0.1);
    }
}

#[test]
fn wave_advance_opens_draft() {
    let tuning = Tuning::default();
    let mut state = GameState::new(7, tuning.clone());
    state.wave.wave_number = 2;
    state.wave.target_this_wave = 5;
    state.wave.spawned_this_wave = 5;
    state.wave.spawn_delay = WaveController::spawn_delay_for(2, &tuning);
    let score = state.stats.score;

    tick(&mut state, &idle());

    assert_eq!(state.wave.wave_number, 3);
    assert_eq!(state.stats.wave, 3);
    assert_eq!(state.wave.target_this_wave, 5 + tuning.wave_target_step);
    assert_eq!(state.wave.spawned_this_wave, 0);
    assert_eq!(state.wave.spawn_delay, 48); // ⌊60 · 0.9²⌋
    assert_eq!(state.stats.score, score + tuning.wave_bonus_multiplier * 3);
    assert_eq!(state.draft.phase, DraftPhase::Presenting);
    assert!(!state.draft.options.is_empty() && state.draft.options.len() <= 3);

    // Simulation waits on the draft
    let ticks = state.time_ticks;
    tick(&mut state, &idle());
    assert_eq!(state.time_ticks, ticks);

    tick(
        &mut state,
        &TickInput {
            draft: Some(DraftCommand::Pick(0)),
            ..Default::default()
        },
    );
    assert_eq!(state.draft.phase, DraftPhase::Idle);
    assert_eq!(state.stats.level, 2);
}

#[test]
fn invincibility_blocks_contact_for_its_duration() {
    let mut state = armed_with(quiet(), None);
    let pos = state.player.pos + Vec2::new(10.0, 0.0);
    state.spawn_enemy_at(pos);
    state.bonuses.apply_timed(BonusKind::Invincibility, 60);

    let full = state.player.health;
    for _ in 0..60 {
        tick(&mut state, &idle());
        assert_eq!(state.player.health, full);
    }

    tick(&mut state, &idle());
    assert!(state.player.health < full);
    assert!(!state.bonuses.is_active(BonusKind::Invincibility));
}

#[test]
fn nuke_clears_the_field() {
    let tuning = quiet();
    let mut state = armed_with(tuning.clone(), None);
    for i in 0..10 {
        let angle = TAU * i as f32 / 10.0;
        let pos = state.player.pos + Vec2::new(angle.cos(), angle.sin()) * 300.0;
        state.spawn_enemy_at(pos);
    }
    let score = state.stats.score;

    state.apply_bonus(BonusKind::Nuke);

    assert!(state.enemies.is_empty());
    assert_eq!(state.stats.enemies_killed, 10);
    assert_eq!(state.stats.score, score + 10 * tuning.score_per_kill);
    assert_eq!(state.bonuses.frames_left(BonusKind::Nuke), 0);
    assert_eq!(state.bonuses.active().count(), 0);
}

#[test]
fn beam_pulses_four_times() {
    let mut state = armed_with(quiet(), Some(WeaponKind::Beam));
    let id = place_still(&mut state, Vec2::new(100.0, 0.0));
    {
        let enemy = state.enemies.iter_mut().find(|e| e.id == id).unwrap();
        enemy.max_health = 100.0;
        enemy.health = 100.0;
    }

    for _ in 0..60 {
        tick(&mut state, &idle());
    }

    let enemy = state.enemies.iter().find(|e| e.id == id).unwrap();
    assert_eq!(enemy.health, 80.0);
    assert_eq!(enemy.last_hit, Some(DamageSource::Beam));
    assert!(state.beams.is_empty());
}

#[test]
fn special_bonus_applies_on_kill() {
    let tuning = quiet();
    let mut state = armed_with(tuning.clone(), None);
    let id = state.next_entity_id();
    let pos = state.player.pos + Vec2::new(200.0, 0.0);
    state
        .enemies
        .push(make_enemy(id, pos, 1, Some(BonusKind::Freeze), &tuning));

    state.damage_enemy(id, 10_000.0, DamageSource::Lightning);
    state.reap_enemies();

    assert!(state.enemies.is_empty());
    assert!(state.bonuses.is_active(BonusKind::Freeze));
    assert_eq!(state.bonuses.enemy_speed_multiplier(), 0.0);
    assert_eq!(state.stats.enemies_killed, 1);
    assert_eq!(state.stats.score, tuning.score_per_lightning_kill);
}

#[test]
fn shield_charge_absorbs_exactly_one_contact() {
    let mut state = armed_with(quiet(), None);
    state.bonuses.add_shield(1, 5);
    let pos = state.player.pos + Vec2::new(10.0, 0.0);
    state.spawn_enemy_at(pos);

    tick(&mut state, &idle());
    assert_eq!(state.bonuses.shield_charges(), 0);
    assert_eq!(state.player.health, state.player.max_health);

    tick(&mut state, &idle());
    assert!(state.player.health < state.player.max_health);
}

#[test]
fn damage_boost_scales_hits() {
    let tuning = quiet();
    let mut state = armed_with(tuning.clone(), None);
    let id = place_still(&mut state, Vec2::new(300.0, 0.0));
    state.apply_bonus(BonusKind::DamageBoost);
    state.damage_enemy(id, 2.0, DamageSource::Orb);
    let enemy = &state.enemies[0];
    assert!((enemy.max_health - enemy.health - 2.0 * tuning.damage_boost_factor).abs() < 1e-5);
}

#[test]
fn enemies_remaining_counts_unspawned() {
    let mut state = armed_with(quiet(), None);
    let target = state.wave.target_this_wave;
    assert_eq!(state.enemies_remaining(), target);
    state.wave.spawned_this_wave = 2;
    place_still(&mut state, Vec2::new(400.0, 0.0));
    assert_eq!(state.enemies_remaining(), target - 2 + 1);
}

#[test]
fn spawned_enemies_appear_outside_the_view() {
    let tuning = Tuning {
        spawn_base_delay: 1,
        spawn_min_delay: 1,
        ..Default::default()
    };
    let mut state = armed_with(tuning, None);
    for _ in 0..5 {
        let view = state.camera.view_rect();
        let before = state.enemies.len();
        tick(&mut state, &idle());
        assert_eq!(state.enemies.len(), before + 1);
        let newest = state.enemies.last().unwrap();
        assert!(state.bounds.contains(newest.pos));
        // Jitter and one step of movement happened after the spawn
        assert!(!view.expanded(-4.0).contains(newest.pos));
    }
}

#[test]
fn freeze_holds_enemies_in_place() {
    let mut state = armed_with(quiet(), None);
    let pos = state.player.pos + Vec2::new(300.0, 0.0);
    let id = state.spawn_enemy_at(pos);
    state.apply_bonus(BonusKind::Freeze);

    for _ in 0..10 {
        tick(&mut state, &idle());
    }
    let enemy = state.enemies.iter().find(|e| e.id == id).unwrap();
    assert_eq!(enemy.pos, pos);

    // Thawed once the timer runs out
    let frames = state.bonuses.frames_left(BonusKind::Freeze);
    for _ in 0..frames + 1 {
        tick(&mut state, &idle());
    }
    let enemy = state.enemies.iter().find(|e| e.id == id).unwrap();
    assert!(enemy.pos.distance(state.player.pos) < 300.0);
}

#[test]
fn time_slow_scales_enemy_steps() {
    let tuning = quiet();
    let offset = Vec2::new(300.0, 120.0);
    let mut normal = armed_with(tuning.clone(), None);
    let mut slowed = armed_with(tuning.clone(), None);
    let start = normal.player.pos + offset;
    normal.spawn_enemy_at(start);
    slowed.spawn_enemy_at(start);
    slowed.apply_bonus(BonusKind::TimeSlow);

    tick(&mut normal, &idle());
    tick(&mut slowed, &idle());

    let full = normal.enemies[0].pos - start;
    let slow = slowed.enemies[0].pos - start;
    assert!(full.length() > 0.0);
    assert!(slow.distance(full * tuning.time_slow_factor) < 1e-3);
}

#[test]
fn regen_stops_at_max_health() {
    let tuning = quiet();
    let mut state = armed_with(tuning.clone(), None);
    state.skills.add_skill(SkillKind::Regen);

    state.player.health = 50.0;
    tick(&mut state, &idle());
    assert!((state.player.health - (50.0 + tuning.regen_per_level)).abs() < 1e-4);

    state.player.health = state.player.max_health - tuning.regen_per_level * 0.5;
    for _ in 0..3 {
        tick(&mut state, &idle());
        assert_eq!(state.player.health, state.player.max_health);
    }
}
