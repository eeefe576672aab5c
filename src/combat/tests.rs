//! Combat domain: tests for block timing, hit resolution, and combo flow.

use bevy::prelude::*;

use super::{
    AnimationCues, BlockController, Capabilities, CombatTuning, CombatantState, ComboController,
    ComboTick, Cooldowns, DefenderView, Health, HitOutcome, HitShape, HitVolume, HitVolumes,
    LockHolder, RequestOutcome, Strike, StrikeKind, Team, Weapon, cue, resolve_strike, steer,
};
use crate::movement::Facing;

const TICK: f32 = 1.0 / 60.0;

fn entities(count: usize) -> Vec<Entity> {
    let mut world = World::new();
    (0..count).map(|_| world.spawn_empty().id()).collect()
}

fn combo() -> ComboController {
    ComboController::new(
        vec!["Light1".into(), "Light2".into(), "Light3".into()],
        "Heavy",
        2,
    )
}

/// Reports the currently playing clip at `progress`, as the animation layer would
fn report(cues: &mut AnimationCues, combo: &ComboController, progress: f32) {
    if let Some(clip) = combo.current_clip() {
        cues.report_progress(clip.to_string(), progress);
    }
}

fn defender<'a>(block: Option<&'a BlockController>) -> DefenderView<'a> {
    DefenderView {
        position: Vec2::ZERO,
        forward: Vec2::X,
        capabilities: Capabilities {
            has_block: block.is_some(),
            has_health: true,
        },
        block,
    }
}

fn strike_from_front(heavy: bool) -> Strike {
    Strike {
        attacker_position: Vec2::new(2.0, 0.0),
        damage: 10.0,
        heavy,
    }
}

/// A block that has been held for `held` seconds
fn held_block(held: f32) -> BlockController {
    let mut block = BlockController::new(0.2, 60.0);
    let mut cues = AnimationCues::default();
    assert!(block.start(&CombatantState::default(), &mut cues));
    let mut elapsed = 0.0;
    while elapsed + TICK <= held + 1e-4 {
        block.tick(TICK);
        elapsed += TICK;
    }
    block
}

// -----------------------------------------------------------------------------
// Health tests
// -----------------------------------------------------------------------------

#[test]
fn test_health_damage_clamps_at_zero() {
    let mut health = Health::new(30.0);
    assert_eq!(health.take_damage(12.0), 12.0);
    assert_eq!(health.take_damage(50.0), 18.0);
    assert_eq!(health.current, 0.0);
    assert!(health.is_dead());
}

#[test]
fn test_health_ignores_non_positive_damage() {
    let mut health = Health::new(30.0);
    assert_eq!(health.take_damage(-5.0), 0.0);
    assert_eq!(health.take_damage(0.0), 0.0);
    assert_eq!(health.current, 30.0);
}

#[test]
fn test_health_percent_and_reset() {
    let mut health = Health::new(200.0);
    health.take_damage(150.0);
    assert!((health.percent() - 0.25).abs() < 1e-6);
    health.reset();
    assert_eq!(health.current, 200.0);
}

// -----------------------------------------------------------------------------
// BlockController tests
// -----------------------------------------------------------------------------

#[test]
fn test_block_start_raises_flag_and_resets_timer() {
    let mut block = held_block(0.5);
    let mut cues = AnimationCues::default();
    block.stop(&mut cues);
    assert!(!block.is_blocking);
    assert_eq!(block.held_seconds, 0.0);
    assert!(!cues.bool(cue::IS_BLOCKING));

    assert!(block.start(&CombatantState::default(), &mut cues));
    assert!(block.is_blocking);
    assert_eq!(block.held_seconds, 0.0);
    assert!(cues.bool(cue::IS_BLOCKING));
}

#[test]
fn test_block_refused_while_attack_locked() {
    let mut block = BlockController::new(0.2, 60.0);
    let mut state = CombatantState::default();
    let mut cues = AnimationCues::default();
    assert!(state.acquire(LockHolder::Combo));

    assert!(!block.start(&state, &mut cues));
    assert!(!block.is_blocking);
}

#[test]
fn test_block_timer_only_advances_while_blocking() {
    let mut block = BlockController::new(0.2, 60.0);
    block.tick(1.0);
    assert_eq!(block.held_seconds, 0.0);
}

#[test]
fn test_parry_window_boundary() {
    assert!(held_block(0.1).would_parry());
    assert!(!held_block(0.3).would_parry());
}

#[test]
fn test_guard_cone() {
    let block = BlockController::new(0.2, 60.0);
    let forward = Vec2::X;

    assert!(block.is_facing(Vec2::ZERO, forward, Vec2::new(1.0, 0.0)));
    assert!(block.is_facing(Vec2::ZERO, forward, Vec2::new(1.0, 1.0)));
    assert!(!block.is_facing(Vec2::ZERO, forward, Vec2::new(0.0, 1.0)));
    assert!(!block.is_facing(Vec2::ZERO, forward, Vec2::new(-1.0, 0.0)));
}

#[test]
fn test_coincident_attacker_is_not_faced() {
    let block = BlockController::new(0.2, 60.0);
    assert!(!block.is_facing(Vec2::ONE, Vec2::X, Vec2::ONE));
}

// -----------------------------------------------------------------------------
// Hit resolution tests
// -----------------------------------------------------------------------------

#[test]
fn test_fresh_block_parries() {
    let block = held_block(0.1);
    let outcome = resolve_strike(&strike_from_front(false), &defender(Some(&block)), 8.0);
    assert_eq!(outcome, HitOutcome::Parried);
}

#[test]
fn test_parry_beats_heavy_attacks() {
    let block = held_block(0.1);
    let outcome = resolve_strike(&strike_from_front(true), &defender(Some(&block)), 8.0);
    assert_eq!(outcome, HitOutcome::Parried);
}

#[test]
fn test_held_block_absorbs_light_hit_and_pushes() {
    let block = held_block(0.3);
    let outcome = resolve_strike(&strike_from_front(false), &defender(Some(&block)), 8.0);

    let HitOutcome::Blocked { push } = outcome else {
        panic!("expected a blocked hit, got {:?}", outcome);
    };
    // Attacker stands at +X, so the defender is pushed toward -X
    assert!((push - Vec2::new(-8.0, 0.0)).length() < 1e-5);
}

#[test]
fn test_heavy_breaks_guard_and_still_damages() {
    let block = held_block(0.3);
    let outcome = resolve_strike(&strike_from_front(true), &defender(Some(&block)), 8.0);
    assert_eq!(outcome, HitOutcome::GuardBroken { damage: 10.0 });
}

#[test]
fn test_hit_from_behind_bypasses_block() {
    let block = held_block(0.3);
    let strike = Strike {
        attacker_position: Vec2::new(-2.0, 0.0),
        damage: 10.0,
        heavy: false,
    };
    let outcome = resolve_strike(&strike, &defender(Some(&block)), 8.0);
    assert_eq!(outcome, HitOutcome::Damaged { damage: 10.0 });
}

#[test]
fn test_target_without_health_is_ignored() {
    let view = DefenderView {
        capabilities: Capabilities {
            has_block: false,
            has_health: false,
        },
        ..defender(None)
    };
    let outcome = resolve_strike(&strike_from_front(false), &view, 8.0);
    assert_eq!(outcome, HitOutcome::Ignored);
}

#[test]
fn test_weapon_heavy_damage() {
    let weapon = Weapon {
        base_damage: 10.0,
        heavy_multiplier: 2.5,
    };
    assert_eq!(weapon.damage(false), 10.0);
    assert_eq!(weapon.damage(true), 25.0);
}

// -----------------------------------------------------------------------------
// Hit volume tests
// -----------------------------------------------------------------------------

#[test]
fn test_target_struck_at_most_once_per_swing() {
    let targets = entities(2);
    let mut volumes = HitVolumes {
        volumes: vec![
            HitVolume::new(HitShape::Circle { radius: 0.8 }, Vec2::new(1.0, 0.0)),
            HitVolume::new(HitShape::Circle { radius: 0.8 }, Vec2::new(1.0, 0.5)),
        ],
        ..default()
    };

    assert!(volumes.open_swing(0));
    assert!(volumes.mark_struck(targets[0]));
    // Second volume overlapping the same target in the same swing
    assert!(!volumes.mark_struck(targets[0]));
    assert!(volumes.mark_struck(targets[1]));

    // A new swing starts with a clean hit set
    assert!(volumes.open_swing(1));
    assert!(volumes.mark_struck(targets[0]));
}

#[test]
fn test_open_swing_rejects_missing_volume() {
    let mut volumes = HitVolumes::default();
    assert!(!volumes.open_swing(0));
    assert!(!volumes.any_enabled());
}

#[test]
fn test_volume_center_follows_facing() {
    let volume = HitVolume::new(HitShape::Circle { radius: 0.5 }, Vec2::new(1.0, 0.5));
    let center = volume.center(Vec2::ZERO, Vec2::Y);
    assert!((center - Vec2::new(-0.5, 1.0)).length() < 1e-5);
}

#[test]
fn test_box_volume_is_aligned_with_facing() {
    let shape = HitShape::Box {
        half_extents: Vec2::new(1.0, 0.2),
    };
    // Long axis along +Y when facing up
    assert!(shape.touches_circle(Vec2::ZERO, Vec2::Y, Vec2::new(0.0, 1.1), 0.2));
    assert!(!shape.touches_circle(Vec2::ZERO, Vec2::Y, Vec2::new(1.1, 0.0), 0.2));
}

// -----------------------------------------------------------------------------
// ComboController tests
// -----------------------------------------------------------------------------

#[test]
fn test_light_request_starts_combo_under_lock() {
    let mut combo = combo();
    let mut state = CombatantState::default();
    let mut cues = AnimationCues::default();

    let outcome = combo.request(StrikeKind::Light, &mut state, &mut cues);
    assert_eq!(outcome, RequestOutcome::Started);
    assert_eq!(state.lock, Some(LockHolder::Combo));
    assert_eq!(combo.step, 1);
    assert!(cues.bool(cue::IS_ATTACK));
    assert_eq!(cues.int(cue::ATTACK_STEP), 1);

    let request = cues.take_request().expect("clip requested");
    assert_eq!(request.clip, "Light1");
    assert_eq!(request.swing_volume, Some(0));
}

#[test]
fn test_requests_while_running_are_queued() {
    let mut combo = combo();
    let mut state = CombatantState::default();
    let mut cues = AnimationCues::default();
    combo.request(StrikeKind::Light, &mut state, &mut cues);

    assert_eq!(
        combo.request(StrikeKind::Light, &mut state, &mut cues),
        RequestOutcome::Queued
    );
    assert!(combo.queued_light);

    // Heavy supersedes a queued light
    combo.request(StrikeKind::Heavy, &mut state, &mut cues);
    assert!(combo.queued_heavy);
    assert!(!combo.queued_light);
}

#[test]
fn test_request_rejected_while_task_holds_lock() {
    let mut combo = combo();
    let mut state = CombatantState::default();
    let mut cues = AnimationCues::default();
    state.acquire(LockHolder::Task);

    assert_eq!(
        combo.request(StrikeKind::Light, &mut state, &mut cues),
        RequestOutcome::Rejected
    );
    assert!(!combo.is_running());
    assert_eq!(state.lock, Some(LockHolder::Task));
}

#[test]
fn test_step_waits_for_ready_threshold() {
    let tuning = CombatTuning::default();
    let mut combo = combo();
    let mut state = CombatantState::default();
    let mut cues = AnimationCues::default();
    combo.request(StrikeKind::Light, &mut state, &mut cues);
    combo.request(StrikeKind::Light, &mut state, &mut cues);

    // Never ready on the first tick, whatever the reported progress
    report(&mut cues, &combo, 1.0);
    assert_eq!(combo.tick(&mut cues, &tuning), ComboTick::Waiting);

    report(&mut cues, &combo, 0.5);
    assert_eq!(combo.tick(&mut cues, &tuning), ComboTick::Waiting);

    report(&mut cues, &combo, 0.75);
    assert_eq!(combo.tick(&mut cues, &tuning), ComboTick::Advanced);
    assert_eq!(combo.step, 2);
    assert_eq!(combo.current_clip(), Some("Light2"));
}

#[test]
fn test_combo_finishes_without_queued_input() {
    let tuning = CombatTuning::default();
    let mut combo = combo();
    let mut state = CombatantState::default();
    let mut cues = AnimationCues::default();
    combo.request(StrikeKind::Light, &mut state, &mut cues);

    combo.tick(&mut cues, &tuning);
    report(&mut cues, &combo, 0.9);
    assert_eq!(
        combo.tick(&mut cues, &tuning),
        ComboTick::Finished { task_owned: false }
    );
    assert_eq!(combo.step, 0);
    assert!(!combo.is_running());
    assert!(!cues.bool(cue::IS_ATTACK));
}

#[test]
fn test_stalled_step_is_forced_forward() {
    let tuning = CombatTuning {
        max_step_frames: 3,
        ..default()
    };
    let mut combo = combo();
    let mut state = CombatantState::default();
    let mut cues = AnimationCues::default();
    combo.request(StrikeKind::Light, &mut state, &mut cues);

    // No progress is ever reported
    for _ in 0..3 {
        assert_eq!(combo.tick(&mut cues, &tuning), ComboTick::Waiting);
    }
    assert_eq!(
        combo.tick(&mut cues, &tuning),
        ComboTick::Finished { task_owned: false }
    );
}

#[test]
fn test_heavy_step_resets_light_count() {
    let tuning = CombatTuning::default();
    let mut combo = combo();
    let mut state = CombatantState::default();
    let mut cues = AnimationCues::default();
    combo.request(StrikeKind::Light, &mut state, &mut cues);
    combo.request(StrikeKind::Heavy, &mut state, &mut cues);

    combo.tick(&mut cues, &tuning);
    report(&mut cues, &combo, 0.8);
    assert_eq!(combo.tick(&mut cues, &tuning), ComboTick::Advanced);
    assert_eq!(combo.step, 0);
    assert!(combo.is_heavy());
    assert!(cues.bool(cue::IS_HEAVY_ATTACK));
    // Heavy swings use the last volume
    assert_eq!(
        cues.take_request().and_then(|r| r.swing_volume),
        Some(1)
    );
}

#[test]
fn test_light_steps_clamp_to_last_clip() {
    let tuning = CombatTuning::default();
    let mut combo = combo();
    let mut state = CombatantState::default();
    let mut cues = AnimationCues::default();
    combo.request(StrikeKind::Light, &mut state, &mut cues);

    for _ in 0..3 {
        combo.request(StrikeKind::Light, &mut state, &mut cues);
        combo.tick(&mut cues, &tuning);
        report(&mut cues, &combo, 0.9);
        combo.tick(&mut cues, &tuning);
    }
    assert_eq!(combo.step, 4);
    assert_eq!(combo.current_clip(), Some("Light3"));
}

#[test]
fn test_task_driven_combo_reports_ownership() {
    let tuning = CombatTuning::default();
    let mut combo = combo();
    let mut cues = AnimationCues::default();

    assert_eq!(
        combo.request_from_task(StrikeKind::Heavy, &mut cues),
        RequestOutcome::Started
    );
    combo.tick(&mut cues, &tuning);
    report(&mut cues, &combo, 1.0);
    assert_eq!(
        combo.tick(&mut cues, &tuning),
        ComboTick::Finished { task_owned: true }
    );
}

#[test]
fn test_reset_drops_sequence_and_queue() {
    let mut combo = combo();
    let mut state = CombatantState::default();
    let mut cues = AnimationCues::default();
    combo.request(StrikeKind::Light, &mut state, &mut cues);
    combo.request(StrikeKind::Heavy, &mut state, &mut cues);

    combo.reset(&mut cues);
    assert!(!combo.is_running());
    assert!(!combo.queued_heavy);
    assert_eq!(cues.current_clip(), None);
}

// -----------------------------------------------------------------------------
// Lock, cooldown, and team tests
// -----------------------------------------------------------------------------

#[test]
fn test_lock_released_only_by_owner() {
    let mut state = CombatantState::default();
    assert!(state.acquire(LockHolder::Task));
    assert!(!state.acquire(LockHolder::Combo));

    state.release(LockHolder::Combo);
    assert!(state.attack_lock());
    state.release(LockHolder::Task);
    assert!(!state.attack_lock());
}

#[test]
fn test_cooldowns_floor_at_zero() {
    let mut cooldowns = Cooldowns {
        ranged: 1.0,
        spell: 0.2,
        slam: 0.0,
        summon: 3.0,
    };
    cooldowns.tick(0.5);
    assert_eq!(cooldowns.ranged, 0.5);
    assert_eq!(cooldowns.spell, 0.0);
    assert_eq!(cooldowns.slam, 0.0);
    assert_eq!(cooldowns.summon, 2.5);
}

#[test]
fn test_teams_are_hostile_across_sides_only() {
    assert!(Team::Player.is_hostile_to(Team::Enemy));
    assert!(!Team::Enemy.is_hostile_to(Team::Enemy));
}

// -----------------------------------------------------------------------------
// Steering tests
// -----------------------------------------------------------------------------

#[test]
fn test_homing_turn_is_bounded_per_tick() {
    let turned = steer(Vec2::X, Vec2::Y, 3.0, TICK);
    assert!((turned.length() - 1.0).abs() < 1e-5);
    // Blends a twentieth of the way, far short of a snap
    assert!(turned.angle_to(Vec2::X).abs() < 0.1);
    assert!(turned.y > 0.0);
}

#[test]
fn test_homing_blend_saturates() {
    let turned = steer(Vec2::X, Vec2::Y, 100.0, 1.0);
    assert!((turned - Vec2::Y).length() < 1e-5);
}

#[test]
fn test_facing_turn_rate_is_bounded() {
    let mut facing = Facing(Vec2::X);
    facing.turn_toward(Vec2::NEG_Y, 0.5);
    assert!((facing.forward().angle_to(Vec2::X).abs() - 0.5).abs() < 1e-4);

    facing.turn_toward(Vec2::ZERO, 0.5);
    assert!((facing.forward().length() - 1.0).abs() < 1e-5);
}
