//! Combat AI: tests for attack tasks, decision helpers, and boss scheduling.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::tasks::{
    BasicAttack, HeavyComboAttack, PillarPhase, RangedAttack, SlamAttack, SpellAttack,
    SummonMinionAttack,
};
use super::{
    Arsenal, AttackTask, BossMode, BossScheduler, HazardKind, HazardSet, TargetView, TaskChoice,
    TaskContext, TaskEffect, TaskPoll, TaskSlot, build_task, choose_melee, choose_ranged,
    commit_cooldowns, drop_progress, flash_period, smoothstep,
};
use crate::combat::animation::cue;
use crate::combat::combo::StrikeKind;
use crate::combat::components::{CombatantState, Cooldowns, LockHolder};
use crate::content::{
    AttackSet, BossDef, BossPhase, HeavyComboDef, PillarPhaseDef, RangedAttackDef, SlamAttackDef,
    SpecialKind, SpellAttackDef, SummonDef,
};

const TICK: f32 = 1.0 / 60.0;

fn entities(count: usize) -> Vec<Entity> {
    let mut world = World::new();
    (0..count).map(|_| world.spawn_empty().id()).collect()
}

fn pair() -> (Entity, Entity) {
    let ids = entities(2);
    (ids[0], ids[1])
}

fn full_arsenal() -> Arsenal {
    Arsenal {
        attacks: AttackSet {
            heavy_combo: Some(HeavyComboDef::default()),
            ranged: Some(RangedAttackDef::default()),
            spell: Some(SpellAttackDef::default()),
            slam: Some(SlamAttackDef::default()),
            summon: Some(SummonDef::default()),
            pillars: Some(PillarPhaseDef::default()),
            ..default()
        },
    }
}

fn target_at(entity: Entity, position: Vec2) -> Option<TargetView> {
    Some(TargetView {
        entity,
        position,
        grounded: true,
    })
}

/// Polls until the task stops running, collecting every effect it emitted.
fn run_to_end(task: &mut dyn AttackTask, ctx: &mut TaskContext, max_ticks: usize) -> Vec<TaskEffect> {
    let mut effects = Vec::new();
    for _ in 0..max_ticks {
        let poll = task.poll(ctx, TICK);
        effects.extend(ctx.take_effects());
        if poll != TaskPoll::Running {
            return effects;
        }
    }
    panic!("task '{}' still running after {} ticks", task.name(), max_ticks);
}

/// Polls a fixed number of ticks, asserting the task keeps running.
fn run_for(task: &mut dyn AttackTask, ctx: &mut TaskContext, ticks: usize) -> Vec<TaskEffect> {
    let mut effects = Vec::new();
    for _ in 0..ticks {
        assert_eq!(task.poll(ctx, TICK), TaskPoll::Running);
        effects.extend(ctx.take_effects());
    }
    effects
}

fn fires(effects: &[TaskEffect]) -> Vec<(Vec2, f32, Option<Entity>)> {
    effects
        .iter()
        .filter_map(|e| match e {
            TaskEffect::Fire {
                direction,
                damage,
                homing_target,
                ..
            } => Some((*direction, *damage, *homing_target)),
            _ => None,
        })
        .collect()
}

fn count(effects: &[TaskEffect], pred: impl Fn(&TaskEffect) -> bool) -> usize {
    effects.iter().filter(|e| pred(e)).count()
}

// -----------------------------------------------------------------------------
// Melee task tests
// -----------------------------------------------------------------------------

#[test]
fn test_basic_attack_rolls_heavy() {
    let actor = entities(1)[0];
    let mut cooldowns = Cooldowns::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    for (chance, expected) in [(1.0, StrikeKind::Heavy), (0.0, StrikeKind::Light)] {
        let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);
        let mut task = BasicAttack::new(chance);
        assert_eq!(task.poll(&mut ctx, TICK), TaskPoll::Running);
        assert_eq!(ctx.effects(), &[TaskEffect::Strike(expected)]);
    }
}

#[test]
fn test_basic_attack_ends_when_combo_idles() {
    let actor = entities(1)[0];
    let mut cooldowns = Cooldowns::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);
    let mut task = BasicAttack::new(0.0);

    task.poll(&mut ctx, TICK);
    ctx.combo_idle = false;
    assert_eq!(task.poll(&mut ctx, TICK), TaskPoll::Running);
    ctx.combo_idle = true;
    assert_eq!(task.poll(&mut ctx, TICK), TaskPoll::Done);
}

#[test]
fn test_heavy_combo_follows_up_after_delay() {
    let actor = entities(1)[0];
    let mut cooldowns = Cooldowns::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);
    ctx.combo_idle = false;
    let mut task = HeavyComboAttack::new(0.4);

    let opening = run_for(&mut task, &mut ctx, 1);
    assert_eq!(
        opening,
        vec![
            TaskEffect::Trigger(cue::MELEE_COMBO),
            TaskEffect::Strike(StrikeKind::Heavy)
        ]
    );

    // Nothing during the first ~0.3s of the follow-up delay
    let waiting = run_for(&mut task, &mut ctx, 18);
    assert!(waiting.is_empty());

    let follow_up = run_for(&mut task, &mut ctx, 12);
    assert_eq!(follow_up, vec![TaskEffect::Strike(StrikeKind::Light)]);

    ctx.combo_idle = true;
    assert_eq!(task.poll(&mut ctx, TICK), TaskPoll::Done);
}

#[test]
fn test_melee_cleanup_cancels_strikes() {
    let actor = entities(1)[0];
    let mut cooldowns = Cooldowns::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);
    let mut task = HeavyComboAttack::new(0.4);

    task.poll(&mut ctx, TICK);
    ctx.take_effects();
    task.cleanup(&mut ctx);
    assert_eq!(ctx.effects(), &[TaskEffect::CancelStrikes]);
}

// -----------------------------------------------------------------------------
// Ranged task tests
// -----------------------------------------------------------------------------

#[test]
fn test_ranged_single_shot_before_fan_phase() {
    let (actor, target) = pair();
    let mut cooldowns = Cooldowns::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);
    ctx.target = target_at(target, Vec2::new(0.0, 5.0));

    let mut task = RangedAttack::new(RangedAttackDef::default());
    let effects = run_to_end(&mut task, &mut ctx, 120);

    assert_eq!(effects[0], TaskEffect::SetBool(cue::IS_WALKING, false));
    assert_eq!(effects[1], TaskEffect::Trigger(cue::RANGED_SHOT));
    let shots = fires(&effects);
    assert_eq!(shots.len(), 1);
    let (direction, damage, homing) = shots[0];
    assert!((direction - Vec2::Y).length() < 1e-5);
    assert_eq!(damage, 15.0);
    assert_eq!(homing, None);
}

#[test]
fn test_ranged_fan_from_phase_two() {
    let (actor, target) = pair();
    let mut cooldowns = Cooldowns::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);
    ctx.target = target_at(target, Vec2::new(5.0, 0.0));
    ctx.phase = BossPhase::Phase2;

    let mut task = RangedAttack::new(RangedAttackDef::default());
    let effects = run_to_end(&mut task, &mut ctx, 120);

    let shots = fires(&effects);
    assert_eq!(shots.len(), 3);
    let angles: Vec<f32> = shots
        .iter()
        .map(|(dir, _, _)| Vec2::X.angle_to(*dir).to_degrees())
        .collect();
    assert!(angles[0].abs() < 1e-3);
    assert!((angles[1] - 15.0).abs() < 1e-3);
    assert!((angles[2] + 15.0).abs() < 1e-3);
    assert!(shots.iter().all(|(_, _, homing)| *homing == Some(target)));
}

#[test]
fn test_ranged_without_projectile_finishes_immediately() {
    let actor = entities(1)[0];
    let mut cooldowns = Cooldowns::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);

    let mut task = RangedAttack::new(RangedAttackDef {
        projectile: None,
        ..default()
    });
    assert_eq!(task.poll(&mut ctx, TICK), TaskPoll::Done);
    assert!(ctx.effects().is_empty());
}

// -----------------------------------------------------------------------------
// Spell and slam task tests
// -----------------------------------------------------------------------------

#[test]
fn test_spell_lands_on_snapshot_position() {
    let (actor, target) = pair();
    let mut cooldowns = Cooldowns::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);
    ctx.target = target_at(target, Vec2::new(4.0, 0.0));

    let mut task = SpellAttack::new(SpellAttackDef::default(), 3.5);
    let opening = run_for(&mut task, &mut ctx, 1);
    assert!(opening.contains(&TaskEffect::Trigger(cue::SPELL_CAST)));
    assert!(opening.contains(&TaskEffect::DropMarker {
        from: Vec2::new(4.0, 8.0),
        to: Vec2::new(4.0, 4.0),
        duration: 1.2,
    }));

    // The target runs away; the spell does not follow
    ctx.target = target_at(target, Vec2::new(-6.0, 0.0));
    let rest = run_to_end(&mut task, &mut ctx, 120);
    let impact = rest.iter().find_map(|e| match e {
        TaskEffect::AreaDamage {
            center,
            grounded_only,
            ..
        } => Some((*center, *grounded_only)),
        _ => None,
    });
    assert_eq!(impact, Some((Vec2::new(4.0, 0.0), false)));
    assert!(rest.contains(&TaskEffect::ClearTelegraphs));
}

#[test]
fn test_spell_impact_suppresses_ranged_cooldown() {
    let (actor, target) = pair();
    let mut cooldowns = Cooldowns::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);
    ctx.target = target_at(target, Vec2::new(4.0, 0.0));

    let mut task = SpellAttack::new(SpellAttackDef::default(), 3.5);
    run_to_end(&mut task, &mut ctx, 120);
    assert!((ctx.cooldowns.ranged - 1.75).abs() < 1e-5);
}

#[test]
fn test_spell_without_target_does_nothing() {
    let actor = entities(1)[0];
    let mut cooldowns = Cooldowns::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);

    let mut task = SpellAttack::new(SpellAttackDef::default(), 3.5);
    assert_eq!(task.poll(&mut ctx, TICK), TaskPoll::Done);
    assert!(ctx.effects().is_empty());
}

#[test]
fn test_slam_is_invincible_until_recovery_ends() {
    let actor = entities(1)[0];
    let mut cooldowns = Cooldowns::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);
    ctx.position = Vec2::new(1.0, 1.0);

    let mut task = SlamAttack::new(SlamAttackDef::default());
    let effects = run_to_end(&mut task, &mut ctx, 240);

    assert_eq!(effects.first(), Some(&TaskEffect::SetInvincible(true)));
    assert_eq!(effects.last(), Some(&TaskEffect::SetInvincible(false)));
    assert!(effects.contains(&TaskEffect::AreaDamage {
        center: Vec2::new(1.0, 1.0),
        radius: 3.0,
        damage: 40.0,
        grounded_only: true,
    }));
    assert!(effects.iter().any(|e| matches!(
        e,
        TaskEffect::Telegraph {
            flash: Some((start, end)),
            ..
        } if *start == 0.4 && *end == 0.05
    )));
}

#[test]
fn test_interrupted_slam_drops_invincibility() {
    let actor = entities(1)[0];
    let mut cooldowns = Cooldowns::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);

    let mut task = SlamAttack::new(SlamAttackDef::default());
    run_for(&mut task, &mut ctx, 10);
    task.cleanup(&mut ctx);
    let effects = ctx.take_effects();
    assert!(effects.contains(&TaskEffect::ClearTelegraphs));
    assert!(effects.contains(&TaskEffect::SetInvincible(false)));
}

// -----------------------------------------------------------------------------
// Special phase task tests
// -----------------------------------------------------------------------------

fn pillar_phase() -> PillarPhase {
    PillarPhase::new(
        PillarPhaseDef::default(),
        Some(RangedAttackDef::default()),
        Some(SpellAttackDef::default()),
    )
}

/// Drives a special phase through its cast, returning everything emitted.
fn cast(task: &mut dyn AttackTask, ctx: &mut TaskContext) -> Vec<TaskEffect> {
    let mut effects = Vec::new();
    for _ in 0..120 {
        assert_eq!(task.poll(ctx, TICK), TaskPoll::Running);
        let tick = ctx.take_effects();
        let spawned = tick
            .iter()
            .any(|e| matches!(e, TaskEffect::SpawnHazards { .. }));
        effects.extend(tick);
        if spawned {
            return effects;
        }
    }
    panic!("no hazards requested");
}

#[test]
fn test_pillar_phase_roots_and_raises_pillars() {
    let actor = entities(1)[0];
    let mut cooldowns = Cooldowns::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);
    let mut task = pillar_phase();

    let effects = cast(&mut task, &mut ctx);
    assert!(effects.contains(&TaskEffect::SetInvincible(true)));
    assert!(effects.contains(&TaskEffect::SetRooted(true)));
    assert!(effects.contains(&TaskEffect::SpawnHazards {
        kind: HazardKind::Pillar,
        archetypes: vec!["pillar".to_string()],
        count: 4,
        radius: 4.0,
    }));
}

#[test]
fn test_pillar_phase_ends_early_when_nothing_spawned() {
    let actor = entities(1)[0];
    let mut cooldowns = Cooldowns::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);
    let mut task = pillar_phase();

    cast(&mut task, &mut ctx);
    ctx.live_hazards = 0;
    assert_eq!(task.poll(&mut ctx, TICK), TaskPoll::Done);
    let effects = ctx.take_effects();
    assert!(effects.contains(&TaskEffect::SetInvincible(false)));
    assert!(effects.contains(&TaskEffect::SetRooted(false)));
}

#[test]
fn test_pillar_phase_attacks_while_pillars_stand() {
    let (actor, target) = pair();
    let mut cooldowns = Cooldowns::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);
    ctx.target = target_at(target, Vec2::new(6.0, 0.0));
    let mut task = pillar_phase();

    cast(&mut task, &mut ctx);
    ctx.live_hazards = 4;
    let effects = run_for(&mut task, &mut ctx, 180);

    // One homing fan, then a spell; both now cooling down
    let shots = fires(&effects);
    assert_eq!(shots.len(), 3);
    assert!(shots.iter().all(|(_, _, homing)| *homing == Some(target)));
    assert_eq!(
        count(&effects, |e| matches!(e, TaskEffect::AreaDamage { .. })),
        1
    );
    // Volley cooldown, then raised by the spell's suppression on impact
    assert_eq!(ctx.cooldowns.ranged, 1.75);
    assert_eq!(ctx.cooldowns.spell, 6.0);

    // Last pillar falls
    ctx.live_hazards = 0;
    assert_eq!(task.poll(&mut ctx, TICK), TaskPoll::Done);
    assert!(ctx.take_effects().contains(&TaskEffect::SetRooted(false)));
}

#[test]
fn test_pillar_phase_cleanup_clears_telegraphs_mid_spell() {
    let (actor, target) = pair();
    let mut cooldowns = Cooldowns {
        ranged: 10.0,
        ..default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);
    ctx.target = target_at(target, Vec2::new(6.0, 0.0));
    let mut task = pillar_phase();

    cast(&mut task, &mut ctx);
    ctx.live_hazards = 2;
    let effects = run_for(&mut task, &mut ctx, 5);
    assert!(effects.iter().any(|e| matches!(e, TaskEffect::Telegraph { .. })));

    task.cleanup(&mut ctx);
    let effects = ctx.take_effects();
    assert!(effects.contains(&TaskEffect::ClearTelegraphs));
    assert!(effects.contains(&TaskEffect::SetInvincible(false)));
}

#[test]
fn test_summon_waits_for_minions_and_fires_fans() {
    let (actor, target) = pair();
    let mut cooldowns = Cooldowns::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = TaskContext::new(actor, &mut cooldowns, &mut rng);
    ctx.target = target_at(target, Vec2::new(0.0, 6.0));
    let ranged = RangedAttackDef {
        fan_damage_scale: 0.5,
        ..default()
    };
    let mut task = SummonMinionAttack::new(SummonDef::default(), Some(ranged));

    let effects = cast(&mut task, &mut ctx);
    assert!(effects.contains(&TaskEffect::SpawnHazards {
        kind: HazardKind::Minion,
        archetypes: vec!["grunt".to_string()],
        count: 3,
        radius: 3.0,
    }));

    // The first fan leaves on the tick the minions are counted
    ctx.live_hazards = 3;
    let effects = run_for(&mut task, &mut ctx, 1);
    let shots = fires(&effects);
    assert_eq!(shots.len(), 3);
    assert!(shots.iter().all(|(_, damage, homing)| *damage == 15.0 && *homing == Some(target)));
    assert!(shots[0].0.abs_diff_eq(Vec2::Y, 1e-5), "aimed at the target, not along facing");
    assert!(shots[1].0.abs_diff_eq(Vec2::from_angle(15f32.to_radians()).rotate(Vec2::Y), 1e-5));
    assert_eq!(ctx.cooldowns.summon, 2.0);

    // Nothing more until the interval elapses
    let effects = run_for(&mut task, &mut ctx, 30);
    assert!(fires(&effects).is_empty());
    assert!(effects.iter().any(|e| matches!(e, TaskEffect::TurnToward { .. })));

    ctx.cooldowns.summon = 0.0;
    let effects = run_for(&mut task, &mut ctx, 1);
    assert_eq!(fires(&effects).len(), 3);

    ctx.live_hazards = 0;
    assert_eq!(task.poll(&mut ctx, TICK), TaskPoll::Done);
}

// -----------------------------------------------------------------------------
// Task slot and cooldown commit tests
// -----------------------------------------------------------------------------

#[test]
fn test_task_slot_takes_task_lock() {
    let mut slot = TaskSlot::default();
    let mut state = CombatantState::default();

    assert!(slot.launch(Box::new(BasicAttack::new(0.0)), &mut state));
    assert_eq!(state.lock, Some(LockHolder::Task));
    assert_eq!(slot.task_name(), Some("basic"));
    assert!(!slot.launch(Box::new(BasicAttack::new(0.0)), &mut state));

    slot.clear(&mut state);
    assert!(!slot.is_running());
    assert!(!state.attack_lock());
}

#[test]
fn test_task_slot_refused_during_combo() {
    let mut slot = TaskSlot::default();
    let mut state = CombatantState::default();
    state.acquire(LockHolder::Combo);

    assert!(!slot.launch(Box::new(BasicAttack::new(0.0)), &mut state));
    assert!(!slot.is_running());
}

#[test]
fn test_commit_cooldowns_per_choice() {
    let arsenal = full_arsenal();

    let mut cooldowns = Cooldowns::default();
    commit_cooldowns(TaskChoice::Ranged, &arsenal, &mut cooldowns);
    assert_eq!(cooldowns.ranged, 3.5);

    let mut cooldowns = Cooldowns::default();
    commit_cooldowns(TaskChoice::Spell, &arsenal, &mut cooldowns);
    assert_eq!(cooldowns.spell, 6.0);
    assert_eq!(cooldowns.ranged, 1.75);

    let mut cooldowns = Cooldowns {
        ranged: 3.0,
        ..default()
    };
    commit_cooldowns(TaskChoice::Spell, &arsenal, &mut cooldowns);
    assert_eq!(cooldowns.ranged, 3.0);

    let mut cooldowns = Cooldowns::default();
    commit_cooldowns(TaskChoice::Slam, &arsenal, &mut cooldowns);
    assert_eq!(cooldowns.slam, 8.0);

    // The summon volley is ready the moment the minions are up
    let mut cooldowns = Cooldowns {
        summon: 5.0,
        ..default()
    };
    commit_cooldowns(
        TaskChoice::Special(SpecialKind::SummonMinions),
        &arsenal,
        &mut cooldowns,
    );
    assert_eq!(cooldowns.summon, 0.0);

    let mut cooldowns = Cooldowns::default();
    commit_cooldowns(TaskChoice::Basic, &arsenal, &mut cooldowns);
    assert_eq!(cooldowns, Cooldowns::default());
}

#[test]
fn test_build_task_requires_arsenal_entry() {
    let bare = Arsenal {
        attacks: AttackSet::default(),
    };
    assert!(build_task(TaskChoice::Basic, &bare).is_some());
    assert!(build_task(TaskChoice::Ranged, &bare).is_none());
    assert!(build_task(TaskChoice::Special(SpecialKind::PillarBarrage), &bare).is_none());

    let task = build_task(TaskChoice::Special(SpecialKind::SummonMinions), &full_arsenal());
    assert_eq!(task.map(|t| t.name()), Some("summon_minions"));
}

// -----------------------------------------------------------------------------
// Decision helper tests
// -----------------------------------------------------------------------------

#[test]
fn test_choose_ranged_prefers_unlocked_spell() {
    let arsenal = full_arsenal();
    let ready = Cooldowns::default();

    assert_eq!(
        choose_ranged(5.0, BossPhase::Phase1, &ready, &arsenal),
        Some(TaskChoice::Ranged)
    );
    assert_eq!(
        choose_ranged(5.0, BossPhase::Phase2, &ready, &arsenal),
        Some(TaskChoice::Spell)
    );
    assert_eq!(choose_ranged(12.0, BossPhase::Phase2, &ready, &arsenal), None);

    let cooling = Cooldowns {
        ranged: 1.0,
        spell: 1.0,
        ..default()
    };
    assert_eq!(choose_ranged(5.0, BossPhase::Phase2, &cooling, &arsenal), None);
}

#[test]
fn test_choose_melee_by_phase_and_roll() {
    let arsenal = full_arsenal();
    let ready = Cooldowns::default();
    let slam_cooling = Cooldowns {
        slam: 2.0,
        ..default()
    };

    assert_eq!(
        choose_melee(BossPhase::Phase3, &ready, &arsenal, 0.9),
        TaskChoice::Slam
    );
    assert_eq!(
        choose_melee(BossPhase::Phase3, &slam_cooling, &arsenal, 0.1),
        TaskChoice::HeavyCombo
    );
    assert_eq!(
        choose_melee(BossPhase::Phase3, &slam_cooling, &arsenal, 0.9),
        TaskChoice::Basic
    );
    assert_eq!(
        choose_melee(BossPhase::Phase1, &ready, &arsenal, 0.1),
        TaskChoice::Basic
    );
}

// -----------------------------------------------------------------------------
// BossScheduler tests
// -----------------------------------------------------------------------------

fn finish_transition(scheduler: &mut BossScheduler) -> BossPhase {
    assert!(scheduler.begin_transition().is_some());
    let def = scheduler
        .tick_transition(10.0)
        .expect("transition completes");
    def.phase
}

#[test]
fn test_phase_threshold_fires_once() {
    let mut scheduler = BossScheduler::new(&BossDef::default());

    assert_eq!(scheduler.check_thresholds(0.6), 0);
    assert_eq!(scheduler.check_thresholds(0.5), 1);
    assert_eq!(finish_transition(&mut scheduler), BossPhase::Phase2);
    assert_eq!(scheduler.phase, BossPhase::Phase2);

    // Healing back over the threshold and dropping again does not re-fire
    assert_eq!(scheduler.check_thresholds(0.9), 0);
    assert_eq!(scheduler.check_thresholds(0.45), 0);
    assert!(!scheduler.has_pending());
}

#[test]
fn test_phases_apply_in_order_after_a_big_hit() {
    let mut scheduler = BossScheduler::new(&BossDef::default());

    assert_eq!(scheduler.check_thresholds(0.1), 2);
    assert_eq!(finish_transition(&mut scheduler), BossPhase::Phase2);
    assert_eq!(scheduler.phase, BossPhase::Phase2);
    assert_eq!(finish_transition(&mut scheduler), BossPhase::Phase3);
    assert_eq!(scheduler.phase, BossPhase::Phase3);
}

#[test]
fn test_transition_waits_out_its_duration() {
    let mut scheduler = BossScheduler::new(&BossDef::default());
    scheduler.check_thresholds(0.5);
    assert_eq!(scheduler.begin_transition(), Some(BossPhase::Phase2));
    // Only one transition at a time
    assert_eq!(scheduler.begin_transition(), None);

    assert!(scheduler.tick_transition(2.0).is_none());
    assert_eq!(scheduler.phase, BossPhase::Phase1);
    assert!(scheduler.tick_transition(1.0).is_some());
    assert_eq!(scheduler.mode, BossMode::Normal);
}

#[test]
fn test_special_timer_starts_in_phase_two() {
    let mut scheduler = BossScheduler::new(&BossDef::default());

    assert!(!scheduler.tick_special(100.0));
    assert_eq!(scheduler.special_timer, 30.0);

    scheduler.check_thresholds(0.5);
    finish_transition(&mut scheduler);
    assert!(!scheduler.tick_special(29.0));
    assert!(scheduler.tick_special(1.0));
}

#[test]
fn test_special_rotation_alternates() {
    let mut scheduler = BossScheduler::new(&BossDef::default());
    scheduler.check_thresholds(0.5);
    finish_transition(&mut scheduler);

    let mut seen = Vec::new();
    for _ in 0..3 {
        let kind = scheduler.next_special_kind().expect("rotation");
        scheduler.begin_special(kind);
        assert_eq!(scheduler.mode, BossMode::Special { kind });
        // Timer is paused while the special runs
        assert!(!scheduler.tick_special(100.0));
        assert_eq!(scheduler.finish_special(), Some(kind));
        seen.push(kind);
    }
    assert_eq!(
        seen,
        vec![
            SpecialKind::PillarBarrage,
            SpecialKind::SummonMinions,
            SpecialKind::PillarBarrage
        ]
    );
    assert_eq!(scheduler.special_timer, 30.0);
}

#[test]
fn test_scheduler_reset_returns_to_phase_one() {
    let mut scheduler = BossScheduler::new(&BossDef::default());
    scheduler.check_thresholds(0.1);
    finish_transition(&mut scheduler);

    scheduler.reset();
    assert_eq!(scheduler.phase, BossPhase::Phase1);
    assert!(!scheduler.has_pending());
    assert_eq!(scheduler.check_thresholds(0.5), 1);
}

// -----------------------------------------------------------------------------
// Hazard and telegraph tests
// -----------------------------------------------------------------------------

#[test]
fn test_hazard_removal_is_idempotent() {
    let hazards = entities(2);
    let mut set = HazardSet::default();
    set.insert(hazards[0]);
    set.insert(hazards[1]);

    assert!(set.remove(hazards[0]));
    assert!(!set.remove(hazards[0]));
    assert_eq!(set.len(), 1);
    assert!(set.remove(hazards[1]));
    assert!(set.is_empty());
}

#[test]
fn test_drop_marker_accelerates() {
    assert_eq!(drop_progress(0.0, 1.2), 0.0);
    assert!((drop_progress(0.6, 1.2) - 0.25).abs() < 1e-6);
    assert_eq!(drop_progress(2.0, 1.2), 1.0);
    assert_eq!(drop_progress(0.5, 0.0), 1.0);
}

#[test]
fn test_flash_period_shrinks_over_charge() {
    assert_eq!(flash_period(0.0, 0.4, 0.05), 0.4);
    assert!((flash_period(1.0, 0.4, 0.05) - 0.05).abs() < 1e-6);
    assert!(flash_period(0.5, 0.4, 0.05) < 0.4);
}

#[test]
fn test_smoothstep_endpoints() {
    assert_eq!(smoothstep(0.0), 0.0);
    assert_eq!(smoothstep(1.0), 1.0);
    assert_eq!(smoothstep(0.5), 0.5);
}

// -----------------------------------------------------------------------------
// Patrol tests
// -----------------------------------------------------------------------------

#[test]
fn test_patrol_ping_pong_reverses_at_ends() {
    use crate::movement::{PatrolMode, PatrolRoute};

    let mut route = PatrolRoute::new(
        vec![Vec2::ZERO, Vec2::new(4.0, 0.0), Vec2::new(8.0, 0.0)],
        PatrolMode::PingPong,
    );
    let visited: Vec<usize> = (0..5)
        .map(|_| {
            route.advance();
            route.index
        })
        .collect();
    assert_eq!(visited, vec![1, 2, 1, 0, 1]);
}

#[test]
fn test_patrol_waits_at_waypoint() {
    use crate::movement::{PatrolMode, PatrolRoute};

    let mut route = PatrolRoute::new(vec![Vec2::ZERO, Vec2::new(4.0, 0.0)], PatrolMode::Loop);
    route.index = 1;

    assert_eq!(route.steer(Vec2::ZERO, TICK), Vec2::X);
    // Arrival starts the wait and moves on to the next waypoint
    assert_eq!(route.steer(Vec2::new(3.8, 0.0), TICK), Vec2::ZERO);
    assert_eq!(route.index, 0);
    assert_eq!(route.steer(Vec2::new(3.8, 0.0), TICK), Vec2::ZERO);
}
