//! Combat domain: the per-enemy decision loop.
//!
//! Each tick an enemy picks a target, then chases, attacks, blocks or hands
//! control to an attack task. Bosses additionally yield to their phase
//! scheduler, which owns the `PhaseTransition` and `SpecialPhase` states.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use rand::Rng;

use crate::combat::ai::boss::BossScheduler;
use crate::combat::ai::hazards::Hazard;
use crate::combat::ai::tasks::{TaskChoice, TaskSlot, build_task, commit_cooldowns};
use crate::combat::animation::{AnimationCues, cue};
use crate::combat::block::BlockController;
use crate::combat::components::{Combatant, CombatantState, Cooldowns, Dead, Stagger, Team};
use crate::combat::events::RespawnRequest;
use crate::combat::resources::SimRng;
use crate::content::{AiDef, AttackSet, BossPhase};
use crate::movement::{Facing, Locomotion, PatrolRoute};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrainState {
    #[default]
    Idle,
    Patrol,
    Chase,
    Attack,
    Block,
    /// An attack task is running
    Acting,
    PhaseTransition,
    SpecialPhase,
    Dead,
}

#[derive(Component, Debug, Clone)]
pub struct Brain {
    pub state: BrainState,
    pub target: Option<Entity>,
    pub detection_range: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub block_chance: f32,
    pub block_duration: (f32, f32),
    /// Seconds until the next melee decision
    pub attack_timer: f32,
    pub block_timer: f32,
    /// Radians per second
    pub turn_rate: f32,
    base: AiDef,
}

impl Brain {
    pub fn new(def: &AiDef, turn_rate_deg: f32) -> Self {
        Self {
            state: BrainState::Idle,
            target: None,
            detection_range: def.detection_range,
            attack_range: def.attack_range,
            attack_cooldown: def.attack_cooldown,
            block_chance: def.block_chance,
            block_duration: def.block_duration,
            attack_timer: 0.0,
            block_timer: 0.0,
            turn_rate: turn_rate_deg.to_radians(),
            base: def.clone(),
        }
    }

    /// Back to spawn tuning, undoing any phase scaling
    pub fn reset(&mut self) {
        let turn_rate = self.turn_rate;
        *self = Self::new(&self.base, 0.0);
        self.turn_rate = turn_rate;
    }

    fn block_seconds(&self, rng: &mut impl Rng) -> f32 {
        let (min, max) = self.block_duration;
        if max > min {
            rng.random_range(min..max)
        } else {
            min
        }
    }
}

/// Attack data the decision loop and tasks draw from
#[derive(Component, Debug, Clone)]
pub struct Arsenal {
    pub attacks: AttackSet,
}

/// Ranged options in preference order: spell, then projectile volley.
pub fn choose_ranged(
    distance: f32,
    phase: BossPhase,
    cooldowns: &Cooldowns,
    arsenal: &Arsenal,
) -> Option<TaskChoice> {
    let attacks = &arsenal.attacks;
    if let Some(spell) = &attacks.spell
        && phase >= spell.min_phase
        && cooldowns.spell <= 0.0
        && distance <= spell.range
    {
        return Some(TaskChoice::Spell);
    }
    if let Some(ranged) = &attacks.ranged
        && cooldowns.ranged <= 0.0
        && distance <= ranged.range
    {
        return Some(TaskChoice::Ranged);
    }
    None
}

/// Melee option: slam once unlocked and ready, else a combo on a successful
/// roll, else a basic strike.
pub fn choose_melee(
    phase: BossPhase,
    cooldowns: &Cooldowns,
    arsenal: &Arsenal,
    combo_roll: f32,
) -> TaskChoice {
    let attacks = &arsenal.attacks;
    if let Some(slam) = &attacks.slam
        && phase >= slam.min_phase
        && cooldowns.slam <= 0.0
    {
        return TaskChoice::Slam;
    }
    if let Some(combo) = &attacks.heavy_combo
        && phase >= combo.min_phase
        && combo_roll < combo.combo_chance
    {
        return TaskChoice::HeavyCombo;
    }
    TaskChoice::Basic
}

/// Commits cooldowns and launches; false if the arsenal lacks the attack or
/// the actor is busy.
fn launch(
    choice: TaskChoice,
    arsenal: &Arsenal,
    slot: &mut TaskSlot,
    state: &mut CombatantState,
) -> bool {
    if state.attack_lock() || slot.is_running() {
        return false;
    }
    let Some(task) = build_task(choice, arsenal) else {
        return false;
    };
    commit_cooldowns(choice, arsenal, &mut state.cooldowns);
    slot.launch(task, state)
}

fn halt(locomotion: &mut Locomotion, cues: &mut AnimationCues) {
    locomotion.stop();
    cues.set_bool(cue::IS_WALKING, false);
}

pub(crate) fn decide_enemies(
    time: Res<Time>,
    mut rng: ResMut<SimRng>,
    mut actors: Query<(
        Entity,
        &Transform,
        &Team,
        &mut Brain,
        &Arsenal,
        &mut TaskSlot,
        &mut CombatantState,
        &mut Facing,
        &mut Locomotion,
        Option<&mut BlockController>,
        &mut AnimationCues,
        Option<&Stagger>,
        Option<&BossScheduler>,
        Option<&mut PatrolRoute>,
        Has<Dead>,
    )>,
    targets: Query<(Entity, &Transform, &Team), (With<Combatant>, Without<Dead>, Without<Hazard>)>,
) {
    let dt = time.delta_secs();

    for (
        entity,
        transform,
        team,
        mut brain,
        arsenal,
        mut slot,
        mut state,
        mut facing,
        mut locomotion,
        mut block,
        mut cues,
        stagger,
        scheduler,
        patrol,
        dead,
    ) in &mut actors
    {
        if dead {
            if brain.state != BrainState::Dead {
                brain.state = BrainState::Dead;
                brain.target = None;
                locomotion.stop();
            }
            continue;
        }
        if brain.state == BrainState::Dead {
            brain.state = BrainState::Idle;
        }

        let position = transform.translation.truncate();
        let nearest = targets
            .iter()
            .filter(|(other, _, other_team)| *other != entity && team.is_hostile_to(**other_team))
            .map(|(other, t, _)| (other, t.translation.truncate().distance(position)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        brain.target = nearest
            .filter(|(_, distance)| *distance <= brain.detection_range)
            .map(|(other, _)| other);

        if stagger.is_some_and(|s| s.is_staggered()) {
            halt(&mut locomotion, &mut cues);
            // The stagger already knocked the guard down
            if brain.state == BrainState::Block {
                brain.block_timer = 0.0;
                brain.state = BrainState::Attack;
            }
            continue;
        }
        if matches!(
            brain.state,
            BrainState::PhaseTransition | BrainState::SpecialPhase
        ) {
            continue;
        }

        brain.attack_timer = (brain.attack_timer - dt).max(0.0);

        if slot.is_running() {
            brain.state = BrainState::Acting;
            halt(&mut locomotion, &mut cues);
            continue;
        }

        if brain.state == BrainState::Block {
            brain.block_timer -= dt;
            if brain.block_timer > 0.0 {
                continue;
            }
            if let Some(block) = block.as_mut() {
                block.stop(&mut cues);
            }
            brain.state = BrainState::Attack;
        }

        let Some((target, distance)) = nearest.filter(|(_, d)| *d <= brain.detection_range)
        else {
            match patrol {
                Some(mut route) => {
                    brain.state = BrainState::Patrol;
                    locomotion.direction = route.steer(position, dt);
                    if locomotion.direction != Vec2::ZERO {
                        facing.turn_toward(locomotion.direction, brain.turn_rate * dt);
                    }
                    cues.set_bool(cue::IS_WALKING, locomotion.direction != Vec2::ZERO);
                }
                None => {
                    brain.state = BrainState::Idle;
                    halt(&mut locomotion, &mut cues);
                }
            }
            continue;
        };

        let Ok((_, target_transform, _)) = targets.get(target) else {
            continue;
        };
        let to_target = (target_transform.translation.truncate() - position).normalize_or_zero();
        let phase = scheduler.map_or(BossPhase::Phase1, |s| s.phase);

        if distance > brain.attack_range {
            if let Some(choice) = choose_ranged(distance, phase, &state.cooldowns, arsenal) {
                facing.turn_toward(to_target, brain.turn_rate * dt);
                if launch(choice, arsenal, &mut slot, &mut state) {
                    debug!("{:?} launched {:?} at {:.1}m", entity, choice, distance);
                    brain.state = BrainState::Acting;
                    halt(&mut locomotion, &mut cues);
                    continue;
                }
            }
            brain.state = BrainState::Chase;
            locomotion.direction = to_target;
            facing.turn_toward(to_target, brain.turn_rate * dt);
            cues.set_bool(cue::IS_WALKING, true);
            continue;
        }

        brain.state = BrainState::Attack;
        halt(&mut locomotion, &mut cues);
        facing.turn_toward(to_target, brain.turn_rate * dt);
        if brain.attack_timer > 0.0 {
            continue;
        }

        if let Some(block) = block.as_mut()
            && rng.0.random::<f32>() < brain.block_chance
            && block.start(&state, &mut cues)
        {
            brain.block_timer = brain.block_seconds(&mut rng.0);
            brain.attack_timer = brain.attack_cooldown;
            brain.state = BrainState::Block;
            continue;
        }

        let roll = rng.0.random::<f32>();
        let choice = choose_melee(phase, &state.cooldowns, arsenal, roll);
        if launch(choice, arsenal, &mut slot, &mut state) {
            debug!("{:?} launched {:?}", entity, choice);
            brain.attack_timer = match (choice, &arsenal.attacks.heavy_combo) {
                (TaskChoice::HeavyCombo, Some(combo)) => {
                    brain.attack_cooldown * combo.cooldown_multiplier
                }
                _ => brain.attack_cooldown,
            };
            brain.state = BrainState::Acting;
        }
    }
}

/// Respawned enemies forget their target and any task left in the slot.
pub(crate) fn reset_brains_on_respawn(
    mut requests: MessageReader<RespawnRequest>,
    mut query: Query<(&mut Brain, &mut TaskSlot, &mut CombatantState)>,
) {
    for request in requests.read() {
        let Ok((mut brain, mut slot, mut state)) = query.get_mut(request.entity) else {
            continue;
        };
        brain.reset();
        slot.clear(&mut state);
    }
}
