//! Combat domain: boss phase transitions and special phases.
//!
//! Health thresholds queue phase transitions, each firing at most once and
//! only ever moving forward. From Phase2 on a fixed interval timer forces a
//! special phase from the boss's rotation. Both wait for the attack lock to be
//! free so they never cut into a running attack.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use std::collections::VecDeque;

use crate::combat::ai::enemy::{Arsenal, Brain, BrainState};
use crate::combat::ai::hazards::HazardSet;
use crate::combat::ai::tasks::{TaskChoice, TaskSlot, build_task, commit_cooldowns};
use crate::combat::animation::{AnimationCues, cue};
use crate::combat::block::BlockController;
use crate::combat::components::{CombatantState, Dead, Health, Invulnerable, Stagger};
use crate::combat::events::{
    BossPhaseChanged, RespawnRequest, SpecialPhaseEnded, SpecialPhaseStarted,
};
use crate::content::{BossDef, BossPhase, PhaseDef, SpecialKind};
use crate::movement::Locomotion;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BossMode {
    Normal,
    Transition { index: usize, remaining: f32 },
    Special { kind: SpecialKind },
}

#[derive(Component, Debug, Clone)]
pub struct BossScheduler {
    pub phase: BossPhase,
    pub mode: BossMode,
    pub special_timer: f32,
    phases: Vec<PhaseDef>,
    /// One flag per phase entry; set when its threshold is crossed
    done: Vec<bool>,
    pending: VecDeque<usize>,
    special_interval: f32,
    rotation: Vec<SpecialKind>,
    next_special: usize,
    transition_duration: f32,
    speed_bonus_applied: f32,
}

impl BossScheduler {
    pub fn new(def: &BossDef) -> Self {
        Self {
            phase: BossPhase::Phase1,
            mode: BossMode::Normal,
            special_timer: def.special_interval,
            phases: def.phases.clone(),
            done: vec![false; def.phases.len()],
            pending: VecDeque::new(),
            special_interval: def.special_interval,
            rotation: def.special_rotation.clone(),
            next_special: 0,
            transition_duration: def.transition_duration,
            speed_bonus_applied: 0.0,
        }
    }

    /// Queues every phase whose threshold `health_fraction` has reached.
    /// Returns how many were newly queued.
    pub fn check_thresholds(&mut self, health_fraction: f32) -> usize {
        let mut queued = 0;
        for (index, phase) in self.phases.iter().enumerate() {
            if self.done[index] || health_fraction > phase.threshold {
                continue;
            }
            self.done[index] = true;
            self.pending.push_back(index);
            queued += 1;
        }
        queued
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Starts the oldest queued transition, if idle.
    pub fn begin_transition(&mut self) -> Option<BossPhase> {
        if self.mode != BossMode::Normal {
            return None;
        }
        let index = self.pending.pop_front()?;
        self.mode = BossMode::Transition {
            index,
            remaining: self.transition_duration,
        };
        Some(self.phases[index].phase)
    }

    /// Returns the phase entry once the running transition completes.
    pub fn tick_transition(&mut self, dt: f32) -> Option<PhaseDef> {
        let BossMode::Transition { index, remaining } = &mut self.mode else {
            return None;
        };
        *remaining -= dt;
        if *remaining > 0.0 {
            return None;
        }
        let def = self.phases[*index].clone();
        self.mode = BossMode::Normal;
        self.phase = self.phase.max(def.phase);
        Some(def)
    }

    /// Ticks the special-phase interval. True once a special phase is due.
    pub fn tick_special(&mut self, dt: f32) -> bool {
        if self.mode != BossMode::Normal || self.phase < BossPhase::Phase2 || self.rotation.is_empty()
        {
            return false;
        }
        self.special_timer = (self.special_timer - dt).max(0.0);
        self.special_timer <= 0.0
    }

    pub fn next_special_kind(&self) -> Option<SpecialKind> {
        if self.rotation.is_empty() {
            return None;
        }
        Some(self.rotation[self.next_special % self.rotation.len()])
    }

    /// Enters the special phase and advances the rotation.
    pub fn begin_special(&mut self, kind: SpecialKind) {
        self.mode = BossMode::Special { kind };
        self.next_special += 1;
        self.special_timer = self.special_interval;
    }

    /// Skips a special the boss cannot perform, restarting the interval.
    pub fn skip_special(&mut self) {
        self.next_special += 1;
        self.special_timer = self.special_interval;
    }

    pub fn finish_special(&mut self) -> Option<SpecialKind> {
        let BossMode::Special { kind } = self.mode else {
            return None;
        };
        self.mode = BossMode::Normal;
        Some(kind)
    }

    pub fn reset(&mut self) {
        self.phase = BossPhase::Phase1;
        self.mode = BossMode::Normal;
        self.special_timer = self.special_interval;
        self.done.iter_mut().for_each(|d| *d = false);
        self.pending.clear();
        self.next_special = 0;
    }
}

pub(crate) fn update_boss_phases(
    time: Res<Time>,
    mut query: Query<
        (
            Entity,
            &Health,
            &mut BossScheduler,
            &mut Brain,
            &Arsenal,
            &mut TaskSlot,
            &mut CombatantState,
            &mut Invulnerable,
            &mut Locomotion,
            Option<&mut BlockController>,
            &mut AnimationCues,
            Option<&Stagger>,
        ),
        Without<Dead>,
    >,
    mut phase_changed: MessageWriter<BossPhaseChanged>,
    mut special_started: MessageWriter<SpecialPhaseStarted>,
) {
    let dt = time.delta_secs();

    for (
        boss,
        health,
        mut scheduler,
        mut brain,
        arsenal,
        mut slot,
        mut state,
        mut invulnerable,
        mut locomotion,
        mut block,
        mut cues,
        stagger,
    ) in &mut query
    {
        let queued = scheduler.check_thresholds(health.percent());
        if queued > 0 {
            debug!("{:?} queued {} phase transition(s)", boss, queued);
        }

        match scheduler.mode {
            BossMode::Transition { .. } => {
                let Some(def) = scheduler.tick_transition(dt) else {
                    continue;
                };
                invulnerable.held = false;
                brain.attack_cooldown *= def.cooldown_multiplier;
                if let Some(chance) = def.block_chance {
                    brain.block_chance = chance;
                }
                locomotion.speed += def.speed_bonus;
                scheduler.speed_bonus_applied += def.speed_bonus;
                brain.state = BrainState::Chase;
                info!(
                    "{:?} entered {:?} (attack cooldown {:.2}s)",
                    boss, scheduler.phase, brain.attack_cooldown
                );
                phase_changed.write(BossPhaseChanged {
                    boss,
                    phase: scheduler.phase,
                });
            }
            // Closed by `finish_special_phases` once the task completes
            BossMode::Special { .. } => {}
            BossMode::Normal => {
                let busy = state.attack_lock() || slot.is_running();
                let staggered = stagger.is_some_and(|s| s.is_staggered());

                if !busy && scheduler.has_pending() {
                    if let Some(phase) = scheduler.begin_transition() {
                        if let Some(block) = block.as_mut() {
                            block.stop(&mut cues);
                        }
                        locomotion.stop();
                        invulnerable.held = true;
                        cues.set_trigger(cue::PHASE_TRANSITION);
                        brain.state = BrainState::PhaseTransition;
                        info!("{:?} transitioning to {:?}", boss, phase);
                    }
                    continue;
                }

                if !scheduler.tick_special(dt) || busy || staggered {
                    continue;
                }
                let Some(kind) = scheduler.next_special_kind() else {
                    continue;
                };
                let choice = TaskChoice::Special(kind);
                let Some(task) = build_task(choice, arsenal) else {
                    warn!("{:?} cannot perform special {:?}, skipping", boss, kind);
                    scheduler.skip_special();
                    continue;
                };
                if let Some(block) = block.as_mut() {
                    block.stop(&mut cues);
                }
                commit_cooldowns(choice, arsenal, &mut state.cooldowns);
                if slot.launch(task, &mut state) {
                    scheduler.begin_special(kind);
                    locomotion.stop();
                    brain.state = BrainState::SpecialPhase;
                    info!("{:?} started special phase {:?}", boss, kind);
                    special_started.write(SpecialPhaseStarted { boss, kind });
                }
            }
        }
    }
}

/// Returns bosses to normal scheduling on the same tick their special-phase
/// task finishes.
pub(crate) fn finish_special_phases(
    mut query: Query<(Entity, &mut BossScheduler, &mut Brain, &TaskSlot), Without<Dead>>,
    mut special_ended: MessageWriter<SpecialPhaseEnded>,
) {
    for (boss, mut scheduler, mut brain, slot) in &mut query {
        if slot.is_running() {
            continue;
        }
        let Some(kind) = scheduler.finish_special() else {
            continue;
        };
        info!("{:?} finished special phase {:?}", boss, kind);
        brain.state = BrainState::Chase;
        special_ended.write(SpecialPhaseEnded { boss, kind });
    }
}

/// Respawned bosses start over from Phase1 at their spawn speed, with no
/// hazards from a previous life holding a special phase open.
pub(crate) fn reset_bosses_on_respawn(
    mut requests: MessageReader<RespawnRequest>,
    mut query: Query<(&mut BossScheduler, &mut Locomotion, Option<&mut HazardSet>)>,
) {
    for request in requests.read() {
        let Ok((mut scheduler, mut locomotion, hazards)) = query.get_mut(request.entity) else {
            continue;
        };
        locomotion.speed -= scheduler.speed_bonus_applied;
        scheduler.speed_bonus_applied = 0.0;
        scheduler.reset();
        if let Some(mut hazards) = hazards {
            hazards.clear();
        }
    }
}
