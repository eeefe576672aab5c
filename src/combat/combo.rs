//! Combat domain: queued light/heavy requests and combo step progression.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::combat::animation::{AnimationCues, cue};
use crate::combat::block::BlockController;
use crate::combat::components::{CombatantState, Dead, HitVolumes, LockHolder, Stagger};
use crate::combat::events::{CombatIntent, Intent, ProjectileRequest};
use crate::combat::resources::CombatTuning;
use crate::content::{ProjectileDef, RangedWeaponDef};
use crate::movement::Facing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeKind {
    Light,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A new combo sequence began this call
    Started,
    /// Stored for the running sequence to consume
    Queued,
    /// Dropped: lock held elsewhere or nothing to play
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboTick {
    Idle,
    Waiting,
    /// The next step started
    Advanced,
    /// The sequence ended; `task_owned` tells whether a task holds the lock
    Finished { task_owned: bool },
}

/// Fire-rate gate for ranged weapons
#[derive(Debug, Clone)]
pub struct RangedFire {
    pub fire_cooldown: f32,
    pub remaining: f32,
    pub damage: f32,
    pub projectile: ProjectileDef,
}

impl RangedFire {
    pub fn new(def: &RangedWeaponDef) -> Self {
        Self {
            fire_cooldown: def.fire_cooldown,
            remaining: 0.0,
            damage: def.damage,
            projectile: def.projectile.clone(),
        }
    }

    /// Commits the cooldown and returns true if a shot may be released.
    pub fn try_fire(&mut self) -> bool {
        if self.remaining > 0.0 {
            return false;
        }
        self.remaining = self.fire_cooldown;
        true
    }
}

#[derive(Debug, Clone)]
struct ActiveStep {
    clip: String,
    heavy: bool,
    frames: u32,
}

#[derive(Component, Debug, Clone)]
pub struct ComboController {
    /// 1..N for light steps, 0 when idle or after a heavy
    pub step: u32,
    pub queued_light: bool,
    pub queued_heavy: bool,
    light_clips: Vec<String>,
    heavy_clip: String,
    volume_count: usize,
    active: Option<ActiveStep>,
    task_owned: bool,
    pub ranged: Option<RangedFire>,
}

impl ComboController {
    pub fn new(light_clips: Vec<String>, heavy_clip: impl Into<String>, volume_count: usize) -> Self {
        Self {
            step: 0,
            queued_light: false,
            queued_heavy: false,
            light_clips,
            heavy_clip: heavy_clip.into(),
            volume_count,
            active: None,
            task_owned: false,
            ranged: None,
        }
    }

    pub fn with_ranged(mut self, def: &RangedWeaponDef) -> Self {
        self.ranged = Some(RangedFire::new(def));
        self
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// The step currently playing is a heavy strike
    pub fn is_heavy(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.heavy)
    }

    pub fn current_clip(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.clip.as_str())
    }

    fn queue(&mut self, kind: StrikeKind) {
        match kind {
            StrikeKind::Light => self.queued_light = true,
            StrikeKind::Heavy => {
                self.queued_heavy = true;
                self.queued_light = false;
            }
        }
    }

    /// Intent path: starts a sequence under a `Combo` lock, or queues if one runs.
    pub fn request(
        &mut self,
        kind: StrikeKind,
        state: &mut CombatantState,
        cues: &mut AnimationCues,
    ) -> RequestOutcome {
        if self.is_running() {
            self.queue(kind);
            return RequestOutcome::Queued;
        }
        if !state.acquire(LockHolder::Combo) {
            return RequestOutcome::Rejected;
        }
        self.queue(kind);
        self.task_owned = false;
        if self.begin_step(cues) {
            RequestOutcome::Started
        } else {
            state.release(LockHolder::Combo);
            RequestOutcome::Rejected
        }
    }

    /// Task path: the calling task already owns the lock.
    pub fn request_from_task(&mut self, kind: StrikeKind, cues: &mut AnimationCues) -> RequestOutcome {
        if self.is_running() {
            self.queue(kind);
            return RequestOutcome::Queued;
        }
        self.queue(kind);
        self.task_owned = true;
        if self.begin_step(cues) {
            RequestOutcome::Started
        } else {
            RequestOutcome::Rejected
        }
    }

    fn swing_volume(&self, heavy: bool) -> Option<usize> {
        if self.volume_count == 0 {
            return None;
        }
        if heavy {
            Some(self.volume_count - 1)
        } else {
            Some((self.step.saturating_sub(1) as usize) % self.volume_count)
        }
    }

    /// Consumes the queued flags and cues the next clip. False when there is
    /// no clip to play, which ends the sequence.
    fn begin_step(&mut self, cues: &mut AnimationCues) -> bool {
        let heavy = self.queued_heavy;
        self.queued_light = false;
        self.queued_heavy = false;

        let clip = if heavy {
            self.step = 0;
            Some(self.heavy_clip.clone())
        } else {
            self.step += 1;
            let index = (self.step as usize).min(self.light_clips.len()).saturating_sub(1);
            self.light_clips.get(index).cloned()
        };

        let Some(clip) = clip.filter(|c| !c.is_empty()) else {
            warn!("Combo step has no clip configured, ending sequence");
            self.active = None;
            self.step = 0;
            cues.clear_attack_flags();
            return false;
        };

        cues.set_bool(cue::IS_ATTACK, true);
        cues.set_bool(cue::IS_HEAVY_ATTACK, heavy);
        if !heavy {
            cues.set_int(cue::ATTACK_STEP, self.step as i32);
        }
        cues.play(clip.clone(), self.swing_volume(heavy));

        self.active = Some(ActiveStep {
            clip,
            heavy,
            frames: 0,
        });
        true
    }

    /// Advance the running sequence by one tick.
    ///
    /// A step waits at least one tick, then until its clip reaches the ready
    /// threshold. After `max_step_frames` progression is forced.
    pub fn tick(&mut self, cues: &mut AnimationCues, tuning: &CombatTuning) -> ComboTick {
        let Some(active) = self.active.as_mut() else {
            return ComboTick::Idle;
        };
        active.frames += 1;

        let ready = active.frames > 1
            && cues
                .normalized_time(&active.clip)
                .is_some_and(|t| t >= tuning.ready_threshold);
        let timed_out = active.frames > tuning.max_step_frames;

        if !ready && !timed_out {
            return ComboTick::Waiting;
        }
        if timed_out && !ready {
            warn!(
                "Combo step '{}' never reached {:.0}% progress, forcing progression",
                active.clip,
                tuning.ready_threshold * 100.0
            );
        }

        if (self.queued_light || self.queued_heavy) && self.begin_step(cues) {
            return ComboTick::Advanced;
        }

        let task_owned = self.task_owned;
        self.finish(cues);
        ComboTick::Finished { task_owned }
    }

    fn finish(&mut self, cues: &mut AnimationCues) {
        self.step = 0;
        self.queued_light = false;
        self.queued_heavy = false;
        self.active = None;
        self.task_owned = false;
        cues.clear_attack_flags();
    }

    /// Hard interrupt: drop the sequence and any queued input.
    pub fn reset(&mut self, cues: &mut AnimationCues) {
        let was_running = self.is_running();
        self.finish(cues);
        if was_running {
            cues.stop();
        }
    }

    pub fn tick_fire_cooldown(&mut self, dt: f32) {
        if let Some(ranged) = self.ranged.as_mut() {
            ranged.remaining = (ranged.remaining - dt).max(0.0);
        }
    }
}

pub(crate) fn tick_fire_cooldowns(time: Res<Time>, mut query: Query<&mut ComboController>) {
    let dt = time.delta_secs();
    for mut combo in &mut query {
        combo.tick_fire_cooldown(dt);
    }
}

/// Routes decoded input intents into the block and combo controllers
pub(crate) fn apply_intents(
    mut intents: MessageReader<CombatIntent>,
    mut query: Query<
        (
            &Transform,
            &Facing,
            &mut ComboController,
            Option<&mut BlockController>,
            &mut CombatantState,
            &mut AnimationCues,
            Option<&Stagger>,
        ),
        Without<Dead>,
    >,
    mut projectiles: MessageWriter<ProjectileRequest>,
) {
    for intent in intents.read() {
        let Ok((transform, facing, mut combo, block, mut state, mut cues, stagger)) =
            query.get_mut(intent.actor)
        else {
            continue;
        };
        if stagger.is_some_and(|s| s.is_staggered()) {
            debug!("Ignoring {:?} from staggered {:?}", intent.intent, intent.actor);
            continue;
        }
        let blocking = block.as_ref().is_some_and(|b| b.is_blocking);

        match intent.intent {
            Intent::LightAttack | Intent::HeavyAttack if blocking => {
                debug!("Ignoring {:?} while blocking", intent.intent);
            }
            Intent::LightAttack if combo.ranged.is_some() => {
                let Some(ranged) = combo.ranged.as_mut() else {
                    continue;
                };
                if ranged.try_fire() {
                    let forward = facing.forward();
                    projectiles.write(ProjectileRequest {
                        owner: intent.actor,
                        origin: transform.translation.truncate() + forward * 0.5,
                        direction: forward,
                        damage: ranged.damage,
                        def: ranged.projectile.clone(),
                        homing_target: None,
                    });
                }
            }
            Intent::HeavyAttack if combo.ranged.is_some() => {}
            Intent::LightAttack => {
                combo.request(StrikeKind::Light, &mut state, &mut cues);
            }
            Intent::HeavyAttack => {
                combo.request(StrikeKind::Heavy, &mut state, &mut cues);
            }
            Intent::StartBlock => {
                if let Some(mut block) = block {
                    if !block.start(&state, &mut cues) {
                        debug!("Block refused for {:?}: attack in progress", intent.actor);
                    }
                }
            }
            Intent::StopBlock => {
                if let Some(mut block) = block {
                    block.stop(&mut cues);
                }
            }
        }
    }
}

/// Steps every running combo and releases its lock when it ends
pub(crate) fn advance_combos(
    tuning: Res<CombatTuning>,
    mut query: Query<
        (
            &mut ComboController,
            &mut AnimationCues,
            &mut CombatantState,
            &mut HitVolumes,
        ),
        Without<Dead>,
    >,
) {
    for (mut combo, mut cues, mut state, mut volumes) in &mut query {
        if let ComboTick::Finished { task_owned } = combo.tick(&mut cues, &tuning) {
            volumes.disable_all();
            if !task_owned {
                state.release(LockHolder::Combo);
            }
        }
    }
}
