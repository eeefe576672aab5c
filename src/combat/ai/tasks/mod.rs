//! Attack tasks: resumable, cancellable multi-tick attack behaviors.
//!
//! A task is polled once per tick with a [`TaskContext`] describing the actor,
//! its target, and its cooldowns. Tasks never touch the world directly; they
//! emit [`TaskEffect`]s which `apply_task_effects` carries out after all tasks
//! have been polled. While a task is in its slot the actor holds the
//! `LockHolder::Task` attack lock.

mod effects;
mod melee;
mod ranged;
mod spell;
mod summon;

pub use melee::{BasicAttack, HeavyComboAttack};
pub use ranged::RangedAttack;
pub use spell::{SlamAttack, SpellAttack};
pub use summon::{PillarPhase, SummonMinionAttack};

pub(crate) use effects::apply_task_effects;

use bevy::ecs::message::{Message, MessageWriter};
use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::combat::ai::boss::BossScheduler;
use crate::combat::ai::enemy::{Arsenal, Brain};
use crate::combat::ai::hazards::{HazardKind, HazardSet};
use crate::combat::combo::{ComboController, StrikeKind};
use crate::combat::components::{CombatantState, Cooldowns, Dead, LockHolder, Stagger};
use crate::combat::resources::SimRng;
use crate::content::{BossPhase, ProjectileDef, SpecialKind};
use crate::movement::{Facing, Footing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPoll {
    Running,
    Done,
    Cancelled,
}

/// Snapshot of the actor's current target
#[derive(Debug, Clone, Copy)]
pub struct TargetView {
    pub entity: Entity,
    pub position: Vec2,
    pub grounded: bool,
}

/// Shared read/write data handed to every task poll
pub struct TaskContext<'a> {
    pub actor: Entity,
    pub position: Vec2,
    pub facing: Vec2,
    pub phase: BossPhase,
    pub target: Option<TargetView>,
    /// Cooldown write-back
    pub cooldowns: &'a mut Cooldowns,
    /// No combo sequence is running on the actor
    pub combo_idle: bool,
    /// Live hazards owned by the actor
    pub live_hazards: usize,
    pub rng: &'a mut ChaCha8Rng,
    effects: Vec<TaskEffect>,
}

impl<'a> TaskContext<'a> {
    pub fn new(actor: Entity, cooldowns: &'a mut Cooldowns, rng: &'a mut ChaCha8Rng) -> Self {
        Self {
            actor,
            position: Vec2::ZERO,
            facing: Vec2::X,
            phase: BossPhase::Phase1,
            target: None,
            cooldowns,
            combo_idle: true,
            live_hazards: 0,
            rng,
            effects: Vec::new(),
        }
    }

    pub fn emit(&mut self, effect: TaskEffect) {
        self.effects.push(effect);
    }

    pub fn effects(&self) -> &[TaskEffect] {
        &self.effects
    }

    pub fn take_effects(&mut self) -> Vec<TaskEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Direction toward the target, falling back to facing
    pub fn aim(&self) -> Vec2 {
        self.target
            .and_then(|t| (t.position - self.position).try_normalize())
            .unwrap_or(self.facing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelegraphKind {
    /// Ground marker under a falling spell
    Warning,
    /// Flashing disc around a charging slam
    SlamDisc,
}

/// World mutations a task asks for
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEffect {
    Trigger(&'static str),
    SetBool(&'static str, bool),
    Strike(StrikeKind),
    /// Abandon any combo the task started
    CancelStrikes,
    Fire {
        direction: Vec2,
        damage: f32,
        def: ProjectileDef,
        homing_target: Option<Entity>,
    },
    Telegraph {
        kind: TelegraphKind,
        center: Vec2,
        radius: f32,
        duration: f32,
        /// Flash period at the start and end of the charge
        flash: Option<(f32, f32)>,
    },
    DropMarker {
        from: Vec2,
        to: Vec2,
        duration: f32,
    },
    /// Remove every telegraph and drop marker owned by the actor
    ClearTelegraphs,
    AreaDamage {
        center: Vec2,
        radius: f32,
        damage: f32,
        grounded_only: bool,
    },
    SpawnHazards {
        kind: HazardKind,
        archetypes: Vec<String>,
        count: u32,
        radius: f32,
    },
    SetInvincible(bool),
    SetRooted(bool),
    TurnToward {
        direction: Vec2,
        max_radians: f32,
    },
}

/// All effects one actor's task produced this tick
#[derive(Debug, Clone)]
pub struct TaskEffects {
    pub actor: Entity,
    pub effects: Vec<TaskEffect>,
}

impl Message for TaskEffects {}

pub trait AttackTask: Send + Sync {
    fn name(&self) -> &'static str;

    /// Advance by one tick. The first poll is the task's start.
    fn poll(&mut self, ctx: &mut TaskContext, dt: f32) -> TaskPoll;

    /// Undo partially applied state after an interruption.
    fn cleanup(&mut self, ctx: &mut TaskContext);
}

/// Countdown used at task suspension points
#[derive(Debug, Clone, Copy)]
pub struct Delay {
    remaining: f32,
}

impl Delay {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    /// True once the delay has fully elapsed
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

/// The single task an actor may be running
#[derive(Component, Default)]
pub struct TaskSlot {
    task: Option<Box<dyn AttackTask>>,
}

impl TaskSlot {
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn task_name(&self) -> Option<&'static str> {
        self.task.as_ref().map(|t| t.name())
    }

    /// Claims the attack lock and installs the task. Refused if anything
    /// already holds the lock.
    pub fn launch(&mut self, task: Box<dyn AttackTask>, state: &mut CombatantState) -> bool {
        if self.task.is_some() || !state.acquire(LockHolder::Task) {
            return false;
        }
        self.task = Some(task);
        true
    }

    /// Drop the task without cleanup. Used by respawn.
    pub fn clear(&mut self, state: &mut CombatantState) {
        self.task = None;
        state.release(LockHolder::Task);
    }
}

/// Attacks the decision layer can pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskChoice {
    Basic,
    HeavyCombo,
    Ranged,
    Spell,
    Slam,
    Special(SpecialKind),
}

/// Commit the cooldowns a choice consumes. Must run before the task launches.
pub fn commit_cooldowns(choice: TaskChoice, arsenal: &Arsenal, cooldowns: &mut Cooldowns) {
    let attacks = &arsenal.attacks;
    match choice {
        TaskChoice::Ranged => {
            if let Some(ranged) = &attacks.ranged {
                cooldowns.ranged = ranged.cooldown;
            }
        }
        TaskChoice::Spell => {
            if let Some(spell) = &attacks.spell {
                cooldowns.spell = spell.cooldown;
                if let Some(ranged) = &attacks.ranged {
                    cooldowns.ranged = cooldowns.ranged.max(ranged.cooldown * spell.ranged_suppression);
                }
            }
        }
        TaskChoice::Slam => {
            if let Some(slam) = &attacks.slam {
                cooldowns.slam = slam.cooldown;
            }
        }
        TaskChoice::Special(SpecialKind::SummonMinions) => {
            if attacks.summon.is_some() {
                cooldowns.summon = 0.0;
            }
        }
        TaskChoice::Basic | TaskChoice::HeavyCombo | TaskChoice::Special(_) => {}
    }
}

/// Instantiate the task for a choice; None when the arsenal lacks it.
pub fn build_task(choice: TaskChoice, arsenal: &Arsenal) -> Option<Box<dyn AttackTask>> {
    let attacks = &arsenal.attacks;
    let ranged_cooldown = attacks.ranged.as_ref().map_or(0.0, |r| r.cooldown);

    let task: Box<dyn AttackTask> = match choice {
        TaskChoice::Basic => Box::new(BasicAttack::new(attacks.basic.heavy_chance)),
        TaskChoice::HeavyCombo => {
            Box::new(HeavyComboAttack::new(attacks.heavy_combo.as_ref()?.follow_up_delay))
        }
        TaskChoice::Ranged => Box::new(RangedAttack::new(attacks.ranged.clone()?)),
        TaskChoice::Spell => Box::new(SpellAttack::new(attacks.spell.clone()?, ranged_cooldown)),
        TaskChoice::Slam => Box::new(SlamAttack::new(attacks.slam.clone()?)),
        TaskChoice::Special(SpecialKind::SummonMinions) => Box::new(SummonMinionAttack::new(
            attacks.summon.clone()?,
            attacks.ranged.clone(),
        )),
        TaskChoice::Special(SpecialKind::PillarBarrage) => Box::new(PillarPhase::new(
            attacks.pillars.clone()?,
            attacks.ranged.clone(),
            attacks.spell.clone(),
        )),
    };
    Some(task)
}

/// Polls every running task once. Dead or staggered actors have their task
/// cancelled and cleaned up at this suspension point.
pub(crate) fn run_attack_tasks(
    time: Res<Time>,
    mut rng: ResMut<SimRng>,
    mut actors: Query<(
        Entity,
        &Transform,
        &Facing,
        &mut TaskSlot,
        &mut CombatantState,
        &ComboController,
        Option<&Brain>,
        Option<&BossScheduler>,
        Option<&HazardSet>,
        Option<&Stagger>,
        Has<Dead>,
    )>,
    targets: Query<(&Transform, Option<&Footing>)>,
    mut out: MessageWriter<TaskEffects>,
) {
    let dt = time.delta_secs();

    for (
        actor,
        transform,
        facing,
        mut slot,
        mut state,
        combo,
        brain,
        scheduler,
        hazards,
        stagger,
        dead,
    ) in &mut actors
    {
        let Some(mut task) = slot.task.take() else {
            continue;
        };

        let target = brain.and_then(|b| b.target).and_then(|entity| {
            targets.get(entity).ok().map(|(t, footing)| TargetView {
                entity,
                position: t.translation.truncate(),
                grounded: footing.is_none_or(|f| f.grounded),
            })
        });

        let interrupted = dead || stagger.is_some_and(|s| s.is_staggered());

        let mut ctx = TaskContext::new(actor, &mut state.cooldowns, &mut rng.0);
        ctx.position = transform.translation.truncate();
        ctx.facing = facing.forward();
        ctx.phase = scheduler.map_or(BossPhase::Phase1, |s| s.phase);
        ctx.target = target;
        ctx.combo_idle = !combo.is_running();
        ctx.live_hazards = hazards.map_or(0, |h| h.len());

        let poll = if interrupted {
            TaskPoll::Cancelled
        } else {
            task.poll(&mut ctx, dt)
        };
        if poll == TaskPoll::Cancelled {
            debug!("{:?} task '{}' cancelled", actor, task.name());
            task.cleanup(&mut ctx);
        }
        let effects = ctx.take_effects();

        if poll == TaskPoll::Running {
            slot.task = Some(task);
        } else {
            state.release(LockHolder::Task);
        }

        if !effects.is_empty() {
            out.write(TaskEffects { actor, effects });
        }
    }
}
