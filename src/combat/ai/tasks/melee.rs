//! Melee tasks driving the actor's combo controller.

use rand::Rng;

use super::{AttackTask, Delay, TaskContext, TaskEffect, TaskPoll};
use crate::combat::animation::cue;
use crate::combat::combo::StrikeKind;

#[derive(Debug, Clone, Copy)]
enum BasicStage {
    Start,
    Swinging,
}

/// One light or heavy strike, heavy with probability `heavy_chance`
#[derive(Debug, Clone)]
pub struct BasicAttack {
    heavy_chance: f32,
    stage: BasicStage,
}

impl BasicAttack {
    pub fn new(heavy_chance: f32) -> Self {
        Self {
            heavy_chance,
            stage: BasicStage::Start,
        }
    }
}

impl AttackTask for BasicAttack {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn poll(&mut self, ctx: &mut TaskContext, _dt: f32) -> TaskPoll {
        match self.stage {
            BasicStage::Start => {
                let kind = if ctx.rng.random::<f32>() < self.heavy_chance {
                    StrikeKind::Heavy
                } else {
                    StrikeKind::Light
                };
                ctx.emit(TaskEffect::Strike(kind));
                self.stage = BasicStage::Swinging;
                TaskPoll::Running
            }
            BasicStage::Swinging if ctx.combo_idle => TaskPoll::Done,
            BasicStage::Swinging => TaskPoll::Running,
        }
    }

    fn cleanup(&mut self, ctx: &mut TaskContext) {
        ctx.emit(TaskEffect::CancelStrikes);
    }
}

#[derive(Debug, Clone, Copy)]
enum ComboStage {
    Start,
    FollowUp(Delay),
    Finishing,
}

/// Heavy opener followed by a light strike after a fixed delay
#[derive(Debug, Clone)]
pub struct HeavyComboAttack {
    follow_up_delay: f32,
    stage: ComboStage,
}

impl HeavyComboAttack {
    pub fn new(follow_up_delay: f32) -> Self {
        Self {
            follow_up_delay,
            stage: ComboStage::Start,
        }
    }
}

impl AttackTask for HeavyComboAttack {
    fn name(&self) -> &'static str {
        "heavy_combo"
    }

    fn poll(&mut self, ctx: &mut TaskContext, dt: f32) -> TaskPoll {
        match &mut self.stage {
            ComboStage::Start => {
                ctx.emit(TaskEffect::Trigger(cue::MELEE_COMBO));
                ctx.emit(TaskEffect::Strike(StrikeKind::Heavy));
                self.stage = ComboStage::FollowUp(Delay::new(self.follow_up_delay));
                TaskPoll::Running
            }
            ComboStage::FollowUp(delay) => {
                if delay.tick(dt) {
                    ctx.emit(TaskEffect::Strike(StrikeKind::Light));
                    self.stage = ComboStage::Finishing;
                }
                TaskPoll::Running
            }
            // Strikes are applied after the poll, so idle here means the whole
            // sequence has played out
            ComboStage::Finishing if ctx.combo_idle => TaskPoll::Done,
            ComboStage::Finishing => TaskPoll::Running,
        }
    }

    fn cleanup(&mut self, ctx: &mut TaskContext) {
        ctx.emit(TaskEffect::CancelStrikes);
    }
}
