//! Area attacks: the falling spell and the ground slam.

use bevy::prelude::*;

use super::{AttackTask, Delay, TaskContext, TaskEffect, TaskPoll, TelegraphKind};
use crate::combat::animation::cue;
use crate::content::{SlamAttackDef, SpellAttackDef};

#[derive(Debug, Clone, Copy)]
enum SpellStage {
    Start,
    Falling { center: Vec2, elapsed: f32 },
}

/// Marks the target's position, then drops damage on that spot after a delay.
/// Targets that moved away in the meantime are safe.
#[derive(Debug, Clone)]
pub struct SpellAttack {
    def: SpellAttackDef,
    ranged_cooldown: f32,
    stage: SpellStage,
}

impl SpellAttack {
    pub fn new(def: SpellAttackDef, ranged_cooldown: f32) -> Self {
        Self {
            def,
            ranged_cooldown,
            stage: SpellStage::Start,
        }
    }
}

impl AttackTask for SpellAttack {
    fn name(&self) -> &'static str {
        "spell"
    }

    fn poll(&mut self, ctx: &mut TaskContext, dt: f32) -> TaskPoll {
        match &mut self.stage {
            SpellStage::Start => {
                let Some(target) = ctx.target else {
                    return TaskPoll::Done;
                };
                let center = target.position;
                ctx.emit(TaskEffect::Trigger(cue::SPELL_CAST));
                ctx.emit(TaskEffect::Telegraph {
                    kind: TelegraphKind::Warning,
                    center,
                    radius: self.def.radius,
                    duration: self.def.delay,
                    flash: None,
                });
                // The marker comes to rest sitting on the ground, one radius up
                ctx.emit(TaskEffect::DropMarker {
                    from: center + Vec2::Y * self.def.drop_height,
                    to: center + Vec2::Y * self.def.radius,
                    duration: self.def.delay,
                });
                self.stage = SpellStage::Falling {
                    center,
                    elapsed: 0.0,
                };
                TaskPoll::Running
            }
            SpellStage::Falling { center, elapsed } => {
                *elapsed += dt;
                if *elapsed < self.def.delay {
                    return TaskPoll::Running;
                }
                ctx.emit(TaskEffect::ClearTelegraphs);
                ctx.emit(TaskEffect::AreaDamage {
                    center: *center,
                    radius: self.def.radius,
                    damage: self.def.damage,
                    grounded_only: false,
                });
                let suppressed = self.ranged_cooldown * self.def.ranged_suppression;
                ctx.cooldowns.ranged = ctx.cooldowns.ranged.max(suppressed);
                TaskPoll::Done
            }
        }
    }

    fn cleanup(&mut self, ctx: &mut TaskContext) {
        ctx.emit(TaskEffect::ClearTelegraphs);
    }
}

#[derive(Debug, Clone, Copy)]
enum SlamStage {
    Start,
    Charging(Delay),
    Recovery(Delay),
}

/// Invincible charge behind a flashing disc, then damage to everything
/// grounded inside it. Airborne targets dodge.
#[derive(Debug, Clone)]
pub struct SlamAttack {
    def: SlamAttackDef,
    stage: SlamStage,
}

impl SlamAttack {
    pub fn new(def: SlamAttackDef) -> Self {
        Self {
            def,
            stage: SlamStage::Start,
        }
    }
}

impl AttackTask for SlamAttack {
    fn name(&self) -> &'static str {
        "slam"
    }

    fn poll(&mut self, ctx: &mut TaskContext, dt: f32) -> TaskPoll {
        match &mut self.stage {
            SlamStage::Start => {
                ctx.emit(TaskEffect::SetInvincible(true));
                ctx.emit(TaskEffect::Trigger(cue::SLAM));
                ctx.emit(TaskEffect::Telegraph {
                    kind: TelegraphKind::SlamDisc,
                    center: ctx.position,
                    radius: self.def.radius,
                    duration: self.def.charge_time,
                    flash: Some((self.def.flash_start, self.def.flash_end)),
                });
                self.stage = SlamStage::Charging(Delay::new(self.def.charge_time));
                TaskPoll::Running
            }
            SlamStage::Charging(delay) => {
                if !delay.tick(dt) {
                    return TaskPoll::Running;
                }
                ctx.emit(TaskEffect::ClearTelegraphs);
                ctx.emit(TaskEffect::AreaDamage {
                    center: ctx.position,
                    radius: self.def.radius,
                    damage: self.def.damage,
                    grounded_only: true,
                });
                self.stage = SlamStage::Recovery(Delay::new(self.def.recovery));
                TaskPoll::Running
            }
            SlamStage::Recovery(delay) => {
                if !delay.tick(dt) {
                    return TaskPoll::Running;
                }
                ctx.emit(TaskEffect::SetInvincible(false));
                TaskPoll::Done
            }
        }
    }

    fn cleanup(&mut self, ctx: &mut TaskContext) {
        ctx.emit(TaskEffect::ClearTelegraphs);
        ctx.emit(TaskEffect::SetInvincible(false));
    }
}
