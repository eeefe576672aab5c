//! Ranged volleys: a single aimed shot or a homing three-shot fan.

use bevy::prelude::*;

use super::{AttackTask, Delay, TaskContext, TaskEffect, TaskPoll};
use crate::combat::animation::cue;
use crate::content::RangedAttackDef;

#[derive(Debug, Clone)]
enum RangedStage {
    Start,
    Windup(Delay),
    Burst { next: usize, gap: Delay },
}

#[derive(Debug, Clone)]
pub struct RangedAttack {
    def: RangedAttackDef,
    windup: f32,
    burst_gap: f32,
    /// Fan and homing regardless of phase
    always_fan: bool,
    angles: Vec<f32>,
    homing: bool,
    stage: RangedStage,
}

impl RangedAttack {
    pub fn new(def: RangedAttackDef) -> Self {
        Self {
            windup: def.windup,
            burst_gap: def.burst_gap,
            def,
            always_fan: false,
            angles: Vec::new(),
            homing: false,
            stage: RangedStage::Start,
        }
    }

    /// The barrage fired while pillars stand: shorter windup and gaps, always a
    /// homing fan.
    pub fn barrage(def: RangedAttackDef, windup: f32, burst_gap: f32) -> Self {
        Self {
            windup,
            burst_gap,
            always_fan: true,
            ..Self::new(def)
        }
    }

    fn fire(&self, ctx: &mut TaskContext, index: usize) {
        let Some(projectile) = self.def.projectile.clone() else {
            return;
        };
        let Some(angle) = self.angles.get(index) else {
            return;
        };
        let fan = self.angles.len() > 1;
        let damage = if fan {
            self.def.damage * self.def.fan_damage_scale
        } else {
            self.def.damage
        };
        let direction = Vec2::from_angle(angle.to_radians()).rotate(ctx.aim());
        ctx.emit(TaskEffect::Fire {
            direction,
            damage,
            def: projectile,
            homing_target: if self.homing {
                ctx.target.map(|t| t.entity)
            } else {
                None
            },
        });
    }
}

impl AttackTask for RangedAttack {
    fn name(&self) -> &'static str {
        "ranged"
    }

    fn poll(&mut self, ctx: &mut TaskContext, dt: f32) -> TaskPoll {
        match &mut self.stage {
            RangedStage::Start => {
                if self.def.projectile.is_none() {
                    warn!("{:?} ranged attack has no projectile, skipping", ctx.actor);
                    return TaskPoll::Done;
                }
                ctx.emit(TaskEffect::SetBool(cue::IS_WALKING, false));
                ctx.emit(TaskEffect::Trigger(cue::RANGED_SHOT));
                self.stage = RangedStage::Windup(Delay::new(self.windup));
                TaskPoll::Running
            }
            RangedStage::Windup(delay) => {
                if !delay.tick(dt) {
                    return TaskPoll::Running;
                }
                let fan = self.always_fan || ctx.phase >= self.def.fan_phase;
                self.homing = fan;
                self.angles = if fan {
                    let spread = self.def.spread_deg;
                    vec![0.0, spread, -spread]
                } else {
                    vec![0.0]
                };
                self.fire(ctx, 0);
                if self.angles.len() == 1 {
                    return TaskPoll::Done;
                }
                self.stage = RangedStage::Burst {
                    next: 1,
                    gap: Delay::new(self.burst_gap),
                };
                TaskPoll::Running
            }
            RangedStage::Burst { next, gap } => {
                if !gap.tick(dt) {
                    return TaskPoll::Running;
                }
                let index = *next;
                self.fire(ctx, index);
                if index + 1 >= self.angles.len() {
                    return TaskPoll::Done;
                }
                self.stage = RangedStage::Burst {
                    next: index + 1,
                    gap: Delay::new(self.burst_gap),
                };
                TaskPoll::Running
            }
        }
    }

    fn cleanup(&mut self, _ctx: &mut TaskContext) {
        // Projectiles already in flight live out their own lifetime
        self.angles.clear();
    }
}
