//! Special phases: rooted, invincible stretches that last while the boss's
//! hazards stand.

use bevy::prelude::*;

use super::{AttackTask, Delay, RangedAttack, SpellAttack, TaskContext, TaskEffect, TaskPoll};
use crate::combat::ai::hazards::HazardKind;
use crate::combat::animation::cue;
use crate::content::{PillarPhaseDef, RangedAttackDef, SpellAttackDef, SummonDef};

fn begin_special(ctx: &mut TaskContext) {
    ctx.emit(TaskEffect::SetInvincible(true));
    ctx.emit(TaskEffect::SetRooted(true));
    ctx.emit(TaskEffect::SetBool(cue::IS_WALKING, false));
    ctx.emit(TaskEffect::Trigger(cue::SPELL_CAST));
}

fn end_special(ctx: &mut TaskContext) {
    ctx.emit(TaskEffect::SetInvincible(false));
    ctx.emit(TaskEffect::SetRooted(false));
}

#[derive(Debug, Clone, Copy)]
enum SummonStage {
    Start,
    Casting(Delay),
    /// Hazards were requested this tick and are not counted yet
    Spawned,
    Awaiting,
}

/// Calls a ring of minions, then turns in place firing homing fans at the
/// target until every minion is dead. The first fan leaves as soon as the
/// minions are up.
#[derive(Debug, Clone)]
pub struct SummonMinionAttack {
    def: SummonDef,
    ranged: Option<RangedAttackDef>,
    stage: SummonStage,
}

impl SummonMinionAttack {
    pub fn new(def: SummonDef, ranged: Option<RangedAttackDef>) -> Self {
        Self {
            def,
            ranged,
            stage: SummonStage::Start,
        }
    }

    fn fire_fan(&self, ctx: &mut TaskContext) {
        let Some(ranged) = &self.ranged else {
            return;
        };
        let Some(projectile) = &ranged.projectile else {
            return;
        };
        let aim = ctx.aim();
        let homing_target = ctx.target.map(|t| t.entity);
        for angle in [0.0, ranged.spread_deg, -ranged.spread_deg] {
            let direction = Vec2::from_angle(f32::to_radians(angle)).rotate(aim);
            ctx.emit(TaskEffect::Fire {
                direction,
                damage: ranged.damage,
                def: projectile.clone(),
                homing_target,
            });
        }
    }
}

impl AttackTask for SummonMinionAttack {
    fn name(&self) -> &'static str {
        "summon_minions"
    }

    fn poll(&mut self, ctx: &mut TaskContext, dt: f32) -> TaskPoll {
        match &mut self.stage {
            SummonStage::Start => {
                begin_special(ctx);
                self.stage = SummonStage::Casting(Delay::new(self.def.cast_delay));
                TaskPoll::Running
            }
            SummonStage::Casting(delay) => {
                if delay.tick(dt) {
                    ctx.emit(TaskEffect::SpawnHazards {
                        kind: HazardKind::Minion,
                        archetypes: self.def.minion_pool.clone(),
                        count: self.def.count,
                        radius: self.def.ring_radius,
                    });
                    self.stage = SummonStage::Spawned;
                }
                TaskPoll::Running
            }
            SummonStage::Spawned => {
                self.stage = SummonStage::Awaiting;
                self.poll(ctx, dt)
            }
            SummonStage::Awaiting => {
                if ctx.live_hazards == 0 {
                    end_special(ctx);
                    return TaskPoll::Done;
                }
                ctx.emit(TaskEffect::TurnToward {
                    direction: ctx.aim(),
                    max_radians: self.def.turn_rate_deg.to_radians() * dt,
                });
                if ctx.cooldowns.summon <= 0.0 {
                    ctx.cooldowns.summon = self.def.shoot_interval;
                    self.fire_fan(ctx);
                }
                TaskPoll::Running
            }
        }
    }

    fn cleanup(&mut self, ctx: &mut TaskContext) {
        end_special(ctx);
    }
}

enum PillarStage {
    Start,
    Casting(Delay),
    Spawned,
    Barrage,
}

/// Raises a ring of pillars, then alternates homing volleys and spells until
/// the pillars are destroyed.
pub struct PillarPhase {
    def: PillarPhaseDef,
    ranged: Option<RangedAttackDef>,
    spell: Option<SpellAttackDef>,
    stage: PillarStage,
    current: Option<Box<dyn AttackTask>>,
}

impl PillarPhase {
    pub fn new(
        def: PillarPhaseDef,
        ranged: Option<RangedAttackDef>,
        spell: Option<SpellAttackDef>,
    ) -> Self {
        Self {
            def,
            ranged,
            spell,
            stage: PillarStage::Start,
            current: None,
        }
    }

    /// Picks the next volley or spell from whatever is off cooldown.
    fn next_attack(&self, ctx: &mut TaskContext) -> Option<Box<dyn AttackTask>> {
        if let Some(ranged) = &self.ranged
            && ctx.cooldowns.ranged <= 0.0
        {
            ctx.cooldowns.ranged = self.def.ranged_cooldown;
            return Some(Box::new(RangedAttack::barrage(
                ranged.clone(),
                self.def.windup,
                self.def.burst_gap,
            )));
        }
        if let Some(spell) = &self.spell
            && ctx.cooldowns.spell <= 0.0
            && ctx.target.is_some()
        {
            ctx.cooldowns.spell = spell.cooldown;
            let ranged_cooldown = self.ranged.as_ref().map_or(0.0, |r| r.cooldown);
            return Some(Box::new(SpellAttack::new(spell.clone(), ranged_cooldown)));
        }
        None
    }
}

impl AttackTask for PillarPhase {
    fn name(&self) -> &'static str {
        "pillar_barrage"
    }

    fn poll(&mut self, ctx: &mut TaskContext, dt: f32) -> TaskPoll {
        match &mut self.stage {
            PillarStage::Start => {
                begin_special(ctx);
                self.stage = PillarStage::Casting(Delay::new(self.def.cast_delay));
                TaskPoll::Running
            }
            PillarStage::Casting(delay) => {
                if delay.tick(dt) {
                    ctx.emit(TaskEffect::SpawnHazards {
                        kind: HazardKind::Pillar,
                        archetypes: vec![self.def.pillar.clone()],
                        count: self.def.count,
                        radius: self.def.ring_radius,
                    });
                    self.stage = PillarStage::Spawned;
                }
                TaskPoll::Running
            }
            PillarStage::Spawned => {
                self.stage = PillarStage::Barrage;
                self.poll(ctx, dt)
            }
            PillarStage::Barrage => {
                if ctx.live_hazards == 0 {
                    if let Some(mut attack) = self.current.take() {
                        attack.cleanup(ctx);
                    }
                    ctx.emit(TaskEffect::ClearTelegraphs);
                    end_special(ctx);
                    return TaskPoll::Done;
                }

                if self.current.is_none() {
                    self.current = self.next_attack(ctx);
                }
                if let Some(attack) = self.current.as_mut()
                    && attack.poll(ctx, dt) != TaskPoll::Running
                {
                    self.current = None;
                }
                TaskPoll::Running
            }
        }
    }

    fn cleanup(&mut self, ctx: &mut TaskContext) {
        if let Some(mut attack) = self.current.take() {
            attack.cleanup(ctx);
        }
        ctx.emit(TaskEffect::ClearTelegraphs);
        end_special(ctx);
    }
}
