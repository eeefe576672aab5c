//! Combat domain: melee hit resolution.
//!
//! Every enabled hit volume reports its overlaps each tick. Each target is
//! resolved at most once per swing into a parry, a blocked hit, a guard
//! break, or plain damage.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::combat::block::BlockController;
use crate::combat::combo::ComboController;
use crate::combat::components::{Capabilities, Dead, HitVolumes, Pushback, Weapon};
use crate::combat::events::{BlockedHit, DamageRequest, HitLanded, Parried, StaggerRequest};
use crate::combat::resources::CombatTuning;
use crate::movement::Facing;

/// The attacking side of a single hit
#[derive(Debug, Clone, Copy)]
pub struct Strike {
    pub attacker_position: Vec2,
    pub damage: f32,
    pub heavy: bool,
}

/// What the resolver needs to know about the defender
#[derive(Debug, Clone, Copy)]
pub struct DefenderView<'a> {
    pub position: Vec2,
    pub forward: Vec2,
    pub capabilities: Capabilities,
    pub block: Option<&'a BlockController>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// Attacker is staggered, nobody takes damage
    Parried,
    /// No damage, defender pushed away along `push`
    Blocked { push: Vec2 },
    /// Defender staggered, then damaged
    GuardBroken { damage: f32 },
    Damaged { damage: f32 },
    /// Target neither blocks nor has health
    Ignored,
}

pub fn resolve_strike(strike: &Strike, defender: &DefenderView, push_force: f32) -> HitOutcome {
    let guarding = defender.capabilities.has_block
        && defender.block.is_some_and(|block| {
            block.guards_against(defender.position, defender.forward, strike.attacker_position)
        });

    if guarding {
        let parry = defender.block.is_some_and(|block| block.would_parry());
        if parry {
            return HitOutcome::Parried;
        }
        if !strike.heavy {
            let away = (defender.position - strike.attacker_position)
                .try_normalize()
                .unwrap_or(Vec2::X);
            return HitOutcome::Blocked {
                push: away * push_force,
            };
        }
        if defender.capabilities.has_health {
            return HitOutcome::GuardBroken {
                damage: strike.damage,
            };
        }
        return HitOutcome::GuardBroken { damage: 0.0 };
    }

    if defender.capabilities.has_health {
        HitOutcome::Damaged {
            damage: strike.damage,
        }
    } else {
        HitOutcome::Ignored
    }
}

pub(crate) fn resolve_melee_hits(
    tuning: Res<CombatTuning>,
    mut attackers: Query<
        (Entity, &Transform, &Weapon, &ComboController, &mut HitVolumes),
        Without<Dead>,
    >,
    defenders: Query<
        (&Transform, &Facing, &Capabilities, Option<&BlockController>),
        Without<Dead>,
    >,
    mut pushes: Query<&mut Pushback>,
    mut damage: MessageWriter<DamageRequest>,
    mut staggers: MessageWriter<StaggerRequest>,
    mut landed: MessageWriter<HitLanded>,
    mut blocked: MessageWriter<BlockedHit>,
    mut parried: MessageWriter<Parried>,
) {
    for (attacker, transform, weapon, combo, mut volumes) in &mut attackers {
        if !volumes.any_enabled() {
            continue;
        }

        let heavy = combo.is_heavy();
        let strike = Strike {
            attacker_position: transform.translation.truncate(),
            damage: weapon.damage(heavy),
            heavy,
        };

        let targets: Vec<Entity> = volumes
            .volumes
            .iter()
            .filter(|v| v.enabled)
            .flat_map(|v| v.overlaps.iter().copied())
            .collect();

        for target in targets {
            if target == attacker || !volumes.mark_struck(target) {
                continue;
            }
            let Ok((target_transform, facing, capabilities, block)) = defenders.get(target) else {
                continue;
            };

            let view = DefenderView {
                position: target_transform.translation.truncate(),
                forward: facing.forward(),
                capabilities: *capabilities,
                block,
            };

            match resolve_strike(&strike, &view, tuning.block_push_force) {
                HitOutcome::Parried => {
                    info!("Parry! {:?} deflected {:?}", target, attacker);
                    staggers.write(StaggerRequest {
                        target: attacker,
                        source: target,
                    });
                    parried.write(Parried {
                        parrier: target,
                        attacker,
                    });
                }
                HitOutcome::Blocked { push } => {
                    debug!("{:?} blocked a hit from {:?}", target, attacker);
                    if let Ok(mut pushback) = pushes.get_mut(target) {
                        pushback.velocity = push;
                    }
                    blocked.write(BlockedHit {
                        attacker,
                        defender: target,
                    });
                }
                HitOutcome::GuardBroken { damage: amount } => {
                    debug!("{:?} broke the guard of {:?}", attacker, target);
                    staggers.write(StaggerRequest {
                        target,
                        source: attacker,
                    });
                    if amount > 0.0 {
                        damage.write(DamageRequest {
                            source: attacker,
                            target,
                            amount,
                        });
                        landed.write(HitLanded {
                            attacker,
                            target,
                            damage: amount,
                            heavy,
                        });
                    }
                }
                HitOutcome::Damaged { damage: amount } => {
                    debug!("{:?} hit {:?} for {}", attacker, target, amount);
                    damage.write(DamageRequest {
                        source: attacker,
                        target,
                        amount,
                    });
                    landed.write(HitLanded {
                        attacker,
                        target,
                        damage: amount,
                        heavy,
                    });
                }
                HitOutcome::Ignored => {}
            }
        }
    }
}
