//! Applies the effects tasks emitted this tick.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use rand::seq::IndexedRandom;
use std::f32::consts::TAU;

use super::{TaskEffect, TaskEffects};
use crate::combat::ai::hazards::{Hazard, HazardKind, HazardRise, HazardSet};
use crate::combat::ai::telegraph::{DropMarker, Telegraph};
use crate::combat::animation::AnimationCues;
use crate::combat::combo::ComboController;
use crate::combat::components::{
    CombatantState, Dead, HitVolumes, Hurtbox, Invulnerable, Team,
};
use crate::combat::events::{DamageRequest, ProjectileRequest};
use crate::combat::resources::SimRng;
use crate::combat::spawn::spawn_archetype;
use crate::content::ArchetypeRegistry;
use crate::movement::{Facing, Footing};

/// Projectiles leave a little ahead of the caster
const MUZZLE_OFFSET: f32 = 0.8;

pub(crate) fn apply_task_effects(
    mut commands: Commands,
    mut incoming: MessageReader<TaskEffects>,
    registry: Res<ArchetypeRegistry>,
    mut rng: ResMut<SimRng>,
    mut actors: Query<(
        &Transform,
        &mut Facing,
        &mut ComboController,
        &mut AnimationCues,
        &mut Invulnerable,
        &mut CombatantState,
        &mut HitVolumes,
        &Team,
        Option<&mut HazardSet>,
    )>,
    targets: Query<(Entity, &Transform, &Hurtbox, &Team, Option<&Footing>), Without<Dead>>,
    telegraphs: Query<(Entity, &Telegraph)>,
    markers: Query<(Entity, &DropMarker)>,
    mut projectiles: MessageWriter<ProjectileRequest>,
    mut damage: MessageWriter<DamageRequest>,
) {
    for TaskEffects { actor, effects } in incoming.read() {
        let actor = *actor;
        let Ok((
            transform,
            mut facing,
            mut combo,
            mut cues,
            mut invulnerable,
            mut state,
            mut volumes,
            team,
            mut hazards,
        )) = actors.get_mut(actor)
        else {
            continue;
        };
        let position = transform.translation.truncate();

        for effect in effects {
            match effect {
                TaskEffect::Trigger(name) => cues.set_trigger(*name),
                TaskEffect::SetBool(name, value) => cues.set_bool(*name, *value),
                TaskEffect::Strike(kind) => {
                    combo.request_from_task(*kind, &mut cues);
                }
                TaskEffect::CancelStrikes => {
                    combo.reset(&mut cues);
                    volumes.disable_all();
                }
                TaskEffect::Fire {
                    direction,
                    damage,
                    def,
                    homing_target,
                } => {
                    projectiles.write(ProjectileRequest {
                        owner: actor,
                        origin: position + *direction * MUZZLE_OFFSET,
                        direction: *direction,
                        damage: *damage,
                        def: def.clone(),
                        homing_target: *homing_target,
                    });
                }
                TaskEffect::Telegraph {
                    kind,
                    center,
                    radius,
                    duration,
                    flash,
                } => {
                    commands.spawn((
                        Telegraph::new(actor, *kind, *radius, *duration, *flash),
                        Transform::from_translation(center.extend(0.0)),
                        Visibility::default(),
                    ));
                }
                TaskEffect::DropMarker { from, to, duration } => {
                    commands.spawn((
                        DropMarker {
                            owner: actor,
                            from: *from,
                            to: *to,
                            elapsed: 0.0,
                            duration: *duration,
                        },
                        Transform::from_translation(from.extend(0.0)),
                    ));
                }
                TaskEffect::ClearTelegraphs => {
                    for (entity, telegraph) in &telegraphs {
                        if telegraph.owner == actor {
                            commands.entity(entity).despawn();
                        }
                    }
                    for (entity, marker) in &markers {
                        if marker.owner == actor {
                            commands.entity(entity).despawn();
                        }
                    }
                }
                TaskEffect::AreaDamage {
                    center,
                    radius,
                    damage: amount,
                    grounded_only,
                } => {
                    for (target, target_transform, hurtbox, target_team, footing) in &targets {
                        if target == actor || !team.is_hostile_to(*target_team) {
                            continue;
                        }
                        if *grounded_only && footing.is_some_and(|f| !f.grounded) {
                            continue;
                        }
                        let distance = target_transform.translation.truncate().distance(*center);
                        if distance <= radius + hurtbox.radius {
                            damage.write(DamageRequest {
                                source: actor,
                                target,
                                amount: *amount,
                            });
                        }
                    }
                }
                TaskEffect::SpawnHazards {
                    kind,
                    archetypes,
                    count,
                    radius,
                } => {
                    let Some(set) = hazards.as_deref_mut() else {
                        warn!("{:?} has no hazard set, cannot spawn {:?}", actor, kind);
                        continue;
                    };
                    for i in 0..*count {
                        let Some(id) = archetypes.choose(&mut rng.0) else {
                            break;
                        };
                        let Some(def) = registry.get(id) else {
                            warn!("Unknown hazard archetype '{}'", id);
                            continue;
                        };
                        let angle = i as f32 * TAU / *count as f32;
                        let spot = position + Vec2::from_angle(angle) * *radius;
                        let rise = match (kind, &def.hazard) {
                            (HazardKind::Pillar, Some(hazard)) => Some(HazardRise {
                                elapsed: 0.0,
                                duration: hazard.rise_duration,
                                distance: hazard.rise_distance,
                                base_y: spot.y,
                            }),
                            _ => None,
                        };
                        let start = match &rise {
                            Some(rise) => spot - Vec2::Y * rise.distance,
                            None => spot,
                        };
                        let hazard = spawn_archetype(&mut commands, def, start, *team);
                        let mut entity = commands.entity(hazard);
                        entity.insert(Hazard {
                            owner: actor,
                            kind: *kind,
                        });
                        if let Some(rise) = rise {
                            entity.insert(rise);
                        }
                        set.insert(hazard);
                    }
                    info!("{:?} raised {} {:?} hazards", actor, set.len(), kind);
                }
                TaskEffect::SetInvincible(held) => invulnerable.held = *held,
                TaskEffect::SetRooted(rooted) => state.rooted = *rooted,
                TaskEffect::TurnToward {
                    direction,
                    max_radians,
                } => facing.turn_toward(*direction, *max_radians),
            }
        }
    }
}
