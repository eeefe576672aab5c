//! Combat domain: projectiles with optional homing.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::combat::block::BlockController;
use crate::combat::components::{Capabilities, Dead, HitShape, HitVolume, HitVolumes, Team};
use crate::combat::events::{DamageRequest, ProjectileImpact, ProjectileRequest};
use crate::movement::Facing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileState {
    Spawned,
    Traveling,
    Hit,
    Expired,
}

#[derive(Debug, Clone, Copy)]
pub struct Homing {
    pub target: Entity,
    /// Blend rate toward the target, per second
    pub turn_rate: f32,
}

#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub owner: Entity,
    pub damage: f32,
    pub speed: f32,
    /// Seconds left before the projectile expires
    pub lifetime: f32,
    pub homing: Option<Homing>,
    pub state: ProjectileState,
}

/// Blend `direction` toward `to_target` by at most `turn_rate * dt`.
pub fn steer(direction: Vec2, to_target: Vec2, turn_rate: f32, dt: f32) -> Vec2 {
    let t = (turn_rate * dt).clamp(0.0, 1.0);
    direction.lerp(to_target, t).try_normalize().unwrap_or(direction)
}

pub(crate) fn spawn_projectiles(
    mut commands: Commands,
    mut requests: MessageReader<ProjectileRequest>,
    owners: Query<&Team>,
) {
    for request in requests.read() {
        let Ok(team) = owners.get(request.owner) else {
            warn!("Projectile requested by {:?} which has no team", request.owner);
            continue;
        };
        let Some(direction) = request.direction.try_normalize() else {
            warn!("Projectile requested with zero direction");
            continue;
        };

        let mut volume = HitVolume::new(
            HitShape::Circle {
                radius: request.def.radius,
            },
            Vec2::ZERO,
        );
        volume.enabled = true;

        commands.spawn((
            Projectile {
                owner: request.owner,
                damage: request.damage,
                speed: request.def.speed,
                lifetime: request.def.lifetime,
                homing: request.homing_target.map(|target| Homing {
                    target,
                    turn_rate: request.def.turn_rate,
                }),
                state: ProjectileState::Spawned,
            },
            *team,
            Facing(direction),
            HitVolumes {
                volumes: vec![volume],
                ..default()
            },
            Transform::from_translation(request.origin.extend(0.0)),
        ));
    }
}

pub(crate) fn move_projectiles(
    time: Res<Time>,
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Transform, &mut Facing)>,
    targets: Query<&Transform, (Without<Projectile>, Without<Dead>)>,
) {
    let dt = time.delta_secs();

    for (entity, mut projectile, mut transform, mut facing) in &mut projectiles {
        match projectile.state {
            ProjectileState::Spawned => {
                projectile.state = ProjectileState::Traveling;
                continue;
            }
            ProjectileState::Traveling => {}
            ProjectileState::Hit | ProjectileState::Expired => continue,
        }

        projectile.lifetime -= dt;
        if projectile.lifetime <= 0.0 {
            projectile.state = ProjectileState::Expired;
            commands.entity(entity).despawn();
            continue;
        }

        let position = transform.translation.truncate();
        if let Some(homing) = projectile.homing {
            if let Ok(target) = targets.get(homing.target) {
                if let Some(to_target) = (target.translation.truncate() - position).try_normalize()
                {
                    facing.0 = steer(facing.0, to_target, homing.turn_rate, dt);
                }
            }
        }

        let step = facing.0 * projectile.speed * dt;
        transform.translation += step.extend(0.0);
    }
}

pub(crate) fn resolve_projectile_hits(
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Projectile, &Transform, &HitVolumes)>,
    defenders: Query<
        (&Transform, &Facing, &Capabilities, Option<&BlockController>),
        (Without<Dead>, Without<Projectile>),
    >,
    mut damage: MessageWriter<DamageRequest>,
    mut impacts: MessageWriter<ProjectileImpact>,
) {
    for (entity, mut projectile, transform, volumes) in &mut projectiles {
        if projectile.state != ProjectileState::Traveling {
            continue;
        }
        let position = transform.translation.truncate();

        let candidates = volumes.volumes.iter().flat_map(|v| v.overlaps.iter().copied());
        for target in candidates {
            if target == projectile.owner {
                continue;
            }
            let Ok((target_transform, facing, capabilities, block)) = defenders.get(target) else {
                continue;
            };

            let blocked = capabilities.has_block
                && block.is_some_and(|b| {
                    b.guards_against(target_transform.translation.truncate(), facing.forward(), position)
                });

            if !blocked && capabilities.has_health {
                damage.write(DamageRequest {
                    source: projectile.owner,
                    target,
                    amount: projectile.damage,
                });
            }
            impacts.write(ProjectileImpact {
                projectile: entity,
                target,
                position,
                blocked,
            });

            projectile.state = ProjectileState::Hit;
            commands.entity(entity).despawn();
            break;
        }
    }
}
