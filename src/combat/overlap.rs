//! Combat domain: spatial overlap backends feeding hit volumes.
//!
//! Both backends fill `HitVolume::overlaps` with live hostile hurtboxes for
//! every enabled volume; hit resolution never queries space itself.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::combat::components::{Dead, HitVolumes, Hurtbox, Team};
use crate::movement::Facing;

/// Circle tests against hurtboxes. Used for headless runs without a physics world.
pub(crate) fn proximity_overlaps(
    mut volumes: Query<(Entity, &Transform, &Facing, &Team, &mut HitVolumes)>,
    hurtboxes: Query<(Entity, &Transform, &Hurtbox, &Team), Without<Dead>>,
) {
    for (entity, transform, facing, team, mut hit_volumes) in &mut volumes {
        let origin = transform.translation.truncate();
        let forward = facing.forward();

        for volume in &mut hit_volumes.volumes {
            volume.overlaps.clear();
            if !volume.enabled {
                continue;
            }
            let center = volume.center(origin, forward);
            for (other, other_transform, hurtbox, other_team) in &hurtboxes {
                if other == entity || !team.is_hostile_to(*other_team) {
                    continue;
                }
                let point = other_transform.translation.truncate();
                if volume.shape.touches_circle(center, forward, point, hurtbox.radius) {
                    volume.overlaps.push(other);
                }
            }
        }
    }
}

/// avian2d shape intersections filtered by the attacker's hostile layers
pub(crate) fn physics_overlaps(
    spatial: SpatialQuery,
    mut volumes: Query<(Entity, &Transform, &Facing, &Team, &mut HitVolumes)>,
    live: Query<(), (With<Hurtbox>, Without<Dead>)>,
) {
    for (entity, transform, facing, team, mut hit_volumes) in &mut volumes {
        let origin = transform.translation.truncate();
        let forward = facing.forward();
        let filter =
            SpatialQueryFilter::from_mask(team.hostile_mask()).with_excluded_entities([entity]);

        for volume in &mut hit_volumes.volumes {
            volume.overlaps.clear();
            if !volume.enabled {
                continue;
            }
            let center = volume.center(origin, forward);
            let hits = spatial.shape_intersections(
                &volume.shape.collider(),
                center,
                forward.to_angle(),
                &filter,
            );
            volume
                .overlaps
                .extend(hits.into_iter().filter(|hit| live.contains(*hit)));
        }
    }
}
