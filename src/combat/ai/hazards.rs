//! Hazards: pillars and summoned minions owned by a boss special phase.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use std::collections::HashSet;

use crate::combat::events::{CombatantDied, HazardDestroyed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardKind {
    Pillar,
    Minion,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Hazard {
    pub owner: Entity,
    pub kind: HazardKind,
}

/// Live hazards the owner is waiting on
#[derive(Component, Debug, Default)]
pub struct HazardSet {
    live: HashSet<Entity>,
}

impl HazardSet {
    pub fn insert(&mut self, hazard: Entity) {
        self.live.insert(hazard);
    }

    /// Removing an unknown or already removed hazard is a no-op
    pub fn remove(&mut self, hazard: Entity) -> bool {
        self.live.remove(&hazard)
    }

    /// Forget every hazard. Used when the owner respawns.
    pub fn clear(&mut self) {
        self.live.clear();
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn contains(&self, hazard: Entity) -> bool {
        self.live.contains(&hazard)
    }
}

/// Pillars rise out of the ground over a short duration
#[derive(Component, Debug, Clone)]
pub struct HazardRise {
    pub elapsed: f32,
    pub duration: f32,
    pub distance: f32,
    pub base_y: f32,
}

impl HazardRise {
    pub fn offset(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.distance;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.distance * smoothstep(t)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

pub fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

pub(crate) fn raise_hazards(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut HazardRise)>,
) {
    let dt = time.delta_secs();
    for (entity, mut transform, mut rise) in &mut query {
        rise.elapsed += dt;
        transform.translation.y = rise.base_y - rise.distance + rise.offset();
        if rise.is_finished() {
            commands.entity(entity).remove::<HazardRise>();
        }
    }
}

/// Dead hazards are reported to their owner and removed from the world.
pub(crate) fn report_hazard_deaths(
    mut commands: Commands,
    mut deaths: MessageReader<CombatantDied>,
    hazards: Query<&Hazard>,
    mut destroyed: MessageWriter<HazardDestroyed>,
) {
    for died in deaths.read() {
        let Ok(hazard) = hazards.get(died.entity) else {
            continue;
        };
        destroyed.write(HazardDestroyed {
            owner: hazard.owner,
            hazard: died.entity,
        });
        commands.entity(died.entity).despawn();
    }
}

pub(crate) fn remove_destroyed_hazards(
    mut destroyed: MessageReader<HazardDestroyed>,
    mut owners: Query<&mut HazardSet>,
) {
    for event in destroyed.read() {
        let Ok(mut set) = owners.get_mut(event.owner) else {
            continue;
        };
        if set.remove(event.hazard) {
            debug!(
                "{:?} hazard {:?} destroyed, {} left",
                event.owner,
                event.hazard,
                set.len()
            );
        }
    }
}
