//! Combat domain: spawning combatants from archetype data.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::combat::ai::{Arsenal, BossScheduler, Brain, HazardSet, TaskSlot};
use crate::combat::animation::AnimationCues;
use crate::combat::block::BlockController;
use crate::combat::combo::ComboController;
use crate::combat::components::{
    Capabilities, Combatant, CombatantState, Health, HitShape, HitVolume, HitVolumes, Hurtbox,
    Invulnerable, Pushback, Stagger, Team, Weapon,
};
use crate::content::{ArchetypeDef, PatrolDef, PatrolModeDef, ShapeDef};
use crate::movement::{Facing, Footing, GameLayer, Locomotion, PatrolMode, PatrolRoute};

/// Everything a combatant needs regardless of who controls it
#[derive(Bundle)]
pub struct CombatantBundle {
    pub combatant: Combatant,
    pub health: Health,
    pub stagger: Stagger,
    pub invulnerable: Invulnerable,
    pub state: CombatantState,
    pub capabilities: Capabilities,
    pub team: Team,
    pub hurtbox: Hurtbox,
    pub facing: Facing,
    pub footing: Footing,
    pub locomotion: Locomotion,
    pub pushback: Pushback,
    pub cues: AnimationCues,
    pub volumes: HitVolumes,
    pub weapon: Weapon,
    pub combo: ComboController,
    pub transform: Transform,
}

impl CombatantBundle {
    pub fn new(def: &ArchetypeDef, position: Vec2, team: Team) -> Self {
        let volumes = def
            .weapon
            .volumes
            .iter()
            .map(|v| {
                let shape = match v.shape {
                    ShapeDef::Circle { radius } => HitShape::Circle { radius },
                    ShapeDef::Box {
                        half_width,
                        half_height,
                    } => HitShape::Box {
                        half_extents: Vec2::new(half_width, half_height),
                    },
                };
                HitVolume::new(shape, Vec2::new(v.offset.0, v.offset.1))
            })
            .collect::<Vec<_>>();

        let mut combo = ComboController::new(
            def.weapon.light_clips.clone(),
            def.weapon.heavy_clip.clone(),
            volumes.len(),
        );
        if let Some(ranged) = &def.weapon.ranged {
            combo = combo.with_ranged(ranged);
        }

        Self {
            combatant: Combatant {
                archetype: def.id.clone(),
            },
            health: Health::new(def.max_health),
            stagger: Stagger::default(),
            invulnerable: Invulnerable::default(),
            state: CombatantState::default(),
            capabilities: Capabilities {
                has_block: def.block.is_some(),
                has_health: def.max_health > 0.0,
            },
            team,
            hurtbox: Hurtbox {
                radius: def.hurt_radius,
            },
            facing: Facing::default(),
            footing: Footing::default(),
            locomotion: Locomotion {
                direction: Vec2::ZERO,
                speed: def.movement.move_speed,
            },
            pushback: Pushback::default(),
            cues: AnimationCues::default(),
            volumes: HitVolumes {
                volumes,
                ..default()
            },
            weapon: Weapon {
                base_damage: def.weapon.base_damage,
                heavy_multiplier: def.weapon.heavy_multiplier,
            },
            combo,
            transform: Transform::from_translation(position.extend(0.0)),
        }
    }
}

/// Spawns a combatant with its hurtbox collider on the team's layer.
pub fn spawn_combatant(
    commands: &mut Commands,
    def: &ArchetypeDef,
    position: Vec2,
    team: Team,
) -> Entity {
    let mut entity = commands.spawn((
        CombatantBundle::new(def, position, team),
        RigidBody::Kinematic,
        Collider::circle(def.hurt_radius),
        Sensor,
        CollisionLayers::new(team.layer(), [GameLayer::Ground]),
    ));
    if let Some(block) = &def.block {
        entity.insert(BlockController::new(
            block.parry_window,
            block.guard_half_angle_deg,
        ));
    }
    entity.id()
}

/// Spawns a combatant plus whatever AI its archetype calls for: a brain and
/// task slot when it has AI tuning, a phase scheduler when it is a boss.
pub fn spawn_archetype(
    commands: &mut Commands,
    def: &ArchetypeDef,
    position: Vec2,
    team: Team,
) -> Entity {
    let entity = spawn_combatant(commands, def, position, team);
    if let Some(ai) = &def.ai {
        commands.entity(entity).insert((
            Brain::new(ai, def.movement.turn_rate_deg),
            Arsenal {
                attacks: def.attacks.clone(),
            },
            TaskSlot::default(),
        ));
        if let Some(patrol) = &def.patrol {
            commands.entity(entity).insert(patrol_route(patrol, position));
        }
    }
    if let Some(boss) = &def.boss {
        commands
            .entity(entity)
            .insert((BossScheduler::new(boss), HazardSet::default()));
    }
    debug!("Spawned '{}' as {:?} at {:?}", def.id, entity, position);
    entity
}

/// Route with waypoints anchored at the spawn position
pub fn patrol_route(def: &PatrolDef, origin: Vec2) -> PatrolRoute {
    let waypoints = def
        .waypoints
        .iter()
        .map(|&(x, y)| origin + Vec2::new(x, y))
        .collect();
    let mode = match def.mode {
        PatrolModeDef::Loop => PatrolMode::Loop,
        PatrolModeDef::PingPong => PatrolMode::PingPong,
    };
    PatrolRoute {
        wait: def.wait,
        reach_distance: def.reach_distance,
        ..PatrolRoute::new(waypoints, mode)
    }
}
