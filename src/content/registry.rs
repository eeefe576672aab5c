//! ArchetypeRegistry resource providing lookups for all loaded archetypes.

use bevy::prelude::*;
use std::collections::HashMap;

use super::data::*;

/// Central registry for combatant archetypes, keyed by id.
#[derive(Resource, Default, Debug, Clone)]
pub struct ArchetypeRegistry {
    pub archetypes: HashMap<String, ArchetypeDef>,
}

impl ArchetypeRegistry {
    pub fn get(&self, id: &str) -> Option<&ArchetypeDef> {
        self.archetypes.get(id)
    }

    pub fn insert(&mut self, def: ArchetypeDef) {
        self.archetypes.insert(def.id.clone(), def);
    }

    /// Returns a summary of loaded content counts for logging.
    pub fn summary(&self) -> String {
        let count = |role: Role| self.archetypes.values().filter(|a| a.role == role).count();
        format!(
            "ArchetypeRegistry loaded:\n\
             - Players: {}\n\
             - Minions: {}\n\
             - Bosses: {}\n\
             - Pillars: {}",
            count(Role::Player),
            count(Role::Minion),
            count(Role::Boss),
            count(Role::Pillar),
        )
    }

    /// Baseline roster used when no content directory is configured or the
    /// files on disk fail to load.
    pub fn builtin() -> Self {
        let mut registry = Self::default();

        registry.insert(ArchetypeDef {
            id: "knight".into(),
            name: "Knight".into(),
            role: Role::Player,
            max_health: 100.0,
            hurt_radius: 0.5,
            movement: MovementDef {
                move_speed: 5.0,
                ..default()
            },
            weapon: WeaponDef {
                base_damage: 10.0,
                ..default()
            },
            block: Some(BlockDef::default()),
            ai: None,
            attacks: AttackSet::default(),
            boss: None,
            hazard: None,
            patrol: None,
        });

        registry.insert(ArchetypeDef {
            id: "grunt".into(),
            name: "Grunt".into(),
            role: Role::Minion,
            max_health: 30.0,
            hurt_radius: 0.5,
            movement: MovementDef::default(),
            weapon: WeaponDef::default(),
            block: Some(BlockDef::default()),
            ai: Some(AiDef::default()),
            attacks: AttackSet::default(),
            boss: None,
            hazard: None,
            patrol: None,
        });

        registry.insert(ArchetypeDef {
            id: "warden".into(),
            name: "Warden".into(),
            role: Role::Boss,
            max_health: 400.0,
            hurt_radius: 0.9,
            movement: MovementDef {
                move_speed: 3.0,
                ..default()
            },
            weapon: WeaponDef {
                base_damage: 12.0,
                volumes: vec![HitVolumeDef {
                    shape: ShapeDef::Box {
                        half_width: 1.0,
                        half_height: 0.8,
                    },
                    offset: (1.2, 0.0),
                }],
                ..default()
            },
            block: Some(BlockDef::default()),
            ai: Some(AiDef {
                detection_range: 14.0,
                attack_range: 2.5,
                ..default()
            }),
            attacks: AttackSet {
                basic: BasicAttackDef::default(),
                heavy_combo: Some(HeavyComboDef::default()),
                ranged: Some(RangedAttackDef::default()),
                spell: Some(SpellAttackDef::default()),
                slam: Some(SlamAttackDef::default()),
                summon: Some(SummonDef::default()),
                pillars: Some(PillarPhaseDef::default()),
            },
            boss: Some(BossDef::default()),
            hazard: None,
            patrol: None,
        });

        registry.insert(ArchetypeDef {
            id: "pillar".into(),
            name: "Pillar".into(),
            role: Role::Pillar,
            max_health: 50.0,
            hurt_radius: 0.6,
            movement: MovementDef {
                move_speed: 0.0,
                turn_rate_deg: 0.0,
            },
            weapon: WeaponDef {
                volumes: Vec::new(),
                ..default()
            },
            block: None,
            ai: None,
            attacks: AttackSet::default(),
            boss: None,
            hazard: Some(HazardDef::default()),
            patrol: None,
        });

        registry
    }
}
