//! Data definitions for the RON content files.
//!
//! These structs mirror assets/data/*.ron and are used for deserialization.
//! Every nested table carries `#[serde(default)]` so content files only need
//! to spell out what differs from the baseline tuning.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// Common wrapper for RON files with schema_version and items
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataFile<T> {
    pub schema_version: u32,
    pub items: Vec<T>,
}

// ============================================================================
// Archetypes (archetypes.ron)
// ============================================================================

/// What a spawned archetype is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Reflect)]
pub enum Role {
    Player,
    Minion,
    Boss,
    Pillar,
}

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
pub struct ArchetypeDef {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub max_health: f32,
    #[serde(default = "default_hurt_radius")]
    pub hurt_radius: f32,
    #[serde(default)]
    pub movement: MovementDef,
    #[serde(default)]
    pub weapon: WeaponDef,
    #[serde(default)]
    pub block: Option<BlockDef>,
    #[serde(default)]
    pub ai: Option<AiDef>,
    #[serde(default)]
    pub attacks: AttackSet,
    #[serde(default)]
    pub boss: Option<BossDef>,
    #[serde(default)]
    pub hazard: Option<HazardDef>,
    #[serde(default)]
    pub patrol: Option<PatrolDef>,
}

fn default_hurt_radius() -> f32 {
    0.5
}

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct MovementDef {
    pub move_speed: f32,
    /// Degrees per second the actor may turn toward its target
    pub turn_rate_deg: f32,
}

impl Default for MovementDef {
    fn default() -> Self {
        Self {
            move_speed: 2.5,
            turn_rate_deg: 720.0,
        }
    }
}

// ============================================================================
// Weapons and hit volumes
// ============================================================================

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Reflect)]
pub enum ShapeDef {
    Circle { radius: f32 },
    Box { half_width: f32, half_height: f32 },
}

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct HitVolumeDef {
    pub shape: ShapeDef,
    /// Offset from the owner; x is measured along the facing direction
    pub offset: (f32, f32),
}

impl Default for HitVolumeDef {
    fn default() -> Self {
        Self {
            shape: ShapeDef::Circle { radius: 0.8 },
            offset: (1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct WeaponDef {
    pub base_damage: f32,
    pub heavy_multiplier: f32,
    pub light_clips: Vec<String>,
    pub heavy_clip: String,
    pub volumes: Vec<HitVolumeDef>,
    /// Present for bows and staves; light requests fire instead of swinging
    pub ranged: Option<RangedWeaponDef>,
}

impl Default for WeaponDef {
    fn default() -> Self {
        Self {
            base_damage: 5.0,
            heavy_multiplier: 2.0,
            light_clips: vec!["Light1".into(), "Light2".into(), "Light3".into()],
            heavy_clip: "Heavy".into(),
            volumes: vec![HitVolumeDef::default()],
            ranged: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct RangedWeaponDef {
    pub fire_cooldown: f32,
    pub damage: f32,
    pub projectile: ProjectileDef,
}

impl Default for RangedWeaponDef {
    fn default() -> Self {
        Self {
            fire_cooldown: 0.5,
            damage: 5.0,
            projectile: ProjectileDef::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct ProjectileDef {
    pub speed: f32,
    pub lifetime: f32,
    pub radius: f32,
    /// Blend rate toward the target, per second
    pub turn_rate: f32,
}

impl Default for ProjectileDef {
    fn default() -> Self {
        Self {
            speed: 12.0,
            lifetime: 5.0,
            radius: 0.3,
            turn_rate: 3.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct BlockDef {
    pub parry_window: f32,
    pub guard_half_angle_deg: f32,
}

impl Default for BlockDef {
    fn default() -> Self {
        Self {
            parry_window: 0.2,
            guard_half_angle_deg: 60.0,
        }
    }
}

// ============================================================================
// AI tuning
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct AiDef {
    pub detection_range: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub block_chance: f32,
    pub block_duration: (f32, f32),
}

impl Default for AiDef {
    fn default() -> Self {
        Self {
            detection_range: 8.0,
            attack_range: 2.0,
            attack_cooldown: 1.2,
            block_chance: 0.2,
            block_duration: (0.5, 1.2),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, Reflect)]
pub enum PatrolModeDef {
    #[default]
    Loop,
    PingPong,
}

/// Waypoint route walked while no target is in range
#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct PatrolDef {
    /// Offsets from the spawn position
    pub waypoints: Vec<(f32, f32)>,
    pub mode: PatrolModeDef,
    /// Seconds spent at each waypoint
    pub wait: f32,
    pub reach_distance: f32,
}

impl Default for PatrolDef {
    fn default() -> Self {
        Self {
            waypoints: Vec::new(),
            mode: PatrolModeDef::Loop,
            wait: 1.0,
            reach_distance: 0.5,
        }
    }
}

/// Every attack an archetype can perform. Missing entries mean the
/// scheduler never picks that attack.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct AttackSet {
    pub basic: BasicAttackDef,
    pub heavy_combo: Option<HeavyComboDef>,
    pub ranged: Option<RangedAttackDef>,
    pub spell: Option<SpellAttackDef>,
    pub slam: Option<SlamAttackDef>,
    pub summon: Option<SummonDef>,
    pub pillars: Option<PillarPhaseDef>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct BasicAttackDef {
    pub heavy_chance: f32,
}

impl Default for BasicAttackDef {
    fn default() -> Self {
        Self { heavy_chance: 0.25 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct HeavyComboDef {
    pub follow_up_delay: f32,
    pub combo_chance: f32,
    pub cooldown_multiplier: f32,
    pub min_phase: BossPhase,
}

impl Default for HeavyComboDef {
    fn default() -> Self {
        Self {
            follow_up_delay: 0.4,
            combo_chance: 0.4,
            cooldown_multiplier: 0.7,
            min_phase: BossPhase::Phase2,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct RangedAttackDef {
    pub damage: f32,
    pub cooldown: f32,
    pub range: f32,
    pub windup: f32,
    pub burst_gap: f32,
    pub spread_deg: f32,
    pub fan_damage_scale: f32,
    /// Phase from which the three-shot fan replaces the single shot
    pub fan_phase: BossPhase,
    pub projectile: Option<ProjectileDef>,
}

impl Default for RangedAttackDef {
    fn default() -> Self {
        Self {
            damage: 15.0,
            cooldown: 3.5,
            range: 10.0,
            windup: 0.5,
            burst_gap: 0.12,
            spread_deg: 15.0,
            fan_damage_scale: 1.0,
            fan_phase: BossPhase::Phase2,
            projectile: Some(ProjectileDef::default()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct SpellAttackDef {
    pub damage: f32,
    pub cooldown: f32,
    pub range: f32,
    pub radius: f32,
    pub delay: f32,
    pub drop_height: f32,
    /// Fraction of the ranged cooldown re-applied when the spell lands
    pub ranged_suppression: f32,
    pub min_phase: BossPhase,
}

impl Default for SpellAttackDef {
    fn default() -> Self {
        Self {
            damage: 30.0,
            cooldown: 6.0,
            range: 10.0,
            radius: 4.0,
            delay: 1.2,
            drop_height: 8.0,
            ranged_suppression: 0.5,
            min_phase: BossPhase::Phase2,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct SlamAttackDef {
    pub damage: f32,
    pub cooldown: f32,
    pub radius: f32,
    pub charge_time: f32,
    pub flash_start: f32,
    pub flash_end: f32,
    pub recovery: f32,
    pub min_phase: BossPhase,
}

impl Default for SlamAttackDef {
    fn default() -> Self {
        Self {
            damage: 40.0,
            cooldown: 8.0,
            radius: 3.0,
            charge_time: 1.5,
            flash_start: 0.4,
            flash_end: 0.05,
            recovery: 0.5,
            min_phase: BossPhase::Phase3,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct SummonDef {
    pub count: u32,
    pub ring_radius: f32,
    pub cast_delay: f32,
    pub shoot_interval: f32,
    pub turn_rate_deg: f32,
    pub minion_pool: Vec<String>,
}

impl Default for SummonDef {
    fn default() -> Self {
        Self {
            count: 3,
            ring_radius: 3.0,
            cast_delay: 1.0,
            shoot_interval: 2.0,
            turn_rate_deg: 720.0,
            minion_pool: vec!["grunt".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct PillarPhaseDef {
    pub count: u32,
    pub ring_radius: f32,
    pub cast_delay: f32,
    pub pillar: String,
    pub ranged_cooldown: f32,
    pub windup: f32,
    pub burst_gap: f32,
}

impl Default for PillarPhaseDef {
    fn default() -> Self {
        Self {
            count: 4,
            ring_radius: 4.0,
            cast_delay: 1.0,
            pillar: "pillar".into(),
            ranged_cooldown: 1.5,
            windup: 0.4,
            burst_gap: 0.1,
        }
    }
}

// ============================================================================
// Bosses
// ============================================================================

/// Boss phases, ordered. Transitions only ever move forward.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize, Reflect,
)]
pub enum BossPhase {
    #[default]
    Phase1,
    Phase2,
    Phase3,
}

impl BossPhase {
    pub fn next(self) -> Option<BossPhase> {
        match self {
            BossPhase::Phase1 => Some(BossPhase::Phase2),
            BossPhase::Phase2 => Some(BossPhase::Phase3),
            BossPhase::Phase3 => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Reflect)]
pub enum SpecialKind {
    PillarBarrage,
    SummonMinions,
}

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
pub struct PhaseDef {
    pub phase: BossPhase,
    /// Health fraction at or below which the phase begins
    pub threshold: f32,
    #[serde(default = "default_cooldown_multiplier")]
    pub cooldown_multiplier: f32,
    #[serde(default)]
    pub block_chance: Option<f32>,
    #[serde(default)]
    pub speed_bonus: f32,
}

fn default_cooldown_multiplier() -> f32 {
    0.7
}

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct BossDef {
    pub phases: Vec<PhaseDef>,
    pub special_interval: f32,
    pub special_rotation: Vec<SpecialKind>,
    pub transition_duration: f32,
}

impl Default for BossDef {
    fn default() -> Self {
        Self {
            phases: vec![
                PhaseDef {
                    phase: BossPhase::Phase2,
                    threshold: 0.5,
                    cooldown_multiplier: 0.7,
                    block_chance: Some(0.4),
                    speed_bonus: 1.0,
                },
                PhaseDef {
                    phase: BossPhase::Phase3,
                    threshold: 0.25,
                    cooldown_multiplier: 0.7,
                    block_chance: None,
                    speed_bonus: 0.5,
                },
            ],
            special_interval: 30.0,
            special_rotation: vec![SpecialKind::PillarBarrage, SpecialKind::SummonMinions],
            transition_duration: 3.0,
        }
    }
}

// ============================================================================
// Hazards
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
#[serde(default)]
pub struct HazardDef {
    pub rise_distance: f32,
    pub rise_duration: f32,
}

impl Default for HazardDef {
    fn default() -> Self {
        Self {
            rise_distance: 2.0,
            rise_duration: 0.6,
        }
    }
}
