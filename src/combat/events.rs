//! Combat domain: intents coming in and notifications going out.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::content::{BossPhase, ProjectileDef, SpecialKind};

/// Decoded input intents; the only calls the input layer makes into combat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    LightAttack,
    HeavyAttack,
    StartBlock,
    StopBlock,
}

#[derive(Debug, Clone, Copy)]
pub struct CombatIntent {
    pub actor: Entity,
    pub intent: Intent,
}

impl Message for CombatIntent {}

/// Animation event opening or closing a hit volume. Opening starts a new swing.
#[derive(Debug, Clone, Copy)]
pub struct SwingWindow {
    pub actor: Entity,
    pub volume: usize,
    pub open: bool,
}

impl Message for SwingWindow {}

/// Damage routed to the damage sink
#[derive(Debug, Clone, Copy)]
pub struct DamageRequest {
    pub source: Entity,
    pub target: Entity,
    pub amount: f32,
}

impl Message for DamageRequest {}

/// Forced interrupt: cancels attacks and blocks, plays the stagger cue
#[derive(Debug, Clone, Copy)]
pub struct StaggerRequest {
    pub target: Entity,
    pub source: Entity,
}

impl Message for StaggerRequest {}

/// Ask for a projectile to be spawned
#[derive(Debug, Clone)]
pub struct ProjectileRequest {
    pub owner: Entity,
    pub origin: Vec2,
    pub direction: Vec2,
    pub damage: f32,
    pub def: ProjectileDef,
    pub homing_target: Option<Entity>,
}

impl Message for ProjectileRequest {}

/// External respawn hook: restores health and clears combat state
#[derive(Debug, Clone, Copy)]
pub struct RespawnRequest {
    pub entity: Entity,
}

impl Message for RespawnRequest {}

/// A hit that dealt damage
#[derive(Debug, Clone, Copy)]
pub struct HitLanded {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: f32,
    pub heavy: bool,
}

impl Message for HitLanded {}

/// A hit absorbed by a block
#[derive(Debug, Clone, Copy)]
pub struct BlockedHit {
    pub attacker: Entity,
    pub defender: Entity,
}

impl Message for BlockedHit {}

/// A hit turned into a parry
#[derive(Debug, Clone, Copy)]
pub struct Parried {
    pub parrier: Entity,
    pub attacker: Entity,
}

impl Message for Parried {}

#[derive(Debug, Clone, Copy)]
pub struct Staggered {
    pub entity: Entity,
    pub source: Entity,
}

impl Message for Staggered {}

#[derive(Debug, Clone, Copy)]
pub struct CombatantDied {
    pub entity: Entity,
}

impl Message for CombatantDied {}

#[derive(Debug, Clone, Copy)]
pub struct ProjectileImpact {
    pub projectile: Entity,
    pub target: Entity,
    pub position: Vec2,
    pub blocked: bool,
}

impl Message for ProjectileImpact {}

#[derive(Debug, Clone, Copy)]
pub struct BossPhaseChanged {
    pub boss: Entity,
    pub phase: BossPhase,
}

impl Message for BossPhaseChanged {}

#[derive(Debug, Clone, Copy)]
pub struct SpecialPhaseStarted {
    pub boss: Entity,
    pub kind: SpecialKind,
}

impl Message for SpecialPhaseStarted {}

#[derive(Debug, Clone, Copy)]
pub struct SpecialPhaseEnded {
    pub boss: Entity,
    pub kind: SpecialKind,
}

impl Message for SpecialPhaseEnded {}

/// Reported by a hazard when its health reaches zero
#[derive(Debug, Clone, Copy)]
pub struct HazardDestroyed {
    pub owner: Entity,
    pub hazard: Entity,
}

impl Message for HazardDestroyed {}
