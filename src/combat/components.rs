//! Combat domain: components and combat-related state types.

use avian2d::prelude::*;
use bevy::prelude::*;
use std::collections::HashSet;

use crate::movement::GameLayer;

/// Marks an entity as a combat participant spawned from an archetype
#[derive(Component, Debug, Clone)]
pub struct Combatant {
    pub archetype: String,
}

/// Health component for damageable entities
#[derive(Component, Debug, Clone)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Applies damage clamped at zero and returns the amount actually removed.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if amount <= 0.0 {
            return 0.0;
        }
        let actual = amount.min(self.current);
        self.current -= actual;
        actual
    }

    pub fn heal(&mut self, amount: f32) -> f32 {
        let actual = amount.max(0.0).min(self.max - self.current);
        self.current += actual;
        actual
    }

    pub fn reset(&mut self) {
        self.current = self.max;
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn percent(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.current / self.max
    }
}

/// Stagger state - entity cannot act while staggered
#[derive(Component, Debug, Default)]
pub struct Stagger {
    pub timer: f32,
}

impl Stagger {
    pub fn is_staggered(&self) -> bool {
        self.timer > 0.0
    }
}

/// Invulnerability - entity cannot take damage.
///
/// `held` is toggled by attack tasks and phase transitions; `timer` covers
/// short timed windows.
#[derive(Component, Debug, Default)]
pub struct Invulnerable {
    pub timer: f32,
    pub held: bool,
}

impl Invulnerable {
    pub fn is_invulnerable(&self) -> bool {
        self.held || self.timer > 0.0
    }
}

/// Terminal marker; dead combatants are skipped by every combat system
#[derive(Component, Debug)]
pub struct Dead;

/// Team affiliation to prevent friendly fire
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
    Player,
    Enemy,
}

impl Team {
    pub fn layer(&self) -> GameLayer {
        match self {
            Team::Player => GameLayer::Player,
            Team::Enemy => GameLayer::Enemy,
        }
    }

    /// Layer mask this team's attacks are allowed to hit
    pub fn hostile_mask(&self) -> LayerMask {
        match self {
            Team::Player => GameLayer::Enemy.into(),
            Team::Enemy => GameLayer::Player.into(),
        }
    }

    pub fn is_hostile_to(&self, other: Team) -> bool {
        *self != other
    }
}

/// Capabilities resolved once at spawn instead of probing components per hit
#[derive(Component, Debug, Clone, Copy)]
pub struct Capabilities {
    pub has_block: bool,
    pub has_health: bool,
}

/// Who currently owns a combatant's attack lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockHolder {
    /// A combo sequence started directly by an intent
    Combo,
    /// An AI attack task; any combo it drives runs under this lock
    Task,
}

/// Per-actor cooldowns, decremented every tick and floored at zero
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cooldowns {
    pub ranged: f32,
    pub spell: f32,
    pub slam: f32,
    pub summon: f32,
}

impl Cooldowns {
    pub fn tick(&mut self, dt: f32) {
        self.ranged = (self.ranged - dt).max(0.0);
        self.spell = (self.spell - dt).max(0.0);
        self.slam = (self.slam - dt).max(0.0);
        self.summon = (self.summon - dt).max(0.0);
    }
}

/// Mutable per-combatant attack bookkeeping
#[derive(Component, Debug, Default)]
pub struct CombatantState {
    pub lock: Option<LockHolder>,
    pub cooldowns: Cooldowns,
    pub rooted: bool,
}

impl CombatantState {
    pub fn attack_lock(&self) -> bool {
        self.lock.is_some()
    }

    /// Claims the lock; fails if anyone already holds it.
    pub fn acquire(&mut self, holder: LockHolder) -> bool {
        if self.lock.is_some() {
            return false;
        }
        self.lock = Some(holder);
        true
    }

    /// Releases the lock only if `holder` owns it.
    pub fn release(&mut self, holder: LockHolder) {
        if self.lock == Some(holder) {
            self.lock = None;
        }
    }
}

/// Shape of a hit volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitShape {
    Circle { radius: f32 },
    Box { half_extents: Vec2 },
}

impl HitShape {
    pub fn collider(&self) -> Collider {
        match *self {
            HitShape::Circle { radius } => Collider::circle(radius),
            HitShape::Box { half_extents } => {
                Collider::rectangle(half_extents.x * 2.0, half_extents.y * 2.0)
            }
        }
    }

    /// Whether a circle at `point` with `radius` touches this shape centered at
    /// `center`; boxes are aligned with `forward`.
    pub fn touches_circle(&self, center: Vec2, forward: Vec2, point: Vec2, radius: f32) -> bool {
        match *self {
            HitShape::Circle { radius: own } => center.distance(point) <= own + radius,
            HitShape::Box { half_extents } => {
                let delta = point - center;
                let local = Vec2::new(delta.dot(forward), delta.dot(forward.perp()));
                let closest = local.clamp(-half_extents, half_extents);
                local.distance(closest) <= radius
            }
        }
    }
}

/// A melee or projectile hit volume; enabled only during a swing
#[derive(Debug, Clone)]
pub struct HitVolume {
    pub shape: HitShape,
    /// Offset from the owner, x measured along facing
    pub offset: Vec2,
    pub enabled: bool,
    /// Filled each tick by the overlap backend
    pub overlaps: Vec<Entity>,
}

impl HitVolume {
    pub fn new(shape: HitShape, offset: Vec2) -> Self {
        Self {
            shape,
            offset,
            enabled: false,
            overlaps: Vec::new(),
        }
    }

    /// World-space center given the owner's position and facing
    pub fn center(&self, origin: Vec2, forward: Vec2) -> Vec2 {
        let side = forward.perp();
        origin + forward * self.offset.x + side * self.offset.y
    }
}

/// All hit volumes of an attacker plus the per-swing hit set
#[derive(Component, Debug, Default)]
pub struct HitVolumes {
    pub volumes: Vec<HitVolume>,
    /// Targets already resolved during the current swing
    pub struck: HashSet<Entity>,
}

impl HitVolumes {
    /// Opens a swing on `index`, clearing the hit set.
    pub fn open_swing(&mut self, index: usize) -> bool {
        let Some(volume) = self.volumes.get_mut(index) else {
            return false;
        };
        volume.enabled = true;
        volume.overlaps.clear();
        self.struck.clear();
        true
    }

    pub fn close_swing(&mut self, index: usize) {
        if let Some(volume) = self.volumes.get_mut(index) {
            volume.enabled = false;
            volume.overlaps.clear();
        }
    }

    pub fn disable_all(&mut self) {
        for volume in &mut self.volumes {
            volume.enabled = false;
            volume.overlaps.clear();
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.volumes.iter().any(|v| v.enabled)
    }

    /// Records a target for this swing; false if it was already resolved.
    pub fn mark_struck(&mut self, target: Entity) -> bool {
        self.struck.insert(target)
    }
}

/// Hurtbox - circle that hit volumes and projectiles test against
#[derive(Component, Debug, Clone, Copy)]
pub struct Hurtbox {
    pub radius: f32,
}

/// Weapon damage numbers
#[derive(Component, Debug, Clone, Copy)]
pub struct Weapon {
    pub base_damage: f32,
    pub heavy_multiplier: f32,
}

impl Weapon {
    pub fn damage(&self, heavy: bool) -> f32 {
        if heavy {
            self.base_damage * self.heavy_multiplier
        } else {
            self.base_damage
        }
    }
}

/// Push-back velocity applied on blocked hits, decays every tick
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Pushback {
    pub velocity: Vec2,
}
