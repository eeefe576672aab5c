//! Combat domain: plugin wiring, system ordering, and public exports.

pub mod ai;
mod animation;
mod block;
mod combo;
mod components;
mod events;
mod hits;
mod overlap;
mod projectile;
mod resources;
mod spawn;
mod systems;

#[cfg(test)]
mod tests;

pub use animation::{AnimationCues, ClipRequest, HeadlessAnimator, cue};
pub use block::BlockController;
pub use combo::{ComboController, ComboTick, RangedFire, RequestOutcome, StrikeKind};
pub use components::{
    Capabilities, Combatant, CombatantState, Cooldowns, Dead, Health, HitShape, HitVolume,
    HitVolumes, Hurtbox, Invulnerable, LockHolder, Pushback, Stagger, Team, Weapon,
};
pub use events::{
    BlockedHit, BossPhaseChanged, CombatIntent, CombatantDied, DamageRequest, HazardDestroyed,
    HitLanded, Intent, Parried, ProjectileImpact, ProjectileRequest, RespawnRequest,
    SpecialPhaseEnded, SpecialPhaseStarted, StaggerRequest, Staggered, SwingWindow,
};
pub use hits::{DefenderView, HitOutcome, Strike, resolve_strike};
pub use projectile::{Homing, Projectile, ProjectileState, steer};
pub use resources::{CombatTuning, OverlapBackend, SimRng};
pub use spawn::{CombatantBundle, patrol_route, spawn_archetype, spawn_combatant};

use bevy::prelude::*;

use crate::combat::ai::{
    TaskEffects, animate_telegraphs, apply_task_effects, decide_enemies, finish_special_phases,
    raise_hazards, remove_destroyed_hazards, report_hazard_deaths, reset_bosses_on_respawn,
    reset_brains_on_respawn, run_attack_tasks, update_boss_phases,
};
use crate::combat::animation::drive_headless_animation;
use crate::combat::block::tick_blocks;
use crate::combat::combo::{advance_combos, apply_intents, tick_fire_cooldowns};
use crate::combat::hits::resolve_melee_hits;
use crate::combat::overlap::{physics_overlaps, proximity_overlaps};
use crate::combat::projectile::{move_projectiles, resolve_projectile_hits, spawn_projectiles};
use crate::combat::systems::{
    apply_damage, apply_staggers, apply_swing_windows, process_deaths, process_respawns,
    update_combat_timers,
};

/// Per-tick combat order. Every set runs after the one before it.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatSet {
    Timers,
    Intents,
    Decide,
    Tasks,
    Effects,
    Movement,
    Combos,
    Swings,
    Projectiles,
    Overlap,
    Resolve,
    Damage,
    Deaths,
    Bookkeeping,
}

pub struct CombatPlugin {
    pub overlap: OverlapBackend,
    /// Drive animation cues with fixed-length clips instead of a renderer
    pub headless_animation: bool,
}

impl Default for CombatPlugin {
    fn default() -> Self {
        Self {
            overlap: OverlapBackend::Proximity,
            headless_animation: true,
        }
    }
}

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CombatTuning>()
            .init_resource::<SimRng>()
            .insert_resource(self.overlap)
            .add_message::<CombatIntent>()
            .add_message::<SwingWindow>()
            .add_message::<DamageRequest>()
            .add_message::<StaggerRequest>()
            .add_message::<ProjectileRequest>()
            .add_message::<RespawnRequest>()
            .add_message::<HitLanded>()
            .add_message::<BlockedHit>()
            .add_message::<Parried>()
            .add_message::<Staggered>()
            .add_message::<CombatantDied>()
            .add_message::<ProjectileImpact>()
            .add_message::<BossPhaseChanged>()
            .add_message::<SpecialPhaseStarted>()
            .add_message::<SpecialPhaseEnded>()
            .add_message::<HazardDestroyed>()
            .add_message::<TaskEffects>()
            .configure_sets(
                Update,
                (
                    CombatSet::Timers,
                    CombatSet::Intents,
                    CombatSet::Decide,
                    CombatSet::Tasks,
                    CombatSet::Effects,
                    CombatSet::Movement,
                    CombatSet::Combos,
                    CombatSet::Swings,
                    CombatSet::Projectiles,
                    CombatSet::Overlap,
                    CombatSet::Resolve,
                    CombatSet::Damage,
                    CombatSet::Deaths,
                    CombatSet::Bookkeeping,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (update_combat_timers, tick_blocks, tick_fire_cooldowns).in_set(CombatSet::Timers),
            )
            .add_systems(Update, apply_intents.in_set(CombatSet::Intents))
            .add_systems(
                Update,
                (update_boss_phases, decide_enemies)
                    .chain()
                    .in_set(CombatSet::Decide),
            )
            .add_systems(
                Update,
                (run_attack_tasks, finish_special_phases)
                    .chain()
                    .in_set(CombatSet::Tasks),
            )
            .add_systems(
                Update,
                (apply_task_effects, animate_telegraphs, raise_hazards).in_set(CombatSet::Effects),
            )
            .add_systems(Update, advance_combos.in_set(CombatSet::Combos))
            .add_systems(Update, apply_swing_windows.in_set(CombatSet::Swings))
            .add_systems(
                Update,
                (spawn_projectiles, move_projectiles)
                    .chain()
                    .in_set(CombatSet::Projectiles),
            )
            .add_systems(
                Update,
                (resolve_melee_hits, resolve_projectile_hits).in_set(CombatSet::Resolve),
            )
            .add_systems(
                Update,
                (apply_staggers, apply_damage)
                    .chain()
                    .in_set(CombatSet::Damage),
            )
            .add_systems(
                Update,
                (process_deaths, report_hazard_deaths)
                    .chain()
                    .in_set(CombatSet::Deaths),
            )
            .add_systems(
                Update,
                (
                    remove_destroyed_hazards,
                    (process_respawns, reset_brains_on_respawn, reset_bosses_on_respawn).chain(),
                )
                    .in_set(CombatSet::Bookkeeping),
            );

        match self.overlap {
            OverlapBackend::Physics => {
                app.add_systems(Update, physics_overlaps.in_set(CombatSet::Overlap));
            }
            OverlapBackend::Proximity => {
                app.add_systems(Update, proximity_overlaps.in_set(CombatSet::Overlap));
            }
        }

        if self.headless_animation {
            app.add_systems(
                Update,
                (attach_headless_animators, drive_headless_animation)
                    .chain()
                    .in_set(CombatSet::Timers),
            );
        }
    }
}

fn attach_headless_animators(
    mut commands: Commands,
    query: Query<Entity, (Added<AnimationCues>, Without<HeadlessAnimator>)>,
) {
    for entity in &query {
        commands.entity(entity).insert(HeadlessAnimator::default());
    }
}
