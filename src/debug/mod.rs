//! Debug tooling for fast iteration (dev-tools feature).
//!
//! - Combat log of every hit, block, parry, stagger and boss event
//! - Periodic status line for each living boss
//! - Player invincibility toggle

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::combat::ai::{BossScheduler, Brain};
use crate::combat::{
    BlockedHit, BossPhaseChanged, CombatantDied, Dead, Health, HitLanded, Invulnerable, Parried,
    ProjectileImpact, SpecialPhaseEnded, SpecialPhaseStarted, Staggered,
};
use crate::movement::Player;

#[derive(Resource, Debug)]
pub struct DebugState {
    /// Log combat notifications as they happen
    pub combat_log: bool,
    /// Seconds between boss status lines; zero disables them
    pub status_interval: f32,
    pub invincible: bool,
    status_timer: f32,
}

impl Default for DebugState {
    fn default() -> Self {
        Self {
            combat_log: true,
            status_interval: 5.0,
            invincible: false,
            status_timer: 0.0,
        }
    }
}

pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugState>().add_systems(
            PostUpdate,
            (
                log_combat_events.run_if(|state: Res<DebugState>| state.combat_log),
                log_boss_status,
                apply_invincibility,
            ),
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn log_combat_events(
    mut hits: MessageReader<HitLanded>,
    mut blocks: MessageReader<BlockedHit>,
    mut parries: MessageReader<Parried>,
    mut staggers: MessageReader<Staggered>,
    mut impacts: MessageReader<ProjectileImpact>,
    mut deaths: MessageReader<CombatantDied>,
    mut phases: MessageReader<BossPhaseChanged>,
    mut specials_started: MessageReader<SpecialPhaseStarted>,
    mut specials_ended: MessageReader<SpecialPhaseEnded>,
) {
    for hit in hits.read() {
        let kind = if hit.heavy { "heavy" } else { "light" };
        info!(
            "[combat] {:?} {} hit {:?} for {:.1}",
            hit.attacker, kind, hit.target, hit.damage
        );
    }
    for block in blocks.read() {
        info!("[combat] {:?} blocked {:?}", block.defender, block.attacker);
    }
    for parry in parries.read() {
        info!("[combat] {:?} parried {:?}", parry.parrier, parry.attacker);
    }
    for stagger in staggers.read() {
        info!("[combat] {:?} staggered by {:?}", stagger.entity, stagger.source);
    }
    for impact in impacts.read() {
        let outcome = if impact.blocked { "blocked" } else { "hit" };
        info!(
            "[combat] projectile {:?} {} {:?} at {:?}",
            impact.projectile, outcome, impact.target, impact.position
        );
    }
    for death in deaths.read() {
        info!("[combat] {:?} died", death.entity);
    }
    for phase in phases.read() {
        info!("[boss] {:?} -> {:?}", phase.boss, phase.phase);
    }
    for special in specials_started.read() {
        info!("[boss] {:?} special {:?} started", special.boss, special.kind);
    }
    for special in specials_ended.read() {
        info!("[boss] {:?} special {:?} ended", special.boss, special.kind);
    }
}

fn log_boss_status(
    time: Res<Time>,
    mut state: ResMut<DebugState>,
    bosses: Query<(Entity, &Health, &BossScheduler, &Brain), Without<Dead>>,
) {
    if state.status_interval <= 0.0 {
        return;
    }
    state.status_timer += time.delta_secs();
    if state.status_timer < state.status_interval {
        return;
    }
    state.status_timer = 0.0;

    for (entity, health, scheduler, brain) in &bosses {
        info!(
            "[boss] {:?} {:.0}/{:.0} hp, {:?}, {:?}, special in {:.1}s",
            entity,
            health.current,
            health.max,
            scheduler.phase,
            brain.state,
            scheduler.special_timer
        );
    }
}

fn apply_invincibility(state: Res<DebugState>, mut players: Query<&mut Invulnerable, With<Player>>) {
    if !state.is_changed() {
        return;
    }
    for mut invulnerable in &mut players {
        invulnerable.held = state.invincible;
    }
}
