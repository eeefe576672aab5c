//! Headless duel: a scripted knight against the warden boss.
//!
//! Usage: arena-core [--seed N] [--ticks N] [--data DIR] [--physics]
//! Run with `--help` for details.

use avian2d::prelude::*;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use arena_core::combat::ai::Brain;
use arena_core::combat::{
    CombatIntent, CombatantDied, Dead, Health, Intent, OverlapBackend, RespawnRequest, Team,
    spawn_archetype,
};
use arena_core::content::ArchetypeRegistry;
use arena_core::movement::{Facing, Locomotion, Player};
use arena_core::{ArenaPlugin, TICK_SECONDS};

const MAX_RESPAWNS: u32 = 3;

/// Headless duel between a scripted knight and the warden boss
#[derive(Parser, Debug)]
#[command(name = "arena-core")]
#[command(about = "Run a scripted headless duel", long_about = None)]
struct Args {
    /// Seed for the simulation RNG
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Maximum number of fixed ticks to simulate
    #[arg(long, default_value_t = 60 * 180)]
    ticks: u32,

    /// Directory holding archetypes.ron and combat.ron
    #[arg(long = "data", value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Use avian2d spatial queries for hit overlap
    #[arg(long)]
    physics: bool,
}

/// Scripted player input
#[derive(Resource, Debug, Default)]
struct DuelScript {
    knight: Option<Entity>,
    warden: Option<Entity>,
    swing_timer: f32,
    block_timer: f32,
    blocking: bool,
    respawn_timer: Option<f32>,
    respawns: u32,
    finished: bool,
}

fn main() {
    let args = Args::parse();

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            TICK_SECONDS,
        )))
        .add_plugins(ArenaPlugin {
            seed: args.seed,
            data_dir: args.data_dir.clone(),
            overlap: if args.physics {
                OverlapBackend::Physics
            } else {
                OverlapBackend::Proximity
            },
            headless_animation: true,
        })
        .init_resource::<DuelScript>()
        .add_systems(Startup, spawn_duel)
        .add_systems(Update, (drive_knight, watch_deaths).chain());

    if args.physics {
        app.add_plugins((TransformPlugin, PhysicsPlugins::default()));
    }

    #[cfg(feature = "dev-tools")]
    app.add_plugins(arena_core::debug::DebugPlugin);

    info!(
        "Starting duel (seed {}, {} ticks, {} overlap)",
        args.seed,
        args.ticks,
        if args.physics { "physics" } else { "proximity" }
    );

    for _ in 0..args.ticks {
        app.update();
        if app.world().resource::<DuelScript>().finished {
            break;
        }
    }

    let script = app.world().resource::<DuelScript>();
    let (knight, warden) = (script.knight, script.warden);
    let world = app.world();
    for (label, entity) in [("knight", knight), ("warden", warden)] {
        let Some(health) = entity.and_then(|e| world.get::<Health>(e)) else {
            continue;
        };
        info!("{}: {:.0}/{:.0} hp", label, health.current, health.max);
    }
}

fn spawn_duel(
    mut commands: Commands,
    registry: Res<ArchetypeRegistry>,
    mut script: ResMut<DuelScript>,
) {
    let (Some(knight_def), Some(warden_def)) = (registry.get("knight"), registry.get("warden"))
    else {
        error!("Duel needs 'knight' and 'warden' archetypes");
        script.finished = true;
        return;
    };

    let knight = spawn_archetype(&mut commands, knight_def, Vec2::new(-6.0, 0.0), Team::Player);
    commands.entity(knight).insert(Player);
    let warden = spawn_archetype(&mut commands, warden_def, Vec2::new(6.0, 0.0), Team::Enemy);
    commands.entity(warden).insert(Facing(Vec2::NEG_X));

    script.knight = Some(knight);
    script.warden = Some(warden);
}

/// Walks the knight into range, swings on a rhythm, and raises the guard
/// whenever the warden commits to an attack.
fn drive_knight(
    time: Res<Time>,
    mut script: ResMut<DuelScript>,
    mut knights: Query<(&Transform, &mut Facing, &mut Locomotion), (With<Player>, Without<Dead>)>,
    wardens: Query<(&Transform, &Brain), Without<Dead>>,
    mut intents: MessageWriter<CombatIntent>,
    mut respawns: MessageWriter<RespawnRequest>,
) {
    let dt = time.delta_secs();
    let (Some(knight), Some(warden)) = (script.knight, script.warden) else {
        return;
    };

    if let Some(timer) = script.respawn_timer.as_mut() {
        *timer -= dt;
        if *timer <= 0.0 {
            script.respawn_timer = None;
            respawns.write(RespawnRequest { entity: knight });
        }
        return;
    }

    let (Ok((transform, mut facing, mut locomotion)), Ok((warden_transform, brain))) =
        (knights.get_mut(knight), wardens.get(warden))
    else {
        return;
    };
    let to_warden = warden_transform.translation.truncate() - transform.translation.truncate();
    facing.look(to_warden);

    if to_warden.length() > 2.0 {
        locomotion.direction = to_warden.normalize_or_zero();
    } else {
        locomotion.stop();
    }

    let threatened = brain.target == Some(knight)
        && matches!(
            brain.state,
            arena_core::combat::ai::BrainState::Acting | arena_core::combat::ai::BrainState::Attack
        );
    script.block_timer = (script.block_timer - dt).max(0.0);
    if threatened && !script.blocking && script.block_timer <= 0.0 {
        intents.write(CombatIntent {
            actor: knight,
            intent: Intent::StartBlock,
        });
        script.blocking = true;
        script.block_timer = 0.8;
    } else if script.blocking && script.block_timer <= 0.0 {
        intents.write(CombatIntent {
            actor: knight,
            intent: Intent::StopBlock,
        });
        script.blocking = false;
        script.block_timer = 0.6;
    }

    script.swing_timer -= dt;
    if !script.blocking && script.swing_timer <= 0.0 && to_warden.length() <= 2.5 {
        intents.write(CombatIntent {
            actor: knight,
            intent: Intent::LightAttack,
        });
        script.swing_timer = 0.35;
    }
}

fn watch_deaths(mut deaths: MessageReader<CombatantDied>, mut script: ResMut<DuelScript>) {
    for died in deaths.read() {
        if Some(died.entity) == script.warden {
            info!("The warden falls");
            script.finished = true;
        } else if Some(died.entity) == script.knight {
            if script.respawns >= MAX_RESPAWNS {
                info!("The knight is out of lives");
                script.finished = true;
            } else {
                script.respawns += 1;
                script.respawn_timer = Some(2.0);
                script.blocking = false;
                info!("The knight falls ({}/{})", script.respawns, MAX_RESPAWNS);
            }
        }
    }
}
