//! Real-time combat core for an arena action game.
//!
//! Melee combos, blocks and parries, projectiles, AI attack tasks and boss
//! phase scheduling, driven by archetype data loaded from RON.

pub mod combat;
pub mod content;
#[cfg(feature = "dev-tools")]
pub mod debug;
pub mod movement;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::path::PathBuf;
use std::time::Duration;

use crate::combat::{CombatPlugin, OverlapBackend, SimRng};
use crate::content::ContentPlugin;
use crate::movement::MovementPlugin;

/// Simulation tick used by headless runs
pub const TICK_SECONDS: f32 = 1.0 / 60.0;

/// Content, combat and movement in one plugin
pub struct ArenaPlugin {
    pub seed: u64,
    /// Directory holding archetypes.ron and combat.ron; built-ins when None
    pub data_dir: Option<PathBuf>,
    pub overlap: OverlapBackend,
    pub headless_animation: bool,
}

impl Default for ArenaPlugin {
    fn default() -> Self {
        Self {
            seed: 0,
            data_dir: None,
            overlap: OverlapBackend::Proximity,
            headless_animation: true,
        }
    }
}

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            ContentPlugin {
                data_dir: self.data_dir.clone(),
            },
            CombatPlugin {
                overlap: self.overlap,
                headless_animation: self.headless_animation,
            },
            MovementPlugin,
        ))
        .insert_resource(SimRng::from_seed(self.seed));
    }
}

/// A window-less app stepping a fixed tick per `update()`.
///
/// The first update has a zero delta; callers that count time should run one
/// warm-up update first.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            TICK_SECONDS,
        )))
        .add_plugins(ArenaPlugin {
            seed,
            ..default()
        });
    app
}
