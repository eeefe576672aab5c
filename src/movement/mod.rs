//! Movement domain: physics layers, facing, and planar locomotion.

mod components;
mod systems;

pub use components::{
    Facing, Footing, GameLayer, Locomotion, PatrolMode, PatrolRoute, Player,
};

use bevy::prelude::*;

use crate::combat::CombatSet;
use crate::movement::systems::{apply_locomotion, apply_pushback};

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (apply_locomotion, apply_pushback)
                .chain()
                .in_set(CombatSet::Movement),
        );
    }
}
