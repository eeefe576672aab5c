//! Combat domain: directional guard and parry timing.

use bevy::prelude::*;

use crate::combat::animation::{AnimationCues, cue};
use crate::combat::components::{CombatantState, Dead};

#[derive(Component, Debug, Clone)]
pub struct BlockController {
    pub is_blocking: bool,
    /// Seconds the current block has been held
    pub held_seconds: f32,
    pub parry_window: f32,
    /// Radians either side of forward that the guard covers
    pub guard_half_angle: f32,
}

impl BlockController {
    pub fn new(parry_window: f32, guard_half_angle_deg: f32) -> Self {
        Self {
            is_blocking: false,
            held_seconds: 0.0,
            parry_window,
            guard_half_angle: guard_half_angle_deg.to_radians(),
        }
    }

    /// Raise the guard. Refused while an attack holds the lock.
    pub fn start(&mut self, state: &CombatantState, cues: &mut AnimationCues) -> bool {
        if state.attack_lock() {
            return false;
        }
        self.is_blocking = true;
        self.held_seconds = 0.0;
        cues.set_bool(cue::IS_BLOCKING, true);
        true
    }

    pub fn stop(&mut self, cues: &mut AnimationCues) {
        self.is_blocking = false;
        self.held_seconds = 0.0;
        cues.set_bool(cue::IS_BLOCKING, false);
    }

    pub fn tick(&mut self, dt: f32) {
        if self.is_blocking {
            self.held_seconds += dt;
        }
    }

    /// A hit arriving right now would be parried
    pub fn would_parry(&self) -> bool {
        self.is_blocking && self.held_seconds < self.parry_window
    }

    /// Whether `attacker` lies inside the guard cone of a defender at
    /// `position` looking along `forward`. Coincident positions never count.
    pub fn is_facing(&self, position: Vec2, forward: Vec2, attacker: Vec2) -> bool {
        let Some(to_attacker) = (attacker - position).try_normalize() else {
            return false;
        };
        let Some(forward) = forward.try_normalize() else {
            return false;
        };
        forward.dot(to_attacker) >= self.guard_half_angle.cos()
    }

    /// Blocking and facing the attacker
    pub fn guards_against(&self, position: Vec2, forward: Vec2, attacker: Vec2) -> bool {
        self.is_blocking && self.is_facing(position, forward, attacker)
    }
}

pub(crate) fn tick_blocks(time: Res<Time>, mut query: Query<&mut BlockController, Without<Dead>>) {
    let dt = time.delta_secs();
    for mut block in &mut query {
        block.tick(dt);
    }
}
