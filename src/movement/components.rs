//! Movement domain: components and physics layers for locomotion.

use avian2d::prelude::*;
use bevy::prelude::*;

/// Physics layers for collision filtering
#[derive(PhysicsLayer, Clone, Copy, Debug, Default)]
pub enum GameLayer {
    #[default]
    Default,
    /// Ground surfaces (floors, platforms)
    Ground,
    /// Player character hurtboxes
    Player,
    /// Enemy, minion and pillar hurtboxes
    Enemy,
    /// Projectiles - never targeted by hit volumes
    Projectile,
}

#[derive(Component, Debug)]
pub struct Player;

/// Unit forward vector of an actor
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Facing(pub Vec2);

impl Default for Facing {
    fn default() -> Self {
        Self(Vec2::X)
    }
}

impl Facing {
    pub fn forward(&self) -> Vec2 {
        self.0
    }

    /// Snap toward `direction`; zero vectors leave facing unchanged.
    pub fn look(&mut self, direction: Vec2) {
        if let Some(dir) = direction.try_normalize() {
            self.0 = dir;
        }
    }

    /// Rotate toward `direction` by at most `max_radians`.
    pub fn turn_toward(&mut self, direction: Vec2, max_radians: f32) {
        let Some(target) = direction.try_normalize() else {
            return;
        };
        let delta = self.0.angle_to(target);
        if delta.abs() <= max_radians {
            self.0 = target;
        } else {
            self.0 = Vec2::from_angle(max_radians * delta.signum()).rotate(self.0);
        }
    }
}

/// Ground contact, maintained by the external character controller
#[derive(Component, Debug, Clone, Copy)]
pub struct Footing {
    pub grounded: bool,
}

impl Default for Footing {
    fn default() -> Self {
        Self { grounded: true }
    }
}

/// Desired planar motion. AI brains and the input layer write it, the
/// locomotion system applies it unless the actor is rooted or attacking.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Locomotion {
    pub direction: Vec2,
    pub speed: f32,
}

impl Locomotion {
    pub fn stop(&mut self) {
        self.direction = Vec2::ZERO;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatrolMode {
    #[default]
    Loop,
    PingPong,
}

/// Waypoints walked while no target is in detection range
#[derive(Component, Debug, Clone)]
pub struct PatrolRoute {
    pub waypoints: Vec<Vec2>,
    pub mode: PatrolMode,
    pub wait: f32,
    pub reach_distance: f32,
    pub index: usize,
    pub forward: bool,
    pub wait_timer: f32,
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Vec2>, mode: PatrolMode) -> Self {
        Self {
            waypoints,
            mode,
            wait: 1.0,
            reach_distance: 0.5,
            index: 0,
            forward: true,
            wait_timer: 0.0,
        }
    }

    pub fn current(&self) -> Option<Vec2> {
        self.waypoints.get(self.index).copied()
    }

    /// Move to the next waypoint according to the patrol mode.
    pub fn advance(&mut self) {
        let len = self.waypoints.len();
        if len < 2 {
            return;
        }
        match self.mode {
            PatrolMode::Loop => self.index = (self.index + 1) % len,
            PatrolMode::PingPong => {
                if self.forward && self.index + 1 >= len {
                    self.forward = false;
                } else if !self.forward && self.index == 0 {
                    self.forward = true;
                }
                if self.forward {
                    self.index += 1;
                } else {
                    self.index -= 1;
                }
            }
        }
    }

    /// Direction to walk this tick; zero while waiting at a waypoint.
    pub fn steer(&mut self, position: Vec2, dt: f32) -> Vec2 {
        if self.wait_timer > 0.0 {
            self.wait_timer = (self.wait_timer - dt).max(0.0);
            return Vec2::ZERO;
        }
        let Some(target) = self.current() else {
            return Vec2::ZERO;
        };
        let offset = target - position;
        if offset.length() <= self.reach_distance {
            self.wait_timer = self.wait;
            self.advance();
            return Vec2::ZERO;
        }
        offset.normalize_or_zero()
    }
}
