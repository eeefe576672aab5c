//! Combat domain: tuning and simulation resources.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Global combat tuning, loaded from combat.ron
#[derive(Resource, Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Seconds a staggered combatant cannot act
    pub stagger_duration: f32,
    /// Push-back speed applied to a defender on a blocked hit
    pub block_push_force: f32,
    /// Lerp rate at which push-back decays toward zero
    pub push_decay: f32,
    /// Push-back below this speed is dropped
    pub push_rest_speed: f32,
    /// Normalized clip progress a combo step must reach before chaining
    pub ready_threshold: f32,
    /// Ticks a combo step may wait for its clip before progression is forced
    pub max_step_frames: u32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            stagger_duration: 0.6,
            block_push_force: 8.0,
            push_decay: 8.0,
            push_rest_speed: 0.01,
            ready_threshold: 0.7,
            max_step_frames: 300,
        }
    }
}

/// Seeded RNG shared by every AI roll so runs are reproducible
#[derive(Resource)]
pub struct SimRng(pub ChaCha8Rng);

impl SimRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::from_seed(0)
    }
}

/// Which spatial overlap capability feeds hit detection
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapBackend {
    /// avian2d spatial queries; requires the physics plugins
    Physics,
    /// Circle tests against hurtboxes, no physics world needed
    #[default]
    Proximity,
}
