//! Combat domain: animation cue surface and the headless clip driver.
//!
//! Combat never plays clips. It writes cue values and clip requests into
//! [`AnimationCues`] and reads back normalized progress reported by whatever
//! animation layer owns the actor. [`HeadlessAnimator`] is that layer when no
//! renderer is present.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use std::collections::HashMap;

use crate::combat::events::SwingWindow;

/// Cue names shared with the animation layer
pub mod cue {
    pub const IS_ATTACK: &str = "IsAttack";
    pub const IS_HEAVY_ATTACK: &str = "IsHeavyAttack";
    pub const IS_BLOCKING: &str = "IsBlocking";
    pub const IS_WALKING: &str = "IsWalking";
    pub const ATTACK_STEP: &str = "AttackStep";
    pub const STAGGER: &str = "Stagger";
    pub const DIE: &str = "Die";
    pub const MELEE_COMBO: &str = "MeleeCombo";
    pub const RANGED_SHOT: &str = "RangedShot";
    pub const SPELL_CAST: &str = "SpellCast";
    pub const SLAM: &str = "Slam";
    pub const PHASE_TRANSITION: &str = "PhaseTransition";
}

/// A clip the combat core wants played
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRequest {
    pub clip: String,
    /// Hit volume this clip opens, if it is an attack swing
    pub swing_volume: Option<usize>,
}

#[derive(Component, Debug, Default)]
pub struct AnimationCues {
    bools: HashMap<&'static str, bool>,
    ints: HashMap<&'static str, i32>,
    triggers: Vec<&'static str>,
    requested: Option<ClipRequest>,
    current_clip: Option<String>,
    normalized_time: f32,
}

impl AnimationCues {
    pub fn set_bool(&mut self, name: &'static str, value: bool) {
        self.bools.insert(name, value);
    }

    pub fn bool(&self, name: &str) -> bool {
        self.bools.get(name).copied().unwrap_or(false)
    }

    pub fn set_int(&mut self, name: &'static str, value: i32) {
        self.ints.insert(name, value);
    }

    pub fn int(&self, name: &str) -> i32 {
        self.ints.get(name).copied().unwrap_or(0)
    }

    pub fn set_trigger(&mut self, name: &'static str) {
        self.triggers.push(name);
    }

    /// Pending triggers, oldest first
    pub fn triggers(&self) -> &[&'static str] {
        &self.triggers
    }

    pub fn take_triggers(&mut self) -> Vec<&'static str> {
        std::mem::take(&mut self.triggers)
    }

    pub fn play(&mut self, clip: impl Into<String>, swing_volume: Option<usize>) {
        self.requested = Some(ClipRequest {
            clip: clip.into(),
            swing_volume,
        });
    }

    pub fn take_request(&mut self) -> Option<ClipRequest> {
        self.requested.take()
    }

    /// Drop any requested or playing clip.
    pub fn stop(&mut self) {
        self.requested = None;
        self.current_clip = None;
        self.normalized_time = 0.0;
    }

    /// Called by the animation layer as playback advances.
    pub fn report_progress(&mut self, clip: impl Into<String>, normalized_time: f32) {
        self.current_clip = Some(clip.into());
        self.normalized_time = normalized_time;
    }

    pub fn current_clip(&self) -> Option<&str> {
        self.current_clip.as_deref()
    }

    /// Progress of `clip`, or None when another clip (or none) is playing
    pub fn normalized_time(&self, clip: &str) -> Option<f32> {
        match self.current_clip.as_deref() {
            Some(current) if current == clip => Some(self.normalized_time),
            _ => None,
        }
    }

    pub fn clear_attack_flags(&mut self) {
        self.set_bool(cue::IS_ATTACK, false);
        self.set_bool(cue::IS_HEAVY_ATTACK, false);
        self.set_int(cue::ATTACK_STEP, 0);
    }
}

/// Plays requested clips at a fixed length and raises swing events at fixed
/// normalized times.
#[derive(Component, Debug, Clone)]
pub struct HeadlessAnimator {
    pub clip_seconds: f32,
    pub swing_open: f32,
    pub swing_close: f32,
    swing: Option<usize>,
    opened: bool,
    closed: bool,
}

impl Default for HeadlessAnimator {
    fn default() -> Self {
        Self {
            clip_seconds: 0.5,
            swing_open: 0.3,
            swing_close: 0.6,
            swing: None,
            opened: false,
            closed: false,
        }
    }
}

impl HeadlessAnimator {
    fn start(&mut self, request: &ClipRequest) {
        self.swing = request.swing_volume;
        self.opened = false;
        self.closed = false;
    }
}

pub(crate) fn drive_headless_animation(
    time: Res<Time>,
    mut query: Query<(Entity, &mut AnimationCues, &mut HeadlessAnimator)>,
    mut swings: MessageWriter<SwingWindow>,
) {
    let dt = time.delta_secs();

    for (entity, mut cues, mut animator) in &mut query {
        // Triggers are fire-and-forget for a headless run
        cues.take_triggers();

        if let Some(request) = cues.take_request() {
            if let (Some(volume), true) = (animator.swing, animator.opened && !animator.closed) {
                swings.write(SwingWindow {
                    actor: entity,
                    volume,
                    open: false,
                });
            }
            animator.start(&request);
            cues.report_progress(request.clip, 0.0);
            continue;
        }

        let Some(clip) = cues.current_clip().map(str::to_owned) else {
            animator.swing = None;
            continue;
        };

        let length = animator.clip_seconds.max(f32::EPSILON);
        let progress = (cues.normalized_time + dt / length).min(1.0);
        cues.report_progress(clip, progress);

        let Some(volume) = animator.swing else {
            continue;
        };
        if !animator.opened && progress >= animator.swing_open {
            animator.opened = true;
            swings.write(SwingWindow {
                actor: entity,
                volume,
                open: true,
            });
        }
        if animator.opened && !animator.closed && progress >= animator.swing_close {
            animator.closed = true;
            swings.write(SwingWindow {
                actor: entity,
                volume,
                open: false,
            });
        }
    }
}
