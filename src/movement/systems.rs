//! Movement domain: locomotion and push-back integration.

use bevy::prelude::*;

use crate::combat::{CombatTuning, CombatantState, Dead, Pushback, Stagger};
use crate::movement::components::Locomotion;

/// Moves actors along their desired direction. Rooted, staggered and
/// attacking actors hold still.
pub(crate) fn apply_locomotion(
    time: Res<Time>,
    mut query: Query<
        (&mut Transform, &Locomotion, &CombatantState, Option<&Stagger>),
        Without<Dead>,
    >,
) {
    let dt = time.delta_secs();

    for (mut transform, locomotion, state, stagger) in &mut query {
        if state.rooted || state.attack_lock() || stagger.is_some_and(|s| s.is_staggered()) {
            continue;
        }
        let step = locomotion.direction.normalize_or_zero() * locomotion.speed * dt;
        transform.translation += step.extend(0.0);
    }
}

/// Applies and decays push-back from blocked hits
pub(crate) fn apply_pushback(
    time: Res<Time>,
    tuning: Res<CombatTuning>,
    mut query: Query<(&mut Transform, &mut Pushback, Option<&CombatantState>)>,
) {
    let dt = time.delta_secs();

    for (mut transform, mut push, state) in &mut query {
        if push.velocity.length() <= tuning.push_rest_speed {
            push.velocity = Vec2::ZERO;
            continue;
        }
        if !state.is_some_and(|s| s.rooted) {
            transform.translation += (push.velocity * dt).extend(0.0);
        }
        let decay = (tuning.push_decay * dt).min(1.0);
        push.velocity = push.velocity.lerp(Vec2::ZERO, decay);
    }
}
