//! Combat domain: timers, swing windows, staggers, damage, deaths, respawns.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::combat::animation::{AnimationCues, cue};
use crate::combat::block::BlockController;
use crate::combat::combo::ComboController;
use crate::combat::components::{
    CombatantState, Dead, Health, HitVolumes, Invulnerable, LockHolder, Pushback, Stagger,
};
use crate::combat::events::{
    CombatantDied, DamageRequest, RespawnRequest, StaggerRequest, Staggered, SwingWindow,
};
use crate::combat::resources::CombatTuning;

pub(crate) fn update_combat_timers(
    time: Res<Time>,
    mut query: Query<(&mut Stagger, &mut Invulnerable, &mut CombatantState), Without<Dead>>,
) {
    let dt = time.delta_secs();

    for (mut stagger, mut invuln, mut state) in &mut query {
        if stagger.timer > 0.0 {
            stagger.timer = (stagger.timer - dt).max(0.0);
        }
        if invuln.timer > 0.0 {
            invuln.timer = (invuln.timer - dt).max(0.0);
        }
        state.cooldowns.tick(dt);
    }
}

/// Opens and closes hit volumes from animation events. Opening starts a new
/// swing and clears the hit set; opens outside a running combo are ignored.
pub(crate) fn apply_swing_windows(
    mut swings: MessageReader<SwingWindow>,
    mut query: Query<(&mut HitVolumes, &ComboController), Without<Dead>>,
) {
    for swing in swings.read() {
        let Ok((mut volumes, combo)) = query.get_mut(swing.actor) else {
            continue;
        };
        if swing.open {
            if !combo.is_running() {
                debug!("Ignoring swing open for idle {:?}", swing.actor);
                continue;
            }
            if !volumes.open_swing(swing.volume) {
                warn!(
                    "{:?} has no hit volume {} for its swing",
                    swing.actor, swing.volume
                );
            }
        } else {
            volumes.close_swing(swing.volume);
        }
    }
}

/// Forced interrupt: clears block and combo, plays the stagger cue
pub(crate) fn apply_staggers(
    tuning: Res<CombatTuning>,
    mut requests: MessageReader<StaggerRequest>,
    mut query: Query<
        (
            &mut Stagger,
            &mut CombatantState,
            &mut AnimationCues,
            Option<&mut BlockController>,
            Option<&mut ComboController>,
            Option<&mut HitVolumes>,
        ),
        Without<Dead>,
    >,
    mut staggered: MessageWriter<Staggered>,
) {
    for request in requests.read() {
        let Ok((mut stagger, mut state, mut cues, block, combo, volumes)) =
            query.get_mut(request.target)
        else {
            continue;
        };

        stagger.timer = tuning.stagger_duration;
        if let Some(mut block) = block {
            block.stop(&mut cues);
        }
        if let Some(mut combo) = combo {
            combo.reset(&mut cues);
        }
        if let Some(mut volumes) = volumes {
            volumes.disable_all();
        }
        // A task-held lock is released by the task runner after cleanup
        state.release(LockHolder::Combo);
        cues.set_trigger(cue::STAGGER);

        staggered.write(Staggered {
            entity: request.target,
            source: request.source,
        });
    }
}

/// The damage sink: atomic, clamped at zero, skipped while invulnerable
pub(crate) fn apply_damage(
    mut requests: MessageReader<DamageRequest>,
    mut query: Query<(&mut Health, Option<&Invulnerable>), Without<Dead>>,
) {
    for request in requests.read() {
        let Ok((mut health, invuln)) = query.get_mut(request.target) else {
            continue;
        };
        if invuln.is_some_and(|i| i.is_invulnerable()) || health.is_dead() {
            continue;
        }
        let dealt = health.take_damage(request.amount);
        debug!(
            "{:?} took {} damage ({}/{})",
            request.target, dealt, health.current, health.max
        );
    }
}

pub(crate) fn process_deaths(
    mut commands: Commands,
    mut query: Query<
        (
            Entity,
            &Health,
            &mut CombatantState,
            &mut AnimationCues,
            Option<&mut BlockController>,
            Option<&mut ComboController>,
            Option<&mut HitVolumes>,
        ),
        (Changed<Health>, Without<Dead>),
    >,
    mut deaths: MessageWriter<CombatantDied>,
) {
    for (entity, health, mut state, mut cues, block, combo, volumes) in &mut query {
        if !health.is_dead() {
            continue;
        }
        if let Some(mut block) = block {
            block.stop(&mut cues);
        }
        if let Some(mut combo) = combo {
            combo.reset(&mut cues);
        }
        if let Some(mut volumes) = volumes {
            volumes.disable_all();
        }
        state.release(LockHolder::Combo);
        state.rooted = false;
        cues.set_trigger(cue::DIE);

        commands.entity(entity).insert(Dead);
        deaths.write(CombatantDied { entity });
        info!("{:?} died", entity);
    }
}

/// External respawn hook: full health, all combat state cleared
pub(crate) fn process_respawns(
    mut commands: Commands,
    mut requests: MessageReader<RespawnRequest>,
    mut query: Query<(
        &mut Health,
        &mut Stagger,
        &mut Invulnerable,
        &mut CombatantState,
        &mut AnimationCues,
        Option<&mut BlockController>,
        Option<&mut ComboController>,
        Option<&mut HitVolumes>,
        Option<&mut Pushback>,
    )>,
) {
    for request in requests.read() {
        let Ok((
            mut health,
            mut stagger,
            mut invuln,
            mut state,
            mut cues,
            block,
            combo,
            volumes,
            pushback,
        )) = query.get_mut(request.entity)
        else {
            continue;
        };

        health.reset();
        stagger.timer = 0.0;
        *invuln = Invulnerable::default();
        *state = CombatantState::default();
        if let Some(mut block) = block {
            block.stop(&mut cues);
        }
        if let Some(mut combo) = combo {
            combo.reset(&mut cues);
        }
        if let Some(mut volumes) = volumes {
            volumes.disable_all();
            volumes.struck.clear();
        }
        if let Some(mut pushback) = pushback {
            pushback.velocity = Vec2::ZERO;
        }
        cues.stop();

        commands.entity(request.entity).remove::<Dead>();
        info!("{:?} respawned", request.entity);
    }
}
