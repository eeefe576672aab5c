//! Telegraphs: ground warnings and falling markers that precede area damage.

use bevy::prelude::*;

use crate::combat::ai::tasks::TelegraphKind;

#[derive(Component, Debug, Clone)]
pub struct Telegraph {
    pub owner: Entity,
    pub kind: TelegraphKind,
    pub radius: f32,
    pub elapsed: f32,
    pub duration: f32,
    /// Blink period at the start and at the end of the telegraph
    pub flash: Option<(f32, f32)>,
    pub visible: bool,
    flash_timer: f32,
}

impl Telegraph {
    pub fn new(
        owner: Entity,
        kind: TelegraphKind,
        radius: f32,
        duration: f32,
        flash: Option<(f32, f32)>,
    ) -> Self {
        Self {
            owner,
            kind,
            radius,
            elapsed: 0.0,
            duration,
            flash,
            visible: true,
            flash_timer: 0.0,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
        let Some((start, end)) = self.flash else {
            return;
        };
        self.flash_timer += dt;
        let period = flash_period(self.progress(), start, end);
        if self.flash_timer >= period {
            self.flash_timer = 0.0;
            self.visible = !self.visible;
        }
    }
}

/// A marker falling from `from` onto `to`, landing when the telegraph expires
#[derive(Component, Debug, Clone)]
pub struct DropMarker {
    pub owner: Entity,
    pub from: Vec2,
    pub to: Vec2,
    pub elapsed: f32,
    pub duration: f32,
}

impl DropMarker {
    pub fn position(&self) -> Vec2 {
        self.from.lerp(self.to, drop_progress(self.elapsed, self.duration))
    }
}

/// Accelerating fall: quadratic in normalized time
pub fn drop_progress(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    let t = (elapsed / duration).clamp(0.0, 1.0);
    t * t
}

/// Blink period shrinks linearly from `start` to `end` as the charge completes
pub fn flash_period(progress: f32, start: f32, end: f32) -> f32 {
    start + (end - start) * progress.clamp(0.0, 1.0)
}

pub(crate) fn animate_telegraphs(
    time: Res<Time>,
    mut telegraphs: Query<(&mut Telegraph, &mut Visibility)>,
    mut markers: Query<(&mut DropMarker, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (mut telegraph, mut visibility) in &mut telegraphs {
        telegraph.tick(dt);
        *visibility = if telegraph.visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
    for (mut marker, mut transform) in &mut markers {
        marker.elapsed += dt;
        let position = marker.position();
        transform.translation.x = position.x;
        transform.translation.y = position.y;
    }
}
