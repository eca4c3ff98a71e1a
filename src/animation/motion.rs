//! Per-frame actor placement: sampled track values plus effect and loop offsets, folded into a
//! single affine transform.

use crate::animation::track::{Sampled, sample};
use crate::foundation::core::{Affine, Canvas, Vec2};
use crate::scene::model::{ActorCommon, Effect, LoopMode};
use std::f64::consts::{PI, TAU};

/// Length of the `fade-in` ramp in milliseconds.
pub const FADE_IN_MS: f64 = 300.0;

const BOUNCE_PERIOD_MS: f64 = 200.0;
const BOUNCE_AMPLITUDE: f64 = 0.05;
const FLOAT_PERIOD_MS: f64 = 1000.0;
const FLOAT_AMPLITUDE: f64 = 0.02;

/// Layer opacity of a `fade-in` effect at scene time `t`.
pub fn fade_alpha(t: f64) -> f32 {
    (t / FADE_IN_MS).clamp(0.0, 1.0) as f32
}

/// Upward `bounce` displacement in pixels (positive means up).
///
/// Uses scene-local time, so actor and scene bounces share one phase.
pub fn bounce_offset(t: f64, height: f64) -> f64 {
    (t / BOUNCE_PERIOD_MS * PI).sin().abs() * BOUNCE_AMPLITUDE * height
}

/// Vertical `float` loop displacement in pixels (positive means down).
pub fn float_offset(t: f64, height: f64) -> f64 {
    (t / FLOAT_PERIOD_MS * TAU).sin() * FLOAT_AMPLITUDE * height
}

/// Resolved placement of one actor at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorPose {
    /// Raw sampled track values.
    pub sampled: Sampled,
    /// Local-to-parent transform.
    pub transform: Affine,
    /// Layer opacity when the actor fades in.
    pub fade_alpha: Option<f32>,
}

impl ActorPose {
    /// Resolve an actor's pose at scene time `t` (milliseconds).
    ///
    /// Composition order, outermost first: translate to the sampled position (lifted by
    /// `bounce`), the `float` sway, rotation, horizontal mirror, uniform scale.
    pub fn resolve(common: &ActorCommon, t: f64, canvas: Canvas) -> Self {
        let sampled = sample(&common.tracks, t, &common.start);
        let height = canvas.height_f64();

        let x = sampled.x * canvas.width_f64();
        let mut y = sampled.y * height;
        if common.has_effect(&Effect::Bounce) {
            y -= bounce_offset(t, height);
        }

        let mut transform = Affine::translate(Vec2::new(x, y));
        if common.loop_mode == LoopMode::Float {
            transform = transform * Affine::translate(Vec2::new(0.0, float_offset(t, height)));
        }
        if sampled.rotate != 0.0 {
            transform = transform * Affine::rotate(sampled.rotate.to_radians());
        }
        if common.flip_x {
            transform = transform * Affine::scale_non_uniform(-1.0, 1.0);
        }
        if sampled.scale != 1.0 {
            transform = transform * Affine::scale(sampled.scale);
        }

        let fade_alpha = common
            .has_effect(&Effect::FadeIn)
            .then(|| fade_alpha(t));

        Self {
            sampled,
            transform,
            fade_alpha,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/motion.rs"]
mod tests;
