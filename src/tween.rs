//! Minimal tween engine: animates a value from `from` to `to` over a duration.
//!
//! Tweens are plain data advanced by whoever owns them (the sequencer context
//! ticks them once per frame). They can be paused and replayed from an offset,
//! so the transition fade keeps one tween per ramp and replays it for every cut.

use std::time::Duration;

use bevy::prelude::*;

use crate::math;

/// Values a [`Tween`] can interpolate.
pub trait Lerp: Copy {
    /// Linear interpolation towards `to` by `t` in `[0, 1]`.
    fn lerp_to(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self.lerp(to, t)
    }
}

/// Acceleration curve applied to a tween's linear progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum Easing {
    /// Constant speed throughout.
    #[default]
    Linear,
    /// Quadratic deceleration.
    OutQuad,
    /// Circular deceleration, very fast start.
    OutCirc,
}

impl Easing {
    /// Apply the easing function to a linear progress value (0.0 to 1.0).
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::OutQuad => math::ease_out_quad(t),
            Easing::OutCirc => math::ease_out_circ(t),
        }
    }
}

/// Playback state of a [`Tween`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Playback {
    /// Advancing on every tick.
    Playing,
    /// Frozen at the current offset.
    Paused,
    /// Reached the end value.
    Finished,
}

/// A single `from → to` animation.
///
/// The tween's local timeline is `delay + duration` long. During the delay the
/// value holds at `from`.
#[derive(Clone, Debug)]
pub struct Tween<T: Lerp> {
    from: T,
    to: T,
    duration: Duration,
    delay: Duration,
    easing: Easing,
    elapsed: Duration,
    playback: Playback,
}

impl<T: Lerp> Tween<T> {
    /// Create a tween that starts playing immediately.
    pub fn new(from: T, to: T, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            delay: Duration::ZERO,
            easing: Easing::Linear,
            elapsed: Duration::ZERO,
            playback: Playback::Playing,
        }
    }

    /// Create a tween that waits for [`Tween::play`].
    pub fn paused(from: T, to: T, duration: Duration) -> Self {
        Self {
            playback: Playback::Paused,
            ..Self::new(from, to, duration)
        }
    }

    /// Set the easing curve.
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Hold at `from` for `delay` before animating.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Restart playback at `offset` into the tween's local timeline.
    pub fn play(&mut self, offset: Duration) {
        self.elapsed = offset.min(self.total());
        self.playback = if self.elapsed >= self.total() {
            Playback::Finished
        } else {
            Playback::Playing
        };
    }

    /// Freeze at the current offset. Finished tweens stay finished.
    pub fn pause(&mut self) {
        if self.playback == Playback::Playing {
            self.playback = Playback::Paused;
        }
    }

    /// Current playback state.
    pub fn playback(&self) -> Playback {
        self.playback
    }

    /// `true` while the tween advances on tick.
    pub fn is_playing(&self) -> bool {
        self.playback == Playback::Playing
    }

    /// Advance by `dt` if playing and return the current value.
    pub fn tick(&mut self, dt: Duration) -> T {
        if self.playback == Playback::Playing {
            self.elapsed = (self.elapsed + dt).min(self.total());
            if self.elapsed >= self.total() {
                self.playback = Playback::Finished;
            }
        }
        self.value()
    }

    /// Value at the current offset.
    pub fn value(&self) -> T {
        self.from.lerp_to(self.to, self.easing.apply(self.progress()))
    }

    /// Linear progress through the animated part, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.elapsed <= self.delay {
            return if self.duration.is_zero() && self.elapsed >= self.total() {
                1.0
            } else {
                0.0
            };
        }
        if self.duration.is_zero() {
            return 1.0;
        }
        ((self.elapsed - self.delay).as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    fn total(&self) -> Duration {
        self.delay + self.duration
    }
}
