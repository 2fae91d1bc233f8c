//! Screen-space transition fade used to mask hard camera cuts.
//!
//! The fade value ramps `0 → peak` (fade in), holds while the camera jumps,
//! then ramps `peak → 0` (fade out). The hold itself is a scheduled cue owned
//! by the cinematic, so canceling the cinematic also cancels a pending fade out.

use std::time::Duration;

use bevy::prelude::*;

use crate::tween::Tween;

/// Timing and look of the transition fade.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct FadeConfig {
    /// Fade value at full cover. Values at or above `1.0` fully hide the scene.
    pub peak: f32,
    /// Duration of the `0 → peak` ramp.
    pub fade_in_ms: u64,
    /// Delay between starting the fade in and starting the fade out.
    pub hold_ms: u64,
    /// Duration of the `peak → 0` ramp.
    pub fade_out_ms: u64,
    /// Overlay color.
    pub color: Color,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            peak: 1.5,
            fade_in_ms: 1500,
            hold_ms: 2000,
            fade_out_ms: 1500,
            color: Color::BLACK,
        }
    }
}

/// Which ramp of the fade is in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ramp {
    In,
    Out,
}

/// Live fade state. Holds one tween per ramp and replays it for every cut.
#[derive(Clone, Debug)]
pub struct TransitionFade {
    peak: f32,
    fade_out_duration: Duration,
    fade_in: Tween<f32>,
    fade_out: Tween<f32>,
    active: Option<Ramp>,
    value: f32,
}

impl TransitionFade {
    /// Idle fade (fully transparent).
    pub fn new(cfg: &FadeConfig) -> Self {
        let peak = cfg.peak.max(f32::EPSILON);
        let fade_in_duration = Duration::from_millis(cfg.fade_in_ms);
        let fade_out_duration = Duration::from_millis(cfg.fade_out_ms);
        Self {
            peak,
            fade_out_duration,
            fade_in: Tween::paused(0.0, peak, fade_in_duration),
            fade_out: Tween::paused(peak, 0.0, fade_out_duration),
            active: None,
            value: 0.0,
        }
    }

    /// Replay the `0 → peak` ramp from the beginning.
    pub fn play_in(&mut self) {
        self.fade_in.play(Duration::ZERO);
        self.fade_out.pause();
        self.active = Some(Ramp::In);
    }

    /// Replay the `peak → 0` ramp from the beginning.
    pub fn play_out(&mut self) {
        self.fade_out.play(Duration::ZERO);
        self.fade_in.pause();
        self.active = Some(Ramp::Out);
    }

    /// Ramp down from wherever the fade currently is.
    ///
    /// The fade-out tween is replayed from the offset matching the current
    /// value, so a partial cover clears proportionally faster.
    pub fn release(&mut self) {
        self.fade_in.pause();
        if self.value <= 0.0 {
            self.fade_out.pause();
            self.active = None;
            return;
        }
        let remaining = (self.value / self.peak).clamp(0.0, 1.0);
        let offset = self.fade_out_duration.mul_f32(1.0 - remaining);
        self.fade_out.play(offset);
        self.active = Some(Ramp::Out);
    }

    /// Freeze the in-flight ramp, if any.
    pub fn pause(&mut self) {
        if let Some(ramp) = self.ramp_mut() {
            ramp.pause();
        }
    }

    /// Advance the in-flight ramp.
    pub fn tick(&mut self, dt: Duration) -> f32 {
        if let Some(ramp) = self.ramp_mut() {
            self.value = ramp.tick(dt);
        }
        self.value
    }

    /// Raw fade value in `[0, peak]`.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Overlay opacity in `[0, 1]`.
    pub fn opacity(&self) -> f32 {
        self.value.clamp(0.0, 1.0)
    }

    /// `true` while a ramp is advancing.
    pub fn is_animating(&self) -> bool {
        match self.active {
            Some(Ramp::In) => self.fade_in.is_playing(),
            Some(Ramp::Out) => self.fade_out.is_playing(),
            None => false,
        }
    }

    fn ramp_mut(&mut self) -> Option<&mut Tween<f32>> {
        match self.active? {
            Ramp::In => Some(&mut self.fade_in),
            Ramp::Out => Some(&mut self.fade_out),
        }
    }
}
