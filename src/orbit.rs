//! Damped free orbit around a target point, active only in explore mode.
//!
//! Input accumulates into angular/zoom velocities, and each frame applies a
//! `damping` share of them, so motion coasts to a stop after the mouse is
//! released.

use bevy::prelude::*;

use crate::math;

/// Per-plugin configuration for the free orbit.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct OrbitConfig {
    /// Radians of rotation per pixel of drag.
    pub rotate_sensitivity: f32,
    /// Relative distance change per scroll line.
    pub zoom_sensitivity: f32,
    /// Share of the accumulated velocity applied (and consumed) per frame.
    pub damping: f32,
    /// Closest the camera may get to the target.
    pub min_distance: f32,
    /// Farthest the camera may get from the target.
    pub max_distance: f32,
    /// Margin from vertical to prevent camera flip (radians).
    pub pitch_margin: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            rotate_sensitivity: 0.005,
            zoom_sensitivity: 0.1,
            damping: 0.05,
            min_distance: 0.05,
            max_distance: 120.0,
            pitch_margin: 0.05,
        }
    }
}

/// One frame of raw pointer input.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrbitInput {
    /// Pixel drag while the orbit button is held.
    pub drag: Vec2,
    /// Scroll lines, positive = zoom in.
    pub scroll: f32,
}

impl OrbitInput {
    /// `true` if there is nothing to apply.
    pub fn is_idle(&self) -> bool {
        self.drag == Vec2::ZERO && self.scroll == 0.0
    }
}

/// Orbit state: target plus pending velocities.
#[derive(Clone, Debug)]
pub struct OrbitControl {
    cfg: OrbitConfig,
    enabled: bool,
    /// Point the camera orbits around and looks at.
    pub target: Vec3,
    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,
}

impl OrbitControl {
    /// Disabled orbit around the origin.
    pub fn new(cfg: &OrbitConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            enabled: false,
            target: Vec3::ZERO,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
        }
    }

    /// Start accepting input, orbiting around `target`.
    pub fn enable(&mut self, target: Vec3) {
        self.enabled = true;
        self.target = target;
    }

    /// Stop accepting input and drop any coasting motion.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.stop();
    }

    /// Whether input is accepted.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Drop coasting motion without changing the enabled flag.
    pub fn stop(&mut self) {
        self.yaw_velocity = 0.0;
        self.pitch_velocity = 0.0;
        self.zoom_velocity = 0.0;
    }

    /// `true` while motion is still coasting.
    pub fn is_moving(&self) -> bool {
        [self.yaw_velocity, self.pitch_velocity, self.zoom_velocity]
            .iter()
            .any(|v| v.abs() > 1e-5)
    }

    /// Accumulate pointer input. Ignored while disabled.
    pub fn push_input(&mut self, input: OrbitInput) {
        if !self.enabled || input.is_idle() {
            return;
        }
        self.yaw_velocity -= input.drag.x * self.cfg.rotate_sensitivity;
        self.pitch_velocity += input.drag.y * self.cfg.rotate_sensitivity;
        self.zoom_velocity -= input.scroll * self.cfg.zoom_sensitivity;
    }

    /// Apply one frame of damped motion to `position` and return the new one.
    pub fn step(&mut self, position: Vec3) -> Vec3 {
        let offset = position - self.target;
        let radius = offset.length();
        if !self.enabled || radius <= f32::EPSILON {
            return position;
        }

        let yaw = offset.x.atan2(offset.z);
        let pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();

        let d_yaw = self.yaw_velocity * self.cfg.damping;
        let d_pitch = self.pitch_velocity * self.cfg.damping;
        let d_zoom = self.zoom_velocity * self.cfg.damping;
        self.yaw_velocity -= d_yaw;
        self.pitch_velocity -= d_pitch;
        self.zoom_velocity -= d_zoom;

        let yaw = yaw + d_yaw;
        let pitch = pitch + math::clamp_pitch(pitch, d_pitch, self.cfg.pitch_margin);
        let radius = (radius * d_zoom.exp()).clamp(self.cfg.min_distance, self.cfg.max_distance);

        self.target
            + radius * Vec3::new(pitch.cos() * yaw.sin(), pitch.sin(), pitch.cos() * yaw.cos())
    }
}
