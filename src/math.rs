//! Easing curves and small camera/screen formulas shared by the presentation.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::Vec2;

/// Quadratic ease-out curve: `1 - (1 - t)^2`.
///
/// The default curve for point-of-interest focus tweens.
pub fn ease_out_quad(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Circular ease-out curve: `sqrt(1 - (t - 1)^2)`.
///
/// Very steep start, long flat tail. Used for mode-switch camera moves.
pub fn ease_out_circ(t: f32) -> f32 {
    (1.0 - (t - 1.0).powi(2)).max(0.0).sqrt()
}

/// Pitch change that keeps the orbit `margin` radians away from the poles.
///
/// Returns the part of `delta` that can be applied to `current`.
pub fn clamp_pitch(current: f32, delta: f32, margin: f32) -> f32 {
    let pole = FRAC_PI_2 - margin;
    (current + delta).clamp(-pole, pole) - current
}

/// Maps normalized device coordinates (`[-1, 1]`, y up) to viewport pixels
/// (origin top-left, y down).
pub fn ndc_to_viewport(ndc: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(
        (ndc.x * 0.5 + 0.5) * viewport.x,
        (0.5 - ndc.y * 0.5) * viewport.y,
    )
}

/// Field of view for the swing sway, oscillating around `base_degrees`.
///
/// `fov = base - cos(base + 10 - t)`, so the sway amplitude is one degree.
pub fn sway_fov(base_degrees: f32, elapsed_secs: f32) -> f32 {
    base_degrees - (base_degrees + 10.0 - elapsed_secs).cos()
}

/// Converts a settled/total pair into a whole percentage in `[0, 100]`.
///
/// An empty load set counts as complete.
pub fn progress_percent(settled: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    ((settled.min(total) as f32 / total as f32) * 100.0).round() as u32
}
