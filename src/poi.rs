//! Point-of-interest markers shown over the scene in explore mode.
//!
//! Each frame the overlay projects every point with the current
//! view-projection, keeps the ones inside the view frustum and records where
//! on screen their markers go. Clicking a marker focuses the camera on it.

use bevy::prelude::*;

use crate::context::{CameraDriver, Cue, SequencerContext, ms};
use crate::math;
use crate::navigation::NavMode;
use crate::tween::{Easing, Tween};

/// How the camera frames a point when its marker is clicked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct PoiFocus {
    /// Camera position relative to the point.
    pub camera_offset: Vec3,
    /// Orbit target relative to the point.
    pub target_offset: Vec3,
    /// Switch to the close-up near plane.
    pub clip_near: bool,
    /// Start the fov sway this long after the click.
    pub sway_after_ms: Option<u64>,
}

/// One point of interest.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct PointOfInterest {
    /// World position of the marker.
    pub position: Vec3,
    /// Close-up framing.
    pub focus: PoiFocus,
}

impl PointOfInterest {
    fn new(position: [f32; 3], target_offset: [f32; 3]) -> Self {
        Self {
            position: Vec3::from(position),
            focus: PoiFocus {
                target_offset: Vec3::from(target_offset),
                clip_near: true,
                ..default()
            },
        }
    }
}

/// Per-plugin configuration for the POI overlay.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct PoiConfig {
    /// Points in marker order.
    pub points: Vec<PointOfInterest>,
    /// Duration of the click-to-focus tweens.
    pub focus_duration_ms: u64,
    /// Duration of the "reset view" tweens.
    pub reset_duration_ms: u64,
    /// Near plane used for close-ups.
    pub clip_near: f32,
    /// Marker radius in logical pixels.
    pub marker_radius: f32,
}

impl Default for PoiConfig {
    fn default() -> Self {
        let mut points = vec![
            PointOfInterest::new([1.46, 0.582, -9.494], [-0.7, 0.2, 0.3]),
            PointOfInterest::new([7.0, 4.67, -4.88], [-0.2, -0.8, 1.0]),
            PointOfInterest::new([-0.256, 4.378, 0.0], [0.1, -0.1, 0.0]),
            PointOfInterest::new([-8.86, 2.0, 4.35], [0.03, -0.01, -0.05]),
            PointOfInterest::new([-3.39, 1.929, -14.442], [0.01, -0.02, 0.14]),
            PointOfInterest::new([-6.885, 2.256, -5.513], [0.2, -0.02, 0.14]),
        ];
        points[0].focus.camera_offset = Vec3::new(0.0, 0.1, 0.0);
        points[0].focus.clip_near = false;
        points[2].focus.camera_offset = Vec3::new(0.0, 0.2, 0.0);
        points[5].focus.sway_after_ms = Some(2_000);
        Self {
            points,
            focus_duration_ms: 2_000,
            reset_duration_ms: 1_000,
            clip_near: 1.0,
            marker_radius: 12.0,
        }
    }
}

/// Screen state of one marker.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Marker {
    /// Drawn this frame.
    pub visible: bool,
    /// Inside the view frustum as of the last update.
    pub in_frustum: bool,
    /// Viewport position in pixels (origin top-left).
    pub anchor: Vec2,
}

/// Marker visibility and anchors for all points.
#[derive(Clone, Debug)]
pub struct PoiOverlay {
    points: Vec<Vec3>,
    markers: Vec<Marker>,
    hidden: bool,
}

impl PoiOverlay {
    /// All markers hidden, hide toggle off.
    pub fn new(cfg: &PoiConfig) -> Self {
        Self {
            points: cfg.points.iter().map(|p| p.position).collect(),
            markers: vec![Marker::default(); cfg.points.len()],
            hidden: false,
        }
    }

    /// Re-project every point. A point is visible iff it lies inside the
    /// frustum and the user has not hidden the markers.
    pub fn update(&mut self, view_projection: Mat4, viewport: Vec2) {
        let hidden = self.hidden;
        for (point, marker) in self.points.iter().zip(&mut self.markers) {
            let clip = view_projection * point.extend(1.0);
            marker.in_frustum = in_frustum(clip);
            if marker.in_frustum {
                marker.anchor = math::ndc_to_viewport(clip.truncate().truncate() / clip.w, viewport);
            }
            marker.visible = marker.in_frustum && !hidden;
        }
    }

    /// Hide every marker (used outside explore mode).
    pub fn hide_all(&mut self) {
        for marker in &mut self.markers {
            marker.visible = false;
            marker.in_frustum = false;
        }
    }

    /// Flip the user hide toggle. Returns the new hidden state.
    pub fn toggle_hidden(&mut self) -> bool {
        self.hidden = !self.hidden;
        let hidden = self.hidden;
        for marker in &mut self.markers {
            marker.visible = marker.in_frustum && !hidden;
        }
        hidden
    }

    /// Whether the user hid the markers.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Clear the hide toggle and hide everything.
    pub fn reset(&mut self) {
        self.hidden = false;
        self.hide_all();
    }

    /// Marker state, in point order.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

/// Frustum containment in clip space. Points behind the camera (`w <= 0`)
/// are never contained.
fn in_frustum(clip: Vec4) -> bool {
    clip.w > 0.0
        && clip.x.abs() <= clip.w
        && clip.y.abs() <= clip.w
        && (0.0..=clip.w).contains(&clip.z)
}

impl SequencerContext {
    /// Marker click: ease camera and orbit target to the point's close-up.
    ///
    /// Returns `false` outside explore mode or for an unknown index.
    pub fn on_point_of_interest_click(&mut self, index: usize) -> bool {
        if self.mode != NavMode::Explore {
            return false;
        }
        let Some(point) = self.settings.poi.points.get(index).copied() else {
            warn!("click on unknown point of interest {index}");
            return false;
        };
        let duration = ms(self.settings.poi.focus_duration_ms);
        let focus = point.focus;

        let camera = Tween::new(
            self.pose.position,
            point.position + focus.camera_offset,
            duration,
        )
        .with_easing(Easing::OutQuad);
        self.target_tween = Some(
            Tween::new(self.orbit.target, point.position + focus.target_offset, duration)
                .with_easing(Easing::OutQuad),
        );
        self.drive_camera(CameraDriver::Poi, camera);

        let was_swaying = self.swaying;
        self.explore_timers.cancel_all(&mut self.scheduler);
        self.reset_poi_camera();
        if focus.clip_near || was_swaying {
            self.pose.near = self.settings.poi.clip_near;
        }
        if let Some(delay) = focus.sway_after_ms {
            let handle = self.scheduler.schedule(delay, Cue::StartSway);
            self.explore_timers.push(handle);
        }
        debug!("focus on point of interest {index}");
        true
    }

    /// Explore toolbar hide/show. Returns the new hidden state.
    pub fn toggle_poi_hidden(&mut self) -> bool {
        self.poi.toggle_hidden()
    }

    /// Explore toolbar "reset view": back to the vantage looking at the origin.
    pub fn reset_view(&mut self) {
        if self.mode != NavMode::Explore {
            return;
        }
        let duration = ms(self.settings.poi.reset_duration_ms);
        self.explore_timers.cancel_all(&mut self.scheduler);
        self.reset_poi_camera();
        let camera = Tween::new(
            self.pose.position,
            self.settings.navigation.explore_vantage,
            duration,
        )
        .with_easing(Easing::OutCirc);
        self.target_tween =
            Some(Tween::new(self.orbit.target, Vec3::ZERO, duration).with_easing(Easing::OutQuad));
        self.drive_camera(CameraDriver::Poi, camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CameraPose, PresentationSettings};

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

    fn overlay(points: &[Vec3]) -> PoiOverlay {
        let cfg = PoiConfig {
            points: points
                .iter()
                .map(|&position| PointOfInterest {
                    position,
                    focus: PoiFocus::default(),
                })
                .collect(),
            ..PoiConfig::default()
        };
        PoiOverlay::new(&cfg)
    }

    fn looking_down_minus_z() -> Mat4 {
        CameraPose {
            position: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            fov_degrees: 45.0,
            near: 0.01,
        }
        .view_projection(VIEWPORT.x / VIEWPORT.y, 200.0)
    }

    fn explore_ready() -> SequencerContext {
        let mut ctx = SequencerContext::new(PresentationSettings::default());
        ctx.on_enter_presentation();
        ctx.on_explore();
        for _ in 0..150 {
            ctx.tick(ms(20), VIEWPORT);
        }
        ctx
    }

    // ── visibility ──────────────────────────────────────────────────

    #[test]
    fn point_ahead_is_visible_at_screen_center() {
        let mut poi = overlay(&[Vec3::new(0.0, 0.0, -10.0)]);
        poi.update(looking_down_minus_z(), VIEWPORT);
        let m = poi.markers()[0];
        assert!(m.visible);
        assert!((m.anchor - VIEWPORT / 2.0).length() < 1e-2);
    }

    #[test]
    fn point_behind_camera_is_never_visible() {
        let mut poi = overlay(&[Vec3::new(0.0, 0.0, 10.0)]);
        for _ in 0..2 {
            poi.update(looking_down_minus_z(), VIEWPORT);
            assert!(!poi.markers()[0].visible);
            poi.toggle_hidden();
            assert!(!poi.markers()[0].visible);
        }
    }

    #[test]
    fn point_outside_field_of_view_is_hidden() {
        let mut poi = overlay(&[Vec3::new(50.0, 0.0, -1.0)]);
        poi.update(looking_down_minus_z(), VIEWPORT);
        assert!(!poi.markers()[0].visible);
    }

    #[test]
    fn point_past_far_plane_is_hidden() {
        let mut poi = overlay(&[Vec3::new(0.0, 0.0, -500.0)]);
        poi.update(looking_down_minus_z(), VIEWPORT);
        assert!(!poi.markers()[0].visible);
    }

    #[test]
    fn double_toggle_restores_frustum_visibility() {
        let mut poi = overlay(&[Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, 10.0)]);
        poi.update(looking_down_minus_z(), VIEWPORT);
        let before: Vec<bool> = poi.markers().iter().map(|m| m.visible).collect();
        assert!(poi.toggle_hidden());
        assert!(poi.markers().iter().all(|m| !m.visible));
        assert!(!poi.toggle_hidden());
        let after: Vec<bool> = poi.markers().iter().map(|m| m.visible).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn zero_points_is_a_no_op() {
        let mut poi = overlay(&[]);
        poi.update(looking_down_minus_z(), VIEWPORT);
        poi.toggle_hidden();
        assert!(poi.markers().is_empty());
    }

    #[test]
    fn markers_hide_outside_explore() {
        let mut ctx = explore_ready();
        assert!(ctx.poi().markers().iter().any(|m| m.visible));
        ctx.on_back();
        ctx.tick(ms(20), VIEWPORT);
        assert!(ctx.poi().markers().iter().all(|m| !m.visible));
        assert!(!ctx.poi().is_hidden());
    }

    #[test]
    fn visibility_follows_viewport_aspect() {
        let mut settings = PresentationSettings::default();
        let vantage = settings.navigation.explore_vantage;
        let forward = (Vec3::ZERO - vantage).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        // 45° fov at depth 10: half width is ~7.4 at 16:9 and ~2.3 at 9:16.
        let center = vantage + forward * 10.0;
        let edge = center + right * 5.0;
        settings.poi.points = [center, edge]
            .into_iter()
            .map(|position| PointOfInterest {
                position,
                focus: PoiFocus::default(),
            })
            .collect();
        let mut ctx = SequencerContext::new(settings);
        ctx.on_enter_presentation();
        ctx.on_explore();
        for _ in 0..100 {
            ctx.tick(ms(20), VIEWPORT);
        }

        let landscape = ctx.poi().markers().to_vec();
        assert!(landscape[0].visible && landscape[1].visible);
        assert!((landscape[0].anchor - VIEWPORT / 2.0).length() < 0.5);
        assert!(landscape[1].anchor.x > VIEWPORT.x / 2.0 && landscape[1].anchor.x < VIEWPORT.x);

        let portrait = Vec2::new(720.0, 1280.0);
        ctx.tick(ms(20), portrait);
        let markers = ctx.poi().markers();
        assert!(markers[0].visible);
        assert!((markers[0].anchor - portrait / 2.0).length() < 0.5);
        assert!(!markers[1].visible);
    }

    // ── focus ───────────────────────────────────────────────────────

    #[test]
    fn click_focuses_camera_and_target() {
        let mut ctx = explore_ready();
        assert!(ctx.on_point_of_interest_click(1));
        assert_eq!(ctx.camera_driver(), Some(CameraDriver::Poi));
        for _ in 0..100 {
            ctx.tick(ms(20), VIEWPORT);
        }
        let point = ctx.settings().poi.points[1];
        assert!((ctx.camera().position - point.position).length() < 1e-3);
        let target = point.position + point.focus.target_offset;
        assert!((ctx.orbit().target - target).length() < 1e-3);
        assert_eq!(ctx.camera().near, ctx.settings().poi.clip_near);
    }

    #[test]
    fn first_point_keeps_default_near_plane() {
        let mut ctx = explore_ready();
        ctx.on_point_of_interest_click(0);
        assert_eq!(ctx.camera().near, ctx.settings().navigation.near);
    }

    #[test]
    fn click_outside_explore_or_out_of_range_is_ignored() {
        let mut ctx = SequencerContext::new(PresentationSettings::default());
        assert!(!ctx.on_point_of_interest_click(0));
        let mut ctx = explore_ready();
        assert!(!ctx.on_point_of_interest_click(99));
        assert_eq!(ctx.camera_driver(), None);
    }

    #[test]
    fn swing_point_starts_sway_after_delay() {
        let mut ctx = explore_ready();
        ctx.on_point_of_interest_click(5);
        for _ in 0..99 {
            ctx.tick(ms(20), VIEWPORT);
        }
        assert!(!ctx.is_swaying());
        ctx.tick(ms(20), VIEWPORT);
        assert!(ctx.is_swaying());
        let base = ctx.settings().navigation.fov_degrees;
        assert!((ctx.camera().fov_degrees - base).abs() <= 1.0);
    }

    #[test]
    fn another_click_cancels_pending_sway() {
        let mut ctx = explore_ready();
        ctx.on_point_of_interest_click(5);
        ctx.on_point_of_interest_click(2);
        for _ in 0..200 {
            ctx.tick(ms(20), VIEWPORT);
        }
        assert!(!ctx.is_swaying());
    }

    #[test]
    fn reset_view_returns_to_vantage() {
        let mut ctx = explore_ready();
        ctx.on_point_of_interest_click(3);
        for _ in 0..100 {
            ctx.tick(ms(20), VIEWPORT);
        }
        ctx.reset_view();
        for _ in 0..50 {
            ctx.tick(ms(20), VIEWPORT);
        }
        let nav = ctx.settings().navigation.clone();
        assert!((ctx.camera().position - nav.explore_vantage).length() < 1e-3);
        assert!(ctx.orbit().target.length() < 1e-3);
        assert_eq!(ctx.camera().near, nav.near);
        assert_eq!(ctx.camera().fov_degrees, nav.fov_degrees);
    }
}
