//! Runtime state of the presentation.
//!
//! [`SequencerContext`] is the single owner of everything that changes while
//! the presentation runs: camera pose, navigation mode, the timer queue and
//! the handle sets living in it, the camera/target tweens, the fade, the free
//! orbit, the POI overlay and the music state. The navigation, cinematic and
//! POI operations are methods on it, so the camera is only ever written
//! through one place. Bevy systems in [`systems`] feed it time and input and
//! copy its pose onto the camera entity.

mod systems;

use std::time::Duration;

use bevy::prelude::*;

use crate::GameState;
use crate::audio::MusicState;
use crate::cinematic::{
    ArmOutcome, CinematicConfig, CinematicCue, CinematicSequencer, EventKind, InvalidTimelineError,
};
use crate::fade::{FadeConfig, TransitionFade};
use crate::math;
use crate::navigation::{NavMode, NavigationConfig};
use crate::orbit::{OrbitConfig, OrbitControl, OrbitInput};
use crate::poi::{PoiConfig, PoiOverlay};
use crate::scheduler::{HandleSet, TimerHandle, TimerScheduler};
use crate::tween::{Playback, Tween};

/// Every tunable the context is built from.
#[derive(Clone, Debug, Default)]
pub struct PresentationSettings {
    /// Tour layout and pacing.
    pub cinematic: CinematicConfig,
    /// Transition fade timing.
    pub fade: FadeConfig,
    /// Mode switch poses and lens.
    pub navigation: NavigationConfig,
    /// Free orbit feel.
    pub orbit: OrbitConfig,
    /// Points of interest.
    pub poi: PoiConfig,
}

/// Drives the presentation: cinematic, navigation, orbit and POI overlay.
pub struct PresentationPlugin(pub PresentationSettings);

impl Plugin for PresentationPlugin {
    fn build(&self, app: &mut App) {
        let settings = &self.0;
        app.register_type::<CinematicConfig>()
            .register_type::<FadeConfig>()
            .register_type::<NavigationConfig>()
            .register_type::<OrbitConfig>()
            .register_type::<PoiConfig>()
            .insert_resource(settings.cinematic.clone())
            .insert_resource(settings.fade.clone())
            .insert_resource(settings.navigation.clone())
            .insert_resource(settings.orbit.clone())
            .insert_resource(settings.poi.clone())
            .insert_resource(SequencerContext::new(settings.clone()))
            .add_systems(OnExit(GameState::Loading), systems::enter_presentation)
            .add_systems(
                Update,
                (
                    systems::read_orbit_input,
                    systems::tick_context,
                    systems::sync_camera,
                )
                    .chain()
                    .run_if(not(in_state(GameState::Loading))),
            );
    }
}

/// Where the camera is and how it sees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    /// World position.
    pub position: Vec3,
    /// Point the camera faces.
    pub look_at: Vec3,
    /// Vertical field of view.
    pub fov_degrees: f32,
    /// Near clip plane.
    pub near: f32,
}

impl CameraPose {
    /// Combined projection * view matrix for a viewport of `aspect` ratio.
    pub fn view_projection(&self, aspect: f32, far: f32) -> Mat4 {
        let projection =
            Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, self.near, far);
        projection * Mat4::look_at_rh(self.position, self.look_at, Vec3::Y)
    }
}

/// Who is currently moving the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraDriver {
    /// Approach and return tweens of the tour.
    Cinematic,
    /// Mode switch tweens.
    Navigation,
    /// POI focus and view reset.
    Poi,
}

#[derive(Clone, Debug)]
pub(crate) struct DrivenTween {
    pub(crate) driver: CameraDriver,
    pub(crate) tween: Tween<Vec3>,
}

/// Everything that can sit in the timer queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// Owned by the tour.
    Cinematic(CinematicCue),
    /// Start the fov sway after a POI focus (explore only).
    StartSway,
    /// Restart the tour once the camera is back at rest after leaving explore.
    Rearm,
}

impl From<CinematicCue> for Cue {
    fn from(cue: CinematicCue) -> Self {
        Cue::Cinematic(cue)
    }
}

pub(crate) fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Runtime owner of the presentation state. See the module docs.
#[derive(Resource)]
pub struct SequencerContext {
    pub(crate) settings: PresentationSettings,
    pub(crate) pose: CameraPose,
    pub(crate) mode: NavMode,
    pub(crate) menu_visible: bool,
    pub(crate) scheduler: TimerScheduler<Cue>,
    pub(crate) cinematic: CinematicSequencer,
    pub(crate) explore_timers: HandleSet,
    pub(crate) pending_rearm: Option<TimerHandle>,
    pub(crate) camera_tween: Option<DrivenTween>,
    pub(crate) target_tween: Option<Tween<Vec3>>,
    pub(crate) fade: TransitionFade,
    pub(crate) orbit: OrbitControl,
    pub(crate) poi: PoiOverlay,
    pub(crate) swaying: bool,
    pub(crate) music: MusicState,
}

impl SequencerContext {
    /// Fresh context in [`NavMode::Menu`], camera at the explore vantage.
    pub fn new(settings: PresentationSettings) -> Self {
        let pose = CameraPose {
            position: settings.navigation.explore_vantage,
            look_at: Vec3::ZERO,
            fov_degrees: settings.navigation.fov_degrees,
            near: settings.navigation.near,
        };
        let fade = TransitionFade::new(&settings.fade);
        let orbit = OrbitControl::new(&settings.orbit);
        let poi = PoiOverlay::new(&settings.poi);
        Self {
            settings,
            pose,
            mode: NavMode::Menu,
            menu_visible: false,
            scheduler: TimerScheduler::new(),
            cinematic: CinematicSequencer::default(),
            explore_timers: HandleSet::default(),
            pending_rearm: None,
            camera_tween: None,
            target_tween: None,
            fade,
            orbit,
            poi,
            swaying: false,
            music: MusicState::default(),
        }
    }

    /// Settings this context was built from.
    pub fn settings(&self) -> &PresentationSettings {
        &self.settings
    }

    /// Current navigation mode.
    pub fn mode(&self) -> NavMode {
        self.mode
    }

    /// Whether the main menu should be on screen.
    pub fn menu_visible(&self) -> bool {
        self.menu_visible
    }

    /// The camera as it should be rendered this frame.
    ///
    /// In explore mode the camera faces the orbit target, otherwise the
    /// look-at point set by the tour or the last mode switch.
    pub fn camera(&self) -> CameraPose {
        CameraPose {
            look_at: self.look_target(),
            ..self.pose
        }
    }

    fn look_target(&self) -> Vec3 {
        match self.mode {
            NavMode::Explore => self.orbit.target,
            NavMode::Menu | NavMode::AutoPlay => self.pose.look_at,
        }
    }

    /// The driver of the camera tween that is currently advancing, if any.
    pub fn camera_driver(&self) -> Option<CameraDriver> {
        self.camera_tween
            .as_ref()
            .filter(|d| d.tween.is_playing())
            .map(|d| d.driver)
    }

    /// Transition fade state.
    pub fn fade(&self) -> &TransitionFade {
        &self.fade
    }

    /// Free orbit state.
    pub fn orbit(&self) -> &OrbitControl {
        &self.orbit
    }

    /// POI markers as of the last tick.
    pub fn poi(&self) -> &PoiOverlay {
        &self.poi
    }

    /// Music state, including commands not yet applied.
    pub fn music(&self) -> &MusicState {
        &self.music
    }

    /// Mutable music state for the audio glue.
    pub fn music_mut(&mut self) -> &mut MusicState {
        &mut self.music
    }

    /// The timer queue.
    pub fn scheduler(&self) -> &TimerScheduler<Cue> {
        &self.scheduler
    }

    /// Handles of the current (or last) tour.
    pub fn cinematic_handles(&self) -> &HandleSet {
        self.cinematic.handles()
    }

    /// `true` while the tour has pending cues.
    pub fn is_cinematic_armed(&self) -> bool {
        self.cinematic.is_armed(&self.scheduler)
    }

    /// `true` while the fov sway runs.
    pub fn is_swaying(&self) -> bool {
        self.swaying
    }

    /// Seconds since the context was created, on the scheduler clock.
    pub fn elapsed_secs(&self) -> f32 {
        self.scheduler.now_ms() as f32 / 1000.0
    }

    /// `true` when user orbit input should move the camera.
    pub fn accepts_orbit_input(&self) -> bool {
        self.mode == NavMode::Explore && self.orbit.is_enabled() && self.camera_driver().is_none()
    }

    /// Feed one frame of pointer input to the free orbit.
    pub fn push_orbit_input(&mut self, input: OrbitInput) {
        if self.accepts_orbit_input() {
            self.orbit.push_input(input);
        }
    }

    /// Advance everything by `dt`.
    ///
    /// Due cues are dispatched first, then tweens advance, then the orbit
    /// applies, then POI markers are refreshed against a `viewport` of that
    /// size (pixels).
    pub fn tick(&mut self, dt: Duration, viewport: Vec2) {
        self.scheduler.advance(dt);
        while let Some((_, cue)) = self.scheduler.pop_due() {
            self.dispatch(cue);
        }

        if let Some(driven) = &mut self.camera_tween {
            if driven.tween.is_playing() {
                self.pose.position = driven.tween.tick(dt);
            }
            if driven.tween.playback() == Playback::Finished {
                self.camera_tween = None;
            }
        }
        if let Some(tween) = &mut self.target_tween {
            self.orbit.target = tween.tick(dt);
            if !tween.is_playing() {
                self.target_tween = None;
            }
        }
        self.fade.tick(dt);

        if self.accepts_orbit_input() {
            self.pose.position = self.orbit.step(self.pose.position);
        }
        if self.swaying {
            self.pose.fov_degrees =
                math::sway_fov(self.settings.navigation.fov_degrees, self.elapsed_secs());
        }
        self.refresh_markers(viewport);
    }

    fn refresh_markers(&mut self, viewport: Vec2) {
        if self.mode != NavMode::Explore || viewport.x <= 0.0 || viewport.y <= 0.0 {
            self.poi.hide_all();
            return;
        }
        let view_projection = self
            .camera()
            .view_projection(viewport.x / viewport.y, self.settings.navigation.far);
        self.poi.update(view_projection, viewport);
    }

    fn dispatch(&mut self, cue: Cue) {
        match cue {
            Cue::Cinematic(cue) => self.dispatch_cinematic(cue),
            Cue::StartSway => {
                if self.mode == NavMode::Explore {
                    self.swaying = true;
                }
            }
            Cue::Rearm => {
                self.pending_rearm = None;
                if self.mode == NavMode::AutoPlay {
                    self.on_engage();
                }
            }
        }
    }

    fn dispatch_cinematic(&mut self, cue: CinematicCue) {
        match cue {
            CinematicCue::Event(EventKind::TransitionStart { waypoint }) => {
                debug!("transition to waypoint {waypoint}");
                self.begin_fade();
            }
            CinematicCue::Event(EventKind::CameraMove { waypoint }) => {
                let Some(wp) = self.settings.cinematic.waypoints.get(waypoint).copied() else {
                    warn!("camera move to unknown waypoint {waypoint}");
                    return;
                };
                self.camera_tween = None;
                self.pose.position = wp.camera_position;
                self.pose.look_at = wp.look_at;
            }
            CinematicCue::Event(EventKind::ReturnToRest) => {
                self.begin_fade();
                let lead = self.settings.cinematic.return_lead_ms;
                self.cinematic
                    .follow_up(&mut self.scheduler, lead, CinematicCue::BeginReturn);
            }
            CinematicCue::FadeOut => self.fade.play_out(),
            CinematicCue::BeginReturn => {
                let cfg = &self.settings.cinematic;
                let from = cfg
                    .waypoints
                    .first()
                    .map_or(self.pose.position, |wp| wp.camera_position);
                let tween = Tween::new(from, cfg.rest_position, ms(cfg.return_duration_ms));
                let completion = cfg.completion_delay_ms;
                self.pose.look_at = Vec3::ZERO;
                self.drive_camera(CameraDriver::Cinematic, tween);
                self.cinematic
                    .follow_up(&mut self.scheduler, completion, CinematicCue::Complete);
            }
            CinematicCue::Complete => self.on_complete(),
        }
    }

    fn begin_fade(&mut self) {
        self.fade.play_in();
        let hold = self.settings.fade.hold_ms;
        self.cinematic
            .follow_up(&mut self.scheduler, hold, CinematicCue::FadeOut);
    }

    pub(crate) fn drive_camera(&mut self, driver: CameraDriver, tween: Tween<Vec3>) {
        self.orbit.stop();
        self.camera_tween = Some(DrivenTween { driver, tween });
    }

    /// Arm the tour and start the approach tween to the first waypoint.
    pub(crate) fn start_cinematic(&mut self) -> Result<ArmOutcome, InvalidTimelineError> {
        let outcome = self
            .cinematic
            .arm(&self.settings.cinematic, &mut self.scheduler)?;
        if let ArmOutcome::Armed { cues } = outcome {
            self.cancel_rearm();
            let cfg = &self.settings.cinematic;
            if let Some(first) = cfg.waypoints.first().copied() {
                let tween = Tween::new(
                    self.pose.position,
                    first.camera_position,
                    ms(cfg.approach_duration_ms),
                )
                .with_delay(ms(cfg.overlap_ms));
                self.pose.look_at = first.look_at;
                self.drive_camera(CameraDriver::Cinematic, tween);
            }
            info!("cinematic armed with {cues} cues");
        }
        Ok(outcome)
    }

    /// Cancel the tour, freezing its fade and camera tween where they are.
    pub(crate) fn cancel_cinematic(&mut self) -> usize {
        let dropped = self.cinematic.cancel(&mut self.scheduler);
        self.cancel_rearm();
        self.fade.pause();
        if let Some(driven) = &mut self.camera_tween
            && driven.driver == CameraDriver::Cinematic
        {
            driven.tween.pause();
        }
        if dropped > 0 {
            info!("cinematic canceled, {dropped} cues dropped");
        }
        dropped
    }

    /// `true` while the tour waits for the camera to reach rest before restarting.
    pub fn is_rearm_pending(&self) -> bool {
        self.pending_rearm
            .is_some_and(|handle| self.scheduler.is_pending(handle))
    }

    fn cancel_rearm(&mut self) {
        if let Some(handle) = self.pending_rearm.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Restore the lens tweaked by POI focus and stop the sway.
    pub(crate) fn reset_poi_camera(&mut self) {
        self.swaying = false;
        self.pose.fov_degrees = self.settings.navigation.fov_degrees;
        self.pose.near = self.settings.navigation.near;
    }

    /// Play/pause toggle from the explore toolbar.
    pub fn toggle_music(&mut self) {
        self.music.toggle();
    }

    /// Stop button from the explore toolbar.
    pub fn stop_music(&mut self) {
        self.music.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

    fn run(ctx: &mut SequencerContext, total_ms: u64) {
        for _ in 0..total_ms / 20 {
            ctx.tick(ms(20), VIEWPORT);
        }
    }

    // ── tour playback ───────────────────────────────────────────────

    #[test]
    fn approach_holds_then_reaches_first_waypoint() {
        let mut ctx = SequencerContext::new(PresentationSettings::default());
        ctx.pose.position = ctx.settings.cinematic.rest_position;
        ctx.start_cinematic().unwrap();
        assert_eq!(ctx.camera_driver(), Some(CameraDriver::Cinematic));

        run(&mut ctx, 1_000);
        assert_eq!(ctx.pose.position, ctx.settings.cinematic.rest_position);

        run(&mut ctx, 10_600);
        let first = ctx.settings.cinematic.waypoints[0].camera_position;
        assert!((ctx.pose.position - first).length() < 1e-3);
        assert_eq!(ctx.camera_driver(), None);
    }

    #[test]
    fn camera_move_cue_jumps_to_waypoint() {
        let mut ctx = SequencerContext::new(PresentationSettings::default());
        ctx.start_cinematic().unwrap();
        run(&mut ctx, 12_400);
        let wp = ctx.settings.cinematic.waypoints[1];
        assert_eq!(ctx.pose.position, wp.camera_position);
        assert_eq!(ctx.camera().look_at, wp.look_at);
    }

    #[test]
    fn transition_fades_in_and_back_out() {
        let mut ctx = SequencerContext::new(PresentationSettings::default());
        ctx.start_cinematic().unwrap();
        run(&mut ctx, 11_400 + 1_500);
        assert!(ctx.fade().opacity() > 0.99);
        run(&mut ctx, 2_000 + 1_500);
        assert!(ctx.fade().value() < 1e-3);
    }

    #[test]
    fn full_tour_returns_to_rest_and_shows_menu() {
        let mut ctx = SequencerContext::new(PresentationSettings::default());
        ctx.mode = NavMode::AutoPlay;
        ctx.start_cinematic().unwrap();
        let cfg = ctx.settings.cinematic.clone();
        let end = cfg.segment_ms * cfg.waypoints.len() as u64 + cfg.completion_delay_ms;
        run(&mut ctx, end);

        assert!(ctx.menu_visible());
        assert!(!ctx.is_cinematic_armed());
        assert!(ctx.scheduler().is_empty());
        assert_eq!(ctx.camera().look_at, Vec3::ZERO);

        run(&mut ctx, cfg.return_duration_ms);
        assert!((ctx.pose.position - cfg.rest_position).length() < 1e-3);
    }

    // ── cancel ──────────────────────────────────────────────────────

    #[test]
    fn cancel_freezes_fade_and_approach() {
        let mut ctx = SequencerContext::new(PresentationSettings::default());
        ctx.pose.position = ctx.settings.cinematic.rest_position;
        ctx.start_cinematic().unwrap();
        run(&mut ctx, 4_000);
        assert!(ctx.cancel_cinematic() > 0);
        let frozen = ctx.pose.position;
        run(&mut ctx, 4_000);
        assert_eq!(ctx.pose.position, frozen);
        assert_eq!(ctx.camera_driver(), None);
        assert!(ctx.scheduler().is_empty());
        assert_eq!(ctx.cancel_cinematic(), 0);
    }

    #[test]
    fn sway_cue_is_ignored_outside_explore() {
        let mut ctx = SequencerContext::new(PresentationSettings::default());
        ctx.scheduler.schedule(0, Cue::StartSway);
        ctx.tick(ms(16), VIEWPORT);
        assert!(!ctx.is_swaying());
    }

    // ── camera pose ─────────────────────────────────────────────────

    #[test]
    fn point_ahead_projects_inside_clip_space() {
        let pose = CameraPose {
            position: Vec3::new(0.0, 0.0, 10.0),
            look_at: Vec3::ZERO,
            fov_degrees: 45.0,
            near: 0.01,
        };
        let clip = pose.view_projection(16.0 / 9.0, 200.0) * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.w > 0.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }
}
