//! Navigation modes and the transitions between them.
//!
//! The controller is the only code allowed to hand the camera from one driver
//! to another. Each transition first tears down the side effects of the mode
//! being left (timers, orbit, markers, lens tweaks) and only then starts the
//! new mode. Calling a transition that is already in its target state does
//! nothing.

use bevy::prelude::*;

use crate::cinematic::ArmOutcome;
use crate::context::{CameraDriver, Cue, SequencerContext, ms};
use crate::tween::{Easing, Tween};

/// Which of the three top-level modes is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum NavMode {
    /// Before the first engagement. Only the menu is interactive.
    #[default]
    Menu,
    /// The cinematic owns the camera (or has just finished and the menu shows).
    AutoPlay,
    /// Free orbit with POI markers.
    Explore,
}

/// Poses, durations and lens shared by the mode switches.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct NavigationConfig {
    /// Camera position when entering explore mode (looks at the origin).
    pub explore_vantage: Vec3,
    /// Duration of the ease into explore mode.
    pub explore_transition_ms: u64,
    /// Duration of the ease back to the resting wide shot.
    pub rest_transition_ms: u64,
    /// Restart the tour when leaving explore mode; show the menu otherwise.
    pub rearm_on_back: bool,
    /// Default vertical field of view.
    pub fov_degrees: f32,
    /// Default near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            explore_vantage: Vec3::new(-15.0, 8.0, 21.0),
            explore_transition_ms: 2_000,
            rest_transition_ms: 2_000,
            rearm_on_back: true,
            fov_degrees: 45.0,
            near: 0.01,
            far: 200.0,
        }
    }
}

impl SequencerContext {
    /// Leaving the loading screen: ease to the resting wide shot and show the menu.
    pub fn on_enter_presentation(&mut self) {
        if self.mode != NavMode::Menu || self.menu_visible {
            return;
        }
        self.pose.position = self.settings.navigation.explore_vantage;
        self.pose.look_at = Vec3::ZERO;
        self.fade.release();
        self.tween_to_rest();
        self.menu_visible = true;
        info!("presentation ready, showing menu");
    }

    /// Menu "start": begin the tour with scene music.
    ///
    /// From explore mode the back transition runs first.
    pub fn on_engage(&mut self) {
        match self.mode {
            NavMode::Explore => self.leave_explore(),
            NavMode::AutoPlay if self.is_cinematic_armed() => return,
            NavMode::Menu | NavMode::AutoPlay => {}
        }
        let previous = self.mode;
        match self.start_cinematic() {
            Ok(ArmOutcome::Armed { .. }) => {
                self.mode = NavMode::AutoPlay;
                self.menu_visible = false;
                self.music.play_once();
                info!("navigation: {previous:?} -> AutoPlay");
            }
            Ok(ArmOutcome::AlreadyArmed) => {}
            Err(err) => {
                error!("cannot start cinematic: {err}");
                self.menu_visible = true;
            }
        }
    }

    /// Menu "explore": hand the camera to the free orbit.
    pub fn on_explore(&mut self) {
        if self.mode == NavMode::Explore {
            return;
        }
        let previous = self.mode;
        self.cancel_cinematic();
        self.fade.release();

        let nav = &self.settings.navigation;
        let tween = Tween::new(
            self.pose.position,
            nav.explore_vantage,
            ms(nav.explore_transition_ms),
        )
        .with_easing(Easing::OutCirc);
        self.drive_camera(CameraDriver::Navigation, tween);
        self.orbit.enable(Vec3::ZERO);
        self.pose.look_at = Vec3::ZERO;
        self.mode = NavMode::Explore;
        self.menu_visible = false;
        info!("navigation: {previous:?} -> Explore");
    }

    /// Explore toolbar "back": leave explore mode and ease to the resting
    /// wide shot. Once there the tour restarts, or the menu shows right away
    /// when [`NavigationConfig::rearm_on_back`] is off.
    pub fn on_back(&mut self) {
        if self.mode != NavMode::Explore {
            return;
        }
        self.leave_explore();
        info!("navigation: Explore -> AutoPlay");
        if self.settings.navigation.rearm_on_back {
            let delay = self.settings.navigation.rest_transition_ms;
            self.pending_rearm = Some(self.scheduler.schedule(delay, Cue::Rearm));
        } else {
            self.menu_visible = true;
        }
    }

    /// "Back to menu" while the tour runs: stop it and show the menu.
    pub fn on_menu(&mut self) {
        match self.mode {
            NavMode::Menu => {}
            NavMode::Explore => {
                self.leave_explore();
                self.menu_visible = true;
            }
            NavMode::AutoPlay => {
                if self.menu_visible && !self.is_cinematic_armed() {
                    return;
                }
                self.cancel_cinematic();
                self.fade.release();
                self.pose.look_at = Vec3::ZERO;
                self.tween_to_rest();
                self.music.stop();
                self.menu_visible = true;
                info!("navigation: cinematic stopped, showing menu");
            }
        }
    }

    /// The tour ran to its end.
    pub(crate) fn on_complete(&mut self) {
        self.cinematic.cancel(&mut self.scheduler);
        self.menu_visible = true;
        self.music.stop();
        self.reset_poi_camera();
        info!("cinematic complete");
    }

    fn leave_explore(&mut self) {
        self.orbit.disable();
        self.poi.reset();
        self.explore_timers.cancel_all(&mut self.scheduler);
        self.target_tween = None;
        self.reset_poi_camera();
        self.fade.release();
        self.pose.look_at = Vec3::ZERO;
        self.tween_to_rest();
        self.music.stop();
        self.mode = NavMode::AutoPlay;
    }

    fn tween_to_rest(&mut self) {
        let tween = Tween::new(
            self.pose.position,
            self.settings.cinematic.rest_position,
            ms(self.settings.navigation.rest_transition_ms),
        )
        .with_easing(Easing::OutCirc);
        self.drive_camera(CameraDriver::Navigation, tween);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MusicCommand;
    use crate::context::PresentationSettings;
    use crate::orbit::OrbitInput;

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

    fn run(ctx: &mut SequencerContext, total_ms: u64) {
        for _ in 0..total_ms / 20 {
            ctx.tick(ms(20), VIEWPORT);
        }
    }

    fn presented() -> SequencerContext {
        let mut ctx = SequencerContext::new(PresentationSettings::default());
        ctx.on_enter_presentation();
        ctx
    }

    // ── engage ──────────────────────────────────────────────────────

    #[test]
    fn entering_presentation_shows_menu_at_rest() {
        let mut ctx = presented();
        assert!(ctx.menu_visible());
        assert_eq!(ctx.mode(), NavMode::Menu);
        run(&mut ctx, 2_000);
        let rest = ctx.settings().cinematic.rest_position;
        assert!((ctx.camera().position - rest).length() < 1e-3);
    }

    #[test]
    fn engage_arms_tour_and_starts_music() {
        let mut ctx = presented();
        ctx.on_engage();
        assert_eq!(ctx.mode(), NavMode::AutoPlay);
        assert!(!ctx.menu_visible());
        assert!(ctx.is_cinematic_armed());
        assert_eq!(ctx.music_mut().take_commands(), vec![MusicCommand::Start { looped: false }]);
    }

    #[test]
    fn engage_twice_does_not_rearm() {
        let mut ctx = presented();
        ctx.on_engage();
        let handles: Vec<_> = ctx.cinematic_handles().iter().collect();
        ctx.on_engage();
        let again: Vec<_> = ctx.cinematic_handles().iter().collect();
        assert_eq!(handles, again);
    }

    #[test]
    fn invalid_timeline_keeps_previous_mode() {
        let mut settings = PresentationSettings::default();
        settings.cinematic.waypoints.clear();
        let mut ctx = SequencerContext::new(settings);
        ctx.on_enter_presentation();
        ctx.on_engage();
        assert_eq!(ctx.mode(), NavMode::Menu);
        assert!(ctx.menu_visible());
        assert!(ctx.scheduler().is_empty());
    }

    // ── explore ─────────────────────────────────────────────────────

    #[test]
    fn explore_cancels_tour_and_enables_orbit() {
        let mut ctx = presented();
        ctx.on_engage();
        run(&mut ctx, 12_000);
        ctx.on_explore();

        assert_eq!(ctx.mode(), NavMode::Explore);
        assert!(!ctx.is_cinematic_armed());
        assert!(ctx.orbit().is_enabled());
        assert_eq!(ctx.orbit().target, Vec3::ZERO);
        assert_eq!(ctx.camera_driver(), Some(CameraDriver::Navigation));

        run(&mut ctx, 2_000);
        let vantage = ctx.settings().navigation.explore_vantage;
        assert!((ctx.camera().position - vantage).length() < 1e-3);
        assert!(ctx.accepts_orbit_input());
        assert!(ctx.fade().value() < 1e-3);
    }

    #[test]
    fn orbit_input_is_ignored_while_a_tween_drives_the_camera() {
        let mut ctx = presented();
        ctx.on_explore();
        ctx.push_orbit_input(OrbitInput {
            drag: Vec2::new(500.0, 0.0),
            scroll: 0.0,
        });
        assert!(!ctx.orbit().is_moving());
    }

    #[test]
    fn explore_twice_is_a_no_op() {
        let mut ctx = presented();
        ctx.on_explore();
        run(&mut ctx, 2_500);
        let before = ctx.camera();
        ctx.on_explore();
        assert_eq!(ctx.camera_driver(), None);
        assert_eq!(ctx.camera(), before);
    }

    // ── back ────────────────────────────────────────────────────────

    #[test]
    fn autoplay_explore_autoplay_leaves_no_stale_handles() {
        let mut ctx = presented();
        ctx.on_engage();
        run(&mut ctx, 15_000);
        let first_run: Vec<_> = ctx.cinematic_handles().iter().collect();
        assert!(!first_run.is_empty());

        ctx.on_explore();
        run(&mut ctx, 3_000);
        ctx.on_back();

        assert_eq!(ctx.mode(), NavMode::AutoPlay);
        assert!(!ctx.orbit().is_enabled());
        assert!(first_run.iter().all(|&h| !ctx.scheduler().is_pending(h)));
        assert!(ctx.poi().markers().iter().all(|m| !m.visible));
    }

    #[test]
    fn back_eases_to_rest_before_rearming() {
        let mut ctx = presented();
        ctx.on_explore();
        run(&mut ctx, 2_000);
        ctx.on_point_of_interest_click(3);
        run(&mut ctx, 2_000);

        ctx.on_back();
        let rest = ctx.settings().cinematic.rest_position;
        let start = (ctx.camera().position - rest).length();
        assert_eq!(ctx.camera_driver(), Some(CameraDriver::Navigation));
        assert!(!ctx.is_cinematic_armed());
        assert!(ctx.is_rearm_pending());

        run(&mut ctx, 1_000);
        assert!((ctx.camera().position - rest).length() < start * 0.5);
        assert!(!ctx.is_cinematic_armed());

        run(&mut ctx, 1_000);
        assert!(ctx.is_cinematic_armed());
        assert!(!ctx.is_rearm_pending());
        assert!((ctx.camera().position - rest).length() < 0.1);
        assert_eq!(ctx.camera_driver(), Some(CameraDriver::Cinematic));
    }

    #[test]
    fn back_rearms_from_the_beginning() {
        let mut ctx = presented();
        ctx.on_explore();
        ctx.on_back();
        run(&mut ctx, 2_000);
        assert!(ctx.is_cinematic_armed());
        let k = ctx.settings().cinematic.waypoints.len();
        assert_eq!(ctx.scheduler().len(), 2 * (k - 1) + 1);
        assert!(!ctx.menu_visible());
    }

    #[test]
    fn menu_while_easing_back_cancels_the_restart() {
        let mut ctx = presented();
        ctx.on_explore();
        ctx.on_back();
        ctx.on_menu();
        assert!(ctx.menu_visible());
        assert!(!ctx.is_rearm_pending());
        run(&mut ctx, 3_000);
        assert!(!ctx.is_cinematic_armed());
        assert!(ctx.menu_visible());
    }

    #[test]
    fn back_without_rearm_shows_menu() {
        let mut settings = PresentationSettings::default();
        settings.navigation.rearm_on_back = false;
        let mut ctx = SequencerContext::new(settings);
        ctx.on_enter_presentation();
        ctx.on_explore();
        ctx.on_back();
        assert_eq!(ctx.mode(), NavMode::AutoPlay);
        assert!(ctx.menu_visible());
        assert!(ctx.scheduler().is_empty());
        run(&mut ctx, 2_000);
        let rest = ctx.settings().cinematic.rest_position;
        assert!((ctx.camera().position - rest).length() < 1e-3);
    }

    #[test]
    fn back_outside_explore_is_a_no_op() {
        let mut ctx = presented();
        ctx.on_engage();
        let pending = ctx.scheduler().len();
        ctx.on_back();
        assert_eq!(ctx.mode(), NavMode::AutoPlay);
        assert_eq!(ctx.scheduler().len(), pending);
    }

    #[test]
    fn back_resets_lens_and_stops_music() {
        let mut ctx = presented();
        ctx.on_explore();
        run(&mut ctx, 2_000);
        ctx.on_point_of_interest_click(5);
        run(&mut ctx, 4_000);
        assert!(ctx.is_swaying());
        ctx.music_mut().take_commands();

        ctx.on_back();
        assert!(!ctx.is_swaying());
        let nav = ctx.settings().navigation.clone();
        assert_eq!(ctx.camera().fov_degrees, nav.fov_degrees);
        assert_eq!(ctx.camera().near, nav.near);
        assert_eq!(ctx.music_mut().take_commands()[0], MusicCommand::Stop);
    }

    // ── menu ────────────────────────────────────────────────────────

    #[test]
    fn menu_during_tour_cancels_and_shows_menu() {
        let mut ctx = presented();
        ctx.on_engage();
        run(&mut ctx, 20_000);
        ctx.on_menu();
        assert!(ctx.menu_visible());
        assert!(!ctx.is_cinematic_armed());
        assert!(ctx.scheduler().is_empty());
        assert_eq!(ctx.camera_driver(), Some(CameraDriver::Navigation));

        ctx.on_menu();
        assert!(ctx.menu_visible());
    }

    #[test]
    fn start_after_menu_runs_a_fresh_tour() {
        let mut ctx = presented();
        ctx.on_engage();
        run(&mut ctx, 5_000);
        ctx.on_menu();
        ctx.on_engage();
        assert!(ctx.is_cinematic_armed());
        assert!(!ctx.menu_visible());
    }
}
