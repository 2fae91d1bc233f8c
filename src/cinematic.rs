//! Scripted camera tour.
//!
//! [`CinematicSequencer::arm`] turns the waypoint list into a table of timed
//! cues (see [`timeline`]) and schedules them. The context dispatches them as
//! they come due. Every handle the tour creates, including follow-up cues
//! scheduled while it runs, lives in one [`HandleSet`] so a single
//! [`CinematicSequencer::cancel`] stops everything.

pub mod timeline;

pub use timeline::{EventKind, InvalidTimelineError, TimelineEvent, build_timeline};

use bevy::prelude::*;

use crate::scheduler::{HandleSet, TimerHandle, TimerScheduler};

/// One stop of the tour.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct Waypoint {
    /// Where the camera sits.
    pub camera_position: Vec3,
    /// What the camera looks at.
    pub look_at: Vec3,
    /// Position in the visiting order; must match the list index.
    pub sequence_index: u32,
}

impl Waypoint {
    /// Convenience constructor.
    pub const fn new(sequence_index: u32, camera_position: Vec3, look_at: Vec3) -> Self {
        Self {
            camera_position,
            look_at,
            sequence_index,
        }
    }
}

/// Lead time subtracted from a waypoint's nominal slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub struct Padding {
    /// Subtracted for the fade that masks the cut.
    pub transition_ms: u64,
    /// Subtracted for the cut itself.
    pub move_ms: u64,
}

/// Tour layout and pacing.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct CinematicConfig {
    /// Stops in visiting order. Index 0 is the approach pose.
    pub waypoints: Vec<Waypoint>,
    /// Nominal time per waypoint.
    pub segment_ms: u64,
    /// Global lead subtracted from every slot; also the approach delay.
    pub overlap_ms: u64,
    /// Per-waypoint padding, starting at waypoint 1. The last entry repeats.
    pub paddings: Vec<Padding>,
    /// Padding of the final return-to-rest event.
    pub final_padding_ms: u64,
    /// Duration of the smooth approach from rest to waypoint 0.
    pub approach_duration_ms: u64,
    /// Delay between the return fade and the camera starting home.
    pub return_lead_ms: u64,
    /// Duration of the ease back to the resting wide shot.
    pub return_duration_ms: u64,
    /// Delay between starting home and signaling completion.
    pub completion_delay_ms: u64,
    /// Camera position of the resting wide shot (looks at the origin).
    pub rest_position: Vec3,
}

impl Default for CinematicConfig {
    fn default() -> Self {
        let wp = |i, p: [f32; 3], l: [f32; 3]| Waypoint::new(i, Vec3::from(p), Vec3::from(l));
        Self {
            waypoints: vec![
                wp(0, [-15.0, 8.0, 21.0], [0.0, 0.0, 0.0]),
                wp(1, [-9.75, 2.75, 12.48], [-1.93, 1.15, 0.0]),
                wp(2, [10.16, 2.87, 14.58], [1.15, 1.87, -4.14]),
                wp(3, [-5.0, 5.86, -12.03], [-1.05, -2.37, -16.49]),
                wp(4, [-4.38, 9.56, -18.13], [0.39, 0.0, -5.78]),
                wp(5, [1.3, 0.6, -9.5], [-14.2, 3.43, -0.53]),
                wp(6, [-13.82, 2.21, -3.31], [-2.25, -0.61, -3.58]),
                wp(7, [4.75, 0.63, -4.68], [0.0, 1.152, 0.0]),
                wp(8, [8.92, 5.61, -5.28], [3.35, -1.93, 0.943]),
            ],
            segment_ms: 13_900,
            overlap_ms: 1_500,
            paddings: vec![
                Padding {
                    transition_ms: 1_000,
                    move_ms: 0,
                },
                Padding {
                    transition_ms: 3_500,
                    move_ms: 2_500,
                },
                Padding {
                    transition_ms: 4_500,
                    move_ms: 3_500,
                },
            ],
            final_padding_ms: 3_000,
            approach_duration_ms: 10_000,
            return_lead_ms: 1_000,
            return_duration_ms: 16_000,
            completion_delay_ms: 11_000,
            rest_position: Vec3::new(-50.0, 17.0, 82.0),
        }
    }
}

/// Cues owned by the tour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CinematicCue {
    /// A timeline row came due.
    Event(EventKind),
    /// End of the fade hold.
    FadeOut,
    /// Start easing home after the final fade.
    BeginReturn,
    /// The tour is over.
    Complete,
}

/// Result of [`CinematicSequencer::arm`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArmOutcome {
    /// Fresh timeline scheduled with this many cues.
    Armed {
        /// Number of timeline cues scheduled.
        cues: usize,
    },
    /// A previous arm still has pending cues; nothing was scheduled.
    AlreadyArmed,
}

/// Owns the handle set of the running tour.
#[derive(Clone, Debug, Default)]
pub struct CinematicSequencer {
    handles: HandleSet,
}

impl CinematicSequencer {
    /// `true` while any cue of the current tour is still pending.
    pub fn is_armed<T>(&self, scheduler: &TimerScheduler<T>) -> bool {
        self.handles.pending(scheduler) > 0
    }

    /// Validate the timeline for `cfg` and schedule one cue per row.
    ///
    /// Nothing is scheduled if validation fails or a tour is still pending.
    pub fn arm<T: From<CinematicCue>>(
        &mut self,
        cfg: &CinematicConfig,
        scheduler: &mut TimerScheduler<T>,
    ) -> Result<ArmOutcome, InvalidTimelineError> {
        if self.is_armed(scheduler) {
            return Ok(ArmOutcome::AlreadyArmed);
        }
        let events = build_timeline(cfg)?;
        self.handles.cancel_all(scheduler);
        for event in &events {
            let cue = CinematicCue::Event(event.kind);
            self.handles
                .push(scheduler.schedule(event.fire_offset_ms, cue.into()));
        }
        Ok(ArmOutcome::Armed { cues: events.len() })
    }

    /// Schedule a cue that belongs to the running tour.
    pub fn follow_up<T: From<CinematicCue>>(
        &mut self,
        scheduler: &mut TimerScheduler<T>,
        delay_ms: u64,
        cue: CinematicCue,
    ) -> TimerHandle {
        let handle = scheduler.schedule(delay_ms, cue.into());
        self.handles.push(handle);
        handle
    }

    /// Drop every pending cue of the tour. Returns how many were pending.
    pub fn cancel<T>(&mut self, scheduler: &mut TimerScheduler<T>) -> usize {
        self.handles.cancel_all(scheduler)
    }

    /// Handles created since the last arm or cancel.
    pub fn handles(&self) -> &HandleSet {
        &self.handles
    }
}
