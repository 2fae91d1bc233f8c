//! The cinematic timeline table.
//!
//! Computed once per arm from the waypoint list and the segment/overlap/padding
//! constants. Event offset for waypoint `n` is
//! `segment_ms * n - overlap_ms - padding`.

use thiserror::Error;

use super::{CinematicConfig, Padding};

/// What a timeline entry does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Start the fade that masks the upcoming cut to `waypoint`.
    TransitionStart {
        /// Index into [`CinematicConfig::waypoints`].
        waypoint: usize,
    },
    /// Hard cut of camera position and look-at target to `waypoint`.
    CameraMove {
        /// Index into [`CinematicConfig::waypoints`].
        waypoint: usize,
    },
    /// Fade, then ease back to the resting wide shot and signal completion.
    ReturnToRest,
}

/// One row of the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimelineEvent {
    /// Milliseconds after arm at which the event fires.
    pub fire_offset_ms: u64,
    /// What happens.
    pub kind: EventKind,
}

/// Timeline misconfiguration, detected at arm time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidTimelineError {
    /// No waypoints at all.
    #[error("cinematic timeline needs at least one waypoint")]
    Empty,
    /// Waypoints are not listed in visiting order.
    #[error("waypoint at position {position} carries sequence index {found}")]
    SequenceIndex {
        /// Position in the waypoint list.
        position: usize,
        /// The sequence index found there.
        found: u32,
    },
    /// An event would fire before the timeline starts.
    #[error("event for waypoint {waypoint} would fire at {offset_ms} ms")]
    NegativeOffset {
        /// Waypoint multiplier of the offending event.
        waypoint: usize,
        /// Computed offset.
        offset_ms: i64,
    },
    /// An event would fire before the one listed ahead of it.
    #[error("event at {offset_ms} ms fires before the previous one at {previous_ms} ms")]
    OutOfOrder {
        /// Offset of the offending event.
        offset_ms: u64,
        /// Offset of the event before it.
        previous_ms: u64,
    },
}

/// `segment_ms * n - overlap_ms - padding_ms`, signed so mistuned constants
/// surface as negative offsets instead of wrapping.
pub fn event_offset(segment_ms: u64, n: usize, overlap_ms: u64, padding_ms: u64) -> i64 {
    segment_ms as i64 * n as i64 - overlap_ms as i64 - padding_ms as i64
}

/// Padding for waypoint `index` (1-based multiplier). The last entry repeats.
pub fn padding_for(paddings: &[Padding], index: usize) -> Padding {
    let slot = index.saturating_sub(1).min(paddings.len().saturating_sub(1));
    paddings.get(slot).copied().unwrap_or_default()
}

/// Builds and validates the full timeline for `cfg`.
///
/// Produces `2 * (k - 1) + 1` events for `k` waypoints: a transition and a
/// cut for every waypoint after the first, then the return to rest.
pub fn build_timeline(cfg: &CinematicConfig) -> Result<Vec<TimelineEvent>, InvalidTimelineError> {
    let count = cfg.waypoints.len();
    if count == 0 {
        return Err(InvalidTimelineError::Empty);
    }
    if let Some((position, wp)) = cfg
        .waypoints
        .iter()
        .enumerate()
        .find(|(i, wp)| wp.sequence_index as usize != *i)
    {
        return Err(InvalidTimelineError::SequenceIndex {
            position,
            found: wp.sequence_index,
        });
    }

    let mut raw: Vec<(i64, usize, EventKind)> = Vec::with_capacity(2 * count - 1);
    for waypoint in 1..count {
        let pad = padding_for(&cfg.paddings, waypoint);
        raw.push((
            event_offset(cfg.segment_ms, waypoint, cfg.overlap_ms, pad.transition_ms),
            waypoint,
            EventKind::TransitionStart { waypoint },
        ));
        raw.push((
            event_offset(cfg.segment_ms, waypoint, cfg.overlap_ms, pad.move_ms),
            waypoint,
            EventKind::CameraMove { waypoint },
        ));
    }
    raw.push((
        event_offset(cfg.segment_ms, count, cfg.overlap_ms, cfg.final_padding_ms),
        count,
        EventKind::ReturnToRest,
    ));

    let mut events = Vec::with_capacity(raw.len());
    let mut previous: Option<u64> = None;
    for (offset, waypoint, kind) in raw {
        let Ok(fire_offset_ms) = u64::try_from(offset) else {
            return Err(InvalidTimelineError::NegativeOffset {
                waypoint,
                offset_ms: offset,
            });
        };
        if let Some(previous_ms) = previous
            && fire_offset_ms < previous_ms
        {
            return Err(InvalidTimelineError::OutOfOrder {
                offset_ms: fire_offset_ms,
                previous_ms,
            });
        }
        previous = Some(fire_offset_ms);
        events.push(TimelineEvent {
            fire_offset_ms,
            kind,
        });
    }
    Ok(events)
}
