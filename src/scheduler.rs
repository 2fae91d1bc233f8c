//! Deferred, cancelable one-shot cues keyed by millisecond offsets.
//!
//! The scheduler owns its own clock, advanced once per frame. Due cues are
//! popped one at a time, so a cue handler may cancel other pending cues
//! (including the rest of its own set) before they get a chance to run.

use std::collections::BTreeMap;
use std::time::Duration;

/// Identifies one scheduled cue.
///
/// Ordering is `(due, insertion sequence)`, so cues with equal offsets fire in
/// the order they were scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle {
    due_ms: u64,
    seq: u64,
}

/// Single-threaded timer queue carrying payloads of type `T`.
#[derive(Debug)]
pub struct TimerScheduler<T> {
    now: Duration,
    next_seq: u64,
    pending: BTreeMap<TimerHandle, T>,
}

impl<T> Default for TimerScheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<T> TimerScheduler<T> {
    /// Empty scheduler at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scheduler time in whole milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now.as_millis() as u64
    }

    /// Move the clock forward. Does not fire anything by itself.
    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;
    }

    /// Schedule `payload` to become due `delay_ms` from now.
    pub fn schedule(&mut self, delay_ms: u64, payload: T) -> TimerHandle {
        let handle = TimerHandle {
            due_ms: self.now_ms().saturating_add(delay_ms),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.pending.insert(handle, payload);
        handle
    }

    /// Drop a pending cue. Returns `false` if it already fired or was canceled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.pending.remove(&handle).is_some()
    }

    /// `true` if the cue has neither fired nor been canceled.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.contains_key(&handle)
    }

    /// Number of cues still waiting.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// `true` when nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return the earliest cue that is due, if any.
    pub fn pop_due(&mut self) -> Option<(TimerHandle, T)> {
        let now = self.now_ms();
        match self.pending.first_key_value() {
            Some((handle, _)) if handle.due_ms <= now => self.pending.pop_first(),
            _ => None,
        }
    }
}

/// The handles produced by one armed timeline (plus its follow-up cues).
#[derive(Clone, Debug, Default)]
pub struct HandleSet {
    handles: Vec<TimerHandle>,
}

impl HandleSet {
    /// Track another handle.
    pub fn push(&mut self, handle: TimerHandle) {
        self.handles.push(handle);
    }

    /// Cancel every tracked handle and forget them all.
    ///
    /// Safe on an empty or already-canceled set. Returns how many cues were
    /// actually still pending.
    pub fn cancel_all<T>(&mut self, scheduler: &mut TimerScheduler<T>) -> usize {
        self.handles
            .drain(..)
            .filter(|&h| scheduler.cancel(h))
            .count()
    }

    /// How many tracked cues have not fired yet.
    pub fn pending<T>(&self, scheduler: &TimerScheduler<T>) -> usize {
        self.handles
            .iter()
            .filter(|&&h| scheduler.is_pending(h))
            .count()
    }

    /// Tracked handles, fired or not.
    pub fn iter(&self) -> impl Iterator<Item = TimerHandle> + '_ {
        self.handles.iter().copied()
    }

    /// Number of tracked handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// `true` when no handle is tracked.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<T>(s: &mut TimerScheduler<T>) -> Vec<T> {
        std::iter::from_fn(|| s.pop_due().map(|(_, p)| p)).collect()
    }

    // ── ordering ────────────────────────────────────────────────────

    #[test]
    fn nothing_fires_before_due() {
        let mut s = TimerScheduler::new();
        s.schedule(100, "a");
        s.advance(Duration::from_millis(99));
        assert!(s.pop_due().is_none());
        s.advance(Duration::from_millis(1));
        assert_eq!(drain(&mut s), vec!["a"]);
    }

    #[test]
    fn smaller_offsets_fire_first() {
        let mut s = TimerScheduler::new();
        s.schedule(300, 3);
        s.schedule(100, 1);
        s.schedule(200, 2);
        s.advance(Duration::from_secs(1));
        assert_eq!(drain(&mut s), vec![1, 2, 3]);
    }

    #[test]
    fn equal_offsets_keep_insertion_order() {
        let mut s = TimerScheduler::new();
        for i in 0..5 {
            s.schedule(50, i);
        }
        s.advance(Duration::from_millis(50));
        assert_eq!(drain(&mut s), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn delay_is_relative_to_current_time() {
        let mut s = TimerScheduler::new();
        s.advance(Duration::from_millis(1000));
        s.schedule(250, "late");
        s.advance(Duration::from_millis(249));
        assert!(s.pop_due().is_none());
        s.advance(Duration::from_millis(1));
        assert_eq!(drain(&mut s), vec!["late"]);
    }

    // ── cancellation ────────────────────────────────────────────────

    #[test]
    fn canceled_cue_never_fires() {
        let mut s = TimerScheduler::new();
        let h = s.schedule(10, "x");
        assert!(s.cancel(h));
        assert!(!s.cancel(h));
        s.advance(Duration::from_secs(1));
        assert!(s.pop_due().is_none());
    }

    #[test]
    fn handle_set_cancel_is_idempotent() {
        let mut s = TimerScheduler::new();
        let mut set = HandleSet::default();
        for i in 0..4 {
            set.push(s.schedule(i * 10, i));
        }
        assert_eq!(set.cancel_all(&mut s), 4);
        assert_eq!(set.cancel_all(&mut s), 0);
        assert!(s.is_empty());
        assert!(set.is_empty());
    }

    #[test]
    fn cancel_after_partial_fire_clears_the_rest() {
        let mut s = TimerScheduler::new();
        let mut set = HandleSet::default();
        for i in 1..=4 {
            set.push(s.schedule(i * 100, i));
        }
        s.advance(Duration::from_millis(250));
        assert_eq!(drain(&mut s), vec![1, 2]);
        assert_eq!(set.pending(&s), 2);
        assert_eq!(set.cancel_all(&mut s), 2);
        assert_eq!(set.pending(&s), 0);
    }

    #[test]
    fn handler_can_cancel_its_own_set_mid_drain() {
        let mut s = TimerScheduler::new();
        let mut set = HandleSet::default();
        for i in 0..3 {
            set.push(s.schedule(10, i));
        }
        s.advance(Duration::from_millis(10));

        let mut fired = Vec::new();
        while let Some((_, p)) = s.pop_due() {
            fired.push(p);
            if p == 0 {
                set.cancel_all(&mut s);
            }
        }
        assert_eq!(fired, vec![0]);
    }
}
