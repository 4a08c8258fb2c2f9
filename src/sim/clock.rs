//! Virtual scheduler: delayed, periodic and per-frame callbacks
//!
//! Callbacks are plain data (`E`) instead of closures so the owner can
//! dispatch them against its own state without shared mutable borrows.
//! The host drives time forward one display frame at a time:
//!
//! 1. `begin_frame(dt)` advances the clock and returns the frame hooks
//!    with the time since each hook last ran (zero on its first run).
//! 2. `pop_due()` is drained until empty; timers armed while draining
//!    fire in the same frame if they are already due.
//!
//! Cancelling is idempotent and a cancelled timer never fires.

use serde::{Deserialize, Serialize};

/// Opaque handle for a scheduled callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CancelHandle(u64);

#[derive(Debug, Clone)]
struct Timer<E> {
    handle: CancelHandle,
    due_ms: f64,
    /// Re-arm interval for `every` timers
    period_ms: Option<f64>,
    event: E,
}

#[derive(Debug, Clone)]
struct FrameHook<E> {
    handle: CancelHandle,
    last_ms: Option<f64>,
    event: E,
}

/// Monotonic virtual clock with cancellable timers
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    now_ms: f64,
    next_handle: u64,
    timers: Vec<Timer<E>>,
    frames: Vec<FrameHook<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_handle: 1,
            timers: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Current virtual time in milliseconds
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn alloc_handle(&mut self) -> CancelHandle {
        let handle = CancelHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Fire `event` once, `delay_ms` from now
    pub fn after(&mut self, delay_ms: f64, event: E) -> CancelHandle {
        let handle = self.alloc_handle();
        self.timers.push(Timer {
            handle,
            due_ms: self.now_ms + delay_ms.max(0.0),
            period_ms: None,
            event,
        });
        handle
    }

    /// Fire `event` every `interval_ms`, first one `interval_ms` from now
    pub fn every(&mut self, interval_ms: f64, event: E) -> CancelHandle {
        // A zero period would fire forever inside one frame
        let interval_ms = interval_ms.max(1.0);
        let handle = self.alloc_handle();
        self.timers.push(Timer {
            handle,
            due_ms: self.now_ms + interval_ms,
            period_ms: Some(interval_ms),
            event,
        });
        handle
    }

    /// Deliver `event` once per frame together with the frame delta
    pub fn on_each_frame(&mut self, event: E) -> CancelHandle {
        let handle = self.alloc_handle();
        self.frames.push(FrameHook {
            handle,
            last_ms: None,
            event,
        });
        handle
    }

    /// Cancel a handle. Returns true if something was still pending.
    pub fn cancel(&mut self, handle: CancelHandle) -> bool {
        let before = self.timers.len() + self.frames.len();
        self.timers.retain(|t| t.handle != handle);
        self.frames.retain(|f| f.handle != handle);
        before != self.timers.len() + self.frames.len()
    }

    /// Cancel every pending timer and frame hook
    pub fn cancel_all(&mut self) {
        self.timers.clear();
        self.frames.clear();
    }

    pub fn is_pending(&self, handle: CancelHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
            || self.frames.iter().any(|f| f.handle == handle)
    }

    /// Number of pending timers plus frame hooks
    pub fn pending_count(&self) -> usize {
        self.timers.len() + self.frames.len()
    }
}

impl<E: Clone> Scheduler<E> {
    /// Advance the clock by one frame and collect the frame hooks
    pub fn begin_frame(&mut self, dt_ms: f64) -> Vec<(E, f64)> {
        self.now_ms += dt_ms.max(0.0);
        let now = self.now_ms;
        self.frames
            .iter_mut()
            .map(|hook| {
                let dt = hook.last_ms.map(|last| now - last).unwrap_or(0.0);
                hook.last_ms = Some(now);
                (hook.event.clone(), dt)
            })
            .collect()
    }

    /// Pop the earliest timer that is due, re-arming periodic ones
    ///
    /// Ties on the due time resolve in arming order.
    pub fn pop_due(&mut self) -> Option<E> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= self.now_ms)
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .partial_cmp(&b.due_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.handle.0.cmp(&b.handle.0))
            })
            .map(|(i, _)| i)?;

        match self.timers[idx].period_ms {
            Some(period) => {
                let timer = &mut self.timers[idx];
                timer.due_ms += period;
                Some(timer.event.clone())
            }
            None => Some(self.timers.remove(idx).event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler<&'static str>) -> Vec<&'static str> {
        std::iter::from_fn(|| s.pop_due()).collect()
    }

    #[test]
    fn test_after_fires_once_when_due() {
        let mut s = Scheduler::new();
        s.after(100.0, "a");
        s.begin_frame(99.0);
        assert!(drain(&mut s).is_empty());
        s.begin_frame(1.0);
        assert_eq!(drain(&mut s), vec!["a"]);
        s.begin_frame(500.0);
        assert!(drain(&mut s).is_empty());
        assert_eq!(s.pending_count(), 0);
    }

    #[test]
    fn test_every_rearms_and_catches_up() {
        let mut s = Scheduler::new();
        s.every(1000.0, "tick");
        s.begin_frame(3000.0);
        assert_eq!(drain(&mut s), vec!["tick", "tick", "tick"]);
        s.begin_frame(999.0);
        assert!(drain(&mut s).is_empty());
    }

    #[test]
    fn test_due_order_then_arming_order() {
        let mut s = Scheduler::new();
        s.after(50.0, "late");
        s.after(10.0, "early");
        s.after(10.0, "early2");
        s.begin_frame(60.0);
        assert_eq!(drain(&mut s), vec!["early", "early2", "late"]);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut s = Scheduler::new();
        let h = s.after(10.0, "x");
        assert!(s.is_pending(h));
        assert!(s.cancel(h));
        assert!(!s.cancel(h));
        s.begin_frame(20.0);
        assert!(drain(&mut s).is_empty());

        // Cancelling after natural completion is also fine
        let h = s.after(0.0, "y");
        assert_eq!(drain(&mut s), vec!["y"]);
        assert!(!s.cancel(h));
    }

    #[test]
    fn test_frame_hook_dt_starts_at_zero() {
        let mut s: Scheduler<&str> = Scheduler::new();
        s.begin_frame(16.0);
        let h = s.on_each_frame("frame");
        assert_eq!(s.begin_frame(16.0), vec![("frame", 0.0)]);
        assert_eq!(s.begin_frame(17.0), vec![("frame", 17.0)]);
        s.cancel(h);
        assert!(s.begin_frame(16.0).is_empty());
    }

    #[test]
    fn test_cancel_all() {
        let mut s = Scheduler::new();
        s.after(10.0, "a");
        s.every(10.0, "b");
        s.on_each_frame("c");
        assert_eq!(s.pending_count(), 3);
        s.cancel_all();
        assert_eq!(s.pending_count(), 0);
        assert!(s.begin_frame(100.0).is_empty());
        assert!(drain(&mut s).is_empty());
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut s: Scheduler<()> = Scheduler::new();
        s.begin_frame(10.0);
        s.begin_frame(-5.0);
        assert_eq!(s.now_ms(), 10.0);
    }
}
