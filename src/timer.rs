//! Cancellable one-shot timers.
//!
//! Engines never sleep. A timer is a deadline plus a numbered handle; the
//! owner polls it from its tick, or an outside scheduler hands a handle back
//! through `fire`. Every schedule draws a fresh number, so a handle that was
//! superseded can never fire again, and two timers never share a handle.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Identity of one scheduled firing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    handle: TimerHandle,
    due_ms: u64,
}

#[derive(Debug, Default, Clone)]
pub struct OneShot {
    pending: Option<Pending>,
}

impl OneShot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a firing `delay_ms` after `now_ms`, replacing any pending one.
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64) -> TimerHandle {
        let handle = TimerHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed));
        self.pending = Some(Pending {
            handle,
            due_ms: now_ms.saturating_add(delay_ms),
        });
        handle
    }

    /// Cancel the pending firing, if any. Safe to call repeatedly.
    pub fn cancel(&mut self) -> Option<TimerHandle> {
        self.pending.take().map(|p| p.handle)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_current(&self, handle: TimerHandle) -> bool {
        self.pending.is_some_and(|p| p.handle == handle)
    }

    pub fn handle(&self) -> Option<TimerHandle> {
        self.pending.map(|p| p.handle)
    }

    pub fn due_ms(&self) -> Option<u64> {
        self.pending.map(|p| p.due_ms)
    }

    /// Consume the pending firing if its deadline has passed.
    pub fn poll(&mut self, now_ms: u64) -> Option<TimerHandle> {
        match self.pending {
            Some(p) if p.due_ms <= now_ms => {
                self.pending = None;
                Some(p.handle)
            }
            _ => None,
        }
    }

    /// Consume the pending firing if `handle` is still the current one.
    /// Stale handles return false and leave the timer untouched.
    pub fn fire(&mut self, handle: TimerHandle) -> bool {
        if self.is_current(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_fires_once_when_due() {
        let mut timer = OneShot::new();
        let handle = timer.schedule(100, 50);

        assert_eq!(timer.due_ms(), Some(150));
        assert_eq!(timer.poll(149), None);
        assert_eq!(timer.poll(150), Some(handle));
        assert_eq!(timer.poll(500), None);
        assert!(!timer.is_pending());
    }

    #[test]
    fn reschedule_supersedes_old_handle() {
        let mut timer = OneShot::new();
        let old = timer.schedule(0, 1_000);
        let new = timer.schedule(10, 1_000);

        assert_ne!(old, new);
        assert!(!timer.is_current(old));
        assert!(!timer.fire(old));
        assert!(timer.is_current(new));
        assert_eq!(timer.due_ms(), Some(1_010));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut timer = OneShot::new();
        let handle = timer.schedule(0, 10);

        assert_eq!(timer.cancel(), Some(handle));
        assert_eq!(timer.cancel(), None);
        assert!(!timer.fire(handle));
        assert_eq!(timer.poll(u64::MAX), None);
    }

    #[test]
    fn fire_ignores_deadline() {
        let mut timer = OneShot::new();
        let handle = timer.schedule(0, 10_000);
        assert!(timer.fire(handle));
        assert!(!timer.is_pending());
    }

    #[test]
    fn separate_timers_never_share_handles() {
        let mut step = OneShot::new();
        let mut flash = OneShot::new();
        let a = step.schedule(0, 10);
        let b = flash.schedule(0, 10);
        assert_ne!(a, b);
        assert!(!step.fire(b));
        assert!(flash.fire(b));
    }

    #[test]
    fn handles_from_cancelled_schedule_stay_stale() {
        let mut timer = OneShot::new();
        let first = timer.schedule(0, 10);
        timer.cancel();
        let second = timer.schedule(0, 10);
        assert!(!timer.is_current(first));
        assert!(timer.fire(second));
    }
}
