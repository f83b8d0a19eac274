//! Reflex game: wait for the signal, tap as fast as possible.
//!
//! ```text
//! Idle -> Armed -> Go -> Result
//!           \-> TooEarly
//! TooEarly | Result -> Armed (restart)
//! ```

use serde::Serialize;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::random::{RandomSource, StdRandom};
use crate::record::{GameKind, GameRecord};
use crate::timer::{OneShot, TimerHandle};

/// Random wait before the signal, `[MIN, MAX)` milliseconds
pub const MIN_DELAY_MS: u64 = 2_000;
pub const MAX_DELAY_MS: u64 = 5_000;

const TICK_INTERVAL_MS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum ReflexPhase {
    Idle,
    Armed,
    Go,
    TooEarly,
    Result,
}

/// Read-only view handed to the display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReflexSnapshot {
    pub phase: ReflexPhase,
    pub armed_at: Option<u64>,
    pub go_at: Option<u64>,
    pub result_latency: Option<u64>,
}

#[derive(Debug)]
pub struct ReflexEngine<C: Clock = SystemClock, R: RandomSource = StdRandom> {
    clock: C,
    rng: R,
    phase: ReflexPhase,
    armed_at: Option<u64>,
    go_at: Option<u64>,
    result_latency: Option<u64>,
    delay: OneShot,
}

impl ReflexEngine {
    pub fn with_system() -> Self {
        Self::new(SystemClock::new(), StdRandom::new())
    }
}

impl<C: Clock, R: RandomSource> ReflexEngine<C, R> {
    pub fn new(clock: C, rng: R) -> Self {
        Self {
            clock,
            rng,
            phase: ReflexPhase::Idle,
            armed_at: None,
            go_at: None,
            result_latency: None,
            delay: OneShot::new(),
        }
    }

    pub fn phase(&self) -> ReflexPhase {
        self.phase
    }

    pub fn current_state(&self) -> ReflexSnapshot {
        ReflexSnapshot {
            phase: self.phase,
            armed_at: self.armed_at,
            go_at: self.go_at,
            result_latency: self.result_latency,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(TICK_INTERVAL_MS)
    }

    /// Handle of the pending signal, for callers that schedule it themselves
    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.delay.handle()
    }

    /// Arm a new round from Idle, TooEarly or Result. Arming again while
    /// Armed replaces the pending signal. Ignored while the signal is
    /// showing, so a live round is never thrown away; returns `None` then.
    pub fn start(&mut self) -> Option<TimerHandle> {
        if self.phase == ReflexPhase::Go {
            tracing::debug!("reflex start ignored in {}", self.phase);
            return None;
        }

        let now = self.clock.now_ms();
        let wait = self.rng.next_in_range(MIN_DELAY_MS, MAX_DELAY_MS);
        let handle = self.delay.schedule(now, wait);

        tracing::debug!(
            "reflex {} -> {} at {} ms, signal in {} ms",
            self.phase,
            ReflexPhase::Armed,
            now,
            wait
        );
        self.phase = ReflexPhase::Armed;
        self.armed_at = Some(now);
        self.go_at = None;
        self.result_latency = None;
        Some(handle)
    }

    /// The single tap/click action. Returns a record when a round completes.
    pub fn handle_input(&mut self) -> Option<GameRecord> {
        match self.phase {
            ReflexPhase::Armed => {
                self.delay.cancel();
                self.phase = ReflexPhase::TooEarly;
                tracing::debug!("reflex tap before signal, now {}", self.phase);
                None
            }
            ReflexPhase::Go => {
                let now = self.clock.now_ms();
                let go_at = self.go_at.unwrap_or(now);
                let latency = now.saturating_sub(go_at);
                self.phase = ReflexPhase::Result;
                self.result_latency = Some(latency);
                tracing::debug!("reflex {}: {} ms", self.phase, latency);
                Some(GameRecord::new(
                    GameKind::Reflex,
                    latency as i64,
                    self.clock.wall_time(),
                ))
            }
            ReflexPhase::Idle | ReflexPhase::TooEarly | ReflexPhase::Result => {
                self.start();
                None
            }
        }
    }

    /// Periodic poll: flips to Go once the random delay has elapsed.
    pub fn on_tick(&mut self) {
        let now = self.clock.now_ms();
        if self.delay.poll(now).is_some() {
            self.signal(now);
        }
    }

    /// A specific firing delivered by an outside scheduler. Stale or
    /// cancelled handles are ignored.
    pub fn on_timer(&mut self, handle: TimerHandle) {
        if self.delay.fire(handle) {
            let now = self.clock.now_ms();
            self.signal(now);
        }
    }

    /// Cancel outstanding timers before the engine is dropped or parked.
    pub fn teardown(&mut self) {
        self.delay.cancel();
    }

    fn signal(&mut self, now: u64) {
        if self.phase != ReflexPhase::Armed {
            return;
        }
        self.phase = ReflexPhase::Go;
        self.go_at = Some(now);
        tracing::debug!("reflex signal at {} ms", now);
    }
}
