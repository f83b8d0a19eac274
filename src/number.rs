//! Number grid game: after a 3-2-1 countdown, click 1 through 25 in order
//! on a shuffled 5x5 grid. Each wrong click costs a fixed time penalty.

use serde::Serialize;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::random::{RandomSource, StdRandom};
use crate::record::{GameKind, GameRecord};
use crate::timer::{OneShot, TimerHandle};

pub const GRID_SIDE: usize = 5;
pub const CELL_COUNT: u8 = 25;
pub const PENALTY_MS: u64 = 500;
pub const COUNTDOWN_FROM: u8 = 3;
pub const COUNTDOWN_STEP_MS: u64 = 1_000;
pub const ERROR_FLASH_MS: u64 = 100;

const TICK_INTERVAL_MS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum NumberPhase {
    Idle,
    Countdown,
    Running,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberSnapshot {
    pub phase: NumberPhase,
    /// 3, 2, 1 during the countdown
    pub countdown: u8,
    /// Row-major cell values; empty until the run begins
    pub grid: Vec<u8>,
    pub next_target: u8,
    pub elapsed_ms: u64,
    pub penalty_ms: u64,
    pub error_flash_active: bool,
}

impl NumberSnapshot {
    pub fn total_ms(&self) -> u64 {
        self.elapsed_ms + self.penalty_ms
    }

    /// True for cells that were already clicked in order
    pub fn is_cleared(&self, value: u8) -> bool {
        value < self.next_target
    }
}

#[derive(Debug)]
pub struct NumberEngine<C: Clock = SystemClock, R: RandomSource = StdRandom> {
    clock: C,
    rng: R,
    phase: NumberPhase,
    countdown: u8,
    grid: Vec<u8>,
    next_target: u8,
    run_started_at: Option<u64>,
    elapsed_ms: u64,
    penalty_ms: u64,
    error_flash: bool,
    step: OneShot,
    flash: OneShot,
}

impl NumberEngine {
    pub fn with_system() -> Self {
        Self::new(SystemClock::new(), StdRandom::new())
    }
}

impl<C: Clock, R: RandomSource> NumberEngine<C, R> {
    pub fn new(clock: C, rng: R) -> Self {
        Self {
            clock,
            rng,
            phase: NumberPhase::Idle,
            countdown: COUNTDOWN_FROM,
            grid: Vec::new(),
            next_target: 1,
            run_started_at: None,
            elapsed_ms: 0,
            penalty_ms: 0,
            error_flash: false,
            step: OneShot::new(),
            flash: OneShot::new(),
        }
    }

    pub fn phase(&self) -> NumberPhase {
        self.phase
    }

    pub fn current_state(&self) -> NumberSnapshot {
        NumberSnapshot {
            phase: self.phase,
            countdown: self.countdown,
            grid: self.grid.clone(),
            next_target: self.next_target,
            elapsed_ms: self.elapsed_ms,
            penalty_ms: self.penalty_ms,
            error_flash_active: self.error_flash,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(TICK_INTERVAL_MS)
    }

    pub fn pending_timers(&self) -> Vec<TimerHandle> {
        self.step.handle().into_iter().chain(self.flash.handle()).collect()
    }

    /// Begin (or restart) the countdown. Whatever round was in progress is
    /// abandoned without a record.
    pub fn start(&mut self) -> TimerHandle {
        self.flash.cancel();
        let now = self.clock.now_ms();
        let handle = self.step.schedule(now, COUNTDOWN_STEP_MS);

        tracing::debug!(
            "number {} -> {} at {} ms",
            self.phase,
            NumberPhase::Countdown,
            now
        );
        self.phase = NumberPhase::Countdown;
        self.countdown = COUNTDOWN_FROM;
        self.grid.clear();
        self.next_target = 1;
        self.run_started_at = None;
        self.elapsed_ms = 0;
        self.penalty_ms = 0;
        self.error_flash = false;
        handle
    }

    /// A click on the cell showing `value`. Only counts while running.
    pub fn on_cell_click(&mut self, value: u8) -> Option<GameRecord> {
        if self.phase != NumberPhase::Running {
            return None;
        }
        // already cleared, or not on the board at all
        if value < self.next_target || value == 0 || value > CELL_COUNT {
            return None;
        }

        let now = self.clock.now_ms();
        if value != self.next_target {
            self.penalty_ms += PENALTY_MS;
            self.error_flash = true;
            self.flash.schedule(now, ERROR_FLASH_MS);
            tracing::debug!(
                "number miss: clicked {} expecting {}, penalty now {} ms",
                value,
                self.next_target,
                self.penalty_ms
            );
            return None;
        }

        if self.next_target < CELL_COUNT {
            self.next_target += 1;
            return None;
        }

        self.elapsed_ms = now.saturating_sub(self.run_started_at.unwrap_or(now));
        self.next_target = CELL_COUNT + 1;
        self.phase = NumberPhase::Finished;
        let total = self.elapsed_ms + self.penalty_ms;
        tracing::debug!(
            "number {}: {} ms run + {} ms penalty",
            self.phase,
            self.elapsed_ms,
            self.penalty_ms
        );
        Some(GameRecord::new(
            GameKind::Number,
            total as i64,
            self.clock.wall_time(),
        ))
    }

    /// Periodic poll: advances the countdown, clears the error flash and
    /// refreshes the running time.
    pub fn on_tick(&mut self) {
        let now = self.clock.now_ms();
        let due = self.step.due_ms();
        if self.step.poll(now).is_some() {
            self.countdown_step(due.unwrap_or(now), now);
        }
        if self.flash.poll(now).is_some() {
            self.error_flash = false;
        }
        if self.phase == NumberPhase::Running {
            self.elapsed_ms = now.saturating_sub(self.run_started_at.unwrap_or(now));
        }
    }

    /// A specific firing delivered by an outside scheduler. Stale handles
    /// are ignored.
    pub fn on_timer(&mut self, handle: TimerHandle) {
        let now = self.clock.now_ms();
        let due = self.step.due_ms();
        if self.step.fire(handle) {
            self.countdown_step(due.unwrap_or(now), now);
        } else if self.flash.fire(handle) {
            self.error_flash = false;
        }
    }

    pub fn teardown(&mut self) {
        self.step.cancel();
        self.flash.cancel();
        self.error_flash = false;
    }

    // Steps chain from the deadline that was due, so a late tick does not
    // stretch the following second. The run itself starts when observed.
    fn countdown_step(&mut self, due: u64, now: u64) {
        if self.phase != NumberPhase::Countdown {
            return;
        }
        if self.countdown > 1 {
            self.countdown -= 1;
            self.step.schedule(due, COUNTDOWN_STEP_MS);
        } else {
            self.begin_run(now);
        }
    }

    fn begin_run(&mut self, now: u64) {
        let mut grid: Vec<u8> = (1..=CELL_COUNT).collect();
        self.rng.shuffle(&mut grid);

        self.phase = NumberPhase::Running;
        self.countdown = 0;
        self.grid = grid;
        self.next_target = 1;
        self.run_started_at = Some(now);
        self.elapsed_ms = 0;
        self.penalty_ms = 0;
        tracing::debug!("number {} from {} ms", self.phase, now);
    }
}
