//! Timing game: stop the stopwatch as close to the target as possible.
//!
//! The running display is hidden once 60% of the target has elapsed, so the
//! last stretch has to be counted internally.

use serde::Serialize;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::random::{RandomSource, StdRandom};
use crate::record::{GameKind, GameRecord};

/// Target is a whole number of seconds in `[MIN, MAX]`
pub const MIN_TARGET_SECS: u64 = 5;
pub const MAX_TARGET_SECS: u64 = 15;

const TICK_INTERVAL_MS: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum TimingPhase {
    Idle,
    Running,
    Result,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimingSnapshot {
    pub phase: TimingPhase,
    pub target_duration_ms: u64,
    pub blind_threshold_ms: u64,
    pub started_at: Option<u64>,
    pub elapsed_ms: u64,
    pub is_blind: bool,
    pub result_elapsed_ms: Option<u64>,
    pub signed_error_ms: Option<i64>,
}

impl TimingSnapshot {
    /// Elapsed time the player may see; `None` while blinded
    pub fn visible_elapsed_ms(&self) -> Option<u64> {
        match self.phase {
            TimingPhase::Running if self.is_blind => None,
            TimingPhase::Result => self.result_elapsed_ms,
            _ => Some(self.elapsed_ms),
        }
    }
}

/// 60% of the target, truncated
pub fn blind_threshold(target_ms: u64) -> u64 {
    target_ms * 6 / 10
}

#[derive(Debug)]
pub struct TimingEngine<C: Clock = SystemClock, R: RandomSource = StdRandom> {
    clock: C,
    rng: R,
    phase: TimingPhase,
    target_duration_ms: u64,
    blind_threshold_ms: u64,
    started_at: Option<u64>,
    elapsed_ms: u64,
    is_blind: bool,
    result_elapsed_ms: Option<u64>,
    signed_error_ms: Option<i64>,
}

impl TimingEngine {
    pub fn with_system() -> Self {
        Self::new(SystemClock::new(), StdRandom::new())
    }
}

impl<C: Clock, R: RandomSource> TimingEngine<C, R> {
    /// Rolls the first target right away so it can be shown before starting.
    pub fn new(clock: C, mut rng: R) -> Self {
        let target = roll_target(&mut rng);
        Self {
            clock,
            rng,
            phase: TimingPhase::Idle,
            target_duration_ms: target,
            blind_threshold_ms: blind_threshold(target),
            started_at: None,
            elapsed_ms: 0,
            is_blind: false,
            result_elapsed_ms: None,
            signed_error_ms: None,
        }
    }

    pub fn phase(&self) -> TimingPhase {
        self.phase
    }

    pub fn target_duration_ms(&self) -> u64 {
        self.target_duration_ms
    }

    pub fn current_state(&self) -> TimingSnapshot {
        TimingSnapshot {
            phase: self.phase,
            target_duration_ms: self.target_duration_ms,
            blind_threshold_ms: self.blind_threshold_ms,
            started_at: self.started_at,
            elapsed_ms: self.elapsed_ms,
            is_blind: self.is_blind,
            result_elapsed_ms: self.result_elapsed_ms,
            signed_error_ms: self.signed_error_ms,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(TICK_INTERVAL_MS)
    }

    /// Start the stopwatch. A restart from Result rolls a fresh target; the
    /// first start keeps the one already on screen. No-op while running.
    pub fn start(&mut self) {
        match self.phase {
            TimingPhase::Running => return,
            TimingPhase::Result => {
                self.target_duration_ms = roll_target(&mut self.rng);
                self.blind_threshold_ms = blind_threshold(self.target_duration_ms);
            }
            TimingPhase::Idle => {}
        }

        let now = self.clock.now_ms();
        tracing::debug!(
            "timing {} -> {} at {} ms, target {} ms",
            self.phase,
            TimingPhase::Running,
            now,
            self.target_duration_ms
        );
        self.phase = TimingPhase::Running;
        self.started_at = Some(now);
        self.elapsed_ms = 0;
        self.is_blind = false;
        self.result_elapsed_ms = None;
        self.signed_error_ms = None;
    }

    /// Stop the stopwatch and score the attempt. Outside Running this acts
    /// as `start`.
    pub fn stop(&mut self) -> Option<GameRecord> {
        if self.phase != TimingPhase::Running {
            self.start();
            return None;
        }

        let now = self.clock.now_ms();
        let started_at = self.started_at.unwrap_or(now);
        let result = now.saturating_sub(started_at);
        let signed_error = result as i64 - self.target_duration_ms as i64;

        self.phase = TimingPhase::Result;
        self.elapsed_ms = result;
        self.result_elapsed_ms = Some(result);
        self.signed_error_ms = Some(signed_error);
        tracing::debug!(
            "timing {} at {} ms, error {} ms",
            self.phase,
            result,
            signed_error
        );

        Some(GameRecord::new(
            GameKind::Timing,
            signed_error.abs(),
            self.clock.wall_time(),
        ))
    }

    /// The single user action: start when idle or showing a result, stop
    /// while running.
    pub fn handle_input(&mut self) -> Option<GameRecord> {
        match self.phase {
            TimingPhase::Running => self.stop(),
            TimingPhase::Idle | TimingPhase::Result => {
                self.start();
                None
            }
        }
    }

    /// Display refresh; only meaningful while running.
    pub fn on_tick(&mut self) {
        if self.phase != TimingPhase::Running {
            return;
        }
        let now = self.clock.now_ms();
        self.elapsed_ms = now.saturating_sub(self.started_at.unwrap_or(now));
        self.is_blind = self.elapsed_ms >= self.blind_threshold_ms;
    }

    /// Nothing is scheduled in the background; kept for a uniform engine surface.
    pub fn teardown(&mut self) {}
}

fn roll_target<R: RandomSource>(rng: &mut R) -> u64 {
    rng.next_in_range(MIN_TARGET_SECS, MAX_TARGET_SECS + 1) * 1_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::random::{ScriptedRandom, StdRandom};

    fn fixture(targets_secs: &[u64]) -> (TimingEngine<ManualClock, ScriptedRandom>, ManualClock) {
        let clock = ManualClock::new();
        let rng = ScriptedRandom::new(targets_secs.iter().copied());
        (TimingEngine::new(clock.clone(), rng), clock)
    }

    #[test]
    fn blind_threshold_truncates() {
        assert_eq!(blind_threshold(5_000), 3_000);
        assert_eq!(blind_threshold(8_000), 4_800);
        assert_eq!(blind_threshold(15_000), 9_000);
        assert_eq!(blind_threshold(1_001), 600);
    }

    #[test]
    fn construction_rolls_target() {
        let (engine, _) = fixture(&[8]);
        let state = engine.current_state();
        assert_eq!(state.phase, TimingPhase::Idle);
        assert_eq!(state.target_duration_ms, 8_000);
        assert_eq!(state.blind_threshold_ms, 4_800);
        assert_eq!(state.started_at, None);
    }

    #[test]
    fn random_targets_are_whole_seconds_in_range() {
        let mut rng = StdRandom::seeded(99);
        for _ in 0..500 {
            let target = roll_target(&mut rng);
            assert!((5_000..=15_000).contains(&target));
            assert_eq!(target % 1_000, 0);
        }
    }

    #[test]
    fn tick_tracks_elapsed_and_blind() {
        let (mut engine, clock) = fixture(&[5]);
        engine.start();

        clock.set(2_999);
        engine.on_tick();
        let state = engine.current_state();
        assert_eq!(state.elapsed_ms, 2_999);
        assert!(!state.is_blind);
        assert_eq!(state.visible_elapsed_ms(), Some(2_999));

        clock.set(3_000);
        engine.on_tick();
        let state = engine.current_state();
        assert!(state.is_blind);
        assert_eq!(state.visible_elapsed_ms(), None);
    }

    #[test]
    fn stop_scores_absolute_error() {
        let (mut engine, clock) = fixture(&[8]);
        engine.start();
        clock.set(8_075);

        let record = engine.stop().expect("record");
        assert_eq!(record.kind(), GameKind::Timing);
        assert_eq!(record.score(), 75);

        let state = engine.current_state();
        assert_eq!(state.phase, TimingPhase::Result);
        assert_eq!(state.result_elapsed_ms, Some(8_075));
        assert_eq!(state.signed_error_ms, Some(75));
        assert_eq!(state.visible_elapsed_ms(), Some(8_075));
    }

    #[test]
    fn early_stop_keeps_sign() {
        let (mut engine, clock) = fixture(&[10]);
        clock.set(1_000);
        engine.start();
        clock.set(10_800);

        let record = engine.stop().expect("record");
        let state = engine.current_state();
        assert_eq!(state.result_elapsed_ms, Some(9_800));
        assert_eq!(state.signed_error_ms, Some(-200));
        assert_eq!(record.score(), 200);
    }

    #[test]
    fn first_start_keeps_rolled_target() {
        let (mut engine, _) = fixture(&[7, 12]);
        engine.start();
        assert_eq!(engine.target_duration_ms(), 7_000);
    }

    #[test]
    fn restart_from_result_rerolls() {
        let (mut engine, clock) = fixture(&[7, 12]);
        engine.start();
        clock.set(7_000);
        engine.stop();

        clock.set(9_000);
        engine.start();
        let state = engine.current_state();
        assert_eq!(state.phase, TimingPhase::Running);
        assert_eq!(state.target_duration_ms, 12_000);
        assert_eq!(state.blind_threshold_ms, 7_200);
        assert_eq!(state.started_at, Some(9_000));
        assert_eq!(state.elapsed_ms, 0);
        assert!(!state.is_blind);
        assert_eq!(state.result_elapsed_ms, None);
        assert_eq!(state.signed_error_ms, None);
    }

    #[test]
    fn start_while_running_is_ignored() {
        let (mut engine, clock) = fixture(&[6]);
        engine.start();
        clock.set(500);
        engine.start();
        assert_eq!(engine.current_state().started_at, Some(0));
    }

    #[test]
    fn stop_outside_running_starts() {
        let (mut engine, _) = fixture(&[6]);
        assert_eq!(engine.stop(), None);
        assert_eq!(engine.phase(), TimingPhase::Running);
    }

    #[test]
    fn input_toggles() {
        let (mut engine, clock) = fixture(&[5, 9]);
        assert_eq!(engine.handle_input(), None);
        clock.set(5_010);
        assert_eq!(engine.handle_input().map(|r| r.score()), Some(10));
        assert_eq!(engine.handle_input(), None);
        assert_eq!(engine.phase(), TimingPhase::Running);
        assert_eq!(engine.target_duration_ms(), 9_000);
    }

    #[test]
    fn tick_after_result_is_ignored() {
        let (mut engine, clock) = fixture(&[5]);
        engine.start();
        clock.set(5_000);
        engine.stop();
        clock.set(20_000);
        engine.on_tick();
        assert_eq!(engine.current_state().elapsed_ms, 5_000);
    }
}
