//! Event pump for the terminal loop. Key presses and resizes come from an
//! input source; when nothing arrives within the current cadence the pump
//! yields `Tick` so the active game can poll its clock.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

#[derive(Clone, Debug)]
pub enum LoopEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

pub trait InputSource: Send + 'static {
    /// Next input if one arrives within `wait`
    fn next_within(&self, wait: Duration) -> Option<LoopEvent>;
}

/// Reads crossterm events on a background thread
pub struct TerminalInput {
    rx: Receiver<LoopEvent>,
}

impl TerminalInput {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            while let Ok(raw) = event::read() {
                if let Some(ev) = translate(raw) {
                    if tx.send(ev).is_err() {
                        break;
                    }
                }
            }
        });

        Self { rx }
    }
}

impl InputSource for TerminalInput {
    fn next_within(&self, wait: Duration) -> Option<LoopEvent> {
        self.rx.recv_timeout(wait).ok()
    }
}

// key releases would count every tap twice on terminals that report them
fn translate(raw: CtEvent) -> Option<LoopEvent> {
    match raw {
        CtEvent::Key(key) if key.kind != KeyEventKind::Release => Some(LoopEvent::Key(key)),
        CtEvent::Resize(_, _) => Some(LoopEvent::Resize),
        _ => None,
    }
}

/// Channel-fed input for headless drivers and tests
pub struct ChannelInput {
    rx: Receiver<LoopEvent>,
}

impl ChannelInput {
    pub fn new(rx: Receiver<LoopEvent>) -> Self {
        Self { rx }
    }

    pub fn pair() -> (Sender<LoopEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }
}

impl InputSource for ChannelInput {
    fn next_within(&self, wait: Duration) -> Option<LoopEvent> {
        self.rx.recv_timeout(wait).ok()
    }
}

pub struct EventPump<I: InputSource> {
    input: I,
    ceiling: Duration,
}

impl<I: InputSource> EventPump<I> {
    /// `ceiling` bounds every wait, so the screen refreshes at least that often.
    pub fn new(input: I, ceiling: Duration) -> Self {
        Self { input, ceiling }
    }

    pub fn step(&self) -> LoopEvent {
        self.step_within(self.ceiling)
    }

    /// Wait at most `cadence` (capped by the ceiling) for input.
    pub fn step_within(&self, cadence: Duration) -> LoopEvent {
        self.input
            .next_within(cadence.min(self.ceiling))
            .unwrap_or(LoopEvent::Tick)
    }
}

/// Keeps the tick cadence when input arrives faster than the pump would
/// time out. The loop asks `due` after handling each event, so a tick never
/// lands between a key press and its handling.
#[derive(Debug, Clone, Copy)]
pub struct TickGate {
    last: Instant,
}

impl TickGate {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Record a tick that already happened (a pump timeout).
    pub fn mark(&mut self) {
        self.last = Instant::now();
    }

    /// True once `cadence` has passed since the last tick; counts as that tick.
    pub fn due(&mut self, cadence: Duration) -> bool {
        if self.last.elapsed() >= cadence {
            self.mark();
            true
        } else {
            false
        }
    }

    /// Time left until the next tick is owed
    pub fn remaining(&self, cadence: Duration) -> Duration {
        cadence.saturating_sub(self.last.elapsed())
    }
}

impl Default for TickGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn space() -> KeyEvent {
        KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)
    }

    #[test]
    fn idle_input_ticks() {
        let (_tx, input) = ChannelInput::pair();
        let pump = EventPump::new(input, Duration::from_millis(1));
        assert!(matches!(pump.step(), LoopEvent::Tick));
    }

    #[test]
    fn queued_input_comes_first() {
        let (tx, input) = ChannelInput::pair();
        tx.send(LoopEvent::Resize).unwrap();
        tx.send(LoopEvent::Key(space())).unwrap();
        let pump = EventPump::new(input, Duration::from_millis(10));

        assert!(matches!(pump.step(), LoopEvent::Resize));
        assert!(matches!(pump.step(), LoopEvent::Key(k) if k.code == KeyCode::Char(' ')));
        assert!(matches!(pump.step(), LoopEvent::Tick));
    }

    #[test]
    fn cadence_is_capped_by_ceiling() {
        let (_tx, input) = ChannelInput::pair();
        let pump = EventPump::new(input, Duration::from_millis(5));

        let started = std::time::Instant::now();
        assert!(matches!(pump.step_within(Duration::from_secs(60)), LoopEvent::Tick));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn short_cadence_wins_over_ceiling() {
        let (_tx, input) = ChannelInput::pair();
        let pump = EventPump::new(input, Duration::from_secs(60));

        let started = std::time::Instant::now();
        assert!(matches!(pump.step_within(Duration::from_millis(5)), LoopEvent::Tick));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn dropped_sender_ticks() {
        let (tx, input) = ChannelInput::pair();
        drop(tx);
        let pump = EventPump::new(input, Duration::from_millis(1));
        assert!(matches!(pump.step(), LoopEvent::Tick));
    }

    #[test]
    fn releases_are_filtered() {
        let release = KeyEvent::new_with_kind(KeyCode::Char(' '), KeyModifiers::NONE, KeyEventKind::Release);
        assert!(translate(CtEvent::Key(release)).is_none());
        assert!(matches!(translate(CtEvent::Key(space())), Some(LoopEvent::Key(_))));
        assert!(matches!(translate(CtEvent::Resize(80, 24)), Some(LoopEvent::Resize)));
        assert!(translate(CtEvent::FocusGained).is_none());
    }

    #[test]
    fn gate_owes_a_tick_after_cadence() {
        let mut gate = TickGate::new();
        assert!(!gate.due(Duration::from_secs(60)));
        assert!(gate.remaining(Duration::from_secs(60)) > Duration::from_secs(50));

        std::thread::sleep(Duration::from_millis(5));
        assert!(gate.due(Duration::from_millis(1)));
        // the tick was just taken
        assert!(!gate.due(Duration::from_secs(60)));
        assert_eq!(gate.remaining(Duration::ZERO), Duration::ZERO);
    }
}
