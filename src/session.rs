//! One active game plus the hand-off of finished records.

use std::time::Duration;

use crate::clock::Clock;
use crate::grade::{grade_record, Grade};
use crate::number::NumberEngine;
use crate::random::RandomSource;
use crate::ranking::{persist, RankingGateway};
use crate::record::{GameKind, GameRecord};
use crate::reflex::ReflexEngine;
use crate::timing::TimingEngine;

#[derive(Debug)]
pub enum GameSession<C: Clock, R: RandomSource> {
    Reflex(ReflexEngine<C, R>),
    Timing(TimingEngine<C, R>),
    Number(NumberEngine<C, R>),
}

impl<C: Clock, R: RandomSource> GameSession<C, R> {
    pub fn new(kind: GameKind, clock: C, rng: R) -> Self {
        match kind {
            GameKind::Reflex => GameSession::Reflex(ReflexEngine::new(clock, rng)),
            GameKind::Timing => GameSession::Timing(TimingEngine::new(clock, rng)),
            GameKind::Number => GameSession::Number(NumberEngine::new(clock, rng)),
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            GameSession::Reflex(_) => GameKind::Reflex,
            GameSession::Timing(_) => GameKind::Timing,
            GameSession::Number(_) => GameKind::Number,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        match self {
            GameSession::Reflex(e) => e.tick_interval(),
            GameSession::Timing(e) => e.tick_interval(),
            GameSession::Number(e) => e.tick_interval(),
        }
    }

    pub fn on_tick(&mut self) {
        match self {
            GameSession::Reflex(e) => e.on_tick(),
            GameSession::Timing(e) => e.on_tick(),
            GameSession::Number(e) => e.on_tick(),
        }
    }

    /// The tap/space action. For the grid game this (re)starts the
    /// countdown unless a run is in progress, where cells are clicked instead.
    pub fn primary_action(&mut self) -> Option<GameRecord> {
        match self {
            GameSession::Reflex(e) => e.handle_input(),
            GameSession::Timing(e) => e.handle_input(),
            GameSession::Number(e) => {
                if e.phase() != crate::number::NumberPhase::Running {
                    e.start();
                }
                None
            }
        }
    }

    pub fn teardown(&mut self) {
        match self {
            GameSession::Reflex(e) => e.teardown(),
            GameSession::Timing(e) => e.teardown(),
            GameSession::Number(e) => e.teardown(),
        }
    }
}

/// What the player sees after a finished round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub record: GameRecord,
    pub grade: Grade,
    /// False when the store rejected the record; the result still stands
    pub saved: bool,
}

/// Forward a finished record to the store and grade it for display.
pub fn conclude<G: RankingGateway + ?Sized>(gateway: &mut G, record: GameRecord) -> Outcome {
    let saved = persist(gateway, &record);
    Outcome {
        grade: grade_record(&record),
        record,
        saved,
    }
}
