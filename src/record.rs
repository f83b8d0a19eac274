use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The three mini-games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameKind {
    Reflex,
    Timing,
    Number,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [GameKind::Reflex, GameKind::Timing, GameKind::Number];

    /// Stable key used by the records store
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Reflex => "REFLEX",
            GameKind::Timing => "TIMING",
            GameKind::Number => "NUMBER",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameKind::Reflex => "Reflex",
            GameKind::Timing => "Timing",
            GameKind::Number => "Number",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown game kind: {0:?}")]
pub struct ParseGameKindError(pub String);

impl FromStr for GameKind {
    type Err = ParseGameKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "REFLEX" => Ok(GameKind::Reflex),
            "TIMING" => Ok(GameKind::Timing),
            "NUMBER" => Ok(GameKind::Number),
            _ => Err(ParseGameKindError(s.to_string())),
        }
    }
}

/// Outcome of one finished session. Lower score is better for every kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    kind: GameKind,
    score: i64,
    created_at: DateTime<Local>,
}

impl GameRecord {
    pub fn new(kind: GameKind, score: i64, created_at: DateTime<Local>) -> Self {
        Self {
            kind,
            score,
            created_at,
        }
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    /// Milliseconds: latency, absolute timing error, or run time plus penalty
    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }
}
