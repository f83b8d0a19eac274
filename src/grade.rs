//! Score to grade mapping.
//!
//! Bands are fixed lookup tables with inclusive upper bounds. Anything above
//! the last bound is a D.

use crate::record::{GameKind, GameRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    SS,
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Best to worst
    pub const ALL: [Grade; 6] = [Grade::SS, Grade::S, Grade::A, Grade::B, Grade::C, Grade::D];

    pub fn label(&self) -> &'static str {
        match self {
            Grade::SS => "SS",
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }

    /// Display colour as 0xRRGGBB
    pub fn color_hex(&self) -> u32 {
        match self {
            Grade::SS => 0xE11D48,
            Grade::S => 0x7C3AED,
            Grade::A => 0x2563EB,
            Grade::B => 0x059669,
            Grade::C => 0xD97706,
            Grade::D => 0x525252,
        }
    }
}

const REFLEX_BANDS: [i64; 5] = [210, 270, 330, 390, 450];
const TIMING_BANDS: [i64; 5] = [30, 60, 120, 240, 480];
const NUMBER_BANDS: [i64; 5] = [12_000, 15_000, 20_000, 25_000, 35_000];

fn bands(kind: GameKind) -> &'static [i64; 5] {
    match kind {
        GameKind::Reflex => &REFLEX_BANDS,
        GameKind::Timing => &TIMING_BANDS,
        GameKind::Number => &NUMBER_BANDS,
    }
}

/// Grade a raw score. Timing is graded on the magnitude of its error.
pub fn grade(kind: GameKind, score: i64) -> Grade {
    let graded = match kind {
        GameKind::Timing => score.saturating_abs(),
        GameKind::Reflex | GameKind::Number => score,
    };
    bands(kind)
        .iter()
        .position(|&upper| graded <= upper)
        .map_or(Grade::D, |idx| Grade::ALL[idx])
}

pub fn grade_record(record: &GameRecord) -> Grade {
    grade(record.kind(), record.score())
}

/// Human-readable band ranges, best grade first.
pub fn legend(kind: GameKind) -> Vec<(Grade, String)> {
    let uppers = bands(kind);
    let mut rows = Vec::with_capacity(Grade::ALL.len());
    let mut lower = 0;

    for (idx, &upper) in uppers.iter().enumerate() {
        rows.push((Grade::ALL[idx], band_range(kind, lower, upper)));
        lower = upper + 1;
    }
    rows.push((Grade::D, band_open(kind, lower)));
    rows
}

fn band_range(kind: GameKind, lower: i64, upper: i64) -> String {
    match kind {
        GameKind::Reflex => format!("{} ~ {} ms", lower, upper),
        GameKind::Timing => format!("±{} ~ {} ms", lower, upper),
        GameKind::Number => format!(
            "{} ~ {} s",
            centiseconds_up(lower),
            centiseconds_up(upper)
        ),
    }
}

fn band_open(kind: GameKind, lower: i64) -> String {
    match kind {
        GameKind::Reflex => format!("{}+ ms", lower),
        GameKind::Timing => format!("±{}+ ms", lower),
        GameKind::Number => format!("{}+ s", centiseconds_up(lower)),
    }
}

// 12001 ms reads as "12.01" so adjacent bands never print the same value
fn centiseconds_up(ms: i64) -> String {
    let cs = (ms + 9).div_euclid(10);
    format!("{}.{:02}", cs / 100, cs % 100)
}

/// Score as shown to the player: milliseconds, or seconds for the grid game
pub fn format_score(kind: GameKind, score: i64) -> String {
    match kind {
        GameKind::Reflex | GameKind::Timing => format!("{} ms", score),
        GameKind::Number => format!("{}.{:03} s", score / 1000, (score % 1000).abs()),
    }
}

/// Label of the best (first) record, or "--" when there is none
pub fn best_score_label(kind: GameKind, records: &[GameRecord]) -> String {
    records
        .first()
        .map_or_else(|| "--".to_string(), |r| format_score(kind, r.score()))
}
