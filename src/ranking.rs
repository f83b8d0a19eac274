//! Leaderboard access.
//!
//! Engines hand finished records to the caller, which forwards them here.
//! Saving is fire-and-forget from the game's point of view: a failed write
//! is logged and the on-screen result stands.

use itertools::Itertools;

use crate::error::RankingError;
use crate::record::{GameKind, GameRecord};

/// Number of records shown per game unless configured otherwise
pub const DEFAULT_RANKING_LIMIT: usize = 5;

pub trait RankingGateway {
    fn save(&mut self, record: &GameRecord) -> Result<(), RankingError>;

    /// Best `limit` records for `kind`, lowest score first. Equal scores keep
    /// the order they were saved in.
    fn top_records(&self, kind: GameKind, limit: usize) -> Result<Vec<GameRecord>, RankingError>;
}

impl<G: RankingGateway + ?Sized> RankingGateway for Box<G> {
    fn save(&mut self, record: &GameRecord) -> Result<(), RankingError> {
        (**self).save(record)
    }

    fn top_records(&self, kind: GameKind, limit: usize) -> Result<Vec<GameRecord>, RankingError> {
        (**self).top_records(kind, limit)
    }
}

/// Store a finished record, logging rather than propagating failures.
/// Returns whether the write succeeded.
pub fn persist<G: RankingGateway + ?Sized>(gateway: &mut G, record: &GameRecord) -> bool {
    match gateway.save(record) {
        Ok(()) => {
            tracing::info!(
                "saved {} record: {} ms",
                record.kind().as_str(),
                record.score()
            );
            true
        }
        Err(e) => {
            tracing::warn!(
                "could not save {} record ({} ms): {}",
                record.kind().as_str(),
                record.score(),
                e
            );
            false
        }
    }
}

/// Best record per game for the home summary. Kinds whose query fails are
/// reported as having no record.
pub fn best_scores<G: RankingGateway + ?Sized>(gateway: &G) -> Vec<(GameKind, Option<GameRecord>)> {
    GameKind::ALL
        .iter()
        .map(|&kind| {
            let best = match gateway.top_records(kind, 1) {
                Ok(records) => records.into_iter().next(),
                Err(e) => {
                    tracing::warn!("could not load {} ranking: {}", kind.as_str(), e);
                    None
                }
            };
            (kind, best)
        })
        .collect()
}

/// In-process store; nothing survives the process
#[derive(Debug, Default, Clone)]
pub struct MemoryRanking {
    records: Vec<GameRecord>,
}

impl MemoryRanking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RankingGateway for MemoryRanking {
    fn save(&mut self, record: &GameRecord) -> Result<(), RankingError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn top_records(&self, kind: GameKind, limit: usize) -> Result<Vec<GameRecord>, RankingError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.kind() == kind)
            .sorted_by_key(|r| r.score())
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn record(kind: GameKind, score: i64) -> GameRecord {
        GameRecord::new(kind, score, Local::now())
    }

    struct BrokenRanking;

    impl RankingGateway for BrokenRanking {
        fn save(&mut self, _record: &GameRecord) -> Result<(), RankingError> {
            Err(RankingError::Unavailable("disk full".to_string()))
        }

        fn top_records(&self, _kind: GameKind, _limit: usize) -> Result<Vec<GameRecord>, RankingError> {
            Err(RankingError::Unavailable("disk full".to_string()))
        }
    }

    #[test]
    fn memory_ranking_orders_ascending() {
        let mut ranking = MemoryRanking::new();
        for score in [300, 180, 250, 180, 410] {
            ranking.save(&record(GameKind::Reflex, score)).unwrap();
        }
        ranking.save(&record(GameKind::Timing, 5)).unwrap();

        let top = ranking.top_records(GameKind::Reflex, 3).unwrap();
        let scores: Vec<i64> = top.iter().map(|r| r.score()).collect();
        assert_eq!(scores, vec![180, 180, 250]);
        assert!(top.iter().all(|r| r.kind() == GameKind::Reflex));
    }

    #[test]
    fn memory_ranking_limit_and_empty() {
        let mut ranking = MemoryRanking::new();
        assert!(ranking.top_records(GameKind::Number, 5).unwrap().is_empty());

        ranking.save(&record(GameKind::Number, 14_500)).unwrap();
        assert_eq!(ranking.top_records(GameKind::Number, 0).unwrap().len(), 0);
        assert_eq!(ranking.top_records(GameKind::Number, 10).unwrap().len(), 1);
        assert_eq!(ranking.len(), 1);
    }

    #[test]
    fn persist_reports_success() {
        let mut ranking = MemoryRanking::new();
        assert!(persist(&mut ranking, &record(GameKind::Timing, 75)));
        assert_eq!(ranking.len(), 1);
    }

    #[test]
    fn persist_swallows_failures() {
        let mut ranking = BrokenRanking;
        assert!(!persist(&mut ranking, &record(GameKind::Timing, 75)));
    }

    #[test]
    fn best_scores_per_kind() {
        let mut ranking = MemoryRanking::new();
        ranking.save(&record(GameKind::Reflex, 250)).unwrap();
        ranking.save(&record(GameKind::Reflex, 190)).unwrap();
        ranking.save(&record(GameKind::Number, 20_000)).unwrap();

        let best = best_scores(&ranking);
        assert_eq!(best.len(), 3);
        assert_eq!(best[0].0, GameKind::Reflex);
        assert_eq!(best[0].1.as_ref().map(|r| r.score()), Some(190));
        assert_eq!(best[1].1, None);
        assert_eq!(best[2].1.as_ref().map(|r| r.score()), Some(20_000));
    }

    #[test]
    fn best_scores_tolerates_failing_store() {
        let best = best_scores(&BrokenRanking);
        assert!(best.iter().all(|(_, r)| r.is_none()));
    }

    #[test]
    fn boxed_gateway_delegates() {
        let mut boxed: Box<dyn RankingGateway> = Box::new(MemoryRanking::new());
        assert!(persist(&mut boxed, &record(GameKind::Reflex, 200)));
        assert_eq!(boxed.top_records(GameKind::Reflex, 5).unwrap().len(), 1);
    }
}
