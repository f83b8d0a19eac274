use chrono::{Duration, Local};
use tempfile::tempdir;

use trisense::error::RankingError;
use trisense::ranking::{best_scores, persist, MemoryRanking};
use trisense::session::conclude;
use trisense::store::SqliteRanking;
use trisense::{GameKind, GameRecord, Grade, RankingGateway};

fn record(kind: GameKind, score: i64) -> GameRecord {
    GameRecord::new(kind, score, Local::now())
}

#[test]
fn sqlite_and_memory_rank_alike() {
    let dir = tempdir().unwrap();
    let mut sqlite = SqliteRanking::open(dir.path().join("records.db")).unwrap();
    let mut memory = MemoryRanking::new();

    let scores = [14_500, 12_000, 30_000, 12_000, 9_800, 41_000];
    for score in scores {
        sqlite.save(&record(GameKind::Number, score)).unwrap();
        memory.save(&record(GameKind::Number, score)).unwrap();
    }

    let from_sqlite: Vec<i64> = sqlite
        .top_records(GameKind::Number, 5)
        .unwrap()
        .iter()
        .map(|r| r.score())
        .collect();
    let from_memory: Vec<i64> = memory
        .top_records(GameKind::Number, 5)
        .unwrap()
        .iter()
        .map(|r| r.score())
        .collect();

    assert_eq!(from_sqlite, vec![9_800, 12_000, 12_000, 14_500, 30_000]);
    assert_eq!(from_sqlite, from_memory);
}

#[test]
fn equal_scores_keep_insertion_order() {
    let mut sqlite = SqliteRanking::open_in_memory().unwrap();
    let earlier = Local::now() - Duration::days(1);
    let later = Local::now();

    sqlite.save(&GameRecord::new(GameKind::Timing, 40, earlier)).unwrap();
    sqlite.save(&GameRecord::new(GameKind::Timing, 40, later)).unwrap();

    let top = sqlite.top_records(GameKind::Timing, 5).unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].created_at().timestamp(), earlier.timestamp());
    assert_eq!(top[1].created_at().timestamp(), later.timestamp());
}

#[test]
fn records_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("records.db");

    {
        let mut store = SqliteRanking::open(&path).unwrap();
        let outcome = conclude(&mut store, record(GameKind::Reflex, 205));
        assert!(outcome.saved);
        assert_eq!(outcome.grade, Grade::SS);
    }

    let store = SqliteRanking::open(&path).unwrap();
    assert_eq!(store.count(GameKind::Reflex).unwrap(), 1);
    let best = best_scores(&store);
    assert_eq!(best[0].1.as_ref().map(|r| r.score()), Some(205));
    assert_eq!(best[1].1, None);
}

struct ReadOnlyRanking {
    inner: MemoryRanking,
}

impl RankingGateway for ReadOnlyRanking {
    fn save(&mut self, _record: &GameRecord) -> Result<(), RankingError> {
        Err(RankingError::Unavailable("read-only".to_string()))
    }

    fn top_records(&self, kind: GameKind, limit: usize) -> Result<Vec<GameRecord>, RankingError> {
        self.inner.top_records(kind, limit)
    }
}

#[test]
fn failed_save_keeps_result_and_store_intact() {
    let mut inner = MemoryRanking::new();
    inner.save(&record(GameKind::Reflex, 300)).unwrap();
    let mut store = ReadOnlyRanking { inner };

    assert!(!persist(&mut store, &record(GameKind::Reflex, 190)));

    let outcome = conclude(&mut store, record(GameKind::Reflex, 190));
    assert!(!outcome.saved);
    assert_eq!(outcome.record.score(), 190);
    assert_eq!(outcome.grade, Grade::SS);

    let top = store.top_records(GameKind::Reflex, 5).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].score(), 300);
}
