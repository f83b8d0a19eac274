use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::RankingError;
use crate::ranking::RankingGateway;
use crate::record::{GameKind, GameRecord};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS game_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        game_type TEXT NOT NULL,
        score INTEGER NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_game_records_type_score
        ON game_records(game_type, score);
"#;

/// SQLite-backed leaderboard
#[derive(Debug)]
pub struct SqliteRanking {
    conn: Connection,
}

impl SqliteRanking {
    /// Open the store at the default location, falling back to the working
    /// directory when no home directory can be resolved.
    pub fn open_default() -> Result<Self, RankingError> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("trisense_records.db"));
        Self::open(path)
    }

    /// Open (creating if needed) the store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RankingError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| RankingError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path).map_err(|source| RankingError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, RankingError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, RankingError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Remove every stored record
    pub fn clear_all(&self) -> Result<(), RankingError> {
        self.conn.execute("DELETE FROM game_records", [])?;
        Ok(())
    }

    pub fn count(&self, kind: GameKind) -> Result<i64, RankingError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM game_records WHERE game_type = ?1",
            [kind.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl RankingGateway for SqliteRanking {
    fn save(&mut self, record: &GameRecord) -> Result<(), RankingError> {
        self.conn.execute(
            "INSERT INTO game_records (game_type, score, created_at) VALUES (?1, ?2, ?3)",
            params![
                record.kind().as_str(),
                record.score(),
                record.created_at().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn top_records(&self, kind: GameKind, limit: usize) -> Result<Vec<GameRecord>, RankingError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT game_type, score, created_at
            FROM game_records
            WHERE game_type = ?1
            ORDER BY score ASC, id ASC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![kind.as_str(), limit as i64], |row| {
            let kind_str: String = row.get(0)?;
            let kind = kind_str.parse::<GameKind>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
            })?;
            let created_str: String = row.get(2)?;
            let created_at = DateTime::parse_from_rfc3339(&created_str)
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?
                .with_timezone(&Local);

            Ok(GameRecord::new(kind, row.get(1)?, created_at))
        })?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }
}
