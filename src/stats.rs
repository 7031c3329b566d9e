use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

/// One committed recognition outcome. `label` is what the pipeline reported:
/// the matched label, the rejected best guess for an unmatched commit, or
/// empty when classification itself failed.
#[derive(Debug, Clone)]
pub struct OutcomeStat {
    pub commit_seq: u64,
    pub label: String,
    pub score: f64,
    pub matched: bool,
    pub expected: Option<String>,
    pub timestamp: DateTime<Local>,
}

/// per-label aggregate used by the history screen
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSummary {
    pub label: String,
    pub attempts: i64,
    pub matches: i64,
    pub mean_score: f64,
}

/// Database of commit outcomes
#[derive(Debug)]
pub struct OutcomeDb {
    conn: Connection,
}

impl OutcomeDb {
    /// Opens the default per-user database, creating it if needed
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("scrawl_history.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(path)?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS outcomes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                commit_seq INTEGER NOT NULL,
                label TEXT NOT NULL,
                score REAL NOT NULL,
                matched BOOLEAN NOT NULL,
                expected TEXT,
                timestamp TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_outcomes_label ON outcomes(label)",
            [],
        )?;

        Ok(OutcomeDb { conn })
    }

    pub fn record_outcome(&self, stat: &OutcomeStat) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO outcomes (commit_seq, label, score, matched, expected, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                stat.commit_seq,
                stat.label,
                stat.score,
                stat.matched,
                stat.expected,
                stat.timestamp.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Aggregates outcomes per label, ordered by label
    pub fn label_summary(&self) -> Result<Vec<LabelSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                label,
                COUNT(*) as attempts,
                SUM(CASE WHEN matched = 1 THEN 1 ELSE 0 END) as matches,
                AVG(score) as mean_score
            FROM outcomes
            WHERE label != ''
            GROUP BY label
            ORDER BY label
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(LabelSummary {
                label: row.get(0)?,
                attempts: row.get(1)?,
                matches: row.get(2)?,
                mean_score: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
            })
        })?;

        let mut summary = Vec::new();
        for row in rows {
            summary.push(row?);
        }
        Ok(summary)
    }

    /// (total commits, matched commits)
    pub fn totals(&self) -> Result<(i64, i64)> {
        let mut stmt = self.conn.prepare(
            "SELECT COUNT(*), SUM(CASE WHEN matched = 1 THEN 1 ELSE 0 END) FROM outcomes",
        )?;
        let (total, matched): (i64, Option<i64>) =
            stmt.query_row([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok((total, matched.unwrap_or(0)))
    }

    /// Clear all outcomes (for testing or reset purposes)
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM outcomes", [])?;
        Ok(())
    }
}
