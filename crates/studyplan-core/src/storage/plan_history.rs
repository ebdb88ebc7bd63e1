//! SQLite-based plan history.
//!
//! Generated plans are recorded as [`PlanSnapshot`]s for audit and later
//! reconstruction. The snapshot JSON is the source of truth; the other
//! columns exist for querying.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::path::Path;

use super::data_dir;
use crate::error::StorageError;
use crate::scheduler::PlanSnapshot;

/// A stored plan snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRecord {
    pub id: String,
    pub generated_at: DateTime<Utc>,
    pub total_minutes: u32,
    pub task_count: usize,
    pub snapshot: PlanSnapshot,
}

impl PlanRecord {
    fn from_snapshot(snapshot: PlanSnapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            generated_at: snapshot.generated_at,
            total_minutes: snapshot.total_minutes,
            task_count: snapshot.task_count(),
            snapshot,
        }
    }
}

/// SQLite store of generated plans.
pub struct PlanHistory {
    conn: Connection,
}

impl PlanHistory {
    /// Open the history at `~/.config/studyplan/studyplan.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("studyplan.db");
        Self::open_at(&path)
    }

    /// Open the history at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let history = Self { conn };
        history.migrate()?;
        Ok(history)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let history = Self { conn };
        history.migrate()?;
        Ok(history)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS plan_snapshots (
                id            TEXT PRIMARY KEY,
                generated_at  TEXT NOT NULL,
                plan_day      TEXT NOT NULL,
                total_minutes INTEGER NOT NULL,
                task_count    INTEGER NOT NULL,
                snapshot_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_plan_snapshots_generated_at ON plan_snapshots(generated_at);
            CREATE INDEX IF NOT EXISTS idx_plan_snapshots_plan_day ON plan_snapshots(plan_day);",
        )
    }

    /// Record a snapshot. Re-recording the same id replaces it.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record(&self, snapshot: &PlanSnapshot) -> Result<(), StorageError> {
        let json = serde_json::to_string(snapshot).map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        self.conn.execute(
            "INSERT OR REPLACE INTO plan_snapshots
                (id, generated_at, plan_day, total_minutes, task_count, snapshot_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                snapshot.id,
                snapshot.generated_at.to_rfc3339(),
                snapshot.generated_at.date_naive().to_string(),
                snapshot.total_minutes,
                snapshot.task_count() as i64,
                json,
            ],
        )?;
        tracing::debug!(id = %snapshot.id, "plan snapshot recorded");
        Ok(())
    }

    /// Most recent snapshots, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<PlanRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT snapshot_json FROM plan_snapshots
             ORDER BY generated_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(decode(&row?)?);
        }
        Ok(records)
    }

    pub fn get(&self, id: &str) -> Result<Option<PlanRecord>, StorageError> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT snapshot_json FROM plan_snapshots WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|j| decode(&j)).transpose()
    }

    /// Latest snapshot generated on `day` (UTC).
    pub fn latest_for_day(&self, day: NaiveDate) -> Result<Option<PlanRecord>, StorageError> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT snapshot_json FROM plan_snapshots
                 WHERE plan_day = ?1
                 ORDER BY generated_at DESC
                 LIMIT 1",
                params![day.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|j| decode(&j)).transpose()
    }
}

fn decode(json: &str) -> Result<PlanRecord, StorageError> {
    let snapshot: PlanSnapshot =
        serde_json::from_str(json).map_err(|e| StorageError::QueryFailed(e.to_string()))?;
    Ok(PlanRecord::from_snapshot(snapshot))
}
