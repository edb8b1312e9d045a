// src/processor/journal.rs
//! Run journal
//!
//! Append-only SQLite log of per-row outcomes. Every run gets a fresh run id;
//! nothing is ever updated or deleted, so the file doubles as an audit trail
//! of which rows were processed, skipped or failed, and why.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::RowReport;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type JournalResult<T> = Result<T, JournalError>;

/// One journal entry as read back.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub run_id: String,
    pub recorded_at: String,
    pub row: u32,
    pub identifier: Option<String>,
    pub outcome: String,
    pub detail: Option<String>,
    pub document: Option<String>,
    pub passed_over: u32,
}

pub struct RunJournal {
    conn: Connection,
    run_id: String,
}

impl RunJournal {
    /// Open (or create) the journal at `path` and start a new run.
    pub fn open(path: &Path) -> JournalResult<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn in_memory() -> JournalResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> JournalResult<Self> {
        conn.execute_batch(
            "PRAGMA busy_timeout=5000;
             CREATE TABLE IF NOT EXISTS row_outcomes (
                 id          INTEGER PRIMARY KEY AUTOINCREMENT,
                 run_id      TEXT NOT NULL,
                 recorded_at TEXT NOT NULL,
                 row         INTEGER NOT NULL,
                 identifier  TEXT,
                 outcome     TEXT NOT NULL,
                 detail      TEXT,
                 document    TEXT,
                 passed_over INTEGER NOT NULL DEFAULT 0
             );",
        )?;
        let run_id = Uuid::new_v4().to_string();
        debug!("Journal run {}", run_id);
        Ok(Self { conn, run_id })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn record(&self, report: &RowReport) -> JournalResult<()> {
        self.conn.execute(
            "INSERT INTO row_outcomes (run_id, recorded_at, row, identifier, outcome, detail, document, passed_over)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                self.run_id,
                Utc::now().to_rfc3339(),
                report.row,
                report.identifier,
                report.outcome.label(),
                report.outcome.detail(),
                report
                    .document
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
                report.passed_over as u32,
            ],
        )?;
        Ok(())
    }

    /// Entries of the most recent run in the journal at `path`, in row order.
    pub fn last_run(path: &Path) -> JournalResult<Vec<JournalEntry>> {
        let conn = Connection::open(path)?;
        read_last_run(&conn)
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> JournalResult<Vec<JournalEntry>> {
        read_last_run(&self.conn)
    }
}

fn read_last_run(conn: &Connection) -> JournalResult<Vec<JournalEntry>> {
    let mut stmt = conn.prepare(
        "SELECT run_id, recorded_at, row, identifier, outcome, detail, document, passed_over
         FROM row_outcomes
         WHERE run_id = (SELECT run_id FROM row_outcomes ORDER BY id DESC LIMIT 1)
         ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(JournalEntry {
            run_id: row.get(0)?,
            recorded_at: row.get(1)?,
            row: row.get(2)?,
            identifier: row.get(3)?,
            outcome: row.get(4)?,
            detail: row.get(5)?,
            document: row.get(6)?,
            passed_over: row.get(7)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
