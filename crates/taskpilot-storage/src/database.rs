// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use taskpilot_core::TaskpilotError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Handle to the SQLite database.
///
/// Cheap to clone; all clones share the same background connection thread,
/// which is what serializes conflicting writes at the row level.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if necessary) the database at `path`, applies the
    /// PRAGMA set, and runs pending migrations.
    pub async fn open(path: &str) -> Result<Self, TaskpilotError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| TaskpilotError::Storage {
                source: Box::new(e),
            })?;
        }
        let conn = Connection::open(path).await.map_err(map_tr_err)?;
        let db = Self::configure(conn).await?;
        debug!(path, "database opened");
        Ok(db)
    }

    /// Opens an in-memory database. Test-only convenience.
    pub async fn open_in_memory() -> Result<Self, TaskpilotError> {
        let conn = Connection::open_in_memory().await.map_err(map_tr_err)?;
        Self::configure(conn).await
    }

    async fn configure(conn: Connection) -> Result<Self, TaskpilotError> {
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            migrations::run_migrations(conn)
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoints the WAL and closes the background connection thread.
    pub async fn close(&self) -> Result<(), TaskpilotError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Maps a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> TaskpilotError {
    TaskpilotError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_runs_migrations() {
        let db = Database::open_in_memory().await.unwrap();
        let tables: Vec<String> = db
            .connection()
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                let mut names = Vec::new();
                for row in rows {
                    names.push(row?);
                }
                Ok(names)
            })
            .await
            .unwrap();
        assert!(tables.iter().any(|t| t == "tasks"));
        assert!(tables.iter().any(|t| t == "conversations"));
        assert!(tables.iter().any(|t| t == "messages"));
    }

    #[tokio::test]
    async fn open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/data/taskpilot.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
        assert!(path.exists());
    }
}
