use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use rusqlite::{Connection, params};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::providers::ProviderId;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// One completed scrape attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub user: String,
    pub provider: String,
    pub url: String,
    pub prompt: String,
    pub duration_seconds: f64,
}

impl LogEntry {
    pub fn new(user: &str, provider: ProviderId, url: &str, prompt: &str, elapsed: Duration) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            user: user.to_string(),
            provider: provider.name().to_string(),
            url: url.to_string(),
            prompt: prompt.to_string(),
            duration_seconds: (elapsed.as_secs_f64() * 100.0).round() / 100.0,
        }
    }
}

/// Append-only SQLite log. Every append opens its own connection, so
/// concurrent writers never share a handle.
#[derive(Debug, Clone)]
pub struct LogStore {
    path: PathBuf,
}

impl LogStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::StorageError(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let conn = Self::connect(&path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            CREATE TABLE IF NOT EXISTS logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT,
                user TEXT,
                provider TEXT,
                url TEXT,
                prompt TEXT,
                duration REAL
            );
            ",
        )?;

        Ok(Self { path })
    }

    fn connect(path: &Path) -> Result<Connection> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts one row and returns its id.
    pub fn append(&self, entry: &LogEntry) -> Result<i64> {
        let conn = Self::connect(&self.path)?;
        conn.execute(
            "INSERT INTO logs (timestamp, user, provider, url, prompt, duration)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.timestamp,
                entry.user,
                entry.provider,
                entry.url,
                entry.prompt,
                entry.duration_seconds,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Newest rows first. For audit tooling; the service never reads back.
    pub fn recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = Self::connect(&self.path)?;
        let mut stmt = conn.prepare(
            "SELECT timestamp, user, provider, url, prompt, duration
             FROM logs ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(LogEntry {
                timestamp: row.get(0)?,
                user: row.get(1)?,
                provider: row.get(2)?,
                url: row.get(3)?,
                prompt: row.get(4)?,
                duration_seconds: row.get(5)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}
