//! `SQLite` backend.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::schema::SCHEMA;
use super::{FrequencyTableRepository, validate};
use crate::entity::FrequencyTable;
use crate::error::{Error, Result};
use crate::mine::FrequencyMap;

/// Stores tables in a `SQLite` database.
///
/// The connection is wrapped in a `Mutex`; statements are short, so calls
/// run inline on the calling task.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open or create the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Database` if the file cannot be opened or the schema
    /// cannot be applied.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!(
                    "cannot create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        tracing::debug!(path = %path.display(), "Opened frequency table database");
        Self::with_connection(conn)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns `Error::Database` if the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            Error::Internal(format!(
                "database connection mutex poisoned (a thread panicked while holding the lock): {e}"
            ))
        })
    }

    fn insert(&self, table: &FrequencyTable) -> Result<i64> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO frequency_table (name, date_created, last_updated) VALUES (?1, ?2, ?3)",
            params![
                table.name,
                format_timestamp(table.date_created),
                table.last_updated.map(format_timestamp),
            ],
        )?;
        let id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO frequency_table_item (frequency_table_id, word, times) \
                 VALUES (?1, ?2, ?3)",
            )?;
            for (word, times) in &table.values {
                stmt.execute(params![id, word, times])?;
            }
        }

        tx.commit()?;
        Ok(id)
    }

    fn load(&self, id: i64) -> Result<FrequencyTable> {
        let conn = self.connection()?;

        let header: Option<(String, String, Option<String>)> = conn
            .query_row(
                "SELECT name, date_created, last_updated FROM frequency_table WHERE id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;
        let Some((name, date_created, last_updated)) = header else {
            return Err(Error::TableNotFound(id));
        };

        let mut stmt = conn.prepare(
            "SELECT word, times FROM frequency_table_item WHERE frequency_table_id = ?1",
        )?;
        let values = stmt
            .query_map([id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?)))?
            .collect::<rusqlite::Result<FrequencyMap>>()?;

        Ok(FrequencyTable {
            id,
            name,
            date_created: parse_timestamp(&date_created)?,
            last_updated: last_updated.as_deref().map(parse_timestamp).transpose()?,
            values,
        })
    }
}

impl std::fmt::Debug for SqliteRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRepository").finish_non_exhaustive()
    }
}

#[async_trait]
impl FrequencyTableRepository for SqliteRepository {
    async fn save(&self, table: &FrequencyTable) -> Result<i64> {
        validate(table)?;
        let id = self.insert(table)?;
        tracing::debug!(
            id,
            name = %table.name,
            words = table.values.len(),
            "Stored frequency table"
        );
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<FrequencyTable> {
        self.load(id)
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("invalid timestamp '{value}' in database: {e}")))
}
