//! Persistence of frequency tables.
//!
//! The use case only depends on [`FrequencyTableRepository`]. Two backends
//! ship with the crate:
//!
//! - [`InMemoryRepository`]: ephemeral, for tests and throwaway servers
//! - [`SqliteRepository`]: a `SQLite` database file (or an in-memory database)
//!
//! # Persisted shape
//!
//! A table is one `frequency_table` row (identifier, name, creation and
//! update timestamps) plus one `frequency_table_item` row per word, keyed by
//! the table identifier.

mod memory;
mod schema;
mod sqlite;

pub use memory::InMemoryRepository;
pub use sqlite::SqliteRepository;

use async_trait::async_trait;

use crate::entity::FrequencyTable;
use crate::error::{Error, Result};

/// Stores and loads frequency tables.
///
/// Implementations must be `Send + Sync`: one repository is shared by every
/// request the server handles.
#[async_trait]
pub trait FrequencyTableRepository: Send + Sync {
    /// Store `table` as a new table and return its identifier.
    ///
    /// The table's own `id` is ignored; identifiers are assigned by the
    /// repository, starting at 1.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingField` if the table has no name, or
    /// `Error::Database` if the backend fails.
    async fn save(&self, table: &FrequencyTable) -> Result<i64>;

    /// Load the table with identifier `id`, values included.
    ///
    /// # Errors
    ///
    /// Returns `Error::TableNotFound` if no table has that identifier.
    async fn get(&self, id: i64) -> Result<FrequencyTable>;
}

/// Checks shared by every backend before a table is written.
fn validate(table: &FrequencyTable) -> Result<()> {
    if table.name.trim().is_empty() {
        return Err(Error::MissingField("name"));
    }
    Ok(())
}
