//! Ephemeral backend.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{FrequencyTableRepository, validate};
use crate::entity::FrequencyTable;
use crate::error::{Error, Result};

/// Keeps tables in a `HashMap`; everything is lost when it is dropped.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    tables: HashMap<i64, FrequencyTable>,
}

impl InMemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tables.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.tables.len()
    }

    /// Returns `true` if no table has been stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl FrequencyTableRepository for InMemoryRepository {
    async fn save(&self, table: &FrequencyTable) -> Result<i64> {
        validate(table)?;

        let mut inner = self.inner.lock().await;
        inner.last_id += 1;
        let id = inner.last_id;
        inner.tables.insert(
            id,
            FrequencyTable {
                id,
                ..table.clone()
            },
        );

        tracing::debug!(
            id,
            name = %table.name,
            words = table.values.len(),
            "Stored frequency table"
        );
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<FrequencyTable> {
        self.inner
            .lock()
            .await
            .tables
            .get(&id)
            .cloned()
            .ok_or(Error::TableNotFound(id))
    }
}
