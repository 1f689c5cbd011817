//! Creating frequency tables from repositories.

use std::sync::Arc;

use async_trait::async_trait;

use crate::entity::FrequencyTable;
use crate::error::{Error, Result};
use crate::mine::FrequencyMap;
use crate::processor::Processor;
use crate::storage::FrequencyTableRepository;

/// Extracts the word frequencies of a repository.
///
/// Extraction is blocking; async callers run it on the blocking pool.
pub trait WordCountExtractor: Send + Sync {
    /// Word frequencies of the repository at `url`.
    ///
    /// # Errors
    ///
    /// Returns whatever error ended the extraction.
    fn extract(&self, url: &str) -> Result<FrequencyMap>;
}

impl WordCountExtractor for Processor {
    fn extract(&self, url: &str) -> Result<FrequencyMap> {
        Processor::extract(self, url)
    }
}

/// Creates and stores the frequency table of a repository.
#[async_trait]
pub trait CreateFrequencyTable: Send + Sync {
    /// Extract, store and return the table for `url`, with its identifier set.
    ///
    /// # Errors
    ///
    /// Returns the extraction or storage error; nothing is stored when the
    /// extraction fails.
    async fn create(&self, url: &str) -> Result<FrequencyTable>;

    /// Create the tables for every locator in `urls`, one after the other.
    ///
    /// # Errors
    ///
    /// Stops at the first failure and returns its error; tables created
    /// before it stay stored.
    async fn create_many(&self, urls: &[String]) -> Result<Vec<FrequencyTable>> {
        let mut tables = Vec::with_capacity(urls.len());
        for url in urls {
            tables.push(self.create(url).await?);
        }
        Ok(tables)
    }
}

/// [`CreateFrequencyTable`] wired to an extractor and a repository.
#[derive(Clone)]
pub struct CreateFrequencyTableUsecase {
    extractor: Arc<dyn WordCountExtractor>,
    repository: Arc<dyn FrequencyTableRepository>,
}

impl CreateFrequencyTableUsecase {
    /// Create the use case.
    #[must_use]
    pub fn new(
        extractor: Arc<dyn WordCountExtractor>,
        repository: Arc<dyn FrequencyTableRepository>,
    ) -> Self {
        Self {
            extractor,
            repository,
        }
    }
}

#[async_trait]
impl CreateFrequencyTable for CreateFrequencyTableUsecase {
    async fn create(&self, url: &str) -> Result<FrequencyTable> {
        let extractor = Arc::clone(&self.extractor);
        let locator = url.to_string();
        let values = tokio::task::spawn_blocking(move || extractor.extract(&locator))
            .await
            .map_err(|e| Error::Internal(format!("extraction task failed: {e}")))??;

        let mut table = FrequencyTable::new(url, values);
        table.id = self.repository.save(&table).await?;

        tracing::info!(id = table.id, url, words = table.values.len(), "Created frequency table");
        Ok(table)
    }
}
