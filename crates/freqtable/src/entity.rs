//! The persisted frequency table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mine::FrequencyMap;

/// Word frequencies of one repository, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    /// Identifier assigned by the repository; `0` until saved.
    pub id: i64,
    /// Locator of the repository the words were mined from.
    pub name: String,
    /// When the table was created.
    pub date_created: DateTime<Utc>,
    /// When the table was last changed, if ever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Word to number of occurrences.
    #[serde(default)]
    pub values: FrequencyMap,
}

impl FrequencyTable {
    /// An unsaved table created now.
    #[must_use]
    pub fn new(name: impl Into<String>, values: FrequencyMap) -> Self {
        Self {
            id: 0,
            name: name.into(),
            date_created: Utc::now(),
            last_updated: None,
            values,
        }
    }

    /// Returns `true` once a repository has assigned an identifier.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.id > 0
    }

    /// Number of times `word` was seen.
    #[must_use]
    pub fn times(&self, word: &str) -> u64 {
        self.values.get(word).copied().unwrap_or_default()
    }
}
