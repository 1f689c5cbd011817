//! Request and response bodies.

use chrono::{DateTime, SecondsFormat, Utc};
use freqtable::{FrequencyMap, FrequencyTable};
use serde::{Deserialize, Serialize};

use crate::validation::validate_url;

/// Body of `POST /frequency-tables`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFrequencyTableRequest {
    /// Locator of the repository to mine.
    #[serde(default)]
    pub repository: Option<String>,
}

impl CreateFrequencyTableRequest {
    /// Check every field and describe each offending one.
    ///
    /// # Errors
    ///
    /// Returns one `invalid field '<name>' with value <value>` detail per
    /// invalid field.
    pub fn validate(&self) -> Result<&str, Vec<String>> {
        match self.repository.as_deref() {
            None | Some("") => Err(vec![invalid_field("repository", "null or empty")]),
            Some(url) => match validate_url(url) {
                Ok(()) => Ok(url),
                Err(reason) => {
                    tracing::debug!(url, reason = %reason, "Rejected repository locator");
                    Err(vec![invalid_field("repository", url)])
                }
            },
        }
    }
}

fn invalid_field(name: &str, value: &str) -> String {
    format!("invalid field '{name}' with value {value}")
}

/// A frequency table as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTableResponse {
    /// Identifier of the stored table.
    pub id: i64,
    /// Locator of the mined repository.
    pub name: String,
    /// Creation time, RFC 3339.
    pub date_created: String,
    /// Last update time, RFC 3339; omitted when the table was never updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    /// Word frequencies; only included when a single table is fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<FrequencyMap>,
}

impl FrequencyTableResponse {
    /// Summary returned after creation, without the values.
    #[must_use]
    pub fn summary(table: &FrequencyTable) -> Self {
        Self {
            id: table.id,
            name: table.name.clone(),
            date_created: rfc3339(table.date_created),
            last_updated: table.last_updated.map(rfc3339),
            values: None,
        }
    }

    /// The full table, values included.
    #[must_use]
    pub fn detailed(table: FrequencyTable) -> Self {
        let mut response = Self::summary(&table);
        response.values = Some(table.values);
        response
    }
}

fn rfc3339(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Body of `GET /ping`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    /// Always `pong`.
    pub message: String,
}
