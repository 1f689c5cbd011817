//! Database schema for the `SQLite` backend.

/// Tables are created on open if they don't exist yet.
///
/// Timestamps are RFC 3339 strings with nanosecond precision.
pub(super) const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS frequency_table (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    date_created TEXT NOT NULL,
    last_updated TEXT
);

CREATE TABLE IF NOT EXISTS frequency_table_item (
    frequency_table_id INTEGER NOT NULL REFERENCES frequency_table(id) ON DELETE CASCADE,
    word TEXT NOT NULL,
    times INTEGER NOT NULL,
    PRIMARY KEY (frequency_table_id, word)
);
";
