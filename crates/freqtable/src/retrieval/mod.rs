//! Repository retrieval.
//!
//! The mining core only depends on the shape of the retrieval contract:
//! clone a repository, list its files, read one file. The contract is split
//! in two traits so that everything belonging to one clone lives in the
//! handle returned by [`Cloner::clone_repository`]:
//!
//! - [`Cloner`] is shared and stateless (one per processor)
//! - [`ClonedRepository`] is owned by a single extraction and read
//!   concurrently by the parse workers
//!
//! Two implementations ship with the crate:
//!
//! - [`GitCloner`]: clones with libgit2 into a temporary directory
//! - [`MemoryCloner`]: serves repositories held in memory (fixtures, tests)

mod git;
mod memory;

pub use git::GitCloner;
pub use memory::{MemoryCloner, MemoryRepository};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of a retrieved repository.
///
/// Created by the retrieval collaborator and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// Short repository name (last path segment of the locator).
    pub name: String,
    /// Locator the repository was retrieved from.
    pub url: String,
    /// Revision that was checked out.
    pub revision: String,
    /// When the repository was retrieved.
    pub retrieved_at: DateTime<Utc>,
}

impl RepositoryDescriptor {
    /// Create a descriptor stamped with the current time.
    ///
    /// The name is derived from the last path segment of `url`, without a
    /// trailing `.git`.
    #[must_use]
    pub fn new(url: &str, revision: impl Into<String>) -> Self {
        Self {
            name: repository_name(url).to_string(),
            url: url.to_string(),
            revision: revision.into(),
            retrieved_at: Utc::now(),
        }
    }
}

/// Derive a short repository name from a locator.
fn repository_name(url: &str) -> &str {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit(|c: char| c == '/' || c == ':').next().unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last)
}

/// Errors reported by the retrieval collaborator.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// libgit2 failed (unreachable remote, bad locator, corrupt repository).
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// Reading the checkout failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No repository is available at the locator.
    #[error("repository not found: {0}")]
    RepositoryNotFound(String),

    /// The file is not part of the repository.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// The file exists but its contents could not be read.
    #[error("cannot read {name}: {message}")]
    Unreadable {
        /// Name of the file.
        name: String,
        /// What went wrong.
        message: String,
    },

    /// The file listing could not be produced.
    #[error("cannot list files: {0}")]
    Listing(String),
}

/// Clones repositories.
///
/// Implementations must be `Send + Sync`: one cloner is shared by every
/// extraction a processor runs, possibly at the same time.
pub trait Cloner: Send + Sync {
    /// Access a repository and clone it.
    ///
    /// # Errors
    ///
    /// Returns a [`RetrievalError`] when the locator is unreachable or invalid.
    fn clone_repository(&self, url: &str) -> Result<Box<dyn ClonedRepository>, RetrievalError>;
}

/// A cloned repository, owned by one extraction.
///
/// `file` is called from several parse workers at once.
pub trait ClonedRepository: Send + Sync {
    /// Identity of the clone.
    fn descriptor(&self) -> &RepositoryDescriptor;

    /// Names of every file in the repository.
    ///
    /// # Errors
    ///
    /// Returns a [`RetrievalError`] if the listing cannot be produced.
    fn filenames(&self) -> Result<Vec<String>, RetrievalError>;

    /// Raw contents of one file.
    ///
    /// # Errors
    ///
    /// Returns a [`RetrievalError`] if the file is unknown or unreadable.
    fn file(&self, name: &str) -> Result<Vec<u8>, RetrievalError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://github.com/eroatta/freqtable", "freqtable")]
    #[case("https://github.com/src-d/go-siva.git", "go-siva")]
    #[case("https://github.com/src-d/go-siva/", "go-siva")]
    #[case("git@github.com:owner/tool.git", "tool")]
    #[case("/tmp/local-repo", "local-repo")]
    fn repository_name_is_last_segment(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(repository_name(url), expected);
    }

    #[test]
    fn descriptor_records_locator_and_revision() {
        let descriptor =
            RepositoryDescriptor::new("https://github.com/eroatta/freqtable", "abc123");

        assert_eq!(descriptor.name, "freqtable");
        assert_eq!(descriptor.url, "https://github.com/eroatta/freqtable");
        assert_eq!(descriptor.revision, "abc123");
    }
}
