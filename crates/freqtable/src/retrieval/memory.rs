//! In-memory cloner.
//!
//! Serves repositories registered ahead of time, keyed by locator. Useful for
//! fixtures and for exercising failure paths (failed listings, unreadable
//! files) without touching the network.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{ClonedRepository, Cloner, RepositoryDescriptor, RetrievalError};

/// A repository snapshot held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    revision: String,
    files: BTreeMap<String, Vec<u8>>,
    unreadable: BTreeSet<String>,
    listing_error: Option<String>,
}

impl MemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            revision: "memory".to_string(),
            ..Self::default()
        }
    }

    /// Set the revision reported in the descriptor.
    #[must_use]
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    /// Add a file.
    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(name.into(), content.into());
        self
    }

    /// Add a file that is listed but fails to read.
    #[must_use]
    pub fn with_unreadable_file(mut self, name: impl Into<String>) -> Self {
        self.unreadable.insert(name.into());
        self
    }

    /// Make the file listing fail with `message`.
    #[must_use]
    pub fn with_listing_error(mut self, message: impl Into<String>) -> Self {
        self.listing_error = Some(message.into());
        self
    }
}

/// Serves [`MemoryRepository`] snapshots by locator.
#[derive(Debug, Clone, Default)]
pub struct MemoryCloner {
    repositories: HashMap<String, MemoryRepository>,
}

impl MemoryCloner {
    /// Create a cloner with no repositories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `repository` under `url`.
    #[must_use]
    pub fn with_repository(mut self, url: impl Into<String>, repository: MemoryRepository) -> Self {
        self.repositories.insert(url.into(), repository);
        self
    }
}

impl Cloner for MemoryCloner {
    fn clone_repository(&self, url: &str) -> Result<Box<dyn ClonedRepository>, RetrievalError> {
        let snapshot = self
            .repositories
            .get(url)
            .cloned()
            .ok_or_else(|| RetrievalError::RepositoryNotFound(url.to_string()))?;

        Ok(Box::new(MemoryClone {
            descriptor: RepositoryDescriptor::new(url, snapshot.revision.clone()),
            snapshot,
        }))
    }
}

struct MemoryClone {
    descriptor: RepositoryDescriptor,
    snapshot: MemoryRepository,
}

impl ClonedRepository for MemoryClone {
    fn descriptor(&self) -> &RepositoryDescriptor {
        &self.descriptor
    }

    fn filenames(&self) -> Result<Vec<String>, RetrievalError> {
        if let Some(message) = &self.snapshot.listing_error {
            return Err(RetrievalError::Listing(message.clone()));
        }

        let mut names: Vec<String> = self
            .snapshot
            .files
            .keys()
            .chain(self.snapshot.unreadable.iter())
            .cloned()
            .collect();
        names.sort_unstable();
        names.dedup();
        Ok(names)
    }

    fn file(&self, name: &str) -> Result<Vec<u8>, RetrievalError> {
        if self.snapshot.unreadable.contains(name) {
            return Err(RetrievalError::Unreadable {
                name: name.to_string(),
                message: "permission denied".to_string(),
            });
        }

        self.snapshot
            .files
            .get(name)
            .cloned()
            .ok_or_else(|| RetrievalError::FileNotFound(name.to_string()))
    }
}
