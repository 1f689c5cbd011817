//! libgit2-backed cloner.
//!
//! Clones into a temporary directory that lives as long as the returned
//! handle. The file listing comes from the git index, so only tracked regular
//! files are visible; symlinks and submodules are left out.

use git2::build::RepoBuilder;
use tempfile::TempDir;
use tracing::{debug, trace};

use super::{ClonedRepository, Cloner, RepositoryDescriptor, RetrievalError};

/// File type bits of a git index entry mode.
const MODE_TYPE_MASK: u32 = 0o170_000;
/// Mode type of a regular file.
const MODE_REGULAR_FILE: u32 = 0o100_000;

/// Clones remote (or local) git repositories with libgit2.
#[derive(Debug, Default, Clone)]
pub struct GitCloner {
    branch: Option<String>,
}

impl GitCloner {
    /// Create a cloner that checks out the remote's default branch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check out `branch` instead of the default branch.
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

impl Cloner for GitCloner {
    fn clone_repository(&self, url: &str) -> Result<Box<dyn ClonedRepository>, RetrievalError> {
        let checkout = tempfile::Builder::new().prefix("freqtable-").tempdir()?;

        let mut builder = RepoBuilder::new();
        if let Some(branch) = &self.branch {
            builder.branch(branch);
        }
        let repository = builder.clone(url, checkout.path())?;

        let revision = repository.head()?.peel_to_commit()?.id().to_string();

        let mut filenames = Vec::new();
        for entry in repository.index()?.iter() {
            if entry.mode & MODE_TYPE_MASK != MODE_REGULAR_FILE {
                trace!(mode = entry.mode, "Skipping non-regular index entry");
                continue;
            }
            match String::from_utf8(entry.path) {
                Ok(name) => filenames.push(name),
                Err(e) => trace!(error = %e, "Skipping index entry with non UTF-8 path"),
            }
        }
        filenames.sort_unstable();

        debug!(
            url,
            revision = %revision,
            files = filenames.len(),
            "Cloned repository"
        );

        Ok(Box::new(GitCheckout {
            descriptor: RepositoryDescriptor::new(url, revision),
            filenames,
            checkout,
        }))
    }
}

/// Working tree of a clone, removed from disk on drop.
struct GitCheckout {
    descriptor: RepositoryDescriptor,
    /// Sorted, for binary search.
    filenames: Vec<String>,
    checkout: TempDir,
}

impl ClonedRepository for GitCheckout {
    fn descriptor(&self) -> &RepositoryDescriptor {
        &self.descriptor
    }

    fn filenames(&self) -> Result<Vec<String>, RetrievalError> {
        Ok(self.filenames.clone())
    }

    fn file(&self, name: &str) -> Result<Vec<u8>, RetrievalError> {
        if self
            .filenames
            .binary_search_by(|candidate| candidate.as_str().cmp(name))
            .is_err()
        {
            return Err(RetrievalError::FileNotFound(name.to_string()));
        }

        std::fs::read(self.checkout.path().join(name)).map_err(|e| RetrievalError::Unreadable {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}
