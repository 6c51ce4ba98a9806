//! The version-control operations the change set resolver drives.

use std::fmt;

use thiserror::Error;

use testselect_core::RevisionPair;

/// Repository identity a provider can clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub org: String,
    pub repo: String,
    /// Overrides the provider's default remote when set.
    pub clone_uri: Option<String>,
}

impl RepoRef {
    pub fn new(org: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            clone_uri: None,
        }
    }
}

impl From<&RevisionPair> for RepoRef {
    fn from(pair: &RevisionPair) -> Self {
        Self {
            clone_uri: pair.clone_uri.clone(),
            ..Self::new(&pair.org, &pair.repo)
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.repo)
    }
}

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("git executable not found: {0}")]
    GitNotFound(which::Error),

    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("libgit2: {0}")]
    Git2(#[from] git2::Error),

    #[error("refusing revision `{0}`: it would be read as a git option")]
    InvalidRevision(String),

    #[error("{0}")]
    Other(String),
}

/// Capability set for acquiring a change set. Calls are blocking and made strictly in the
/// order the resolver chooses.
pub trait VcsProvider {
    fn clone_repo(&mut self, repo: &RepoRef) -> Result<(), VcsError>;

    fn checkout(&mut self, repo: &RepoRef, revision: &str) -> Result<(), VcsError>;

    fn fetch(&mut self, repo: &RepoRef, revision: &str) -> Result<(), VcsError>;

    fn merge(&mut self, repo: &RepoRef, revision: &str) -> Result<(), VcsError>;

    /// Paths that differ between `base_revision` and the current working state.
    fn diff_name_only(
        &mut self,
        repo: &RepoRef,
        base_revision: &str,
    ) -> Result<Vec<String>, VcsError>;
}

impl<P: VcsProvider + ?Sized> VcsProvider for &mut P {
    fn clone_repo(&mut self, repo: &RepoRef) -> Result<(), VcsError> {
        (**self).clone_repo(repo)
    }

    fn checkout(&mut self, repo: &RepoRef, revision: &str) -> Result<(), VcsError> {
        (**self).checkout(repo, revision)
    }

    fn fetch(&mut self, repo: &RepoRef, revision: &str) -> Result<(), VcsError> {
        (**self).fetch(repo, revision)
    }

    fn merge(&mut self, repo: &RepoRef, revision: &str) -> Result<(), VcsError> {
        (**self).merge(repo, revision)
    }

    fn diff_name_only(
        &mut self,
        repo: &RepoRef,
        base_revision: &str,
    ) -> Result<Vec<String>, VcsError> {
        (**self).diff_name_only(repo, base_revision)
    }
}
