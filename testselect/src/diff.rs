//! Turns a base/candidate revision pair into the list of changed paths.
//!
//! The candidate is merged into the base before diffing, so the path list reflects what
//! would land rather than a plain two-tree comparison.

use std::fmt;

use thiserror::Error;

use crate::vcs::{RepoRef, VcsError, VcsProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStep {
    /// Building the provider itself, before any repository is touched.
    Setup,
    Clone,
    Checkout,
    Fetch,
    Merge,
    Diff,
}

impl DiffStep {
    pub fn name(&self) -> &'static str {
        match self {
            DiffStep::Setup => "provider setup",
            DiffStep::Clone => "clone",
            DiffStep::Checkout => "checkout",
            DiffStep::Fetch => "fetch",
            DiffStep::Merge => "merge",
            DiffStep::Diff => "diff",
        }
    }
}

impl fmt::Display for DiffStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("{step} of {repo} failed: {source}")]
pub struct DiffAcquisitionError {
    pub step: DiffStep,
    pub repo: String,
    #[source]
    pub source: VcsError,
}

pub struct ChangeSetResolver<'p, P: VcsProvider> {
    provider: &'p mut P,
}

impl<'p, P: VcsProvider> ChangeSetResolver<'p, P> {
    pub fn new(provider: &'p mut P) -> Self {
        Self { provider }
    }

    /// Runs clone, checkout, fetch, merge and diff in that order. The first failing step
    /// aborts the sequence; nothing is retried.
    pub fn resolve(
        &mut self,
        repo: &RepoRef,
        base_sha: &str,
        candidate_sha: &str,
    ) -> Result<Vec<String>, DiffAcquisitionError> {
        self.step(repo, DiffStep::Clone, "", |p| p.clone_repo(repo))?;
        self.step(repo, DiffStep::Checkout, base_sha, |p| {
            p.checkout(repo, base_sha)
        })?;
        self.step(repo, DiffStep::Fetch, candidate_sha, |p| {
            p.fetch(repo, candidate_sha)
        })?;
        self.step(repo, DiffStep::Merge, candidate_sha, |p| {
            p.merge(repo, candidate_sha)
        })?;
        let paths = self.step(repo, DiffStep::Diff, base_sha, |p| {
            p.diff_name_only(repo, base_sha)
        })?;
        tracing::info!(%repo, changed = paths.len(), "resolved change set");
        Ok(paths)
    }

    fn step<T>(
        &mut self,
        repo: &RepoRef,
        step: DiffStep,
        revision: &str,
        op: impl FnOnce(&mut P) -> Result<T, VcsError>,
    ) -> Result<T, DiffAcquisitionError> {
        tracing::info!(%repo, step = step.name(), revision, "running vcs step");
        op(&mut *self.provider).map_err(|source| {
            tracing::error!(%repo, step = step.name(), error = %source, "vcs step failed");
            DiffAcquisitionError {
                step,
                repo: repo.to_string(),
                source,
            }
        })
    }
}

/// Convenience wrapper around [`ChangeSetResolver::resolve`].
pub fn resolve_changed_paths<P: VcsProvider>(
    provider: &mut P,
    repo: &RepoRef,
    base_sha: &str,
    candidate_sha: &str,
) -> Result<Vec<String>, DiffAcquisitionError> {
    ChangeSetResolver::new(provider).resolve(repo, base_sha, candidate_sha)
}
