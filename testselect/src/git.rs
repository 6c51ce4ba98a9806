use std::ffi::OsString;
use std::path::{Path, PathBuf};

use git2::{DiffDelta, DiffFindOptions, DiffOptions, Repository};
use path_slash::PathExt;

use crate::vcs::{RepoRef, VcsError, VcsProvider};

pub const DEFAULT_REMOTE_BASE: &str = "https://github.com";

// Identity recorded on the merge commit; the clone is throwaway so it never leaves the job.
const MERGE_USER_NAME: &str = "testselect";
const MERGE_USER_EMAIL: &str = "testselect@localhost";

/// Drives the `git` executable for clone/checkout/fetch/merge and reads the resulting
/// diff in-process with libgit2.
///
/// Repositories land in `<workdir>/<org>/<repo>`.
#[derive(Debug, Clone)]
pub struct GitCliProvider {
    git: PathBuf,
    workdir: PathBuf,
    remote_base: String,
}

impl GitCliProvider {
    pub fn new(
        workdir: impl Into<PathBuf>,
        remote_base: impl Into<String>,
    ) -> Result<Self, VcsError> {
        let git = which::which("git").map_err(VcsError::GitNotFound)?;
        Ok(Self::with_git(git, workdir, remote_base))
    }

    pub fn with_git(
        git: impl Into<PathBuf>,
        workdir: impl Into<PathBuf>,
        remote_base: impl Into<String>,
    ) -> Self {
        Self {
            git: git.into(),
            workdir: workdir.into(),
            remote_base: remote_base.into(),
        }
    }

    pub fn repo_dir(&self, repo: &RepoRef) -> PathBuf {
        self.workdir.join(&repo.org).join(&repo.repo)
    }

    pub fn clone_url(&self, repo: &RepoRef) -> String {
        match &repo.clone_uri {
            Some(uri) => uri.clone(),
            None => format!(
                "{}/{}/{}",
                self.remote_base.trim_end_matches('/'),
                repo.org,
                repo.repo
            ),
        }
    }

    fn run_git(&self, dir: &Path, args: Vec<OsString>) -> Result<(), VcsError> {
        let display_command = std::iter::once("git".to_string())
            .chain(args.iter().map(|a| a.to_string_lossy().to_string()))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!(dir = %dir.display(), command = %display_command, "running git");

        let output = duct::cmd(self.git.as_path(), args)
            .dir(dir)
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .map_err(|source| VcsError::Spawn {
                command: display_command.clone(),
                source,
            })?;
        if output.status.success() {
            return Ok(());
        }
        let stderr_text = String::from_utf8_lossy(&output.stderr);
        let stderr = if stderr_text.trim().is_empty() {
            format!("exit {}", output.status.code().unwrap_or(1))
        } else {
            stderr_text.trim().to_string()
        };
        Err(VcsError::CommandFailed {
            command: display_command,
            stderr,
        })
    }
}

fn os_args(args: &[&str]) -> Vec<OsString> {
    args.iter().map(OsString::from).collect()
}

fn checked_revision(revision: &str) -> Result<&str, VcsError> {
    if revision.starts_with('-') {
        return Err(VcsError::InvalidRevision(revision.to_string()));
    }
    Ok(revision)
}

impl VcsProvider for GitCliProvider {
    fn clone_repo(&mut self, repo: &RepoRef) -> Result<(), VcsError> {
        let parent = self.workdir.join(&repo.org);
        std::fs::create_dir_all(&parent).map_err(|source| VcsError::Io {
            path: parent.clone(),
            source,
        })?;
        let url = self.clone_url(repo);
        self.run_git(
            &parent,
            os_args(&["clone", "-q", url.as_str(), repo.repo.as_str()]),
        )
    }

    fn checkout(&mut self, repo: &RepoRef, revision: &str) -> Result<(), VcsError> {
        let revision = checked_revision(revision)?;
        self.run_git(&self.repo_dir(repo), os_args(&["checkout", "-q", revision]))
    }

    fn fetch(&mut self, repo: &RepoRef, revision: &str) -> Result<(), VcsError> {
        let revision = checked_revision(revision)?;
        self.run_git(
            &self.repo_dir(repo),
            os_args(&["fetch", "-q", "origin", revision]),
        )
    }

    fn merge(&mut self, repo: &RepoRef, revision: &str) -> Result<(), VcsError> {
        let revision = checked_revision(revision)?;
        let name = format!("user.name={MERGE_USER_NAME}");
        let email = format!("user.email={MERGE_USER_EMAIL}");
        self.run_git(
            &self.repo_dir(repo),
            os_args(&[
                "-c",
                name.as_str(),
                "-c",
                email.as_str(),
                "merge",
                "-q",
                "--no-edit",
                revision,
            ]),
        )
    }

    fn diff_name_only(
        &mut self,
        repo: &RepoRef,
        base_revision: &str,
    ) -> Result<Vec<String>, VcsError> {
        let base_revision = checked_revision(base_revision)?;
        let repository = Repository::open(self.repo_dir(repo))?;
        diff_name_only_against_workdir(&repository, base_revision)
    }
}

/// Same path set as `git diff --name-only <base>`: the base tree against the working
/// directory, with the index consulted for tracked files. Renames are detected, so a moved
/// file reports only its new path.
pub fn diff_name_only_against_workdir(
    repo: &Repository,
    base_revision: &str,
) -> Result<Vec<String>, VcsError> {
    if repo.workdir().is_none() {
        return Err(VcsError::Other(format!(
            "{} has no working directory",
            repo.path().display()
        )));
    }
    let base_tree = repo.revparse_single(base_revision)?.peel_to_tree()?;
    let mut opts = DiffOptions::new();
    let mut diff = repo.diff_tree_to_workdir_with_index(Some(&base_tree), Some(&mut opts))?;
    diff.find_similar(Some(DiffFindOptions::new().renames(true)))?;

    let mut out: Vec<String> = vec![];
    for delta in diff.deltas() {
        push_delta_path(&mut out, delta);
    }
    Ok(out)
}

fn push_delta_path(out: &mut Vec<String>, delta: DiffDelta) {
    let p = delta.new_file().path().or_else(|| delta.old_file().path());
    if let Some(p) = p {
        out.push(p.to_slash_lossy().to_string());
    }
}
