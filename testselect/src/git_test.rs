use std::path::{Path, PathBuf};
use std::process::Command;

use similar_asserts::assert_eq;

use crate::diff::{DiffStep, resolve_changed_paths};
use crate::git::GitCliProvider;
use crate::vcs::{RepoRef, VcsError, VcsProvider};

fn git_executable() -> PathBuf {
    // Prefer absolute locations so tests that touch PATH elsewhere cannot break lookups here.
    [
        "/usr/bin/git",
        "/opt/homebrew/bin/git",
        "/usr/local/bin/git",
        "/bin/git",
    ]
    .into_iter()
    .map(PathBuf::from)
    .find(|p| p.exists())
    .unwrap_or_else(|| PathBuf::from("git"))
}

fn run_git(repo: &Path, args: &[&str]) {
    let status = Command::new(git_executable())
        .current_dir(repo)
        .args(args)
        .status();
    assert!(status.is_ok_and(|s| s.success()), "git {args:?} failed");
}

fn git_stdout(repo: &Path, args: &[&str]) -> String {
    let out = Command::new(git_executable())
        .current_dir(repo)
        .args(args)
        .output()
        .unwrap();
    assert!(out.status.success(), "git {args:?} failed");
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

fn write_file(path: &Path, contents: &str) {
    let parent = path.parent().unwrap();
    std::fs::create_dir_all(parent).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn commit_all(repo: &Path, message: &str) -> String {
    run_git(repo, &["add", "-A"]);
    run_git(repo, &["commit", "-q", "-m", message]);
    git_stdout(repo, &["rev-parse", "HEAD"])
}

/// Upstream repository at `<root>/remotes/acme/widgets` with one base commit.
struct Fixture {
    _tmp: tempfile::TempDir,
    upstream: PathBuf,
    workdir: PathBuf,
    remote_base: String,
    base_sha: String,
}

impl Fixture {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        let upstream = root.join("remotes/acme/widgets");
        std::fs::create_dir_all(&upstream).unwrap();
        run_git(&upstream, &["init", "-q"]);
        run_git(&upstream, &["config", "user.email", "testselect@example.com"]);
        run_git(&upstream, &["config", "user.name", "Testselect"]);
        run_git(&upstream, &["config", "uploadpack.allowAnySHA1InWant", "true"]);

        write_file(&upstream.join("README.md"), "widgets\n");
        write_file(&upstream.join("pkg/widget/widget.go"), "package widget\n");
        write_file(&upstream.join("shared.txt"), "line one\n");
        let base_sha = commit_all(&upstream, "base");
        run_git(&upstream, &["branch", "-q", "base"]);

        Self {
            _tmp: tmp,
            remote_base: root.join("remotes").to_string_lossy().to_string(),
            workdir: root.join("work"),
            upstream,
            base_sha,
        }
    }

    /// Commits on a fresh branch starting at `from` and returns the tip SHA.
    fn branch_commit(&self, branch: &str, from: &str, files: &[(&str, &str)]) -> String {
        run_git(&self.upstream, &["checkout", "-q", "-b", branch, from]);
        for (rel, contents) in files {
            write_file(&self.upstream.join(rel), contents);
        }
        commit_all(&self.upstream, branch)
    }

    fn provider(&self) -> GitCliProvider {
        GitCliProvider::with_git(git_executable(), &self.workdir, self.remote_base.clone())
    }
}

fn widgets() -> RepoRef {
    RepoRef::new("acme", "widgets")
}

fn sorted(mut paths: Vec<String>) -> Vec<String> {
    paths.sort();
    paths
}

#[test]
fn fast_forward_candidate_reports_its_changes() {
    let fx = Fixture::new();
    let head = fx.branch_commit(
        "pr",
        &fx.base_sha,
        &[
            ("pkg/widget/widget.go", "package widget\n\nfunc New() {}\n"),
            ("docs/new.md", "# new\n"),
        ],
    );

    let mut provider = fx.provider();
    let paths = resolve_changed_paths(&mut provider, &widgets(), &fx.base_sha, &head).unwrap();

    assert_eq!(
        sorted(paths),
        vec!["docs/new.md".to_string(), "pkg/widget/widget.go".to_string()]
    );
    assert!(provider.repo_dir(&widgets()).join(".git").exists());
}

#[test]
fn merged_diff_ignores_changes_only_on_the_base_side() {
    let fx = Fixture::new();
    let head = fx.branch_commit(
        "pr",
        &fx.base_sha,
        &[("pkg/widget/extra.go", "package widget\n")],
    );
    let advanced_base =
        fx.branch_commit("main-next", &fx.base_sha, &[("README.md", "widgets v2\n")]);

    let mut provider = fx.provider();
    let paths =
        resolve_changed_paths(&mut provider, &widgets(), &advanced_base, &head).unwrap();

    assert_eq!(paths, vec!["pkg/widget/extra.go".to_string()]);
}

#[test]
fn conflicting_candidate_fails_at_merge() {
    let fx = Fixture::new();
    let head =
        fx.branch_commit("pr", &fx.base_sha, &[("shared.txt", "pull request edit\n")]);
    let advanced_base =
        fx.branch_commit("main-next", &fx.base_sha, &[("shared.txt", "base edit\n")]);

    let mut provider = fx.provider();
    let err =
        resolve_changed_paths(&mut provider, &widgets(), &advanced_base, &head).unwrap_err();

    assert_eq!(err.step, DiffStep::Merge);
    assert!(
        matches!(err.source, VcsError::CommandFailed { .. }),
        "{}",
        err.source
    );
}

#[test]
fn unknown_base_fails_at_checkout() {
    let fx = Fixture::new();
    let head = fx.branch_commit("pr", &fx.base_sha, &[("a.txt", "a\n")]);

    let mut provider = fx.provider();
    let err = resolve_changed_paths(
        &mut provider,
        &widgets(),
        "0123456789012345678901234567890123456789",
        &head,
    )
    .unwrap_err();

    assert_eq!(err.step, DiffStep::Checkout);
}

#[test]
fn missing_repository_fails_at_clone() {
    let fx = Fixture::new();
    let mut provider = fx.provider();
    let err = resolve_changed_paths(
        &mut provider,
        &RepoRef::new("acme", "does-not-exist"),
        &fx.base_sha,
        &fx.base_sha,
    )
    .unwrap_err();

    assert_eq!(err.step, DiffStep::Clone);
}

#[test]
fn clone_uri_overrides_remote_base() {
    let fx = Fixture::new();
    let head = fx.branch_commit("pr", &fx.base_sha, &[("cmd/main.go", "package main\n")]);
    let repo = RepoRef {
        org: "mirror".to_string(),
        repo: "widgets".to_string(),
        clone_uri: Some(fx.upstream.to_string_lossy().to_string()),
    };

    let mut provider = fx.provider();
    assert_eq!(
        provider.clone_url(&repo),
        fx.upstream.to_string_lossy().to_string()
    );
    let paths = resolve_changed_paths(&mut provider, &repo, &fx.base_sha, &head).unwrap();

    assert_eq!(paths, vec!["cmd/main.go".to_string()]);
    assert!(fx.workdir.join("mirror/widgets/cmd/main.go").exists());
}

#[test]
fn diff_name_only_reports_deletions() {
    let fx = Fixture::new();
    run_git(&fx.upstream, &["checkout", "-q", "-b", "pr", &fx.base_sha]);
    std::fs::remove_file(fx.upstream.join("README.md")).unwrap();
    let head = commit_all(&fx.upstream, "drop readme");

    let mut provider = fx.provider();
    let paths = resolve_changed_paths(&mut provider, &widgets(), &fx.base_sha, &head).unwrap();
    assert_eq!(paths, vec!["README.md".to_string()]);

    // Re-diffing the already merged clone is stable.
    let again = provider.diff_name_only(&widgets(), &fx.base_sha).unwrap();
    assert_eq!(again, vec!["README.md".to_string()]);
}

#[test]
fn rename_reports_only_the_new_path() {
    let fx = Fixture::new();
    run_git(&fx.upstream, &["checkout", "-q", "-b", "pr", &fx.base_sha]);
    run_git(&fx.upstream, &["mv", "pkg/widget/widget.go", "moved.go"]);
    let head = commit_all(&fx.upstream, "move widget");

    let mut provider = fx.provider();
    let paths = resolve_changed_paths(&mut provider, &widgets(), &fx.base_sha, &head).unwrap();

    assert_eq!(paths, vec!["moved.go".to_string()]);
}

#[test]
fn option_like_revision_is_refused_before_running_git() {
    let fx = Fixture::new();
    let mut provider = fx.provider();
    provider.clone_repo(&widgets()).unwrap();

    let marker = fx.workdir.join("pwned");
    let revision = format!("--upload-pack=touch {}", marker.display());
    for result in [
        provider.checkout(&widgets(), &revision),
        provider.fetch(&widgets(), &revision),
        provider.merge(&widgets(), &revision),
        provider.diff_name_only(&widgets(), &revision).map(|_| ()),
    ] {
        assert!(
            matches!(result, Err(VcsError::InvalidRevision(ref r)) if *r == revision),
            "{result:?}"
        );
    }
    assert!(!marker.exists());
}

#[test]
fn default_clone_url_joins_remote_base() {
    let provider = GitCliProvider::with_git("git", "/work", "https://github.com/");
    assert_eq!(
        provider.clone_url(&RepoRef::new("openshift-knative", "serving")),
        "https://github.com/openshift-knative/serving"
    );
    assert_eq!(
        provider.repo_dir(&RepoRef::new("openshift-knative", "serving")),
        PathBuf::from("/work/openshift-knative/serving")
    );
}
