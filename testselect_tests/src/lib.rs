//! Shared fixtures for the cross-crate tests: throwaway upstream repositories laid out the
//! way the CLI expects to clone them.

use std::path::{Path, PathBuf};
use std::process::Command;

pub fn git_executable() -> PathBuf {
    which::which("git").unwrap_or_else(|_| PathBuf::from("git"))
}

pub fn run_git(repo: &Path, args: &[&str]) {
    let status = Command::new(git_executable())
        .current_dir(repo)
        .args(args)
        .status();
    assert!(status.is_ok_and(|s| s.success()), "git {args:?} failed");
}

pub fn git_stdout(repo: &Path, args: &[&str]) -> String {
    let out = Command::new(git_executable())
        .current_dir(repo)
        .args(args)
        .output()
        .unwrap();
    assert!(out.status.success(), "git {args:?} failed");
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

pub fn write_file(path: &Path, contents: &str) {
    let parent = path.parent().unwrap();
    std::fs::create_dir_all(parent).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// A scratch root holding `remotes/<org>/<repo>` (the upstream) and `work/` (where the
/// tool clones), plus the input and output files of one run.
pub struct Workspace {
    _tmp: tempfile::TempDir,
    pub root: PathBuf,
    pub org: String,
    pub repo: String,
}

impl Workspace {
    pub fn new(org: &str, repo: &str) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        let upstream = root.join("remotes").join(org).join(repo);
        std::fs::create_dir_all(&upstream).unwrap();
        run_git(&upstream, &["init", "-q"]);
        run_git(&upstream, &["config", "user.email", "testselect@example.com"]);
        run_git(&upstream, &["config", "user.name", "Testselect"]);
        run_git(&upstream, &["config", "uploadpack.allowAnySHA1InWant", "true"]);
        Self {
            _tmp: tmp,
            root,
            org: org.to_string(),
            repo: repo.to_string(),
        }
    }

    pub fn upstream(&self) -> PathBuf {
        self.root.join("remotes").join(&self.org).join(&self.repo)
    }

    pub fn remote_base(&self) -> String {
        self.root.join("remotes").to_string_lossy().to_string()
    }

    pub fn workdir(&self) -> PathBuf {
        self.root.join("work")
    }

    pub fn testsuites_path(&self) -> PathBuf {
        self.root.join("testsuites.yaml")
    }

    pub fn clonerefs_path(&self) -> PathBuf {
        self.root.join("clonerefs.json")
    }

    pub fn output_path(&self) -> PathBuf {
        self.root.join("artifacts/tests.txt")
    }

    /// Commits `files` on a new branch forked from `from`, or as the root commit when `from`
    /// is `None`, and returns the new tip.
    pub fn commit(&self, branch: &str, from: Option<&str>, files: &[(&str, &str)]) -> String {
        let upstream = self.upstream();
        match from {
            Some(sha) => run_git(&upstream, &["checkout", "-q", "-b", branch, sha]),
            None => {
                let head_ref = format!("refs/heads/{branch}");
                run_git(&upstream, &["symbolic-ref", "HEAD", head_ref.as_str()]);
            }
        }
        for (rel, contents) in files {
            write_file(&upstream.join(rel), contents);
        }
        run_git(&upstream, &["add", "-A"]);
        run_git(&upstream, &["commit", "-q", "-m", branch]);
        git_stdout(&upstream, &["rev-parse", "HEAD"])
    }

    pub fn write_testsuites(&self, yaml: &str) {
        write_file(&self.testsuites_path(), yaml);
    }

    pub fn write_clonerefs(&self, json: &str) {
        write_file(&self.clonerefs_path(), json);
    }

    pub fn read_output(&self) -> String {
        std::fs::read_to_string(self.output_path()).unwrap()
    }

    /// Command-line arguments pointing the tool at this workspace.
    pub fn argv(&self) -> Vec<String> {
        vec![
            "testselect".to_string(),
            "--testsuites".to_string(),
            self.testsuites_path().to_string_lossy().to_string(),
            "--clonerefs".to_string(),
            self.clonerefs_path().to_string_lossy().to_string(),
            "--output".to_string(),
            self.output_path().to_string_lossy().to_string(),
            "--workdir".to_string(),
            self.workdir().to_string_lossy().to_string(),
            "--remote-base".to_string(),
            self.remote_base(),
        ]
    }
}
