//! Revision info handed over by the CI system, in the shape of Prow's `clonerefs` options.
//!
//! Only the fields needed to locate the base and candidate revisions are modeled; everything
//! else the CI system writes is ignored.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SelectError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneRefs {
    #[serde(rename = "refs", default)]
    pub git_refs: Vec<Refs>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refs {
    #[serde(default)]
    pub org: String,

    #[serde(default)]
    pub repo: String,

    #[serde(default)]
    pub base_ref: String,

    #[serde(default)]
    pub base_sha: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clone_uri: Option<String>,

    #[serde(default)]
    pub pulls: Vec<Pull>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pull {
    #[serde(default)]
    pub number: u64,

    #[serde(default)]
    pub author: String,

    pub sha: String,
}

/// The single base/candidate pair selection works from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionPair {
    pub org: String,
    pub repo: String,
    pub clone_uri: Option<String>,
    pub base_sha: String,
    pub candidate_sha: String,
}

impl CloneRefs {
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<CloneRefs>(raw)
    }

    /// First ref paired with its first pull, or `None` when there is nothing to diff.
    pub fn revision_pair(&self) -> Option<RevisionPair> {
        let refs = self.git_refs.first()?;
        let pull = refs.pulls.first()?;
        Some(RevisionPair {
            org: refs.org.clone(),
            repo: refs.repo.clone(),
            clone_uri: refs.clone_uri.clone().filter(|uri| !uri.trim().is_empty()),
            base_sha: refs.base_sha.clone(),
            candidate_sha: pull.sha.clone(),
        })
    }
}

pub fn load_clone_refs(path: &Path) -> Result<CloneRefs, SelectError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SelectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    CloneRefs::from_json_str(&raw).map_err(|err| SelectError::RevisionInfoParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}
