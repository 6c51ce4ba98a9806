use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse test suites at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("failed to parse revision info at {path}: {message}")]
    RevisionInfoParse { path: PathBuf, message: String },

    #[error("invalid run_if_changed pattern {pattern:?} in suite {suite:?}: {message}")]
    Pattern {
        suite: String,
        pattern: String,
        message: String,
    },
}
