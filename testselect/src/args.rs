use std::path::PathBuf;

use clap::Parser;

use crate::git::DEFAULT_REMOTE_BASE;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "testselect",
    version = testselect_core::core_version(),
    about = "Writes the list of test suites a change needs to run"
)]
pub struct Args {
    /// YAML (or .json) file with the path-to-testsuite mapping.
    #[arg(long, env = "TESTSELECT_TESTSUITES", default_value = "testsuites.yaml")]
    pub testsuites: PathBuf,

    /// JSON file with Prow clonerefs options describing the base and pull revisions.
    #[arg(long, env = "TESTSELECT_CLONEREFS", default_value = "clonerefs.json")]
    pub clonerefs: PathBuf,

    /// Where the newline-delimited test list is written.
    #[arg(long, env = "TESTSELECT_OUTPUT", default_value = "tests.txt")]
    pub output: PathBuf,

    /// Directory the repository is cloned into, as `<workdir>/<org>/<repo>`.
    #[arg(long, env = "TESTSELECT_WORKDIR", default_value = ".")]
    pub workdir: PathBuf,

    /// Remote prefix used when the refs carry no clone URI.
    #[arg(long, env = "TESTSELECT_REMOTE_BASE", default_value = DEFAULT_REMOTE_BASE)]
    pub remote_base: String,

    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON-formatted log lines.
    #[arg(long)]
    pub json_logs: bool,
}

pub fn parse_args<I, T>(argv: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Args::try_parse_from(argv)
}
