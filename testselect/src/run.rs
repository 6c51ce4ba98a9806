use std::path::PathBuf;

use thiserror::Error;

use testselect_core::{
    CloneRefs, RevisionPair, SelectError, TestPlan, TestSuites, load_clone_refs,
    load_test_suites, select,
};

use crate::args::Args;
use crate::diff::{DiffAcquisitionError, DiffStep, resolve_changed_paths};
use crate::git::GitCliProvider;
use crate::output::write_test_list;
use crate::vcs::{RepoRef, VcsError, VcsProvider};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    DiffAcquisition(#[from] DiffAcquisitionError),

    #[error("failed to write test list to {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Diffs the pair and maps the changed paths onto the suites.
pub fn plan_for_revision<P: VcsProvider>(
    suites: &TestSuites,
    pair: &RevisionPair,
    provider: &mut P,
) -> Result<TestPlan, RunError> {
    let repo = RepoRef::from(pair);
    let paths = resolve_changed_paths(provider, &repo, &pair.base_sha, &pair.candidate_sha)?;
    Ok(select(suites, &paths)?)
}

/// Without a base/candidate pair there is nothing to diff, so everything runs and the
/// provider is never created. A provider that cannot be built fails the diff at
/// [`DiffStep::Setup`].
pub fn plan_tests<P, F>(
    suites: &TestSuites,
    refs: &CloneRefs,
    make_provider: F,
) -> Result<TestPlan, RunError>
where
    P: VcsProvider,
    F: FnOnce() -> Result<P, VcsError>,
{
    let Some(pair) = refs.revision_pair() else {
        tracing::info!("clone refs do not include required SHAs, selecting all tests");
        return Ok(TestPlan::All);
    };
    let mut provider = make_provider().map_err(|source| {
        let repo = RepoRef::from(&pair);
        tracing::error!(%repo, step = DiffStep::Setup.name(), error = %source, "vcs step failed");
        DiffAcquisitionError {
            step: DiffStep::Setup,
            repo: repo.to_string(),
            source,
        }
    })?;
    plan_for_revision(suites, &pair, &mut provider)
}

pub fn run(args: &Args) -> Result<TestPlan, RunError> {
    tracing::info!(
        testsuites = %args.testsuites.display(),
        clonerefs = %args.clonerefs.display(),
        output = %args.output.display(),
        "starting test selection"
    );

    let refs = load_clone_refs(&args.clonerefs)?;
    let suites = load_test_suites(&args.testsuites)?;

    let plan = plan_tests(&suites, &refs, || {
        GitCliProvider::new(&args.workdir, args.remote_base.clone())
    })?;

    write_test_list(&args.output, &plan).map_err(|source| RunError::OutputWrite {
        path: args.output.clone(),
        source,
    })?;
    tracing::info!(
        output = %args.output.display(),
        tests = ?plan.lines(),
        "wrote test list"
    );
    Ok(plan)
}
