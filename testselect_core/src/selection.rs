//! Maps changed paths onto the configured suites.
//!
//! Every path is checked against every `run_if_changed` pattern of every suite; matching
//! suites contribute all of their tests. One path that no pattern recognizes means the
//! mapping is incomplete for this change, and the whole plan collapses to [`ALL`].

use std::collections::BTreeSet;

use regex::Regex;

use crate::error::SelectError;
use crate::suites::TestSuites;

/// Output token telling the consumer to run every test.
pub const ALL: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestPlan {
    All,
    /// Sorted and deduplicated. May be empty when the change needs no tests.
    Reduced(Vec<String>),
}

impl TestPlan {
    pub fn is_all(&self) -> bool {
        matches!(self, TestPlan::All)
    }

    /// Test names as written to the output sink.
    pub fn lines(&self) -> Vec<String> {
        match self {
            TestPlan::All => vec![ALL.to_string()],
            TestPlan::Reduced(names) => names.clone(),
        }
    }
}

struct CompiledPattern<'a> {
    suite_index: usize,
    regex: Regex,
    source: &'a str,
}

fn compile_patterns(suites: &TestSuites) -> Result<Vec<CompiledPattern<'_>>, SelectError> {
    suites
        .list
        .iter()
        .enumerate()
        .flat_map(|(suite_index, suite)| {
            suite
                .run_if_changed
                .iter()
                .map(move |pattern| (suite_index, suite, pattern))
        })
        .map(|(suite_index, suite, pattern)| {
            Regex::new(pattern)
                .map(|regex| CompiledPattern {
                    suite_index,
                    regex,
                    source: pattern.as_str(),
                })
                .map_err(|err| SelectError::Pattern {
                    suite: suite.name.clone(),
                    pattern: pattern.clone(),
                    message: err.to_string(),
                })
        })
        .collect()
}

pub fn select<S: AsRef<str>>(
    suites: &TestSuites,
    changed_paths: &[S],
) -> Result<TestPlan, SelectError> {
    if changed_paths.is_empty() {
        return Ok(TestPlan::Reduced(vec![]));
    }
    let patterns = compile_patterns(suites)?;

    let mut tests_to_run: BTreeSet<&str> = BTreeSet::new();
    for path in changed_paths {
        let path: &str = path.as_ref();
        let mut matched_any = false;
        for pattern in patterns.iter().filter(|p| p.regex.is_match(path)) {
            matched_any = true;
            let suite = &suites.list[pattern.suite_index];
            tracing::debug!(path, suite = %suite.name, pattern = pattern.source, "path matched");
            tests_to_run.extend(suite.test_names());
        }
        if !matched_any {
            tracing::info!(path, "path not covered by any suite, selecting all tests");
            return Ok(TestPlan::All);
        }
    }

    // Unconditional suites only join a plan that already has something to run.
    if !tests_to_run.is_empty() {
        suites
            .unconditional()
            .for_each(|suite| tests_to_run.extend(suite.test_names()));
    }

    Ok(TestPlan::Reduced(
        tests_to_run.into_iter().map(str::to_string).collect(),
    ))
}
