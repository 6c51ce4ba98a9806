pub mod args;
pub mod diff;
pub mod git;
pub mod output;
pub mod run;
pub mod telemetry;
pub mod vcs;

#[cfg(test)]
mod git_test;
