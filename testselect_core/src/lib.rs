pub mod error;
pub mod refs;
pub mod selection;
pub mod suites;


pub use error::SelectError;
pub use refs::{CloneRefs, RevisionPair, load_clone_refs};
pub use selection::{ALL, TestPlan, select};
pub use suites::{Test, TestSuite, TestSuites, load_test_suites};

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
