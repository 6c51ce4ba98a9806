use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SelectError;

/// Mapping between changed-path regular expressions and the test suites that cover them.
///
/// Parsing is strict: any field outside the schema is rejected rather than ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestSuites {
    #[serde(rename = "testsuites", default)]
    pub list: Vec<TestSuite>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestSuite {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub run_if_changed: Vec<String>,

    #[serde(default)]
    pub tests: Vec<Test>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Test {
    pub name: String,

    /// Carried through to consumers; selection does not look at it.
    #[serde(default)]
    pub upstream: bool,
}

impl TestSuite {
    /// A suite without path patterns rides along with every non-empty reduced plan.
    pub fn is_unconditional(&self) -> bool {
        self.run_if_changed.is_empty()
    }

    pub fn test_names(&self) -> impl Iterator<Item = &str> {
        self.tests.iter().map(|test| test.name.as_str())
    }
}

impl TestSuites {
    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str::<TestSuites>(raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<TestSuites>(raw)
    }

    pub fn unconditional(&self) -> impl Iterator<Item = &TestSuite> {
        self.list.iter().filter(|suite| suite.is_unconditional())
    }
}

/// Loads the suite mapping, dispatching on the file extension: `.json` is read as JSON and
/// anything else as YAML.
pub fn load_test_suites(path: &Path) -> Result<TestSuites, SelectError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SelectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let ext = path
        .extension()
        .and_then(|x| x.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "json" => TestSuites::from_json_str(&raw).map_err(|err| err.to_string()),
        _ => TestSuites::from_yaml_str(&raw).map_err(|err| err.to_string()),
    };
    let suites = parsed.map_err(|message| SelectError::ConfigParse {
        path: path.to_path_buf(),
        message,
    })?;

    tracing::debug!(
        path = %path.display(),
        suites = suites.list.len(),
        "loaded test suites"
    );
    Ok(suites)
}
