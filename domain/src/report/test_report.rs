//! Test run report model
//!
//! Mirrors the JSON file written by `pytest --json-report`, field for
//! field, so a parsed report can be rewritten to disk unchanged apart from
//! formatting. The aggregation in [`TestReport::list_errors`] is the
//! feedback signal that drives guard repair: collection failures are quoted
//! verbatim, test failures are described by the test's docstring when the
//! collection hook attached one.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// User property key the collection hook stores test docstrings under
pub const DOCSTRING_PROPERTY: &str = "docstring";

/// Outcome of a collector, a test, or one of a test's stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
    Error,
    #[serde(rename = "xfailed")]
    XFailed,
    #[serde(rename = "xpassed")]
    XPassed,
}

impl Outcome {
    /// Failed or errored; skips and expected failures are not failures.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed | Outcome::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<u32>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub collected: u32,
}

/// An item discovered by a collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectedItem {
    pub nodeid: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineno: Option<u32>,
}

/// Test discovery unit (a module, class, or session)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collector {
    pub nodeid: String,
    pub outcome: Outcome,
    #[serde(default)]
    pub result: Vec<CollectedItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longrepr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crash {
    pub path: String,
    pub lineno: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracebackEntry {
    pub path: String,
    pub lineno: u32,
    pub message: String,
}

/// One stage (setup, call or teardown) of a test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallInfo {
    pub duration: f64,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crash: Option<Crash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<Vec<TracebackEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longrepr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub nodeid: String,
    pub lineno: u32,
    pub outcome: Outcome,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<CallInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<CallInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teardown: Option<CallInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_properties: Option<Vec<BTreeMap<String, serde_json::Value>>>,
}

impl TestResult {
    /// Docstring attached by the collection hook, if any.
    pub fn docstring(&self) -> Option<&str> {
        self.user_properties
            .iter()
            .flatten()
            .filter_map(|props| props.get(DOCSTRING_PROPERTY))
            .filter_map(|value| value.as_str())
            .map(str::trim)
            .find(|doc| !doc.is_empty())
    }

    /// Best available description of why this test failed.
    ///
    /// The call stage crash message normally exists for failed tests; setup
    /// errors and crashes without a message fall back to the long
    /// representation and finally to the node id.
    pub fn failure_message(&self) -> String {
        let stages = [&self.call, &self.setup, &self.teardown];

        stages
            .iter()
            .filter_map(|stage| stage.as_ref())
            .filter(|stage| stage.outcome.is_failure())
            .find_map(|stage| {
                stage
                    .crash
                    .as_ref()
                    .map(|crash| crash.message.clone())
                    .or_else(|| stage.longrepr.clone())
            })
            .unwrap_or_else(|| format!("{} failed", self.nodeid))
    }
}

/// A normalized test execution run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub created: f64,
    pub duration: f64,
    pub exitcode: i32,
    pub root: String,
    #[serde(default)]
    pub environment: BTreeMap<String, serde_json::Value>,
    pub summary: Summary,
    #[serde(default)]
    pub collectors: Vec<Collector>,
    #[serde(default)]
    pub tests: Vec<TestResult>,
}

impl TestReport {
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        serde_json::from_str(json).map_err(|e| DomainError::InvalidReport(e.to_string()))
    }

    pub fn to_pretty_json(&self) -> Result<String, DomainError> {
        serde_json::to_string_pretty(self).map_err(|e| DomainError::InvalidReport(e.to_string()))
    }

    pub fn all_tests_passed(&self) -> bool {
        self.tests.iter().all(|t| t.outcome == Outcome::Passed)
    }

    /// No import or syntax error prevented collection.
    pub fn all_tests_collected_successfully(&self) -> bool {
        self.collectors.iter().all(|c| c.outcome == Outcome::Passed)
    }

    /// An empty suite passes trivially and must not count as validation.
    pub fn non_empty_tests(&self) -> bool {
        self.summary.total > 0
    }

    pub fn is_valid(&self) -> bool {
        self.all_tests_collected_successfully() && self.non_empty_tests() && self.all_tests_passed()
    }

    /// Deduplicated, human-readable failure descriptions.
    pub fn list_errors(&self) -> Vec<String> {
        let mut errors = BTreeSet::new();

        for collector in self.collectors.iter().filter(|c| c.outcome.is_failure()) {
            errors.insert(
                collector
                    .longrepr
                    .clone()
                    .unwrap_or_else(|| format!("Collection of {} failed", collector.nodeid)),
            );
        }

        for test in self.tests.iter().filter(|t| t.outcome.is_failure()) {
            let message = test.failure_message();
            let error = match test.docstring() {
                Some(doc) => format!("Test: {doc}\nFailed: {message}"),
                None => message,
            };
            errors.insert(error);
        }

        errors.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(collectors: Vec<Collector>, tests: Vec<TestResult>) -> TestReport {
        TestReport {
            created: 1.0,
            duration: 0.1,
            exitcode: 0,
            root: "/tmp/gen".to_string(),
            environment: BTreeMap::new(),
            summary: Summary {
                passed: None,
                failed: None,
                total: tests.len() as u32,
                collected: tests.len() as u32,
            },
            collectors,
            tests,
        }
    }

    fn collector(outcome: Outcome, longrepr: Option<&str>) -> Collector {
        Collector {
            nodeid: "tests/test_guard_transfer.py".to_string(),
            outcome,
            result: vec![],
            longrepr: longrepr.map(String::from),
        }
    }

    fn stage(outcome: Outcome, crash: Option<&str>) -> CallInfo {
        CallInfo {
            duration: 0.01,
            outcome,
            crash: crash.map(|message| Crash {
                path: "tests/test_guard_transfer.py".to_string(),
                lineno: 12,
                message: message.to_string(),
            }),
            traceback: None,
            longrepr: None,
        }
    }

    fn test(name: &str, outcome: Outcome, crash: Option<&str>, doc: Option<&str>) -> TestResult {
        TestResult {
            nodeid: format!("tests/test_guard_transfer.py::{name}"),
            lineno: 10,
            outcome,
            keywords: vec![name.to_string()],
            setup: Some(stage(Outcome::Passed, None)),
            call: Some(stage(outcome, crash)),
            teardown: Some(stage(Outcome::Passed, None)),
            user_properties: doc.map(|d| {
                vec![BTreeMap::from([(
                    DOCSTRING_PROPERTY.to_string(),
                    serde_json::Value::String(d.to_string()),
                )])]
            }),
        }
    }

    #[test]
    fn test_all_tests_passed() {
        let passing = report(vec![], vec![test("a", Outcome::Passed, None, None)]);
        assert!(passing.all_tests_passed());

        let failing = report(
            vec![],
            vec![
                test("a", Outcome::Passed, None, None),
                test("b", Outcome::Failed, Some("AssertionError"), None),
            ],
        );
        assert!(!failing.all_tests_passed());
    }

    #[test]
    fn test_failed_collector_invalidates_report_without_failing_tests() {
        let r = report(
            vec![collector(Outcome::Failed, Some("SyntaxError: invalid syntax"))],
            vec![],
        );
        assert!(r.all_tests_passed());
        assert!(!r.all_tests_collected_successfully());
        assert!(!r.is_valid());
    }

    #[test]
    fn test_non_empty_tests_guards_vacuous_success() {
        let r = report(vec![collector(Outcome::Passed, None)], vec![]);
        assert!(r.all_tests_passed());
        assert!(r.all_tests_collected_successfully());
        assert!(!r.non_empty_tests());
        assert!(!r.is_valid());
    }

    #[test]
    fn test_list_errors_single_collector() {
        let r = report(
            vec![collector(Outcome::Failed, Some("SyntaxError: invalid syntax"))],
            vec![],
        );
        assert_eq!(r.list_errors(), vec!["SyntaxError: invalid syntax".to_string()]);
    }

    #[test]
    fn test_list_errors_uses_docstring_when_present() {
        let r = report(
            vec![],
            vec![
                test("test_x", Outcome::Failed, Some("assert False"), Some("Test X")),
                test("test_y", Outcome::Failed, Some("KeyError: 'id'"), None),
            ],
        );

        let errors = r.list_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&"Test: Test X\nFailed: assert False".to_string()));
        assert!(errors.contains(&"KeyError: 'id'".to_string()));
    }

    #[test]
    fn test_list_errors_deduplicates_and_is_idempotent() {
        let r = report(
            vec![],
            vec![
                test("test_a", Outcome::Failed, Some("AssertionError"), None),
                test("test_b", Outcome::Failed, Some("AssertionError"), None),
            ],
        );

        let first = r.list_errors();
        assert_eq!(first, vec!["AssertionError".to_string()]);
        assert_eq!(r.list_errors(), first);
    }

    #[test]
    fn test_failure_message_falls_back_to_setup_and_nodeid() {
        let mut setup_error = test("test_fixture", Outcome::Error, None, None);
        setup_error.call = None;
        setup_error.setup = Some(stage(Outcome::Error, Some("fixture 'api' not found")));
        assert_eq!(setup_error.failure_message(), "fixture 'api' not found");

        let mut bare = test("test_bare", Outcome::Failed, None, None);
        bare.call = None;
        bare.setup = None;
        assert_eq!(
            bare.failure_message(),
            "tests/test_guard_transfer.py::test_bare failed"
        );
    }

    #[test]
    fn test_parse_pytest_json_report() {
        let json = r#"{
            "created": 1718000000.5,
            "duration": 0.42,
            "exitcode": 1,
            "root": "/work/gen",
            "environment": {"Python": "3.12.1", "Packages": {"pytest": "8.2.0"}},
            "summary": {"failed": 1, "passed": 1, "total": 2, "collected": 2},
            "collectors": [
                {"nodeid": "", "outcome": "passed", "result": [{"nodeid": "tests", "type": "Package"}]}
            ],
            "tests": [
                {
                    "nodeid": "tests/test_guard_transfer.py::test_ok",
                    "lineno": 4,
                    "outcome": "passed",
                    "keywords": ["test_ok"],
                    "setup": {"duration": 0.001, "outcome": "passed"},
                    "call": {"duration": 0.001, "outcome": "passed"},
                    "teardown": {"duration": 0.001, "outcome": "passed"}
                },
                {
                    "nodeid": "tests/test_guard_transfer.py::test_limit",
                    "lineno": 9,
                    "outcome": "failed",
                    "keywords": ["test_limit"],
                    "setup": {"duration": 0.001, "outcome": "passed"},
                    "call": {
                        "duration": 0.002,
                        "outcome": "failed",
                        "crash": {"path": "/work/gen/tests/test_guard_transfer.py", "lineno": 12, "message": "Failed: DID NOT RAISE"},
                        "traceback": [{"path": "tests/test_guard_transfer.py", "lineno": 12, "message": "Failed"}],
                        "longrepr": "def test_limit(): ..."
                    },
                    "teardown": {"duration": 0.001, "outcome": "passed"},
                    "user_properties": [{"docstring": "Transfers above the limit are rejected"}]
                }
            ]
        }"#;

        let r = TestReport::from_json(json).unwrap();
        assert_eq!(r.summary.total, 2);
        assert!(r.all_tests_collected_successfully());
        assert!(!r.all_tests_passed());
        assert_eq!(
            r.list_errors(),
            vec![
                "Test: Transfers above the limit are rejected\nFailed: Failed: DID NOT RAISE"
                    .to_string()
            ]
        );

        let rewritten = TestReport::from_json(&r.to_pretty_json().unwrap()).unwrap();
        assert_eq!(rewritten, r);
    }

    #[test]
    fn test_from_json_rejects_malformed_report() {
        assert!(matches!(
            TestReport::from_json("{\"created\": 1"),
            Err(DomainError::InvalidReport(_))
        ));
    }
}
