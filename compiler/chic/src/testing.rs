//! The file test runner behind `chi test` and the REPL's `/test`.
//!
//! Each file runs on a freshly reset session. A file passes when its
//! top-level results pass the same rule as a `test` block: only `nil`,
//! definitions and `OK`, with at least one `OK`. Files named `*_ko.chi` are
//! expected to fail and stay out of the counts when they do.

use crate::driver::{chi_files, Driver};
use crate::error::DriverError;
use chi_eval::interpreter::test_passed;
use chi_eval::{LookupMode, Value};
use chi_ir::WellKnownNames;
use std::fmt;
use std::path::{Path, PathBuf};

/// File name suffix of tests that must fail.
pub const EXPECTED_FAILURE_SUFFIX: &str = "_ko.chi";

#[derive(Debug)]
pub enum FileOutcome {
    Passed,
    Failed,
    /// The file did not run to the end.
    Errored(DriverError),
    /// A `*_ko.chi` file failed, as it should.
    ExpectedFailure,
    /// A `*_ko.chi` file passed.
    UnexpectedPass,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TestSummary {
    pub passed: usize,
    pub failed: usize,
    pub expected_failures: usize,
}

impl TestSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Passed => self.passed += 1,
            FileOutcome::Failed | FileOutcome::Errored(_) | FileOutcome::UnexpectedPass => {
                self.failed += 1;
            }
            FileOutcome::ExpectedFailure => self.expected_failures += 1,
        }
    }
}

impl fmt::Display for TestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} OK, {} KO", self.passed, self.failed)
    }
}

/// Apply the test rule to a unit's result.
pub fn unit_passed(result: &Value, names: &WellKnownNames) -> bool {
    match result {
        Value::Program(results) => test_passed(results, names),
        other => test_passed(std::slice::from_ref(other), names),
    }
}

fn expects_failure(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(EXPECTED_FAILURE_SUFFIX))
}

/// Expand directories into their `*.chi` files; files are kept as given.
pub fn collect_test_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, DriverError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(chi_files(path)?);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

/// Run one test file on a freshly reset session.
pub fn run_test_file(driver: &mut Driver, path: &Path) -> FileOutcome {
    driver.reset();
    let passed = match driver.run_file(path) {
        Ok(result) => unit_passed(&result, driver.session().names()),
        Err(error) if expects_failure(path) => {
            tracing::debug!(file = %path.display(), %error, "expected failure");
            false
        }
        Err(error) => return FileOutcome::Errored(error),
    };

    match (passed, expects_failure(path)) {
        (true, false) => FileOutcome::Passed,
        (false, false) => FileOutcome::Failed,
        (false, true) => FileOutcome::ExpectedFailure,
        (true, true) => FileOutcome::UnexpectedPass,
    }
}

/// Run every test file under `paths` in strict mode, report each and print
/// the summary.
#[tracing::instrument(level = "debug", skip_all)]
pub fn run_tests(driver: &mut Driver, paths: &[PathBuf]) -> Result<TestSummary, DriverError> {
    let files = collect_test_files(paths)?;
    if files.is_empty() {
        return Err(DriverError::Usage("no test files found".to_string()));
    }

    let previous_mode = driver.options().mode;
    driver.set_mode(LookupMode::Strict);

    let mut summary = TestSummary::default();
    for file in &files {
        let outcome = run_test_file(driver, file);
        let name = file.display();
        let line = match &outcome {
            FileOutcome::Passed => format!("{name} OK"),
            FileOutcome::Failed => format!("{name} KO"),
            FileOutcome::Errored(error) => format!("{name} KO :: {}: {error}", error.category()),
            FileOutcome::ExpectedFailure => format!("{name} KO (expected)"),
            FileOutcome::UnexpectedPass => format!("{name} OK (expected KO)"),
        };
        driver.output().line(&line);
        summary.record(&outcome);
    }

    driver.set_mode(previous_mode);
    driver.output().line(&summary.to_string());
    tracing::debug!(
        passed = summary.passed,
        failed = summary.failed,
        expected_failures = summary.expected_failures,
        "test run finished"
    );
    Ok(summary)
}
