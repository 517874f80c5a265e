// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flattened per-test outcomes read from JUnit reports.

use junit_ingest::{IngestedReport, Outcome, Report, TestCase};
use std::{fmt, time::Duration};

/// The outcome of a single test case.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TestStatus {
    /// The test passed.
    Passed,

    /// The test was not run.
    Skipped,

    /// The test failed an assertion.
    Failed,

    /// The test errored out.
    Error,
}

impl TestStatus {
    /// Returns true if this status should be triaged as a failure.
    pub fn is_failure(self) -> bool {
        matches!(self, TestStatus::Failed | TestStatus::Error)
    }

    /// Returns the lowercase name of this status, as used in exports.
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Skipped => "skipped",
            TestStatus::Failed => "failed",
            TestStatus::Error => "error",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured error attached to a failing test.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorDetail {
    /// The `message` attribute of the failure element.
    pub message: String,

    /// The `type` attribute of the failure element.
    pub ty: String,

    /// The text body of the failure element, typically a stack trace.
    pub body: String,
}

impl ErrorDetail {
    /// Returns the textual rendering of this error.
    pub fn text(&self) -> &str {
        &self.body
    }
}

/// One reported outcome for a single test case.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestRunRecord {
    /// The test name, possibly hierarchical (`Parent/child`).
    pub name: String,

    /// The namespace the test belongs to, such as a package or suite path.
    pub classname: String,

    /// The outcome.
    pub status: TestStatus,

    /// The failure or skip message, if any.
    pub message: String,

    /// Captured standard output.
    pub system_out: String,

    /// Captured standard error.
    pub system_err: String,

    /// Structured error details, present for failed and errored tests.
    pub error: Option<ErrorDetail>,

    /// Wall time taken by the test.
    pub duration: Duration,
}

impl TestRunRecord {
    /// Creates a record with empty text fields and zero duration.
    pub fn new(name: impl Into<String>, classname: impl Into<String>, status: TestStatus) -> Self {
        Self {
            name: name.into(),
            classname: classname.into(),
            status,
            message: String::new(),
            system_out: String::new(),
            system_err: String::new(),
            error: None,
            duration: Duration::ZERO,
        }
    }

    /// Converts a JUnit test case into a record.
    pub fn from_test_case(test_case: &TestCase) -> Self {
        let status = match &test_case.outcome {
            Outcome::Passed => TestStatus::Passed,
            Outcome::Skipped(_) => TestStatus::Skipped,
            Outcome::Failed(_) => TestStatus::Failed,
            Outcome::Errored(_) => TestStatus::Error,
        };
        let detail = test_case.outcome.detail();
        let error = detail
            .filter(|_| status.is_failure())
            .map(|detail| ErrorDetail {
                message: detail.message.clone().unwrap_or_default(),
                ty: detail.ty.clone().unwrap_or_default(),
                body: detail.text.clone().unwrap_or_default(),
            });

        Self {
            name: test_case.name.clone(),
            classname: test_case.classname.clone(),
            status,
            message: detail
                .and_then(|detail| detail.message.clone())
                .unwrap_or_default(),
            system_out: test_case.system_out.clone().unwrap_or_default(),
            system_err: test_case.system_err.clone().unwrap_or_default(),
            error,
            duration: test_case.time.unwrap_or_default(),
        }
    }

    /// Flattens every test case of a report, in document order.
    pub fn from_report(report: &Report) -> impl Iterator<Item = Self> + '_ {
        report
            .test_cases()
            .map(|(_, test_case)| Self::from_test_case(test_case))
    }

    /// Flattens every test case of several reports, in ingestion order.
    pub fn from_reports(reports: &[IngestedReport]) -> Vec<Self> {
        reports
            .iter()
            .flat_map(|ingested| Self::from_report(&ingested.report))
            .collect()
    }

    /// Sets the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets captured standard output.
    pub fn with_system_out(mut self, system_out: impl Into<String>) -> Self {
        self.system_out = system_out.into();
        self
    }

    /// Sets captured standard error.
    pub fn with_system_err(mut self, system_err: impl Into<String>) -> Self {
        self.system_err = system_err.into();
        self
    }

    /// Sets the error body, creating the error detail if necessary.
    pub fn with_error_body(mut self, body: impl Into<String>) -> Self {
        self.error.get_or_insert_with(ErrorDetail::default).body = body.into();
        self
    }

    /// Sets the duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Returns the textual rendering of the error, or an empty string.
    pub fn error_text(&self) -> &str {
        self.error.as_ref().map_or("", ErrorDetail::text)
    }
}
