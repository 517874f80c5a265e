// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failure records: the unit of work handed to trackers and notifications.

use crate::{environment::EnvironmentSnapshot, record::TestRunRecord};
use serde::Serialize;

/// One distinct logical failure.
///
/// `(name, suite)` identifies the record. Once a record is created its text fields are only
/// ever appended to, when sub-tests are folded into it.
///
/// Serializing a record yields the data templates are rendered against: every field below is
/// available to a template by name.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct FailureRecord {
    /// The test name. Empty for a composite record.
    pub name: String,

    /// The suite (classname) of the test.
    pub suite: String,

    /// The failure message.
    pub message: String,

    /// Captured standard output.
    pub stdout: String,

    /// Captured standard error.
    pub stderr: String,

    /// The textual rendering of the structured error.
    pub error: String,

    /// The CI build identifier.
    pub build_id: String,

    /// The CI job name.
    pub job_name: String,

    /// The orchestrator the tests ran against.
    pub orchestrator: String,

    /// The tag of the build under test.
    pub build_tag: String,

    /// A link to the source the build was made from.
    pub base_link: String,

    /// A link to the CI build.
    pub build_link: String,
}

impl FailureRecord {
    /// Creates a failure record from a failing test, copying the environment metadata.
    pub fn new(record: &TestRunRecord, env: &EnvironmentSnapshot) -> Self {
        Self {
            name: record.name.clone(),
            suite: record.classname.clone(),
            message: record.message.clone(),
            stdout: record.system_out.clone(),
            stderr: record.system_err.clone(),
            error: record.error_text().to_owned(),
            ..Self::with_environment(env)
        }
    }

    /// Creates a composite record standing in for many failures.
    ///
    /// `message` should already hold the rendered summaries of the records it replaces.
    pub fn composite(
        suite: impl Into<String>,
        message: impl Into<String>,
        env: &EnvironmentSnapshot,
    ) -> Self {
        Self {
            suite: suite.into(),
            message: message.into(),
            ..Self::with_environment(env)
        }
    }

    fn with_environment(env: &EnvironmentSnapshot) -> Self {
        Self {
            build_id: env.build_id.clone(),
            job_name: env.job_name.clone(),
            orchestrator: env.orchestrator.clone(),
            build_tag: env.build_tag.clone(),
            base_link: env.base_link.clone(),
            build_link: env.build_link.clone(),
            ..Self::default()
        }
    }

    /// Appends the output of a failing sub-test to this record.
    ///
    /// Each text field of the sub-test is appended as `"\nSub test <name>: <text>"`. Fields that
    /// are empty in the sub-test are left untouched.
    pub fn fold_subtest(&mut self, subtest: &TestRunRecord) {
        append_subtest(&mut self.message, &subtest.name, &subtest.message);
        append_subtest(&mut self.stdout, &subtest.name, &subtest.system_out);
        append_subtest(&mut self.stderr, &subtest.name, &subtest.system_err);
        append_subtest(&mut self.error, &subtest.name, subtest.error_text());
    }
}

fn append_subtest(field: &mut String, name: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    field.push_str("\nSub test ");
    field.push_str(name);
    field.push_str(": ");
    field.push_str(text);
}
