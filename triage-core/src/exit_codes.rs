// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `junit-triage` failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum TriageExitCode {}

impl TriageExitCode {
    /// No errors occurred and junit-triage exited normally.
    pub const OK: i32 = 0;

    /// A user issue happened while setting up a junit-triage invocation, such as an invalid
    /// config file or template.
    pub const SETUP_ERROR: i32 = 96;

    /// Reading JUnit reports produced an error.
    pub const INGEST_FAILED: i32 = 104;

    /// One or more failures could not be published to the issue tracker.
    pub const PUBLISH_FAILED: i32 = 105;

    /// Writing an export or data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
