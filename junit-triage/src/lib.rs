// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Files CI test failures from JUnit reports as Jira issues.
//!
//! `junit-triage` reads the JUnit XML reports produced by a CI job, collects the failing tests
//! into a deduplicated set of failures, and files each one in Jira: as a comment on an open
//! issue with the same summary if there is one, or as a new issue otherwise. It can also write
//! a CSV export of every test outcome and a Slack message describing the failures.
//!
//! The engine lives in the `triage-core` crate; this crate is the command-line frontend.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{OutputContext, Styles};
