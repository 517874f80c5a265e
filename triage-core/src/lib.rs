// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core logic for junit-triage.
//!
//! This crate turns the test cases of CI JUnit reports into a deduplicated,
//! bounded set of [`FailureRecord`](failure::FailureRecord)s, each with a
//! stable summary line that downstream issue trackers can match on:
//!
//! 1. [`record`] flattens ingested reports into [`TestRunRecord`](record::TestRunRecord)s.
//! 2. [`extract`] keeps the failing ones and folds sub-tests into their parents.
//! 3. [`aggregate`] collapses everything into one composite failure past a threshold.
//! 4. [`render`] produces the summary and description text for each failure.
//!
//! The remaining modules hand the results to the outside world.

#![warn(missing_docs)]

pub mod aggregate;
pub mod chat;
pub mod config;
pub mod environment;
pub mod errors;
pub mod exit_codes;
pub mod export;
pub mod extract;
pub mod failure;
pub mod html;
pub mod record;
pub mod render;
pub mod sanitize;
pub mod tracker;
