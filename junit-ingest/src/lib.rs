// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read JUnit reports produced by CI test runners.
//!
//! The data model follows the de facto JUnit XML schema: a [`Report`] holds
//! [`TestSuite`]s, which hold [`TestCase`]s. Reports are read with
//! [`Report::deserialize`] or in bulk from a file or directory with
//! [`ingest_path`].

#![warn(missing_docs)]

mod deserialize;
mod errors;
mod ingest;
mod report;

pub use errors::*;
pub use ingest::*;
pub use report::*;
