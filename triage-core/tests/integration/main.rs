// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests over the JUnit reports in `fixtures/reports`.

mod export;
mod fixtures;
mod pipeline;
