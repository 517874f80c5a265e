// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collapses large numbers of failures into a single composite failure.

use crate::{
    environment::EnvironmentSnapshot, errors::RenderFailure, failure::FailureRecord,
    render::TemplateRenderer,
};
use serde::Deserialize;

/// The suite given to a composite record when the merged records disagree on their suite.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuiteFallback {
    /// Use the job name of the environment.
    #[default]
    JobName,

    /// Leave the suite empty.
    Empty,
}

/// Merges failures once there are more than a threshold of them.
#[derive(Debug)]
pub struct FailureAggregator<'a> {
    renderer: &'a TemplateRenderer,
    env: &'a EnvironmentSnapshot,
    threshold: usize,
    fallback: SuiteFallback,
}

impl<'a> FailureAggregator<'a> {
    /// Creates an aggregator.
    ///
    /// A threshold of 0 disables merging.
    pub fn new(
        renderer: &'a TemplateRenderer,
        env: &'a EnvironmentSnapshot,
        threshold: usize,
        fallback: SuiteFallback,
    ) -> Self {
        Self {
            renderer,
            env,
            threshold,
            fallback,
        }
    }

    /// Returns `failures` unchanged if merging is disabled or there are at most `threshold` of
    /// them, and otherwise a single composite record.
    ///
    /// The composite's message lists the summary of every merged record, each followed by a
    /// newline. Its suite is the suite shared by all merged records, or the fallback if they
    /// differ.
    pub fn aggregate(
        &self,
        failures: Vec<FailureRecord>,
    ) -> Result<Vec<FailureRecord>, RenderFailure> {
        if self.threshold == 0 || failures.len() <= self.threshold {
            return Ok(failures);
        }

        let mut message = String::new();
        let mut suite: Option<&str> = None;
        let mut suites_differ = false;
        for failure in &failures {
            message.push_str(&self.renderer.summary(failure)?);
            message.push('\n');
            match suite {
                None => suite = Some(&failure.suite),
                Some(s) if s != failure.suite => suites_differ = true,
                Some(_) => {}
            }
        }

        let suite = if suites_differ {
            match self.fallback {
                SuiteFallback::JobName => self.env.job_name.as_str(),
                SuiteFallback::Empty => "",
            }
        } else {
            suite.unwrap_or_default()
        };

        tracing::info!(
            "{} failures exceed the threshold of {}, merging them into one",
            failures.len(),
            self.threshold,
        );
        Ok(vec![FailureRecord::composite(suite, message, self.env)])
    }
}
