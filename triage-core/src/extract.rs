// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extraction of failure records from test outcomes.
//!
//! Hierarchical test names (`Parent/child`) are how some test frameworks, notably Go's, report
//! sub-tests. A failing sub-test usually also fails its parent, so rather than filing one issue
//! per sub-test, the output of a sub-test is folded into the record of its parent when the
//! parent is in a namespace that reports sub-tests that way.

use crate::{environment::EnvironmentSnapshot, failure::FailureRecord, record::TestRunRecord};
use std::collections::HashMap;

/// Decides whether tests in a namespace (classname) report sub-tests hierarchically.
pub trait NamespaceMatcher {
    /// Returns true if failing sub-tests in `classname` should be folded into their parents.
    fn is_match(&self, classname: &str) -> bool;
}

impl<F> NamespaceMatcher for F
where
    F: Fn(&str) -> bool,
{
    fn is_match(&self, classname: &str) -> bool {
        self(classname)
    }
}

/// Matches classnames that start with any of a list of prefixes.
///
/// An empty list matches nothing.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PrefixMatcher {
    prefixes: Vec<String>,
}

impl PrefixMatcher {
    /// Creates a matcher from a list of prefixes.
    pub fn new(prefixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the configured prefixes.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl NamespaceMatcher for PrefixMatcher {
    fn is_match(&self, classname: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| classname.starts_with(prefix.as_str()))
    }
}

/// Turns test outcomes into failure records.
#[derive(Debug)]
pub struct FailureExtractor<'a, M> {
    env: &'a EnvironmentSnapshot,
    matcher: M,
}

impl<'a, M: NamespaceMatcher> FailureExtractor<'a, M> {
    /// Creates an extractor stamping records with `env`.
    pub fn new(env: &'a EnvironmentSnapshot, matcher: M) -> Self {
        Self { env, matcher }
    }

    /// Produces one failure record per distinct logical failure, in input order.
    ///
    /// Passing and skipped records are dropped. A failing sub-test is folded into an earlier
    /// record with the parent's name and the same suite if its classname is matched; otherwise
    /// it becomes a record of its own, named with its full hierarchical name.
    pub fn extract<'r>(
        &self,
        records: impl IntoIterator<Item = &'r TestRunRecord>,
    ) -> Vec<FailureRecord> {
        let mut failures: Vec<FailureRecord> = Vec::new();
        // (name, suite) -> index into `failures`, first record wins.
        let mut index: HashMap<(String, String), usize> = HashMap::new();

        for record in records {
            if !record.status.is_failure() {
                continue;
            }

            if let Some((parent, _)) = record.name.split_once('/') {
                let key = (parent.to_owned(), record.classname.clone());
                if let Some(&i) = index.get(&key)
                    && self.matcher.is_match(&record.classname)
                {
                    tracing::debug!(
                        "folding sub-test `{}` into `{}` ({})",
                        record.name,
                        parent,
                        record.classname,
                    );
                    failures[i].fold_subtest(record);
                    continue;
                }
            }

            index
                .entry((record.name.clone(), record.classname.clone()))
                .or_insert(failures.len());
            failures.push(FailureRecord::new(record, self.env));
        }

        tracing::info!("found {} failures", failures.len());
        failures
    }
}
