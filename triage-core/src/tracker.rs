// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publishing failures to an issue tracker.
//!
//! Each failure is matched against existing issues by its rendered summary. If an open issue
//! with exactly that summary exists, the failure's description is added to it as a comment.
//! Otherwise a new issue is filed.

use crate::{
    errors::{PublishError, PublishErrors, RenderFailure, TrackerError},
    failure::FailureRecord,
    render::TemplateRenderer,
};

mod jira;

pub use jira::JiraTracker;

/// An issue in a tracker.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Issue {
    /// The tracker's internal identifier.
    pub id: String,

    /// The human-readable key, e.g. `ROX-1234`.
    pub key: String,

    /// The summary (title) of the issue.
    pub summary: String,
}

/// An issue tracker failures can be filed in.
pub trait IssueTracker {
    /// Returns open issues whose summary matches `summary`.
    ///
    /// The match may be fuzzy: callers filter for exact matches.
    fn search(&self, summary: &str) -> Result<Vec<Issue>, TrackerError>;

    /// Files a new issue.
    fn create_issue(&self, summary: &str, description: &str) -> Result<Issue, TrackerError>;

    /// Adds a comment to an existing issue.
    fn add_comment(&self, issue: &Issue, body: &str) -> Result<(), TrackerError>;
}

/// A failure along with how it was published.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportedFailure {
    /// The failure.
    pub record: FailureRecord,

    /// The rendered summary.
    pub summary: String,

    /// The key of the issue the failure was filed under, if any.
    pub issue_key: Option<String>,
}

impl ReportedFailure {
    /// Renders the summary of a failure that is not published to any tracker.
    pub fn unpublished(
        record: FailureRecord,
        renderer: &TemplateRenderer,
    ) -> Result<Self, RenderFailure> {
        let summary = renderer.summary(&record)?;
        Ok(Self {
            record,
            summary,
            issue_key: None,
        })
    }
}

/// The result of publishing a batch of failures.
#[derive(Debug, Default)]
pub struct PublishOutcome {
    /// Failures that were published, in input order.
    pub reported: Vec<ReportedFailure>,

    /// Failures that could not be published, in input order.
    pub errors: Vec<PublishError>,
}

impl PublishOutcome {
    /// Returns an error if any failure could not be published.
    pub fn check(&mut self) -> Result<(), PublishErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(PublishErrors {
                errors: std::mem::take(&mut self.errors),
            })
        }
    }
}

/// Files failures in an issue tracker.
pub struct Publisher<'a> {
    tracker: &'a dyn IssueTracker,
    renderer: &'a TemplateRenderer,
    dry_run: bool,
}

impl<'a> Publisher<'a> {
    /// Creates a publisher.
    ///
    /// In dry-run mode, the tracker is searched but never written to.
    pub fn new(tracker: &'a dyn IssueTracker, renderer: &'a TemplateRenderer, dry_run: bool) -> Self {
        Self {
            tracker,
            renderer,
            dry_run,
        }
    }

    /// Publishes every failure, continuing past errors.
    pub fn publish_failures(&self, failures: Vec<FailureRecord>) -> PublishOutcome {
        let mut outcome = PublishOutcome::default();
        for record in failures {
            match self.publish_one(&record) {
                Ok((summary, issue_key)) => outcome.reported.push(ReportedFailure {
                    record,
                    summary,
                    issue_key,
                }),
                Err(error) => {
                    tracing::warn!("{}", crate::errors::DisplayErrorChain::new(&error));
                    outcome.errors.push(error);
                }
            }
        }
        outcome
    }

    fn publish_one(&self, record: &FailureRecord) -> Result<(String, Option<String>), PublishError> {
        let summary = self.renderer.summary(record)?;
        let description = self.renderer.description(record)?;

        tracing::debug!("searching for `{summary}`");
        let issues = self
            .tracker
            .search(&summary)
            .map_err(|error| PublishError::Search {
                summary: summary.clone(),
                error,
            })?;

        match issues.into_iter().find(|issue| issue.summary == summary) {
            Some(issue) => {
                if self.dry_run {
                    tracing::info!(
                        "dry run: would comment on {}: {summary}\n{description}",
                        issue.key,
                    );
                } else {
                    self.tracker
                        .add_comment(&issue, &description)
                        .map_err(|error| PublishError::Comment {
                            key: issue.key.clone(),
                            summary: summary.clone(),
                            error,
                        })?;
                    tracing::info!("commented on {}: {summary}", issue.key);
                }
                Ok((summary, Some(issue.key)))
            }
            None => {
                if self.dry_run {
                    tracing::info!("dry run: would create issue: {summary}\n{description}");
                    Ok((summary, None))
                } else {
                    let issue = self
                        .tracker
                        .create_issue(&summary, &description)
                        .map_err(|error| PublishError::Create {
                            summary: summary.clone(),
                            error,
                        })?;
                    tracing::info!("created {}: {summary}", issue.key);
                    Ok((summary, Some(issue.key)))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TruncationLimits;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    #[derive(Debug, Eq, PartialEq)]
    enum Call {
        Search(String),
        Create(String),
        Comment(String),
    }

    #[derive(Default)]
    struct FakeTracker {
        existing: Vec<Issue>,
        fail_search_for: Option<String>,
        calls: RefCell<Vec<Call>>,
    }

    impl IssueTracker for FakeTracker {
        fn search(&self, summary: &str) -> Result<Vec<Issue>, TrackerError> {
            self.calls.borrow_mut().push(Call::Search(summary.to_owned()));
            if self.fail_search_for.as_deref() == Some(summary) {
                return Err(TrackerError::Response {
                    url: "https://jira.example/search".to_owned(),
                    error: "server error".into(),
                });
            }
            // Mimic a fuzzy text search.
            Ok(self
                .existing
                .iter()
                .filter(|issue| issue.summary.contains(summary) || summary.contains(&issue.summary))
                .cloned()
                .collect())
        }

        fn create_issue(&self, summary: &str, _description: &str) -> Result<Issue, TrackerError> {
            self.calls.borrow_mut().push(Call::Create(summary.to_owned()));
            Ok(Issue {
                id: "2".to_owned(),
                key: "ROX-2".to_owned(),
                summary: summary.to_owned(),
            })
        }

        fn add_comment(&self, issue: &Issue, _body: &str) -> Result<(), TrackerError> {
            self.calls.borrow_mut().push(Call::Comment(issue.key.clone()));
            Ok(())
        }
    }

    fn failure(name: &str) -> FailureRecord {
        FailureRecord {
            name: name.to_owned(),
            suite: "pkg".to_owned(),
            ..FailureRecord::default()
        }
    }

    fn renderer() -> TemplateRenderer {
        TemplateRenderer::with_default_templates(TruncationLimits::default())
            .expect("default templates are valid")
    }

    fn existing() -> Vec<Issue> {
        vec![
            Issue {
                id: "0".to_owned(),
                key: "ROX-0".to_owned(),
                summary: "pkg / Foo FAILED again".to_owned(),
            },
            Issue {
                id: "1".to_owned(),
                key: "ROX-1".to_owned(),
                summary: "pkg / Foo FAILED".to_owned(),
            },
        ]
    }

    #[test]
    fn comments_on_exact_match_and_creates_otherwise() {
        let tracker = FakeTracker {
            existing: existing(),
            ..Default::default()
        };
        let renderer = renderer();
        let mut outcome =
            Publisher::new(&tracker, &renderer, false).publish_failures(vec![failure("Foo"), failure("Bar")]);

        outcome.check().expect("no errors");
        assert_eq!(
            tracker.calls.into_inner(),
            [
                Call::Search("pkg / Foo FAILED".to_owned()),
                Call::Comment("ROX-1".to_owned()),
                Call::Search("pkg / Bar FAILED".to_owned()),
                Call::Create("pkg / Bar FAILED".to_owned()),
            ]
        );
        let keys: Vec<_> = outcome.reported.iter().map(|r| r.issue_key.as_deref()).collect();
        assert_eq!(keys, [Some("ROX-1"), Some("ROX-2")]);
    }

    #[test]
    fn dry_run_only_searches() {
        let tracker = FakeTracker {
            existing: existing(),
            ..Default::default()
        };
        let renderer = renderer();
        let mut outcome =
            Publisher::new(&tracker, &renderer, true).publish_failures(vec![failure("Foo"), failure("Bar")]);

        outcome.check().expect("no errors");
        assert_eq!(
            tracker.calls.into_inner(),
            [
                Call::Search("pkg / Foo FAILED".to_owned()),
                Call::Search("pkg / Bar FAILED".to_owned()),
            ]
        );
        let keys: Vec<_> = outcome.reported.iter().map(|r| r.issue_key.as_deref()).collect();
        assert_eq!(keys, [Some("ROX-1"), None]);
    }

    #[test]
    fn errors_are_collected() {
        let tracker = FakeTracker {
            fail_search_for: Some("pkg / Foo FAILED".to_owned()),
            ..Default::default()
        };
        let renderer = renderer();
        let mut outcome = Publisher::new(&tracker, &renderer, false).publish_failures(vec![
            failure("Foo"),
            failure("Bar"),
        ]);

        assert_eq!(outcome.reported.len(), 1);
        assert_eq!(outcome.reported[0].summary, "pkg / Bar FAILED");
        let errors = outcome.check().expect_err("search failed");
        assert_eq!(errors.errors.len(), 1);
        assert!(
            matches!(&errors.errors[0], PublishError::Search { summary, .. } if summary == "pkg / Foo FAILED"),
            "{errors:?}"
        );
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn unpublished_has_no_issue() {
        let reported =
            ReportedFailure::unpublished(failure("Foo"), &renderer()).expect("summary rendered");
        assert_eq!(reported.summary, "pkg / Foo FAILED");
        assert_eq!(reported.issue_key, None);
    }
}
