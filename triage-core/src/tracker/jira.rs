// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{Issue, IssueTracker};
use crate::{config::JiraConfig, errors::TrackerError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use ureq::Agent;

/// An [`IssueTracker`] backed by the Jira REST API (version 2).
///
/// Requests authenticate with a personal access token sent as a bearer token.
pub struct JiraTracker {
    agent: Agent,
    base_url: String,
    token: String,
    config: JiraConfig,
}

impl JiraTracker {
    const TIMEOUT: Duration = Duration::from_secs(60);

    /// Creates a client for the instance, project and label described by `config`.
    pub fn new(config: JiraConfig, token: impl Into<String>) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Self::TIMEOUT))
            .build()
            .into();
        Self {
            agent,
            base_url: config.url.trim_end_matches('/').to_owned(),
            token: token.into(),
            config,
        }
    }

    /// Returns the JQL query used to find open issues with `summary`.
    pub fn search_query(&self, summary: &str) -> String {
        format!(
            "project in ({}) AND issuetype = {} AND status != Closed AND labels = {} \
             AND summary ~ {} ORDER BY created DESC",
            self.config.project,
            self.config.issue_type,
            self.config.label,
            quote_jql(summary),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/rest/api/2/{path}", self.base_url)
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl IssueTracker for JiraTracker {
    fn search(&self, summary: &str) -> Result<Vec<Issue>, TrackerError> {
        let url = self.url("search");
        let jql = self.search_query(summary);
        let mut response = self
            .agent
            .get(&url)
            .header("Authorization", &self.authorization())
            .query("jql", &jql)
            .query("fields", "summary")
            .call()
            .map_err(|error| request_error(&url, error))?;
        let results: SearchResults = response
            .body_mut()
            .read_json()
            .map_err(|error| response_error(&url, error))?;

        Ok(results
            .issues
            .into_iter()
            .map(|issue| Issue {
                id: issue.id,
                key: issue.key,
                summary: issue.fields.summary,
            })
            .collect())
    }

    fn create_issue(&self, summary: &str, description: &str) -> Result<Issue, TrackerError> {
        let url = self.url("issue");
        let request = CreateIssueRequest {
            fields: CreateIssueFields {
                project: Key {
                    key: &self.config.project,
                },
                issuetype: Name {
                    name: &self.config.issue_type,
                },
                summary,
                description,
                labels: [&self.config.label],
            },
        };
        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", &self.authorization())
            .send_json(&request)
            .map_err(|error| request_error(&url, error))?;
        let created: CreatedIssue = response
            .body_mut()
            .read_json()
            .map_err(|error| response_error(&url, error))?;

        Ok(Issue {
            id: created.id,
            key: created.key,
            summary: summary.to_owned(),
        })
    }

    fn add_comment(&self, issue: &Issue, body: &str) -> Result<(), TrackerError> {
        let url = self.url(&format!("issue/{}/comment", issue.id));
        self.agent
            .post(&url)
            .header("Authorization", &self.authorization())
            .send_json(&CommentRequest { body })
            .map_err(|error| request_error(&url, error))?;
        Ok(())
    }
}

/// Quotes a string for use in a JQL phrase search.
fn quote_jql(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn request_error(url: &str, error: ureq::Error) -> TrackerError {
    TrackerError::Request {
        url: url.to_owned(),
        error: Box::new(error),
    }
}

fn response_error(url: &str, error: ureq::Error) -> TrackerError {
    TrackerError::Response {
        url: url.to_owned(),
        error: Box::new(error),
    }
}

#[derive(Deserialize)]
struct SearchResults {
    #[serde(default)]
    issues: Vec<SearchIssue>,
}

#[derive(Deserialize)]
struct SearchIssue {
    id: String,
    key: String,
    fields: SearchFields,
}

#[derive(Deserialize)]
struct SearchFields {
    #[serde(default)]
    summary: String,
}

#[derive(Serialize)]
struct CreateIssueRequest<'a> {
    fields: CreateIssueFields<'a>,
}

#[derive(Serialize)]
struct CreateIssueFields<'a> {
    project: Key<'a>,
    issuetype: Name<'a>,
    summary: &'a str,
    description: &'a str,
    labels: [&'a str; 1],
}

#[derive(Serialize)]
struct Key<'a> {
    key: &'a str,
}

#[derive(Serialize)]
struct Name<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct CreatedIssue {
    id: String,
    key: String,
}

#[derive(Serialize)]
struct CommentRequest<'a> {
    body: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tracker() -> JiraTracker {
        JiraTracker::new(
            JiraConfig {
                url: "https://issues.example.com/".to_owned(),
                project: "ROX".to_owned(),
                issue_type: "Bug".to_owned(),
                label: "CI_Failure".to_owned(),
            },
            "token",
        )
    }

    #[test]
    fn search_query() {
        assert_eq!(
            tracker().search_query("pkg / Foo FAILED"),
            "project in (ROX) AND issuetype = Bug AND status != Closed AND labels = CI_Failure \
             AND summary ~ \"pkg / Foo FAILED\" ORDER BY created DESC"
        );
    }

    #[test]
    fn quoting() {
        assert_eq!(quote_jql(r#"a "b" \c"#), r#""a \"b\" \\c""#);
    }

    #[test]
    fn urls() {
        let tracker = tracker();
        assert_eq!(
            tracker.url("search"),
            "https://issues.example.com/rest/api/2/search"
        );
        assert_eq!(tracker.authorization(), "Bearer token");
    }

    #[test]
    fn create_request_body() {
        let request = CreateIssueRequest {
            fields: CreateIssueFields {
                project: Key { key: "ROX" },
                issuetype: Name { name: "Bug" },
                summary: "pkg / Foo FAILED",
                description: "desc",
                labels: ["CI_Failure"],
            },
        };
        assert_eq!(
            serde_json::to_value(&request).expect("serialized"),
            serde_json::json!({
                "fields": {
                    "project": { "key": "ROX" },
                    "issuetype": { "name": "Bug" },
                    "summary": "pkg / Foo FAILED",
                    "description": "desc",
                    "labels": ["CI_Failure"],
                }
            })
        );
    }

    #[test]
    fn search_results_parse() {
        let results: SearchResults = serde_json::from_str(
            r#"{"total": 1, "issues": [{"id": "10", "key": "ROX-10", "fields": {"summary": "s"}}]}"#,
        )
        .expect("parsed");
        assert_eq!(results.issues.len(), 1);
        assert_eq!(results.issues[0].key, "ROX-10");
        assert_eq!(results.issues[0].fields.summary, "s");
    }
}
