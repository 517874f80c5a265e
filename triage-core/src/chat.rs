// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat notifications in Slack's [Block Kit](https://api.slack.com/block-kit) format.

use crate::{
    environment::EnvironmentSnapshot,
    sanitize::{SUMMARY_TRUNCATION_MARKER, truncate_with_marker},
    tracker::ReportedFailure,
};
use serde_json::{Value, json};
use swrite::{SWrite, swrite};

/// Builds a Slack message describing `failures`.
///
/// The message starts with a header naming the job, followed by one section per failure with
/// its summary, the issue it was filed under, and the start of its message. Messages are cut
/// to `excerpt_max_chars` characters.
pub fn chat_blocks(
    failures: &[ReportedFailure],
    env: &EnvironmentSnapshot,
    excerpt_max_chars: usize,
) -> Value {
    let title = if env.job_name.is_empty() {
        format!("{} failed tests", failures.len())
    } else {
        format!("{}: {} failed tests", env.job_name, failures.len())
    };

    let mut blocks = vec![json!({
        "type": "header",
        "text": { "type": "plain_text", "text": title },
    })];
    if !env.build_link.is_empty() {
        blocks.push(json!({
            "type": "context",
            "elements": [
                { "type": "mrkdwn", "text": format!("<{}|Build {}>", env.build_link, env.build_id) },
            ],
        }));
    }

    for failure in failures {
        let mut text = format!("*{}*", escape_mrkdwn(&failure.summary));
        if let Some(key) = &failure.issue_key {
            swrite!(text, "\nIssue: {key}");
        }
        let message = failure.record.message.trim();
        if !message.is_empty() {
            let excerpt = truncate_with_marker(message, excerpt_max_chars, SUMMARY_TRUNCATION_MARKER);
            swrite!(text, "\n```{}```", escape_mrkdwn(&excerpt));
        }
        blocks.push(json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": text },
        }));
    }

    json!({ "blocks": blocks })
}

// Slack requires these three characters to be escaped in mrkdwn text.
fn escape_mrkdwn(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
