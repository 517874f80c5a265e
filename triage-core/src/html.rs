// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! An HTML page listing the issues failures were filed under.
//!
//! Each issue links to its page on the tracker. Unlike tracker text, everything here is
//! HTML-escaped.

use crate::{
    errors::{ExportError, RendererBuildError, TemplateKind},
    tracker::ReportedFailure,
};
use handlebars::Handlebars;
use serde::Serialize;
use std::io;

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Filed issues</title>
</head>
<body>
{{#if issues}}
<ul>
{{#each issues}}
<li><a href="{{url}}">{{key}}</a>{{#if summary}}: {{summary}}{{/if}}</li>
{{/each}}
</ul>
{{else}}
<p>No issues were filed.</p>
{{/if}}
</body>
</html>
"#;

/// Renders the HTML report of filed issues.
#[derive(Debug)]
pub struct HtmlReport {
    registry: Handlebars<'static>,
    browse_url: String,
}

#[derive(Serialize)]
struct ReportContext<'a> {
    issues: Vec<IssueLink<'a>>,
}

#[derive(Serialize)]
struct IssueLink<'a> {
    key: &'a str,
    url: String,
    summary: &'a str,
}

impl HtmlReport {
    const NAME: &'static str = "html-report";

    /// Creates a report linking issues to `<tracker_url>/browse/<KEY>`.
    pub fn new(tracker_url: &str) -> Result<Self, RendererBuildError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry
            .register_template_string(Self::NAME, REPORT_TEMPLATE)
            .map_err(|error| RendererBuildError {
                kind: TemplateKind::HtmlReport,
                error: Box::new(error),
            })?;
        Ok(Self {
            registry,
            browse_url: format!("{}/browse/", tracker_url.trim_end_matches('/')),
        })
    }

    /// Renders the report. Failures that were not filed under an issue are left out.
    pub fn render(&self, failures: &[ReportedFailure]) -> Result<String, ExportError> {
        let issues = failures
            .iter()
            .filter_map(|failure| {
                let key = failure.issue_key.as_deref()?;
                Some(IssueLink {
                    key,
                    url: format!("{}{key}", self.browse_url),
                    summary: &failure.summary,
                })
            })
            .collect();
        self.registry
            .render(Self::NAME, &ReportContext { issues })
            .map_err(|error| ExportError::Html(Box::new(error)))
    }

    /// Renders the report to `writer`.
    pub fn write(
        &self,
        mut writer: impl io::Write,
        failures: &[ReportedFailure],
    ) -> Result<(), ExportError> {
        let html = self.render(failures)?;
        writer.write_all(html.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}
