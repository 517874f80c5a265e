// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Renders summary and description text for failure records.
//!
//! Templates use [Handlebars](https://handlebarsjs.com/) syntax and are rendered against the
//! fields of a [`FailureRecord`]. HTML escaping is disabled and unknown fields are errors. Three
//! helpers are available:
//!
//! * `truncate text` keeps at most `truncate.text-block-max-chars` characters of `text`,
//!   appending [`TEXT_BLOCK_TRUNCATION_MARKER`] if anything was cut.
//! * `truncate_summary part...` concatenates its parameters and keeps at most
//!   `truncate.summary-max-chars` characters, appending [`SUMMARY_TRUNCATION_MARKER`].
//! * `code_block label text` renders `text` as a titled tracker code block, or nothing if
//!   `text` is empty.
//!
//! All helpers may be used as subexpressions, e.g. `{{code_block "Message" (truncate message)}}`.

use crate::{
    errors::{RenderFailure, RendererBuildError, TemplateKind},
    failure::FailureRecord,
    sanitize::{
        SUMMARY_TRUNCATION_MARKER, TEXT_BLOCK_TRUNCATION_MARKER, sanitize_summary,
        truncate_with_marker,
    },
};
use handlebars::{
    Context, Handlebars, Helper, HelperDef, JsonRender, RenderContext, RenderError,
    RenderErrorReason, ScopedJson,
};
use serde_json::Value as Json;

/// The summary template used when none is configured.
pub const DEFAULT_SUMMARY_TEMPLATE: &str = r#"{{truncate_summary suite " / " name}} FAILED"#;

/// The description template used when none is configured.
pub const DEFAULT_DESCRIPTION_TEMPLATE: &str = concat!(
    r#"{{code_block "Message" (truncate message)}}"#,
    r#"{{code_block "STDERR" (truncate stderr)}}"#,
    r#"{{code_block "STDOUT" (truncate stdout)}}"#,
    r#"{{code_block "ERROR" (truncate error)}}"#,
    "\n\n",
    "||    ENV     ||      Value           ||\n",
    "| BUILD ID     | [{{build_id}}|{{build_link}}]|\n",
    "| BUILD TAG    | [{{build_tag}}|{{base_link}}]|\n",
    "| JOB NAME     |{{job_name}}|\n",
    "| ORCHESTRATOR |{{orchestrator}}|\n",
);

/// Character limits applied by the truncation helpers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TruncationLimits {
    /// The maximum number of characters kept by `truncate_summary`.
    pub summary_max_chars: usize,

    /// The maximum number of characters kept by `truncate`.
    pub text_block_max_chars: usize,
}

impl TruncationLimits {
    /// The default summary limit.
    pub const DEFAULT_SUMMARY_MAX_CHARS: usize = 200;

    /// The default text block limit.
    pub const DEFAULT_TEXT_BLOCK_MAX_CHARS: usize = 10_000;
}

impl Default for TruncationLimits {
    fn default() -> Self {
        Self {
            summary_max_chars: Self::DEFAULT_SUMMARY_MAX_CHARS,
            text_block_max_chars: Self::DEFAULT_TEXT_BLOCK_MAX_CHARS,
        }
    }
}

/// Renders failure records into tracker-ready text.
///
/// Both templates are compiled when the renderer is built, so a malformed template is reported
/// once, up front, rather than for every record.
#[derive(Debug)]
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    const SUMMARY: &'static str = "summary";
    const DESCRIPTION: &'static str = "description";

    /// Builds a renderer from the given templates.
    pub fn new(
        summary_template: &str,
        description_template: &str,
        limits: TruncationLimits,
    ) -> Result<Self, RendererBuildError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);
        registry.register_helper(
            "truncate",
            Box::new(TruncateHelper {
                max_chars: limits.text_block_max_chars,
            }),
        );
        registry.register_helper(
            "truncate_summary",
            Box::new(TruncateSummaryHelper {
                max_chars: limits.summary_max_chars,
            }),
        );
        registry.register_helper("code_block", Box::new(CodeBlockHelper));

        registry
            .register_template_string(Self::SUMMARY, summary_template)
            .map_err(|error| RendererBuildError {
                kind: TemplateKind::Summary,
                error: Box::new(error),
            })?;
        registry
            .register_template_string(Self::DESCRIPTION, description_template)
            .map_err(|error| RendererBuildError {
                kind: TemplateKind::Description,
                error: Box::new(error),
            })?;

        Ok(Self { registry })
    }

    /// Builds a renderer from the default templates.
    pub fn with_default_templates(limits: TruncationLimits) -> Result<Self, RendererBuildError> {
        Self::new(
            DEFAULT_SUMMARY_TEMPLATE,
            DEFAULT_DESCRIPTION_TEMPLATE,
            limits,
        )
    }

    /// Renders the summary of a record.
    ///
    /// The rendered text is passed through [`sanitize_summary`], so it is safe to use in a
    /// tracker's phrase search.
    pub fn summary(&self, record: &FailureRecord) -> Result<String, RenderFailure> {
        let rendered = self.render(TemplateKind::Summary, Self::SUMMARY, record)?;
        Ok(sanitize_summary(&rendered))
    }

    /// Renders the description of a record.
    pub fn description(&self, record: &FailureRecord) -> Result<String, RenderFailure> {
        self.render(TemplateKind::Description, Self::DESCRIPTION, record)
    }

    fn render(
        &self,
        kind: TemplateKind,
        template: &str,
        record: &FailureRecord,
    ) -> Result<String, RenderFailure> {
        self.registry
            .render(template, record)
            .map_err(|error| RenderFailure {
                kind,
                name: record.name.clone(),
                suite: record.suite.clone(),
                error: Box::new(error),
            })
    }
}

struct TruncateHelper {
    max_chars: usize,
}

impl HelperDef for TruncateHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let text = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex("truncate", 0))?
            .value()
            .render();
        let truncated = truncate_with_marker(&text, self.max_chars, TEXT_BLOCK_TRUNCATION_MARKER);
        Ok(ScopedJson::Derived(Json::String(truncated.into_owned())))
    }
}

struct TruncateSummaryHelper {
    max_chars: usize,
}

impl HelperDef for TruncateSummaryHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        if h.params().is_empty() {
            return Err(RenderErrorReason::ParamNotFoundForIndex("truncate_summary", 0).into());
        }
        let joined: String = h.params().iter().map(|p| p.value().render()).collect();
        let truncated = truncate_with_marker(&joined, self.max_chars, SUMMARY_TRUNCATION_MARKER);
        Ok(ScopedJson::Derived(Json::String(truncated.into_owned())))
    }
}

struct CodeBlockHelper;

impl HelperDef for CodeBlockHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let label = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex("code_block", 0))?
            .value()
            .render();
        let text = h
            .param(1)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex("code_block", 1))?
            .value()
            .render();

        let block = if text.is_empty() {
            String::new()
        } else {
            format!("\n{{code:title={label}|borderStyle=solid}}\n{text}\n{{code}}")
        };
        Ok(ScopedJson::Derived(Json::String(block)))
    }
}
