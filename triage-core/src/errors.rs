// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by junit-triage.

use camino::{Utf8Path, Utf8PathBuf};
use config::ConfigError;
use std::{error, fmt};
use thiserror::Error;

/// An error that occurred while reading the config.
#[derive(Debug, Error)]
#[error(
    "failed to parse junit-triage config at `{}`",
    .config_file.as_deref().map_or("<default config>", Utf8Path::as_str),
)]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Option<Utf8PathBuf>,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: Option<&Utf8Path>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.map(ToOwned::to_owned),
            kind,
        }
    }

    /// Returns the user config file, or `None` if the error is in the default config.
    pub fn config_file(&self) -> Option<&Utf8Path> {
        self.config_file.as_deref()
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of [`ConfigParseError`].
#[derive(Debug, Error)]
pub enum ConfigParseErrorKind {
    /// An error occurred while reading or merging config sources.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the merged config.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),
}

/// Which template an error relates to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TemplateKind {
    /// The summary template.
    Summary,

    /// The description template.
    Description,

    /// The HTML report of filed issues.
    HtmlReport,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Summary => f.write_str("summary"),
            TemplateKind::Description => f.write_str("description"),
            TemplateKind::HtmlReport => f.write_str("HTML report"),
        }
    }
}

/// A template failed to compile.
#[derive(Debug, Error)]
#[error("failed to compile {kind} template")]
pub struct RendererBuildError {
    /// The template that failed to compile.
    pub kind: TemplateKind,

    /// The underlying error.
    #[source]
    pub error: Box<handlebars::TemplateError>,
}

/// A template failed to render for a failure record.
#[derive(Debug, Error)]
#[error("failed to render {kind} for `{suite} / {name}`")]
pub struct RenderFailure {
    /// The template that failed to render.
    pub kind: TemplateKind,

    /// The name of the failure record.
    pub name: String,

    /// The suite of the failure record.
    pub suite: String,

    /// The underlying error.
    #[source]
    pub error: Box<handlebars::RenderError>,
}

/// An error returned by an [`IssueTracker`](crate::tracker::IssueTracker).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackerError {
    /// The HTTP request could not be completed.
    #[error("request to `{url}` failed")]
    Request {
        /// The URL requested.
        url: String,

        /// The underlying error.
        #[source]
        error: Box<ureq::Error>,
    },

    /// The tracker returned a response that could not be understood.
    #[error("unexpected response from `{url}`")]
    Response {
        /// The URL requested.
        url: String,

        /// The underlying error.
        #[source]
        error: Box<dyn error::Error + Send + Sync>,
    },
}

/// Publishing a single failure record failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PublishError {
    /// The summary or description could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderFailure),

    /// Searching for an existing issue failed.
    #[error("failed to search for issues matching `{summary}`")]
    Search {
        /// The summary searched for.
        summary: String,

        /// The underlying error.
        #[source]
        error: TrackerError,
    },

    /// Creating a new issue failed.
    #[error("failed to create issue `{summary}`")]
    Create {
        /// The summary of the issue.
        summary: String,

        /// The underlying error.
        #[source]
        error: TrackerError,
    },

    /// Commenting on an existing issue failed.
    #[error("failed to comment on issue {key} (`{summary}`)")]
    Comment {
        /// The key of the issue.
        key: String,

        /// The summary of the issue.
        summary: String,

        /// The underlying error.
        #[source]
        error: TrackerError,
    },
}

/// One or more failure records could not be published.
#[derive(Debug)]
pub struct PublishErrors {
    /// The individual errors, in record order.
    pub errors: Vec<PublishError>,
}

impl fmt::Display for PublishErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.len() == 1 {
            write!(f, "failed to publish 1 failure")?;
        } else {
            write!(f, "failed to publish {} failures", self.errors.len())?;
        }
        for error in &self.errors {
            write!(f, "\n  * {}", DisplayErrorChain::new(error))?;
        }
        Ok(())
    }
}

impl error::Error for PublishErrors {}

/// An error that occurred while writing an export.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    /// Creating or writing the output file failed.
    #[error("failed to write output")]
    Io(#[from] std::io::Error),

    /// Writing CSV failed.
    #[error("failed to write CSV")]
    Csv(#[from] csv::Error),

    /// Writing JSON failed.
    #[error("failed to write JSON")]
    Json(#[from] serde_json::Error),

    /// Rendering the HTML report failed.
    #[error("failed to render HTML report")]
    Html(#[source] Box<handlebars::RenderError>),
}

/// Displays an error along with its chain of sources, on one line.
pub struct DisplayErrorChain<E> {
    error: E,
}

impl<E: error::Error> DisplayErrorChain<E> {
    /// Creates a new chain displayer.
    pub fn new(error: E) -> Self {
        Self { error }
    }
}

impl<E: error::Error> fmt::Display for DisplayErrorChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        let mut source = self.error.source();
        while let Some(error) = source {
            write!(f, ": {error}")?;
            source = error.source();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, Error)]
    #[error("inner")]
    struct Inner;

    #[test]
    fn error_chain() {
        assert_eq!(DisplayErrorChain::new(Outer(Inner)).to_string(), "outer: inner");
    }

    #[test]
    fn publish_errors_lists_each() {
        let errors = PublishErrors {
            errors: vec![
                PublishError::Search {
                    summary: "a FAILED".to_owned(),
                    error: TrackerError::Response {
                        url: "https://jira.example/search".to_owned(),
                        error: "no issues field".into(),
                    },
                },
                PublishError::Render(RenderFailure {
                    kind: TemplateKind::Description,
                    name: "Foo".to_owned(),
                    suite: "pkg".to_owned(),
                    error: Box::new(handlebars::RenderErrorReason::Other("boom".to_owned()).into()),
                }),
            ],
        };
        let display = errors.to_string();
        assert!(
            display.starts_with(
                "failed to publish 2 failures\n  \
                 * failed to search for issues matching `a FAILED`: \
                 unexpected response from `https://jira.example/search`: no issues field\n  \
                 * failed to render description for `pkg / Foo`"
            ),
            "{display}"
        );
    }
}
