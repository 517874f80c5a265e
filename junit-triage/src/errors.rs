// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, Styles};
use camino::Utf8PathBuf;
use junit_ingest::IngestError;
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use triage_core::{
    errors::{
        ConfigParseError, DisplayErrorChain, ExportError, PublishErrors, RenderFailure,
        RendererBuildError,
    },
    exit_codes::TriageExitCode,
};

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// The #[error()] strings are placeholders: errors are printed with display_to_stderr, which
// colorizes them.

/// An expected error, reported to the user without a backtrace.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("template compile error")]
    RendererBuildError {
        #[from]
        err: RendererBuildError,
    },
    #[error("template render error")]
    RenderFailure {
        #[from]
        err: RenderFailure,
    },
    #[error("missing Jira token")]
    MissingJiraToken,
    #[error("failed to read JUnit reports")]
    IngestError {
        #[from]
        err: IngestError,
    },
    #[error("failed to publish failures")]
    PublishErrors {
        #[from]
        err: PublishErrors,
    },
    #[error("failed to write output")]
    WriteOutputError {
        path: Utf8PathBuf,
        #[source]
        err: ExportError,
    },
}

impl ExpectedError {
    pub(crate) fn write_output(path: impl Into<Utf8PathBuf>, err: impl Into<ExportError>) -> Self {
        Self::WriteOutputError {
            path: path.into(),
            err: err.into(),
        }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. }
            | Self::RendererBuildError { .. }
            | Self::RenderFailure { .. }
            | Self::MissingJiraToken => TriageExitCode::SETUP_ERROR,
            Self::IngestError { .. } => TriageExitCode::INGEST_FAILED,
            Self::PublishErrors { .. } => TriageExitCode::PUBLISH_FAILED,
            Self::WriteOutputError { .. } => TriageExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &Styles) {
        let mut next_error = match &self {
            Self::ConfigParseError { err } => {
                tracing::error!("{err}");
                err.source()
            }
            Self::RendererBuildError { err } => {
                tracing::error!("{err}");
                err.source()
            }
            Self::RenderFailure { err } => {
                tracing::error!("{err}");
                err.source()
            }
            Self::MissingJiraToken => {
                tracing::error!(
                    "a Jira token is required to publish failures (pass {} or set {})",
                    "--jira-token".style(styles.bold),
                    "JIRA_TOKEN".style(styles.bold),
                );
                None
            }
            Self::IngestError { err } => {
                tracing::error!("failed to read JUnit reports");
                Some(err as &dyn Error)
            }
            Self::PublishErrors { err } => {
                tracing::error!(
                    "failed to publish {} of the failures found",
                    err.errors.len()
                );
                for error in &err.errors {
                    tracing::error!(
                        target: NO_HEADING_TARGET,
                        "  * {}",
                        DisplayErrorChain::new(error)
                    );
                }
                None
            }
            Self::WriteOutputError { path, err } => {
                tracing::error!("failed to write `{}`", path.style(styles.bold));
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            tracing::error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
