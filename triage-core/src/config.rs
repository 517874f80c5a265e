// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for junit-triage.
//!
//! Configuration is read from an embedded default config, optionally overlaid with a TOML file
//! provided by the user. See `default-config.toml` for the available keys.

use crate::{
    aggregate::SuiteFallback,
    errors::{ConfigParseError, ConfigParseErrorKind, RendererBuildError},
    extract::PrefixMatcher,
    render::{
        DEFAULT_DESCRIPTION_TEMPLATE, DEFAULT_SUMMARY_TEMPLATE, TemplateRenderer, TruncationLimits,
    },
};
use camino::Utf8Path;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use std::collections::BTreeSet;

/// The resolved configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TriageConfig {
    /// Merging of failures into a composite failure.
    pub merge: MergeConfig,

    /// Truncation limits.
    pub truncate: TruncateConfig,

    /// Sub-test folding.
    #[serde(default)]
    pub subtests: SubtestConfig,

    /// Template overrides.
    #[serde(default)]
    pub templates: TemplateConfig,

    /// The Jira project issues are filed in.
    pub jira: JiraConfig,
}

/// The `[merge]` section.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MergeConfig {
    /// The number of failures above which they are merged. 0 disables merging.
    pub threshold: usize,

    /// The suite of a composite failure whose failures come from different suites.
    pub fallback_suite: SuiteFallback,
}

/// The `[truncate]` section.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TruncateConfig {
    /// See [`TruncationLimits::summary_max_chars`].
    pub summary_max_chars: usize,

    /// See [`TruncationLimits::text_block_max_chars`].
    pub text_block_max_chars: usize,
}

/// The `[subtests]` section.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SubtestConfig {
    /// Classname prefixes whose sub-tests are folded into their parents.
    #[serde(default)]
    pub namespace_prefixes: Vec<String>,
}

/// The `[templates]` section.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TemplateConfig {
    /// Overrides the summary template.
    #[serde(default)]
    pub summary: Option<String>,

    /// Overrides the description template.
    #[serde(default)]
    pub description: Option<String>,
}

/// The `[jira]` section.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JiraConfig {
    /// The base URL of the Jira instance.
    pub url: String,

    /// The key of the project issues are searched for and filed in.
    pub project: String,

    /// The issue type of new issues.
    pub issue_type: String,

    /// The label new issues carry, and that searches are restricted to.
    pub label: String,
}

impl TriageConfig {
    /// The embedded default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the default config, overlaid with `config_file` if one is given.
    ///
    /// Unknown keys are reported as warnings.
    pub fn from_sources(config_file: Option<&Utf8Path>) -> Result<Self, ConfigParseError> {
        let mut builder = Self::make_default_config();
        if let Some(config_file) = config_file {
            builder = builder.add_source(File::new(config_file.as_str(), FileFormat::Toml));
        }

        let (config, ignored) = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(config_file, kind))?;

        if !ignored.is_empty() {
            let location = config_file.map_or("default config", Utf8Path::as_str);
            tracing::warn!(
                "ignoring unknown configuration keys in {location}: {}",
                ignored.into_iter().collect::<Vec<_>>().join(", "),
            );
        }

        Ok(config)
    }

    /// Returns the truncation limits.
    pub fn limits(&self) -> TruncationLimits {
        TruncationLimits {
            summary_max_chars: self.truncate.summary_max_chars,
            text_block_max_chars: self.truncate.text_block_max_chars,
        }
    }

    /// Returns the matcher for namespaces whose sub-tests are folded.
    pub fn namespace_matcher(&self) -> PrefixMatcher {
        PrefixMatcher::new(self.subtests.namespace_prefixes.iter().cloned())
    }

    /// Builds a renderer from the configured templates and limits.
    pub fn renderer(&self) -> Result<TemplateRenderer, RendererBuildError> {
        TemplateRenderer::new(
            self.templates
                .summary
                .as_deref()
                .unwrap_or(DEFAULT_SUMMARY_TEMPLATE),
            self.templates
                .description
                .as_deref()
                .unwrap_or(DEFAULT_DESCRIPTION_TEMPLATE),
            self.limits(),
        )
    }

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<(Self, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config: Self = serde_path_to_error::deserialize(ignored_de).map_err(|error| {
            // The config crate also reports the key; keep only the path from
            // serde_path_to_error.
            let path = error.path().clone();
            let error = match error.into_inner() {
                ConfigError::At { error, .. } => *error,
                other => other,
            };
            ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
                path, error,
            )))
        })?;

        Ok((config, ignored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn write_config(dir: &Utf8TempDir, contents: &str) -> camino::Utf8PathBuf {
        let path = dir.path().join("triage.toml");
        std::fs::write(&path, contents).expect("wrote config");
        path
    }

    #[test]
    fn default_config_is_valid() {
        let config = TriageConfig::from_sources(None).expect("default config is valid");
        assert_eq!(config.merge.threshold, 10);
        assert_eq!(config.merge.fallback_suite, SuiteFallback::JobName);
        assert_eq!(config.limits(), TruncationLimits::default());
        assert!(config.subtests.namespace_prefixes.is_empty());
        assert_eq!(config.templates.summary, None);
        assert_eq!(config.jira.project, "ROX");
        assert_eq!(config.jira.label, "CI_Failure");
        config.renderer().expect("default templates are valid");
    }

    #[test]
    fn user_config_overlays_defaults() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let path = write_config(
            &dir,
            indoc! {r#"
                [merge]
                threshold = 0
                fallback-suite = "empty"

                [truncate]
                summary-max-chars = 80

                [subtests]
                namespace-prefixes = ["github.com/stackrox/rox"]

                [templates]
                summary = "{{suite}} {{name}}"
            "#},
        );

        let config = TriageConfig::from_sources(Some(&path)).expect("config is valid");
        assert_eq!(config.merge.threshold, 0);
        assert_eq!(config.merge.fallback_suite, SuiteFallback::Empty);
        assert_eq!(
            config.limits(),
            TruncationLimits {
                summary_max_chars: 80,
                text_block_max_chars: 10_000,
            }
        );
        assert_eq!(
            config.namespace_matcher().prefixes(),
            ["github.com/stackrox/rox".to_owned()]
        );
        assert_eq!(config.templates.summary.as_deref(), Some("{{suite}} {{name}}"));
        assert_eq!(config.jira.issue_type, "Bug");
    }

    #[test]
    fn invalid_value_reports_path() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let path = write_config(
            &dir,
            indoc! {r#"
                [merge]
                fallback-suite = "first"
            "#},
        );

        let err = TriageConfig::from_sources(Some(&path)).expect_err("invalid fallback");
        match err.kind() {
            ConfigParseErrorKind::DeserializeError(error) => {
                assert_eq!(error.path().to_string(), "merge.fallback-suite");
            }
            other => panic!("expected deserialize error, got {other:?}"),
        }
        assert_eq!(err.config_file(), Some(path.as_path()));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let path = dir.path().join("missing.toml");
        let err = TriageConfig::from_sources(Some(&path)).expect_err("missing file");
        assert!(
            matches!(err.kind(), ConfigParseErrorKind::BuildError(_)),
            "{err:?}"
        );
    }

    #[test]
    fn malformed_template_fails_renderer() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let path = write_config(
            &dir,
            indoc! {r#"
                [templates]
                description = "{{#each}}"
            "#},
        );
        let config = TriageConfig::from_sources(Some(&path)).expect("config is valid");
        config.renderer().expect_err("malformed template is rejected");
    }
}
