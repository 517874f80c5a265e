// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, Result,
    output::{OutputContext, OutputOpts},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser};
use junit_ingest::ingest_path;
use std::{
    fs::File,
    io::{BufWriter, Write},
};
use triage_core::{
    aggregate::FailureAggregator,
    chat::chat_blocks,
    config::TriageConfig,
    environment::EnvironmentSnapshot,
    export::write_csv,
    exit_codes::TriageExitCode,
    extract::FailureExtractor,
    html::HtmlReport,
    record::TestRunRecord,
    tracker::{JiraTracker, PublishOutcome, Publisher, ReportedFailure},
};

/// Files CI test failures from JUnit reports as Jira issues.
///
/// Failing tests are grouped into failures, and each failure is searched for in Jira by its
/// summary: matching open issues get a comment, and new issues are filed otherwise.
#[derive(Debug, Parser)]
#[command(version, max_term_width = 100)]
pub struct JunitTriageApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(flatten)]
    input: InputOpts,

    #[clap(flatten)]
    triage: TriageOpts,

    #[clap(flatten)]
    build: BuildOpts,

    #[clap(flatten)]
    publish: PublishOpts,

    #[clap(flatten)]
    export: ExportOpts,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Input options")]
struct InputOpts {
    /// Directory (searched recursively) or file with JUnit XML reports
    #[arg(long, value_name = "PATH", env = "ARTIFACT_DIR")]
    junit_reports_dir: Utf8PathBuf,

    /// Config file layered over the default configuration
    #[arg(long, value_name = "PATH", env = "JUNIT_TRIAGE_CONFIG")]
    config_file: Option<Utf8PathBuf>,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Triage options")]
struct TriageOpts {
    /// Report more failures than this as a single failure (0 to never merge)
    #[arg(long, value_name = "N")]
    threshold: Option<usize>,

    /// Fold failing sub-tests into their parent for classnames with this prefix
    #[arg(long = "subtest-namespace", value_name = "PREFIX")]
    subtest_namespaces: Vec<String>,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Build options")]
struct BuildOpts {
    /// CI build identifier
    #[arg(long, env = EnvironmentSnapshot::BUILD_ID_ENV)]
    build_id: Option<String>,

    /// CI job name
    #[arg(long, env = EnvironmentSnapshot::JOB_NAME_ENV)]
    job_name: Option<String>,

    /// Orchestrator (cluster flavor) the tests ran against
    #[arg(long, env = EnvironmentSnapshot::ORCHESTRATOR_ENV)]
    orchestrator: Option<String>,

    /// Tag of the build under test
    #[arg(long, env = EnvironmentSnapshot::BUILD_TAG_ENV)]
    build_tag: Option<String>,

    /// Link to the source the build was made from [default: refs.base_link of the Prow job spec]
    #[arg(long, value_name = "URL")]
    base_link: Option<String>,

    /// Link to the CI build [default: derived from the job name and build ID]
    #[arg(long, value_name = "URL")]
    build_link: Option<String>,

    /// Prow job spec
    #[arg(long, env = EnvironmentSnapshot::JOB_SPEC_ENV, hide = true)]
    job_spec: Option<String>,
}

impl BuildOpts {
    /// Looks up each variable among the parsed arguments, which clap has already filled in
    /// from the environment where no flag was given.
    fn lookup(&self, var: &str) -> Option<String> {
        let value = match var {
            EnvironmentSnapshot::BUILD_ID_ENV => &self.build_id,
            EnvironmentSnapshot::JOB_NAME_ENV => &self.job_name,
            EnvironmentSnapshot::ORCHESTRATOR_ENV => &self.orchestrator,
            EnvironmentSnapshot::BUILD_TAG_ENV => &self.build_tag,
            EnvironmentSnapshot::JOB_SPEC_ENV => &self.job_spec,
            _ => return None,
        };
        value.clone()
    }

    fn snapshot(self) -> EnvironmentSnapshot {
        let mut env = EnvironmentSnapshot::from_env_vars(|var| self.lookup(var));
        if let Some(base_link) = self.base_link {
            env.base_link = base_link;
        }
        if let Some(build_link) = self.build_link {
            env.build_link = build_link;
        }
        env
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Publishing options")]
struct PublishOpts {
    /// URL of the Jira instance [default: from config]
    #[arg(long, value_name = "URL")]
    jira_url: Option<String>,

    /// Jira personal access token
    #[arg(long, env = "JIRA_TOKEN", hide_env_values = true)]
    jira_token: Option<String>,

    /// Search Jira, but do not create issues or comments
    #[arg(long)]
    dry_run: bool,

    /// Do not contact Jira at all
    #[arg(long, conflicts_with = "dry_run")]
    no_publish: bool,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Export options")]
struct ExportOpts {
    /// Write every test outcome to this CSV file
    #[arg(long, value_name = "PATH")]
    csv_output: Option<Utf8PathBuf>,

    /// Write a Slack message describing the failures to this JSON file
    #[arg(long, value_name = "PATH")]
    slack_output: Option<Utf8PathBuf>,

    /// Write an HTML page linking the filed issues to this file
    #[arg(long, value_name = "PATH")]
    html_output: Option<Utf8PathBuf>,

    /// Timestamp recorded in the CSV export [default: now]
    #[arg(long, value_name = "RFC3339")]
    timestamp: Option<String>,
}

impl JunitTriageApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the exit code.
    pub fn exec(self) -> Result<i32> {
        let mut config = TriageConfig::from_sources(self.input.config_file.as_deref())?;
        if let Some(threshold) = self.triage.threshold {
            config.merge.threshold = threshold;
        }
        config
            .subtests
            .namespace_prefixes
            .extend(self.triage.subtest_namespaces);
        if let Some(url) = self.publish.jira_url {
            config.jira.url = url;
        }

        let renderer = config.renderer()?;
        let html_report = self
            .export
            .html_output
            .as_ref()
            .map(|_| HtmlReport::new(&config.jira.url))
            .transpose()?;
        let env = self.build.snapshot();

        let reports = ingest_path(&self.input.junit_reports_dir)?;
        let records = TestRunRecord::from_reports(&reports);
        tracing::info!(
            "read {} test cases from {} reports",
            records.len(),
            reports.len()
        );

        if let Some(path) = &self.export.csv_output {
            let timestamp = self
                .export
                .timestamp
                .clone()
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());
            let file = create_file(path)?;
            write_csv(BufWriter::new(file), &records, &env, &timestamp)
                .map_err(|err| ExpectedError::write_output(path, err))?;
        }

        let failures = FailureExtractor::new(&env, config.namespace_matcher()).extract(&records);
        let failures = FailureAggregator::new(
            &renderer,
            &env,
            config.merge.threshold,
            config.merge.fallback_suite,
        )
        .aggregate(failures)?;

        let mut outcome = if self.publish.no_publish {
            let reported = failures
                .into_iter()
                .map(|record| ReportedFailure::unpublished(record, &renderer))
                .collect::<Result<Vec<_>, _>>()?;
            PublishOutcome {
                reported,
                errors: Vec::new(),
            }
        } else {
            let token = match (self.publish.jira_token, self.publish.dry_run) {
                (Some(token), _) => token,
                (None, true) => String::new(),
                (None, false) => return Err(ExpectedError::MissingJiraToken),
            };
            let tracker = JiraTracker::new(config.jira.clone(), token);
            Publisher::new(&tracker, &renderer, self.publish.dry_run).publish_failures(failures)
        };

        if let Some(path) = &self.export.slack_output {
            let blocks = chat_blocks(
                &outcome.reported,
                &env,
                config.truncate.summary_max_chars,
            );
            let mut writer = BufWriter::new(create_file(path)?);
            serde_json::to_writer_pretty(&mut writer, &blocks)
                .map_err(|err| ExpectedError::write_output(path, err))?;
            writer
                .flush()
                .map_err(|err| ExpectedError::write_output(path, err))?;
        }

        if let (Some(path), Some(html_report)) = (&self.export.html_output, &html_report) {
            html_report
                .write(BufWriter::new(create_file(path)?), &outcome.reported)
                .map_err(|err| ExpectedError::write_output(path, err))?;
        }

        outcome.check()?;
        Ok(TriageExitCode::OK)
    }
}

fn create_file(path: &Utf8Path) -> Result<File> {
    File::create(path).map_err(|err| ExpectedError::write_output(path, err))
}
