// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The CI environment a run of junit-triage reports on.

use serde::Serialize;

/// The base URL of Prow build logs, used to derive build links.
pub const PROW_LOGS_URL: &str = "https://prow.ci.openshift.org/view/gs/origin-ci-test/logs";

/// An immutable snapshot of the CI environment.
///
/// Every [`FailureRecord`](crate::failure::FailureRecord) carries its own copy
/// of these values, taken when the record is created.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EnvironmentSnapshot {
    /// The CI build identifier.
    pub build_id: String,

    /// The CI job name.
    pub job_name: String,

    /// The orchestrator (cluster flavor) the tests ran against.
    pub orchestrator: String,

    /// The tag of the build under test.
    pub build_tag: String,

    /// A link to the source the build was made from.
    pub base_link: String,

    /// A link to the CI build.
    pub build_link: String,
}

impl EnvironmentSnapshot {
    /// Environment variable holding the build identifier.
    pub const BUILD_ID_ENV: &'static str = "BUILD_ID";

    /// Environment variable holding the job name.
    pub const JOB_NAME_ENV: &'static str = "JOB_NAME";

    /// Environment variable holding the orchestrator flavor.
    pub const ORCHESTRATOR_ENV: &'static str = "ORCHESTRATOR_FLAVOR";

    /// Environment variable holding the build tag.
    pub const BUILD_TAG_ENV: &'static str = "BUILD_TAG";

    /// Environment variable holding the Prow job spec, a JSON document.
    pub const JOB_SPEC_ENV: &'static str = "JOB_SPEC";

    /// Builds a snapshot by looking up the well-known CI environment variables.
    ///
    /// The base link is read from the `refs.base_link` field of the job spec,
    /// and the build link is derived from the job name and build ID.
    pub fn from_env_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_link = lookup(Self::JOB_SPEC_ENV)
            .and_then(|job_spec| base_link_from_job_spec(&job_spec))
            .unwrap_or_default();
        let mut snapshot = Self {
            build_id: lookup(Self::BUILD_ID_ENV).unwrap_or_default(),
            job_name: lookup(Self::JOB_NAME_ENV).unwrap_or_default(),
            orchestrator: lookup(Self::ORCHESTRATOR_ENV).unwrap_or_default(),
            build_tag: lookup(Self::BUILD_TAG_ENV).unwrap_or_default(),
            base_link,
            build_link: String::new(),
        };
        snapshot.derive_build_link();
        snapshot
    }

    /// Fills in the build link from the job name and build ID, if it is unset and both are
    /// known.
    pub fn derive_build_link(&mut self) -> &mut Self {
        if self.build_link.is_empty() && !self.job_name.is_empty() && !self.build_id.is_empty() {
            self.build_link = format!("{PROW_LOGS_URL}/{}/{}", self.job_name, self.build_id);
        }
        self
    }
}

/// Extracts `refs.base_link` from a Prow job spec.
///
/// Returns `None` if the job spec is not valid JSON or does not have the field.
pub fn base_link_from_job_spec(job_spec: &str) -> Option<String> {
    let spec: serde_json::Value = match serde_json::from_str(job_spec) {
        Ok(spec) => spec,
        Err(error) => {
            tracing::debug!("ignoring unparseable job spec: {error}");
            return None;
        }
    };
    spec.pointer("/refs/base_link")
        .and_then(|link| link.as_str())
        .map(str::to_owned)
}
