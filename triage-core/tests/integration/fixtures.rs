// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use junit_ingest::ingest_path;
use triage_core::{environment::EnvironmentSnapshot, record::TestRunRecord};

pub(crate) const GO_NAMESPACE: &str = "github.com/stackrox/rox";

pub(crate) fn reports_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("triage-core has a parent directory")
        .join("fixtures/reports")
}

pub(crate) fn fixture_records() -> Vec<TestRunRecord> {
    let reports = ingest_path(&reports_dir()).expect("fixture reports are valid");
    TestRunRecord::from_reports(&reports)
}

pub(crate) fn fixture_env() -> EnvironmentSnapshot {
    let mut env = EnvironmentSnapshot {
        build_id: "1764913000".to_owned(),
        job_name: "periodic-ci-nightly-e2e".to_owned(),
        orchestrator: "gke".to_owned(),
        build_tag: "4.4.x-nightly-20240301".to_owned(),
        base_link: "https://github.com/stackrox/stackrox/commit/abc123".to_owned(),
        build_link: String::new(),
    };
    env.derive_build_link();
    env
}
