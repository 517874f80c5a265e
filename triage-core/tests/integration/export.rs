// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::{fixture_env, fixture_records};
use camino_tempfile::Utf8TempDir;
use std::fs::File;
use triage_core::export::write_csv;

#[test]
fn csv_covers_every_record() {
    let dir = Utf8TempDir::new().expect("created temp dir");
    let path = dir.path().join("results.csv");
    let records = fixture_records();
    write_csv(
        File::create(&path).expect("created CSV file"),
        &records,
        &fixture_env(),
        "2024-03-01T11:00:00Z",
    )
    .expect("wrote CSV");

    let contents = std::fs::read_to_string(&path).expect("read CSV");
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), records.len() + 1);
    assert_eq!(
        lines[0],
        "BuildId,Timestamp,Classname,Name,Duration,Status,JobName,BuildTag"
    );
    assert_eq!(
        lines[4],
        "1764913000,2024-03-01T11:00:00Z,github.com/stackrox/rox/pkg/grpc,TestAPIServer/timeout,\
         500,failed,periodic-ci-nightly-e2e,4.4.x-nightly-20240301"
    );
    assert_eq!(
        lines[8],
        "1764913000,2024-03-01T11:00:00Z,DefaultPoliciesTest,Verify policy on OpenShift,\
         0,skipped,periodic-ci-nightly-e2e,4.4.x-nightly-20240301"
    );
    assert_eq!(
        lines[9],
        "1764913000,2024-03-01T11:00:00Z,Network Graph,should render the graph,\
         20250,error,periodic-ci-nightly-e2e,4.4.x-nightly-20240301"
    );
}
