// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tabular export of every test outcome, for loading into a data warehouse.

use crate::{environment::EnvironmentSnapshot, errors::ExportError, record::TestRunRecord};
use serde::Serialize;
use std::io;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CsvRow<'a> {
    build_id: &'a str,
    timestamp: &'a str,
    classname: &'a str,
    name: &'a str,
    duration: u64,
    status: &'static str,
    job_name: &'a str,
    build_tag: &'a str,
}

/// Writes one CSV row per record, passing or not, preceded by a header row.
///
/// The columns are `BuildId,Timestamp,Classname,Name,Duration,Status,JobName,BuildTag`.
/// `Duration` is in whole milliseconds. Every row carries the same `timestamp`.
pub fn write_csv<'r, W: io::Write>(
    writer: W,
    records: impl IntoIterator<Item = &'r TestRunRecord>,
    env: &EnvironmentSnapshot,
    timestamp: &str,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(writer);
    let mut rows = 0usize;
    for record in records {
        writer.serialize(CsvRow {
            build_id: &env.build_id,
            timestamp,
            classname: &record.classname,
            name: &record.name,
            duration: u64::try_from(record.duration.as_millis()).unwrap_or(u64::MAX),
            status: record.status.as_str(),
            job_name: &env.job_name,
            build_tag: &env.build_tag,
        })?;
        rows += 1;
    }
    if rows == 0 {
        // serialize() writes the header along with the first row, so write it by hand.
        writer.write_record([
            "BuildId",
            "Timestamp",
            "Classname",
            "Name",
            "Duration",
            "Status",
            "JobName",
            "BuildTag",
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    tracing::debug!("wrote {rows} CSV rows");
    Ok(())
}
