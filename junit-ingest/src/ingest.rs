// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bulk ingestion of report files from disk.

use crate::{Report, errors::IngestError};
use camino::{Utf8Path, Utf8PathBuf};
use std::{fs::File, io::BufReader};
use walkdir::WalkDir;

/// A report read from disk, along with the file it came from.
#[derive(Clone, Debug)]
pub struct IngestedReport {
    /// The file the report was read from.
    pub path: Utf8PathBuf,

    /// The report itself.
    pub report: Report,
}

/// Reads every JUnit report at `path`.
///
/// If `path` is a file, it is read as a single report regardless of its extension. If it is a
/// directory, it is walked recursively and every file with an `.xml` extension is read, in file
/// name order.
///
/// Any unreadable or malformed file fails the whole ingestion.
pub fn ingest_path(path: &Utf8Path) -> Result<Vec<IngestedReport>, IngestError> {
    if !path.exists() {
        return Err(IngestError::NotFound {
            path: path.to_owned(),
        });
    }

    let files = if path.is_file() {
        vec![path.to_owned()]
    } else {
        report_files(path)?
    };

    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        let report = read_report(&file)?;
        let tally = report.tally();
        tracing::debug!(
            "read `{file}`: {} tests, {} failed, {} errored, {} skipped",
            tally.tests,
            tally.failures,
            tally.errors,
            tally.skipped,
        );
        reports.push(IngestedReport { path: file, report });
    }
    Ok(reports)
}

fn report_files(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, IngestError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|error| IngestError::Walk {
            path: dir.to_owned(),
            error,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = Utf8PathBuf::from_path_buf(entry.into_path())
            .map_err(|path| IngestError::NonUtf8Path { path })?;
        if path.extension() == Some("xml") {
            files.push(path);
        }
    }
    Ok(files)
}

fn read_report(path: &Utf8Path) -> Result<Report, IngestError> {
    let file = File::open(path).map_err(|error| IngestError::Read {
        path: path.to_owned(),
        error,
    })?;
    Report::deserialize(BufReader::new(file)).map_err(|error| IngestError::Parse {
        path: path.to_owned(),
        error,
    })
}
