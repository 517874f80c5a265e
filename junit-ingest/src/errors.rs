// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use std::path::PathBuf;
use thiserror::Error;

/// An error that occurs while deserializing a [`Report`](crate::Report).
///
/// Returned by [`Report::deserialize`](crate::Report::deserialize) and
/// [`Report::from_xml_str`](crate::Report::from_xml_str).
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// The document is not well-formed XML.
    #[error("error reading JUnit XML at byte {position}")]
    Xml {
        /// The byte offset at which reading failed.
        position: u64,

        /// The underlying error.
        #[source]
        error: quick_xml::Error,
    },

    /// The document does not contain a `testsuites` or `testsuite` element.
    #[error("no `testsuites` or `testsuite` element found")]
    NoReport,
}

/// An error that occurs while ingesting reports from the file system.
///
/// Returned by [`ingest_path`](crate::ingest_path).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IngestError {
    /// The given path does not exist.
    #[error("report path `{path}` does not exist")]
    NotFound {
        /// The path that was requested.
        path: Utf8PathBuf,
    },

    /// A report file could not be read.
    #[error("error reading report file `{path}`")]
    Read {
        /// The file that failed to be read.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// A directory could not be walked.
    #[error("error walking report directory `{path}`")]
    Walk {
        /// The directory that was being walked.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: walkdir::Error,
    },

    /// A path found while walking a directory is not valid UTF-8.
    #[error("report path `{}` is not valid UTF-8", path.display())]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },

    /// A report file is not a valid JUnit report.
    #[error("error parsing JUnit report `{path}`")]
    Parse {
        /// The file that failed to parse.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: DeserializeError,
    },
}
