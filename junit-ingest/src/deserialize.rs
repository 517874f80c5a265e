// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deserialize a `Report`.

use crate::{
    Detail, Outcome, Report, TestCase, TestSuite, errors::DeserializeError,
    report::strip_control_chars,
};
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use std::{io, time::Duration};

static TESTSUITES_TAG: &[u8] = b"testsuites";
static TESTSUITE_TAG: &[u8] = b"testsuite";
static TESTCASE_TAG: &[u8] = b"testcase";
static PROPERTY_TAG: &[u8] = b"property";
static FAILURE_TAG: &[u8] = b"failure";
static ERROR_TAG: &[u8] = b"error";
static SKIPPED_TAG: &[u8] = b"skipped";
static SYSTEM_OUT_TAG: &[u8] = b"system-out";
static SYSTEM_ERR_TAG: &[u8] = b"system-err";

pub(crate) fn deserialize_report(reader: impl io::BufRead) -> Result<Report, DeserializeError> {
    let mut reader = Reader::from_reader(reader);
    let mut state = DeserializeState::default();
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|error| DeserializeError::Xml {
                position: reader.buffer_position() as u64,
                error,
            })?;
        let position = reader.buffer_position() as u64;
        let wrap = |error: quick_xml::Error| DeserializeError::Xml { position, error };

        match event {
            Event::Start(start) => state.start_element(&start).map_err(wrap)?,
            Event::Empty(start) => {
                state.start_element(&start).map_err(wrap)?;
                state.end_element(start.local_name().as_ref());
            }
            Event::End(end) => state.end_element(end.local_name().as_ref()),
            Event::Text(text) => {
                if state.capturing() {
                    let text = text.unescape().map_err(wrap)?;
                    state.text.push_str(&text);
                }
            }
            Event::CData(cdata) => {
                if state.capturing() {
                    state
                        .text
                        .push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    state.finish()
}

/// Where character data is currently being collected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum TextTarget {
    None,
    Detail,
    SystemOut,
    SystemErr,
}

#[derive(Debug)]
struct OpenSuite {
    // Position in the report at which this suite is inserted once closed, so that
    // parents precede the suites nested within them.
    index: usize,
    suite: TestSuite,
}

#[derive(Debug)]
struct DeserializeState {
    report: Report,
    seen_root: bool,
    suites: Vec<OpenSuite>,
    test_case: Option<TestCase>,
    target: TextTarget,
    text: String,
}

impl Default for DeserializeState {
    fn default() -> Self {
        Self {
            report: Report::default(),
            seen_root: false,
            suites: Vec::new(),
            test_case: None,
            target: TextTarget::None,
            text: String::new(),
        }
    }
}

impl DeserializeState {
    fn capturing(&self) -> bool {
        self.target != TextTarget::None
    }

    fn start_element(&mut self, start: &BytesStart<'_>) -> Result<(), quick_xml::Error> {
        let name = start.local_name();
        let name = name.as_ref();

        if name == TESTSUITES_TAG {
            let mut attributes = read_attributes(start)?;
            self.seen_root = true;
            self.report.name = attributes.shift_remove("name").unwrap_or_default();
            self.report.time = attributes.get("time").and_then(|time| parse_time(time));
            self.report.timestamp = attributes
                .get("timestamp")
                .and_then(|timestamp| parse_timestamp(timestamp));
        } else if name == TESTSUITE_TAG {
            let mut attributes = read_attributes(start)?;
            self.seen_root = true;
            let mut suite = TestSuite::named(attributes.shift_remove("name").unwrap_or_default());
            suite.hostname = attributes.shift_remove("hostname");
            suite.time = attributes.get("time").and_then(|time| parse_time(time));
            suite.timestamp = attributes
                .get("timestamp")
                .and_then(|timestamp| parse_timestamp(timestamp));
            self.suites.push(OpenSuite {
                index: self.report.test_suites.len(),
                suite,
            });
        } else if name == TESTCASE_TAG {
            let mut attributes = read_attributes(start)?;
            let mut test_case = TestCase::new(
                attributes.shift_remove("name").unwrap_or_default(),
                Outcome::Passed,
            );
            test_case.classname = attributes.shift_remove("classname").unwrap_or_default();
            test_case.time = attributes.get("time").and_then(|time| parse_time(time));
            self.test_case = Some(test_case);
        } else if name == FAILURE_TAG || name == ERROR_TAG || name == SKIPPED_TAG {
            let Some(test_case) = &mut self.test_case else {
                return Ok(());
            };
            let mut attributes = read_attributes(start)?;
            let detail = Detail {
                message: attributes.shift_remove("message"),
                ty: attributes.shift_remove("type"),
                text: None,
            };
            // A failure takes precedence over a skip recorded for the same test case.
            if !test_case.outcome.is_unsuccessful() {
                test_case.outcome = if name == SKIPPED_TAG {
                    Outcome::Skipped(detail)
                } else if name == FAILURE_TAG {
                    Outcome::Failed(detail)
                } else {
                    Outcome::Errored(detail)
                };
                self.begin_text(TextTarget::Detail);
            }
        } else if name == SYSTEM_OUT_TAG {
            self.begin_text(TextTarget::SystemOut);
        } else if name == SYSTEM_ERR_TAG {
            self.begin_text(TextTarget::SystemErr);
        } else if name == PROPERTY_TAG {
            if let Some(open) = self.suites.last_mut() {
                let mut attributes = read_attributes(start)?;
                open.suite.properties.push((
                    attributes.shift_remove("name").unwrap_or_default(),
                    attributes.shift_remove("value").unwrap_or_default(),
                ));
            }
        }

        Ok(())
    }

    fn end_element(&mut self, name: &[u8]) {
        if name == TESTSUITE_TAG {
            if let Some(OpenSuite { index, suite }) = self.suites.pop() {
                self.report.test_suites.insert(index, suite);
            }
        } else if name == TESTCASE_TAG {
            if let Some(test_case) = self.test_case.take() {
                match self.suites.last_mut() {
                    Some(open) => open.suite.test_cases.push(test_case),
                    None => {
                        // A bare test case without an enclosing suite.
                        let mut suite = TestSuite::named("");
                        suite.test_cases.push(test_case);
                        self.report.test_suites.push(suite);
                    }
                }
            }
        } else if name == FAILURE_TAG || name == ERROR_TAG || name == SKIPPED_TAG {
            if self.target != TextTarget::Detail {
                return;
            }
            let text = self.end_text();
            if let Some(test_case) = &mut self.test_case
                && let Some(detail) = test_case.outcome.detail_mut()
            {
                detail.text = text;
            }
        } else if name == SYSTEM_OUT_TAG || name == SYSTEM_ERR_TAG {
            let is_out = name == SYSTEM_OUT_TAG;
            let Some(text) = self.end_text() else {
                return;
            };
            let output = Some(strip_control_chars(&text));
            match (&mut self.test_case, self.suites.last_mut()) {
                (Some(test_case), _) if is_out => test_case.system_out = output,
                (Some(test_case), _) => test_case.system_err = output,
                (None, Some(open)) if is_out => open.suite.system_out = output,
                (None, Some(open)) => open.suite.system_err = output,
                (None, None) => {}
            }
        }
    }

    fn begin_text(&mut self, target: TextTarget) {
        self.target = target;
        self.text.clear();
    }

    /// Stops collecting text, returning what was collected if it's non-empty.
    fn end_text(&mut self) -> Option<String> {
        self.target = TextTarget::None;
        if self.text.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.text))
        }
    }

    fn finish(mut self) -> Result<Report, DeserializeError> {
        if !self.seen_root && self.report.test_suites.is_empty() {
            return Err(DeserializeError::NoReport);
        }
        // Tolerate truncated documents by closing any suites left open.
        while let Some(OpenSuite { index, suite }) = self.suites.pop() {
            self.report.test_suites.insert(index, suite);
        }
        Ok(self.report)
    }
}

fn read_attributes(start: &BytesStart<'_>) -> Result<IndexMap<String, String>, quick_xml::Error> {
    let mut attributes = IndexMap::new();
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        attributes.insert(key, value);
    }
    Ok(attributes)
}

// Times are in seconds, possibly fractional. Some tools emit thousands separators.
fn parse_time(time: &str) -> Option<Duration> {
    let time = time.trim().replace(',', "");
    match time.parse::<f64>() {
        Ok(secs) => match Duration::try_from_secs_f64(secs) {
            Ok(duration) => Some(duration),
            Err(error) => {
                tracing::debug!("ignoring out-of-range time attribute `{time}`: {error}");
                None
            }
        },
        Err(_) => {
            tracing::debug!("ignoring unparseable time attribute `{time}`");
            None
        }
    }
}

fn parse_timestamp(timestamp: &str) -> Option<DateTime<FixedOffset>> {
    let timestamp = timestamp.trim();
    DateTime::parse_from_rfc3339(timestamp)
        .or_else(|_| {
            // JUnit timestamps frequently lack a time zone; treat them as UTC.
            chrono::NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| naive.and_utc().fixed_offset())
        })
        .ok()
}
