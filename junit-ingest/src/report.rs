// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{deserialize::deserialize_report, errors::DeserializeError};
use chrono::{DateTime, FixedOffset};
use std::{io, time::Duration};

/// A parsed JUnit XML document.
///
/// Both `<testsuites>` and bare `<testsuite>` roots are accepted. In the latter case the report
/// has no name and a single top-level suite.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// The `name` attribute of the `<testsuites>` root, if any.
    pub name: String,

    /// When the run started, if recorded.
    pub timestamp: Option<DateTime<FixedOffset>>,

    /// The `time` attribute of the root, in seconds in the XML.
    pub time: Option<Duration>,

    /// All suites in the document, nested suites flattened after their parents.
    pub test_suites: Vec<TestSuite>,
}

impl Report {
    /// Returns every test case in document order, along with the suite containing it.
    pub fn test_cases(&self) -> impl Iterator<Item = (&TestSuite, &TestCase)> + '_ {
        self.test_suites
            .iter()
            .flat_map(|suite| suite.test_cases.iter().map(move |case| (suite, case)))
    }

    /// Counts outcomes across all suites.
    ///
    /// Counts are always computed from the test cases present. The `tests`/`failures`
    /// attributes some tools write are not trusted.
    pub fn tally(&self) -> Tally {
        self.test_suites
            .iter()
            .fold(Tally::default(), |acc, suite| acc + suite.tally())
    }

    /// Deserializes a report from the given reader.
    pub fn deserialize(reader: impl io::BufRead) -> Result<Self, DeserializeError> {
        deserialize_report(reader)
    }

    /// Deserializes a report from a string.
    pub fn from_xml_str(xml: &str) -> Result<Self, DeserializeError> {
        Self::deserialize(xml.as_bytes())
    }
}

/// A `<testsuite>` element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestSuite {
    /// The `name` attribute, or empty if absent.
    pub name: String,

    /// The machine the suite ran on, if recorded.
    pub hostname: Option<String>,

    /// When the suite started, if recorded.
    pub timestamp: Option<DateTime<FixedOffset>>,

    /// The overall time taken by the suite.
    pub time: Option<Duration>,

    /// `<property>` name/value pairs, in document order.
    pub properties: Vec<(String, String)>,

    /// The test cases directly inside this suite, in document order.
    pub test_cases: Vec<TestCase>,

    /// Standard output captured at the suite level rather than for a single case.
    pub system_out: Option<String>,

    /// Standard error captured at the suite level.
    pub system_err: Option<String>,
}

impl TestSuite {
    pub(crate) fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Counts the outcomes of this suite's test cases.
    pub fn tally(&self) -> Tally {
        self.test_cases
            .iter()
            .fold(Tally::default(), |mut acc, case| {
                acc.tests += 1;
                match case.outcome {
                    Outcome::Passed => {}
                    Outcome::Failed(_) => acc.failures += 1,
                    Outcome::Errored(_) => acc.errors += 1,
                    Outcome::Skipped(_) => acc.skipped += 1,
                }
                acc
            })
    }
}

/// Outcome counts for a suite or report.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    /// The number of test cases.
    pub tests: usize,

    /// Test cases that ended with a `<failure>`.
    pub failures: usize,

    /// Test cases that ended with an `<error>`.
    pub errors: usize,

    /// Test cases that were skipped.
    pub skipped: usize,
}

impl std::ops::Add for Tally {
    type Output = Tally;

    fn add(self, other: Tally) -> Tally {
        Tally {
            tests: self.tests + other.tests,
            failures: self.failures + other.failures,
            errors: self.errors + other.errors,
            skipped: self.skipped + other.skipped,
        }
    }
}

/// A `<testcase>` element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestCase {
    /// The `name` attribute, or empty if absent.
    pub name: String,

    /// The `classname` attribute, or empty if absent.
    ///
    /// Go and JVM reporters store the package or class here, so together with `name` it
    /// locates the test.
    pub classname: String,

    /// The time it took to run the test.
    pub time: Option<Duration>,

    /// How the test ended.
    pub outcome: Outcome,

    /// Standard output captured while the test ran, with control characters removed.
    pub system_out: Option<String>,

    /// Standard error captured while the test ran, with control characters removed.
    pub system_err: Option<String>,
}

impl TestCase {
    /// Creates a test case with no classname, time or output.
    pub fn new(name: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            name: name.into(),
            classname: String::new(),
            time: None,
            outcome,
            system_out: None,
            system_err: None,
        }
    }
}

/// How a test case ended.
///
/// A case with both a `<skipped>` and a `<failure>`/`<error>` child is treated as not passing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// No `<failure>`, `<error>` or `<skipped>` child.
    Passed,

    /// A `<failure>` child: the test ran and an assertion did not hold.
    Failed(Detail),

    /// An `<error>` child: the test could not complete.
    Errored(Detail),

    /// A `<skipped>` child.
    Skipped(Detail),
}

impl Outcome {
    /// Returns the detail element's contents, or `None` for a passing test.
    pub fn detail(&self) -> Option<&Detail> {
        match self {
            Outcome::Passed => None,
            Outcome::Failed(detail) | Outcome::Errored(detail) | Outcome::Skipped(detail) => {
                Some(detail)
            }
        }
    }

    pub(crate) fn detail_mut(&mut self) -> Option<&mut Detail> {
        match self {
            Outcome::Passed => None,
            Outcome::Failed(detail) | Outcome::Errored(detail) | Outcome::Skipped(detail) => {
                Some(detail)
            }
        }
    }

    /// Returns true for `Failed` and `Errored`.
    pub fn is_unsuccessful(&self) -> bool {
        matches!(self, Outcome::Failed(_) | Outcome::Errored(_))
    }
}

/// Contents of a `<failure>`, `<error>` or `<skipped>` element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Detail {
    /// The `message` attribute.
    pub message: Option<String>,

    /// The `type` attribute, e.g. an exception class.
    pub ty: Option<String>,

    /// The element's text, typically a stack trace.
    pub text: Option<String>,
}

impl Detail {
    /// Creates a detail with just a message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Removes control characters other than tab, newline and carriage return.
///
/// Test output frequently contains terminal escapes, which no consumer of a report wants.
pub(crate) fn strip_control_chars(text: &str) -> String {
    text.replace(
        |c| matches!(c, '\x00'..='\x08' | '\x0b' | '\x0c' | '\x0e'..='\x1f'),
        "",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn suite(outcomes: impl IntoIterator<Item = Outcome>) -> TestSuite {
        let mut suite = TestSuite::named("suite");
        suite.test_cases = outcomes
            .into_iter()
            .enumerate()
            .map(|(i, outcome)| TestCase::new(format!("case-{i}"), outcome))
            .collect();
        suite
    }

    #[test]
    fn tally_counts_cases() {
        let suite = suite([
            Outcome::Passed,
            Outcome::Failed(Detail::with_message("boom")),
            Outcome::Errored(Detail::default()),
            Outcome::Skipped(Detail::default()),
        ]);
        assert_eq!(
            suite.tally(),
            Tally {
                tests: 4,
                failures: 1,
                errors: 1,
                skipped: 1
            }
        );

        let report = Report {
            test_suites: vec![suite.clone(), suite],
            ..Default::default()
        };
        assert_eq!(report.tally().tests, 8);
        assert_eq!(report.tally().failures, 2);
        assert_eq!(report.test_cases().count(), 8);
    }

    #[test]
    fn detail_access() {
        assert_eq!(Outcome::Passed.detail(), None);
        let failed = Outcome::Failed(Detail::with_message("boom"));
        assert_eq!(
            failed.detail().and_then(|d| d.message.as_deref()),
            Some("boom")
        );
        assert!(failed.is_unsuccessful());
        assert!(!Outcome::Skipped(Detail::default()).is_unsuccessful());
    }

    #[test]
    fn control_characters_are_stripped() {
        assert_eq!(
            strip_control_chars("a\x1b[31mred\x00\tb\r\n"),
            "a[31mred\tb\r\n"
        );
    }
}
