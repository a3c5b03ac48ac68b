use std::{fmt, io::BufRead};

use quick_xml::{
    events::{BytesStart, BytesText, Event},
    Reader,
};
use thiserror::Error;

use crate::types::{Detail, TestCase, TestSuite};

const TAG_TEST_CASE: &[u8] = b"testcase";
const TAG_TEST_CASE_STATUS_FAILURE: &[u8] = b"failure";
const TAG_TEST_CASE_STATUS_ERROR: &[u8] = b"error";

/// Problems that stop the report from being graded at all.
#[derive(Error, Debug)]
pub enum JunitParseError {
    #[error("malformed XML near byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    #[error("no root element found")]
    RootNotFound,
    #[error("multiple root elements found")]
    RootMultipleFound,
    #[error("document ended before element `{0}` was closed")]
    UnclosedElement(String),
    #[error("could not parse attribute `{attribute}` value {value:?} as an integer")]
    InvalidCount { attribute: &'static str, value: String },
}

/// Problems that are worth reporting but do not change how the report is graded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JunitParseIssue {
    TestCaseName,
    SkippedCount(String),
    DetailWithoutTestCase(DetailKind),
    DuplicateDetail(String, DetailKind),
}

impl fmt::Display for JunitParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JunitParseIssue::TestCaseName => write!(f, "test case found without a name"),
            JunitParseIssue::SkippedCount(value) => {
                write!(f, "ignoring non-integer skipped count {:?}", value)
            }
            JunitParseIssue::DetailWithoutTestCase(kind) => {
                write!(f, "{} found without a test case", kind)
            }
            JunitParseIssue::DuplicateDetail(name, kind) => write!(
                f,
                "test case `{}` has more than one {}, only the first is kept",
                name, kind
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailKind {
    Failure,
    Error,
}

impl fmt::Display for DetailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailKind::Failure => write!(f, "failure"),
            DetailKind::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenTestCase {
    depth: usize,
    index: usize,
}

#[derive(Debug, Clone)]
struct OpenDetail {
    depth: usize,
    kind: DetailKind,
    targets: Vec<usize>,
    first_child_seen: bool,
    detail: Detail,
}

/// Converts a JUnit report into a [`TestSuite`] in a single pass.
///
/// The root element supplies the suite attributes whatever its tag is, and
/// every `testcase` below it becomes a case in document order, nested ones
/// included. A `failure` or `error` belongs to every test case enclosing it,
/// and each case keeps only the first of each kind. The detail text is the
/// raw first child node of the element when that node is text or CDATA.
#[derive(Debug, Clone, Default)]
pub struct JunitParser {
    issues: Vec<JunitParseIssue>,
    depth: usize,
    open_tags: Vec<String>,
    test_suite: Option<TestSuite>,
    root_closed: bool,
    open_test_cases: Vec<OpenTestCase>,
    current_detail: Option<OpenDetail>,
}

impl JunitParser {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn issues(&self) -> &Vec<JunitParseIssue> {
        &self.issues
    }

    pub fn into_test_suite(self) -> Result<TestSuite, JunitParseError> {
        self.test_suite.ok_or(JunitParseError::RootNotFound)
    }

    pub fn parse<R: BufRead>(&mut self, xml: R) -> Result<(), JunitParseError> {
        let mut reader = Reader::from_reader(xml);
        // Detail bodies are reported as written, leading whitespace included.
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|source| JunitParseError::Xml {
                    position: reader.buffer_position() as u64,
                    source,
                })?;
            if self.match_event(event)?.is_none() {
                break;
            }
            buf.clear();
        }

        if let Some(tag) = self.open_tags.pop() {
            return Err(JunitParseError::UnclosedElement(tag));
        }
        if self.test_suite.is_none() {
            return Err(JunitParseError::RootNotFound);
        }

        Ok(())
    }

    fn match_event(&mut self, event: Event) -> Result<Option<()>, JunitParseError> {
        match event {
            Event::Eof => return Ok(None),
            Event::Start(e) => {
                self.mark_detail_child();
                self.open_element(&e)?;
                self.open_tags
                    .push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                self.depth += 1;
            }
            Event::End(e) => {
                self.open_tags.pop();
                self.depth = self.depth.saturating_sub(1);
                self.close_element(e.name().as_ref());
            }
            Event::Empty(e) => {
                self.mark_detail_child();
                self.open_element(&e)?;
                self.close_element(e.name().as_ref());
            }
            Event::CData(e) => {
                if let Ok(e) = e.minimal_escape() {
                    self.match_text(&e);
                } else {
                    self.mark_detail_child();
                }
            }
            Event::Text(e) => {
                self.match_text(&e);
            }
            Event::Comment(_) | Event::PI(_) => self.mark_detail_child(),
            _ => (),
        };
        Ok(Some(()))
    }

    fn open_element(&mut self, e: &BytesStart) -> Result<(), JunitParseError> {
        if self.depth == 0 {
            return self.open_root(e);
        }
        match e.name().as_ref() {
            TAG_TEST_CASE => self.open_test_case(e),
            TAG_TEST_CASE_STATUS_FAILURE => self.open_detail(e, DetailKind::Failure),
            TAG_TEST_CASE_STATUS_ERROR => self.open_detail(e, DetailKind::Error),
            _ => (),
        }
        Ok(())
    }

    fn close_element(&mut self, tag: &[u8]) {
        if self.depth == 0 {
            self.root_closed = true;
            return;
        }
        match tag {
            TAG_TEST_CASE => self.close_test_case(),
            TAG_TEST_CASE_STATUS_FAILURE | TAG_TEST_CASE_STATUS_ERROR => self.close_detail(),
            _ => (),
        }
    }

    fn open_root(&mut self, e: &BytesStart) -> Result<(), JunitParseError> {
        if self.root_closed || self.test_suite.is_some() {
            return Err(JunitParseError::RootMultipleFound);
        }
        let skipped = match parse_attr::string(e, "skipped") {
            None => None,
            Some(value) => match parse_attr::int(&value) {
                Some(count) => Some(count),
                None => {
                    self.issues.push(JunitParseIssue::SkippedCount(value));
                    None
                }
            },
        };
        self.test_suite = Some(TestSuite {
            name: parse_attr::string(e, "name").unwrap_or_default(),
            tests: parse_attr::string(e, "tests").unwrap_or_default(),
            failures: parse_attr::count(e, "failures")?,
            errors: parse_attr::count(e, "errors")?,
            skipped,
            cases: Vec::new(),
        });
        Ok(())
    }

    fn open_test_case(&mut self, e: &BytesStart) {
        let Some(test_suite) = self.test_suite.as_mut() else {
            return;
        };
        let test_case_name = parse_attr::string(e, "name").unwrap_or_default();
        if test_case_name.is_empty() {
            self.issues.push(JunitParseIssue::TestCaseName);
        }
        // Cases are listed in the order their start tags appear.
        test_suite.cases.push(TestCase::new(test_case_name));
        self.open_test_cases.push(OpenTestCase {
            depth: self.depth,
            index: test_suite.cases.len() - 1,
        });
    }

    fn close_test_case(&mut self) {
        if self
            .open_test_cases
            .last()
            .is_some_and(|open| open.depth == self.depth)
        {
            self.open_test_cases.pop();
        }
    }

    fn open_detail(&mut self, e: &BytesStart, kind: DetailKind) {
        let (Some(innermost), Some(test_suite)) =
            (self.open_test_cases.last(), self.test_suite.as_ref())
        else {
            self.issues.push(JunitParseIssue::DetailWithoutTestCase(kind));
            return;
        };
        if self.current_detail.is_some() {
            // A failure nested in an error (or the reverse) is ignored.
            return;
        }
        let targets: Vec<usize> = self
            .open_test_cases
            .iter()
            .map(|open| open.index)
            .filter(|&index| !has_detail(&test_suite.cases[index], kind))
            .collect();
        if has_detail(&test_suite.cases[innermost.index], kind) {
            self.issues.push(JunitParseIssue::DuplicateDetail(
                test_suite.cases[innermost.index].name.clone(),
                kind,
            ));
        }
        if targets.is_empty() {
            return;
        }
        self.current_detail = Some(OpenDetail {
            depth: self.depth,
            kind,
            targets,
            first_child_seen: false,
            detail: Detail {
                message: parse_attr::string(e, "message"),
                r#type: parse_attr::string(e, "type"),
                text: None,
            },
        });
    }

    fn close_detail(&mut self) {
        let closes_current = self
            .current_detail
            .as_ref()
            .is_some_and(|open| open.depth == self.depth);
        if !closes_current {
            return;
        }
        if let (Some(open), Some(test_suite)) =
            (self.current_detail.take(), self.test_suite.as_mut())
        {
            for index in open.targets {
                let test_case = &mut test_suite.cases[index];
                let slot = match open.kind {
                    DetailKind::Failure => &mut test_case.failure,
                    DetailKind::Error => &mut test_case.error,
                };
                *slot = Some(open.detail.clone());
            }
        }
    }

    /// Records that the open detail element already has its first child node.
    fn mark_detail_child(&mut self) {
        if let Some(open) = self.current_detail.as_mut() {
            if open.depth + 1 == self.depth {
                open.first_child_seen = true;
            }
        }
    }

    fn match_text(&mut self, e: &BytesText) {
        if let Some(open) = self.current_detail.as_mut() {
            if open.depth + 1 != self.depth || open.first_child_seen {
                return;
            }
            open.first_child_seen = true;
            if let Ok(text) = e.unescape() {
                open.detail.text = Some(text.into_owned());
            }
        }
    }
}

fn has_detail(test_case: &TestCase, kind: DetailKind) -> bool {
    match kind {
        DetailKind::Failure => test_case.failure.is_some(),
        DetailKind::Error => test_case.error.is_some(),
    }
}

mod parse_attr {
    use std::borrow::Cow;

    use quick_xml::events::BytesStart;

    use super::JunitParseError;

    /// A missing count is zero, a present one must be an integer.
    pub fn count(e: &BytesStart, attr_name: &'static str) -> Result<i64, JunitParseError> {
        match string(e, attr_name) {
            None => Ok(0),
            Some(value) => int(&value).ok_or(JunitParseError::InvalidCount {
                attribute: attr_name,
                value,
            }),
        }
    }

    /// Parses a decimal integer the way report generators write them: optional
    /// surrounding whitespace, an optional sign, and `_` allowed between digits.
    pub fn int(value: &str) -> Option<i64> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix(|c| c == '+' || c == '-')
            .unwrap_or(trimmed);
        if digits.is_empty()
            || digits.starts_with('_')
            || digits.ends_with('_')
            || digits.contains("__")
            || !digits.chars().all(|c| c.is_ascii_digit() || c == '_')
        {
            return None;
        }
        trimmed.replace('_', "").parse::<i64>().ok()
    }

    pub fn string(e: &BytesStart, attr_name: &'static str) -> Option<String> {
        e.try_get_attribute(attr_name)
            .ok()
            .flatten()
            .and_then(|attr| attr.unescape_value().ok().map(Cow::into_owned))
    }
}
