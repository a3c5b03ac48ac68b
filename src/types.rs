use std::fmt;

/// The root `testsuite` element of a JUnit report together with every
/// `testcase` found beneath it, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSuite {
    pub name: String,
    /// The `tests` attribute exactly as written in the report.
    pub tests: String,
    pub failures: i64,
    pub errors: i64,
    pub skipped: Option<i64>,
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    /// Failures and errors as reported on the root element.
    pub fn reported_non_successes(&self) -> i128 {
        i128::from(self.failures) + i128::from(self.errors)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub failure: Option<Detail>,
    pub error: Option<Detail>,
}

impl TestCase {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_failure(mut self, detail: Detail) -> Self {
        self.failure = Some(detail);
        self
    }

    pub fn with_error(mut self, detail: Detail) -> Self {
        self.error = Some(detail);
        self
    }

    /// True when a `failure` or `error` element is attached, whatever its content.
    pub fn is_failing(&self) -> bool {
        self.failure.is_some() || self.error.is_some()
    }

    /// Text to show for a failing case: the failure's text, else the error's.
    pub fn detail_text(&self) -> Option<&str> {
        self.failure
            .as_ref()
            .and_then(|d| d.text.as_deref())
            .or_else(|| self.error.as_ref().and_then(|d| d.text.as_deref()))
    }
}

/// Body of a `failure` or `error` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detail {
    pub message: Option<String>,
    pub r#type: Option<String>,
    pub text: Option<String>,
}

impl Detail {
    pub fn with_text<T: Into<String>>(text: T) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    Ok,
    Fail,
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseStatus::Ok => write!(f, "OK"),
            CaseStatus::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseGrade {
    pub status: CaseStatus,
    pub points_lost: i64,
}

impl CaseGrade {
    pub const OK: CaseGrade = CaseGrade {
        status: CaseStatus::Ok,
        points_lost: 0,
    };

    pub fn fail(points_lost: i64) -> Self {
        CaseGrade {
            status: CaseStatus::Fail,
            points_lost,
        }
    }

    /// Points lost as a score delta, e.g. `-2` for a failing base case.
    pub fn score_delta(&self) -> i128 {
        -i128::from(self.points_lost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradingOptions {
    pub total_points: i64,
    pub base_case_points: i64,
    pub extended_case_points: i64,
}

impl Default for GradingOptions {
    fn default() -> Self {
        Self {
            total_points: crate::constants::DEFAULT_TOTAL_POINTS,
            base_case_points: crate::constants::DEFAULT_BASE_CASE_POINTS,
            extended_case_points: crate::constants::DEFAULT_EXTENDED_CASE_POINTS,
        }
    }
}

/// Result of grading a whole suite. `graded_points` may be negative and is
/// widened to `i128` so that extreme point values cannot overflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectGrade<'a> {
    pub total_points: i64,
    pub graded_points: i128,
    pub cases: Vec<(&'a TestCase, CaseGrade)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_text_prefers_failure() {
        let case = TestCase::new("base_a")
            .with_failure(Detail::with_text("expected 1"))
            .with_error(Detail::with_text("boom"));
        assert_eq!(case.detail_text(), Some("expected 1"));
    }

    #[test]
    fn test_detail_text_falls_back_to_error() {
        let case = TestCase::new("ext_b")
            .with_failure(Detail::default())
            .with_error(Detail::with_text("boom"));
        assert!(case.is_failing());
        assert_eq!(case.detail_text(), Some("boom"));
    }

    #[test]
    fn test_empty_detail_still_failing() {
        let case = TestCase::new("ext_c").with_failure(Detail::default());
        assert!(case.is_failing());
        assert_eq!(case.detail_text(), None);
    }

    #[test]
    fn test_extreme_counts_do_not_overflow() {
        let suite = TestSuite {
            failures: i64::MAX,
            errors: i64::MAX,
            ..Default::default()
        };
        assert_eq!(suite.reported_non_successes(), 2 * i128::from(i64::MAX));
        assert_eq!(
            CaseGrade::fail(i64::MIN).score_delta(),
            -i128::from(i64::MIN)
        );
    }

    #[test]
    fn test_status_display() {
        assert_eq!(CaseStatus::Ok.to_string(), "OK");
        assert_eq!(CaseStatus::Fail.to_string(), "FAIL");
    }
}
