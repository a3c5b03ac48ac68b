pub const DEFAULT_TOTAL_POINTS: i64 = 30;
pub const DEFAULT_BASE_CASE_POINTS: i64 = 2;
pub const DEFAULT_EXTENDED_CASE_POINTS: i64 = 1;
pub const DEFAULT_TEST_RESULTS_FILE: &str = "test-results.xml";

/// Test cases whose name starts with this prefix are graded as base cases.
pub const BASE_CASE_PREFIX: &str = "base_";

/// Number of detail text lines shown under a failing test case.
pub const DETAIL_LINE_COUNT: usize = 3;

pub const JUNIT_GRADER_LOG_ENV: &str = "JUNIT_GRADER_LOG";

pub const EXIT_SUCCESS: i32 = exitcode::OK;
pub const EXIT_FAILURE: i32 = exitcode::SOFTWARE;
