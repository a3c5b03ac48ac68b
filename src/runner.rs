use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::grader::grade_suite;
use crate::junit::parser::{JunitParseError, JunitParser};
use crate::report::Report;
use crate::types::{GradingOptions, TestSuite};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not open test results file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse test results file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: JunitParseError,
    },
}

/// Reads and parses the report at `path`. The file is closed before returning.
pub fn load_test_suite<T: AsRef<Path>>(path: T) -> Result<TestSuite, LoadError> {
    let path = path.as_ref();
    log::info!("Loading test results from {:?}", path);
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut junit_parser = JunitParser::new();
    junit_parser
        .parse(BufReader::new(file))
        .map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    for issue in junit_parser.issues() {
        log::warn!("{}: {}", path.display(), issue);
    }
    let test_suite = junit_parser
        .into_test_suite()
        .map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let parsed_cases = test_suite.cases.len();
    if test_suite
        .tests
        .trim()
        .parse::<usize>()
        .is_ok_and(|reported| reported != parsed_cases)
    {
        log::warn!(
            "Test suite {} reports {} tests but {} test cases were found",
            test_suite.name,
            test_suite.tests,
            parsed_cases
        );
    }
    let failing_cases = test_suite.cases.iter().filter(|c| c.is_failing()).count();
    if test_suite.reported_non_successes() != failing_cases as i128 {
        log::warn!(
            "Test suite {} reports {} failures/errors but {} failing test cases were found",
            test_suite.name,
            test_suite.reported_non_successes(),
            failing_cases
        );
    }
    Ok(test_suite)
}

/// Loads, grades and reports the file at `path`, returning the graded points.
pub fn run_grade<T: AsRef<Path>, W: Write>(
    path: T,
    options: &GradingOptions,
    out: &mut W,
) -> anyhow::Result<i128> {
    let test_suite = load_test_suite(path)?;
    let project_grade = grade_suite(&test_suite, options);
    log::info!(
        "Graded {} test cases: {} / {}",
        project_grade.cases.len(),
        project_grade.graded_points,
        project_grade.total_points
    );
    Report::new(&test_suite, &project_grade).write_to(out)?;
    out.flush()?;
    Ok(project_grade.graded_points)
}
