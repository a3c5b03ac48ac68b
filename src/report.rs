use std::io::Write;

use crate::constants::DETAIL_LINE_COUNT;
use crate::types::{CaseStatus, ProjectGrade, TestSuite};
use crate::utils::first_lines;

/// Human-readable summary of a graded suite.
pub struct Report<'a> {
    suite: &'a TestSuite,
    grade: &'a ProjectGrade<'a>,
}

impl<'a> Report<'a> {
    pub fn new(suite: &'a TestSuite, grade: &'a ProjectGrade<'a>) -> Self {
        Self { suite, grade }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(
            out,
            "Score: {} / {}",
            self.grade.graded_points, self.grade.total_points
        )?;
        writeln!(out, "Test: {}", self.suite.name)?;
        writeln!(out, "Test Cases           : {}", self.suite.tests)?;
        writeln!(
            out,
            "Test Failures/Errors : {}",
            self.suite.reported_non_successes()
        )?;

        for (test_case, case_grade) in &self.grade.cases {
            match case_grade.status {
                CaseStatus::Ok => {
                    writeln!(out, "Test case: {}...[{}]", test_case.name, case_grade.status)?;
                }
                CaseStatus::Fail => {
                    writeln!(
                        out,
                        "Test case: {}...[{}] ({})",
                        test_case.name, case_grade.status, case_grade.score_delta()
                    )?;
                    match test_case.detail_text() {
                        Some(text) => writeln!(out, "{}", first_lines(text, DETAIL_LINE_COUNT))?,
                        None => writeln!(
                            out,
                            "\tUnexpected missing failure details for {}",
                            test_case.name
                        )?,
                    }
                }
            }
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}
