use crate::constants::BASE_CASE_PREFIX;
use crate::types::{CaseGrade, GradingOptions, ProjectGrade, TestCase, TestSuite};

/// Grades a single test case.
///
/// A case fails when a `failure` or `error` element is attached to it, even
/// an empty one. Failing base cases (`base_` prefix) lose `base_case_points`,
/// every other failing case loses `extended_case_points`.
pub fn grade_case(
    test_case: &TestCase,
    base_case_points: i64,
    extended_case_points: i64,
) -> CaseGrade {
    if !test_case.is_failing() {
        return CaseGrade::OK;
    }
    if test_case.name.starts_with(BASE_CASE_PREFIX) {
        CaseGrade::fail(base_case_points)
    } else {
        CaseGrade::fail(extended_case_points)
    }
}

/// Total points minus what every failing case lost. Not clamped at zero.
pub fn grade_project<'a, I>(
    test_cases: I,
    total_points: i64,
    base_case_points: i64,
    extended_case_points: i64,
) -> i128
where
    I: IntoIterator<Item = &'a TestCase>,
{
    deduct(
        total_points,
        test_cases
            .into_iter()
            .map(|test_case| grade_case(test_case, base_case_points, extended_case_points)),
    )
}

/// Grades every case of `suite` and keeps the per-case results for reporting.
pub fn grade_suite<'a>(suite: &'a TestSuite, options: &GradingOptions) -> ProjectGrade<'a> {
    let cases: Vec<(&TestCase, CaseGrade)> = suite
        .cases
        .iter()
        .map(|test_case| {
            let grade = grade_case(
                test_case,
                options.base_case_points,
                options.extended_case_points,
            );
            log::debug!(
                "Graded test case {}: {} ({})",
                test_case.name,
                grade.status,
                grade.score_delta()
            );
            (test_case, grade)
        })
        .collect();
    let graded_points = deduct(options.total_points, cases.iter().map(|(_, grade)| *grade));
    ProjectGrade {
        total_points: options.total_points,
        graded_points,
        cases,
    }
}

// Summed in i128: one i64 deduction per case cannot overflow it for any
// case count that fits in memory.
fn deduct<I: IntoIterator<Item = CaseGrade>>(total_points: i64, grades: I) -> i128 {
    grades
        .into_iter()
        .fold(i128::from(total_points), |graded_points, grade| {
            graded_points + grade.score_delta()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CaseStatus, Detail};

    fn failing(name: &str) -> TestCase {
        TestCase::new(name).with_failure(Detail::with_text("expected true"))
    }

    fn erroring(name: &str) -> TestCase {
        TestCase::new(name).with_error(Detail::with_text("NullPointerException"))
    }

    #[test]
    fn test_passing_case_loses_nothing() {
        for name in ["base_a", "ext_a", ""] {
            assert_eq!(grade_case(&TestCase::new(name), 5, 3), CaseGrade::OK);
        }
    }

    #[test]
    fn test_failing_base_case() {
        let grade = grade_case(&failing("base_foo"), 5, 3);
        assert_eq!(grade.status, CaseStatus::Fail);
        assert_eq!(grade.points_lost, 5);
    }

    #[test]
    fn test_erroring_extended_case() {
        assert_eq!(grade_case(&erroring("ext_bar"), 5, 3), CaseGrade::fail(3));
    }

    #[test]
    fn test_prefix_is_case_sensitive_and_anchored() {
        assert_eq!(grade_case(&failing("Base_foo"), 5, 3), CaseGrade::fail(3));
        assert_eq!(grade_case(&failing("test_base_foo"), 5, 3), CaseGrade::fail(3));
        assert_eq!(grade_case(&failing("base"), 5, 3), CaseGrade::fail(3));
        assert_eq!(grade_case(&failing("base_"), 5, 3), CaseGrade::fail(5));
    }

    #[test]
    fn test_empty_detail_still_deducts() {
        let test_case = TestCase::new("base_empty").with_failure(Detail::default());
        assert_eq!(grade_case(&test_case, 2, 1), CaseGrade::fail(2));
    }

    #[test]
    fn test_failure_and_error_deduct_once() {
        let test_case = failing("ext_both").with_error(Detail::default());
        assert_eq!(grade_case(&test_case, 2, 1), CaseGrade::fail(1));
    }

    #[test]
    fn test_empty_project_keeps_total() {
        assert_eq!(grade_project(&Vec::<TestCase>::new(), 30, 2, 1), 30);
    }

    #[test]
    fn test_project_grade_sums_deductions() {
        let cases = vec![failing("base_a"), erroring("ext_b"), TestCase::new("ext_c")];
        assert_eq!(grade_project(&cases, 30, 2, 1), 27);
        // Same inputs, same answer.
        assert_eq!(grade_project(&cases, 30, 2, 1), 27);

        let expected = cases
            .iter()
            .map(|c| i128::from(grade_case(c, 7, 4).points_lost))
            .sum::<i128>();
        assert_eq!(grade_project(&cases, 100, 7, 4), 100 - expected);
    }

    #[test]
    fn test_project_grade_can_go_negative() {
        let cases: Vec<TestCase> = (0..20).map(|i| failing(&format!("base_{i}"))).collect();
        assert_eq!(grade_project(&cases, 30, 2, 1), -10);
    }

    #[test]
    fn test_project_grade_at_extreme_points() {
        let cases = vec![failing("base_a"), erroring("ext_b")];
        assert_eq!(
            grade_project(&cases, i64::MIN, 1, 1),
            i128::from(i64::MIN) - 2
        );
        assert_eq!(
            grade_project(&cases, 0, i64::MIN, i64::MIN),
            -2 * i128::from(i64::MIN)
        );
        assert_eq!(
            grade_project(&cases, i64::MAX, i64::MIN, i64::MIN),
            i128::from(i64::MAX) - 2 * i128::from(i64::MIN)
        );
    }

    #[test]
    fn test_grade_suite_keeps_document_order() {
        let suite = TestSuite {
            name: String::from("QuizActivityTest"),
            tests: String::from("3"),
            failures: 1,
            errors: 1,
            cases: vec![failing("base_a"), erroring("ext_b"), TestCase::new("ext_c")],
            ..Default::default()
        };
        let project_grade = grade_suite(&suite, &GradingOptions::default());
        assert_eq!(project_grade.total_points, 30);
        assert_eq!(project_grade.graded_points, 27);
        assert_eq!(
            project_grade
                .cases
                .iter()
                .map(|(c, g)| (c.name.as_str(), g.points_lost))
                .collect::<Vec<_>>(),
            vec![("base_a", 2), ("ext_b", 1), ("ext_c", 0)]
        );
    }
}
