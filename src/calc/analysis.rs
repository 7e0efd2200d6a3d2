use serde::Serialize;

use super::grade;
use super::model::{FormLevel, Mark, StudentMarks, Subject};
use super::round_off_1_decimal;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAnalysis {
    pub subject: Subject,
    pub average: f64,
    pub student_count: usize,
    pub min_mark: Mark,
    pub max_mark: Mark,
    /// Percentage of sitters at or above the form's pass mark.
    pub pass_rate: f64,
}

/// Per-subject statistics for a cohort, best average first. Subjects nobody
/// sat are left out.
pub fn subject_analysis(students: &[StudentMarks], form: FormLevel) -> Vec<SubjectAnalysis> {
    let mut out: Vec<SubjectAnalysis> = Vec::new();
    for subject in Subject::ALL {
        let marks: Vec<Mark> = students.iter().filter_map(|s| s.mark(subject)).collect();
        let (Some(min_mark), Some(max_mark)) = (marks.iter().min(), marks.iter().max()) else {
            continue;
        };
        let n = marks.len() as f64;
        let sum: u32 = marks.iter().map(|m| u32::from(m.value())).sum();
        let passed = marks
            .iter()
            .filter(|m| grade::subject_passed(**m, form))
            .count();
        out.push(SubjectAnalysis {
            subject,
            average: round_off_1_decimal(f64::from(sum) / n),
            student_count: marks.len(),
            min_mark: *min_mark,
            max_mark: *max_mark,
            pass_rate: round_off_1_decimal(100.0 * passed as f64 / n),
        });
    }
    out.sort_by(|a, b| b.average.total_cmp(&a.average));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::summary::tests::student;

    #[test]
    fn stats_per_subject_with_form_threshold() {
        let students = vec![
            student("a", FormLevel::Three, &[(Subject::English, 40), (Subject::Physics, 90)]),
            student("b", FormLevel::Three, &[(Subject::English, 39), (Subject::Physics, 70)]),
            student("c", FormLevel::Three, &[(Subject::English, 80)]),
        ];
        let rows = subject_analysis(&students, FormLevel::Three);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].subject, Subject::Physics);
        assert_eq!(rows[0].average, 80.0);
        assert_eq!(rows[0].student_count, 2);
        assert_eq!(rows[0].pass_rate, 100.0);

        let eng = &rows[1];
        assert_eq!(eng.subject, Subject::English);
        assert_eq!(eng.average, 53.0);
        assert_eq!(eng.min_mark.value(), 39);
        assert_eq!(eng.max_mark.value(), 80);
        assert_eq!(eng.pass_rate, 66.7);
    }

    #[test]
    fn equal_averages_keep_catalog_order() {
        let students = vec![student(
            "a",
            FormLevel::One,
            &[(Subject::Physics, 70), (Subject::Biology, 70)],
        )];
        let rows = subject_analysis(&students, FormLevel::One);
        assert_eq!(rows[0].subject, Subject::Biology);
        assert_eq!(rows[1].subject, Subject::Physics);
        assert_eq!(rows[0].pass_rate, 100.0);
    }
}
