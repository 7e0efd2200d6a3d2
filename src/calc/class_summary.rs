use serde::Serialize;

use super::model::{Cohort, Mark, Status};
use super::ranking::CohortRanking;
use super::round_off_1_decimal;
use super::status::MIN_SUBJECTS_PASSED;

/// Why a student failed. English is checked before the subject count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureReason {
    EnglishOnly,
    InsufficientSubjects,
    Both,
}

impl FailureReason {
    fn classify(subjects_passed: usize, english_passed: bool) -> Self {
        match (subjects_passed >= MIN_SUBJECTS_PASSED, english_passed) {
            (true, false) => FailureReason::EnglishOnly,
            (false, true) => FailureReason::InsufficientSubjects,
            _ => FailureReason::Both,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassFailRow {
    pub student_id: String,
    pub name: String,
    pub position: usize,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<FailureReason>,
    pub subjects_passed: usize,
    pub english_passed: bool,
    pub english_mark: Option<Mark>,
    pub average: f64,
}

/// Class-level PASS/FAIL counts, with failures split by reason.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassFailSummary {
    pub cohort: Cohort,
    pub total_students: usize,
    pub passed_students: usize,
    pub failed_students: usize,
    pub failed_english_only: usize,
    pub failed_insufficient_subjects: usize,
    pub failed_both: usize,
    pub students: Vec<PassFailRow>,
}

/// Builds the summary from a cohort ranking; rows keep ranking order.
pub fn pass_fail_summary(ranking: &CohortRanking) -> PassFailSummary {
    let mut out = PassFailSummary {
        cohort: ranking.cohort.clone(),
        total_students: ranking.total_students,
        passed_students: 0,
        failed_students: 0,
        failed_english_only: 0,
        failed_insufficient_subjects: 0,
        failed_both: 0,
        students: Vec::with_capacity(ranking.rankings.len()),
    };

    for e in &ranking.rankings {
        let s = &e.summary;
        let failure_reason = match s.status {
            Status::Pass => {
                out.passed_students += 1;
                None
            }
            Status::Fail => {
                out.failed_students += 1;
                let reason = FailureReason::classify(s.subjects_passed, s.english_passed);
                match reason {
                    FailureReason::EnglishOnly => out.failed_english_only += 1,
                    FailureReason::InsufficientSubjects => out.failed_insufficient_subjects += 1,
                    FailureReason::Both => out.failed_both += 1,
                }
                Some(reason)
            }
        };
        out.students.push(PassFailRow {
            student_id: s.student_id.clone(),
            name: s.name.clone(),
            position: e.position,
            status: s.status,
            failure_reason,
            subjects_passed: s.subjects_passed,
            english_passed: s.english_passed,
            english_mark: s.english_mark,
            average: round_off_1_decimal(s.average),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::model::{FormLevel, Period, Subject};
    use crate::calc::ranking::rank_summaries;
    use crate::calc::summary::summarize;
    use crate::calc::summary::tests::{alice, brian, cathy, student};

    #[test]
    fn failures_split_into_english_subjects_and_both() {
        // Passes five subjects with English.
        let dora = student(
            "dora",
            FormLevel::One,
            &[
                (Subject::English, 60),
                (Subject::Mathematics, 60),
                (Subject::Biology, 60),
                (Subject::Chemistry, 60),
                (Subject::Physics, 60),
                (Subject::History, 30),
            ],
        );
        let students = vec![alice(), brian(), cathy(), dora];
        let ranking = rank_summaries(
            Cohort {
                form_level: FormLevel::One,
                period: Period::new("Term 1", "2024-2025").unwrap(),
                school_id: 1,
            },
            students.iter().map(summarize).collect(),
        );
        let summary = pass_fail_summary(&ranking);

        assert_eq!(summary.total_students, 4);
        assert_eq!(summary.passed_students, 1);
        assert_eq!(summary.failed_students, 3);
        assert_eq!(summary.failed_english_only, 1);
        assert_eq!(summary.failed_insufficient_subjects, 1);
        assert_eq!(summary.failed_both, 1);
        assert_eq!(
            summary.failed_english_only + summary.failed_insufficient_subjects + summary.failed_both,
            summary.failed_students
        );

        let reason = |id: &str| {
            summary
                .students
                .iter()
                .find(|r| r.student_id == id)
                .and_then(|r| r.failure_reason)
        };
        assert_eq!(reason("alice"), None);
        assert_eq!(reason("brian"), Some(FailureReason::EnglishOnly));
        assert_eq!(reason("dora"), Some(FailureReason::InsufficientSubjects));
        assert_eq!(reason("cathy"), Some(FailureReason::Both));

        assert_eq!(summary.students[0].student_id, "alice");
        assert_eq!(summary.students[0].average, 69.7);
        assert_eq!(summary.students[0].english_mark.map(|m| m.value()), Some(65));
    }

    #[test]
    fn serializes_reason_only_for_failures() {
        let ranking = rank_summaries(
            Cohort {
                form_level: FormLevel::One,
                period: Period::new("Term 1", "2024-2025").unwrap(),
                school_id: 1,
            },
            vec![summarize(&alice()), summarize(&brian())],
        );
        let v = serde_json::to_value(pass_fail_summary(&ranking)).unwrap();
        assert!(v["students"][0].get("failureReason").is_none());
        assert_eq!(v["students"][1]["failureReason"], "englishOnly");
        assert_eq!(v["failedEnglishOnly"], 1);
    }
}
