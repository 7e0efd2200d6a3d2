use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::grade::{self, Grade};
use super::model::{Mark, Period, StudentMarks, Subject};
use super::ranking::CohortRanking;
use super::subject_position::{all_subject_standings, SubjectPosition};
use super::summary::StudentSummary;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRow {
    pub subject: Subject,
    pub mark: Mark,
    pub grade: Grade,
    pub remark: &'static str,
    pub position: SubjectPosition,
}

/// Everything the presentation layer needs to print one report card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCard {
    pub period: Period,
    pub school_id: i64,
    pub summary: StudentSummary,
    /// None when the student has no marks in the cohort.
    pub position: Option<usize>,
    pub total_students: usize,
    pub subjects: Vec<SubjectRow>,
    pub overall_remark: &'static str,
    pub generated_at: String,
}

pub fn build_report_card(
    summary: StudentSummary,
    cohort_students: &[StudentMarks],
    ranking: &CohortRanking,
    generated_at: DateTime<Utc>,
) -> ReportCard {
    let form = summary.form_level;
    let standings = all_subject_standings(cohort_students);
    let subjects = summary
        .marks
        .iter()
        .map(|(subject, mark)| {
            let g = grade::grade(*mark, form);
            SubjectRow {
                subject: *subject,
                mark: *mark,
                grade: g,
                remark: g.remark(),
                position: standings
                    .get(subject)
                    .map(|st| st.position_of(&summary.student_id))
                    .unwrap_or(SubjectPosition {
                        position: 0,
                        total: 0,
                    }),
            }
        })
        .collect();

    ReportCard {
        period: ranking.cohort.period.clone(),
        school_id: ranking.cohort.school_id,
        position: ranking.position_of(&summary.student_id),
        total_students: ranking.total_students,
        subjects,
        overall_remark: summary.grade.remark(),
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        summary,
    }
}
