//! Ranking and grading engine.
//!
//! Everything here is a pure function of a mark snapshot fetched through a
//! [`MarkStore`]. Nothing is cached; each call re-reads the store.

mod analysis;
mod category;
mod class_summary;
mod error;
mod grade;
mod model;
mod ranking;
mod report;
mod status;
mod subject_position;
mod summary;

pub use analysis::SubjectAnalysis;
pub use category::{Category, TopPerformer, DEFAULT_TOP_LIMIT};
pub use class_summary::PassFailSummary;
pub use error::EngineError;
pub use model::{Cohort, FormLevel, Mark, Period, StudentMarks, Subject};
pub use ranking::CohortRanking;
pub use report::ReportCard;
pub use subject_position::{SubjectPosition, SubjectStandings};
pub use summary::StudentSummary;

use crate::store::MarkStore;

/// VB6-compatible 1-decimal rounding: `Int(10*x + 0.5) / 10`.
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

pub fn rank_cohort<S: MarkStore>(store: &S, cohort: Cohort) -> Result<CohortRanking, EngineError> {
    let students = store.cohort_marks(&cohort)?;
    let summaries = students.iter().map(summary::summarize).collect();
    Ok(ranking::rank_summaries(cohort, summaries))
}

pub fn subject_standings<S: MarkStore>(
    store: &S,
    subject: Subject,
    cohort: &Cohort,
) -> Result<SubjectStandings, EngineError> {
    let students = store.cohort_marks(cohort)?;
    Ok(subject_position::subject_standings(&students, subject))
}

pub fn subject_position<S: MarkStore>(
    store: &S,
    student_id: &str,
    subject: Subject,
    cohort: &Cohort,
) -> Result<SubjectPosition, EngineError> {
    Ok(subject_standings(store, subject, cohort)?.position_of(student_id))
}

pub fn student_summary<S: MarkStore>(
    store: &S,
    student_id: &str,
    period: &Period,
    school_id: i64,
) -> Result<StudentSummary, EngineError> {
    // No marks is not an error: it summarizes as an insufficient-subjects FAIL.
    let student = store.student_marks(student_id, period, school_id)?;
    Ok(summary::summarize(&student))
}

pub fn category_top_performers<S: MarkStore>(
    store: &S,
    category: Category,
    cohort: Cohort,
    limit: usize,
) -> Result<Vec<TopPerformer>, EngineError> {
    let students = store.cohort_marks(&cohort)?;
    let summaries = students.iter().map(summary::summarize).collect();
    let ranking = ranking::rank_summaries(cohort, summaries);
    Ok(category::top_performers(category, &students, &ranking, limit))
}

pub fn subject_analysis<S: MarkStore>(
    store: &S,
    cohort: &Cohort,
) -> Result<Vec<SubjectAnalysis>, EngineError> {
    let students = store.cohort_marks(cohort)?;
    Ok(analysis::subject_analysis(&students, cohort.form_level))
}

pub fn pass_fail_summary<S: MarkStore>(
    store: &S,
    cohort: Cohort,
) -> Result<PassFailSummary, EngineError> {
    let ranking = rank_cohort(store, cohort)?;
    Ok(class_summary::pass_fail_summary(&ranking))
}

/// Report card for one student. The cohort is the student's form level for
/// the period, taken from their marks.
pub fn report_card<S: MarkStore>(
    store: &S,
    student_id: &str,
    period: &Period,
    school_id: i64,
) -> Result<ReportCard, EngineError> {
    let own = student_summary(store, student_id, period, school_id)?;
    let cohort = Cohort {
        form_level: own.form_level,
        period: period.clone(),
        school_id,
    };
    let students = store.cohort_marks(&cohort)?;
    let summaries = students.iter().map(summary::summarize).collect();
    let ranking = ranking::rank_summaries(cohort, summaries);
    Ok(report::build_report_card(
        own,
        &students,
        &ranking,
        chrono::Utc::now(),
    ))
}
