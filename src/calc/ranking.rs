use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::model::{Cohort, Status};
use super::summary::{StudentSummary, INSUFFICIENT_SUBJECTS_POINTS};

/// Standard competition ranking ("1224") over an already sorted slice.
///
/// An item whose key equals the previous item's key shares its position;
/// otherwise it takes its 1-based index, so numbers are skipped after a tie.
pub fn competition_positions<T, K, F>(sorted: &[T], key: F) -> Vec<usize>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let mut positions: Vec<usize> = Vec::with_capacity(sorted.len());
    let mut prev: Option<K> = None;
    for (i, item) in sorted.iter().enumerate() {
        let k = key(item);
        let pos = match (&prev, positions.last()) {
            (Some(p), Some(last)) if *p == k => *last,
            _ => i + 1,
        };
        positions.push(pos);
        prev = Some(k);
    }
    positions
}

/// The value two students must share, along with status, to tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    /// Average in tenths, rounded half to even.
    AverageTenths(i64),
    AggregatePoints(u32),
}

fn rank_key(s: &StudentSummary, junior: bool) -> (Status, Metric) {
    let metric = if junior {
        Metric::AverageTenths((s.average * 10.0).round_ties_even() as i64)
    } else {
        Metric::AggregatePoints(s.aggregate_points.unwrap_or(INSUFFICIENT_SUBJECTS_POINTS))
    };
    (s.status, metric)
}

fn compare(a: &StudentSummary, b: &StudentSummary, junior: bool) -> Ordering {
    let by_metric = if junior {
        b.average.total_cmp(&a.average)
    } else {
        let pa = a.aggregate_points.unwrap_or(INSUFFICIENT_SUBJECTS_POINTS);
        let pb = b.aggregate_points.unwrap_or(INSUFFICIENT_SUBJECTS_POINTS);
        pa.cmp(&pb)
    };
    a.status
        .cmp(&b.status)
        .then(by_metric)
        .then_with(|| a.first_name.cmp(&b.first_name))
        .then_with(|| a.last_name.cmp(&b.last_name))
        .then_with(|| a.student_id.cmp(&b.student_id))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub position: usize,
    pub total_students: usize,
    #[serde(flatten)]
    pub summary: StudentSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortRanking {
    pub cohort: Cohort,
    pub rankings: Vec<RankingEntry>,
    pub total_students: usize,
    #[serde(skip)]
    by_student: HashMap<String, usize>,
}

impl CohortRanking {
    pub fn entry(&self, student_id: &str) -> Option<&RankingEntry> {
        self.by_student
            .get(student_id)
            .and_then(|i| self.rankings.get(*i))
    }

    pub fn position_of(&self, student_id: &str) -> Option<usize> {
        self.entry(student_id).map(|e| e.position)
    }
}

/// Orders a cohort and assigns tie-sharing positions.
///
/// Junior forms: PASS first, then average descending (ties on the average
/// rounded to one decimal). Senior forms: PASS first, then aggregate points
/// ascending. Names only fix the display order inside a tie.
pub fn rank_summaries(cohort: Cohort, mut summaries: Vec<StudentSummary>) -> CohortRanking {
    let junior = cohort.form_level.is_junior();
    summaries.sort_by(|a, b| compare(a, b, junior));

    let positions = competition_positions(&summaries, |s| rank_key(s, junior));
    let total_students = summaries.len();

    let rankings: Vec<RankingEntry> = summaries
        .into_iter()
        .zip(positions)
        .map(|(summary, position)| RankingEntry {
            position,
            total_students,
            summary,
        })
        .collect();
    let by_student = rankings
        .iter()
        .enumerate()
        .map(|(i, e)| (e.summary.student_id.clone(), i))
        .collect();

    tracing::debug!(
        form_level = cohort.form_level.as_i64(),
        term = %cohort.period.term,
        academic_year = %cohort.period.academic_year,
        school_id = cohort.school_id,
        total_students,
        "ranked cohort"
    );

    CohortRanking {
        cohort,
        rankings,
        total_students,
        by_student,
    }
}
