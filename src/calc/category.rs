use serde::Serialize;
use std::str::FromStr;

use super::error::EngineError;
use super::grade::Grade;
use super::model::{StudentMarks, Subject};
use super::ranking::{competition_positions, CohortRanking};
use super::round_off_1_decimal;
use super::summary::{mean_mark, AGGREGATE_SUBJECTS};

pub const DEFAULT_TOP_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Overall,
    Sciences,
    Humanities,
    Languages,
}

impl Category {
    /// Subjects summed for a department category; empty for `Overall`.
    pub fn subjects(self) -> &'static [Subject] {
        match self {
            Category::Overall => &[],
            Category::Sciences => &[
                Subject::Agriculture,
                Subject::Biology,
                Subject::Chemistry,
                Subject::Physics,
                Subject::Mathematics,
                Subject::BusinessStudies,
                Subject::HomeEconomics,
            ],
            Category::Humanities => &[
                Subject::BibleKnowledge,
                Subject::Geography,
                Subject::History,
                Subject::LifeSkills,
            ],
            Category::Languages => &[Subject::English, Subject::Chichewa],
        }
    }

    fn excellence_area(self) -> String {
        match self {
            Category::Overall => "Overall Performance".to_string(),
            Category::Sciences => "Sciences Department".to_string(),
            Category::Humanities => "Humanities Department".to_string(),
            Category::Languages => "Languages Department".to_string(),
        }
    }
}

impl FromStr for Category {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overall" => Ok(Category::Overall),
            "sciences" => Ok(Category::Sciences),
            "humanities" => Ok(Category::Humanities),
            "languages" => Ok(Category::Languages),
            other => Err(EngineError::UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformer {
    pub position: usize,
    pub student_id: String,
    pub name: String,
    /// Overall average across every subject taken, one decimal.
    pub average: f64,
    pub subjects_taken: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate_points: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,
    pub excellence_area: String,
}

/// Ranks students by the sum of their marks in a department's subjects.
fn group_top_performers(
    category: Category,
    students: &[StudentMarks],
    limit: usize,
) -> Vec<TopPerformer> {
    let group = category.subjects();
    let mut rows: Vec<(&StudentMarks, u32, usize)> = students
        .iter()
        .filter_map(|s| {
            let taken: Vec<u32> = group
                .iter()
                .filter_map(|subj| s.mark(*subj))
                .map(|m| u32::from(m.value()))
                .collect();
            if taken.is_empty() {
                None
            } else {
                Some((s, taken.iter().sum(), taken.len()))
            }
        })
        .collect();
    rows.sort_by(|(a, ta, _), (b, tb, _)| {
        tb.cmp(ta)
            .then_with(|| a.first_name.cmp(&b.first_name))
            .then_with(|| a.last_name.cmp(&b.last_name))
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    let positions = competition_positions(&rows, |(_, total, _)| *total);

    rows.iter()
        .zip(positions)
        .take(limit)
        .map(|((s, total, taken), position)| TopPerformer {
            position,
            student_id: s.student_id.clone(),
            name: s.name(),
            average: round_off_1_decimal(mean_mark(&s.marks)),
            subjects_taken: *taken,
            group_total: Some(*total),
            group_average: Some(round_off_1_decimal(f64::from(*total) / *taken as f64)),
            aggregate_points: None,
            grade: None,
            excellence_area: category.excellence_area(),
        })
        .collect()
}

/// Best students by the cohort ranking itself, restricted to those with at
/// least six subjects. Positions are the cohort positions.
fn overall_top_performers(ranking: &CohortRanking, limit: usize) -> Vec<TopPerformer> {
    let junior = ranking.cohort.form_level.is_junior();
    ranking
        .rankings
        .iter()
        .filter(|e| e.summary.subjects_taken >= AGGREGATE_SUBJECTS)
        .take(limit)
        .map(|e| TopPerformer {
            position: e.position,
            student_id: e.summary.student_id.clone(),
            name: e.summary.name.clone(),
            average: round_off_1_decimal(e.summary.average),
            subjects_taken: e.summary.subjects_taken,
            group_total: None,
            group_average: None,
            aggregate_points: if junior { None } else { e.summary.aggregate_points },
            grade: if junior { Some(e.summary.grade) } else { None },
            excellence_area: Category::Overall.excellence_area(),
        })
        .collect()
}

pub fn top_performers(
    category: Category,
    students: &[StudentMarks],
    ranking: &CohortRanking,
    limit: usize,
) -> Vec<TopPerformer> {
    match category {
        Category::Overall => overall_top_performers(ranking, limit),
        _ => group_top_performers(category, students, limit),
    }
}
