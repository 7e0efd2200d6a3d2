use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use super::model::{Mark, StudentMarks, Subject};
use super::ranking::competition_positions;

/// `position/total` within one subject. Position 0 means the student has no
/// mark for the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectPosition {
    pub position: usize,
    pub total: usize,
}

impl fmt::Display for SubjectPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.position, self.total)
    }
}

impl Serialize for SubjectPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStanding {
    pub student_id: String,
    pub name: String,
    pub mark: Mark,
    pub position: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStandings {
    pub subject: Subject,
    /// Students with a mark in this subject, not the cohort size.
    pub total: usize,
    pub standings: Vec<SubjectStanding>,
}

impl SubjectStandings {
    pub fn position_of(&self, student_id: &str) -> SubjectPosition {
        let position = self
            .standings
            .iter()
            .find(|s| s.student_id == student_id)
            .map(|s| s.position)
            .unwrap_or(0);
        SubjectPosition {
            position,
            total: self.total,
        }
    }
}

pub fn subject_standings(students: &[StudentMarks], subject: Subject) -> SubjectStandings {
    let sat = students
        .iter()
        .filter_map(|s| s.mark(subject).map(|m| (s, m)))
        .collect();
    rank_sitters(subject, sat)
}

/// Standings for every subject anyone sat, from one pass over the cohort.
pub fn all_subject_standings(students: &[StudentMarks]) -> BTreeMap<Subject, SubjectStandings> {
    let mut by_subject: BTreeMap<Subject, Vec<(&StudentMarks, Mark)>> = BTreeMap::new();
    for s in students {
        for (subject, mark) in &s.marks {
            by_subject.entry(*subject).or_default().push((s, *mark));
        }
    }
    by_subject
        .into_iter()
        .map(|(subject, sat)| (subject, rank_sitters(subject, sat)))
        .collect()
}

fn rank_sitters(subject: Subject, mut sat: Vec<(&StudentMarks, Mark)>) -> SubjectStandings {
    sat.sort_by(|(a, ma), (b, mb)| {
        mb.cmp(ma)
            .then_with(|| a.first_name.cmp(&b.first_name))
            .then_with(|| a.last_name.cmp(&b.last_name))
            .then_with(|| a.student_id.cmp(&b.student_id))
    });

    let positions = competition_positions(&sat, |(_, m)| *m);
    let standings: Vec<SubjectStanding> = sat
        .iter()
        .zip(positions)
        .map(|((s, m), position)| SubjectStanding {
            student_id: s.student_id.clone(),
            name: s.name(),
            mark: *m,
            position,
        })
        .collect();

    SubjectStandings {
        subject,
        total: standings.len(),
        standings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::model::FormLevel;
    use crate::calc::summary::tests::student;

    fn english_class() -> Vec<StudentMarks> {
        vec![
            student("s60", FormLevel::One, &[(Subject::English, 60)]),
            student("s90a", FormLevel::One, &[(Subject::English, 90)]),
            student("s75", FormLevel::One, &[(Subject::English, 75)]),
            student("s90b", FormLevel::One, &[(Subject::English, 90)]),
            student("absent", FormLevel::One, &[(Subject::Mathematics, 88)]),
        ]
    }

    #[test]
    fn tied_marks_share_position_and_total_counts_sitters_only() {
        let st = subject_standings(&english_class(), Subject::English);
        assert_eq!(st.total, 4);
        assert_eq!(st.position_of("s90a").to_string(), "1/4");
        assert_eq!(st.position_of("s90b").to_string(), "1/4");
        assert_eq!(st.position_of("s75").to_string(), "3/4");
        assert_eq!(st.position_of("s60").to_string(), "4/4");
        assert_eq!(st.position_of("absent").to_string(), "0/4");
    }

    #[test]
    fn nobody_sat_gives_zero_over_zero() {
        let st = subject_standings(&english_class(), Subject::Physics);
        assert_eq!(st.total, 0);
        assert_eq!(st.position_of("s60").to_string(), "0/0");
    }

    #[test]
    fn one_pass_standings_match_per_subject_standings() {
        let class = english_class();
        let all = all_subject_standings(&class);
        assert_eq!(all.len(), 2);
        assert!(!all.contains_key(&Subject::Physics));
        for subject in [Subject::English, Subject::Mathematics] {
            let one = subject_standings(&class, subject);
            let from_all = &all[&subject];
            assert_eq!(from_all.total, one.total);
            for st in &one.standings {
                assert_eq!(from_all.position_of(&st.student_id), one.position_of(&st.student_id));
            }
        }
        assert_eq!(all[&Subject::Mathematics].position_of("absent").to_string(), "1/1");
    }

    #[test]
    fn serializes_as_fraction_string() {
        let p = SubjectPosition { position: 3, total: 4 };
        assert_eq!(serde_json::to_value(p).unwrap(), serde_json::json!("3/4"));
    }
}
