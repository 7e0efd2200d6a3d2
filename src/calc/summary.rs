use serde::Serialize;
use std::collections::BTreeMap;

use super::grade::{self, Grade, Letter};
use super::model::{FormLevel, Mark, Status, StudentMarks, Subject};
use super::status;

/// Number of best subjects counted towards senior aggregate points.
pub const AGGREGATE_SUBJECTS: usize = 6;

/// Aggregate charged to a senior student who sat fewer than six subjects:
/// six grade-9 results.
pub const INSUFFICIENT_SUBJECTS_POINTS: u32 = 54;

/// Derived per-student view for one period. Never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub student_id: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub form_level: FormLevel,
    pub marks: BTreeMap<Subject, Mark>,
    pub subjects_taken: usize,
    pub subjects_passed: usize,
    pub english_mark: Option<Mark>,
    pub english_passed: bool,
    pub status: Status,
    pub status_reason: String,
    pub average: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate_points: Option<u32>,
    pub grade: Grade,
    pub insufficient_subjects: bool,
}

/// Sum of MSCE points over the six highest raw marks. Students with fewer
/// than six marks get [`INSUFFICIENT_SUBJECTS_POINTS`].
pub fn aggregate_points(marks: &BTreeMap<Subject, Mark>) -> u32 {
    if marks.len() < AGGREGATE_SUBJECTS {
        return INSUFFICIENT_SUBJECTS_POINTS;
    }
    let mut best: Vec<Mark> = marks.values().copied().collect();
    best.sort_unstable_by(|a, b| b.cmp(a));
    best.iter()
        .take(AGGREGATE_SUBJECTS)
        .map(|m| u32::from(grade::msce_points(*m)))
        .sum()
}

pub fn mean_mark(marks: &BTreeMap<Subject, Mark>) -> f64 {
    if marks.is_empty() {
        return 0.0;
    }
    let sum: u32 = marks.values().map(|m| u32::from(m.value())).sum();
    f64::from(sum) / marks.len() as f64
}

// Most frequent letter, or None when empty or two letters share the top count.
fn unique_mode(letters: &[Letter]) -> Option<Letter> {
    let mut counts = [0_usize; 5];
    for l in letters {
        counts[*l as usize] += 1;
    }
    let max = *counts.iter().max()?;
    if max == 0 {
        return None;
    }
    let mut top = Letter::ALL.iter().filter(|l| counts[**l as usize] == max);
    let first = *top.next()?;
    if top.next().is_some() {
        None
    } else {
        Some(first)
    }
}

/// Overall junior letter: the modal subject letter, ties broken by banding
/// the average. A FAIL is always F and a PASS is never F.
pub fn resolve_letter(letters: &[Letter], average: f64, status: Status) -> Letter {
    if status == Status::Fail {
        return Letter::F;
    }
    let by_average = grade::letter(Mark::truncated(average));
    let overall = unique_mode(letters).unwrap_or(by_average);
    if overall != Letter::F {
        return overall;
    }

    let passing: Vec<Letter> = letters.iter().copied().filter(|l| *l != Letter::F).collect();
    match unique_mode(&passing) {
        Some(l) => l,
        None if by_average != Letter::F => by_average,
        None => Letter::D,
    }
}

pub fn summarize(student: &StudentMarks) -> StudentSummary {
    let form = student.form_level;
    let subjects_taken = student.marks.len();
    let subjects_passed = student
        .marks
        .values()
        .filter(|m| grade::subject_passed(**m, form))
        .count();
    let english_mark = student.mark(Subject::English);
    let english_passed = english_mark
        .map(|m| grade::english_passed(m, form))
        .unwrap_or(false);
    // Fewer than six marks can never reach the pass rule, so FAIL follows.
    let status = status::status(subjects_passed, english_passed);
    let status_reason = status::status_reason(subjects_passed, english_passed);
    let insufficient_subjects = subjects_taken < AGGREGATE_SUBJECTS;

    let average = if insufficient_subjects {
        0.0
    } else {
        mean_mark(&student.marks)
    };

    let (grade, aggregate_points) = if form.is_junior() {
        let grade = if insufficient_subjects {
            Grade::Letter(Letter::F)
        } else {
            let letters: Vec<Letter> = student.marks.values().map(|m| grade::letter(*m)).collect();
            Grade::Letter(resolve_letter(&letters, average, status))
        };
        (grade, None)
    } else {
        let grade = if insufficient_subjects {
            Grade::worst(form)
        } else {
            grade::grade(Mark::truncated(average), form)
        };
        (grade, Some(aggregate_points(&student.marks)))
    };

    StudentSummary {
        student_id: student.student_id.clone(),
        name: student.name(),
        first_name: student.first_name.clone(),
        last_name: student.last_name.clone(),
        form_level: form,
        marks: student.marks.clone(),
        subjects_taken,
        subjects_passed,
        english_mark,
        english_passed,
        status,
        status_reason,
        average,
        aggregate_points,
        grade,
        insufficient_subjects,
    }
}
