use serde::{Serialize, Serializer};
use std::fmt;

use super::model::{FormLevel, Mark};

/// Junior-form letter grade. Declaration order is best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Letter {
    A,
    B,
    C,
    D,
    F,
}

impl Letter {
    pub const ALL: [Letter; 5] = [Letter::A, Letter::B, Letter::C, Letter::D, Letter::F];

    pub fn as_str(self) -> &'static str {
        match self {
            Letter::A => "A",
            Letter::B => "B",
            Letter::C => "C",
            Letter::D => "D",
            Letter::F => "F",
        }
    }
}

/// A letter grade (forms 1-2) or an MSCE numeric grade 1..=9 (forms 3-4,
/// lower is better).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grade {
    Letter(Letter),
    Msce(u8),
}

impl Grade {
    /// Worst grade on the scale used by `form`.
    pub fn worst(form: FormLevel) -> Self {
        if form.is_junior() {
            Grade::Letter(Letter::F)
        } else {
            Grade::Msce(9)
        }
    }

    /// Remark printed next to the grade on report cards.
    pub fn remark(self) -> &'static str {
        match self {
            Grade::Msce(1) | Grade::Msce(2) => "Distinction",
            Grade::Msce(3) => "Strong Credit",
            Grade::Msce(4) | Grade::Msce(5) | Grade::Msce(6) => "Credit",
            Grade::Msce(7) => "Pass",
            Grade::Msce(8) => "Mere Pass",
            Grade::Msce(_) => "Fail",
            Grade::Letter(Letter::A) => "Excellent",
            Grade::Letter(Letter::B) => "Very Good",
            Grade::Letter(Letter::C) => "Good",
            Grade::Letter(Letter::D) => "Average",
            Grade::Letter(Letter::F) => "Fail",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Letter(l) => f.write_str(l.as_str()),
            Grade::Msce(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn letter(mark: Mark) -> Letter {
    match mark.value() {
        80..=100 => Letter::A,
        70..=79 => Letter::B,
        60..=69 => Letter::C,
        50..=59 => Letter::D,
        _ => Letter::F,
    }
}

/// MSCE points for a mark: 1 (75+) down to 9 (below 40).
pub fn msce_points(mark: Mark) -> u8 {
    match mark.value() {
        75..=100 => 1,
        70..=74 => 2,
        65..=69 => 3,
        60..=64 => 4,
        55..=59 => 5,
        50..=54 => 6,
        45..=49 => 7,
        40..=44 => 8,
        _ => 9,
    }
}

pub fn grade(mark: Mark, form: FormLevel) -> Grade {
    if form.is_junior() {
        Grade::Letter(letter(mark))
    } else {
        Grade::Msce(msce_points(mark))
    }
}

/// Lowest passing mark: D (50) for junior forms, MSCE 8 (40) for senior.
pub fn pass_threshold(form: FormLevel) -> u8 {
    if form.is_junior() {
        50
    } else {
        40
    }
}

pub fn subject_passed(mark: Mark, form: FormLevel) -> bool {
    mark.value() >= pass_threshold(form)
}

/// Same threshold as any other subject; English differs only in how the
/// result is combined into the overall status.
pub fn english_passed(mark: Mark, form: FormLevel) -> bool {
    subject_passed(mark, form)
}
