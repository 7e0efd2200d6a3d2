use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormLevel {
    One,
    Two,
    Three,
    Four,
}

impl FormLevel {
    pub fn from_i64(n: i64) -> Result<Self, EngineError> {
        match n {
            1 => Ok(FormLevel::One),
            2 => Ok(FormLevel::Two),
            3 => Ok(FormLevel::Three),
            4 => Ok(FormLevel::Four),
            other => Err(EngineError::InvalidFormLevel(other)),
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            FormLevel::One => 1,
            FormLevel::Two => 2,
            FormLevel::Three => 3,
            FormLevel::Four => 4,
        }
    }

    /// Forms 1 and 2 use letter grades; forms 3 and 4 use the MSCE scale.
    pub fn is_junior(self) -> bool {
        matches!(self, FormLevel::One | FormLevel::Two)
    }
}

impl Serialize for FormLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}

/// The school's closed subject catalog. Declaration order is the report-card
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Subject {
    Agriculture,
    #[serde(rename = "Bible Knowledge")]
    BibleKnowledge,
    Biology,
    #[serde(rename = "Business Studies")]
    BusinessStudies,
    Chemistry,
    Chichewa,
    #[serde(rename = "Computer Studies")]
    ComputerStudies,
    English,
    Geography,
    History,
    #[serde(rename = "Home Economics")]
    HomeEconomics,
    #[serde(rename = "Life Skills/SOS")]
    LifeSkills,
    Mathematics,
    Physics,
}

impl Subject {
    pub const ALL: [Subject; 14] = [
        Subject::Agriculture,
        Subject::BibleKnowledge,
        Subject::Biology,
        Subject::BusinessStudies,
        Subject::Chemistry,
        Subject::Chichewa,
        Subject::ComputerStudies,
        Subject::English,
        Subject::Geography,
        Subject::History,
        Subject::HomeEconomics,
        Subject::LifeSkills,
        Subject::Mathematics,
        Subject::Physics,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Agriculture => "Agriculture",
            Subject::BibleKnowledge => "Bible Knowledge",
            Subject::Biology => "Biology",
            Subject::BusinessStudies => "Business Studies",
            Subject::Chemistry => "Chemistry",
            Subject::Chichewa => "Chichewa",
            Subject::ComputerStudies => "Computer Studies",
            Subject::English => "English",
            Subject::Geography => "Geography",
            Subject::History => "History",
            Subject::HomeEconomics => "Home Economics",
            Subject::LifeSkills => "Life Skills/SOS",
            Subject::Mathematics => "Mathematics",
            Subject::Physics => "Physics",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        Subject::ALL
            .iter()
            .copied()
            .find(|subj| subj.as_str().eq_ignore_ascii_case(t))
            .ok_or_else(|| EngineError::UnknownSubject(t.to_string()))
    }
}

/// A raw mark, guaranteed to lie in 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Mark(u8);

impl Mark {
    pub fn new(raw: i64) -> Result<Self, EngineError> {
        if (0..=100).contains(&raw) {
            Ok(Mark(raw as u8))
        } else {
            Err(EngineError::InvalidMarkRange { mark: raw })
        }
    }

    /// Truncates a derived value such as an average onto the mark scale.
    pub fn truncated(v: f64) -> Self {
        Mark(v.floor().clamp(0.0, 100.0) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Reporting period: a term within an academic year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub term: String,
    pub academic_year: String,
}

impl Period {
    pub fn new(term: &str, academic_year: &str) -> Result<Self, EngineError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(EngineError::MalformedPeriod("term must not be blank".into()));
        }
        let academic_year = academic_year.trim();
        if !is_academic_year(academic_year) {
            return Err(EngineError::MalformedPeriod(format!(
                "academic year '{}' must look like 2024-2025",
                academic_year
            )));
        }
        Ok(Period {
            term: term.to_string(),
            academic_year: academic_year.to_string(),
        })
    }
}

fn is_academic_year(s: &str) -> bool {
    let Some((start, end)) = s.split_once('-') else {
        return false;
    };
    if start.len() != 4 || end.len() != 4 {
        return false;
    }
    match (start.parse::<u32>(), end.parse::<u32>()) {
        (Ok(a), Ok(b)) => b == a + 1,
        _ => false,
    }
}

/// Students of one school sitting one form level in one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cohort {
    pub form_level: FormLevel,
    #[serde(flatten)]
    pub period: Period,
    pub school_id: i64,
}

/// One student's marks for one period, as fetched from the mark store.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentMarks {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub form_level: FormLevel,
    pub marks: BTreeMap<Subject, Mark>,
}

impl StudentMarks {
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn mark(&self, subject: Subject) -> Option<Mark> {
        self.marks.get(&subject).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Fail,
}
