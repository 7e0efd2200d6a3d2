use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::calc::{Cohort, EngineError, FormLevel, Mark, Period, StudentMarks, Subject};

/// Read side of the mark store. The engine only ever reads through this.
pub trait MarkStore {
    /// Every student with at least one mark in the cohort, ordered by name.
    fn cohort_marks(&self, cohort: &Cohort) -> Result<Vec<StudentMarks>, EngineError>;

    /// One student's marks for a period. The form level comes from the marks
    /// when there are any, otherwise from the student record.
    fn student_marks(
        &self,
        student_id: &str,
        period: &Period,
        school_id: i64,
    ) -> Result<StudentMarks, EngineError>;
}

pub struct SqliteMarkStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteMarkStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl MarkStore for SqliteMarkStore<'_> {
    fn cohort_marks(&self, cohort: &Cohort) -> Result<Vec<StudentMarks>, EngineError> {
        let mut stmt = self.conn.prepare(
            "SELECT m.student_id, s.first_name, s.last_name, m.subject, m.mark
             FROM marks m
             JOIN students s ON s.id = m.student_id
             WHERE m.form_level = ? AND m.term = ? AND m.academic_year = ? AND m.school_id = ?
             ORDER BY s.first_name, s.last_name, m.student_id",
        )?;
        let rows = stmt
            .query_map(
                (
                    cohort.form_level.as_i64(),
                    &cohort.period.term,
                    &cohort.period.academic_year,
                    cohort.school_id,
                ),
                |r| {
                    Ok((
                        r.get::<_, String>(0)?,
                        r.get::<_, String>(1)?,
                        r.get::<_, String>(2)?,
                        r.get::<_, String>(3)?,
                        r.get::<_, i64>(4)?,
                    ))
                },
            )
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())?;

        let mut out: Vec<StudentMarks> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (student_id, first_name, last_name, subject, mark) in rows {
            let subject: Subject = subject.parse()?;
            let mark = Mark::new(mark)?;
            let i = *index.entry(student_id.clone()).or_insert_with(|| {
                out.push(StudentMarks {
                    student_id,
                    first_name,
                    last_name,
                    form_level: cohort.form_level,
                    marks: BTreeMap::new(),
                });
                out.len() - 1
            });
            out[i].marks.insert(subject, mark);
        }
        Ok(out)
    }

    fn student_marks(
        &self,
        student_id: &str,
        period: &Period,
        school_id: i64,
    ) -> Result<StudentMarks, EngineError> {
        let student = find_student(self.conn, student_id, school_id)?
            .ok_or_else(|| EngineError::StudentNotFound(student_id.to_string()))?;

        let mut stmt = self.conn.prepare(
            "SELECT subject, mark, form_level
             FROM marks
             WHERE student_id = ? AND term = ? AND academic_year = ? AND school_id = ?",
        )?;
        let rows = stmt
            .query_map(
                (student_id, &period.term, &period.academic_year, school_id),
                |r| {
                    Ok((
                        r.get::<_, String>(0)?,
                        r.get::<_, i64>(1)?,
                        r.get::<_, i64>(2)?,
                    ))
                },
            )
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())?;

        let mut form_level = student.form_level;
        let mut marks = BTreeMap::new();
        for (subject, mark, form) in rows {
            form_level = FormLevel::from_i64(form)?;
            marks.insert(subject.parse::<Subject>()?, Mark::new(mark)?);
        }

        Ok(StudentMarks {
            student_id: student.id,
            first_name: student.first_name,
            last_name: student.last_name,
            form_level,
            marks,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: String,
    pub school_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub form_level: FormLevel,
}

fn find_student(
    conn: &Connection,
    student_id: &str,
    school_id: i64,
) -> Result<Option<StudentRecord>, EngineError> {
    let row = conn
        .query_row(
            "SELECT id, school_id, first_name, last_name, form_level
             FROM students
             WHERE id = ? AND school_id = ?",
            (student_id, school_id),
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, i64>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, i64>(4)?,
                ))
            },
        )
        .optional()?;
    let Some((id, school_id, first_name, last_name, form)) = row else {
        return Ok(None);
    };
    Ok(Some(StudentRecord {
        id,
        school_id,
        first_name,
        last_name,
        form_level: FormLevel::from_i64(form)?,
    }))
}

fn now_stamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn create_student(
    conn: &Connection,
    school_id: i64,
    first_name: &str,
    last_name: &str,
    form_level: FormLevel,
) -> Result<String, EngineError> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO students(id, school_id, first_name, last_name, form_level, updated_at)
         VALUES(?, ?, ?, ?, ?, ?)",
        (
            &id,
            school_id,
            first_name.trim(),
            last_name.trim(),
            form_level.as_i64(),
            now_stamp(),
        ),
    )?;
    Ok(id)
}

pub fn list_students(
    conn: &Connection,
    school_id: i64,
    form_level: Option<FormLevel>,
) -> Result<Vec<StudentRecord>, EngineError> {
    let mut stmt = conn.prepare(
        "SELECT id, school_id, first_name, last_name, form_level
         FROM students
         WHERE school_id = ?1 AND (?2 IS NULL OR form_level = ?2)
         ORDER BY first_name, last_name, id",
    )?;
    let rows = stmt
        .query_map((school_id, form_level.map(FormLevel::as_i64)), |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, i64>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
                r.get::<_, i64>(4)?,
            ))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())?;

    rows.into_iter()
        .map(|(id, school_id, first_name, last_name, form)| {
            Ok(StudentRecord {
                id,
                school_id,
                first_name,
                last_name,
                form_level: FormLevel::from_i64(form)?,
            })
        })
        .collect()
}

/// One mark to write. The mark is already range-checked.
#[derive(Debug, Clone)]
pub struct MarkEntry {
    pub student_id: String,
    pub subject: Subject,
    pub mark: Mark,
}

// Form level of the student's existing marks for the cohort's period, if any.
fn period_form_level(
    conn: &Connection,
    student_id: &str,
    cohort: &Cohort,
) -> Result<Option<i64>, EngineError> {
    let form = conn
        .query_row(
            "SELECT form_level FROM marks
             WHERE student_id = ? AND term = ? AND academic_year = ? AND school_id = ?
             LIMIT 1",
            (
                student_id,
                &cohort.period.term,
                &cohort.period.academic_year,
                cohort.school_id,
            ),
            |r| r.get::<_, i64>(0),
        )
        .optional()?;
    Ok(form)
}

/// Writes a batch of marks for one cohort in a single transaction. An
/// unknown student, or one whose marks for the period already sit under a
/// different form level, aborts the whole batch.
pub fn upsert_marks(
    conn: &Connection,
    cohort: &Cohort,
    entries: &[MarkEntry],
) -> Result<usize, EngineError> {
    let tx = conn.unchecked_transaction()?;
    let stamp = now_stamp();
    for e in entries {
        if find_student(&tx, &e.student_id, cohort.school_id)?.is_none() {
            return Err(EngineError::StudentNotFound(e.student_id.clone()));
        }
        if let Some(recorded) = period_form_level(&tx, &e.student_id, cohort)? {
            if recorded != cohort.form_level.as_i64() {
                return Err(EngineError::FormLevelConflict {
                    student_id: e.student_id.clone(),
                    recorded,
                    requested: cohort.form_level.as_i64(),
                });
            }
        }
        tx.execute(
            "INSERT INTO marks(student_id, school_id, subject, mark, term, academic_year, form_level, updated_at)
             VALUES(?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(student_id, subject, term, academic_year, school_id) DO UPDATE SET
               mark = excluded.mark,
               form_level = excluded.form_level,
               updated_at = excluded.updated_at",
            (
                &e.student_id,
                cohort.school_id,
                e.subject.as_str(),
                i64::from(e.mark.value()),
                &cohort.period.term,
                &cohort.period.academic_year,
                cohort.form_level.as_i64(),
                &stamp,
            ),
        )?;
    }
    tx.commit()?;
    Ok(entries.len())
}

pub fn delete_mark(
    conn: &Connection,
    student_id: &str,
    subject: Subject,
    period: &Period,
    school_id: i64,
) -> Result<bool, EngineError> {
    let n = conn.execute(
        "DELETE FROM marks
         WHERE student_id = ? AND subject = ? AND term = ? AND academic_year = ? AND school_id = ?",
        (
            student_id,
            subject.as_str(),
            &period.term,
            &period.academic_year,
            school_id,
        ),
    )?;
    Ok(n > 0)
}
