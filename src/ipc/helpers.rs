use crate::calc::{Cohort, EngineError, FormLevel, Period, Subject};
use crate::ipc::error::{engine_err, err};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;

pub fn db_conn<'a>(state: &'a AppState, req: &Request) -> Result<&'a Connection, serde_json::Value> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn required_i64(req: &Request, key: &str) -> Result<i64, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("missing or non-integer {}", key),
                None,
            )
        })
}

pub fn optional_i64(req: &Request, key: &str) -> Result<Option<i64>, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be an integer", key),
                None,
            )
        }),
    }
}

pub fn lift<T>(req: &Request, r: Result<T, EngineError>) -> Result<T, serde_json::Value> {
    r.map_err(|e| engine_err(&req.id, &e))
}

pub fn form_level(req: &Request) -> Result<FormLevel, serde_json::Value> {
    let n = required_i64(req, "formLevel")?;
    lift(req, FormLevel::from_i64(n))
}

pub fn subject(req: &Request) -> Result<Subject, serde_json::Value> {
    let raw = required_str(req, "subject")?;
    lift(req, raw.parse())
}

pub fn period(req: &Request) -> Result<Period, serde_json::Value> {
    let term = required_str(req, "term")?;
    let academic_year = required_str(req, "academicYear")?;
    lift(req, Period::new(&term, &academic_year))
}

pub fn school_id(req: &Request) -> Result<i64, serde_json::Value> {
    required_i64(req, "schoolId")
}

pub fn cohort(req: &Request) -> Result<Cohort, serde_json::Value> {
    Ok(Cohort {
        form_level: form_level(req)?,
        period: period(req)?,
        school_id: school_id(req)?,
    })
}
