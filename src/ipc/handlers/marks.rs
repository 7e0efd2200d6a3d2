use crate::calc::{Mark, Subject};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{cohort, db_conn, lift, period, required_str, school_id, subject};
use crate::ipc::types::{AppState, Request};
use crate::store::{self, MarkEntry, MarkStore, SqliteMarkStore};
use serde_json::json;

// Every entry is validated before anything is written.
fn parse_entries(req: &Request) -> Result<Vec<MarkEntry>, serde_json::Value> {
    let Some(items) = req.params.get("marks").and_then(|v| v.as_array()) else {
        return Err(err(&req.id, "bad_params", "missing marks array", None));
    };
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let Some(student_id) = item.get("studentId").and_then(|v| v.as_str()) else {
            return Err(err(
                &req.id,
                "bad_params",
                "marks[].studentId must be a string",
                Some(json!({ "index": i })),
            ));
        };
        let Some(subject_raw) = item.get("subject").and_then(|v| v.as_str()) else {
            return Err(err(
                &req.id,
                "bad_params",
                "marks[].subject must be a string",
                Some(json!({ "index": i })),
            ));
        };
        let Some(raw) = item.get("mark").and_then(|v| v.as_i64()) else {
            return Err(err(
                &req.id,
                "bad_params",
                "marks[].mark must be an integer",
                Some(json!({ "index": i })),
            ));
        };
        let subject: Subject = lift(req, subject_raw.parse())?;
        let mark = match Mark::new(raw) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(student_id, subject = %subject, mark = raw, "rejected mark");
                return Err(err(
                    &req.id,
                    e.code(),
                    e.to_string(),
                    Some(json!({ "index": i, "mark": raw, "studentId": student_id })),
                ));
            }
        };
        out.push(MarkEntry {
            student_id: student_id.to_string(),
            subject,
            mark,
        });
    }
    Ok(out)
}

fn handle_marks_upsert(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let cohort = match cohort(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let entries = match parse_entries(req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match lift(req, store::upsert_marks(conn, &cohort, &entries)) {
        Ok(n) => ok(&req.id, json!({ "upserted": n })),
        Err(e) => e,
    }
}

fn handle_marks_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let subject = match subject(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let period = match period(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let school_id = match school_id(req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match lift(
        req,
        store::delete_mark(conn, &student_id, subject, &period, school_id),
    ) {
        Ok(deleted) => ok(&req.id, json!({ "deleted": deleted })),
        Err(e) => e,
    }
}

fn handle_marks_for_student(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let period = match period(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let school_id = match school_id(req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let store = SqliteMarkStore::new(conn);
    match lift(req, store.student_marks(&student_id, &period, school_id)) {
        Ok(s) => ok(
            &req.id,
            json!({
                "studentId": s.student_id,
                "name": s.name(),
                "formLevel": s.form_level,
                "marks": s.marks,
            }),
        ),
        Err(e) => e,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "marks.upsert" => Some(handle_marks_upsert(state, req)),
        "marks.delete" => Some(handle_marks_delete(state, req)),
        "marks.forStudent" => Some(handle_marks_for_student(state, req)),
        _ => None,
    }
}
