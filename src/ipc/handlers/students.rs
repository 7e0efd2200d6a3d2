use crate::calc::FormLevel;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{db_conn, form_level, lift, optional_i64, required_str, school_id};
use crate::ipc::types::{AppState, Request};
use crate::store;
use serde_json::json;

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let school_id = match school_id(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let form = match form_level(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let first_name = match required_str(req, "firstName") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let last_name = match required_str(req, "lastName") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if first_name.trim().is_empty() || last_name.trim().is_empty() {
        return err(&req.id, "bad_params", "firstName and lastName must not be blank", None);
    }

    match lift(
        req,
        store::create_student(conn, school_id, &first_name, &last_name, form),
    ) {
        Ok(student_id) => ok(&req.id, json!({ "studentId": student_id })),
        Err(e) => e,
    }
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let school_id = match school_id(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let form = match optional_i64(req, "formLevel") {
        Ok(None) => None,
        Ok(Some(n)) => match lift(req, FormLevel::from_i64(n)) {
            Ok(f) => Some(f),
            Err(e) => return e,
        },
        Err(e) => return e,
    };

    match lift(req, store::list_students(conn, school_id, form)) {
        Ok(students) => ok(&req.id, json!({ "students": students })),
        Err(e) => e,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.create" => Some(handle_students_create(state, req)),
        "students.list" => Some(handle_students_list(state, req)),
        _ => None,
    }
}
