use crate::calc;
use crate::ipc::error::ok;
use crate::ipc::helpers::{cohort, db_conn, lift, period, required_str, school_id};
use crate::ipc::types::{AppState, Request};
use crate::store::SqliteMarkStore;
use serde_json::json;

fn handle_reports_subject_analysis(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let cohort = match cohort(req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let store = SqliteMarkStore::new(conn);
    match lift(req, calc::subject_analysis(&store, &cohort)) {
        Ok(subjects) => ok(
            &req.id,
            json!({
                "cohort": cohort,
                "totalSubjects": subjects.len(),
                "subjects": subjects,
            }),
        ),
        Err(e) => e,
    }
}

fn handle_reports_pass_fail_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let cohort = match cohort(req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let store = SqliteMarkStore::new(conn);
    match lift(req, calc::pass_fail_summary(&store, cohort)) {
        Ok(summary) => ok(&req.id, json!(summary)),
        Err(e) => e,
    }
}

fn handle_reports_report_card(state: &mut AppState, req: &Request) -> serde_json::Value {
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
    match lift(
        req,
        calc::report_card(&store, &student_id, &period, school_id),
    ) {
        Ok(card) => ok(&req.id, json!(card)),
        Err(e) => e,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.subjectAnalysis" => Some(handle_reports_subject_analysis(state, req)),
        "reports.passFailSummary" => Some(handle_reports_pass_fail_summary(state, req)),
        "reports.reportCard" => Some(handle_reports_report_card(state, req)),
        _ => None,
    }
}
