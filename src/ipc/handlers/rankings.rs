use crate::calc::{self, Category, DEFAULT_TOP_LIMIT};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    cohort, db_conn, lift, optional_i64, period, required_str, school_id, subject,
};
use crate::ipc::types::{AppState, Request};
use crate::store::SqliteMarkStore;
use serde_json::json;

fn handle_rankings_cohort(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let cohort = match cohort(req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let store = SqliteMarkStore::new(conn);
    match lift(req, calc::rank_cohort(&store, cohort)) {
        Ok(ranking) => ok(&req.id, json!(ranking)),
        Err(e) => e,
    }
}

fn handle_rankings_subject_position(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let cohort = match cohort(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let subject = match subject(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let store = SqliteMarkStore::new(conn);
    match lift(
        req,
        calc::subject_position(&store, &student_id, subject, &cohort),
    ) {
        Ok(p) => ok(
            &req.id,
            json!({
                "studentId": student_id,
                "subject": subject,
                "position": p,
            }),
        ),
        Err(e) => e,
    }
}

fn handle_rankings_subject_standings(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let cohort = match cohort(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let subject = match subject(req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let store = SqliteMarkStore::new(conn);
    match lift(req, calc::subject_standings(&store, subject, &cohort)) {
        Ok(standings) => ok(&req.id, json!(standings)),
        Err(e) => e,
    }
}

fn handle_rankings_student_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
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
        calc::student_summary(&store, &student_id, &period, school_id),
    ) {
        Ok(summary) => ok(&req.id, json!(summary)),
        Err(e) => e,
    }
}

fn handle_rankings_top_performers(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let cohort = match cohort(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let category: Category = match required_str(req, "category").and_then(|c| lift(req, c.parse()))
    {
        Ok(v) => v,
        Err(e) => return e,
    };
    let limit = match optional_i64(req, "limit") {
        Ok(None) => DEFAULT_TOP_LIMIT,
        Ok(Some(n)) if n > 0 => n as usize,
        Ok(Some(n)) => {
            return err(
                &req.id,
                "bad_params",
                "limit must be positive",
                Some(json!({ "limit": n })),
            )
        }
        Err(e) => return e,
    };

    let store = SqliteMarkStore::new(conn);
    match lift(
        req,
        calc::category_top_performers(&store, category, cohort, limit),
    ) {
        Ok(performers) => ok(
            &req.id,
            json!({
                "category": category,
                "performers": performers,
            }),
        ),
        Err(e) => e,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "rankings.cohort" => Some(handle_rankings_cohort(state, req)),
        "rankings.subjectPosition" => Some(handle_rankings_subject_position(state, req)),
        "rankings.subjectStandings" => Some(handle_rankings_subject_standings(state, req)),
        "rankings.studentSummary" => Some(handle_rankings_student_summary(state, req)),
        "rankings.topPerformers" => Some(handle_rankings_top_performers(state, req)),
        _ => None,
    }
}
