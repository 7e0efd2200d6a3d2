use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_rankbookd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rankbookd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn read_response(reader: &mut BufReader<ChildStdout>) -> serde_json::Value {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response");
    serde_json::from_str(line.trim()).expect("parse response json")
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let value = read_response(reader);
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("rankbook-router-smoke");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health["result"]["workspacePath"].is_null());
    let _ = request(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let created = request(
        &mut stdin,
        &mut reader,
        "3",
        "students.create",
        json!({ "schoolId": 1, "formLevel": 1, "firstName": "Smoke", "lastName": "Student" }),
    );
    let student_id = created["result"]["studentId"]
        .as_str()
        .expect("studentId")
        .to_string();

    let listed = request(
        &mut stdin,
        &mut reader,
        "4",
        "students.list",
        json!({ "schoolId": 1 }),
    );
    assert_eq!(listed["result"]["students"].as_array().map(|a| a.len()), Some(1));

    let period = json!({ "term": "Term 1", "academicYear": "2024-2025", "schoolId": 1 });
    let mut cohort = period.clone();
    cohort["formLevel"] = json!(1);

    let mut upsert = cohort.clone();
    upsert["marks"] = json!([
        { "studentId": student_id, "subject": "English", "mark": 70 },
        { "studentId": student_id, "subject": "Mathematics", "mark": 64 },
    ]);
    let upserted = request(&mut stdin, &mut reader, "5", "marks.upsert", upsert);
    assert_eq!(upserted["result"]["upserted"], json!(2));

    let mut for_student = period.clone();
    for_student["studentId"] = json!(student_id);
    let marks = request(&mut stdin, &mut reader, "6", "marks.forStudent", for_student.clone());
    assert_eq!(marks["result"]["marks"]["English"], json!(70));

    let _ = request(&mut stdin, &mut reader, "7", "rankings.cohort", cohort.clone());

    let mut by_subject = cohort.clone();
    by_subject["subject"] = json!("English");
    let _ = request(
        &mut stdin,
        &mut reader,
        "8",
        "rankings.subjectStandings",
        by_subject.clone(),
    );
    by_subject["studentId"] = json!(student_id);
    let _ = request(
        &mut stdin,
        &mut reader,
        "9",
        "rankings.subjectPosition",
        by_subject,
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "10",
        "rankings.studentSummary",
        for_student.clone(),
    );

    let mut top = cohort.clone();
    top["category"] = json!("overall");
    let _ = request(&mut stdin, &mut reader, "11", "rankings.topPerformers", top);
    let _ = request(
        &mut stdin,
        &mut reader,
        "12",
        "reports.subjectAnalysis",
        cohort.clone(),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "12b",
        "reports.passFailSummary",
        cohort.clone(),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "13",
        "reports.reportCard",
        for_student.clone(),
    );

    let mut delete = for_student.clone();
    delete["subject"] = json!("Mathematics");
    let deleted = request(&mut stdin, &mut reader, "14", "marks.delete", delete.clone());
    assert_eq!(deleted["result"]["deleted"], json!(true));
    let again = request(&mut stdin, &mut reader, "15", "marks.delete", delete);
    assert_eq!(again["result"]["deleted"], json!(false));

    let health = request(&mut stdin, &mut reader, "16", "health", json!({}));
    assert!(health["result"]["workspacePath"].is_string());

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn unknown_method_and_bad_json_are_reported() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    writeln!(stdin, "{{not json").expect("write");
    stdin.flush().expect("flush");
    let bad = read_response(&mut reader);
    assert_eq!(bad["ok"], json!(false));
    assert_eq!(bad["error"]["code"], json!("bad_json"));

    writeln!(stdin, "{}", json!({ "id": "x", "method": "grades.explode" })).expect("write");
    stdin.flush().expect("flush");
    let unknown = read_response(&mut reader);
    assert_eq!(unknown["id"], json!("x"));
    assert_eq!(unknown["error"]["code"], json!("not_implemented"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn workspace_flag_opens_database_at_startup() {
    let workspace = temp_dir("rankbook-startup-workspace");
    let exe = env!("CARGO_BIN_EXE_rankbookd");
    let mut child = Command::new(exe)
        .arg("--workspace")
        .arg(&workspace)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rankbookd");
    let mut stdin = child.stdin.take().expect("child stdin");
    let mut reader = BufReader::new(child.stdout.take().expect("child stdout"));

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health["result"]["workspacePath"].is_string());
    assert!(workspace.join("rankbook.sqlite3").exists());

    drop(stdin);
    let _ = child.wait();
}
