use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{ChildStdin, ChildStdout, Command, Stdio};
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

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value["id"], json!(id));
    value
}

fn error_code(resp: &serde_json::Value) -> &str {
    assert_eq!(resp["ok"], json!(false), "expected failure: {}", resp);
    resp["error"]["code"].as_str().unwrap_or("unknown")
}

#[test]
fn marks_validation_rejects_bad_input_without_partial_writes() {
    let workspace = temp_dir("rankbook-ingestion");
    let exe = env!("CARGO_BIN_EXE_rankbookd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rankbookd");
    let mut stdin = child.stdin.take().expect("child stdin");
    let mut reader = BufReader::new(child.stdout.take().expect("child stdout"));

    let cohort = json!({ "formLevel": 2, "term": "Term 1", "academicYear": "2025-2026", "schoolId": 3 });

    // Nothing works before a workspace is selected.
    let resp = request(&mut stdin, &mut reader, "0", "rankings.cohort", cohort.clone());
    assert_eq!(error_code(&resp), "no_workspace");

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(resp["ok"], json!(true));

    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "schoolId": 3, "formLevel": 2, "firstName": "Kim", "lastName": "Gondwe" }),
    );
    let sid = resp["result"]["studentId"].as_str().expect("studentId").to_string();

    // Empty cohort is a valid, empty ranking.
    let resp = request(&mut stdin, &mut reader, "3", "rankings.cohort", cohort.clone());
    assert_eq!(resp["ok"], json!(true));
    assert_eq!(resp["result"]["totalStudents"], json!(0));
    assert_eq!(resp["result"]["rankings"], json!([]));

    for (id, bad) in [("4", 101), ("5", -1)] {
        let mut params = cohort.clone();
        params["marks"] = json!([
            { "studentId": sid, "subject": "English", "mark": 60 },
            { "studentId": sid, "subject": "Biology", "mark": bad },
        ]);
        let resp = request(&mut stdin, &mut reader, id, "marks.upsert", params);
        assert_eq!(error_code(&resp), "bad_params");
        assert_eq!(resp["error"]["details"]["mark"], json!(bad));
    }

    let mut params = cohort.clone();
    params["marks"] = json!([{ "studentId": sid, "subject": "Astrology", "mark": 60 }]);
    let resp = request(&mut stdin, &mut reader, "6", "marks.upsert", params);
    assert_eq!(error_code(&resp), "bad_params");

    let mut params = cohort.clone();
    params["marks"] = json!([
        { "studentId": sid, "subject": "English", "mark": 60 },
        { "studentId": "ghost", "subject": "English", "mark": 60 },
    ]);
    let resp = request(&mut stdin, &mut reader, "7", "marks.upsert", params);
    assert_eq!(error_code(&resp), "not_found");

    // None of the rejected batches wrote anything.
    let resp = request(&mut stdin, &mut reader, "8", "rankings.cohort", cohort.clone());
    assert_eq!(resp["result"]["totalStudents"], json!(0));

    let mut params = cohort.clone();
    params["academicYear"] = json!("2025/26");
    let resp = request(&mut stdin, &mut reader, "9", "rankings.cohort", params);
    assert_eq!(error_code(&resp), "bad_params");

    let mut params = cohort.clone();
    params["formLevel"] = json!(5);
    let resp = request(&mut stdin, &mut reader, "10", "rankings.cohort", params);
    assert_eq!(error_code(&resp), "bad_params");

    let mut params = cohort.clone();
    params["category"] = json!("sports");
    let resp = request(&mut stdin, &mut reader, "11", "rankings.topPerformers", params);
    assert_eq!(error_code(&resp), "bad_params");

    let mut params = cohort.clone();
    params["studentId"] = json!("ghost");
    let resp = request(&mut stdin, &mut reader, "12", "rankings.studentSummary", params);
    assert_eq!(error_code(&resp), "not_found");

    // A known student with no marks summarizes as an insufficient FAIL.
    let mut params = cohort.clone();
    params["studentId"] = json!(sid);
    let resp = request(&mut stdin, &mut reader, "13", "rankings.studentSummary", params);
    assert_eq!(resp["result"]["status"], json!("FAIL"));
    assert_eq!(resp["result"]["subjectsTaken"], json!(0));
    assert_eq!(resp["result"]["average"], json!(0.0));

    // Once the period has Form 2 marks, Form 1 writes for it are refused.
    let mut params = cohort.clone();
    params["marks"] = json!([{ "studentId": sid, "subject": "English", "mark": 62 }]);
    let resp = request(&mut stdin, &mut reader, "14", "marks.upsert", params);
    assert_eq!(resp["ok"], json!(true));

    let mut params = cohort.clone();
    params["formLevel"] = json!(1);
    params["marks"] = json!([{ "studentId": sid, "subject": "History", "mark": 58 }]);
    let resp = request(&mut stdin, &mut reader, "15", "marks.upsert", params);
    assert_eq!(error_code(&resp), "bad_params");
    assert_eq!(resp["error"]["details"]["recordedFormLevel"], json!(2));

    drop(stdin);
    let _ = child.wait();
}
