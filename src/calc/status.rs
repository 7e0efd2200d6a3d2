use super::model::Status;

/// Subjects a student must pass, English included, to be declared PASS.
pub const MIN_SUBJECTS_PASSED: usize = 6;

pub fn status(subjects_passed: usize, english_passed: bool) -> Status {
    if subjects_passed >= MIN_SUBJECTS_PASSED && english_passed {
        Status::Pass
    } else {
        Status::Fail
    }
}

pub fn status_reason(subjects_passed: usize, english_passed: bool) -> String {
    match (subjects_passed >= MIN_SUBJECTS_PASSED, english_passed) {
        (true, true) => "Passed 6 or more subjects including English".to_string(),
        (true, false) => "Failed English (English is mandatory for pass)".to_string(),
        (false, true) => format!(
            "Passed only {} subjects (minimum {} required)",
            subjects_passed, MIN_SUBJECTS_PASSED
        ),
        (false, false) => format!(
            "Passed only {} subjects and failed English",
            subjects_passed
        ),
    }
}
