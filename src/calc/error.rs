use thiserror::Error;

/// Errors surfaced to callers of the engine and the mark store.
///
/// Empty cohorts, missing marks and ties are not errors; they come back as
/// defined outputs.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A raw mark outside 0..=100. Rejected at ingestion.
    #[error("mark {mark} is outside 0-100")]
    InvalidMarkRange { mark: i64 },

    #[error("form level {0} is not one of 1, 2, 3, 4")]
    InvalidFormLevel(i64),

    #[error("unknown subject: {0}")]
    UnknownSubject(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Blank term or an academic year not shaped like `2024-2025`.
    #[error("malformed period: {0}")]
    MalformedPeriod(String),

    #[error("student not found: {0}")]
    StudentNotFound(String),

    /// A student's marks for one period must all carry one form level.
    #[error("student {student_id} already has form {recorded} marks for this period, not form {requested}")]
    FormLevelConflict {
        student_id: String,
        recorded: i64,
        requested: i64,
    },

    #[error("mark store query failed: {0}")]
    Store(#[from] rusqlite::Error),
}

impl EngineError {
    /// Stable wire code used in the IPC error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidMarkRange { .. }
            | EngineError::InvalidFormLevel(_)
            | EngineError::UnknownSubject(_)
            | EngineError::UnknownCategory(_)
            | EngineError::MalformedPeriod(_)
            | EngineError::FormLevelConflict { .. } => "bad_params",
            EngineError::StudentNotFound(_) => "not_found",
            EngineError::Store(_) => "db_query_failed",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            EngineError::InvalidMarkRange { mark } => Some(serde_json::json!({ "mark": mark })),
            EngineError::StudentNotFound(id) => Some(serde_json::json!({ "studentId": id })),
            EngineError::FormLevelConflict {
                student_id,
                recorded,
                requested,
            } => Some(serde_json::json!({
                "studentId": student_id,
                "recordedFormLevel": recorded,
                "requestedFormLevel": requested,
            })),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_split_caller_errors_from_store_failures() {
        assert_eq!(EngineError::InvalidMarkRange { mark: 101 }.code(), "bad_params");
        assert_eq!(EngineError::MalformedPeriod("x".into()).code(), "bad_params");
        assert_eq!(EngineError::StudentNotFound("s1".into()).code(), "not_found");
        let conflict = EngineError::FormLevelConflict {
            student_id: "s1".into(),
            recorded: 1,
            requested: 3,
        };
        assert_eq!(conflict.code(), "bad_params");
        assert_eq!(conflict.details().unwrap()["recordedFormLevel"], 1);
        assert_eq!(
            EngineError::Store(rusqlite::Error::QueryReturnedNoRows).code(),
            "db_query_failed"
        );
    }
}
