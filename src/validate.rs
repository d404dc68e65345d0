//! Request body validation for song create/edit
//!
//! The body is checked in full before any storage access; the first
//! violation is reported with a message naming the offending field.

use serde_json::Value;

use crate::error::ApiError;

/// Validated song request body: `{"file": {"id": <integer>}}`
#[derive(Debug, Clone, Copy)]
pub struct SongBody {
    pub file: FileRef,
}

/// Reference to an existing file by id
#[derive(Debug, Clone, Copy)]
pub struct FileRef {
    pub id: i64,
}

/// Check a parsed JSON body against the song schema
pub fn song_body(value: &Value) -> Result<SongBody, ApiError> {
    let Some(body) = value.as_object() else {
        return Err(invalid("request body must be a JSON object"));
    };

    let Some(file) = body.get("file") else {
        return Err(invalid("'file' is a required property"));
    };
    let Some(file) = file.as_object() else {
        return Err(invalid("'file' must be an object"));
    };

    let Some(id) = file.get("id") else {
        return Err(invalid("'file.id' is a required property"));
    };
    let Some(id) = id.as_i64() else {
        return Err(invalid("'file.id' must be a number"));
    };

    Ok(SongBody {
        file: FileRef { id },
    })
}

fn invalid(message: &str) -> ApiError {
    ApiError::Validation(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(err: ApiError) -> String {
        match err {
            ApiError::Validation(msg) => msg,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn accepts_valid_body() {
        let body = song_body(&json!({"file": {"id": 7}})).unwrap();
        assert_eq!(body.file.id, 7);
    }

    #[test]
    fn ignores_extra_properties() {
        let body = song_body(&json!({"file": {"id": 1, "name": "x.mp3"}, "note": "y"})).unwrap();
        assert_eq!(body.file.id, 1);
    }

    #[test]
    fn rejects_non_object_body() {
        let err = song_body(&json!([1, 2])).unwrap_err();
        assert_eq!(message(err), "request body must be a JSON object");
    }

    #[test]
    fn rejects_missing_file() {
        let err = song_body(&json!({"song": {"id": 1}})).unwrap_err();
        assert_eq!(message(err), "'file' is a required property");
    }

    #[test]
    fn rejects_non_object_file() {
        let err = song_body(&json!({"file": 3})).unwrap_err();
        assert_eq!(message(err), "'file' must be an object");
    }

    #[test]
    fn rejects_missing_id() {
        let err = song_body(&json!({"file": {}})).unwrap_err();
        assert_eq!(message(err), "'file.id' is a required property");
    }

    #[test]
    fn rejects_non_numeric_id() {
        let err = song_body(&json!({"file": {"id": "7"}})).unwrap_err();
        assert_eq!(message(err), "'file.id' must be a number");
    }
}
