use serde_json::json;

use crate::error::AttendanceError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn attendance_err(id: &str, e: &AttendanceError) -> serde_json::Value {
    let details = match e {
        AttendanceError::StoreRead { path, .. } | AttendanceError::StoreWrite { path, .. } => {
            Some(json!({ "path": path.to_string_lossy() }))
        }
        AttendanceError::Duplicate(name) => Some(json!({ "name": name })),
        _ => None,
    };
    err(id, e.code(), e.to_string(), details)
}
