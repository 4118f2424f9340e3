use serde_json::json;

use crate::planning::error::PlanningError;

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

/// Maps a planning domain error onto the wire codes the frontend matches on.
pub fn domain_err(id: &str, e: &PlanningError) -> serde_json::Value {
    match e {
        PlanningError::Validation { field, .. } => {
            err(id, "bad_params", e.to_string(), Some(json!({ "field": field })))
        }
        PlanningError::NotFound { id: event_id } => {
            err(id, "not_found", e.to_string(), Some(json!({ "id": event_id })))
        }
        PlanningError::InvalidTransition { from, attempted } => err(
            id,
            "invalid_state",
            e.to_string(),
            Some(json!({ "from": from, "attempted": attempted })),
        ),
        PlanningError::Storage(_) => err(id, "db_query_failed", e.to_string(), None),
    }
}
