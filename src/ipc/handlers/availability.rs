use serde_json::Value as JsonValue;

use crate::ipc::error::{domain_err, ok};
use crate::ipc::handlers::{clock_from, db_conn, required_str};
use crate::ipc::types::{AppState, Request};
use crate::planning::sqlite::SqliteEventStore;
use crate::planning::PlanningService;

fn handle_check(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let date = match required_str(req, "date") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let start_time = match required_str(req, "startTime") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let end_time = match required_str(req, "endTime") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let exclude_id = req
        .params
        .get("excludeId")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let clock = match clock_from(req) {
        Ok(c) => c,
        Err(e) => return e,
    };

    let svc = PlanningService::new(SqliteEventStore::new(conn), clock);
    match svc.check_availability(&date, &start_time, &end_time, exclude_id.as_deref()) {
        Ok(availability) => ok(
            &req.id,
            serde_json::to_value(&availability).unwrap_or(JsonValue::Null),
        ),
        Err(e) => domain_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "availability.check" => Some(handle_check(state, req)),
        _ => None,
    }
}
