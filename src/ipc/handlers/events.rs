use rusqlite::Connection;
use serde_json::{json, Value as JsonValue};

use crate::ipc::error::{domain_err, err, ok};
use crate::ipc::handlers::{clock_from, db_conn, event_json, required_str};
use crate::ipc::types::{AppState, Request};
use crate::planning::event::{EventDraft, EventPatch};
use crate::planning::filter::EventFilter;
use crate::planning::sqlite::SqliteEventStore;
use crate::planning::PlanningService;

fn service<'a>(
    conn: &'a Connection,
    req: &Request,
) -> Result<PlanningService<SqliteEventStore<'a>>, JsonValue> {
    let clock = clock_from(req)?;
    Ok(PlanningService::new(SqliteEventStore::new(conn), clock))
}

fn parse_input<T: serde::de::DeserializeOwned + Default>(
    req: &Request,
    key: &str,
    required: bool,
) -> Result<T, JsonValue> {
    match req.params.get(key) {
        None if required => Err(err(&req.id, "bad_params", format!("missing {}", key), None)),
        None => Ok(T::default()),
        Some(v) if v.is_null() && !required => Ok(T::default()),
        Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
            err(&req.id, "bad_params", format!("invalid {}: {}", key, e), None)
        }),
    }
}

fn handle_create(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let draft: EventDraft = match parse_input(req, "input", true) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let mut svc = match service(conn, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    match svc.create_event(draft) {
        Ok(event) => ok(&req.id, json!({ "event": event_json(&event) })),
        Err(e) => domain_err(&req.id, &e),
    }
}

fn handle_update(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let event_id = match required_str(req, "eventId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let patch: EventPatch = match parse_input(req, "patch", true) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let mut svc = match service(conn, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    match svc.update_event(&event_id, patch) {
        Ok(event) => ok(&req.id, json!({ "event": event_json(&event) })),
        Err(e) => domain_err(&req.id, &e),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let event_id = match required_str(req, "eventId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let mut svc = match service(conn, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    match svc.delete_event(&event_id) {
        Ok(()) => ok(&req.id, json!({ "deleted": true })),
        Err(e) => domain_err(&req.id, &e),
    }
}

fn handle_confirm(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let event_id = match required_str(req, "eventId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let mut svc = match service(conn, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    match svc.confirm_event(&event_id) {
        Ok(event) => ok(&req.id, json!({ "event": event_json(&event) })),
        Err(e) => domain_err(&req.id, &e),
    }
}

fn handle_cancel(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let event_id = match required_str(req, "eventId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let reason = match required_str(req, "reason") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let cancelled_by = req
        .params
        .get("cancelledBy")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let mut svc = match service(conn, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    match svc.cancel_event(&event_id, &reason, cancelled_by) {
        Ok(event) => ok(&req.id, json!({ "event": event_json(&event) })),
        Err(e) => domain_err(&req.id, &e),
    }
}

fn handle_list(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let filter = match EventFilter::from_json(req.params.get("filters")) {
        Ok(f) => f,
        Err(e) => return domain_err(&req.id, &e),
    };
    let svc = match service(conn, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    match svc.list_events(&filter) {
        Ok(view) => ok(
            &req.id,
            serde_json::to_value(&view).unwrap_or(JsonValue::Null),
        ),
        Err(e) => domain_err(&req.id, &e),
    }
}

fn handle_by_date(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let date = match required_str(req, "date") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let svc = match service(conn, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    match svc.events_by_date(&date) {
        Ok(events) => {
            let events: Vec<JsonValue> = events.iter().map(event_json).collect();
            ok(&req.id, json!({ "events": events }))
        }
        Err(e) => domain_err(&req.id, &e),
    }
}

fn handle_week(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let start_date = match required_str(req, "startDate") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let svc = match service(conn, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    match svc.week_events(&start_date) {
        Ok(events) => {
            let events: Vec<JsonValue> = events.iter().map(event_json).collect();
            ok(&req.id, json!({ "events": events }))
        }
        Err(e) => domain_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "events.create" => Some(handle_create(state, req)),
        "events.update" => Some(handle_update(state, req)),
        "events.delete" => Some(handle_delete(state, req)),
        "events.confirm" => Some(handle_confirm(state, req)),
        "events.cancel" => Some(handle_cancel(state, req)),
        "events.list" => Some(handle_list(state, req)),
        "events.byDate" => Some(handle_by_date(state, req)),
        "events.week" => Some(handle_week(state, req)),
        _ => None,
    }
}
