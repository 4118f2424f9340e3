use serde_json::{json, Value as JsonValue};

use crate::ipc::error::{domain_err, err, ok};
use crate::ipc::handlers::{clock_from, db_conn, opt_bool, required_str};
use crate::ipc::types::{AppState, Request};
use crate::planning::sqlite::{SqliteEventStore, SqliteOutbox};
use crate::planning::PlanningService;

fn handle_send(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let event_id = match required_str(req, "eventId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let force = match opt_bool(req, "force", false) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let clock = match clock_from(req) {
        Ok(c) => c,
        Err(e) => return e,
    };

    let mut svc = PlanningService::new(SqliteEventStore::new(conn), clock);
    let mut outbox = SqliteOutbox::new(conn);
    match svc.send_reminders(&event_id, force, &mut outbox) {
        Ok(summary) => ok(
            &req.id,
            serde_json::to_value(&summary).unwrap_or(JsonValue::Null),
        ),
        Err(e) => domain_err(&req.id, &e),
    }
}

fn handle_outbox_list(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let event_id = req
        .params
        .get("eventId")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let sql = match &event_id {
        Some(_) => {
            "SELECT id, event_id, channel, recipient, summary, queued_at
             FROM reminder_outbox WHERE event_id = ? ORDER BY queued_at, id"
        }
        None => {
            "SELECT id, event_id, channel, recipient, summary, queued_at
             FROM reminder_outbox ORDER BY queued_at, id"
        }
    };
    let mut stmt = match conn.prepare(sql) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let map_row = |r: &rusqlite::Row| -> rusqlite::Result<JsonValue> {
        Ok(json!({
            "id": r.get::<_, String>(0)?,
            "eventId": r.get::<_, String>(1)?,
            "channel": r.get::<_, String>(2)?,
            "recipient": r.get::<_, String>(3)?,
            "summary": r.get::<_, String>(4)?,
            "queuedAt": r.get::<_, String>(5)?,
        }))
    };
    let rows = match &event_id {
        Some(id) => stmt.query_map([id], map_row),
        None => stmt.query_map([], map_row),
    };
    let entries = match rows {
        Ok(rows) => match rows.collect::<Result<Vec<_>, _>>() {
            Ok(v) => v,
            Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
        },
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    ok(&req.id, json!({ "entries": entries }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reminders.send" => Some(handle_send(state, req)),
        "reminders.outbox.list" => Some(handle_outbox_list(state, req)),
        _ => None,
    }
}
