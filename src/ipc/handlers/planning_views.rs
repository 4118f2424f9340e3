use serde_json::{json, Value as JsonValue};

use crate::ipc::error::{domain_err, err, ok};
use crate::ipc::handlers::{clock_from, db_conn, required_str};
use crate::ipc::types::{AppState, Request};
use crate::planning::filter::EventFilter;
use crate::planning::sqlite::SqliteEventStore;
use crate::planning::PlanningService;

fn handle_statistics(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let filter = match EventFilter::from_json(req.params.get("filters")) {
        Ok(f) => f,
        Err(e) => return domain_err(&req.id, &e),
    };
    let clock = match clock_from(req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let svc = PlanningService::new(SqliteEventStore::new(conn), clock);
    match svc.statistics(&filter) {
        Ok(stats) => ok(
            &req.id,
            json!({ "statistics": serde_json::to_value(&stats).unwrap_or(JsonValue::Null) }),
        ),
        Err(e) => domain_err(&req.id, &e),
    }
}

fn handle_export(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let format = match required_str(req, "format") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if format != "csv" {
        return err(
            &req.id,
            "bad_params",
            format!("unsupported export format: {format:?}"),
            Some(json!({ "field": "format" })),
        );
    }
    let filter = match EventFilter::from_json(req.params.get("filters")) {
        Ok(f) => f,
        Err(e) => return domain_err(&req.id, &e),
    };
    let clock = match clock_from(req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let svc = PlanningService::new(SqliteEventStore::new(conn), clock);
    match svc.list_events(&filter) {
        Ok(view) => {
            let content = crate::planning::export::export_csv(&view.events);
            ok(
                &req.id,
                json!({ "format": "csv", "content": content, "rowCount": view.events.len() }),
            )
        }
        Err(e) => domain_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "planning.statistics" => Some(handle_statistics(state, req)),
        "planning.export" => Some(handle_export(state, req)),
        _ => None,
    }
}
