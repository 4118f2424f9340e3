pub mod availability;
pub mod backup_exchange;
pub mod core;
pub mod events;
pub mod planning_views;
pub mod reminders;

use rusqlite::Connection;
use serde_json::Value as JsonValue;

use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::planning::time::parse_iso_date;
use crate::planning::Clock;

pub(crate) fn db_conn<'a>(
    state: &'a AppState,
    req: &Request,
) -> Result<&'a Connection, serde_json::Value> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub(crate) fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub(crate) fn opt_bool(
    req: &Request,
    key: &str,
    default: bool,
) -> Result<bool, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(default),
        Some(v) if v.is_null() => Ok(default),
        Some(v) => v
            .as_bool()
            .ok_or_else(|| err(&req.id, "bad_params", format!("{} must be boolean", key), None)),
    }
}

/// Wall clock unless the request carries a `today` override (used by the
/// frontend to pin statistics windows, and by tests for determinism).
pub(crate) fn clock_from(req: &Request) -> Result<Clock, serde_json::Value> {
    match req.params.get("today") {
        None => Ok(Clock::Wall),
        Some(v) if v.is_null() => Ok(Clock::Wall),
        Some(v) => {
            let raw = v.as_str().ok_or_else(|| {
                err(&req.id, "bad_params", "today must be a YYYY-MM-DD string", None)
            })?;
            let date = parse_iso_date(raw).ok_or_else(|| {
                err(
                    &req.id,
                    "bad_params",
                    format!("today is not a valid date: {raw:?}"),
                    None,
                )
            })?;
            Ok(Clock::fixed_date(date))
        }
    }
}

pub(crate) fn event_json(event: &crate::planning::event::Event) -> JsonValue {
    serde_json::to_value(event).unwrap_or(JsonValue::Null)
}
