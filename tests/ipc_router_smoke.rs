mod test_support;

use serde_json::json;
use test_support::{request, request_err, request_ok, spawn_sidecar, temp_dir};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("planningd-router-smoke");
    let bundle_out = workspace.join("smoke-backup.planbackup.zip");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health.get("version").and_then(|v| v.as_str()).is_some());

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let created = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "events.create",
        json!({
            "input": {
                "title": "Smoke Meeting",
                "type": "meeting",
                "date": "2026-09-10",
                "startTime": "09:00",
                "endTime": "10:00"
            }
        }),
    );
    let event_id = created
        .get("event")
        .and_then(|v| v.get("id"))
        .and_then(|v| v.as_str())
        .expect("event id")
        .to_string();

    let _ = request_ok(&mut stdin, &mut reader, "4", "events.list", json!({}));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "events.byDate",
        json!({ "date": "2026-09-10" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "events.week",
        json!({ "startDate": "2026-09-07" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "availability.check",
        json!({ "date": "2026-09-10", "startTime": "09:30", "endTime": "10:30" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "planning.statistics",
        json!({ "today": "2026-09-08" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "planning.export",
        json!({ "format": "csv" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "reminders.send",
        json!({ "eventId": event_id }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "reminders.outbox.list",
        json!({}),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "backup.exportWorkspaceBundle",
        json!({ "outPath": bundle_out.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "13",
        "backup.importWorkspaceBundle",
        json!({ "inPath": bundle_out.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "14",
        "events.delete",
        json!({ "eventId": event_id }),
    );

    let unknown = request(
        &mut stdin,
        &mut reader,
        "15",
        "events.frobnicate",
        json!({}),
    );
    assert_eq!(unknown.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        unknown
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("not_implemented")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn workspace_is_required_before_event_methods() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "events.list",
        json!({}),
        "no_workspace",
    );
    let _ = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "planning.statistics",
        json!({}),
        "no_workspace",
    );
    let _ = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "workspace.select",
        json!({}),
        "bad_params",
    );

    drop(stdin);
    let _ = child.wait();
}
