mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, temp_dir};

#[test]
fn reminders_dispatch_records_outbox_and_skips_resends() {
    let workspace = temp_dir("planningd-reminders");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "events.create",
        json!({
            "input": {
                "title": "Meeting with the Martins",
                "type": "parent_meeting",
                "date": "2026-09-18",
                "startTime": "17:00",
                "endTime": "17:30",
                "reminders": [
                    { "channel": "email", "offset": "1d" },
                    { "channel": "sms", "offset": "1h", "enabled": false }
                ],
                "details": {
                    "kind": "parent_meeting",
                    "student": { "name": "Tom Martin", "class": "CE2" },
                    "parent": {
                        "name": "M. Martin",
                        "email": "martin@example.com",
                        "phone": "+33 6 12 34 56 78"
                    }
                }
            }
        }),
    );
    let event_id = created
        .get("event")
        .and_then(|e| e.get("id"))
        .and_then(|v| v.as_str())
        .expect("id")
        .to_string();

    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "reminders.send",
        json!({ "eventId": event_id }),
    );
    let dispatched = summary
        .get("dispatched")
        .and_then(|v| v.as_array())
        .expect("dispatched");
    assert_eq!(dispatched.len(), 1);
    assert_eq!(
        dispatched[0].get("channel").and_then(|v| v.as_str()),
        Some("email")
    );
    assert_eq!(
        dispatched[0].get("recipient").and_then(|v| v.as_str()),
        Some("martin@example.com")
    );
    let skipped = summary
        .get("skipped")
        .and_then(|v| v.as_array())
        .expect("skipped");
    assert_eq!(skipped.len(), 1);
    assert_eq!(
        skipped[0].get("reason").and_then(|v| v.as_str()),
        Some("disabled")
    );

    // The dispatch is recorded in the outbox.
    let outbox = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "reminders.outbox.list",
        json!({ "eventId": event_id }),
    );
    let entries = outbox
        .get("entries")
        .and_then(|v| v.as_array())
        .expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].get("channel").and_then(|v| v.as_str()),
        Some("email")
    );
    assert!(entries[0]
        .get("summary")
        .and_then(|v| v.as_str())
        .expect("summary")
        .contains("Meeting with the Martins"));

    // A second send without force skips the already-sent reminder.
    let second = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "reminders.send",
        json!({ "eventId": event_id }),
    );
    assert_eq!(
        second
            .get("dispatched")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(0)
    );
    let reasons: Vec<&str> = second
        .get("skipped")
        .and_then(|v| v.as_array())
        .expect("skipped")
        .iter()
        .filter_map(|s| s.get("reason").and_then(|v| v.as_str()))
        .collect();
    assert!(reasons.contains(&"already sent"));

    // force re-sends and appends another outbox row.
    let forced = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "reminders.send",
        json!({ "eventId": event_id, "force": true }),
    );
    assert_eq!(
        forced
            .get("dispatched")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(1)
    );
    let outbox = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "reminders.outbox.list",
        json!({ "eventId": event_id }),
    );
    assert_eq!(
        outbox.get("entries").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(2)
    );

    let _ = request_err(
        &mut stdin,
        &mut reader,
        "8",
        "reminders.send",
        json!({ "eventId": "missing-event" }),
        "not_found",
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn reminder_failures_are_partial_not_fatal() {
    let workspace = temp_dir("planningd-reminders-partial");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    // Valid email, malformed phone number: email goes through, sms fails.
    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "events.create",
        json!({
            "input": {
                "title": "Interview J. Doe",
                "type": "interview",
                "date": "2026-09-25",
                "startTime": "11:00",
                "endTime": "12:00",
                "reminders": [
                    { "channel": "email", "offset": "1d" },
                    { "channel": "sms", "offset": "2h" }
                ],
                "details": {
                    "kind": "interview",
                    "candidateName": "J. Doe",
                    "candidateEmail": "j.doe@example.com",
                    "candidatePhone": "call me",
                    "position": "Maths teacher"
                }
            }
        }),
    );
    let event_id = created
        .get("event")
        .and_then(|e| e.get("id"))
        .and_then(|v| v.as_str())
        .expect("id")
        .to_string();

    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "reminders.send",
        json!({ "eventId": event_id }),
    );
    let dispatched = summary
        .get("dispatched")
        .and_then(|v| v.as_array())
        .expect("dispatched");
    assert_eq!(dispatched.len(), 1);
    assert_eq!(
        dispatched[0].get("channel").and_then(|v| v.as_str()),
        Some("email")
    );
    let failed = summary
        .get("failed")
        .and_then(|v| v.as_array())
        .expect("failed");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].get("channel").and_then(|v| v.as_str()), Some("sms"));

    // The failed channel stays unsent and is retried on the next call.
    let retry = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "reminders.send",
        json!({ "eventId": event_id }),
    );
    assert_eq!(
        retry
            .get("failed")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(1)
    );
    let reasons: Vec<&str> = retry
        .get("skipped")
        .and_then(|v| v.as_array())
        .expect("skipped")
        .iter()
        .filter_map(|s| s.get("reason").and_then(|v| v.as_str()))
        .collect();
    assert_eq!(reasons, vec!["already sent"]);

    // An event without any contact reports a failure per enabled reminder.
    let created = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "events.create",
        json!({
            "input": {
                "title": "Staff meeting",
                "type": "meeting",
                "date": "2026-09-26",
                "reminders": [{ "channel": "email", "offset": "1d" }]
            }
        }),
    );
    let plain_id = created
        .get("event")
        .and_then(|e| e.get("id"))
        .and_then(|v| v.as_str())
        .expect("id")
        .to_string();
    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "reminders.send",
        json!({ "eventId": plain_id }),
    );
    let failed = summary
        .get("failed")
        .and_then(|v| v.as_array())
        .expect("failed");
    assert_eq!(failed.len(), 1);
    assert!(failed[0]
        .get("reason")
        .and_then(|v| v.as_str())
        .expect("reason")
        .contains("no email recipient"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn replacing_reminders_keeps_sent_history() {
    let workspace = temp_dir("planningd-reminders-merge");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "events.create",
        json!({
            "input": {
                "title": "Inscription Lucas",
                "type": "inscription",
                "date": "2026-09-28",
                "reminders": [{ "channel": "email", "offset": "1d" }],
                "details": {
                    "kind": "inscription",
                    "student": { "name": "Lucas P." },
                    "parent": { "email": "p.lucas@example.com" }
                }
            }
        }),
    );
    let event_id = created
        .get("event")
        .and_then(|e| e.get("id"))
        .and_then(|v| v.as_str())
        .expect("id")
        .to_string();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "reminders.send",
        json!({ "eventId": event_id }),
    );

    // Replacing the reminder list keeps the sent flag for unchanged entries.
    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "events.update",
        json!({
            "eventId": event_id,
            "patch": { "reminders": [
                { "channel": "email", "offset": "1d" },
                { "channel": "email", "offset": "2h" }
            ] }
        }),
    );
    let reminders = updated
        .get("event")
        .and_then(|e| e.get("reminders"))
        .and_then(|v| v.as_array())
        .expect("reminders");
    assert_eq!(reminders.len(), 2);
    assert_eq!(reminders[0].get("sent").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(reminders[1].get("sent").and_then(|v| v.as_bool()), Some(false));

    // Only the new entry is dispatched on the next send.
    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "reminders.send",
        json!({ "eventId": event_id }),
    );
    let dispatched = summary
        .get("dispatched")
        .and_then(|v| v.as_array())
        .expect("dispatched");
    assert_eq!(dispatched.len(), 1);
    assert_eq!(
        dispatched[0].get("offset").and_then(|v| v.as_str()),
        Some("2h")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
