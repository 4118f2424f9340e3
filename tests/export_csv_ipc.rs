mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, temp_dir};

/// Minimal RFC 4180 reader, enough to parse our own output back.
fn parse_csv(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                other => field.push(other),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => record.push(std::mem::take(&mut field)),
                '\n' => {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                '\r' => {}
                other => field.push(other),
            }
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

#[test]
fn csv_export_escapes_fields_and_reports_row_count() {
    let workspace = temp_dir("planningd-export");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "events.create",
        json!({
            "input": {
                "title": "Budget, salle \"polyvalente\"",
                "type": "meeting",
                "date": "2026-09-14",
                "startTime": "09:00",
                "endTime": "10:30",
                "location": "Room A",
                "description": "First line\nsecond line",
                "attendees": ["Director", "Bursar"],
                "priority": "high"
            }
        }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "events.create",
        json!({
            "input": {
                "title": "Autumn break",
                "type": "holiday",
                "date": "2026-10-19"
            }
        }),
    );

    let exported = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "planning.export",
        json!({ "format": "csv" }),
    );
    assert_eq!(exported.get("format").and_then(|v| v.as_str()), Some("csv"));
    assert_eq!(exported.get("rowCount").and_then(|v| v.as_u64()), Some(2));

    let content = exported
        .get("content")
        .and_then(|v| v.as_str())
        .expect("content");
    let records = parse_csv(content);
    assert_eq!(records.len(), 3);
    assert_eq!(
        records[0],
        vec![
            "Date",
            "Start Time",
            "Title",
            "Type",
            "Status",
            "Location",
            "Attendees",
            "Description",
            "Priority",
            "Duration (min)"
        ]
    );
    let row = &records[1];
    assert_eq!(row[0], "2026-09-14");
    assert_eq!(row[1], "09:00");
    assert_eq!(row[2], "Budget, salle \"polyvalente\"");
    assert_eq!(row[3], "Meeting");
    assert_eq!(row[4], "Scheduled");
    assert_eq!(row[6], "Director; Bursar");
    assert_eq!(row[7], "First line\nsecond line");
    assert_eq!(row[8], "high");
    assert_eq!(row[9], "90");
    // Timeless events export with empty time and duration cells.
    assert_eq!(records[2][1], "");
    assert_eq!(records[2][9], "");

    // Export respects the listing filters.
    let filtered = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "planning.export",
        json!({ "format": "csv", "filters": { "type": "holiday" } }),
    );
    assert_eq!(filtered.get("rowCount").and_then(|v| v.as_u64()), Some(1));

    let err = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "planning.export",
        json!({ "format": "pdf" }),
        "bad_params",
    );
    assert_eq!(
        err.get("details")
            .and_then(|d| d.get("field"))
            .and_then(|v| v.as_str()),
        Some("format")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
