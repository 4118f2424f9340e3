use crate::planning::event::Event;

pub const EXPORT_HEADER: [&str; 10] = [
    "Date",
    "Start Time",
    "Title",
    "Type",
    "Status",
    "Location",
    "Attendees",
    "Description",
    "Priority",
    "Duration (min)",
];

/// Flat row projection for one event, in header order.
pub fn event_row(event: &Event) -> Vec<String> {
    vec![
        event.date.clone(),
        event.start_time.clone().unwrap_or_default(),
        event.title.clone(),
        event.event_type.label().to_string(),
        event.status.label().to_string(),
        event.location.clone().unwrap_or_default(),
        event.attendees.join("; "),
        event.description.clone().unwrap_or_default(),
        event.priority.as_str().to_string(),
        event
            .duration_minutes
            .map(|d| d.to_string())
            .unwrap_or_default(),
    ]
}

fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn write_record(out: &mut String, fields: &[String]) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        out.push_str(&csv_quote(field));
        first = false;
    }
    out.push('\n');
}

/// Header plus one row per event. Free-text fields are quoted, so embedded
/// commas, quotes, and newlines survive a parse back.
pub fn export_csv(events: &[Event]) -> String {
    let mut out = String::new();
    let header: Vec<String> = EXPORT_HEADER.iter().map(|h| h.to_string()).collect();
    write_record(&mut out, &header);
    for event in events {
        write_record(&mut out, &event_row(event));
    }
    out
}
