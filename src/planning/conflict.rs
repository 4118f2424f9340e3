use serde::Serialize;

use crate::planning::event::{Event, EventStatus};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub available: bool,
    pub conflicts: Vec<Event>,
}

/// Half-open interval intersection: `[s1,e1)` and `[s2,e2)` conflict iff
/// `s1 < e2 && s2 < e1`. An event ending exactly when another starts does
/// not conflict.
pub fn overlaps(s1: u16, e1: u16, s2: u16, e2: u16) -> bool {
    s1 < e2 && s2 < e1
}

/// Conflicts for a candidate window on one date. Cancelled events and events
/// without a time window are never conflicts; `exclude_id` skips the event
/// being edited.
pub fn find_conflicts(
    events: &[Event],
    date: &str,
    start: u16,
    end: u16,
    exclude_id: Option<&str>,
) -> Vec<Event> {
    let mut conflicts: Vec<Event> = events
        .iter()
        .filter(|e| e.date == date)
        .filter(|e| e.status != EventStatus::Cancelled)
        .filter(|e| exclude_id != Some(e.id.as_str()))
        .filter(|e| match e.time_window() {
            Some((s2, e2)) => overlaps(start, end, s2, e2),
            None => false,
        })
        .cloned()
        .collect();
    crate::planning::filter::sort_events(&mut conflicts);
    conflicts
}

pub fn check(
    events: &[Event],
    date: &str,
    start: u16,
    end: u16,
    exclude_id: Option<&str>,
) -> Availability {
    let conflicts = find_conflicts(events, date, start, end, exclude_id);
    Availability {
        available: conflicts.is_empty(),
        conflicts,
    }
}
