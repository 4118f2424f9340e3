use serde_json::Value as JsonValue;

use crate::planning::error::{PlanningError, PlanningResult};
use crate::planning::event::{Event, EventStatus, EventType};
use crate::planning::time::parse_iso_date;

/// Filter set for event listings. All provided predicates must hold (AND).
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub event_type: Option<EventType>,
    pub status: Option<EventStatus>,
    pub student_class: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub search: Option<String>,
}

impl EventFilter {
    /// Parses the optional `filters` param object. Malformed values are
    /// rejected with the field name rather than silently ignored.
    pub fn from_json(raw: Option<&JsonValue>) -> PlanningResult<EventFilter> {
        let mut filter = EventFilter::default();
        let Some(raw) = raw else {
            return Ok(filter);
        };
        if raw.is_null() {
            return Ok(filter);
        }
        let obj = raw
            .as_object()
            .ok_or_else(|| PlanningError::validation("filters", "must be an object"))?;

        if let Some(v) = non_null(obj.get("type")) {
            let s = v
                .as_str()
                .ok_or_else(|| PlanningError::validation("type", "must be a string"))?;
            filter.event_type = Some(
                EventType::parse(s)
                    .ok_or_else(|| PlanningError::validation("type", format!("unknown type {s:?}")))?,
            );
        }
        if let Some(v) = non_null(obj.get("status")) {
            let s = v
                .as_str()
                .ok_or_else(|| PlanningError::validation("status", "must be a string"))?;
            filter.status = Some(EventStatus::parse(s).ok_or_else(|| {
                PlanningError::validation("status", format!("unknown status {s:?}"))
            })?);
        }
        if let Some(v) = non_null(obj.get("studentClass")) {
            let s = v
                .as_str()
                .ok_or_else(|| PlanningError::validation("studentClass", "must be a string"))?;
            let t = s.trim();
            if !t.is_empty() {
                filter.student_class = Some(t.to_string());
            }
        }
        if let Some(v) = non_null(obj.get("startDate")) {
            filter.start_date = Some(parse_date_field(v, "startDate")?);
        }
        if let Some(v) = non_null(obj.get("endDate")) {
            filter.end_date = Some(parse_date_field(v, "endDate")?);
        }
        if let (Some(start), Some(end)) = (&filter.start_date, &filter.end_date) {
            if start > end {
                return Err(PlanningError::validation(
                    "endDate",
                    "must not be before startDate",
                ));
            }
        }
        if let Some(v) = non_null(obj.get("search")) {
            let s = v
                .as_str()
                .ok_or_else(|| PlanningError::validation("search", "must be a string"))?;
            let t = s.trim();
            if !t.is_empty() {
                filter.search = Some(t.to_string());
            }
        }
        Ok(filter)
    }

    pub fn matches(&self, event: &Event) -> bool {
        if let Some(t) = self.event_type {
            if event.event_type != t {
                return false;
            }
        }
        if let Some(s) = self.status {
            if event.status != s {
                return false;
            }
        }
        if let Some(class) = &self.student_class {
            if event.student_class() != Some(class.as_str()) {
                return false;
            }
        }
        if let Some(start) = &self.start_date {
            if event.date.as_str() < start.as_str() {
                return false;
            }
        }
        if let Some(end) = &self.end_date {
            if event.date.as_str() > end.as_str() {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let mut haystacks = vec![event.title.as_str()];
            haystacks.extend(event.description.as_deref());
            haystacks.extend(event.location.as_deref());
            haystacks.extend(event.student_name());
            if !haystacks
                .iter()
                .any(|h| h.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }
}

fn non_null(v: Option<&JsonValue>) -> Option<&JsonValue> {
    v.filter(|v| !v.is_null())
}

fn parse_date_field(v: &JsonValue, field: &'static str) -> PlanningResult<String> {
    let s = v
        .as_str()
        .ok_or_else(|| PlanningError::validation(field, "must be a YYYY-MM-DD string"))?;
    let date = parse_iso_date(s)
        .ok_or_else(|| PlanningError::validation(field, format!("not a valid date: {s:?}")))?;
    Ok(crate::planning::time::format_iso_date(date))
}

/// Ascending by calendar date, then start time. Events without a start time
/// sort before timed events on the same day.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| {
        (a.date.as_str(), a.start_time.as_deref().unwrap_or(""))
            .cmp(&(b.date.as_str(), b.start_time.as_deref().unwrap_or("")))
    });
}
