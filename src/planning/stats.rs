use std::collections::BTreeMap;

use chrono::{Duration as ChronoDuration, NaiveDate};
use serde::Serialize;

use crate::planning::event::{Event, EventStatus, EventType};
use crate::planning::time::format_iso_date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningStatistics {
    pub total: u64,
    pub today: u64,
    pub this_week: u64,
    pub by_status: BTreeMap<&'static str, u64>,
    pub by_type: BTreeMap<&'static str, u64>,
    pub pending_confirmations: u64,
    pub upcoming_this_week: u64,
}

/// Deterministic reduction over a given event list. `byStatus`/`byType` carry
/// every enum value, zero-filled, so their sums always equal `total`. The week
/// window is `[today, today + 7]` inclusive.
pub fn calculate_statistics(events: &[Event], today: NaiveDate) -> PlanningStatistics {
    let today_key = format_iso_date(today);
    let week_end_key = format_iso_date(today + ChronoDuration::days(7));

    let mut by_status: BTreeMap<&'static str, u64> =
        EventStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    let mut by_type: BTreeMap<&'static str, u64> =
        EventType::ALL.iter().map(|t| (t.as_str(), 0)).collect();

    let mut today_count = 0;
    let mut this_week = 0;
    let mut pending_confirmations = 0;
    let mut upcoming_this_week = 0;

    for event in events {
        *by_status.entry(event.status.as_str()).or_insert(0) += 1;
        *by_type.entry(event.event_type.as_str()).or_insert(0) += 1;

        let in_week = event.date >= today_key && event.date <= week_end_key;
        if event.date == today_key {
            today_count += 1;
        }
        if in_week {
            this_week += 1;
            if event.status != EventStatus::Cancelled {
                upcoming_this_week += 1;
            }
        }
        if event.status == EventStatus::Pending {
            pending_confirmations += 1;
        }
    }

    PlanningStatistics {
        total: events.len() as u64,
        today: today_count,
        this_week,
        by_status,
        by_type,
        pending_confirmations,
        upcoming_this_week,
    }
}
