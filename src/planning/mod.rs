pub mod conflict;
pub mod error;
pub mod event;
pub mod export;
pub mod filter;
pub mod notify;
pub mod sqlite;
pub mod stats;
pub mod store;
pub mod time;

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::planning::conflict::Availability;
use crate::planning::error::{PlanningError, PlanningResult};
use crate::planning::event::{
    Event, EventDraft, EventPatch, EventStatus, Reminder, ReminderSpec,
};
use crate::planning::filter::{sort_events, EventFilter};
use crate::planning::notify::{
    DispatchFailure, DispatchRecord, DispatchSkip, DispatchSummary, Notifier, ReminderPayload,
};
use crate::planning::stats::PlanningStatistics;
use crate::planning::store::EventStore;
use crate::planning::time::{format_iso_date, parse_hhmm, parse_iso_date};

/// Time source for `createdAt`/`updatedAt` stamps and "today" comparisons.
/// Injectable so statistics and audit fields are testable.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    Wall,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn fixed_date(date: NaiveDate) -> Clock {
        Clock::Fixed(date.and_time(NaiveTime::MIN).and_utc())
    }

    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Wall => Utc::now(),
            Clock::Fixed(now) => *now,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    pub fn timestamp(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Filtered listing plus statistics computed over the same filtered set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningView {
    pub events: Vec<Event>,
    pub statistics: PlanningStatistics,
}

pub struct PlanningService<S: EventStore> {
    store: S,
    clock: Clock,
}

impl<S: EventStore> PlanningService<S> {
    pub fn new(store: S, clock: Clock) -> Self {
        PlanningService { store, clock }
    }

    pub fn create_event(&mut self, draft: EventDraft) -> PlanningResult<Event> {
        let title = draft
            .title
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PlanningError::validation("title", "must be a non-empty string"))?
            .to_string();
        let event_type = draft
            .event_type
            .ok_or_else(|| PlanningError::validation("type", "is required"))?;
        let date_raw = draft
            .date
            .ok_or_else(|| PlanningError::validation("date", "is required"))?;
        let date = parse_iso_date(&date_raw)
            .map(format_iso_date)
            .ok_or_else(|| {
                PlanningError::validation("date", format!("not a valid date: {date_raw:?}"))
            })?;
        let start_time = normalize_time(draft.start_time, "startTime")?;
        let end_time = normalize_time(draft.end_time, "endTime")?;
        check_time_order(start_time.as_deref(), end_time.as_deref())?;

        let status = draft.status.unwrap_or(EventStatus::Scheduled);
        if status == EventStatus::Cancelled {
            return Err(PlanningError::validation(
                "status",
                "cannot create an event as cancelled",
            ));
        }
        if let Some(details) = &draft.details {
            if details.kind() != event_type {
                return Err(PlanningError::validation(
                    "details",
                    format!(
                        "kind {} does not match event type {}",
                        details.kind().as_str(),
                        event_type.as_str()
                    ),
                ));
            }
        }

        let now = self.clock.timestamp();
        let mut event = Event {
            id: Uuid::new_v4().to_string(),
            title,
            event_type,
            date,
            start_time,
            end_time,
            duration_minutes: None,
            status,
            priority: draft.priority.unwrap_or(event::Priority::Medium),
            location: clean_opt(draft.location),
            description: clean_opt(draft.description),
            notes: clean_opt(draft.notes),
            attendees: clean_attendees(draft.attendees.unwrap_or_default()),
            reminders: draft
                .reminders
                .unwrap_or_default()
                .into_iter()
                .map(ReminderSpec::into_reminder)
                .collect(),
            details: draft.details,
            created_by: clean_opt(draft.created_by),
            created_at: now.clone(),
            updated_at: now,
            cancelled_at: None,
            cancelled_by: None,
            cancellation_reason: None,
        };
        event.recompute_duration();

        self.store.insert(&event).map_err(PlanningError::storage)?;
        Ok(event)
    }

    pub fn update_event(&mut self, id: &str, patch: EventPatch) -> PlanningResult<Event> {
        let mut event = self.get_required(id)?;
        let now = self.clock.timestamp();

        if let Some(next) = patch.status {
            if !event.status.can_transition_to(next) {
                return Err(PlanningError::InvalidTransition {
                    from: event.status.as_str(),
                    attempted: next.as_str(),
                });
            }
        }

        if let Some(title) = patch.title {
            let t = title.trim();
            if t.is_empty() {
                return Err(PlanningError::validation(
                    "title",
                    "must be a non-empty string",
                ));
            }
            event.title = t.to_string();
        }
        if let Some(event_type) = patch.event_type {
            event.event_type = event_type;
        }
        if let Some(date) = patch.date {
            event.date = parse_iso_date(&date).map(format_iso_date).ok_or_else(|| {
                PlanningError::validation("date", format!("not a valid date: {date:?}"))
            })?;
        }
        if let Some(start) = patch.start_time {
            event.start_time = normalize_time(Some(start), "startTime")?;
        }
        if let Some(end) = patch.end_time {
            event.end_time = normalize_time(Some(end), "endTime")?;
        }
        check_time_order(event.start_time.as_deref(), event.end_time.as_deref())?;

        if let Some(priority) = patch.priority {
            event.priority = priority;
        }
        if let Some(location) = patch.location {
            event.location = clean_opt(Some(location));
        }
        if let Some(description) = patch.description {
            event.description = clean_opt(Some(description));
        }
        if let Some(notes) = patch.notes {
            event.notes = clean_opt(Some(notes));
        }
        if let Some(attendees) = patch.attendees {
            event.attendees = clean_attendees(attendees);
        }
        if let Some(specs) = patch.reminders {
            event.reminders = merge_reminders(&event.reminders, specs);
        }
        if let Some(details) = patch.details {
            event.details = Some(details);
        }
        if let Some(details) = &event.details {
            if details.kind() != event.event_type {
                return Err(PlanningError::validation(
                    "details",
                    format!(
                        "kind {} does not match event type {}",
                        details.kind().as_str(),
                        event.event_type.as_str()
                    ),
                ));
            }
        }

        if let Some(reason) = patch.cancellation_reason {
            event.cancellation_reason = clean_opt(Some(reason));
        }
        if let Some(next) = patch.status {
            if next == EventStatus::Cancelled && event.status != EventStatus::Cancelled {
                event.cancelled_at = Some(now.clone());
            }
            event.status = next;
        }

        event.recompute_duration();
        event.updated_at = now;
        self.store.update(&event).map_err(PlanningError::storage)?;
        Ok(event)
    }

    pub fn delete_event(&mut self, id: &str) -> PlanningResult<()> {
        let removed = self.store.delete(id).map_err(PlanningError::storage)?;
        if !removed {
            return Err(PlanningError::not_found(id));
        }
        Ok(())
    }

    /// `pending`/`scheduled` become `confirmed`. Re-confirming a confirmed
    /// event is a no-op (the record is returned unchanged, `updatedAt`
    /// untouched). Confirming a cancelled event is rejected.
    pub fn confirm_event(&mut self, id: &str) -> PlanningResult<Event> {
        let mut event = self.get_required(id)?;
        match event.status {
            EventStatus::Confirmed => Ok(event),
            EventStatus::Cancelled => Err(PlanningError::InvalidTransition {
                from: EventStatus::Cancelled.as_str(),
                attempted: EventStatus::Confirmed.as_str(),
            }),
            EventStatus::Pending | EventStatus::Scheduled => {
                event.status = EventStatus::Confirmed;
                event.updated_at = self.clock.timestamp();
                self.store.update(&event).map_err(PlanningError::storage)?;
                Ok(event)
            }
        }
    }

    /// Cancellation is terminal: a cancelled event cannot be cancelled again
    /// or moved to any other state.
    pub fn cancel_event(
        &mut self,
        id: &str,
        reason: &str,
        cancelled_by: Option<String>,
    ) -> PlanningResult<Event> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(PlanningError::validation(
                "reason",
                "must be a non-empty string",
            ));
        }
        let mut event = self.get_required(id)?;
        if event.status.is_terminal() {
            return Err(PlanningError::InvalidTransition {
                from: event.status.as_str(),
                attempted: EventStatus::Cancelled.as_str(),
            });
        }
        let now = self.clock.timestamp();
        event.status = EventStatus::Cancelled;
        event.cancellation_reason = Some(reason.to_string());
        event.cancelled_at = Some(now.clone());
        event.cancelled_by = clean_opt(cancelled_by);
        event.updated_at = now;
        self.store.update(&event).map_err(PlanningError::storage)?;
        Ok(event)
    }

    pub fn list_events(&self, filter: &EventFilter) -> PlanningResult<PlanningView> {
        let events = self.filtered(filter)?;
        let statistics = stats::calculate_statistics(&events, self.clock.today());
        Ok(PlanningView { events, statistics })
    }

    pub fn events_by_date(&self, date: &str) -> PlanningResult<Vec<Event>> {
        let date = parse_iso_date(date)
            .map(format_iso_date)
            .ok_or_else(|| PlanningError::validation("date", format!("not a valid date: {date:?}")))?;
        let filter = EventFilter {
            start_date: Some(date.clone()),
            end_date: Some(date),
            ..EventFilter::default()
        };
        self.filtered(&filter)
    }

    /// Events in the inclusive window `[startDate, startDate + 6 days]`.
    pub fn week_events(&self, start_date: &str) -> PlanningResult<Vec<Event>> {
        let start = parse_iso_date(start_date).ok_or_else(|| {
            PlanningError::validation("startDate", format!("not a valid date: {start_date:?}"))
        })?;
        let filter = EventFilter {
            start_date: Some(format_iso_date(start)),
            end_date: Some(format_iso_date(start + ChronoDuration::days(6))),
            ..EventFilter::default()
        };
        self.filtered(&filter)
    }

    /// Pure read: overlap against every non-cancelled event on `date`,
    /// excluding `exclude_id` when an existing event is being edited.
    pub fn check_availability(
        &self,
        date: &str,
        start_time: &str,
        end_time: &str,
        exclude_id: Option<&str>,
    ) -> PlanningResult<Availability> {
        let date = parse_iso_date(date)
            .map(format_iso_date)
            .ok_or_else(|| PlanningError::validation("date", format!("not a valid date: {date:?}")))?;
        let start = parse_hhmm(start_time)
            .ok_or_else(|| PlanningError::validation("startTime", "must be HH:MM"))?;
        let end = parse_hhmm(end_time)
            .ok_or_else(|| PlanningError::validation("endTime", "must be HH:MM"))?;
        if start >= end {
            return Err(PlanningError::validation(
                "endTime",
                "must be after startTime",
            ));
        }
        let events = self.store.all().map_err(PlanningError::storage)?;
        Ok(conflict::check(&events, &date, start, end, exclude_id))
    }

    pub fn statistics(&self, filter: &EventFilter) -> PlanningResult<PlanningStatistics> {
        let events = self.filtered(filter)?;
        Ok(stats::calculate_statistics(&events, self.clock.today()))
    }

    pub fn export_csv(&self, filter: &EventFilter) -> PlanningResult<String> {
        let events = self.filtered(filter)?;
        Ok(export::export_csv(&events))
    }

    /// Dispatches the event's enabled reminders through the notifier and
    /// marks them sent. With `force = false`, already-sent reminders are
    /// skipped; `force = true` re-sends them (manual re-send).
    pub fn send_reminders(
        &mut self,
        id: &str,
        force: bool,
        notifier: &mut dyn Notifier,
    ) -> PlanningResult<DispatchSummary> {
        let mut event = self.get_required(id)?;
        let contacts = event.contact_channels();
        let now = self.clock.timestamp();

        let title = event.title.clone();
        let date = event.date.clone();
        let start_time = event.start_time.clone();

        let mut dispatched = Vec::new();
        let mut failed = Vec::new();
        let mut skipped = Vec::new();
        let mut mutated = false;

        for reminder in event.reminders.iter_mut() {
            if !reminder.enabled {
                skipped.push(DispatchSkip {
                    channel: reminder.channel,
                    offset: reminder.offset.clone(),
                    reason: "disabled",
                });
                continue;
            }
            if reminder.sent && !force {
                skipped.push(DispatchSkip {
                    channel: reminder.channel,
                    offset: reminder.offset.clone(),
                    reason: "already sent",
                });
                continue;
            }
            let Some((_, recipient)) = contacts.iter().find(|(c, _)| *c == reminder.channel)
            else {
                failed.push(DispatchFailure {
                    channel: reminder.channel,
                    offset: reminder.offset.clone(),
                    reason: format!("no {} recipient on event", reminder.channel.as_str()),
                });
                continue;
            };
            let payload = ReminderPayload {
                event_id: id,
                title: &title,
                date: &date,
                start_time: start_time.as_deref(),
                offset: &reminder.offset,
            };
            match notifier.send(reminder.channel, recipient, &payload) {
                Ok(()) => {
                    reminder.sent = true;
                    reminder.sent_at = Some(now.clone());
                    mutated = true;
                    dispatched.push(DispatchRecord {
                        channel: reminder.channel,
                        recipient: recipient.clone(),
                        offset: reminder.offset.clone(),
                        sent_at: now.clone(),
                    });
                }
                Err(e) => failed.push(DispatchFailure {
                    channel: reminder.channel,
                    offset: reminder.offset.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        if mutated {
            event.updated_at = now;
            self.store.update(&event).map_err(PlanningError::storage)?;
        }

        Ok(DispatchSummary {
            event_id: id.to_string(),
            dispatched,
            failed,
            skipped,
        })
    }

    fn filtered(&self, filter: &EventFilter) -> PlanningResult<Vec<Event>> {
        let mut events: Vec<Event> = self
            .store
            .all()
            .map_err(PlanningError::storage)?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        sort_events(&mut events);
        Ok(events)
    }

    fn get_required(&self, id: &str) -> PlanningResult<Event> {
        self.store
            .get(id)
            .map_err(PlanningError::storage)?
            .ok_or_else(|| PlanningError::not_found(id))
    }
}

fn normalize_time(raw: Option<String>, field: &'static str) -> PlanningResult<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let t = raw.trim();
    if t.is_empty() {
        return Ok(None);
    }
    if parse_hhmm(t).is_none() {
        return Err(PlanningError::validation(field, "must be HH:MM"));
    }
    Ok(Some(t.to_string()))
}

fn check_time_order(start: Option<&str>, end: Option<&str>) -> PlanningResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if parse_hhmm(start) >= parse_hhmm(end) {
            return Err(PlanningError::validation(
                "endTime",
                "must be after startTime",
            ));
        }
    }
    Ok(())
}

fn clean_opt(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn clean_attendees(raw: Vec<String>) -> Vec<String> {
    // Insertion order preserved, duplicates allowed.
    raw.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// A replaced reminder list cannot un-send an entry: matching
/// `(channel, offset)` pairs keep their sent state.
fn merge_reminders(existing: &[Reminder], specs: Vec<ReminderSpec>) -> Vec<Reminder> {
    specs
        .into_iter()
        .map(|spec| {
            match existing
                .iter()
                .find(|r| r.channel == spec.channel && r.offset == spec.offset && r.sent)
            {
                Some(prev) => Reminder {
                    channel: spec.channel,
                    offset: spec.offset,
                    enabled: spec.enabled,
                    sent: true,
                    sent_at: prev.sent_at.clone(),
                },
                None => spec.into_reminder(),
            }
        })
        .collect()
}
