use anyhow::{anyhow, Context};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::planning::event::{Event, EventDetails, EventStatus, EventType, Priority, Reminder};
use crate::planning::notify::{
    looks_like_email, looks_like_phone, Channel, DeliveryError, Notifier, ReminderPayload,
};
use crate::planning::store::EventStore;

const EVENT_COLUMNS: &str = "id, title, event_type, date, start_time, end_time, duration_minutes,
     status, priority, location, description, notes,
     attendees_json, reminders_json, details_json,
     created_by, created_at, updated_at, cancelled_at, cancelled_by, cancellation_reason";

/// Workspace-backed store over the daemon's SQLite connection.
pub struct SqliteEventStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteEventStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        SqliteEventStore { conn }
    }
}

fn row_to_event(row: &Row) -> rusqlite::Result<Event> {
    let event_type_raw: String = row.get(2)?;
    let status_raw: String = row.get(7)?;
    let priority_raw: String = row.get(8)?;
    let attendees_raw: String = row.get(12)?;
    let reminders_raw: String = row.get(13)?;
    let details_raw: Option<String> = row.get(14)?;

    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        event_type: EventType::parse(&event_type_raw).unwrap_or(EventType::Meeting),
        date: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        duration_minutes: row.get(6)?,
        status: EventStatus::parse(&status_raw).unwrap_or(EventStatus::Scheduled),
        priority: Priority::parse(&priority_raw).unwrap_or(Priority::Medium),
        location: row.get(9)?,
        description: row.get(10)?,
        notes: row.get(11)?,
        attendees: serde_json::from_str(&attendees_raw).unwrap_or_default(),
        reminders: serde_json::from_str::<Vec<Reminder>>(&reminders_raw).unwrap_or_default(),
        details: details_raw
            .as_deref()
            .and_then(|raw| serde_json::from_str::<EventDetails>(raw).ok()),
        created_by: row.get(15)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
        cancelled_at: row.get(18)?,
        cancelled_by: row.get(19)?,
        cancellation_reason: row.get(20)?,
    })
}

fn details_json(event: &Event) -> anyhow::Result<Option<String>> {
    event
        .details
        .as_ref()
        .map(|d| serde_json::to_string(d).context("serialize event details"))
        .transpose()
}

impl EventStore for SqliteEventStore<'_> {
    fn insert(&mut self, event: &Event) -> anyhow::Result<()> {
        self.conn
            .execute(
                "INSERT INTO events(
                    id, title, event_type, date, start_time, end_time, duration_minutes,
                    status, priority, location, description, notes,
                    attendees_json, reminders_json, details_json,
                    created_by, created_at, updated_at, cancelled_at, cancelled_by, cancellation_reason
                 ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21)",
                params![
                    event.id,
                    event.title,
                    event.event_type.as_str(),
                    event.date,
                    event.start_time,
                    event.end_time,
                    event.duration_minutes,
                    event.status.as_str(),
                    event.priority.as_str(),
                    event.location,
                    event.description,
                    event.notes,
                    serde_json::to_string(&event.attendees)?,
                    serde_json::to_string(&event.reminders)?,
                    details_json(event)?,
                    event.created_by,
                    event.created_at,
                    event.updated_at,
                    event.cancelled_at,
                    event.cancelled_by,
                    event.cancellation_reason,
                ],
            )
            .context("insert event")?;
        Ok(())
    }

    fn update(&mut self, event: &Event) -> anyhow::Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE events SET
                    title = ?2, event_type = ?3, date = ?4, start_time = ?5, end_time = ?6,
                    duration_minutes = ?7, status = ?8, priority = ?9, location = ?10,
                    description = ?11, notes = ?12, attendees_json = ?13, reminders_json = ?14,
                    details_json = ?15, created_by = ?16, created_at = ?17, updated_at = ?18,
                    cancelled_at = ?19, cancelled_by = ?20, cancellation_reason = ?21
                 WHERE id = ?1",
                params![
                    event.id,
                    event.title,
                    event.event_type.as_str(),
                    event.date,
                    event.start_time,
                    event.end_time,
                    event.duration_minutes,
                    event.status.as_str(),
                    event.priority.as_str(),
                    event.location,
                    event.description,
                    event.notes,
                    serde_json::to_string(&event.attendees)?,
                    serde_json::to_string(&event.reminders)?,
                    details_json(event)?,
                    event.created_by,
                    event.created_at,
                    event.updated_at,
                    event.cancelled_at,
                    event.cancelled_by,
                    event.cancellation_reason,
                ],
            )
            .context("update event")?;
        if changed == 0 {
            return Err(anyhow!("no event with id {}", event.id));
        }
        Ok(())
    }

    fn delete(&mut self, id: &str) -> anyhow::Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM events WHERE id = ?", [id])
            .context("delete event")?;
        Ok(changed > 0)
    }

    fn get(&self, id: &str) -> anyhow::Result<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?");
        self.conn
            .query_row(&sql, [id], row_to_event)
            .optional()
            .context("read event")
    }

    fn all(&self) -> anyhow::Result<Vec<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY date, start_time, id");
        let mut stmt = self.conn.prepare(&sql).context("prepare events query")?;
        let rows = stmt
            .query_map([], row_to_event)
            .context("read events")?
            .collect::<Result<Vec<_>, _>>()
            .context("read events")?;
        Ok(rows)
    }
}

/// Outbox-backed notifier. The daemon has no mail or SMS transport of its
/// own; dispatching queues a row the frontend bridge drains and delivers.
pub struct SqliteOutbox<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteOutbox<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        SqliteOutbox { conn }
    }
}

impl Notifier for SqliteOutbox<'_> {
    fn send(
        &mut self,
        channel: Channel,
        recipient: &str,
        payload: &ReminderPayload,
    ) -> Result<(), DeliveryError> {
        let valid = match channel {
            Channel::Email => looks_like_email(recipient),
            Channel::Sms => looks_like_phone(recipient),
        };
        if !valid {
            return Err(DeliveryError::new(format!(
                "recipient {recipient:?} is not a valid {} address",
                channel.as_str()
            )));
        }
        let queued_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.conn
            .execute(
                "INSERT INTO reminder_outbox(id, event_id, channel, recipient, summary, queued_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    Uuid::new_v4().to_string(),
                    payload.event_id,
                    channel.as_str(),
                    recipient,
                    payload.summary(),
                    queued_at,
                ],
            )
            .map_err(|e| DeliveryError::new(format!("outbox write failed: {e}")))?;
        Ok(())
    }
}
