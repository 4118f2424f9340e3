use serde::{Deserialize, Serialize};

use crate::planning::notify::Channel;
use crate::planning::time::parse_hhmm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ParentMeeting,
    Meeting,
    SchoolEvent,
    Training,
    OfficialMeeting,
    Inscription,
    Interview,
    Holiday,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        EventType::ParentMeeting,
        EventType::Meeting,
        EventType::SchoolEvent,
        EventType::Training,
        EventType::OfficialMeeting,
        EventType::Inscription,
        EventType::Interview,
        EventType::Holiday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::ParentMeeting => "parent_meeting",
            EventType::Meeting => "meeting",
            EventType::SchoolEvent => "school_event",
            EventType::Training => "training",
            EventType::OfficialMeeting => "official_meeting",
            EventType::Inscription => "inscription",
            EventType::Interview => "interview",
            EventType::Holiday => "holiday",
        }
    }

    pub fn parse(raw: &str) -> Option<EventType> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == raw.trim())
    }

    pub fn label(self) -> &'static str {
        match self {
            EventType::ParentMeeting => "Parent Meeting",
            EventType::Meeting => "Meeting",
            EventType::SchoolEvent => "School Event",
            EventType::Training => "Training",
            EventType::OfficialMeeting => "Official Meeting",
            EventType::Inscription => "Inscription",
            EventType::Interview => "Interview",
            EventType::Holiday => "Holiday",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Pending,
    Scheduled,
    Confirmed,
    Cancelled,
}

impl EventStatus {
    pub const ALL: [EventStatus; 4] = [
        EventStatus::Pending,
        EventStatus::Scheduled,
        EventStatus::Confirmed,
        EventStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::Scheduled => "scheduled",
            EventStatus::Confirmed => "confirmed",
            EventStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<EventStatus> {
        EventStatus::ALL
            .into_iter()
            .find(|s| s.as_str() == raw.trim())
    }

    pub fn label(self) -> &'static str {
        match self {
            EventStatus::Pending => "Pending",
            EventStatus::Scheduled => "Scheduled",
            EventStatus::Confirmed => "Confirmed",
            EventStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == EventStatus::Cancelled
    }

    /// The only valid moves besides staying in place: pending/scheduled may be
    /// confirmed, and any non-terminal state may be cancelled.
    pub fn can_transition_to(self, next: EventStatus) -> bool {
        if self == next {
            return true;
        }
        match (self, next) {
            (EventStatus::Pending | EventStatus::Scheduled, EventStatus::Confirmed) => true,
            (s, EventStatus::Cancelled) if !s.is_terminal() => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    // Some callers say "urgent"; it means the same thing.
    #[serde(alias = "urgent")]
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(raw: &str) -> Option<Priority> {
        match raw.trim() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" | "urgent" => Some(Priority::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub channel: Channel,
    pub offset: String,
    pub enabled: bool,
    pub sent: bool,
    pub sent_at: Option<String>,
}

/// Reminder shape accepted on create/update. `sent`/`sentAt` are owned by the
/// dispatcher and never taken from the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSpec {
    pub channel: Channel,
    pub offset: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl ReminderSpec {
    pub fn into_reminder(self) -> Reminder {
        Reminder {
            channel: self.channel,
            offset: self.offset,
            enabled: self.enabled,
            sent: false,
            sent_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "class", default)]
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentContact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Type-specific metadata. Each variant carries only the fields relevant to
/// its event type; the `kind` tag must agree with the event's `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EventDetails {
    ParentMeeting {
        student: StudentRef,
        #[serde(default)]
        parent: ParentContact,
    },
    Meeting {
        #[serde(default)]
        agenda: Option<String>,
        #[serde(default)]
        organizer: Option<String>,
    },
    SchoolEvent {
        #[serde(default)]
        audience: Option<String>,
        #[serde(default)]
        budget: Option<f64>,
    },
    Training {
        #[serde(default)]
        provider: Option<String>,
        #[serde(default)]
        cost: Option<f64>,
    },
    OfficialMeeting {
        #[serde(default)]
        authority: Option<String>,
    },
    Inscription {
        student: StudentRef,
        #[serde(default)]
        parent: ParentContact,
        #[serde(default)]
        documents_required: Vec<String>,
    },
    Interview {
        candidate_name: String,
        #[serde(default)]
        candidate_email: Option<String>,
        #[serde(default)]
        candidate_phone: Option<String>,
        #[serde(default)]
        position: Option<String>,
    },
    Holiday {
        #[serde(default)]
        recurring: bool,
    },
}

impl EventDetails {
    pub fn kind(&self) -> EventType {
        match self {
            EventDetails::ParentMeeting { .. } => EventType::ParentMeeting,
            EventDetails::Meeting { .. } => EventType::Meeting,
            EventDetails::SchoolEvent { .. } => EventType::SchoolEvent,
            EventDetails::Training { .. } => EventType::Training,
            EventDetails::OfficialMeeting { .. } => EventType::OfficialMeeting,
            EventDetails::Inscription { .. } => EventType::Inscription,
            EventDetails::Interview { .. } => EventType::Interview,
            EventDetails::Holiday { .. } => EventType::Holiday,
        }
    }

    pub fn student(&self) -> Option<&StudentRef> {
        match self {
            EventDetails::ParentMeeting { student, .. }
            | EventDetails::Inscription { student, .. } => Some(student),
            _ => None,
        }
    }

    /// Reachable notification recipients, one entry per channel.
    pub fn contact_channels(&self) -> Vec<(Channel, String)> {
        let mut out = Vec::new();
        let (email, phone) = match self {
            EventDetails::ParentMeeting { parent, .. }
            | EventDetails::Inscription { parent, .. } => {
                (parent.email.as_deref(), parent.phone.as_deref())
            }
            EventDetails::Interview {
                candidate_email,
                candidate_phone,
                ..
            } => (candidate_email.as_deref(), candidate_phone.as_deref()),
            _ => (None, None),
        };
        if let Some(email) = email.map(str::trim).filter(|s| !s.is_empty()) {
            out.push((Channel::Email, email.to_string()));
        }
        if let Some(phone) = phone.map(str::trim).filter(|s| !s.is_empty()) {
            out.push((Channel::Sms, phone.to_string()));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration_minutes: Option<i64>,
    pub status: EventStatus,
    pub priority: Priority,
    pub location: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub attendees: Vec<String>,
    pub reminders: Vec<Reminder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<EventDetails>,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub cancelled_at: Option<String>,
    pub cancelled_by: Option<String>,
    pub cancellation_reason: Option<String>,
}

impl Event {
    /// Minutes-since-midnight interval, present only when both times are set.
    /// Events without a window (holidays, all-day entries) never conflict.
    pub fn time_window(&self) -> Option<(u16, u16)> {
        let start = parse_hhmm(self.start_time.as_deref()?)?;
        let end = parse_hhmm(self.end_time.as_deref()?)?;
        Some((start, end))
    }

    pub fn recompute_duration(&mut self) {
        self.duration_minutes = self
            .time_window()
            .map(|(start, end)| i64::from(end) - i64::from(start));
    }

    pub fn student_name(&self) -> Option<&str> {
        self.details
            .as_ref()
            .and_then(|d| d.student())
            .map(|s| s.name.as_str())
    }

    pub fn student_class(&self) -> Option<&str> {
        self.details
            .as_ref()
            .and_then(|d| d.student())
            .and_then(|s| s.class_name.as_deref())
    }

    pub fn contact_channels(&self) -> Vec<(Channel, String)> {
        self.details
            .as_ref()
            .map(|d| d.contact_channels())
            .unwrap_or_default()
    }
}

/// Caller input for `events.create`. Everything is optional at the parse
/// stage so validation can name the offending field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: Option<EventStatus>,
    pub priority: Option<Priority>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub attendees: Option<Vec<String>>,
    pub reminders: Option<Vec<ReminderSpec>>,
    pub details: Option<EventDetails>,
    pub created_by: Option<String>,
}

/// Partial update for `events.update`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: Option<EventStatus>,
    pub priority: Option<Priority>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub attendees: Option<Vec<String>>,
    pub reminders: Option<Vec<ReminderSpec>>,
    pub details: Option<EventDetails>,
    pub cancellation_reason: Option<String>,
}
