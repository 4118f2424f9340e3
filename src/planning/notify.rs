use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct DeliveryError {
    pub message: String,
}

impl DeliveryError {
    pub fn new(message: impl Into<String>) -> Self {
        DeliveryError {
            message: message.into(),
        }
    }
}

/// What a reminder notification says about its event.
#[derive(Debug, Clone, Copy)]
pub struct ReminderPayload<'a> {
    pub event_id: &'a str,
    pub title: &'a str,
    pub date: &'a str,
    pub start_time: Option<&'a str>,
    pub offset: &'a str,
}

impl ReminderPayload<'_> {
    pub fn summary(&self) -> String {
        match self.start_time {
            Some(t) => format!("{} on {} at {} ({})", self.title, self.date, t, self.offset),
            None => format!("{} on {} ({})", self.title, self.date, self.offset),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRecord {
    pub channel: Channel,
    pub recipient: String,
    pub offset: String,
    pub sent_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchFailure {
    pub channel: Channel,
    pub offset: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSkip {
    pub channel: Channel,
    pub offset: String,
    pub reason: &'static str,
}

/// Per-channel outcome of one `reminders.send` call. Failures sit next to
/// successes; the call itself only errors when the event does not exist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub event_id: String,
    pub dispatched: Vec<DispatchRecord>,
    pub failed: Vec<DispatchFailure>,
    pub skipped: Vec<DispatchSkip>,
}

/// Delivery collaborator. One call per channel per reminder; failures are
/// reported per channel, never as an all-or-nothing abort.
pub trait Notifier {
    fn send(
        &mut self,
        channel: Channel,
        recipient: &str,
        payload: &ReminderPayload,
    ) -> Result<(), DeliveryError>;
}

pub fn looks_like_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

pub fn looks_like_phone(raw: &str) -> bool {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();
    let rest = digits.strip_prefix('+').unwrap_or(&digits);
    rest.len() >= 6 && rest.chars().all(|c| c.is_ascii_digit())
}
