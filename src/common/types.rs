use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::ClientConfig;

/// Who wrote a message. Anything other than `user`/`admin` is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sender {
    User,
    Admin,
    Other(String),
}

impl Sender {
    pub fn as_str(&self) -> &str {
        match self {
            Sender::User => "user",
            Sender::Admin => "admin",
            Sender::Other(raw) => raw,
        }
    }
}

impl Default for Sender {
    fn default() -> Self {
        Sender::Other(String::new())
    }
}

impl From<String> for Sender {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "user" => Sender::User,
            "admin" => Sender::Admin,
            _ => Sender::Other(raw),
        }
    }
}

impl From<Sender> for String {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a session's history as returned by `/chat/history`.
///
/// Fields decode leniently: scalars are kept as their text, `null` or a
/// missing field becomes empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, deserialize_with = "lenient_sender")]
    pub sender: Sender,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: String,
    /// Opaque server timestamp; see [`format_timestamp`].
    #[serde(default, deserialize_with = "lenient_text")]
    pub timestamp: String,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_sender<'de, D>(deserializer: D) -> Result<Sender, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_text(deserializer).map(Sender::from)
}

/// Body of `POST /chat/send`.
#[derive(Debug, Clone, Serialize)]
pub struct SendRequest<'a> {
    pub session_id: &'a str,
    pub message: &'a str,
    pub sender: &'a str,
}

/// Which side of the conversation a view represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// End-user thread bound to the persisted session id.
    Visitor,
    /// Staff console browsing every session.
    Admin,
}

impl ViewKind {
    pub fn sender(self) -> Sender {
        match self {
            ViewKind::Visitor => Sender::User,
            ViewKind::Admin => Sender::Admin,
        }
    }

    pub fn polls_sessions(self) -> bool {
        matches!(self, ViewKind::Admin)
    }

    pub fn history_poll(self, config: &ClientConfig) -> Duration {
        match self {
            ViewKind::Visitor => config.visitor_history_poll(),
            ViewKind::Admin => config.admin_history_poll(),
        }
    }

    /// Label shown under a message bubble.
    pub fn label_for<'a>(self, sender: &'a Sender) -> &'a str {
        match (self, sender) {
            (ViewKind::Visitor, Sender::Admin) => "Redline",
            (ViewKind::Visitor, Sender::User) => "You",
            (ViewKind::Admin, Sender::Admin) => "Admin",
            (ViewKind::Admin, Sender::User) => "User",
            (_, Sender::Other(raw)) if raw.trim().is_empty() => "Unknown",
            (_, Sender::Other(raw)) => raw,
        }
    }

    pub fn history_error(self) -> &'static str {
        match self {
            ViewKind::Visitor => "Couldn't load chat right now. Refresh and try again.",
            ViewKind::Admin => "Couldn't load messages for this session.",
        }
    }

    pub fn sessions_error(self) -> &'static str {
        "Couldn't load sessions."
    }

    pub fn send_error(self) -> &'static str {
        match self {
            ViewKind::Visitor => "Message didn't send. Try again.",
            ViewKind::Admin => "Reply didn't send. Try again.",
        }
    }
}

/// Formats a server timestamp in local time, or returns it verbatim when it
/// cannot be parsed.
pub fn format_timestamp(raw: &str) -> String {
    format_timestamp_in(raw, &Local)
}

pub fn format_timestamp_in<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let trimmed = raw.trim();
    if let Ok(parsed) =
        DateTime::parse_from_rfc3339(trimmed).or_else(|_| DateTime::parse_from_rfc2822(trimmed))
    {
        return parsed.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string();
    }

    // ISO-8601 without an offset is taken as UTC
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return naive
                .and_utc()
                .with_timezone(tz)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string();
        }
    }

    // a bare date is midnight UTC
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return midnight
                .and_utc()
                .with_timezone(tz)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string();
        }
    }

    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn sender_keeps_unknown_values() {
        let msg: ChatMessage = serde_json::from_str(
            r#"{"sender":"bot","message":"hi","timestamp":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(msg.sender, Sender::Other("bot".to_string()));
        assert_eq!(serde_json::to_value(&msg.sender).unwrap(), "bot");
    }

    #[test]
    fn known_senders_decode() {
        let user: Sender = serde_json::from_str(r#""user""#).unwrap();
        let admin: Sender = serde_json::from_str(r#""admin""#).unwrap();
        assert_eq!(user, Sender::User);
        assert_eq!(admin, Sender::Admin);
    }

    #[test]
    fn message_fields_default_when_missing() {
        let msg: ChatMessage = serde_json::from_str(r#"{"message":"hello"}"#).unwrap();
        assert_eq!(msg.sender, Sender::Other(String::new()));
        assert_eq!(msg.message, "hello");
        assert_eq!(msg.timestamp, "");
    }

    #[test]
    fn timestamps_convert_to_the_given_zone() {
        assert_eq!(
            format_timestamp_in("2024-03-05T10:15:00Z", &Utc),
            "2024-03-05 10:15:00"
        );
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            format_timestamp_in("2024-03-05T10:15:00Z", &plus_two),
            "2024-03-05 12:15:00"
        );
        assert_eq!(
            format_timestamp_in("2024-03-05T10:15:00.123456", &Utc),
            "2024-03-05 10:15:00"
        );
    }

    #[test]
    fn message_fields_accept_non_string_scalars() {
        let msg: ChatMessage = serde_json::from_str(
            r#"{"sender":null,"message":null,"timestamp":1717000000000}"#,
        )
        .unwrap();
        assert_eq!(msg.sender, Sender::Other(String::new()));
        assert_eq!(msg.message, "");
        assert_eq!(msg.timestamp, "1717000000000");

        let msg: ChatMessage =
            serde_json::from_str(r#"{"sender":"admin","message":42,"timestamp":true}"#).unwrap();
        assert_eq!(msg.sender, Sender::Admin);
        assert_eq!(msg.message, "42");
        assert_eq!(msg.timestamp, "true");
    }

    #[test]
    fn date_only_and_rfc2822_timestamps_are_parsed() {
        assert_eq!(format_timestamp_in("2024-03-05", &Utc), "2024-03-05 00:00:00");
        assert_eq!(
            format_timestamp_in("Tue, 05 Mar 2024 10:15:00 +0000", &Utc),
            "2024-03-05 10:15:00"
        );
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(
            format_timestamp_in("2024-03-05", &minus_five),
            "2024-03-04 19:00:00"
        );
    }

    #[test]
    fn unparseable_timestamps_are_shown_verbatim() {
        assert_eq!(format_timestamp_in("yesterday-ish", &Utc), "yesterday-ish");
        assert_eq!(format_timestamp(""), "");
    }

    #[test]
    fn labels_depend_on_the_view() {
        assert_eq!(ViewKind::Visitor.label_for(&Sender::Admin), "Redline");
        assert_eq!(ViewKind::Visitor.label_for(&Sender::User), "You");
        assert_eq!(ViewKind::Admin.label_for(&Sender::User), "User");
        let other = Sender::Other("system".into());
        assert_eq!(ViewKind::Admin.label_for(&other), "system");
        assert_eq!(ViewKind::Visitor.label_for(&Sender::default()), "Unknown");
    }
}
