//! The envelope describing one lifecycle point of one agent action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::Message;
use crate::metadata::SessionMetadata;
use crate::payload::EventPayload;
use crate::EventType;

/// One envelope describing one lifecycle point of one agent action.
///
/// Events are immutable once built. A policy that wants to rewrite an
/// in-flight action returns a `Modification` on its verdict instead of
/// mutating the event; only the lifecycle executor's own context is ever
/// mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    /// A fresh unique id minted when the event was built.
    #[serde(default = "fresh_id")]
    pub id: String,
    /// Which lifecycle point this event represents.
    #[serde(rename = "type", default = "default_event_type")]
    pub event_type: EventType,
    /// When the event was built.
    #[serde(default = "Utc::now", with = "rfc3339_offset")]
    pub timestamp: DateTime<Utc>,
    /// The conversation so far, as of this event.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Stage-specific data.
    #[serde(default)]
    pub payload: EventPayload,
    /// Session-scoped context.
    pub metadata: SessionMetadata,
}

fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

/// RFC 3339 with an explicit `+00:00` UTC offset rather than chrono's
/// default `Z` suffix, matching the wire format other implementations of
/// this protocol emit. Parsing accepts either suffix.
mod rfc3339_offset {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, false))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}

fn default_event_type() -> EventType {
    EventType::InputReceived
}

impl Event {
    /// Builds an event with a fresh id and the current timestamp.
    #[must_use]
    pub fn new(event_type: EventType, metadata: SessionMetadata) -> Self {
        Self {
            id: fresh_id(),
            event_type,
            timestamp: Utc::now(),
            messages: Vec::new(),
            payload: EventPayload::new(),
            metadata,
        }
    }

    /// Attaches messages to the event, replacing any already set.
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Attaches a payload to the event, replacing any already set.
    #[must_use]
    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_id_timestamp_and_type_fall_back_to_safe_defaults() {
        let parsed: Event = serde_json::from_value(serde_json::json!({
            "metadata": {"session_id": "s1"},
        }))
        .unwrap();
        assert!(!parsed.id.is_empty());
        assert_eq!(parsed.event_type, EventType::InputReceived);
    }

    #[test]
    fn explicit_fields_are_preserved() {
        let event = Event::new(EventType::ToolPreInvoke, SessionMetadata::new("s1"));
        let json = serde_json::to_value(&event).unwrap();
        let parsed: Event = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.event_type, EventType::ToolPreInvoke);
        assert_eq!(parsed.id, event.id);
    }

    #[test]
    fn timestamp_serializes_with_a_utc_offset_not_a_z_suffix() {
        let event = Event::new(EventType::SessionStart, SessionMetadata::new("s1"));
        let json = serde_json::to_value(&event).unwrap();
        let timestamp = json["timestamp"].as_str().unwrap();
        assert!(!timestamp.ends_with('Z'));
        assert!(timestamp.ends_with("+00:00"));
    }

    #[test]
    fn a_z_suffixed_timestamp_still_parses() {
        let parsed: Event = serde_json::from_value(serde_json::json!({
            "metadata": {"session_id": "s1"},
            "timestamp": "2025-01-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(parsed.timestamp.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }
}
