//! Event records exchanged with the remote event service.
//!
//! The controller only relies on an event's identity and display title.
//! Every other field the service sends is kept verbatim in
//! [`Event::attributes`] and written back unchanged on serialization.

use crate::error::{ErrorKind, SyncResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Stable identity of an event.
///
/// The remote service may hand out numeric or string ids, so both are
/// accepted and preserved as sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Int(i64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Int(id) => write!(f, "{}", id),
            EventId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for EventId {
    fn from(id: i64) -> Self {
        EventId::Int(id)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        EventId::Text(id.to_string())
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        EventId::Text(id)
    }
}

/// A record from the remote event service, shown as a card in the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    /// Fields beyond identity and title, opaque to the controller.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Event {
    pub fn new(id: impl Into<EventId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// String value of an attribute; `None` when absent or not a JSON string.
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// Case-insensitive substring match against the searchable fields.
    pub fn matches(&self, query: &str) -> bool {
        crate::filter::matches(self, &query.trim().to_lowercase())
    }
}

/// Payload of a write request: the new event's fields, without identity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl NewEvent {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Materialize the payload as a stored event under the given identity.
    pub fn into_event(self, id: impl Into<EventId>) -> Event {
        Event {
            id: id.into(),
            title: self.title,
            attributes: self.fields,
        }
    }
}

/// `{ "data": [...] }` wrapper returned by the read endpoint.
///
/// A missing or `null` `data` field decodes as an empty collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(default)]
    pub data: Option<Vec<Event>>,
}

impl EventEnvelope {
    /// Decode a read-endpoint body into its events.
    ///
    /// Only a JSON object is an envelope. serde would otherwise read a bare
    /// array as the struct's field sequence.
    pub fn decode(body: &[u8]) -> SyncResult<Vec<Event>> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| ErrorKind::decode(e.to_string()))?;
        if !value.is_object() {
            return Err(ErrorKind::decode(format!(
                "expected an object with a `data` array, got {}",
                json_kind(&value)
            )));
        }
        let envelope: EventEnvelope =
            serde_json::from_value(value).map_err(|e| ErrorKind::decode(e.to_string()))?;
        Ok(envelope.into_events())
    }

    pub fn into_events(self) -> Vec<Event> {
        self.data.unwrap_or_default()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_id_accepts_number_and_string() {
        let numeric: Event = serde_json::from_value(json!({"id": 1, "title": "Fall Fest"})).unwrap();
        assert_eq!(numeric.id, EventId::Int(1));

        let text: Event =
            serde_json::from_value(json!({"id": "evt-7", "title": "Winter Market"})).unwrap();
        assert_eq!(text.id, EventId::Text("evt-7".to_string()));
        assert_eq!(text.id.to_string(), "evt-7");
    }

    #[test]
    fn test_event_keeps_unknown_fields() {
        let raw = json!({
            "id": 3,
            "title": "Spring Fling",
            "location": "Main Quad",
            "capacity": 250
        });
        let event: Event = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(event.attribute_str("location"), Some("Main Quad"));
        assert_eq!(event.attributes.get("capacity"), Some(&json!(250)));
        assert_eq!(event.attribute_str("capacity"), None);
        assert_eq!(serde_json::to_value(&event).unwrap(), raw);
    }

    #[test]
    fn test_event_without_title_is_rejected() {
        let result = serde_json::from_value::<Event>(json!({"id": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn test_envelope_missing_data_is_empty() {
        let envelope: EventEnvelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.into_events().is_empty());

        let envelope: EventEnvelope = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(envelope.into_events().is_empty());
    }

    #[test]
    fn test_envelope_rejects_bad_element() {
        let result =
            serde_json::from_str::<EventEnvelope>(r#"{"data": [{"id": 1, "title": "ok"}, {"id": 2}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_envelope_decode_requires_object() {
        for body in ["[]", "[null]", r#"[[{"id":1,"title":"Fall Fest"}]]"#, "null", "7"] {
            let err = EventEnvelope::decode(body.as_bytes()).unwrap_err();
            assert!(matches!(err, ErrorKind::Decode { .. }), "{body} decoded as {err:?}");
        }
        let err = EventEnvelope::decode(b"[]").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_envelope_decode_reads_data() {
        let events =
            EventEnvelope::decode(br#"{"data":[{"id":1,"title":"Fall Fest"}]}"#).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Fall Fest");

        assert!(EventEnvelope::decode(b"{}").unwrap().is_empty());
        assert!(matches!(
            EventEnvelope::decode(b"{not json"),
            Err(ErrorKind::Decode { .. })
        ));
        assert!(matches!(
            EventEnvelope::decode(br#"{"data":[{"id":2}]}"#),
            Err(ErrorKind::Decode { .. })
        ));
    }

    #[test]
    fn test_new_event_serializes_flat() {
        let payload = NewEvent::new("Spring Fling").with_field("date", "2025-04-12");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, json!({"title": "Spring Fling", "date": "2025-04-12"}));

        let event = payload.into_event(3);
        assert_eq!(event.id, EventId::Int(3));
        assert_eq!(event.attribute_str("date"), Some("2025-04-12"));
    }
}
