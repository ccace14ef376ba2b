use crate::event::EventEnvelope;

/// Outcome of one delivery attempt.
///
/// `Dropped` carries the reason for logging and tests, but is never escalated
/// to the code path that emitted the event: analytics delivery is best-effort
/// and must not disturb the user interaction being tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    Delivered,
    Dropped(String),
}

impl DeliveryResult {
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Fire-and-forget delivery of event envelopes to the logging endpoint.
pub trait Transport {
    fn deliver(&self, envelope: &EventEnvelope) -> DeliveryResult;
}

/// HTTP beacon transport posting envelopes to the logging endpoint.
pub struct HttpTransport {
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Transport for HttpTransport {
    fn deliver(&self, envelope: &EventEnvelope) -> DeliveryResult {
        match ureq::post(&self.endpoint).send_json(envelope) {
            Ok(_) => DeliveryResult::Delivered,
            Err(e) => DeliveryResult::Dropped(e.to_string()),
        }
    }
}

/// Append-only sink mirroring a tag manager's `dataLayer` array.
///
/// Entries are `{"event": name, ...payload}` objects. Pushes never fail and
/// are never read back by the capture client itself; external tooling owns
/// the consumption side.
#[derive(Debug, Default)]
pub struct DataLayer {
    entries: Vec<serde_json::Value>,
}

impl DataLayer {
    pub fn push(&mut self, event: &str, payload: serde_json::Value) {
        let mut entry = serde_json::Map::new();
        entry.insert("event".to_string(), serde_json::Value::String(event.to_string()));
        if let serde_json::Value::Object(fields) = payload {
            entry.extend(fields);
        }
        self.entries.push(serde_json::Value::Object(entry));
    }

    pub fn entries(&self) -> &[serde_json::Value] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
