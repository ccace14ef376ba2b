use serde::{Deserialize, Serialize};

/// The three interaction kinds tracked by the site.
///
/// Any other value on the wire is rejected at deserialization time, which is
/// what gives the logging endpoint its 400-on-unknown-type behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PageView,
    SectionView,
    CtaClick,
}

impl EventType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PageView => "page_view",
            Self::SectionView => "section_view",
            Self::CtaClick => "cta_click",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The JSON payload describing one tracked interaction, shared between the
/// capture client (sender) and the logging endpoint (receiver).
///
/// All fields besides `event_type` are optional; which ones carry meaning is
/// determined by the event type (`section_name` for section views, `cta_type`
/// for CTA clicks).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl EventEnvelope {
    pub const fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            channel: None,
            page_path: None,
            section_name: None,
            cta_type: None,
            session_id: None,
        }
    }
}
