use crate::capture::session::{
    generate_session_id, resolve_channel, resolve_session, touch_session, KvStore,
};
use crate::capture::transport::{DataLayer, DeliveryResult, Transport};
use crate::event::{EventEnvelope, EventType};
use serde_json::json;
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

/// Minimum fraction of a section that must be visible before a section view
/// counts.
pub const SECTION_VISIBILITY_THRESHOLD: f64 = 0.5;

/// Section label applied when the caller supplies none.
const UNKNOWN_SECTION: &str = "unknown";

/// One page instance of the capture client.
///
/// Created on page mount (which emits the page view), then fed visibility
/// notifications and CTA interactions for the lifetime of the page. Every
/// emission goes to the data layer and, best-effort, through the transport;
/// a dropped delivery is logged and otherwise ignored.
pub struct CaptureClient<T: Transport> {
    page_path: String,
    channel: String,
    session_id: String,
    viewed_sections: HashSet<String>,
    durable: Box<dyn KvStore>,
    data_layer: DataLayer,
    transport: T,
}

impl<T: Transport> CaptureClient<T> {
    /// Mount the client for one page: resolve session and channel, then emit
    /// the page view exactly once, synchronously.
    pub fn mount(
        page_path: impl Into<String>,
        query: &str,
        mut durable: Box<dyn KvStore>,
        tab_store: &mut dyn KvStore,
        transport: T,
    ) -> Self {
        let page_path = page_path.into();
        let now = now_ms();
        let session_id = resolve_session(durable.as_mut(), now, &mut generate_session_id);
        let channel = resolve_channel(query, tab_store);

        let mut client = Self {
            page_path,
            channel,
            session_id,
            viewed_sections: HashSet::new(),
            durable,
            data_layer: DataLayer::default(),
            transport,
        };

        client.data_layer.push(
            "page_view_with_channel",
            json!({
                "channel": client.channel,
                "page_path": client.page_path,
            }),
        );
        let mut envelope = EventEnvelope::new(EventType::PageView);
        envelope.channel = Some(client.channel.clone());
        envelope.page_path = Some(client.page_path.clone());
        envelope.session_id = Some(client.session_id.clone());
        client.emit(envelope);

        client
    }

    /// Handle a viewport-intersection notification for a section.
    ///
    /// Only ratios at or above [`SECTION_VISIBILITY_THRESHOLD`] count, and a
    /// section is emitted at most once per page instance no matter how often
    /// it re-enters the viewport.
    pub fn section_visible(&mut self, section_name: &str, visible_ratio: f64) {
        if visible_ratio < SECTION_VISIBILITY_THRESHOLD {
            return;
        }
        let name = normalize_section(section_name);
        if !self.viewed_sections.insert(name.clone()) {
            return;
        }

        self.data_layer.push(
            "section_view",
            json!({
                "section_name": name,
                "channel": self.channel,
            }),
        );
        let mut envelope = EventEnvelope::new(EventType::SectionView);
        envelope.channel = Some(self.channel.clone());
        envelope.page_path = Some(self.page_path.clone());
        envelope.section_name = Some(name);
        envelope.session_id = Some(self.session_id.clone());
        self.emit(envelope);
    }

    /// Record a CTA activation. Fires synchronously and never blocks the
    /// control's primary action.
    pub fn cta_click(&mut self, cta_type: &str, section_name: Option<&str>) {
        let name = normalize_section(section_name.unwrap_or_default());

        self.data_layer.push(
            "cta_click",
            json!({
                "cta_type": cta_type,
                "section_name": name,
                "channel": self.channel,
            }),
        );
        let mut envelope = EventEnvelope::new(EventType::CtaClick);
        envelope.channel = Some(self.channel.clone());
        envelope.page_path = Some(self.page_path.clone());
        envelope.section_name = Some(name);
        envelope.cta_type = Some(cta_type.to_string());
        envelope.session_id = Some(self.session_id.clone());
        self.emit(envelope);
    }

    /// Deliver through the transport and slide the session window. Delivery
    /// failures are logged and swallowed; event loss is acceptable here.
    fn emit(&mut self, envelope: EventEnvelope) {
        match self.transport.deliver(&envelope) {
            DeliveryResult::Delivered => {}
            DeliveryResult::Dropped(reason) => {
                tracing::debug!(
                    event = envelope.event_type.as_str(),
                    reason,
                    "analytics event dropped"
                );
            }
        }
        touch_session(self.durable.as_mut(), &self.session_id, now_ms());
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn data_layer(&self) -> &DataLayer {
        &self.data_layer
    }
}

fn normalize_section(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        UNKNOWN_SECTION.to_string()
    } else {
        trimmed.to_string()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
