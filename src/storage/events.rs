use crate::event::EventType;
use chrono::NaiveDateTime;
use duckdb::Connection;

/// One analytics event row as written to the store: the client envelope plus
/// the server-observed context captured at ingestion time.
#[derive(Debug, Clone)]
pub struct StoredEvent {
    pub event_type: EventType,
    pub channel: Option<String>,
    pub page_path: Option<String>,
    pub section_name: Option<String>,
    pub cta_type: Option<String>,
    pub session_id: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub referrer: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Append one immutable event row. There is no update or delete counterpart.
pub fn insert_event(conn: &Connection, event: &StoredEvent) -> Result<(), duckdb::Error> {
    conn.execute(
        "INSERT INTO analytics_events (event_type, channel, page_path, section_name,
         cta_type, session_id, user_agent, ip_address, referrer, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, CAST(? AS TIMESTAMP))",
        duckdb::params![
            event.event_type.as_str(),
            event.channel,
            event.page_path,
            event.section_name,
            event.cta_type,
            event.session_id,
            event.user_agent,
            event.ip_address,
            event.referrer,
            event.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}
