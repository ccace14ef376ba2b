use crate::event::EventType;
use duckdb::Connection;

/// The subset of event columns the aggregation cares about.
///
/// Context columns (user agent, IP, referrer) are retained for audit only and
/// never read back here.
#[derive(Debug, Clone)]
pub struct EventRow {
    pub channel: Option<String>,
    pub session_id: Option<String>,
    pub cta_type: Option<String>,
}

/// Fetch all events of one type whose `created_at` falls in `[start, end]`.
///
/// `start` and `end` are `%Y-%m-%d %H:%M:%S` timestamps. The three event
/// streams are fetched independently; the join happens in application memory.
pub fn fetch_events(
    conn: &Connection,
    event_type: EventType,
    start: &str,
    end: &str,
) -> Result<Vec<EventRow>, duckdb::Error> {
    let mut stmt = conn.prepare(
        "SELECT channel, session_id, cta_type FROM analytics_events
         WHERE event_type = ?
         AND created_at >= CAST(? AS TIMESTAMP) AND created_at <= CAST(? AS TIMESTAMP)",
    )?;
    let rows = stmt.query_map(
        duckdb::params![event_type.as_str(), start, end],
        |row| {
            Ok(EventRow {
                channel: row.get(0)?,
                session_id: row.get(1)?,
                cta_type: row.get(2)?,
            })
        },
    )?;
    rows.collect()
}
