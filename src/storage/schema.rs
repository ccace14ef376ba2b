use duckdb::Connection;

/// SQL statement to create the analytics events table.
///
/// Events are append-only: nothing in the codebase updates or deletes rows.
/// `created_at` defaults to the server clock so a client can never influence
/// time-range queries by lying about its own clock.
pub const CREATE_ANALYTICS_EVENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS analytics_events (
    event_type   VARCHAR NOT NULL,
    channel      VARCHAR,
    page_path    VARCHAR,
    section_name VARCHAR,
    cta_type     VARCHAR,
    session_id   VARCHAR,
    user_agent   VARCHAR,
    ip_address   VARCHAR,
    referrer     VARCHAR,
    created_at   TIMESTAMP NOT NULL DEFAULT current_timestamp
)
";

/// Initialize the database schema.
pub fn init_schema(conn: &Connection) -> Result<(), duckdb::Error> {
    conn.execute_batch(CREATE_ANALYTICS_EVENTS_TABLE)?;
    Ok(())
}
