use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::event::EventEnvelope;
use crate::storage::events::{insert_event, StoredEvent};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use std::sync::Arc;

/// POST /api/analytics/log — append one analytics event.
///
/// The body is parsed by hand rather than through the `Json` extractor so
/// that an unparseable body or an unrecognized `event_type` both map to a
/// plain 400, and so the envelope is only accepted as `application/json`
/// content regardless of what a `sendBeacon` transport declared.
pub async fn log_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let envelope: EventEnvelope = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid event payload: {e}")))?;

    // Length caps to prevent abuse; the envelope fields are free text
    if envelope.channel.as_ref().is_some_and(|v| v.len() > 256)
        || envelope.page_path.as_ref().is_some_and(|v| v.len() > 2048)
        || envelope.section_name.as_ref().is_some_and(|v| v.len() > 256)
        || envelope.cta_type.as_ref().is_some_and(|v| v.len() > 256)
        || envelope.session_id.as_ref().is_some_and(|v| v.len() > 128)
    {
        return Err(ApiError::BadRequest("field too long".to_string()));
    }

    let event = StoredEvent {
        event_type: envelope.event_type,
        channel: envelope.channel.as_deref().map(sanitize),
        page_path: envelope.page_path.as_deref().map(sanitize),
        section_name: envelope.section_name.as_deref().map(sanitize),
        cta_type: envelope.cta_type.as_deref().map(sanitize),
        session_id: envelope.session_id.as_deref().map(sanitize),
        user_agent: header_value(&headers, "user-agent"),
        ip_address: extract_ip(&headers),
        referrer: extract_referrer(&headers),
        // Server-assigned: the client never controls the ordering key
        created_at: Utc::now().naive_utc(),
    };

    let conn = Arc::clone(&state.conn);
    tokio::task::spawn_blocking(move || {
        let conn = conn.lock();
        insert_event(&conn, &event)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Insert task panicked: {e}")))??;

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Extract client IP from proxy headers.
///
/// Precedence: first X-Forwarded-For entry, then X-Real-IP, else none.
fn extract_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| header_value(headers, "x-real-ip"))
}

/// Referrer from the standard (misspelled) header, with the spelled-out
/// variant as a fallback.
fn extract_referrer(headers: &HeaderMap) -> Option<String> {
    header_value(headers, "referer").or_else(|| header_value(headers, "referrer"))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Strip control characters from a free-text field.
fn sanitize(input: &str) -> String {
    input.chars().filter(|c| !c.is_control()).collect()
}
