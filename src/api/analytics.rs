use crate::api::errors::ApiError;
use crate::api::{auth, AppState};
use crate::event::EventType;
use crate::query::aggregate::{aggregate, AggregationReport};
use crate::query::events::fetch_events;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

/// Query parameters for the admin analytics endpoint.
#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
    #[serde(default = "default_range")]
    pub range: String,
}

fn default_range() -> String {
    "7d".to_string()
}

/// Resolve a range selector into `(canonical_range, start, end)` timestamps
/// anchored to `now`.
///
/// `today` runs from the start of the current calendar day; unrecognized
/// values fall back to `7d`.
pub fn resolve_range(range: &str, now: DateTime<Utc>) -> (String, String, String) {
    let (canonical, start) = match range {
        "today" => ("today", now.date_naive().and_hms_opt(0, 0, 0).unwrap_or_default()),
        "30d" => ("30d", (now - chrono::Days::new(30)).naive_utc()),
        _ => ("7d", (now - chrono::Days::new(7)).naive_utc()),
    };

    let fmt = "%Y-%m-%d %H:%M:%S";
    (
        canonical.to_string(),
        start.format(fmt).to_string(),
        now.naive_utc().format(fmt).to_string(),
    )
}

/// GET /api/admin/analytics — per-channel aggregation for the selected range.
///
/// Requires a valid admin session cookie; rejected before any store access
/// otherwise. The three event streams are fetched independently and joined in
/// memory; any read failure aborts the whole request with no partial result.
pub async fn get_admin_analytics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<AggregationReport>, ApiError> {
    if !auth::is_authenticated(&state, &headers) {
        return Err(ApiError::Unauthorized(
            "admin session required".to_string(),
        ));
    }

    let (range, start, end) = resolve_range(&params.range, Utc::now());

    let conn = Arc::clone(&state.conn);
    let report = tokio::task::spawn_blocking(move || -> Result<AggregationReport, duckdb::Error> {
        let conn = conn.lock();
        let page_views = fetch_events(&conn, EventType::PageView, &start, &end)?;
        let section_views = fetch_events(&conn, EventType::SectionView, &start, &end)?;
        let cta_clicks = fetch_events(&conn, EventType::CtaClick, &start, &end)?;
        Ok(aggregate(&range, &start, &end, &page_views, &section_views, &cta_clicks))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Query task panicked: {e}")))??;

    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_resolve_range_today() {
        let (range, start, end) = resolve_range("today", noon());
        assert_eq!(range, "today");
        assert_eq!(start, "2024-01-15 00:00:00");
        assert_eq!(end, "2024-01-15 12:30:00");
    }

    #[test]
    fn test_resolve_range_7d() {
        let (range, start, end) = resolve_range("7d", noon());
        assert_eq!(range, "7d");
        assert_eq!(start, "2024-01-08 12:30:00");
        assert_eq!(end, "2024-01-15 12:30:00");
    }

    #[test]
    fn test_resolve_range_30d() {
        let (range, start, _) = resolve_range("30d", noon());
        assert_eq!(range, "30d");
        assert_eq!(start, "2023-12-16 12:30:00");
    }

    #[test]
    fn test_resolve_range_unrecognized_falls_back_to_7d() {
        let (range, start, _) = resolve_range("90d", noon());
        assert_eq!(range, "7d");
        assert_eq!(start, "2024-01-08 12:30:00");
    }
}
