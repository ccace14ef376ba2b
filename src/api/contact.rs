use crate::api::errors::ApiError;
use crate::api::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A contact-form submission forwarded to the third-party form backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// POST /api/contact — forward a contact submission to the configured
/// form-processing service.
///
/// The site itself never stores leads; it is a pass-through. 500 when no
/// endpoint is configured, 502 when the upstream call fails.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<ContactSubmission>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if submission.name.trim().is_empty()
        || submission.email.trim().is_empty()
        || submission.message.trim().is_empty()
    {
        return Err(ApiError::BadRequest(
            "name, email and message are required".to_string(),
        ));
    }

    let Some(endpoint) = state.form_endpoint.clone() else {
        return Err(ApiError::Internal(
            "contact form endpoint is not configured".to_string(),
        ));
    };

    tokio::task::spawn_blocking(move || forward(&endpoint, &submission))
        .await
        .map_err(|e| ApiError::Internal(format!("Forward task panicked: {e}")))?
        .map_err(|reason| {
            tracing::error!(error = %reason, "Contact form forwarding failed");
            ApiError::Upstream("failed to deliver contact submission".to_string())
        })?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

fn forward(endpoint: &str, submission: &ContactSubmission) -> Result<(), String> {
    ureq::post(endpoint)
        .send_json(submission)
        .map(|_| ())
        .map_err(|e| e.to_string())
}
