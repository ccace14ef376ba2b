use crate::api::errors::ApiError;
use crate::api::AppState;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use subtle::ConstantTimeEq;

/// Name of the admin session cookie.
pub const SESSION_COOKIE: &str = "admin_session";

/// In-memory store of admin session tokens.
///
/// A token is the sole session artifact: no user identity, no rotation, no
/// revocation list. Expiry is the only termination mechanism, so expired
/// tokens are pruned lazily on access.
pub struct SessionStore {
    tokens: Mutex<HashMap<String, Instant>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    /// Mint a new opaque session token.
    pub fn create(&self) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        let mut tokens = self.tokens.lock();
        let now = Instant::now();
        tokens.retain(|_, expires| *expires > now);
        tokens.insert(token.clone(), now + self.ttl);
        token
    }

    /// Whether the token exists and has not expired.
    pub fn is_valid(&self, token: &str) -> bool {
        self.tokens
            .lock()
            .get(token)
            .is_some_and(|expires| *expires > Instant::now())
    }

    pub const fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs()
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

/// GET /api/admin/auth — report whether the request carries a valid session.
pub async fn auth_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let authenticated = is_authenticated(&state, &headers);
    Json(serde_json::json!({ "authenticated": authenticated }))
}

/// POST /api/admin/auth — shared-secret password check.
///
/// On match, sets a short-lived HTTP-only session cookie. 500 when the server
/// has no admin password configured, 401 on mismatch.
pub async fn auth_login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let Some(expected) = state.admin_password.as_deref() else {
        return Err(ApiError::Internal(
            "admin password is not configured".to_string(),
        ));
    };

    let matches: bool = request
        .password
        .as_bytes()
        .ct_eq(expected.as_bytes())
        .into();
    if !matches {
        return Err(ApiError::Unauthorized("invalid password".to_string()));
    }

    let token = state.sessions.create();
    let cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        state.sessions.ttl_secs()
    );

    let mut response = Json(serde_json::json!({ "authenticated": true })).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| ApiError::Internal("failed to build session cookie".to_string()))?,
    );
    Ok(response)
}

/// Whether the request carries a valid, unexpired admin session cookie.
pub fn is_authenticated(state: &AppState, headers: &HeaderMap) -> bool {
    session_token(headers).is_some_and(|token| state.sessions.is_valid(&token))
}

/// Pull the session token out of the Cookie header, if present.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}
