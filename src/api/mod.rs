pub mod analytics;
pub mod auth;
pub mod contact;
pub mod errors;
pub mod log;

use duckdb::Connection;
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared application state for all request handlers.
pub struct AppState {
    /// Event store connection. Queries take the lock inside `spawn_blocking`.
    pub conn: Arc<Mutex<Connection>>,
    /// Admin dashboard session tokens.
    pub sessions: auth::SessionStore,
    /// Expected admin password. `None` means logins are rejected with a
    /// configuration error.
    pub admin_password: Option<String>,
    /// Third-party form-processing endpoint for contact submissions.
    pub form_endpoint: Option<String>,
    /// Dashboard origin for CORS restrictions on admin routes.
    pub dashboard_origin: Option<String>,
}
