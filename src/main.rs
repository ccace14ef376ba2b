use duckdb::Connection;
use pagepulse::api::auth::SessionStore;
use pagepulse::api::AppState;
use pagepulse::config::Config;
use pagepulse::{server, storage};
use parking_lot::Mutex;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagepulse=info,tower_http=info".into()),
        )
        .init();

    // Load configuration
    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref().map(std::path::Path::new));

    tracing::info!(
        host = %config.host,
        port = config.port,
        data_dir = %config.data_dir.display(),
        "Starting PagePulse"
    );

    // Ensure data directory exists
    std::fs::create_dir_all(&config.data_dir).expect("Failed to create data directory");

    // Initialize DuckDB
    let conn = Connection::open(config.database_path()).expect("Failed to open DuckDB");
    storage::migrations::run_migrations(&conn).expect("Failed to run migrations");

    if config.admin_password.is_none() {
        tracing::warn!(
            "No admin password configured; dashboard logins will be rejected. \
             Set PAGEPULSE_ADMIN_PASSWORD or `admin_password` in the config file."
        );
    }
    if config.form_endpoint.is_none() {
        tracing::warn!("No form endpoint configured; contact submissions will fail");
    }

    let state = Arc::new(AppState {
        conn: Arc::new(Mutex::new(conn)),
        sessions: SessionStore::new(config.session_ttl_secs),
        admin_password: config.admin_password.clone(),
        form_endpoint: config.form_endpoint.clone(),
        dashboard_origin: config.dashboard_origin.clone(),
    });

    let app = server::build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!(addr = %addr, "Listening");
    axum::serve(listener, app).await.expect("Server error");
}
