use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration loaded from environment variables or TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Shared secret for the admin dashboard. Logins are rejected with a
    /// configuration error when unset.
    #[serde(default)]
    pub admin_password: Option<String>,
    /// Admin session cookie lifetime in seconds (default: 14400 = 4h).
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Dashboard origin for CORS restrictions on admin routes.
    /// If not set, admin routes allow any origin.
    #[serde(default)]
    pub dashboard_origin: Option<String>,
    /// Third-party form-processing endpoint contact submissions are forwarded
    /// to. Contact submissions fail when unset.
    #[serde(default)]
    pub form_endpoint: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

const fn default_session_ttl_secs() -> u64 {
    14_400
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            admin_password: None,
            session_ttl_secs: default_session_ttl_secs(),
            dashboard_origin: None,
            form_endpoint: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults.
    ///
    /// Environment variables override file values:
    /// - `PAGEPULSE_HOST` → host
    /// - `PAGEPULSE_PORT` → port
    /// - `PAGEPULSE_DATA_DIR` → data_dir
    /// - `PAGEPULSE_ADMIN_PASSWORD` → admin_password
    /// - `PAGEPULSE_SESSION_TTL` → session_ttl_secs
    /// - `PAGEPULSE_DASHBOARD_ORIGIN` → dashboard_origin
    /// - `PAGEPULSE_FORM_ENDPOINT` → form_endpoint
    pub fn load(config_path: Option<&Path>) -> Self {
        let mut config =
            config_path.map_or_else(Self::default, |path| match std::fs::read_to_string(path) {
                Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                    tracing::warn!("Failed to parse config file: {e}, using defaults");
                    Self::default()
                }),
                Err(e) => {
                    tracing::warn!("Failed to read config file: {e}, using defaults");
                    Self::default()
                }
            });

        // Environment variable overrides
        if let Ok(host) = std::env::var("PAGEPULSE_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("PAGEPULSE_PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }
        if let Ok(data_dir) = std::env::var("PAGEPULSE_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(password) = std::env::var("PAGEPULSE_ADMIN_PASSWORD") {
            if !password.is_empty() {
                config.admin_password = Some(password);
            }
        }
        if let Ok(val) = std::env::var("PAGEPULSE_SESSION_TTL") {
            if let Ok(t) = val.parse() {
                config.session_ttl_secs = t;
            }
        }
        if let Ok(origin) = std::env::var("PAGEPULSE_DASHBOARD_ORIGIN") {
            config.dashboard_origin = Some(origin);
        }
        if let Ok(endpoint) = std::env::var("PAGEPULSE_FORM_ENDPOINT") {
            config.form_endpoint = Some(endpoint);
        }

        config
    }

    /// Returns the path to the DuckDB database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("events.duckdb")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    /// Mutex to serialize tests that call `Config::load`, which reads
    /// environment variables. Without this, `test_env_var_overrides` can
    /// pollute other tests running in parallel.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(config.admin_password.is_none());
        assert_eq!(config.session_ttl_secs, 14_400);
        assert!(config.dashboard_origin.is_none());
        assert!(config.form_endpoint.is_none());
    }

    #[test]
    fn test_load_from_toml() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        write!(
            file,
            r#"
host = "127.0.0.1"
port = 9000
data_dir = "/var/pagepulse"
admin_password = "hunter2"
session_ttl_secs = 3600
dashboard_origin = "https://www.example.com"
form_endpoint = "https://formspree.io/f/abc123"
"#
        )
        .unwrap();

        let config = Config::load(Some(&config_path));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_dir, PathBuf::from("/var/pagepulse"));
        assert_eq!(config.admin_password.as_deref(), Some("hunter2"));
        assert_eq!(config.session_ttl_secs, 3600);
        assert_eq!(
            config.dashboard_origin.as_deref(),
            Some("https://www.example.com")
        );
        assert_eq!(
            config.form_endpoint.as_deref(),
            Some("https://formspree.io/f/abc123")
        );
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let config = Config::load(Some(Path::new("/nonexistent/config.toml")));
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_load_no_path_uses_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let config = Config::load(None);
        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_database_path() {
        let config = Config {
            data_dir: PathBuf::from("/var/pagepulse"),
            ..Config::default()
        };
        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/pagepulse/events.duckdb")
        );
    }

    #[test]
    fn test_env_var_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();

        // Save original values
        let orig_port = std::env::var("PAGEPULSE_PORT").ok();

        std::env::set_var("PAGEPULSE_PORT", "3000");
        let config = Config::load(None);
        assert_eq!(config.port, 3000);

        // Restore
        match orig_port {
            Some(v) => std::env::set_var("PAGEPULSE_PORT", v),
            None => std::env::remove_var("PAGEPULSE_PORT"),
        }
    }

    #[test]
    fn test_invalid_toml_uses_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "this is not valid toml {{{").unwrap();

        let config = Config::load(Some(&config_path));
        assert_eq!(config.port, 8000);
    }
}
