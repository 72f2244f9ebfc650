/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Quiet period before a connection's session is re-checked (default: `1000`).
    pub session_check_delay_ms: u64,
    /// Issuer label embedded in TOTP provisioning URIs (default: `tabsync`).
    pub totp_issuer: String,
    /// How long an unverified account survives before the sweep deletes it
    /// (default: `24`).
    pub unverified_retention_hours: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `HOST`                       | `0.0.0.0`               |
    /// | `PORT`                       | `3000`                  |
    /// | `CORS_ORIGINS`               | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                    |
    /// | `SESSION_CHECK_DELAY_MS`     | `1000`                  |
    /// | `TOTP_ISSUER`                | `tabsync`               |
    /// | `UNVERIFIED_RETENTION_HOURS` | `24`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let session_check_delay_ms: u64 = std::env::var("SESSION_CHECK_DELAY_MS")
            .unwrap_or_else(|_| "1000".into())
            .parse()
            .expect("SESSION_CHECK_DELAY_MS must be a valid u64");

        let totp_issuer = std::env::var("TOTP_ISSUER").unwrap_or_else(|_| "tabsync".into());
        assert!(
            !totp_issuer.contains(':'),
            "TOTP_ISSUER must not contain ':'"
        );

        let unverified_retention_hours: i64 = std::env::var("UNVERIFIED_RETENTION_HOURS")
            .unwrap_or_else(|_| "24".into())
            .parse()
            .expect("UNVERIFIED_RETENTION_HOURS must be a valid i64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            session_check_delay_ms,
            totp_issuer,
            unverified_retention_hours,
        }
    }
}
