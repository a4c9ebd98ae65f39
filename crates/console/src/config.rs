const DEFAULT_API_URL: &str = "http://localhost:3000/api/v1";

/// Console configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL of the catalog API, without a trailing slash.
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                          |
    /// |-------------------------------|----------------------------------|
    /// | `CURSUS_API_URL`              | `http://localhost:3000/api/v1`   |
    /// | `CURSUS_REQUEST_TIMEOUT_SECS` | `30`                             |
    ///
    /// # Panics
    ///
    /// Panics if the timeout is not a valid number.
    pub fn from_env() -> Self {
        let api_url = std::env::var("CURSUS_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.into())
            .trim_end_matches('/')
            .to_string();

        let request_timeout_secs: u64 = std::env::var("CURSUS_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("CURSUS_REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            api_url,
            request_timeout_secs,
        }
    }
}
