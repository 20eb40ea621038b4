use assethub_core::user::LoginRequest;
use reqwest::Url;

/// Default API base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Default path of the upload presign endpoint, relative to the API base.
pub const DEFAULT_PRESIGN_PATH: &str = "/uploads/presign";

/// Default per-request transport timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash.
    pub api_url: String,
    /// Presign endpoint path, e.g. `/uploads/presign`.
    pub presign_path: String,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Credentials to log in with before management calls.
    pub login: Option<LoginRequest>,
}

/// A configuration variable held an unusable value.
#[derive(Debug, thiserror::Error)]
#[error("{var} must be {expected}, got '{value}'")]
pub struct ConfigError {
    pub var: &'static str,
    pub expected: &'static str,
    pub value: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            presign_path: DEFAULT_PRESIGN_PATH.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            login: None,
        }
    }
}

impl ClientConfig {
    /// Defaults with a different API base URL (trailing slash removed).
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: normalize_base(&api_url.into()),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                      |
    /// |----------------------------------|------------------------------|
    /// | `ASSETHUB_API_URL`               | `http://localhost:5000/api`  |
    /// | `ASSETHUB_PRESIGN_PATH`          | `/uploads/presign`           |
    /// | `ASSETHUB_REQUEST_TIMEOUT_SECS`  | `30`                         |
    /// | `ASSETHUB_EMAIL`                 | unset                        |
    /// | `ASSETHUB_PASSWORD`              | unset                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_url = var("ASSETHUB_API_URL")
            .map(|v| normalize_base(&v))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        parse_api_url(&api_url)?;

        let presign_path = var("ASSETHUB_PRESIGN_PATH")
            .map(|v| normalize_path(&v))
            .unwrap_or_else(|| DEFAULT_PRESIGN_PATH.to_string());

        let request_timeout_secs = match var("ASSETHUB_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError {
                var: "ASSETHUB_REQUEST_TIMEOUT_SECS",
                expected: "a whole number of seconds",
                value: raw,
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let login = match (var("ASSETHUB_EMAIL"), var("ASSETHUB_PASSWORD")) {
            (Some(email), Some(password)) => Some(LoginRequest { email, password }),
            _ => None,
        };

        Ok(Self {
            api_url,
            presign_path,
            request_timeout_secs,
            login,
        })
    }
}

/// Parse the API base URL; it must be absolute `http` or `https`.
pub(crate) fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError {
        var: "ASSETHUB_API_URL",
        expected: "an absolute http(s) URL",
        value: raw.to_string(),
    };
    let url = Url::parse(raw).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(invalid()),
    }
}

fn normalize_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
