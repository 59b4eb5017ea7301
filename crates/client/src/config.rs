//! Client configuration from the environment.

use std::path::PathBuf;

use appealwall_observability::LogFormat;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_STORE_PATH: &str = "appealwall-session.json";
pub const DEFAULT_TENANT_NAME: &str = "信息学部";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every API path is joined to.
    pub api_url: String,
    /// File backing the durable session store.
    pub store_path: PathBuf,
    /// Used to detect the embedded (in-app browser) context.
    pub user_agent: String,
    pub tenant_name: String,
    pub log_format: LogFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            user_agent: String::new(),
            tenant_name: DEFAULT_TENANT_NAME.to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl ClientConfig {
    /// Read `APPEALWALL_*` variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Just the log format, for installing the subscriber before the rest of
    /// the configuration is read (and logged).
    pub fn log_format_from_env() -> LogFormat {
        std::env::var("APPEALWALL_LOG_FORMAT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = var("APPEALWALL_API_URL").unwrap_or_else(|| {
            tracing::info!(default = DEFAULT_API_URL, "APPEALWALL_API_URL not set");
            defaults.api_url
        });

        let store_path = var("APPEALWALL_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_path);

        let log_format = match var("APPEALWALL_LOG_FORMAT").map(|v| v.parse::<LogFormat>()) {
            Some(Ok(format)) => format,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "ignoring APPEALWALL_LOG_FORMAT");
                defaults.log_format
            }
            None => defaults.log_format,
        };

        Self {
            api_url,
            store_path,
            user_agent: var("APPEALWALL_USER_AGENT").unwrap_or(defaults.user_agent),
            tenant_name: var("APPEALWALL_TENANT_NAME").unwrap_or(defaults.tenant_name),
            log_format,
        }
    }
}
