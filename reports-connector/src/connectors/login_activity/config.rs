use anyhow::{bail, Context, Result};
use serde::Deserialize;

pub const BASE_URL: &str = "https://admin.googleapis.com";
pub const TABLE_NAME: &str = "gcp_admin_reports_login_activity";
pub const APPLICATION_NAME: &str = "login";
pub const USER_KEY_ALL: &str = "all";
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_ADMIN_ACCESS_TOKEN";

/// Largest `maxResults` the Reports API accepts.
pub const PROVIDER_PAGE_MAX: u64 = 1000;

/// Longest default window accepted in config, in days.
pub const MAX_LOOKBACK_DAYS: i64 = 3650;

/// Login activity connector configuration.
///
/// Every field has a default, so an empty TOML file is a valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectorConfig {
    /// Reports API base URL (overridden in tests with a mock server).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whose activities to list.
    #[serde(default = "default_user_key")]
    pub user_key: String,

    /// Hard ceiling on records returned by one list invocation.
    #[serde(default = "default_max_total_results")]
    pub max_total_results: u64,

    /// Window size used when the query has no time qualifier.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    /// Upper bound on `maxResults` per page.
    #[serde(default = "default_page_size_max")]
    pub page_size_max: u64,

    /// HTTP request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    BASE_URL.to_string()
}

fn default_user_key() -> String {
    USER_KEY_ALL.to_string()
}

fn default_max_total_results() -> u64 {
    500
}

fn default_lookback_days() -> i64 {
    180
}

fn default_page_size_max() -> u64 {
    PROVIDER_PAGE_MAX
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_key: default_user_key(),
            max_total_results: default_max_total_results(),
            lookback_days: default_lookback_days(),
            page_size_max: default_page_size_max(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ConnectorConfig {
    /// Rejects values the Reports API or the fetch loop cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_total_results == 0 {
            bail!("max_total_results must be at least 1");
        }
        if self.page_size_max == 0 || self.page_size_max > PROVIDER_PAGE_MAX {
            bail!(
                "page_size_max must be between 1 and {}, got {}",
                PROVIDER_PAGE_MAX,
                self.page_size_max
            );
        }
        if !(0..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            bail!(
                "lookback_days must be between 0 and {}, got {}",
                MAX_LOOKBACK_DAYS,
                self.lookback_days
            );
        }
        if self.user_key.trim().is_empty() {
            bail!("user_key must not be empty");
        }
        Ok(())
    }
}

/// Loads and validates configuration from a TOML file.
pub fn load_config(path: &str) -> Result<ConnectorConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    let config: ConnectorConfig =
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file {}", path))?;
    config.validate()?;
    Ok(config)
}

/// Reads the OAuth access token from `GOOGLE_ADMIN_ACCESS_TOKEN`.
///
/// Obtaining and refreshing the token is the caller's job.
pub fn access_token_from_env() -> Result<String> {
    let token = std::env::var(ACCESS_TOKEN_ENV)
        .with_context(|| format!("{} not set", ACCESS_TOKEN_ENV))?;
    if token.trim().is_empty() {
        bail!("{} is empty", ACCESS_TOKEN_ENV);
    }
    Ok(token)
}

// Serializes tests that mutate the process-wide environment.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
