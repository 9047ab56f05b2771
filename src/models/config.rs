//! Application configuration structures.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::ListingSelectors;

/// Environment variable holding the sent-id store connection string.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
/// Environment variable holding the Telegram bot token.
pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
/// Environment variable holding the destination chat id.
pub const ENV_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listing page URLs, polled in this order
    #[serde(default = "defaults::sources")]
    pub sources: Vec<String>,

    /// Poll loop cadence
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Browser and wait settings
    #[serde(default)]
    pub renderer: RendererConfig,

    /// Detail page retry settings
    #[serde(default)]
    pub detail: DetailConfig,

    /// Title filter tokens
    #[serde(default)]
    pub filter: FilterConfig,

    /// Listing and detail page selectors
    #[serde(default)]
    pub selectors: ListingSelectors,

    /// Messaging endpoint settings
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Caption labels
    #[serde(default)]
    pub message: MessageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, falling back to defaults only when the file is missing.
    ///
    /// A file that exists but does not parse is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!(
                "Config file {} not found. Using defaults.",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(AppError::validation("No sources defined"));
        }
        for source in &self.sources {
            url::Url::parse(source)
                .map_err(|e| AppError::validation(format!("Invalid source URL {source}: {e}")))?;
        }
        if self.monitor.interval_secs == 0 {
            return Err(AppError::validation("monitor.interval_secs must be > 0"));
        }
        if self.renderer.user_agent.trim().is_empty() {
            return Err(AppError::validation("renderer.user_agent is empty"));
        }
        if self.renderer.page_load_timeout_secs == 0 {
            return Err(AppError::validation(
                "renderer.page_load_timeout_secs must be > 0",
            ));
        }
        if self.renderer.listing_wait_secs == 0 || self.renderer.detail_wait_secs == 0 {
            return Err(AppError::validation("renderer wait budgets must be > 0"));
        }
        if self.renderer.poll_interval_ms == 0 {
            return Err(AppError::validation("renderer.poll_interval_ms must be > 0"));
        }
        if self.detail.retries > 10 {
            return Err(AppError::validation("detail.retries must be <= 10"));
        }
        if self.filter.include.iter().all(|t| t.trim().is_empty()) {
            return Err(AppError::validation("No include tokens defined"));
        }
        if self.notifier.timeout_secs == 0 {
            return Err(AppError::validation("notifier.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.notifier.api_base)
            .map_err(|e| AppError::validation(format!("Invalid notifier.api_base: {e}")))?;
        self.selectors.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: defaults::sources(),
            monitor: MonitorConfig::default(),
            renderer: RendererConfig::default(),
            detail: DetailConfig::default(),
            filter: FilterConfig::default(),
            selectors: ListingSelectors::default(),
            notifier: NotifierConfig::default(),
            message: MessageConfig::default(),
        }
    }
}

/// Poll loop cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Sleep between cycles in seconds
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
        }
    }
}

/// Browser session and wait settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// User-Agent presented by the browser
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Run the browser without a window
    #[serde(default = "defaults::headless")]
    pub headless: bool,

    /// Explicit Chrome/Chromium executable; auto-detected when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_executable: Option<PathBuf>,

    /// Navigation timeout in seconds
    #[serde(default = "defaults::page_load_timeout")]
    pub page_load_timeout_secs: u64,

    /// Wait budget for listing card markers in seconds
    #[serde(default = "defaults::marker_wait")]
    pub listing_wait_secs: u64,

    /// Wait budget for the detail page marker in seconds
    #[serde(default = "defaults::marker_wait")]
    pub detail_wait_secs: u64,

    /// Marker poll interval in milliseconds
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_ms: u64,
}

impl RendererConfig {
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn listing_wait(&self) -> Duration {
        Duration::from_secs(self.listing_wait_secs)
    }

    pub fn detail_wait(&self) -> Duration {
        Duration::from_secs(self.detail_wait_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            headless: defaults::headless(),
            chrome_executable: None,
            page_load_timeout_secs: defaults::page_load_timeout(),
            listing_wait_secs: defaults::marker_wait(),
            detail_wait_secs: defaults::marker_wait(),
            poll_interval_ms: defaults::poll_interval(),
        }
    }
}

/// Detail page retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailConfig {
    /// Extra attempts after the first failure
    #[serde(default = "defaults::retries")]
    pub retries: u32,

    /// Fixed delay between attempts in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            retries: defaults::retries(),
            retry_delay_ms: defaults::retry_delay(),
        }
    }
}

/// Title filter tokens, matched case-insensitively as substrings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Product family tokens; a title must contain at least one
    #[serde(default = "defaults::include")]
    pub include: Vec<String>,

    /// Priority model tokens
    #[serde(default = "defaults::priority")]
    pub priority: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            include: defaults::include(),
            priority: defaults::priority(),
        }
    }
}

/// Messaging endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Bot API base URL
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::notifier_timeout")]
    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            timeout_secs: defaults::notifier_timeout(),
        }
    }
}

/// Caption labels and sentinels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageConfig {
    /// Prefix put in front of priority titles
    #[serde(default = "defaults::priority_marker")]
    pub priority_marker: String,

    #[serde(default = "defaults::price_label")]
    pub price_label: String,

    #[serde(default = "defaults::date_label")]
    pub date_label: String,

    /// Anchor text of the listing link
    #[serde(default = "defaults::link_text")]
    pub link_text: String,

    /// Date shown when a card carries none
    #[serde(default = "defaults::date_fallback")]
    pub date_fallback: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            priority_marker: defaults::priority_marker(),
            price_label: defaults::price_label(),
            date_label: defaults::date_label(),
            link_text: defaults::link_text(),
            date_fallback: defaults::date_fallback(),
        }
    }
}

/// Credentials and endpoints read from the environment.
#[derive(Clone)]
pub struct Secrets {
    pub database_url: String,
    pub bot_token: String,
    pub chat_id: String,
}

impl Secrets {
    /// Read all required variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read all required variables through `lookup`, failing on the first absent one.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::config(format!("{key} is not set")))
        };

        Ok(Self {
            database_url: require(ENV_DATABASE_URL)?,
            bot_token: require(ENV_BOT_TOKEN)?,
            chat_id: require(ENV_CHAT_ID)?,
        })
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("database_url", &"<redacted>")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

mod defaults {
    // Source defaults
    pub fn sources() -> Vec<String> {
        vec![
            "https://www.olx.ua/uk/list/q-canon-ixus/?search%5Bfilter_float_price:to%5D=5000&search%5Bfilter_enum_digital_camera_manufacturers%5D%5B0%5D=2580".into(),
            "https://www.olx.ua/uk/list/q-canon-elph/?search%5Border%5D=created_at:desc&search%5Bfilter_float_price:to%5D=5000&search%5Bfilter_enum_digital_camera_manufacturers%5D%5B0%5D=2580".into(),
        ]
    }

    // Monitor defaults
    pub fn interval() -> u64 {
        300
    }

    // Renderer defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:110.0) Gecko/20100101 Firefox/110.0".into()
    }
    pub fn headless() -> bool {
        true
    }
    pub fn page_load_timeout() -> u64 {
        60
    }
    pub fn marker_wait() -> u64 {
        15
    }
    pub fn poll_interval() -> u64 {
        250
    }

    // Detail defaults
    pub fn retries() -> u32 {
        2
    }
    pub fn retry_delay() -> u64 {
        1000
    }

    // Filter defaults
    pub fn include() -> Vec<String> {
        vec!["ixus".into(), "elph".into()]
    }
    pub fn priority() -> Vec<String> {
        ["135", "160", "175", "185", "190", "220"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    // Notifier defaults
    pub fn api_base() -> String {
        "https://api.telegram.org".into()
    }
    pub fn notifier_timeout() -> u64 {
        30
    }

    // Message defaults
    pub fn priority_marker() -> String {
        "🔥 ПРІОРИТЕТ".into()
    }
    pub fn price_label() -> String {
        "Ціна".into()
    }
    pub fn date_label() -> String {
        "Дата".into()
    }
    pub fn link_text() -> String {
        "Переглянути оголошення".into()
    }
    pub fn date_fallback() -> String {
        "Невідомо".into()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn default_message_labels() {
        let labels = MessageConfig::default();
        assert_eq!(labels.priority_marker, "🔥 ПРІОРИТЕТ");
        assert_eq!(labels.price_label, "Ціна");
        assert_eq!(labels.date_label, "Дата");
        assert_eq!(labels.link_text, "Переглянути оголошення");
        assert_eq!(labels.date_fallback, "Невідомо");
    }

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_sources() {
        let mut config = Config::default();
        config.sources.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_source_url() {
        let mut config = Config::default();
        config.sources = vec!["not a url".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.monitor.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_include_tokens() {
        let mut config = Config::default();
        config.filter.include = vec!["  ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
sources = ["https://example.com/list"]

[monitor]
interval_secs = 60

[filter]
include = ["powershot"]
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.sources, vec!["https://example.com/list"]);
        assert_eq!(config.monitor.interval_secs, 60);
        assert_eq!(config.filter.include, vec!["powershot"]);
        assert_eq!(config.filter.priority.len(), 6);
        assert_eq!(config.detail.retries, 2);
        assert_eq!(config.renderer.detail_wait_secs, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.sources.len(), 2);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sources = [").unwrap();
        assert!(matches!(
            Config::load_or_default(file.path()),
            Err(AppError::Toml(_))
        ));
    }

    #[test]
    fn secrets_require_every_variable() {
        let mut env = HashMap::new();
        env.insert(ENV_DATABASE_URL, "postgres://localhost/ads");
        env.insert(ENV_BOT_TOKEN, "123:abc");

        let err = Secrets::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains(ENV_CHAT_ID));

        env.insert(ENV_CHAT_ID, "-100200300");
        let secrets = Secrets::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(secrets.chat_id, "-100200300");
    }

    #[test]
    fn secrets_debug_hides_token() {
        let secrets = Secrets {
            database_url: "postgres://user:pw@host/db".into(),
            bot_token: "123:secret".into(),
            chat_id: "42".into(),
        };
        let rendered = format!("{secrets:?}");
        assert!(!rendered.contains("secret"));
        assert!(!rendered.contains("pw"));
    }
}
