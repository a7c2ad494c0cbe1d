// Standard library
use std::path::PathBuf;
use std::time::SystemTime;

// 3rd party crates
use serde::Deserialize;

// Current module imports
use super::constants::DEFAULT_CHECK_INTERVAL;

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct Log {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Global reconciliation settings.
#[derive(Debug, Deserialize, Clone)]
pub struct Global {
    /// Seconds between reconciliation ticks.
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,
    /// Public IP echo endpoints, queried in order.
    #[serde(default)]
    pub ip_check_urls: Vec<String>,
}

/// Cloudflare credentials.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CloudflareSettings {
    #[serde(default)]
    pub api_token: String,
}

/// DNS record type tag. Only `A` records can be kept in sync by the
/// IPv4 probe; `AAAA` is accepted and passed through opaquely.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A,
    #[serde(rename = "AAAA")]
    Aaaa,
}

/// A single DNS record the service keeps pointed at the public IP.
#[derive(Debug, Deserialize, Clone)]
pub struct DnsRecordConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(default)]
    pub proxied: bool,
    /// 1 means provider-chosen automatic, otherwise 60-86400 seconds.
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

/// Webhook delivery mode.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WebhookKind {
    #[default]
    Generic,
    Telegram,
}

/// Telegram message template.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WebhookTemplate {
    #[default]
    Text,
    Markdown,
    Html,
}

/// Notification channel configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct WebhookSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "type", default)]
    pub kind: WebhookKind,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub chat_id: String,
    #[serde(default)]
    pub template: WebhookTemplate,
    #[serde(default)]
    pub on_success: bool,
    #[serde(default)]
    pub on_failure: bool,
}

/// The fully-resolved configuration document.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub cloudflare: CloudflareSettings,
    #[serde(default)]
    pub dns_records: Vec<DnsRecordConfig>,
    #[serde(default)]
    pub webhook: WebhookSettings,
}

/// Loads the configuration and tracks the file for hot-reload.
pub struct ConfigManager {
    pub settings: Settings,
    pub(crate) config_path: PathBuf,
    pub(crate) last_modified: SystemTime,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Global {
    fn default() -> Self {
        Self {
            check_interval: default_check_interval(),
            ip_check_urls: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_check_interval() -> u64 {
    DEFAULT_CHECK_INTERVAL
}

fn default_ttl() -> u32 {
    1
}
