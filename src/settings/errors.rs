// 3rd party crates
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("no configuration file found (searched: {searched})")]
    NotFound { searched: String },

    #[error("failed to load configuration: {0}")]
    Read(#[from] config::ConfigError),

    #[error("failed to stat configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration validation failed: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid log level: {0} (must be one of: error, warn, info, debug, trace)")]
    InvalidLogLevel(String),

    #[error("Cloudflare API token is not set")]
    MissingApiToken,

    #[error("no DNS records configured")]
    NoRecords,

    #[error("duplicate DNS record: {0}")]
    DuplicateRecord(String),

    #[error("invalid TTL for record '{name}': {ttl} (must be 1 for automatic or 60-86400 seconds)")]
    InvalidTtl { name: String, ttl: u32 },

    #[error("webhook is enabled but no URL is set")]
    WebhookUrlMissing,

    #[error("telegram webhook requires a chat_id")]
    TelegramChatIdMissing,
}
