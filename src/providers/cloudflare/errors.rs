// 3rd party crates
use thiserror::Error;

/// Errors surfaced by the Cloudflare facade.
#[derive(Debug, Error)]
pub enum CloudflareError {
    #[error("Cloudflare API token is not set")]
    MissingApiToken,

    #[error("invalid API token format: {0}")]
    InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    HttpClientBuild(reqwest::Error),

    #[error("network request failed: {0}")]
    Transport(reqwest::Error),

    #[error("Cloudflare API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Cloudflare API call failed with status {status}")]
    Failed { status: u16 },

    #[error("unexpected response during {context}: {message}")]
    InvalidResponse {
        context: &'static str,
        message: String,
    },

    #[error("DNS record not found: {name} ({record_type})")]
    RecordNotFound { name: String, record_type: String },

    #[error("no zone found for record '{record}', visible zones: {zones:?}")]
    ZoneNotFound { record: String, zones: Vec<String> },
}

impl CloudflareError {
    /// Coarse classification used for notification deduplication: a
    /// repeated failure of the same class is part of one streak.
    pub fn class(&self) -> String {
        match self {
            CloudflareError::MissingApiToken | CloudflareError::InvalidHeaderValue(_) => {
                "credentials".to_string()
            }
            CloudflareError::HttpClientBuild(_) => "client".to_string(),
            CloudflareError::Transport(_) => "network".to_string(),
            CloudflareError::Api { code, .. } => format!("api:{code}"),
            CloudflareError::Failed { status } => format!("failed:{status}"),
            CloudflareError::InvalidResponse { .. } => "invalid_response".to_string(),
            CloudflareError::RecordNotFound { .. } => "record_not_found".to_string(),
            CloudflareError::ZoneNotFound { .. } => "zone_not_found".to_string(),
        }
    }
}
