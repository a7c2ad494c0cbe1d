// 3rd party crates
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("failed to build HTTP client: {0}")]
    HttpClientBuild(reqwest::Error),

    #[error("webhook request failed: {0}")]
    Transport(reqwest::Error),

    #[error("webhook delivery failed with status {status}: {body}")]
    Delivery { status: u16, body: String },
}
