// 3rd party crates
use thiserror::Error;

// Project imports
use crate::providers::cloudflare::CloudflareError;
use crate::utility::ip_detector::IpDetectionError;
use crate::webhook::WebhookError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Cloudflare API token verification failed: {0}")]
    TokenVerification(#[source] CloudflareError),

    #[error("provider client error: {0}")]
    Cloudflare(#[from] CloudflareError),

    #[error("webhook client error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("IP detection error: {0}")]
    IpDetection(#[from] IpDetectionError),
}
