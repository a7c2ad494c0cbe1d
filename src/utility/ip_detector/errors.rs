// 3rd party crates
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IpDetectionError {
    #[error("failed to build HTTP client: {0}")]
    HttpClientBuild(reqwest::Error),

    #[error("no IP check endpoints configured")]
    NoEndpoints,

    #[error("all {attempted} IP check endpoints failed")]
    AllEndpointsFailed { attempted: usize },
}
