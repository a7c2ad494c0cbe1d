// 3rd party crates
use reqwest::Client;

/// Queries public-IP echo services until one yields a usable address.
#[derive(Debug, Clone)]
pub struct IpDetector {
    pub(super) urls: Vec<String>,
    pub(super) client: Client,
}
