/// Cloudflare API v4 base URL.
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Timeout for Cloudflare API requests, in seconds.
pub const API_TIMEOUT_SECS: u64 = 30;
