// 3rd party crates
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Client for the Cloudflare v4 API. One shared HTTP client, the
/// bearer token installed as a sensitive default header, and a
/// process-lifetime zone cache filled by a single zone listing.
pub struct CloudflareClient {
    pub(super) api_base: String,
    pub(super) client: Client,
    pub(super) zones: RwLock<Option<Vec<Zone>>>,
}

/// A zone visible to the account.
#[derive(Debug, Deserialize, Clone)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub status: String,
}

/// Provider-side state of a DNS record.
#[derive(Debug, Deserialize, Clone)]
pub struct ObservedRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub content: String,
    #[serde(default)]
    pub proxied: bool,
    pub ttl: u32,
    pub zone_id: String,
}

/// Result of `GET /user/tokens/verify`.
#[derive(Debug, Deserialize)]
pub struct TokenVerification {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// The `{success, errors, result}` wrapper every endpoint returns.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    pub(crate) success: bool,
    #[serde(default)]
    pub(crate) errors: Vec<ApiError>,
    pub(crate) result: Option<T>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiError {
    pub code: i64,
    pub message: String,
}

/// Body of `PUT /zones/{zone}/dns_records/{record}`.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateRecordRequest<'a> {
    #[serde(rename = "type")]
    pub(crate) record_type: &'a str,
    pub(crate) name: &'a str,
    pub(crate) content: String,
    pub(crate) proxied: bool,
    pub(crate) ttl: u32,
}
