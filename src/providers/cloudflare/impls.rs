// Standard library
use std::net::Ipv4Addr;
use std::time::Duration;

// 3rd party crates
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

// Project imports
use crate::settings::types::DnsRecordConfig;

// Current module imports
use super::constants::{API_TIMEOUT_SECS, CLOUDFLARE_API_BASE};
use super::errors::CloudflareError;
use super::functions::{clamp_ttl, select_zone};
use super::types::{
    ApiEnvelope, CloudflareClient, ObservedRecord, TokenVerification, UpdateRecordRequest, Zone,
};

impl CloudflareClient {
    pub fn new(api_token: &str) -> Result<Self, CloudflareError> {
        Self::with_api_base(api_token, CLOUDFLARE_API_BASE)
    }

    pub(crate) fn with_api_base(
        api_token: &str,
        api_base: impl Into<String>,
    ) -> Result<Self, CloudflareError> {
        let token = api_token.trim();
        if token.is_empty() {
            return Err(CloudflareError::MissingApiToken);
        }

        let mut headers: HeaderMap = HeaderMap::new();
        let mut auth_value: HeaderValue = HeaderValue::from_str(&format!("Bearer {token}"))?;
        auth_value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_value);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let client: Client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .build()
            .map_err(CloudflareError::HttpClientBuild)?;

        Ok(Self {
            api_base: api_base.into(),
            client,
            zones: RwLock::new(None),
        })
    }

    /// Verifies the API token against `GET /user/tokens/verify`.
    pub async fn verify_token(&self) -> Result<TokenVerification, CloudflareError> {
        let url = format!("{}/user/tokens/verify", self.api_base);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(CloudflareError::Transport)?;

        let envelope = check_envelope::<TokenVerification>(response, "token verification").await?;
        require_result(envelope, "token verification")
    }

    /// Lists every zone the token can see, in one page.
    pub async fn list_zones(&self) -> Result<Vec<Zone>, CloudflareError> {
        let url = format!("{}/zones?per_page=1000", self.api_base);
        debug!("fetching zone list");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(CloudflareError::Transport)?;

        let envelope = check_envelope::<Vec<Zone>>(response, "zone listing").await?;
        require_result(envelope, "zone listing")
    }

    /// Zone list, fetched once per process lifetime.
    async fn zones_cached(&self) -> Result<Vec<Zone>, CloudflareError> {
        if let Some(zones) = self.zones.read().await.as_ref() {
            return Ok(zones.clone());
        }

        let mut guard = self.zones.write().await;
        if let Some(zones) = guard.as_ref() {
            return Ok(zones.clone());
        }

        let zones = self.list_zones().await?;
        debug!(count = zones.len(), "zone list cached");
        *guard = Some(zones.clone());
        Ok(zones)
    }

    /// Resolves a record name to its owning zone.
    pub async fn resolve_zone(&self, record_name: &str) -> Result<Zone, CloudflareError> {
        let zones = self.zones_cached().await?;
        select_zone(&zones, record_name)
            .cloned()
            .ok_or_else(|| CloudflareError::ZoneNotFound {
                record: record_name.to_string(),
                zones: zones.iter().map(|z| z.name.clone()).collect(),
            })
    }

    /// Fetches the provider's current state for a (name, type) pair.
    pub async fn find_record(
        &self,
        name: &str,
        record_type: &str,
    ) -> Result<ObservedRecord, CloudflareError> {
        let zone = self.resolve_zone(name).await?;
        if !zone.status.eq_ignore_ascii_case("active") {
            warn!(zone = %zone.name, status = %zone.status, "zone is not active");
        }
        let url = format!(
            "{}/zones/{}/dns_records?type={}&name={}",
            self.api_base, zone.id, record_type, name
        );

        debug!(zone = %zone.name, record = %name, "looking up DNS record");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(CloudflareError::Transport)?;

        let envelope = check_envelope::<Vec<ObservedRecord>>(response, "record lookup").await?;
        let records = require_result(envelope, "record lookup")?;

        records
            .into_iter()
            .next()
            .ok_or_else(|| CloudflareError::RecordNotFound {
                name: name.to_string(),
                record_type: record_type.to_string(),
            })
    }

    /// Rewrites a record with the desired state and the new address.
    /// The TTL is clamped into the provider's accepted range first.
    pub async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        desired: &DnsRecordConfig,
        ip: Ipv4Addr,
    ) -> Result<(), CloudflareError> {
        let url = format!(
            "{}/zones/{}/dns_records/{}",
            self.api_base, zone_id, record_id
        );

        let ttl = clamp_ttl(desired.ttl);
        let request = UpdateRecordRequest {
            record_type: desired.record_type.as_str(),
            name: &desired.name,
            content: ip.to_string(),
            proxied: desired.proxied,
            ttl,
        };

        info!(record = %desired.name, ip = %ip, ttl, "updating DNS record");

        let response = self
            .client
            .put(&url)
            .json(&request)
            .send()
            .await
            .map_err(CloudflareError::Transport)?;

        check_envelope::<serde_json::Value>(response, "record update").await?;
        Ok(())
    }
}

/// Parses the response body as an API envelope and maps
/// `success=false` to a structured error carrying the first entry.
async fn check_envelope<T: DeserializeOwned>(
    response: Response,
    context: &'static str,
) -> Result<ApiEnvelope<T>, CloudflareError> {
    let status = response.status();
    let body = response.text().await.map_err(CloudflareError::Transport)?;

    let envelope: ApiEnvelope<T> =
        serde_json::from_str(&body).map_err(|e| CloudflareError::InvalidResponse {
            context,
            message: format!("status {status}: {e}"),
        })?;

    if !envelope.success {
        return Err(match envelope.errors.first() {
            Some(entry) => CloudflareError::Api {
                code: entry.code,
                message: entry.message.clone(),
            },
            None => CloudflareError::Failed {
                status: status.as_u16(),
            },
        });
    }

    Ok(envelope)
}

fn require_result<T>(
    envelope: ApiEnvelope<T>,
    context: &'static str,
) -> Result<T, CloudflareError> {
    envelope.result.ok_or(CloudflareError::InvalidResponse {
        context,
        message: "missing result".to_string(),
    })
}
