// Standard library
use std::net::Ipv4Addr;
use std::time::Duration;

// 3rd party crates
use reqwest::Client;
use tracing::{debug, warn};

// Current module imports
use super::constants::PROBE_TIMEOUT_SECS;
use super::errors::IpDetectionError;
use super::types::IpDetector;

impl IpDetector {
    pub fn new(urls: Vec<String>) -> Result<Self, IpDetectionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .build()
            .map_err(IpDetectionError::HttpClientBuild)?;

        Ok(Self { urls, client })
    }

    /// Returns the first well-formed public IPv4 address from the
    /// endpoint pool. Network failures, non-2xx statuses and garbage
    /// bodies all mean try-next; only full exhaustion is an error.
    pub async fn discover(&self) -> Result<Ipv4Addr, IpDetectionError> {
        if self.urls.is_empty() {
            return Err(IpDetectionError::NoEndpoints);
        }

        for url in &self.urls {
            match self.query_endpoint(url).await {
                Ok(ip) => {
                    debug!(endpoint = %url, ip = %ip, "public IP discovered");
                    return Ok(ip);
                }
                Err(reason) => {
                    warn!(endpoint = %url, "IP check failed: {}", reason);
                }
            }
        }

        Err(IpDetectionError::AllEndpointsFailed {
            attempted: self.urls.len(),
        })
    }

    async fn query_endpoint(&self, url: &str) -> Result<Ipv4Addr, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("unexpected status {status}"));
        }

        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read body: {e}"))?;

        body.trim()
            .parse::<Ipv4Addr>()
            .map_err(|_| format!("body is not an IPv4 address: {:?}", body.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn detector(urls: Vec<String>) -> IpDetector {
        IpDetector::new(urls).unwrap()
    }

    #[tokio::test]
    async fn first_healthy_endpoint_wins() {
        let server = MockServer::start_async().await;
        let bad = server
            .mock_async(|when, then| {
                when.method(GET).path("/down");
                then.status(500);
            })
            .await;
        let good = server
            .mock_async(|when, then| {
                when.method(GET).path("/ip");
                then.status(200).body("  203.0.113.42\n");
            })
            .await;

        let detector = detector(vec![server.url("/down"), server.url("/ip")]);
        let ip = detector.discover().await.unwrap();
        assert_eq!(ip, "203.0.113.42".parse::<Ipv4Addr>().unwrap());
        bad.assert_async().await;
        good.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_body_is_try_next() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/html");
                then.status(200).body("<html>not an ip</html>");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/ip");
                then.status(200).body("198.51.100.7");
            })
            .await;

        let detector = detector(vec![server.url("/html"), server.url("/ip")]);
        let ip = detector.discover().await.unwrap();
        assert_eq!(ip, "198.51.100.7".parse::<Ipv4Addr>().unwrap());
    }

    #[tokio::test]
    async fn exhausted_pool_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/down");
                then.status(503);
            })
            .await;

        let detector = detector(vec![server.url("/down"), server.url("/down")]);
        let err = detector.discover().await.unwrap_err();
        assert!(matches!(
            err,
            IpDetectionError::AllEndpointsFailed { attempted: 2 }
        ));
    }

    #[tokio::test]
    async fn empty_pool_is_an_error() {
        let detector = detector(vec![]);
        assert!(matches!(
            detector.discover().await.unwrap_err(),
            IpDetectionError::NoEndpoints
        ));
    }
}
