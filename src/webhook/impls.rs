// Standard library
use std::time::Duration;

// 3rd party crates
use chrono::{Local, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

// Project imports
use crate::settings::types::{WebhookKind, WebhookSettings, WebhookTemplate};

// Current module imports
use super::errors::WebhookError;
use super::types::{NotificationLevel, TelegramMessage, WebhookClient, WebhookMessage};

/// Timeout for webhook deliveries, in seconds.
const DELIVERY_TIMEOUT_SECS: u64 = 10;

impl WebhookClient {
    pub fn new(settings: WebhookSettings) -> Result<Self, WebhookError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DELIVERY_TIMEOUT_SECS))
            .build()
            .map_err(WebhookError::HttpClientBuild)?;

        Ok(Self { settings, client })
    }

    /// A record was rewritten from `old_ip` to `new_ip`.
    pub async fn send_success(
        &self,
        old_ip: &str,
        new_ip: &str,
        record_name: &str,
    ) -> Result<(), WebhookError> {
        if !self.settings.enabled || !self.settings.on_success {
            return Ok(());
        }

        let title = "✅ DDNS update succeeded";
        let message = format!("DNS record {record_name} changed");
        let details = format!("{old_ip} → {new_ip}\nTime: {}", local_time());

        self.dispatch(
            title,
            &message,
            &details,
            NotificationLevel::Success,
            Some(new_ip),
            Some(record_name),
        )
        .await
    }

    /// A record could not be read or updated.
    pub async fn send_failure(
        &self,
        record_name: &str,
        error_message: &str,
    ) -> Result<(), WebhookError> {
        if !self.settings.enabled || !self.settings.on_failure {
            return Ok(());
        }

        let title = "❌ DDNS update failed";
        let message = format!("Error while updating DNS record {record_name}");
        let details = format!(
            "Record: {record_name}\nError: {error_message}\nTime: {}",
            local_time()
        );

        self.dispatch(
            title,
            &message,
            &details,
            NotificationLevel::Error,
            None,
            Some(record_name),
        )
        .await
    }

    /// Free-form informational event.
    pub async fn send_info(&self, message: &str) -> Result<(), WebhookError> {
        if !self.settings.enabled {
            return Ok(());
        }

        let title = "ℹ️ DDNS info";
        let details = format!("Time: {}", local_time());

        self.dispatch(title, message, &details, NotificationLevel::Info, None, None)
            .await
    }

    /// Fixed payload for validating the webhook configuration.
    pub async fn send_test(&self) -> Result<(), WebhookError> {
        if !self.settings.enabled {
            return Ok(());
        }

        let title = "🧪 DDNS test notification";
        let message = "This is a test message verifying the webhook configuration";
        let kind = match self.settings.kind {
            WebhookKind::Generic => "generic",
            WebhookKind::Telegram => "telegram",
        };
        let details = format!("Service: Cloudflare DDNS\nType: {kind}\nTime: {}", local_time());

        self.dispatch(title, message, &details, NotificationLevel::Info, None, None)
            .await
    }

    async fn dispatch(
        &self,
        title: &str,
        message: &str,
        details: &str,
        level: NotificationLevel,
        ip_address: Option<&str>,
        record_name: Option<&str>,
    ) -> Result<(), WebhookError> {
        match self.settings.kind {
            WebhookKind::Telegram => {
                let (text, parse_mode) =
                    render_telegram(self.settings.template, title, message, details);
                let payload = TelegramMessage {
                    chat_id: &self.settings.chat_id,
                    text,
                    parse_mode,
                };
                self.post_json(&payload).await
            }
            WebhookKind::Generic => {
                let payload = WebhookMessage {
                    title,
                    message: format!("{message}\n{details}"),
                    timestamp: Utc::now(),
                    level: level.as_str(),
                    ip_address,
                    record_name,
                };
                self.post_json(&payload).await
            }
        }
    }

    async fn post_json<T: Serialize>(&self, payload: &T) -> Result<(), WebhookError> {
        let response = self
            .client
            .post(&self.settings.url)
            .json(payload)
            .send()
            .await
            .map_err(WebhookError::Transport)?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(WebhookError::Delivery {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "notification delivered");
        Ok(())
    }
}

fn local_time() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Renders the Telegram `text` and `parse_mode` for a template.
pub(crate) fn render_telegram(
    template: WebhookTemplate,
    title: &str,
    message: &str,
    details: &str,
) -> (String, Option<&'static str>) {
    match template {
        WebhookTemplate::Html => (
            format!(
                "<b>{}</b>\n{}\n\n<pre>{}</pre>",
                escape_html(title),
                escape_html(message),
                escape_html(details)
            ),
            Some("HTML"),
        ),
        WebhookTemplate::Markdown => (
            format!(
                "*{}*\n{}\n\n```\n{}\n```",
                escape_markdown(title),
                escape_markdown(message),
                escape_markdown(details)
            ),
            Some("MarkdownV2"),
        ),
        WebhookTemplate::Text => (format!("{title}\n{message}\n\n{details}"), None),
    }
}

/// Backslash-escapes every character MarkdownV2 treats as syntax.
pub(crate) fn escape_markdown(text: &str) -> String {
    const RESERVED: [char; 18] = [
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    ];
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Replaces the HTML-significant characters with entities.
pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn settings(url: String) -> WebhookSettings {
        WebhookSettings {
            enabled: true,
            kind: WebhookKind::Generic,
            url,
            chat_id: String::new(),
            template: WebhookTemplate::Text,
            on_success: true,
            on_failure: true,
        }
    }

    #[test]
    fn markdown_escaping_covers_reserved_characters() {
        assert_eq!(escape_markdown("a.b.example.com"), "a\\.b\\.example\\.com");
        assert_eq!(escape_markdown("203.0.113.42"), "203\\.0\\.113\\.42");
        assert_eq!(escape_markdown("a_b*c[d](e)!"), "a\\_b\\*c\\[d\\]\\(e\\)\\!");
        assert_eq!(escape_markdown("x=y|z#w"), "x\\=y\\|z\\#w");
    }

    #[test]
    fn html_escaping_covers_entities() {
        assert_eq!(escape_html("a<b>&c"), "a&lt;b&gt;&amp;c");
    }

    #[test]
    fn telegram_markdown_template_escapes_interpolated_fields() {
        let (text, parse_mode) = render_telegram(
            WebhookTemplate::Markdown,
            "✅ DDNS update succeeded",
            "DNS record a.b.example.com changed",
            "198.51.100.7 → 203.0.113.42",
        );
        assert_eq!(parse_mode, Some("MarkdownV2"));
        assert!(text.contains("a\\.b\\.example\\.com"));
        assert!(text.contains("203\\.0\\.113\\.42"));
        assert!(text.starts_with("*"));
        assert!(text.contains("```"));
    }

    #[test]
    fn telegram_html_template_wraps_and_escapes() {
        let (text, parse_mode) = render_telegram(
            WebhookTemplate::Html,
            "title <1>",
            "message & more",
            "details",
        );
        assert_eq!(parse_mode, Some("HTML"));
        assert!(text.starts_with("<b>title &lt;1&gt;</b>"));
        assert!(text.contains("message &amp; more"));
        assert!(text.contains("<pre>details</pre>"));
    }

    #[test]
    fn telegram_text_template_has_no_parse_mode() {
        let (text, parse_mode) =
            render_telegram(WebhookTemplate::Text, "title", "message", "details");
        assert_eq!(parse_mode, None);
        assert_eq!(text, "title\nmessage\n\ndetails");
    }

    #[test]
    fn generic_payload_shape() {
        let payload = WebhookMessage {
            title: "t",
            message: "m".to_string(),
            timestamp: Utc::now(),
            level: "success",
            ip_address: Some("203.0.113.42"),
            record_name: Some("home.example.com"),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["level"], "success");
        assert_eq!(value["ip_address"], "203.0.113.42");
        assert_eq!(value["record_name"], "home.example.com");
        assert!(value["timestamp"].is_string());

        let without_optional = WebhookMessage {
            title: "t",
            message: "m".to_string(),
            timestamp: Utc::now(),
            level: "info",
            ip_address: None,
            record_name: None,
        };
        let value = serde_json::to_value(&without_optional).unwrap();
        assert!(value.get("ip_address").is_none());
        assert!(value.get("record_name").is_none());
    }

    #[tokio::test]
    async fn success_event_is_delivered_when_enabled() {
        let server = MockServer::start_async().await;
        let hook = server
            .mock_async(|when, then| {
                when.method(POST).path("/hook");
                then.status(200);
            })
            .await;

        let client = WebhookClient::new(settings(server.url("/hook"))).unwrap();
        client
            .send_success("198.51.100.7", "203.0.113.42", "home.example.com")
            .await
            .unwrap();
        hook.assert_async().await;
    }

    #[tokio::test]
    async fn success_suppressed_when_on_success_false() {
        let server = MockServer::start_async().await;
        let hook = server
            .mock_async(|when, then| {
                when.method(POST).path("/hook");
                then.status(200);
            })
            .await;

        let mut cfg = settings(server.url("/hook"));
        cfg.on_success = false;
        let client = WebhookClient::new(cfg).unwrap();
        client
            .send_success("198.51.100.7", "203.0.113.42", "home.example.com")
            .await
            .unwrap();
        client
            .send_failure("home.example.com", "boom")
            .await
            .unwrap();
        assert_eq!(hook.hits_async().await, 1);
    }

    #[tokio::test]
    async fn everything_suppressed_when_disabled() {
        let server = MockServer::start_async().await;
        let hook = server
            .mock_async(|when, then| {
                when.method(POST).path("/hook");
                then.status(200);
            })
            .await;

        let mut cfg = settings(server.url("/hook"));
        cfg.enabled = false;
        let client = WebhookClient::new(cfg).unwrap();
        client.send_success("a", "b", "r").await.unwrap();
        client.send_failure("r", "e").await.unwrap();
        client.send_info("i").await.unwrap();
        client.send_test().await.unwrap();
        assert_eq!(hook.hits_async().await, 0);
    }

    #[tokio::test]
    async fn telegram_success_transmits_escaped_markdown() {
        let server = MockServer::start_async().await;
        let hook = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/bot/sendMessage")
                    .json_body_partial(r#"{ "chat_id": "42", "parse_mode": "MarkdownV2" }"#)
                    .body_contains("a\\\\.b\\\\.example\\\\.com")
                    .body_contains("203\\\\.0\\\\.113\\\\.42");
                then.status(200);
            })
            .await;

        let cfg = WebhookSettings {
            enabled: true,
            kind: WebhookKind::Telegram,
            url: server.url("/bot/sendMessage"),
            chat_id: "42".to_string(),
            template: WebhookTemplate::Markdown,
            on_success: true,
            on_failure: true,
        };
        let client = WebhookClient::new(cfg).unwrap();
        client
            .send_success("198.51.100.7", "203.0.113.42", "a.b.example.com")
            .await
            .unwrap();
        hook.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_surfaces_response_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/hook");
                then.status(400).body("bad chat id");
            })
            .await;

        let client = WebhookClient::new(settings(server.url("/hook"))).unwrap();
        let err = client.send_info("hello").await.unwrap_err();
        match err {
            WebhookError::Delivery { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad chat id");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
