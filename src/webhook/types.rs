// 3rd party crates
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;

// Project imports
use crate::settings::types::WebhookSettings;

/// Sends formatted notification events, gated by event-class filters.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    pub(super) settings: WebhookSettings,
    pub(super) client: Client,
}

/// Event class of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

impl NotificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationLevel::Success => "success",
            NotificationLevel::Error => "error",
            NotificationLevel::Info => "info",
        }
    }
}

/// Payload for the generic JSON delivery mode.
#[derive(Debug, Serialize)]
pub(super) struct WebhookMessage<'a> {
    pub(super) title: &'a str,
    pub(super) message: String,
    pub(super) timestamp: DateTime<Utc>,
    pub(super) level: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) ip_address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) record_name: Option<&'a str>,
}

/// Payload for the Telegram delivery mode.
#[derive(Debug, Serialize)]
pub(super) struct TelegramMessage<'a> {
    pub(super) chat_id: &'a str,
    pub(super) text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) parse_mode: Option<&'static str>,
}
