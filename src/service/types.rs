// Standard library
use std::collections::HashMap;
use std::net::Ipv4Addr;

// 3rd party crates
use chrono::{DateTime, Utc};

// Project imports
use crate::providers::cloudflare::CloudflareClient;
use crate::settings::types::ConfigManager;
use crate::utility::ip_detector::IpDetector;
use crate::webhook::WebhookClient;

/// Drives the periodic reconciliation loop.
pub struct DdnsService {
    pub(super) config: ConfigManager,
    pub(super) client: CloudflareClient,
    pub(super) detector: IpDetector,
    pub(super) webhook: WebhookClient,
    pub(super) api_base: String,
    /// Last observed lifecycle state per record key.
    pub(super) states: HashMap<String, RecordState>,
    /// Active failure streaks: record key (or the probe marker) to the
    /// error class last notified for it.
    pub(super) failure_streaks: HashMap<String, String>,
    pub(super) last_ip: Option<Ipv4Addr>,
}

/// Lifecycle of a single record as observed across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Unknown,
    InSync,
    Drifting,
    Failing,
}

/// Everything one reconciliation cycle produced.
#[derive(Debug)]
pub struct TickReport {
    pub timestamp: DateTime<Utc>,
    /// The probed public IP, or `None` when discovery failed and the
    /// tick was skipped.
    pub ip: Option<Ipv4Addr>,
    pub outcomes: Vec<RecordOutcome>,
}

#[derive(Debug)]
pub struct RecordOutcome {
    pub record: String,
    pub result: OutcomeKind,
}

#[derive(Debug, PartialEq, Eq)]
pub enum OutcomeKind {
    Unchanged,
    Updated { previous: String },
    FailedRead { error: String },
    FailedWrite { error: String },
}
