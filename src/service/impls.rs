// Standard library
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::time::Duration;

// 3rd party crates
use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

// Project imports
use crate::providers::cloudflare::constants::CLOUDFLARE_API_BASE;
use crate::providers::cloudflare::functions::clamp_ttl;
use crate::providers::cloudflare::CloudflareClient;
use crate::settings::types::{ConfigManager, DnsRecordConfig, Settings};
use crate::utility::ip_detector::{IpDetectionError, IpDetector};
use crate::utility::mask_secret;
use crate::webhook::WebhookClient;

// Current module imports
use super::errors::ServiceError;
use super::types::{DdnsService, OutcomeKind, RecordOutcome, RecordState, TickReport};

/// Streak key for tick-level probe failures, distinct from any record.
const PROBE_STREAK_KEY: &str = "<ip-probe>";

impl DdnsService {
    pub fn new(config: ConfigManager) -> Result<Self, ServiceError> {
        Self::with_api_base(config, CLOUDFLARE_API_BASE)
    }

    pub(crate) fn with_api_base(
        config: ConfigManager,
        api_base: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        let api_base = api_base.into();
        let (client, detector, webhook) = Self::build_collaborators(&config.settings, &api_base)?;

        Ok(Self {
            config,
            client,
            detector,
            webhook,
            api_base,
            states: HashMap::new(),
            failure_streaks: HashMap::new(),
            last_ip: None,
        })
    }

    fn build_collaborators(
        settings: &Settings,
        api_base: &str,
    ) -> Result<(CloudflareClient, IpDetector, WebhookClient), ServiceError> {
        let client = CloudflareClient::with_api_base(&settings.cloudflare.api_token, api_base)?;
        let detector = IpDetector::new(settings.ip_check_urls())?;
        let webhook = WebhookClient::new(settings.webhook.clone())?;
        Ok((client, detector, webhook))
    }

    /// Runs the reconciliation loop until the shutdown signal fires.
    ///
    /// Token verification failures are fatal here; once the loop is
    /// running, credential problems surface as per-tick failures and
    /// are retried on the next tick.
    pub async fn start(
        &mut self,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServiceError> {
        let verification = self
            .client
            .verify_token()
            .await
            .map_err(ServiceError::TokenVerification)?;
        info!(
            token = %mask_secret(&self.config.settings.cloudflare.api_token, 8),
            token_id = %verification.id,
            holder = verification.email.as_deref().unwrap_or("-"),
            status = %verification.status,
            "Cloudflare API token verified"
        );

        info!(
            "🕰️ reconciling {} DNS records every {} seconds",
            self.config.settings.dns_records.len(),
            self.config.settings.effective_check_interval()
        );

        // First tick runs immediately.
        let report = self.run_tick(&mut shutdown).await;
        log_tick(&report);

        loop {
            let interval = self.config.settings.effective_check_interval();

            tokio::select! {
                _ = shutdown.recv() => {
                    info!("shutdown signal received");
                    break;
                }
                _ = tokio::time::sleep(Duration::from_secs(interval)) => {
                    self.maybe_reload().await;
                    let report = self.run_tick(&mut shutdown).await;
                    log_tick(&report);
                }
            }
        }

        info!("service stopped");
        Ok(())
    }

    /// On-demand probe cycle, independent of the loop.
    pub async fn current_ip(&self) -> Result<Ipv4Addr, IpDetectionError> {
        self.detector.discover().await
    }

    /// One reconciliation cycle: probe, then read/compare/update every
    /// configured record in order.
    pub(crate) async fn run_tick(&mut self, shutdown: &mut broadcast::Receiver<()>) -> TickReport {
        let timestamp = Utc::now();
        debug!("starting reconciliation tick");

        let ip = match self.detector.discover().await {
            Ok(ip) => ip,
            Err(e) => {
                warn!("public IP discovery failed: {}", e);
                if self.begin_failure_streak(PROBE_STREAK_KEY, "probe") {
                    self.notify_failure("public IP discovery", &e.to_string())
                        .await;
                }
                // Never touch records based on an unknown current state.
                return TickReport {
                    timestamp,
                    ip: None,
                    outcomes: Vec::new(),
                };
            }
        };
        self.end_failure_streak(PROBE_STREAK_KEY);

        if self.last_ip != Some(ip) {
            info!(ip = %ip, "public IP discovered");
            self.last_ip = Some(ip);
        }

        let records = self.config.settings.dns_records.clone();
        let mut outcomes = Vec::with_capacity(records.len());

        for record in &records {
            if shutdown_requested(shutdown) {
                info!("shutdown requested, stopping mid-tick");
                break;
            }

            let result = self.reconcile_record(record, ip).await;
            outcomes.push(RecordOutcome {
                record: record.key(),
                result,
            });
        }

        TickReport {
            timestamp,
            ip: Some(ip),
            outcomes,
        }
    }

    async fn reconcile_record(&mut self, record: &DnsRecordConfig, ip: Ipv4Addr) -> OutcomeKind {
        let key = record.key();

        let observed = match self
            .client
            .find_record(&record.name, record.record_type.as_str())
            .await
        {
            Ok(observed) => observed,
            Err(e) => {
                error!(record = %record.name, "failed to read DNS record: {}", e);
                self.transition(&key, RecordState::Unknown);
                if self.begin_failure_streak(&key, &e.class()) {
                    self.notify_failure(&record.name, &e.to_string()).await;
                }
                return OutcomeKind::FailedRead {
                    error: e.to_string(),
                };
            }
        };

        // Proxied records report TTL 1 regardless of the requested
        // value, so the TTL only participates when unproxied.
        let ttl_matches = record.proxied || observed.ttl == clamp_ttl(record.ttl);
        let in_sync = observed.content == ip.to_string()
            && observed.proxied == record.proxied
            && ttl_matches;

        if in_sync {
            debug!(
                record = %observed.name,
                record_type = %observed.record_type,
                ip = %ip,
                "record in sync"
            );
            self.transition(&key, RecordState::InSync);
            self.end_failure_streak(&key);
            return OutcomeKind::Unchanged;
        }

        info!(
            record = %record.name,
            observed = %observed.content,
            desired = %ip,
            "record drifted"
        );
        self.transition(&key, RecordState::Drifting);

        match self
            .client
            .update_record(&observed.zone_id, &observed.id, record, ip)
            .await
        {
            Ok(()) => {
                self.transition(&key, RecordState::InSync);
                self.end_failure_streak(&key);
                self.notify_success(&observed.content, &ip.to_string(), &record.name)
                    .await;
                OutcomeKind::Updated {
                    previous: observed.content,
                }
            }
            Err(e) => {
                error!(record = %record.name, "failed to update DNS record: {}", e);
                self.transition(&key, RecordState::Failing);
                if self.begin_failure_streak(&key, &e.class()) {
                    self.notify_failure(&record.name, &e.to_string()).await;
                }
                OutcomeKind::FailedWrite {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Reloads the configuration between ticks when the file changed.
    /// A failed reload keeps the prior configuration in use.
    pub(crate) async fn maybe_reload(&mut self) {
        match self.config.has_changed() {
            Ok(false) => return,
            Ok(true) => {}
            Err(e) => {
                warn!("could not stat configuration file: {}", e);
                return;
            }
        }

        info!(
            path = %self.config.config_path().display(),
            "configuration file changed, reloading"
        );

        if let Err(e) = self.config.reload() {
            warn!(
                "configuration reload failed, keeping previous configuration: {}",
                e
            );
            if let Err(notify_err) = self
                .webhook
                .send_info(&format!(
                    "Configuration reload failed, keeping previous configuration: {e}"
                ))
                .await
            {
                warn!("failed to deliver notification: {}", notify_err);
            }
            return;
        }

        match Self::build_collaborators(&self.config.settings, &self.api_base) {
            Ok((client, detector, webhook)) => {
                self.client = client;
                self.detector = detector;
                self.webhook = webhook;
            }
            Err(e) => warn!("could not rebuild clients after reload: {}", e),
        }
    }

    fn transition(&mut self, key: &str, next: RecordState) {
        let current = self
            .states
            .get(key)
            .copied()
            .unwrap_or(RecordState::Unknown);
        if current != next {
            debug!(record = %key, from = ?current, to = ?next, "record state changed");
        }
        self.states.insert(key.to_string(), next);
    }

    /// Returns true when this failure starts a new streak and should
    /// be notified; a repeat of the same class stays silent.
    fn begin_failure_streak(&mut self, key: &str, class: &str) -> bool {
        match self.failure_streaks.get(key) {
            Some(previous) if previous == class => false,
            _ => {
                self.failure_streaks
                    .insert(key.to_string(), class.to_string());
                true
            }
        }
    }

    fn end_failure_streak(&mut self, key: &str) {
        self.failure_streaks.remove(key);
    }

    async fn notify_success(&self, old_ip: &str, new_ip: &str, record: &str) {
        if let Err(e) = self.webhook.send_success(old_ip, new_ip, record).await {
            warn!("failed to deliver notification: {}", e);
        }
    }

    async fn notify_failure(&self, subject: &str, error: &str) {
        if let Err(e) = self.webhook.send_failure(subject, error).await {
            warn!("failed to deliver notification: {}", e);
        }
    }
}

fn log_tick(report: &TickReport) {
    debug!(
        at = %report.timestamp,
        ip = ?report.ip,
        records = report.outcomes.len(),
        "tick complete"
    );
    for outcome in &report.outcomes {
        debug!(record = %outcome.record, result = ?outcome.result, "record outcome");
    }
}

fn shutdown_requested(shutdown: &mut broadcast::Receiver<()>) -> bool {
    match shutdown.try_recv() {
        Ok(()) => true,
        Err(broadcast::error::TryRecvError::Closed) => true,
        Err(broadcast::error::TryRecvError::Lagged(_)) => true,
        Err(broadcast::error::TryRecvError::Empty) => false,
    }
}
