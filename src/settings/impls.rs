// Standard library
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

// 3rd party crates
use config::{Config, File, FileFormat};
use tracing::{debug, info, warn};

// Current module imports
use super::constants::{
    DEFAULT_CONFIG, DEFAULT_IP_CHECK_URLS, ENV_API_TOKEN, ENV_CONFIG_PATH, ENV_WEBHOOK_CHAT_ID,
    ENV_WEBHOOK_URL, TTL_AUTO, TTL_MAX, TTL_MIN,
};
use super::errors::{SettingsError, ValidationError};
use super::types::{ConfigManager, DnsRecordConfig, RecordType, Settings, WebhookKind};

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DnsRecordConfig {
    /// Stable identity for state tracking; names compare lowercased.
    pub fn key(&self) -> String {
        format!("{}/{}", self.name.to_lowercase(), self.record_type)
    }
}

impl Settings {
    /// Check interval with the minimum of one second enforced.
    pub fn effective_check_interval(&self) -> u64 {
        if self.global.check_interval < 1 {
            warn!("check_interval below minimum, using 1 second");
            return 1;
        }
        self.global.check_interval
    }

    /// Configured echo endpoints, falling back to the built-in list.
    pub fn ip_check_urls(&self) -> Vec<String> {
        if self.global.ip_check_urls.is_empty() {
            DEFAULT_IP_CHECK_URLS
                .iter()
                .map(|url| url.to_string())
                .collect()
        } else {
            self.global.ip_check_urls.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.log.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            other => return Err(ValidationError::InvalidLogLevel(other.to_string())),
        }

        if self.cloudflare.api_token.trim().is_empty() {
            return Err(ValidationError::MissingApiToken);
        }

        if self.dns_records.is_empty() {
            return Err(ValidationError::NoRecords);
        }

        let mut seen: HashSet<String> = HashSet::new();
        for record in &self.dns_records {
            if !seen.insert(record.key()) {
                return Err(ValidationError::DuplicateRecord(record.key()));
            }
            if record.ttl != TTL_AUTO && !(TTL_MIN..=TTL_MAX).contains(&record.ttl) {
                return Err(ValidationError::InvalidTtl {
                    name: record.name.clone(),
                    ttl: record.ttl,
                });
            }
        }

        if self.webhook.enabled {
            if self.webhook.url.trim().is_empty() {
                return Err(ValidationError::WebhookUrlMissing);
            }
            if self.webhook.kind == WebhookKind::Telegram && self.webhook.chat_id.trim().is_empty()
            {
                return Err(ValidationError::TelegramChatIdMissing);
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn from_yaml_str(yaml: &str) -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()
    }
}

/// Applies the environment overlay on top of the parsed document.
///
/// `lookup` yields the value for a variable name, or `None` when unset;
/// empty values are ignored by the caller-supplied closure contract in
/// production (`env::var(..).filter(..)`), keeping this a pure step.
pub(crate) fn apply_env_overlay(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(token) = lookup(ENV_API_TOKEN) {
        debug!("using Cloudflare API token from environment");
        settings.cloudflare.api_token = token;
    }

    if let Some(url) = lookup(ENV_WEBHOOK_URL) {
        debug!("using webhook URL from environment");
        settings.webhook.url = url;
        // A URL provided via the environment turns delivery on.
        settings.webhook.enabled = true;
    }

    if let Some(chat_id) = lookup(ENV_WEBHOOK_CHAT_ID) {
        settings.webhook.chat_id = chat_id;
    }
}

impl ConfigManager {
    /// Loads the configuration from the default search path.
    pub fn load() -> Result<Self, SettingsError> {
        let config_path = Self::resolve_config_path()?;
        Self::load_from(config_path)
    }

    /// Loads the configuration from an explicit path.
    pub fn load_from(config_path: PathBuf) -> Result<Self, SettingsError> {
        let settings = Self::load_settings(&config_path)?;
        let last_modified = fs::metadata(&config_path)?.modified()?;

        Ok(ConfigManager {
            settings,
            config_path,
            last_modified,
        })
    }

    /// Determines the configuration file path.
    fn resolve_config_path() -> Result<PathBuf, SettingsError> {
        if let Ok(path) = env::var(ENV_CONFIG_PATH) {
            return Ok(PathBuf::from(path));
        }

        let mut candidates = vec![PathBuf::from("config.yaml")];
        candidates.push(PathBuf::from("/etc/cfddns/config.yaml"));
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("cfddns").join("config.yaml"));
        }

        for candidate in &candidates {
            if candidate.exists() {
                return Ok(candidate.clone());
            }
        }

        info!("example configuration:\n{}", DEFAULT_CONFIG);
        Err(SettingsError::NotFound {
            searched: candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    /// Runs the full load pipeline: YAML parse, `.env` load, environment
    /// overlay, validation.
    fn load_settings(config_path: &Path) -> Result<Settings, SettingsError> {
        let config_file = config_path.to_str().ok_or_else(|| {
            config::ConfigError::Message("configuration path is not valid UTF-8".into())
        })?;

        let parsed: Config = Config::builder()
            .add_source(File::new(config_file, FileFormat::Yaml))
            .build()?;
        let mut settings: Settings = parsed.try_deserialize()?;

        // .env from the working directory takes precedence, like the
        // variables it sets do below.
        dotenvy::dotenv_override().ok();
        apply_env_overlay(&mut settings, |key| {
            env::var(key).ok().filter(|value| !value.is_empty())
        });

        settings.validate()?;

        for record in &settings.dns_records {
            if record.record_type == RecordType::Aaaa {
                warn!(
                    record = %record.name,
                    "AAAA record configured but only IPv4 discovery is implemented"
                );
            }
        }

        Ok(settings)
    }

    /// True when the file on disk is newer than the loaded document.
    pub fn has_changed(&self) -> Result<bool, SettingsError> {
        let modified = fs::metadata(&self.config_path)?.modified()?;
        Ok(modified > self.last_modified)
    }

    /// Re-runs the load pipeline; on failure the prior configuration
    /// stays in place.
    pub fn reload(&mut self) -> Result<(), SettingsError> {
        let settings = Self::load_settings(&self.config_path)?;
        self.last_modified = fs::metadata(&self.config_path)?.modified()?;
        self.settings = settings;
        info!(path = %self.config_path.display(), "configuration reloaded");
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    #[cfg(test)]
    pub(crate) fn from_settings(settings: Settings) -> Self {
        ConfigManager {
            settings,
            config_path: PathBuf::from("config.yaml"),
            last_modified: std::time::SystemTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::types::{WebhookKind, WebhookTemplate};

    const MINIMAL_YAML: &str = r#"
cloudflare:
  api_token: "test-token"
dns_records:
  - name: home.example.com
    type: A
    proxied: false
    ttl: 300
"#;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let settings = Settings::from_yaml_str(MINIMAL_YAML).unwrap();
        assert_eq!(settings.global.check_interval, 300);
        assert_eq!(settings.log.level, "info");
        assert_eq!(
            settings.ip_check_urls(),
            vec![
                "https://api.ipify.org",
                "https://icanhazip.com",
                "https://ident.me",
                "https://4.ipw.cn",
            ]
        );
        assert!(!settings.webhook.enabled);
        assert_eq!(settings.webhook.template, WebhookTemplate::Text);
        settings.validate().unwrap();
    }

    #[test]
    fn full_config_parses() {
        let yaml = r#"
log:
  level: debug
global:
  check_interval: 60
  ip_check_urls:
    - https://probe.example.com/ip
cloudflare:
  api_token: "t"
dns_records:
  - name: a.example.com
    type: A
    proxied: true
    ttl: 1
  - name: b.example.com
    type: AAAA
    proxied: false
    ttl: 86400
webhook:
  enabled: true
  type: telegram
  url: https://api.telegram.org/botX/sendMessage
  chat_id: "42"
  template: markdown
  on_success: true
  on_failure: true
"#;
        let settings = Settings::from_yaml_str(yaml).unwrap();
        assert_eq!(settings.global.check_interval, 60);
        assert_eq!(settings.dns_records.len(), 2);
        assert_eq!(settings.dns_records[1].record_type, RecordType::Aaaa);
        assert_eq!(settings.webhook.kind, WebhookKind::Telegram);
        assert_eq!(settings.webhook.template, WebhookTemplate::Markdown);
        settings.validate().unwrap();
    }

    fn base_settings() -> Settings {
        Settings::from_yaml_str(MINIMAL_YAML).unwrap()
    }

    #[test]
    fn ttl_validation_boundaries() {
        for (ttl, ok) in [
            (0u32, false),
            (1, true),
            (59, false),
            (60, true),
            (86400, true),
            (86401, false),
        ] {
            let mut settings = base_settings();
            settings.dns_records[0].ttl = ttl;
            let result = settings.validate();
            assert_eq!(result.is_ok(), ok, "ttl {ttl}");
            if !ok {
                assert!(matches!(
                    result.unwrap_err(),
                    ValidationError::InvalidTtl { ttl: t, .. } if t == ttl
                ));
            }
        }
    }

    #[test]
    fn missing_token_rejected() {
        let mut settings = base_settings();
        settings.cloudflare.api_token = "  ".to_string();
        assert_eq!(
            settings.validate().unwrap_err(),
            ValidationError::MissingApiToken
        );
    }

    #[test]
    fn duplicate_record_rejected() {
        let mut settings = base_settings();
        let mut dup = settings.dns_records[0].clone();
        dup.name = "HOME.example.com".to_string();
        settings.dns_records.push(dup);
        assert!(matches!(
            settings.validate().unwrap_err(),
            ValidationError::DuplicateRecord(_)
        ));
    }

    #[test]
    fn webhook_validation() {
        let mut settings = base_settings();
        settings.webhook.enabled = true;
        assert_eq!(
            settings.validate().unwrap_err(),
            ValidationError::WebhookUrlMissing
        );

        settings.webhook.url = "https://hook.example.com".to_string();
        settings.validate().unwrap();

        settings.webhook.kind = WebhookKind::Telegram;
        assert_eq!(
            settings.validate().unwrap_err(),
            ValidationError::TelegramChatIdMissing
        );
    }

    #[test]
    fn env_overlay_overrides_and_enables_webhook() {
        let mut settings = base_settings();
        settings.webhook.url = "https://old.example.com".to_string();
        apply_env_overlay(&mut settings, |key| match key {
            "CF_API_TOKEN" => Some("env-token".to_string()),
            "WEBHOOK_URL" => Some("https://new.example.com".to_string()),
            "WEBHOOK_CHAT_ID" => Some("99".to_string()),
            _ => None,
        });
        assert_eq!(settings.cloudflare.api_token, "env-token");
        assert_eq!(settings.webhook.url, "https://new.example.com");
        assert_eq!(settings.webhook.chat_id, "99");
        assert!(settings.webhook.enabled);
    }

    #[test]
    fn env_overlay_ignores_unset_variables() {
        let mut settings = base_settings();
        apply_env_overlay(&mut settings, |_| None);
        assert_eq!(settings.cloudflare.api_token, "test-token");
        assert!(!settings.webhook.enabled);
    }

    #[test]
    fn check_interval_minimum_is_enforced() {
        let mut settings = base_settings();
        settings.global.check_interval = 0;
        assert_eq!(settings.effective_check_interval(), 1);
        settings.global.check_interval = 300;
        assert_eq!(settings.effective_check_interval(), 300);
    }

    #[test]
    fn record_key_is_lowercased() {
        let mut settings = base_settings();
        settings.dns_records[0].name = "Home.Example.COM".to_string();
        assert_eq!(settings.dns_records[0].key(), "home.example.com/A");
    }

    #[test]
    fn manager_load_reload_and_change_detection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, MINIMAL_YAML).unwrap();

        let mut manager = ConfigManager::load_from(path.clone()).unwrap();
        assert_eq!(manager.settings.global.check_interval, 300);
        assert!(!manager.has_changed().unwrap());

        // Force staleness instead of racing the filesystem clock.
        manager.last_modified = std::time::SystemTime::UNIX_EPOCH;
        assert!(manager.has_changed().unwrap());

        std::fs::write(
            &path,
            MINIMAL_YAML.replace("ttl: 300", "ttl: 600"),
        )
        .unwrap();
        manager.reload().unwrap();
        assert_eq!(manager.settings.dns_records[0].ttl, 600);
    }

    #[test]
    fn failed_reload_keeps_previous_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, MINIMAL_YAML).unwrap();

        let mut manager = ConfigManager::load_from(path.clone()).unwrap();
        std::fs::write(&path, MINIMAL_YAML.replace("ttl: 300", "ttl: 7")).unwrap();
        assert!(manager.reload().is_err());
        assert_eq!(manager.settings.dns_records[0].ttl, 300);
    }
}
