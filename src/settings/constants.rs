/// Default reconciliation interval in seconds.
pub const DEFAULT_CHECK_INTERVAL: u64 = 300;

/// Echo services queried when `global.ip_check_urls` is unset or empty.
pub const DEFAULT_IP_CHECK_URLS: [&str; 4] = [
    "https://api.ipify.org",
    "https://icanhazip.com",
    "https://ident.me",
    "https://4.ipw.cn",
];

/// TTL sentinel meaning "let the provider choose".
pub const TTL_AUTO: u32 = 1;
/// Smallest explicit TTL the provider accepts.
pub const TTL_MIN: u32 = 60;
/// Largest explicit TTL the provider accepts.
pub const TTL_MAX: u32 = 86400;

/// Environment variables recognized by the overlay step.
pub const ENV_API_TOKEN: &str = "CF_API_TOKEN";
pub const ENV_WEBHOOK_URL: &str = "WEBHOOK_URL";
pub const ENV_WEBHOOK_CHAT_ID: &str = "WEBHOOK_CHAT_ID";

/// Overrides the configuration file search path.
pub const ENV_CONFIG_PATH: &str = "CFDDNS_CONFIG_PATH";

/// Example configuration, logged when no configuration file is found.
pub const DEFAULT_CONFIG: &str = r#"
global:
  # Reconciliation interval in seconds
  check_interval: 300
  # Optional: override the public IP echo services
  # ip_check_urls:
  #   - https://api.ipify.org
  #   - https://icanhazip.com

cloudflare:
  # Prefer CF_API_TOKEN in the environment or a .env file
  api_token: "your_api_token"

dns_records:
  - name: home.example.com
    type: A
    proxied: false
    ttl: 300

webhook:
  enabled: false
  # "generic" or "telegram"
  type: generic
  url: ""
  chat_id: ""
  # "text", "markdown" or "html"
  template: text
  on_success: true
  on_failure: true
"#;
