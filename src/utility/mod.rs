pub mod ip_detector;

/// Truncates a secret for log output, keeping a short prefix.
pub(crate) fn mask_secret(secret: &str, show: usize) -> String {
    if secret.len() <= show {
        return "***".to_string();
    }
    format!("{}...", &secret[..show])
}
