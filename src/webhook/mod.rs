//! Outbound notifications.
//!
//! Delivers reconciliation events to a generic JSON webhook or a
//! Telegram bot endpoint. Delivery is fire-and-forget: failures are
//! reported to the caller for logging but never stop the service.

pub mod errors;
pub mod impls;
pub mod types;

pub use errors::WebhookError;
pub use types::WebhookClient;
