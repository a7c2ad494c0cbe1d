//! Typed facade over the Cloudflare v4 API.
//!
//! Concentrates the provider idioms in one place: the bearer header,
//! the `{success, errors, result}` response envelope, TTL clamping and
//! zone auto-discovery. Callers never see wire concerns.

pub mod constants;
pub mod errors;
pub mod functions;
pub mod impls;
pub mod types;

pub use errors::CloudflareError;
pub use types::{CloudflareClient, ObservedRecord, TokenVerification, Zone};
