//! Public IP discovery.
//!
//! Walks a configurable pool of echo endpoints in order and returns
//! the first well-formed IPv4 address. A single outage of any one
//! service is invisible to callers; only exhausting the whole pool is
//! an error.

pub mod constants;
pub mod errors;
pub mod impls;
pub mod types;

pub use errors::IpDetectionError;
pub use types::IpDetector;
