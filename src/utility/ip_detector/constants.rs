/// Per-request timeout for echo endpoints, in seconds.
pub const PROBE_TIMEOUT_SECS: u64 = 10;
