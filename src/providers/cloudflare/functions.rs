// Project imports
use crate::settings::constants::{TTL_AUTO, TTL_MAX, TTL_MIN};

// Current module imports
use super::types::Zone;

/// Clamps a TTL into the range the provider accepts. The sentinel `1`
/// ("automatic") passes through untouched.
pub(crate) fn clamp_ttl(ttl: u32) -> u32 {
    if ttl == TTL_AUTO {
        return TTL_AUTO;
    }
    ttl.clamp(TTL_MIN, TTL_MAX)
}

/// Picks the zone owning `record_name`: among zones whose apex equals
/// the record name or is a dot-bounded suffix of it, the longest apex
/// wins, so `host.sub.example.com` resolves to `sub.example.com` even
/// when `example.com` is also visible.
pub(crate) fn select_zone<'a>(zones: &'a [Zone], record_name: &str) -> Option<&'a Zone> {
    let name = record_name.to_lowercase();

    zones
        .iter()
        .filter(|z| {
            let apex = z.name.to_lowercase();
            name == apex || name.ends_with(&format!(".{apex}"))
        })
        .max_by_key(|z| z.name.len())
}
