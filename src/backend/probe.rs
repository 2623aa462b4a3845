use crate::storage::StorageArea;

/// Sentinel key written by the capability probe.
pub const PROBE_KEY: &str = "testKey";
/// Sentinel value written by the capability probe.
pub const PROBE_VALUE: &str = "test";

/// Checks whether `area` accepts writes by storing and removing a sentinel
/// entry. Any failure means the area cannot be used.
pub fn probe(area: &dyn StorageArea) -> bool {
    let result = area
        .set_item(PROBE_KEY, PROBE_VALUE)
        .and_then(|_| area.remove_item(PROBE_KEY));

    if let Err(e) = &result {
        log::debug!("storage probe failed: {e}");
    }
    result.is_ok()
}
