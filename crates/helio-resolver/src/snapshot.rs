//! Final-snapshot tier.
//!
//! Once a proposal version is locked, the caller passes the frozen resolution
//! back as `finalSnapshot`. Values found there win over live computation so a
//! re-render reproduces the locked document even if pricing changed since.

use serde_json::Value;

use crate::format::json_display;

/// Prefixes tried after the direct path, in order.
const SNAPSHOT_SECTIONS: [&str; 2] = ["outputs", "inputs"];

/// Follow a dotted path through nested objects.
///
/// At every level a literal key equal to the remaining path is tried before
/// descending, so both `{"cliente.nome": ..}` and `{"cliente": {"nome": ..}}`
/// resolve `cliente.nome`.
pub fn deep_get<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let obj = value.as_object()?;
    if let Some(v) = obj.get(path) {
        return Some(v);
    }
    let (head, rest) = path.split_once('.')?;
    deep_get(obj.get(head)?, rest)
}

/// Display value for `dotted` from the snapshot: direct, then `outputs.*`,
/// then `inputs.*`. Empty strings and null fall through.
pub fn snapshot_value(snapshot: &Value, dotted: &str) -> Option<String> {
    deep_get(snapshot, dotted)
        .and_then(json_display)
        .or_else(|| {
            SNAPSHOT_SECTIONS.iter().find_map(|section| {
                snapshot
                    .get(section)
                    .and_then(|s| deep_get(s, dotted))
                    .and_then(json_display)
            })
        })
}
