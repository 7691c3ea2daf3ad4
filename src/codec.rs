//! Snapshot serialization
//!
//! Encodes snapshots as pretty-printed UTF-8 JSON with the short wire field
//! names and decodes them leniently: unknown fields are ignored, absent
//! numeric fields fall back to their zero values, and the long-form field
//! names older files may carry are accepted as aliases.

use crate::error::{VaultError, VaultResult};
use crate::models::Snapshot;

/// Serialize a snapshot to bytes
pub fn encode(snapshot: &Snapshot) -> VaultResult<Vec<u8>> {
    serde_json::to_vec_pretty(snapshot).map_err(|e| VaultError::Json(e.to_string()))
}

/// Deserialize a snapshot from bytes.
///
/// Any JSON-level or shape-level failure is a [`VaultError::Parse`]; a
/// snapshot that fails here is unusable and the caller must not retry.
pub fn decode(bytes: &[u8]) -> VaultResult<Snapshot> {
    let snapshot: Snapshot =
        serde_json::from_slice(bytes).map_err(|e| VaultError::Parse(e.to_string()))?;

    warn_on_alias_mismatch(bytes, &snapshot);

    Ok(snapshot)
}

/// Detect the schema-drift smell where the raw bytes visibly mention a
/// category but the decode produced no records for it.
///
/// That combination usually means the file was written with field names
/// this decoder no longer maps. It is still a valid snapshot, so it only
/// warrants a warning.
fn warn_on_alias_mismatch(bytes: &[u8], snapshot: &Snapshot) {
    let text = String::from_utf8_lossy(bytes);

    let checks: [(&str, &[&str], bool); 3] = [
        (
            "messages",
            &["\"messages\"", "\"sms\""],
            snapshot.messages.is_none(),
        ),
        (
            "call_logs",
            &["\"call_logs\"", "\"callLogs\""],
            snapshot.call_logs.is_none(),
        ),
        ("contacts", &["\"contacts\""], snapshot.contacts.is_none()),
    ];

    for (category, keywords, missing) in checks {
        if missing && keywords.iter().any(|keyword| text.contains(keyword)) {
            // "messages": null is the legitimate not-captured marker, not
            // drift; a keyword that decoded to nothing at all is.
            let null_markers = [
                format!("\"{}\": null", category),
                format!("\"{}\":null", category),
            ];
            if !null_markers.iter().any(|marker| text.contains(marker)) {
                tracing::warn!(
                    "snapshot bytes mention {} but none decoded; possible field-name mismatch",
                    category
                );
            }
        }
    }
}
