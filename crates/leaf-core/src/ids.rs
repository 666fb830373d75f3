//! ID prefixes and generation.
//!
//! IDs are generated locally without any central coordination: a prefix, the
//! creation time in base-36 milliseconds, and 8 random hex characters, e.g.
//! `"rs-m1x2k3l4-a3f8b2c1"`. The timestamp keeps IDs roughly sortable and the
//! random suffix keeps two IDs minted in the same millisecond apart.

use chrono::{DateTime, Utc};

use crate::errors::CoreError;

/// Prefix for reading session IDs.
pub const PREFIX_SESSION: &str = "rs";

/// All known ID prefixes.
pub const ALL_PREFIXES: &[&str] = &[PREFIX_SESSION];

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a prefixed ID for an entity created at `now`.
///
/// # Errors
///
/// Returns `CoreError::Other` if the OS random source is unavailable.
pub fn generate_id(prefix: &str, now: DateTime<Utc>) -> Result<String, CoreError> {
    let mut bytes = [0u8; 4];
    getrandom::fill(&mut bytes)
        .map_err(|e| CoreError::Other(anyhow::anyhow!("random source unavailable: {e}")))?;

    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    Ok(format!("{prefix}-{}-{hex}", to_base36(millis)))
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
