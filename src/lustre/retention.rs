//! Retention attribute normalization.
//!
//! Retention tooling tags files with an expiration date stored as a decimal
//! string in the `user.ccc_expires_at` extended attribute. The directory walker
//! collects it as raw bytes like any other user xattr; [`normalize`] turns it
//! into a `Uint64` so that it can be compared in queries.
//!
//! This is a best-effort enrichment: a value that does not parse is left as
//! is and never fails the extraction.

use tracing::warn;

use crate::{Value, ValuePair};

/// Extended attribute holding a retention expiration date.
pub const RETENTION_KEY: &str = "user.ccc_expires_at";

/// Raw values this long or longer cannot be a `u64` in decimal.
pub const RETENTION_MAX_LEN: usize = 22;

/// Rewrite the first parsable retention pair of `pairs` as a `Uint64`.
///
/// Scanning stops at the first retention pair short enough to be parsed,
/// whether parsing succeeds or not. Returns `true` if a pair was rewritten.
pub fn normalize(pairs: &mut [ValuePair<'_>]) -> bool {
    for pair in pairs.iter_mut() {
        if pair.key != RETENTION_KEY {
            continue;
        }
        let Some(raw) = pair.value.as_binary() else {
            continue;
        };
        if raw.len() >= RETENTION_MAX_LEN {
            continue;
        }

        return match parse_expiration(raw) {
            Some(expires_at) => {
                *pair = ValuePair::new(pair.key, Value::Uint64(expires_at));
                true
            }
            None => {
                warn!(
                    value = %String::from_utf8_lossy(raw),
                    "ignoring unparsable {RETENTION_KEY}"
                );
                false
            }
        };
    }

    false
}

/// Parse a decimal expiration date.
///
/// The value is read up to its first NUL byte, as tools commonly store the
/// terminator. Only ASCII digits are accepted: empty input, signs, spaces or
/// trailing garbage are rejected, as is anything above `u64::MAX`.
fn parse_expiration(raw: &[u8]) -> Option<u64> {
    let digits = raw.split(|&byte| byte == 0).next().unwrap_or_default();
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}
