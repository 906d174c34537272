//! Snowflake ID shape checks.
//!
//! Discord ids are 64-bit integers rendered as 17–20 digit decimal strings.
//! Role, user, and guild id fields are all checked against the same shape
//! before anything else looks at them.

use std::sync::LazyLock;

use crate::error::{GateError, GateResult};

static SNOWFLAKE_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^\d{17,20}$").unwrap());

/// Milliseconds between the Unix epoch and the first second of 2015.
pub const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Whether `raw` looks like a snowflake id.
pub fn is_snowflake(raw: &str) -> bool {
    SNOWFLAKE_REGEX.is_match(raw)
}

/// Parse a snowflake id, rejecting anything that is not snowflake-shaped.
pub fn parse_snowflake(raw: &str) -> GateResult<u64> {
    if !is_snowflake(raw) {
        return Err(GateError::invalid_argument(format!(
            "{raw:?} is not a valid snowflake id"
        )));
    }
    // 20 digits can still overflow u64
    raw.parse::<u64>()
        .map_err(|_| GateError::invalid_argument(format!("snowflake {raw} exceeds 64 bits")))
}

/// Unix timestamp in milliseconds encoded in the top 42 bits of a snowflake.
pub fn timestamp_ms(id: u64) -> u64 {
    (id >> 22) + DISCORD_EPOCH_MS
}
