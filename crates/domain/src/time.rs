//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `updatedAt`, `createdAt`, and history records.
///
/// The backend sends RFC 3339 strings; chrono's serde support parses them.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Milliseconds since the Unix epoch, used to build session-unique tokens.
#[must_use]
pub fn unix_millis(ts: Timestamp) -> i64 {
    ts.timestamp_millis()
}
