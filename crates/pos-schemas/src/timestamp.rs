use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

use crate::SchemaError;

/// Naive layouts the backend has been seen to emit (Python `isoformat()`).
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an order's `created_at`.
///
/// RFC 3339 values carry their own offset. Naive values are wall-clock time
/// on the backend host, which shares the shop's local zone.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, SchemaError> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            if let Some(local) = Local.from_local_datetime(&naive).earliest() {
                return Ok(local.with_timezone(&Utc));
            }
        }
    }

    Err(SchemaError::InvalidTimestamp(raw.to_string()))
}
