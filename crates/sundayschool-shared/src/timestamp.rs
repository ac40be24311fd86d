//! Millisecond timestamp normalization.
//!
//! External sources (camera EXIF extraction in particular) hand out Unix
//! seconds, the rest of the application works in milliseconds. Anything
//! below [`MILLIS_THRESHOLD`] is treated as seconds; `1e12` ms is in 2001,
//! while `1e12` s is beyond the year 33000, so the two ranges never meet for
//! realistic dates.

use chrono::Utc;

use crate::constants::MILLIS_THRESHOLD;
use crate::error::TimestampError;

/// Normalize an optional timestamp to milliseconds since the epoch.
///
/// `None` passes through. NaN, infinities and negative values are rejected.
pub fn normalize_millis(value: Option<f64>, field: &str) -> Result<Option<i64>, TimestampError> {
    let Some(value) = value else {
        return Ok(None);
    };

    if !value.is_finite() {
        return Err(TimestampError::NotANumber {
            field: field.to_string(),
        });
    }
    if value < 0.0 {
        return Err(TimestampError::Negative {
            field: field.to_string(),
        });
    }

    let millis = if value < MILLIS_THRESHOLD {
        (value * 1000.0).round()
    } else {
        value.round()
    };

    Ok(Some(millis as i64))
}

/// Current wall-clock time in milliseconds since the epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
