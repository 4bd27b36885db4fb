//! Date range helpers for historical rate queries

use chrono::{Duration, NaiveDate, Utc};

/// Returns the (start, end) date pair covering the last `days` days,
/// ending today.
pub fn lookback_range(days: i64) -> (NaiveDate, NaiveDate) {
    let end = Utc::now().date_naive();
    let start = end - Duration::days(days);
    (start, end)
}
