use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// `x-amz-date` format, e.g. `20150830T123600Z`.
pub fn amz_date(now: &DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Credential scope date, e.g. `20150830`.
pub fn amz_short_date(now: &DateTime<Utc>) -> String {
    now.format("%Y%m%d").to_string()
}

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

pub fn get_instant() -> Instant {
    Instant::now()
}
