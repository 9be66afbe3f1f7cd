use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::time::SystemTime;

/// Interpret a wall-clock time in the given timezone.
///
/// Ambiguous times (DST fall back) resolve to the earlier instant. Times
/// that fall into a DST gap are shifted forward by the gap.
pub fn localize(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// Current time in the given timezone
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// How long ago `modified` was, relative to `now`.
///
/// A modification time in the future counts as zero age.
pub fn file_age(modified: SystemTime, now: SystemTime) -> std::time::Duration {
    now.duration_since(modified).unwrap_or_default()
}
