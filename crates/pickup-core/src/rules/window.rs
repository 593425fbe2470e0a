use crate::domain::TimeSlot;
use crate::error::CoreError;
use chrono::{FixedOffset, NaiveDate, TimeZone};

/// Concrete instant (UTC seconds) of a slot start on a date in `offset`.
pub fn scheduled_instant(
    date: NaiveDate,
    slot: TimeSlot,
    offset: FixedOffset,
) -> Result<i64, CoreError> {
    let naive = date.and_time(slot.start_time());
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.timestamp())
        .ok_or(CoreError::InvalidTimestamp)
}

/// True when `scheduled_utc` is at least `notice_hours` after `now_utc`.
/// Exactly on the boundary counts as enough notice.
pub fn meets_notice(now_utc: i64, scheduled_utc: i64, notice_hours: u32) -> bool {
    let earliest = now_utc.saturating_add(i64::from(notice_hours) * 3_600);
    scheduled_utc >= earliest
}
