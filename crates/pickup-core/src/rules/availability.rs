use crate::domain::TimeSlot;
use crate::error::CoreError;
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_PER_SLOT: u32 = 10;
pub const MAX_HORIZON_DAYS: u32 = 90;

/// Bookable dates starting today, in order.
pub fn available_dates(today: NaiveDate, horizon_days: u32) -> Result<Vec<NaiveDate>, CoreError> {
    if horizon_days == 0 || horizon_days > MAX_HORIZON_DAYS {
        return Err(CoreError::InvalidHorizon(horizon_days));
    }
    Ok(today
        .iter_days()
        .take(horizon_days as usize)
        .collect())
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Display range of a slot. Only presentation differs between weekdays and
/// weekends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl fmt::Display for SlotWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

pub fn slot_window(date: NaiveDate, slot: TimeSlot) -> SlotWindow {
    let (start, end) = match (slot, is_weekend(date)) {
        (TimeSlot::Morning, false) => ((9, 30), (12, 0)),
        (TimeSlot::Morning, true) => ((10, 0), (11, 30)),
        (TimeSlot::Afternoon, false) => ((15, 0), (17, 30)),
        (TimeSlot::Afternoon, true) => ((15, 0), (16, 30)),
    };
    SlotWindow {
        start: clock(start),
        end: clock(end),
    }
}

fn clock((hour, minute): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOpening {
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub window: SlotWindow,
    pub booked: u32,
    pub remaining: u32,
}

/// Slots on `date` whose booking count is still below `capacity`.
pub fn open_slots<F>(date: NaiveDate, capacity: u32, mut booked: F) -> Vec<SlotOpening>
where
    F: FnMut(TimeSlot) -> u32,
{
    TimeSlot::ALL
        .into_iter()
        .filter_map(|slot| {
            let count = booked(slot);
            if count >= capacity {
                return None;
            }
            Some(SlotOpening {
                date,
                slot,
                window: slot_window(date, slot),
                booked: count,
                remaining: capacity - count,
            })
        })
        .collect()
}
