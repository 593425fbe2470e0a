use crate::error::CoreError;
use crate::rules::availability::{MAX_HORIZON_DAYS, MAX_PER_SLOT};
use crate::time::local_offset;
use chrono::FixedOffset;

pub const DEFAULT_HORIZON_DAYS: u32 = 14;
pub const DEFAULT_RESCHEDULE_NOTICE_HOURS: u32 = 24;
pub const DEFAULT_CANCEL_NOTICE_HOURS: u32 = 8;
pub const MAX_SLOT_CAPACITY: u32 = 100;
pub const MAX_NOTICE_HOURS: u32 = 720;

/// Tunables for the booking lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingPolicy {
    pub capacity_per_slot: u32,
    pub horizon_days: u32,
    pub reschedule_notice_hours: u32,
    pub cancel_notice_hours: u32,
    /// When false the fee is frozen at booking time and reschedule may only
    /// move the date and slot.
    pub allow_fee_recalc_on_reschedule: bool,
    /// Offset in which dates and slot clock times are interpreted.
    pub utc_offset: FixedOffset,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            capacity_per_slot: MAX_PER_SLOT,
            horizon_days: DEFAULT_HORIZON_DAYS,
            reschedule_notice_hours: DEFAULT_RESCHEDULE_NOTICE_HOURS,
            cancel_notice_hours: DEFAULT_CANCEL_NOTICE_HOURS,
            allow_fee_recalc_on_reschedule: false,
            utc_offset: local_offset(),
        }
    }
}

impl SchedulingPolicy {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.capacity_per_slot == 0 || self.capacity_per_slot > MAX_SLOT_CAPACITY {
            return Err(CoreError::InvalidCapacity(self.capacity_per_slot));
        }
        if self.horizon_days == 0 || self.horizon_days > MAX_HORIZON_DAYS {
            return Err(CoreError::InvalidHorizon(self.horizon_days));
        }
        Ok(())
    }
}
