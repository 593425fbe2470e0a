pub mod availability;
pub mod fee;
pub mod policy;
pub mod window;

pub use availability::{
    available_dates, is_weekend, open_slots, slot_window, SlotOpening, SlotWindow,
    MAX_HORIZON_DAYS, MAX_PER_SLOT,
};
pub use fee::{base_rate, calculate_fee, effective_quantity, FeeSchedule, DEFAULT_RATE};
pub use policy::SchedulingPolicy;
pub use window::{meets_notice, scheduled_instant};
