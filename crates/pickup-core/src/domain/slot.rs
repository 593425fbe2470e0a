use crate::error::CoreError;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Half-day collection window.
///
/// Free-text inputs such as `"Morning 9.30-12.00"` normalize through their
/// leading token; anything that is not morning or afternoon is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Morning,
    Afternoon,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 2] = [TimeSlot::Morning, TimeSlot::Afternoon];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Afternoon => "afternoon",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeSlot::Morning => "Morning",
            TimeSlot::Afternoon => "Afternoon",
        }
    }

    /// Clock time used to anchor reschedule and cancel windows.
    pub fn start_time(self) -> NaiveTime {
        match self {
            TimeSlot::Morning => NaiveTime::from_hms_opt(9, 30, 0),
            TimeSlot::Afternoon => NaiveTime::from_hms_opt(15, 0, 0),
        }
        .unwrap_or_default()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeSlot {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let leading = raw
            .split(|ch: char| ch.is_whitespace() || ch == '(' || ch == ',')
            .find(|token| !token.is_empty())
            .unwrap_or("")
            .to_ascii_lowercase();
        match leading.as_str() {
            "morning" => Ok(TimeSlot::Morning),
            "afternoon" => Ok(TimeSlot::Afternoon),
            _ => Err(CoreError::InvalidTimeSlot(raw.to_string())),
        }
    }
}
