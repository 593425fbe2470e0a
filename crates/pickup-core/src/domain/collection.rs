use crate::domain::category::WasteCategory;
use crate::domain::ids::{CollectionId, ResidentId};
use crate::domain::payment::{PaymentMethod, PaymentStatus};
use crate::domain::qr::QrToken;
use crate::domain::slot::TimeSlot;
use crate::error::CoreError;
use crate::rules::window::scheduled_instant;
use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    Scheduled,
    Collected,
}

impl CollectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionStatus::Scheduled => "scheduled",
            CollectionStatus::Collected => "collected",
        }
    }
}

impl fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionStatus {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(CollectionStatus::Scheduled),
            "collected" => Ok(CollectionStatus::Collected),
            _ => Err(CoreError::InvalidCollectionStatus(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(CoreError::InvalidCoordinates(format!(
                "{latitude},{longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Booking input after boundary parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRequest {
    pub category: WasteCategory,
    pub items_description: String,
    pub quantity: i64,
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub instructions: Option<String>,
}

impl CollectionRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.quantity < 1 {
            return Err(CoreError::InvalidQuantity(self.quantity));
        }
        if let Some(coordinates) = self.coordinates {
            Coordinates::new(coordinates.latitude, coordinates.longitude)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub id: CollectionId,
    pub resident_id: ResidentId,
    pub category: WasteCategory,
    pub items_description: String,
    pub quantity: i64,
    pub fee: i64,
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub instructions: Option<String>,
    pub status: CollectionStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub qr_token: QrToken,
    pub created_at: i64,
    pub updated_at: i64,
    pub collected_at: Option<i64>,
}

impl CollectionRecord {
    pub fn is_collected(&self) -> bool {
        self.status == CollectionStatus::Collected
    }

    pub fn is_owned_by(&self, resident_id: ResidentId) -> bool {
        self.resident_id == resident_id
    }

    pub fn scheduled_instant(&self, offset: FixedOffset) -> Result<i64, CoreError> {
        scheduled_instant(self.date, self.time_slot, offset)
    }
}
