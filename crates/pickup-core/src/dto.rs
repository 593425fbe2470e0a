use crate::domain::{CollectionId, CollectionStatus, PaymentStatus, TimeSlot, WasteCategory};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionListItemDto {
    pub id: CollectionId,
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub category: WasteCategory,
    pub quantity: i64,
    pub fee: i64,
    pub status: CollectionStatus,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuoteDto {
    pub category: String,
    pub quantity: i64,
    pub effective_quantity: i64,
    pub rate: i64,
    pub fee: i64,
}
