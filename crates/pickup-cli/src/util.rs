use crate::error::invalid_input;
use anyhow::Result;
use chrono::{FixedOffset, NaiveDate};
use pickup_core::time::{format_timestamp_datetime, parse_date};
use pickup_core::{CollectionId, Coordinates, ResidentId};
use std::str::FromStr;

pub use pickup_core::time::now_utc;

pub fn parse_collection_id(raw: &str) -> Result<CollectionId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_input("collection id cannot be empty"));
    }
    CollectionId::from_str(trimmed).map_err(|_| invalid_input("invalid collection id"))
}

pub fn parse_resident_id(raw: &str) -> Result<ResidentId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_input("resident id cannot be empty"));
    }
    ResidentId::from_str(trimmed).map_err(|_| invalid_input("invalid resident id"))
}

pub fn parse_pickup_date(raw: &str) -> Result<NaiveDate> {
    Ok(parse_date(raw)?)
}

pub fn parse_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<Coordinates>> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Ok(Some(Coordinates::new(latitude, longitude)?)),
        (None, None) => Ok(None),
        _ => Err(invalid_input("--lat and --lng must be given together")),
    }
}

pub fn normalize_optional_text(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn format_optional_timestamp(ts: Option<i64>, offset: FixedOffset) -> String {
    ts.map(|ts| format_timestamp_datetime(ts, offset))
        .unwrap_or_else(|| "-".to_string())
}
