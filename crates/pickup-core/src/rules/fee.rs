use crate::domain::WasteCategory;
use crate::error::CoreError;
use std::collections::BTreeMap;

/// Rate applied to labels that do not name a known category.
pub const DEFAULT_RATE: i64 = 120;

/// Built-in LKR rate per unit.
pub fn base_rate(category: WasteCategory) -> i64 {
    match category {
        WasteCategory::Bulky => 120,
        WasteCategory::Hazardous => 140,
        WasteCategory::Organic => 80,
        WasteCategory::EWaste => 130,
        WasteCategory::Recyclable => 40,
        WasteCategory::Other => 100,
    }
}

pub fn effective_quantity(quantity: i64) -> i64 {
    quantity.max(1)
}

pub fn calculate_fee(category: WasteCategory, quantity: i64) -> i64 {
    base_rate(category).saturating_mul(effective_quantity(quantity))
}

/// Rate table with per-category overrides on top of [`base_rate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSchedule {
    rates: BTreeMap<WasteCategory, i64>,
    default_rate: i64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            rates: WasteCategory::ALL
                .into_iter()
                .map(|category| (category, base_rate(category)))
                .collect(),
            default_rate: DEFAULT_RATE,
        }
    }
}

impl FeeSchedule {
    pub fn with_rate(mut self, category: WasteCategory, rate: i64) -> Result<Self, CoreError> {
        if rate < 0 {
            return Err(CoreError::InvalidRate(rate));
        }
        self.rates.insert(category, rate);
        Ok(self)
    }

    pub fn with_default_rate(mut self, rate: i64) -> Result<Self, CoreError> {
        if rate < 0 {
            return Err(CoreError::InvalidRate(rate));
        }
        self.default_rate = rate;
        Ok(self)
    }

    pub fn rate_for(&self, category: WasteCategory) -> i64 {
        self.rates
            .get(&category)
            .copied()
            .unwrap_or(self.default_rate)
    }

    pub fn default_rate(&self) -> i64 {
        self.default_rate
    }

    pub fn fee_for(&self, category: WasteCategory, quantity: i64) -> i64 {
        self.rate_for(category)
            .saturating_mul(effective_quantity(quantity))
    }

    /// Quotes a free-text category. Unrecognized labels fall back to the
    /// default rate instead of failing.
    pub fn quote(&self, label: &str, quantity: i64) -> i64 {
        self.rate_for_label(label)
            .saturating_mul(effective_quantity(quantity))
    }

    pub fn rate_for_label(&self, label: &str) -> i64 {
        label
            .parse::<WasteCategory>()
            .map(|category| self.rate_for(category))
            .unwrap_or(self.default_rate)
    }
}
