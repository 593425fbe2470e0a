use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WasteCategory {
    Bulky,
    Hazardous,
    Organic,
    EWaste,
    Recyclable,
    Other,
}

impl WasteCategory {
    pub const ALL: [WasteCategory; 6] = [
        WasteCategory::Bulky,
        WasteCategory::Hazardous,
        WasteCategory::Organic,
        WasteCategory::EWaste,
        WasteCategory::Recyclable,
        WasteCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WasteCategory::Bulky => "bulky",
            WasteCategory::Hazardous => "hazardous",
            WasteCategory::Organic => "organic",
            WasteCategory::EWaste => "e_waste",
            WasteCategory::Recyclable => "recyclable",
            WasteCategory::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WasteCategory::Bulky => "Bulky",
            WasteCategory::Hazardous => "Hazardous",
            WasteCategory::Organic => "Organic",
            WasteCategory::EWaste => "E-Waste",
            WasteCategory::Recyclable => "Recyclable",
            WasteCategory::Other => "Other",
        }
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WasteCategory {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value: String = raw
            .trim()
            .chars()
            .map(|ch| match ch {
                '-' | ' ' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        match value.as_str() {
            "bulky" => Ok(WasteCategory::Bulky),
            "hazardous" => Ok(WasteCategory::Hazardous),
            "organic" => Ok(WasteCategory::Organic),
            "e_waste" | "ewaste" => Ok(WasteCategory::EWaste),
            "recyclable" => Ok(WasteCategory::Recyclable),
            "other" => Ok(WasteCategory::Other),
            _ => Err(CoreError::InvalidCategory(raw.to_string())),
        }
    }
}
