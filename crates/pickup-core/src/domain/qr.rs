use crate::domain::ids::{CollectionId, ResidentId};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const TAG: &str = "SWC";

/// Opaque completion token binding a collection to its owner.
///
/// Format: `SWC:<collection id as simple hex>:<resident id>`. The token is a
/// pure function of the two ids, so re-encoding always yields the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QrToken(String);

impl QrToken {
    pub fn encode(id: CollectionId, resident_id: ResidentId) -> Self {
        Self(format!("{TAG}:{}:{}", id.simple(), resident_id))
    }

    /// Recovers `(collection, resident)` from scanned text. Any deviation from
    /// the exact format is rejected.
    pub fn decode(raw: &str) -> Result<(CollectionId, ResidentId), CoreError> {
        let mut parts = raw.trim().split(':');
        let (Some(tag), Some(id_suffix), Some(resident), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(CoreError::MalformedQrToken);
        };
        if tag != TAG {
            return Err(CoreError::MalformedQrToken);
        }
        if id_suffix.len() != 32 || !id_suffix.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(CoreError::MalformedQrToken);
        }
        let id = Uuid::parse_str(id_suffix).map_err(|_| CoreError::MalformedQrToken)?;
        let resident = Uuid::parse_str(resident).map_err(|_| CoreError::MalformedQrToken)?;
        Ok((CollectionId::from_uuid(id), ResidentId::from_uuid(resident)))
    }

    /// Wraps a stored token without re-validating it.
    pub fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QrToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
