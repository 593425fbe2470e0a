use crate::domain::ids::ResidentId;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Account a booking belongs to, as reported by the identity directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resident {
    pub id: ResidentId,
    pub display_name: String,
    pub email: String,
    pub active: bool,
    pub overdue_payments: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Resident {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.display_name.trim().is_empty() {
            return Err(CoreError::EmptyDisplayName);
        }
        normalize_email(&self.email)?;
        Ok(())
    }
}

pub fn normalize_email(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !trimmed.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(CoreError::InvalidEmail(raw.to_string()));
    }
    Ok(trimmed.to_ascii_lowercase())
}
