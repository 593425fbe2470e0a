use crate::error::{unique_violation, Result, StoreError};
use pickup_core::domain::{normalize_email, Resident, ResidentId};
use rusqlite::{params, Connection};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct ResidentNew {
    pub display_name: String,
    pub email: String,
    pub active: bool,
    pub overdue_payments: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ResidentUpdate {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub active: Option<bool>,
    pub overdue_payments: Option<bool>,
}

pub struct ResidentsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ResidentsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, input: ResidentNew) -> Result<Resident> {
        let resident = Resident {
            id: ResidentId::new(),
            display_name: input.display_name.trim().to_string(),
            email: normalize_email(&input.email)?,
            active: input.active,
            overdue_payments: input.overdue_payments,
            created_at: now_utc,
            updated_at: now_utc,
        };
        resident.validate()?;

        self.conn
            .execute(
                "INSERT INTO residents (id, display_name, email, active, overdue_payments, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    resident.id.to_string(),
                    resident.display_name,
                    resident.email,
                    resident.active,
                    resident.overdue_payments,
                    resident.created_at,
                    resident.updated_at,
                ],
            )
            .map_err(|err| map_email_conflict(err, &resident.email))?;
        Ok(resident)
    }

    pub fn get(&self, id: ResidentId) -> Result<Option<Resident>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, display_name, email, active, overdue_payments, created_at, updated_at
             FROM residents WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(resident_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list(&self) -> Result<Vec<Resident>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, display_name, email, active, overdue_payments, created_at, updated_at
             FROM residents
             ORDER BY display_name COLLATE NOCASE ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(resident_from_row(row)?);
        }
        Ok(items)
    }

    pub fn update(&self, now_utc: i64, id: ResidentId, update: ResidentUpdate) -> Result<Resident> {
        let mut resident = self
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(name) = update.display_name {
            resident.display_name = name.trim().to_string();
        }
        if let Some(email) = update.email {
            resident.email = normalize_email(&email)?;
        }
        if let Some(active) = update.active {
            resident.active = active;
        }
        if let Some(overdue) = update.overdue_payments {
            resident.overdue_payments = overdue;
        }
        resident.updated_at = now_utc;
        resident.validate()?;

        self.conn
            .execute(
                "UPDATE residents
                 SET display_name = ?2, email = ?3, active = ?4, overdue_payments = ?5, updated_at = ?6
                 WHERE id = ?1;",
                params![
                    id.to_string(),
                    resident.display_name,
                    resident.email,
                    resident.active,
                    resident.overdue_payments,
                    resident.updated_at,
                ],
            )
            .map_err(|err| map_email_conflict(err, &resident.email))?;
        Ok(resident)
    }
}

fn map_email_conflict(err: rusqlite::Error, email: &str) -> StoreError {
    match unique_violation(&err) {
        Some(columns) if columns.contains("residents.email") => {
            StoreError::DuplicateEmail(email.to_string())
        }
        _ => StoreError::Sql(err),
    }
}

fn resident_from_row(row: &rusqlite::Row<'_>) -> Result<Resident> {
    let id_str: String = row.get(0)?;
    let id = ResidentId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    Ok(Resident {
        id,
        display_name: row.get(1)?,
        email: row.get(2)?,
        active: row.get(3)?,
        overdue_payments: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
