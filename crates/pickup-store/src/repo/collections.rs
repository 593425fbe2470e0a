use crate::error::{unique_violation, Result, StoreError};
use crate::in_write_transaction;
use chrono::NaiveDate;
use pickup_core::domain::{
    CollectionId, CollectionRecord, CollectionStatus, Coordinates, PaymentMethod, PaymentStatus,
    QrToken, ResidentId, TimeSlot, WasteCategory,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

const COLUMNS: &str = "id, resident_id, category, items_description, quantity, fee, pickup_date,
     time_slot, location, latitude, longitude, instructions, status, payment_status,
     payment_method, qr_token, created_at, updated_at, collected_at";

#[derive(Debug, Clone)]
pub struct CollectionNew {
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
}

/// Target of a reschedule. Category, quantity and fee are written as given.
#[derive(Debug, Clone)]
pub struct CollectionMove {
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub category: WasteCategory,
    pub quantity: i64,
    pub fee: i64,
}

pub struct CollectionsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> CollectionsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Inserts a booking into the first free seat of its slot. Seats are
    /// numbered `1..=capacity`, so a full slot fails with `SlotFull`.
    pub fn create(
        &self,
        now_utc: i64,
        input: CollectionNew,
        capacity: u32,
    ) -> Result<CollectionRecord> {
        in_write_transaction(self.conn, |conn| create_inner(conn, now_utc, input, capacity))
    }

    pub fn get(&self, id: CollectionId) -> Result<Option<CollectionRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM collections WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(collection_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list_for_resident(&self, resident_id: ResidentId) -> Result<Vec<CollectionRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS}
             FROM collections
             WHERE resident_id = ?1
             ORDER BY pickup_date ASC,
                      CASE time_slot WHEN 'morning' THEN 0 ELSE 1 END ASC,
                      created_at ASC,
                      id ASC;"
        ))?;
        let mut rows = stmt.query([resident_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(collection_from_row(row)?);
        }
        Ok(items)
    }

    pub fn count_for_slot(&self, date: NaiveDate, slot: TimeSlot) -> Result<u32> {
        count_for_slot(self.conn, date, slot)
    }

    /// First free sequence number on `(date, slot)`. Only meaningful inside a
    /// write transaction; outside one the answer can be stale.
    pub fn reserve_slot_seq(&self, date: NaiveDate, slot: TimeSlot, capacity: u32) -> Result<u32> {
        reserve_slot_seq(self.conn, date, slot, capacity)
    }

    pub fn slot_occupancy(&self, date: NaiveDate) -> Result<HashMap<TimeSlot, u32>> {
        let mut stmt = self.conn.prepare(
            "SELECT time_slot, COUNT(*)
             FROM collections
             WHERE pickup_date = ?1
             GROUP BY time_slot;",
        )?;
        let mut rows = stmt.query([format_date(date)])?;
        let mut map: HashMap<TimeSlot, u32> =
            TimeSlot::ALL.into_iter().map(|slot| (slot, 0)).collect();
        while let Some(row) = rows.next()? {
            let slot_raw: String = row.get(0)?;
            let count: u32 = row.get(1)?;
            map.insert(TimeSlot::from_str(&slot_raw)?, count);
        }
        Ok(map)
    }

    pub fn has_active_unpaid(
        &self,
        resident_id: ResidentId,
        excluding: Option<CollectionId>,
    ) -> Result<bool> {
        has_active_unpaid(self.conn, resident_id, excluding)
    }

    /// Moves a booking to another date and slot, taking a free seat there.
    /// Staying in the same slot keeps the current seat.
    pub fn move_to(
        &self,
        now_utc: i64,
        id: CollectionId,
        target: CollectionMove,
        capacity: u32,
    ) -> Result<CollectionRecord> {
        in_write_transaction(self.conn, |conn| move_inner(conn, now_utc, id, target, capacity))
    }

    pub fn set_payment(
        &self,
        now_utc: i64,
        id: CollectionId,
        status: PaymentStatus,
        method: Option<PaymentMethod>,
    ) -> Result<CollectionRecord> {
        in_write_transaction(self.conn, |conn| {
            let existing = require(conn, id)?;
            let updated = conn
                .execute(
                    "UPDATE collections
                     SET payment_status = ?2, payment_method = ?3, updated_at = ?4
                     WHERE id = ?1;",
                    params![
                        id.to_string(),
                        status.as_str(),
                        method.map(PaymentMethod::as_str),
                        now_utc
                    ],
                )
                .map_err(|err| map_write_error(err, &existing))?;
            if updated == 0 {
                return Err(StoreError::NotFound(id.to_string()));
            }
            require(conn, id)
        })
    }

    pub fn mark_collected(&self, now_utc: i64, id: CollectionId) -> Result<CollectionRecord> {
        in_write_transaction(self.conn, |conn| {
            let updated = conn.execute(
                "UPDATE collections
                 SET status = 'collected', collected_at = ?2, updated_at = ?2
                 WHERE id = ?1;",
                params![id.to_string(), now_utc],
            )?;
            if updated == 0 {
                return Err(StoreError::NotFound(id.to_string()));
            }
            require(conn, id)
        })
    }

    /// Hard delete. The returned snapshot is the last state of the row.
    pub fn delete(&self, id: CollectionId) -> Result<CollectionRecord> {
        in_write_transaction(self.conn, |conn| {
            let existing = require(conn, id)?;
            conn.execute("DELETE FROM collections WHERE id = ?1;", [id.to_string()])?;
            Ok(existing)
        })
    }
}

fn create_inner(
    conn: &Connection,
    now_utc: i64,
    input: CollectionNew,
    capacity: u32,
) -> Result<CollectionRecord> {
    let seat = reserve_slot_seq(conn, input.date, input.time_slot, capacity)?;
    let id = CollectionId::new();
    let qr_token = QrToken::encode(id, input.resident_id);
    let record = CollectionRecord {
        id,
        resident_id: input.resident_id,
        category: input.category,
        items_description: input.items_description,
        quantity: input.quantity,
        fee: input.fee,
        date: input.date,
        time_slot: input.time_slot,
        location: input.location,
        coordinates: input.coordinates,
        instructions: input.instructions,
        status: CollectionStatus::Scheduled,
        payment_status: PaymentStatus::Unpaid,
        payment_method: None,
        qr_token,
        created_at: now_utc,
        updated_at: now_utc,
        collected_at: None,
    };

    conn.execute(
        "INSERT INTO collections (id, resident_id, category, items_description, quantity, fee,
             pickup_date, time_slot, slot_seq, location, latitude, longitude, instructions,
             status, payment_status, payment_method, qr_token, created_at, updated_at, collected_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20);",
        params![
            record.id.to_string(),
            record.resident_id.to_string(),
            record.category.as_str(),
            record.items_description,
            record.quantity,
            record.fee,
            format_date(record.date),
            record.time_slot.as_str(),
            seat,
            record.location,
            record.coordinates.map(|c| c.latitude),
            record.coordinates.map(|c| c.longitude),
            record.instructions,
            record.status.as_str(),
            record.payment_status.as_str(),
            Option::<&str>::None,
            record.qr_token.as_str(),
            record.created_at,
            record.updated_at,
            Option::<i64>::None,
        ],
    )
    .map_err(|err| map_write_error(err, &record))?;

    Ok(record)
}

fn move_inner(
    conn: &Connection,
    now_utc: i64,
    id: CollectionId,
    target: CollectionMove,
    capacity: u32,
) -> Result<CollectionRecord> {
    let existing = require(conn, id)?;
    let seat = if existing.date == target.date && existing.time_slot == target.time_slot {
        current_seat(conn, id)?
    } else {
        reserve_slot_seq(conn, target.date, target.time_slot, capacity)?
    };

    let moved = CollectionRecord {
        date: target.date,
        time_slot: target.time_slot,
        ..existing
    };
    conn.execute(
        "UPDATE collections
         SET pickup_date = ?2, time_slot = ?3, slot_seq = ?4, category = ?5, quantity = ?6,
             fee = ?7, updated_at = ?8
         WHERE id = ?1;",
        params![
            id.to_string(),
            format_date(target.date),
            target.time_slot.as_str(),
            seat,
            target.category.as_str(),
            target.quantity,
            target.fee,
            now_utc,
        ],
    )
    .map_err(|err| map_write_error(err, &moved))?;

    require(conn, id)
}

/// Lowest seat number in `1..=capacity` not taken on `(date, slot)`.
///
/// Rows seated above `capacity` (left over from a larger configured
/// capacity) still count against the slot.
fn reserve_slot_seq(conn: &Connection, date: NaiveDate, slot: TimeSlot, capacity: u32) -> Result<u32> {
    if count_for_slot(conn, date, slot)? >= capacity {
        return Err(StoreError::SlotFull { date, slot });
    }
    let mut stmt = conn.prepare(
        "SELECT slot_seq FROM collections
         WHERE pickup_date = ?1 AND time_slot = ?2
         ORDER BY slot_seq ASC;",
    )?;
    let mut rows = stmt.query(params![format_date(date), slot.as_str()])?;
    let mut candidate: u32 = 1;
    while let Some(row) = rows.next()? {
        let taken: u32 = row.get(0)?;
        if taken == candidate {
            candidate += 1;
        } else if taken > candidate {
            break;
        }
    }
    if candidate > capacity {
        return Err(StoreError::SlotFull { date, slot });
    }
    Ok(candidate)
}

fn current_seat(conn: &Connection, id: CollectionId) -> Result<u32> {
    conn.query_row(
        "SELECT slot_seq FROM collections WHERE id = ?1;",
        [id.to_string()],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| StoreError::NotFound(id.to_string()))
}

fn count_for_slot(conn: &Connection, date: NaiveDate, slot: TimeSlot) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM collections WHERE pickup_date = ?1 AND time_slot = ?2;",
        params![format_date(date), slot.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn has_active_unpaid(
    conn: &Connection,
    resident_id: ResidentId,
    excluding: Option<CollectionId>,
) -> Result<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT id FROM collections
             WHERE resident_id = ?1
               AND status = 'scheduled'
               AND payment_status = 'unpaid'
               AND (?2 IS NULL OR id <> ?2)
             LIMIT 1;",
            params![resident_id.to_string(), excluding.map(|id| id.to_string())],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn require(conn: &Connection, id: CollectionId) -> Result<CollectionRecord> {
    CollectionsRepo::new(conn)
        .get(id)?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
}

fn map_write_error(err: rusqlite::Error, record: &CollectionRecord) -> StoreError {
    match unique_violation(&err) {
        Some(columns) if columns.contains("collections.slot_seq") => StoreError::SlotFull {
            date: record.date,
            slot: record.time_slot,
        },
        Some(columns) if columns.contains("collections.resident_id") => {
            StoreError::DuplicateUnpaid(record.resident_id)
        }
        _ => StoreError::Sql(err),
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| StoreError::InvalidDate(raw.to_string()))
}

fn collection_from_row(row: &rusqlite::Row<'_>) -> Result<CollectionRecord> {
    let id_str: String = row.get(0)?;
    let id = CollectionId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    let resident_str: String = row.get(1)?;
    let resident_id = ResidentId::from_str(&resident_str)
        .map_err(|_| StoreError::InvalidId(resident_str.clone()))?;
    let category: String = row.get(2)?;
    let date: String = row.get(6)?;
    let slot: String = row.get(7)?;
    let latitude: Option<f64> = row.get(9)?;
    let longitude: Option<f64> = row.get(10)?;
    let coordinates = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };
    let status: String = row.get(12)?;
    let payment_status: String = row.get(13)?;
    let payment_method: Option<String> = row.get(14)?;
    let qr_token: String = row.get(15)?;

    Ok(CollectionRecord {
        id,
        resident_id,
        category: WasteCategory::from_str(&category)?,
        items_description: row.get(3)?,
        quantity: row.get(4)?,
        fee: row.get(5)?,
        date: parse_date(&date)?,
        time_slot: TimeSlot::from_str(&slot)?,
        location: row.get(8)?,
        coordinates,
        instructions: row.get(11)?,
        status: CollectionStatus::from_str(&status)?,
        payment_status: PaymentStatus::from_str(&payment_status)?,
        payment_method: payment_method
            .as_deref()
            .map(PaymentMethod::from_str)
            .transpose()?,
        qr_token: QrToken::from_stored(qr_token),
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
        collected_at: row.get(18)?,
    })
}
