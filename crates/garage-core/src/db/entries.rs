//! Service entry operations
//!
//! Entries belong to a vehicle, so ownership is checked by joining through
//! `vehicles.owner_id`.

use chrono::{Local, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::vehicles::clean_text;
use super::{format_date, format_datetime, parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{EntryFilter, NewServiceEntry, ServiceEntry, ServiceEntryPatch};

const ENTRY_COLUMNS: &str = "e.id, e.vehicle_id, e.date, e.mileage, e.service_type, e.description, \
     e.cost, e.attachment, e.created_at, e.updated_at";

impl Database {
    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<ServiceEntry> {
        let date: String = row.get(2)?;
        let created_at: String = row.get(8)?;
        let updated_at: Option<String> = row.get(9)?;
        Ok(ServiceEntry {
            id: row.get(0)?,
            vehicle_id: row.get(1)?,
            date: parse_date(&date),
            mileage: row.get(3)?,
            service_type: row.get(4)?,
            description: row.get(5)?,
            cost: row.get(6)?,
            attachment: row.get(7)?,
            created_at: parse_datetime(&created_at),
            updated_at: updated_at.as_deref().map(parse_datetime),
        })
    }

    /// Record a service entry on one of the user's vehicles
    pub fn create_entry(&self, owner_id: i64, input: &NewServiceEntry) -> Result<ServiceEntry> {
        let vehicle_id = input
            .vehicle_id
            .ok_or(Error::Validation("vehicle_id_required"))?;
        let service_type = input.service_type.trim();
        if service_type.is_empty() {
            return Err(Error::Validation("service_type_required"));
        }
        self.ensure_vehicle_owned(owner_id, vehicle_id)?;

        let date = input.date.unwrap_or_else(|| Local::now().date_naive());
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO service_entries
                (vehicle_id, date, mileage, service_type, description, cost, attachment)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                vehicle_id,
                format_date(&date),
                input.mileage,
                service_type,
                clean_text(input.description.as_deref()),
                input.cost,
                input.attachment,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(entry_id = id, vehicle_id, "Created service entry");

        self.get_entry(owner_id, id)?
            .ok_or_else(|| Error::NotFound(format!("entry {}", id)))
    }

    /// List entries, newest first
    pub fn list_entries(&self, owner_id: i64, filter: &EntryFilter) -> Result<Vec<ServiceEntry>> {
        let conn = self.conn()?;
        let mut sql = format!(
            "SELECT {} FROM service_entries e JOIN vehicles v ON v.id = e.vehicle_id WHERE v.owner_id = ?",
            ENTRY_COLUMNS
        );
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(owner_id)];

        if let Some(vehicle_id) = filter.vehicle_id {
            sql.push_str(" AND e.vehicle_id = ?");
            params_vec.push(Box::new(vehicle_id));
        }

        if let Some(query) = filter.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            sql.push_str(
                " AND (LOWER(e.service_type) LIKE ? OR LOWER(COALESCE(e.description, '')) LIKE ?)",
            );
            let pattern = format!("%{}%", query.to_lowercase());
            params_vec.push(Box::new(pattern.clone()));
            params_vec.push(Box::new(pattern));
        }

        sql.push_str(" ORDER BY e.date DESC, e.id DESC");

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params_refs.as_slice(), Self::row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn get_entry(&self, owner_id: i64, id: i64) -> Result<Option<ServiceEntry>> {
        let conn = self.conn()?;
        let entry = conn
            .query_row(
                &format!(
                    "SELECT {} FROM service_entries e JOIN vehicles v ON v.id = e.vehicle_id \
                     WHERE e.id = ? AND v.owner_id = ?",
                    ENTRY_COLUMNS
                ),
                params![id, owner_id],
                Self::row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    /// Apply a partial update and stamp `updated_at`
    pub fn update_entry(
        &self,
        owner_id: i64,
        id: i64,
        patch: ServiceEntryPatch,
    ) -> Result<ServiceEntry> {
        if patch.is_empty() {
            return Err(Error::Validation("no_fields"));
        }
        let current = self
            .get_entry(owner_id, id)?
            .ok_or_else(|| Error::NotFound(format!("entry {}", id)))?;

        let service_type = match patch.service_type {
            Some(s) if s.trim().is_empty() => {
                return Err(Error::Validation("service_type_required"))
            }
            Some(s) => s.trim().to_string(),
            None => current.service_type,
        };
        let date = patch.date.unwrap_or(current.date);
        let mileage = patch.mileage.merge(current.mileage);
        let description = patch.description.merge(current.description);
        let cost = patch.cost.merge(current.cost);

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE service_entries
            SET date = ?, mileage = ?, service_type = ?, description = ?, cost = ?, updated_at = ?
            WHERE id = ?
            "#,
            params![
                format_date(&date),
                mileage,
                service_type,
                clean_text(description.as_deref()),
                cost,
                format_datetime(&Utc::now()),
                id,
            ],
        )?;

        self.get_entry(owner_id, id)?
            .ok_or_else(|| Error::NotFound(format!("entry {}", id)))
    }

    /// Delete an entry, returning it so the caller can drop its attachment
    pub fn delete_entry(&self, owner_id: i64, id: i64) -> Result<Option<ServiceEntry>> {
        let Some(entry) = self.get_entry(owner_id, id)? else {
            return Ok(None);
        };
        let conn = self.conn()?;
        conn.execute("DELETE FROM service_entries WHERE id = ?", params![id])?;
        Ok(Some(entry))
    }

    /// Whether an attachment file belongs to one of the user's entries
    pub fn owns_attachment(&self, owner_id: i64, file_name: &str) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM service_entries e
            JOIN vehicles v ON v.id = e.vehicle_id
            WHERE e.attachment = ? AND v.owner_id = ?
            "#,
            params![file_name, owner_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
