//! Service schedule persistence
//!
//! Derivation of the due point happens in [`crate::schedule`]; this module
//! only loads, stores and checks ownership.

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{format_date, parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewSchedule, SchedulePatch, ServiceSchedule};
use crate::schedule::{apply_patch, draft_new};

const SCHEDULE_COLUMNS: &str = "id, owner_id, vehicle_id, kind, interval_months, interval_km, \
     last_service_date, last_service_mileage, next_due_date, next_due_mileage, created_at";

impl Database {
    fn row_to_schedule(row: &rusqlite::Row) -> rusqlite::Result<ServiceSchedule> {
        let last_service_date: Option<String> = row.get(6)?;
        let next_due_date: Option<String> = row.get(8)?;
        let created_at: String = row.get(10)?;
        Ok(ServiceSchedule {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            vehicle_id: row.get(2)?,
            kind: row.get(3)?,
            interval_months: row.get(4)?,
            interval_km: row.get(5)?,
            last_service_date: last_service_date.as_deref().map(parse_date),
            last_service_mileage: row.get(7)?,
            next_due_date: next_due_date.as_deref().map(parse_date),
            next_due_mileage: row.get(9)?,
            created_at: parse_datetime(&created_at),
        })
    }

    /// Create a schedule and store its derived (or overridden) due point
    pub fn create_schedule(&self, owner_id: i64, input: &NewSchedule) -> Result<ServiceSchedule> {
        let draft = draft_new(input)?;
        if let Some(vehicle_id) = draft.vehicle_id {
            self.ensure_vehicle_owned(owner_id, vehicle_id)?;
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO service_schedules
                (owner_id, vehicle_id, kind, interval_months, interval_km,
                 last_service_date, last_service_mileage, next_due_date, next_due_mileage)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                owner_id,
                draft.vehicle_id,
                draft.kind,
                draft.facts.interval_months,
                draft.facts.interval_km,
                draft.facts.last_service_date.as_ref().map(format_date),
                draft.facts.last_service_mileage,
                draft.next_due.date.as_ref().map(format_date),
                draft.next_due.mileage,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(schedule_id = id, kind = %draft.kind, "Created service schedule");

        self.get_schedule(owner_id, id)?
            .ok_or_else(|| Error::NotFound(format!("schedule {}", id)))
    }

    pub fn get_schedule(&self, owner_id: i64, id: i64) -> Result<Option<ServiceSchedule>> {
        let conn = self.conn()?;
        let schedule = conn
            .query_row(
                &format!(
                    "SELECT {} FROM service_schedules WHERE id = ? AND owner_id = ?",
                    SCHEDULE_COLUMNS
                ),
                params![id, owner_id],
                Self::row_to_schedule,
            )
            .optional()?;
        Ok(schedule)
    }

    /// Schedules ordered by next due date, undated last
    pub fn list_schedules(&self, owner_id: i64) -> Result<Vec<ServiceSchedule>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM service_schedules WHERE owner_id = ? \
             ORDER BY COALESCE(next_due_date, '9999-12-31') ASC, id DESC",
            SCHEDULE_COLUMNS
        ))?;
        let schedules = stmt
            .query_map(params![owner_id], Self::row_to_schedule)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(schedules)
    }

    /// Merge a patch, re-derive the affected due axes and store the result
    pub fn update_schedule(
        &self,
        owner_id: i64,
        id: i64,
        patch: SchedulePatch,
    ) -> Result<ServiceSchedule> {
        let current = self
            .get_schedule(owner_id, id)?
            .ok_or_else(|| Error::NotFound(format!("schedule {}", id)))?;
        if let Some(vehicle_id) = patch.vehicle_id.as_set() {
            self.ensure_vehicle_owned(owner_id, *vehicle_id)?;
        }

        let updated = apply_patch(&current, patch)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE service_schedules
            SET vehicle_id = ?, kind = ?, interval_months = ?, interval_km = ?,
                last_service_date = ?, last_service_mileage = ?,
                next_due_date = ?, next_due_mileage = ?
            WHERE id = ? AND owner_id = ?
            "#,
            params![
                updated.vehicle_id,
                updated.kind,
                updated.interval_months,
                updated.interval_km,
                updated.last_service_date.as_ref().map(format_date),
                updated.last_service_mileage,
                updated.next_due_date.as_ref().map(format_date),
                updated.next_due_mileage,
                id,
                owner_id,
            ],
        )?;

        self.get_schedule(owner_id, id)?
            .ok_or_else(|| Error::NotFound(format!("schedule {}", id)))
    }

    pub fn delete_schedule(&self, owner_id: i64, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM service_schedules WHERE id = ? AND owner_id = ?",
            params![id, owner_id],
        )?;
        Ok(deleted > 0)
    }
}
