//! Fuel log operations

use chrono::Local;
use rusqlite::{params, OptionalExtension};

use super::{format_date, parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{FuelLog, NewFuelLog};

const FUEL_COLUMNS: &str = "f.id, f.vehicle_id, f.date, f.liters, f.price_per_liter, \
     f.total_cost, f.odometer, f.full_tank, f.created_at";

impl Database {
    fn row_to_fuel_log(row: &rusqlite::Row) -> rusqlite::Result<FuelLog> {
        let date: String = row.get(2)?;
        let created_at: String = row.get(8)?;
        Ok(FuelLog {
            id: row.get(0)?,
            vehicle_id: row.get(1)?,
            date: parse_date(&date),
            liters: row.get(3)?,
            price_per_liter: row.get(4)?,
            total_cost: row.get(5)?,
            odometer: row.get(6)?,
            full_tank: row.get(7)?,
            created_at: parse_datetime(&created_at),
        })
    }

    /// Record a fill-up; total cost defaults to liters times unit price
    pub fn create_fuel_log(&self, owner_id: i64, input: &NewFuelLog) -> Result<FuelLog> {
        let vehicle_id = input
            .vehicle_id
            .ok_or(Error::Validation("vehicle_id_required"))?;
        let liters = input
            .liters
            .filter(|l| l.is_finite() && *l > 0.0)
            .ok_or(Error::Validation("liters_required"))?;
        self.ensure_vehicle_owned(owner_id, vehicle_id)?;

        let date = input.date.unwrap_or_else(|| Local::now().date_naive());
        let total_cost = input
            .total_cost
            .unwrap_or(liters * input.price_per_liter);

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO fuel_logs
                (vehicle_id, date, liters, price_per_liter, total_cost, odometer, full_tank)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                vehicle_id,
                format_date(&date),
                liters,
                input.price_per_liter,
                total_cost,
                input.odometer,
                input.full_tank,
            ],
        )?;
        let id = conn.last_insert_rowid();

        self.get_fuel_log(owner_id, id)?
            .ok_or_else(|| Error::NotFound(format!("fuel log {}", id)))
    }

    pub fn get_fuel_log(&self, owner_id: i64, id: i64) -> Result<Option<FuelLog>> {
        let conn = self.conn()?;
        let log = conn
            .query_row(
                &format!(
                    "SELECT {} FROM fuel_logs f JOIN vehicles v ON v.id = f.vehicle_id \
                     WHERE f.id = ? AND v.owner_id = ?",
                    FUEL_COLUMNS
                ),
                params![id, owner_id],
                Self::row_to_fuel_log,
            )
            .optional()?;
        Ok(log)
    }

    /// Fill-ups, newest first
    pub fn list_fuel_logs(&self, owner_id: i64, vehicle_id: Option<i64>) -> Result<Vec<FuelLog>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM fuel_logs f JOIN vehicles v ON v.id = f.vehicle_id \
             WHERE v.owner_id = ?1 AND (?2 IS NULL OR f.vehicle_id = ?2) \
             ORDER BY f.date DESC, f.id DESC",
            FUEL_COLUMNS
        ))?;
        let logs = stmt
            .query_map(params![owner_id, vehicle_id], Self::row_to_fuel_log)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    pub fn delete_fuel_log(&self, owner_id: i64, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            r#"
            DELETE FROM fuel_logs
            WHERE id = ? AND vehicle_id IN (SELECT id FROM vehicles WHERE owner_id = ?)
            "#,
            params![id, owner_id],
        )?;
        Ok(deleted > 0)
    }
}
