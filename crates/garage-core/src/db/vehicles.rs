//! Vehicle operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewVehicle, Vehicle};

const VEHICLE_COLUMNS: &str = "id, owner_id, make, model, year, fuel, reg_plate, created_at";

/// Empty or whitespace-only optional text is stored as NULL
pub(crate) fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

impl Database {
    fn row_to_vehicle(row: &rusqlite::Row) -> rusqlite::Result<Vehicle> {
        let created_at: String = row.get(7)?;
        Ok(Vehicle {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            make: row.get(2)?,
            model: row.get(3)?,
            year: row.get(4)?,
            fuel: row.get(5)?,
            reg_plate: row.get(6)?,
            created_at: parse_datetime(&created_at),
        })
    }

    pub fn create_vehicle(&self, owner_id: i64, input: &NewVehicle) -> Result<Vehicle> {
        let make = input.make.trim();
        let model = input.model.trim();
        if make.is_empty() || model.is_empty() {
            return Err(Error::Validation("missing_fields"));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO vehicles (owner_id, make, model, year, fuel, reg_plate) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                owner_id,
                make,
                model,
                input.year,
                clean_text(input.fuel.as_deref()),
                clean_text(input.reg_plate.as_deref()),
            ],
        )?;
        let id = conn.last_insert_rowid();

        self.get_vehicle(owner_id, id)?
            .ok_or_else(|| Error::NotFound(format!("vehicle {}", id)))
    }

    /// Vehicles owned by the user, newest first
    pub fn list_vehicles(&self, owner_id: i64) -> Result<Vec<Vehicle>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM vehicles WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
            VEHICLE_COLUMNS
        ))?;
        let vehicles = stmt
            .query_map(params![owner_id], Self::row_to_vehicle)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(vehicles)
    }

    pub fn get_vehicle(&self, owner_id: i64, id: i64) -> Result<Option<Vehicle>> {
        let conn = self.conn()?;
        let vehicle = conn
            .query_row(
                &format!(
                    "SELECT {} FROM vehicles WHERE id = ? AND owner_id = ?",
                    VEHICLE_COLUMNS
                ),
                params![id, owner_id],
                Self::row_to_vehicle,
            )
            .optional()?;
        Ok(vehicle)
    }

    /// Fail with `vehicle_not_found` unless the user owns the vehicle
    pub fn ensure_vehicle_owned(&self, owner_id: i64, vehicle_id: i64) -> Result<()> {
        let conn = self.conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM vehicles WHERE id = ? AND owner_id = ?",
                params![vehicle_id, owner_id],
                |row| row.get(0),
            )
            .optional()?;
        match found {
            Some(_) => Ok(()),
            None => Err(Error::VehicleNotFound),
        }
    }

    /// Delete a vehicle and everything recorded against it
    pub fn delete_vehicle(&self, owner_id: i64, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM vehicles WHERE id = ? AND owner_id = ?",
            params![id, owner_id],
        )?;
        Ok(deleted > 0)
    }
}
