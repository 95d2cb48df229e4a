//! Trip log operations

use chrono::Local;
use rusqlite::{params, OptionalExtension};

use super::vehicles::clean_text;
use super::{format_date, parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewTrip, Trip};

const TRIP_COLUMNS: &str = "t.id, t.vehicle_id, t.date, t.distance_km, t.start_odometer, \
     t.end_odometer, t.purpose, t.created_at";

/// Distance travelled: explicit value, else the odometer delta
fn trip_distance(input: &NewTrip) -> Result<f64> {
    let delta = match (input.start_odometer, input.end_odometer) {
        (Some(start), Some(end)) => match end.checked_sub(start) {
            Some(delta) if delta >= 0 => Some(delta as f64),
            _ => return Err(Error::Validation("invalid_odometer")),
        },
        _ => None,
    };
    Ok(input
        .distance_km
        .filter(|d| d.is_finite() && *d >= 0.0)
        .or(delta)
        .unwrap_or(0.0))
}

impl Database {
    fn row_to_trip(row: &rusqlite::Row) -> rusqlite::Result<Trip> {
        let date: String = row.get(2)?;
        let created_at: String = row.get(7)?;
        Ok(Trip {
            id: row.get(0)?,
            vehicle_id: row.get(1)?,
            date: parse_date(&date),
            distance_km: row.get(3)?,
            start_odometer: row.get(4)?,
            end_odometer: row.get(5)?,
            purpose: row.get(6)?,
            created_at: parse_datetime(&created_at),
        })
    }

    pub fn create_trip(&self, owner_id: i64, input: &NewTrip) -> Result<Trip> {
        let vehicle_id = input
            .vehicle_id
            .ok_or(Error::Validation("vehicle_id_required"))?;
        let distance_km = trip_distance(input)?;
        self.ensure_vehicle_owned(owner_id, vehicle_id)?;

        let date = input.date.unwrap_or_else(|| Local::now().date_naive());
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO trips (vehicle_id, date, distance_km, start_odometer, end_odometer, purpose)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                vehicle_id,
                format_date(&date),
                distance_km,
                input.start_odometer,
                input.end_odometer,
                clean_text(input.purpose.as_deref()),
            ],
        )?;
        let id = conn.last_insert_rowid();

        self.get_trip(owner_id, id)?
            .ok_or_else(|| Error::NotFound(format!("trip {}", id)))
    }

    pub fn get_trip(&self, owner_id: i64, id: i64) -> Result<Option<Trip>> {
        let conn = self.conn()?;
        let trip = conn
            .query_row(
                &format!(
                    "SELECT {} FROM trips t JOIN vehicles v ON v.id = t.vehicle_id \
                     WHERE t.id = ? AND v.owner_id = ?",
                    TRIP_COLUMNS
                ),
                params![id, owner_id],
                Self::row_to_trip,
            )
            .optional()?;
        Ok(trip)
    }

    /// Trips, newest first
    pub fn list_trips(&self, owner_id: i64, vehicle_id: Option<i64>) -> Result<Vec<Trip>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM trips t JOIN vehicles v ON v.id = t.vehicle_id \
             WHERE v.owner_id = ?1 AND (?2 IS NULL OR t.vehicle_id = ?2) \
             ORDER BY t.date DESC, t.id DESC",
            TRIP_COLUMNS
        ))?;
        let trips = stmt
            .query_map(params![owner_id, vehicle_id], Self::row_to_trip)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(trips)
    }

    pub fn delete_trip(&self, owner_id: i64, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            r#"
            DELETE FROM trips
            WHERE id = ? AND vehicle_id IN (SELECT id FROM vehicles WHERE owner_id = ?)
            "#,
            params![id, owner_id],
        )?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(distance_km: Option<f64>, start: Option<i64>, end: Option<i64>) -> NewTrip {
        NewTrip {
            vehicle_id: Some(1),
            date: None,
            distance_km,
            start_odometer: start,
            end_odometer: end,
            purpose: None,
        }
    }

    #[test]
    fn test_trip_distance_defaults_to_odometer_delta() {
        assert_eq!(trip_distance(&trip(None, Some(1000), Some(1250))).unwrap(), 250.0);
        assert_eq!(trip_distance(&trip(Some(90.0), Some(1000), Some(1250))).unwrap(), 90.0);
        assert_eq!(trip_distance(&trip(None, None, Some(1250))).unwrap(), 0.0);
    }

    #[test]
    fn test_trip_distance_rejects_backwards_odometer() {
        let err = trip_distance(&trip(None, Some(2000), Some(1000))).unwrap_err();
        assert_eq!(err.code(), "invalid_odometer");

        let err = trip_distance(&trip(None, Some(i64::MIN), Some(i64::MAX))).unwrap_err();
        assert_eq!(err.code(), "invalid_odometer");
    }
}
