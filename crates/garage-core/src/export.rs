//! CSV export and import of service entries
//!
//! Both directions share one column layout:
//! `date,vehicle_id,vehicle,mileage,service_type,description,cost`.
//! The `vehicle` column is a readable label and is ignored on import.

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{EntryFilter, NewServiceEntry};

/// Column order for entry CSV files
pub const ENTRY_CSV_HEADERS: [&str; 7] = [
    "date",
    "vehicle_id",
    "vehicle",
    "mileage",
    "service_type",
    "description",
    "cost",
];

/// Outcome of an entry import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub imported: usize,
    pub skipped: usize,
}

#[derive(Debug, Serialize)]
struct EntryCsvRow<'a> {
    date: String,
    vehicle_id: i64,
    vehicle: &'a str,
    mileage: Option<i64>,
    service_type: &'a str,
    description: Option<&'a str>,
    cost: Option<f64>,
}

/// Column positions resolved from the header row
struct Columns(HashMap<String, usize>);

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        Self(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.trim().to_lowercase(), i))
                .collect(),
        )
    }

    fn get<'r>(&self, record: &'r StringRecord, name: &str) -> Option<&'r str> {
        self.0
            .get(name)
            .and_then(|i| record.get(*i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Turn one CSV record into an entry, or a reason to skip it
fn parse_row(columns: &Columns, record: &StringRecord) -> std::result::Result<NewServiceEntry, &'static str> {
    let date = columns
        .get(record, "date")
        .ok_or("missing date")
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| "invalid date"))?;
    let vehicle_id = columns
        .get(record, "vehicle_id")
        .ok_or("missing vehicle_id")
        .and_then(|s| s.parse::<i64>().map_err(|_| "invalid vehicle_id"))?;
    let service_type = columns
        .get(record, "service_type")
        .ok_or("missing service_type")?;
    let mileage = match columns.get(record, "mileage") {
        Some(s) => Some(s.parse::<i64>().map_err(|_| "invalid mileage")?),
        None => None,
    };
    let cost = match columns.get(record, "cost") {
        Some(s) => Some(
            s.parse::<f64>()
                .ok()
                .filter(|c| c.is_finite())
                .ok_or("invalid cost")?,
        ),
        None => None,
    };

    Ok(NewServiceEntry {
        vehicle_id: Some(vehicle_id),
        date: Some(date),
        mileage,
        service_type: service_type.to_string(),
        description: columns.get(record, "description").map(String::from),
        cost,
        attachment: None,
    })
}

impl Database {
    /// All of the user's service entries as CSV, newest first
    pub fn export_entries_csv(&self, owner_id: i64) -> Result<String> {
        let labels: HashMap<i64, String> = self
            .list_vehicles(owner_id)?
            .into_iter()
            .map(|v| (v.id, v.label()))
            .collect();
        let entries = self.list_entries(owner_id, &EntryFilter::default())?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        writer.write_record(ENTRY_CSV_HEADERS)?;
        for entry in &entries {
            writer.serialize(EntryCsvRow {
                date: entry.date.format("%Y-%m-%d").to_string(),
                vehicle_id: entry.vehicle_id,
                vehicle: labels.get(&entry.vehicle_id).map(String::as_str).unwrap_or(""),
                mileage: entry.mileage,
                service_type: &entry.service_type,
                description: entry.description.as_deref(),
                cost: entry.cost,
            })?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))?;
        debug!(rows = entries.len(), "Exported service entries");
        String::from_utf8(bytes).map_err(|e| Error::Io(std::io::Error::other(e)))
    }

    /// Import entries from CSV, skipping rows that fail validation or
    /// reference a vehicle the user does not own
    pub fn import_entries_csv<R: Read>(&self, owner_id: i64, reader: R) -> Result<ImportStats> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns = Columns::from_headers(rdr.headers()?);
        let mut stats = ImportStats::default();

        for (line, result) in rdr.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!(line = line + 2, error = %e, "Skipping unreadable CSV row");
                    stats.skipped += 1;
                    continue;
                }
            };

            let entry = match parse_row(&columns, &record) {
                Ok(entry) => entry,
                Err(reason) => {
                    warn!(line = line + 2, reason, "Skipping CSV row");
                    stats.skipped += 1;
                    continue;
                }
            };

            match self.create_entry(owner_id, &entry) {
                Ok(_) => stats.imported += 1,
                Err(e @ (Error::Validation(_) | Error::VehicleNotFound)) => {
                    warn!(line = line + 2, reason = e.code(), "Skipping CSV row");
                    stats.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            imported = stats.imported,
            skipped = stats.skipped,
            "Imported service entries"
        );
        Ok(stats)
    }
}
