//! Statistics loading

use chrono::NaiveDate;

use super::Database;
use crate::error::Result;
use crate::models::EntryFilter;
use crate::stats::{compute_statistics, Statistics};

impl Database {
    /// Load the user's vehicles, entries and fill-ups and aggregate them
    pub fn statistics(
        &self,
        owner_id: i64,
        today: NaiveDate,
        since: Option<NaiveDate>,
    ) -> Result<Statistics> {
        let vehicles = self.list_vehicles(owner_id)?;
        let entries = self.list_entries(owner_id, &EntryFilter::default())?;
        let fuel = self.list_fuel_logs(owner_id, None)?;

        Ok(compute_statistics(&vehicles, &entries, &fuel, today, since))
    }
}
