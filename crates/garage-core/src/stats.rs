//! Cost and consumption statistics
//!
//! A pure aggregator over one user's vehicles, service entries and fuel
//! logs. The database layer loads the rows; everything here is computed in
//! memory with ordered maps so repeated calls produce identical output.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{FuelLog, ServiceEntry, Vehicle};

/// Full statistics payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub by_day: Vec<DayCost>,
    pub last_mileage: Vec<LastMileage>,
    pub tco: Tco,
    pub fuel_stats: Vec<FuelStats>,
    pub daily_vehicle_costs: Vec<DailyVehicleCost>,
    pub vehicle_costs: Vec<VehicleCost>,
}

/// Combined service and fuel cost for one day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCost {
    pub date: NaiveDate,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastMileage {
    pub vehicle_id: i64,
    pub label: String,
    pub mileage: i64,
}

/// Total cost of ownership across the fleet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tco {
    pub total_cost: f64,
    pub months: i64,
    pub km: i64,
    pub cost_per_km: Option<f64>,
    pub cost_per_month: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelStats {
    pub vehicle_id: i64,
    pub label: String,
    pub total_liters: f64,
    pub distance_km: i64,
    pub avg_l_100km: Option<f64>,
}

/// Per-vehicle cost for one day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyVehicleCost {
    pub date: NaiveDate,
    pub vehicle_id: i64,
    pub label: String,
    pub service_cost: f64,
    pub fuel_cost: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleCost {
    pub vehicle_id: i64,
    pub label: String,
    pub total_cost: f64,
}

#[derive(Default)]
struct DayBucket {
    service: f64,
    fuel: f64,
}

/// Compute all statistics.
///
/// `since` limits the per-day series (`by_day`, `daily_vehicle_costs`,
/// `vehicle_costs`). TCO and fuel economy always cover the whole history.
pub fn compute_statistics(
    vehicles: &[Vehicle],
    entries: &[ServiceEntry],
    fuel: &[FuelLog],
    today: NaiveDate,
    since: Option<NaiveDate>,
) -> Statistics {
    let labels: BTreeMap<i64, String> = vehicles.iter().map(|v| (v.id, v.label())).collect();
    let label_of = |id: i64| labels.get(&id).cloned().unwrap_or_default();

    let daily_vehicle_costs = daily_breakdown(entries, fuel, since, &label_of);
    let by_day = combine_days(&daily_vehicle_costs);
    let vehicle_costs = sum_per_vehicle(&daily_vehicle_costs);

    Statistics {
        by_day,
        last_mileage: last_mileage(vehicles, entries),
        tco: tco(entries, fuel, today),
        fuel_stats: fuel_stats(vehicles, fuel),
        daily_vehicle_costs,
        vehicle_costs,
    }
}

fn daily_breakdown(
    entries: &[ServiceEntry],
    fuel: &[FuelLog],
    since: Option<NaiveDate>,
    label_of: &impl Fn(i64) -> String,
) -> Vec<DailyVehicleCost> {
    let in_range = |date: NaiveDate| since.map_or(true, |cutoff| date >= cutoff);
    let mut buckets: BTreeMap<(NaiveDate, i64), DayBucket> = BTreeMap::new();

    for entry in entries.iter().filter(|e| in_range(e.date)) {
        buckets
            .entry((entry.date, entry.vehicle_id))
            .or_default()
            .service += entry.cost.unwrap_or(0.0);
    }
    for log in fuel.iter().filter(|f| in_range(f.date)) {
        buckets
            .entry((log.date, log.vehicle_id))
            .or_default()
            .fuel += log.total_cost;
    }

    buckets
        .into_iter()
        .map(|((date, vehicle_id), bucket)| DailyVehicleCost {
            date,
            vehicle_id,
            label: label_of(vehicle_id),
            service_cost: bucket.service,
            fuel_cost: bucket.fuel,
            total_cost: bucket.service + bucket.fuel,
        })
        .collect()
}

fn combine_days(breakdown: &[DailyVehicleCost]) -> Vec<DayCost> {
    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in breakdown {
        *days.entry(row.date).or_default() += row.total_cost;
    }
    days.into_iter()
        .map(|(date, total_cost)| DayCost { date, total_cost })
        .collect()
}

fn sum_per_vehicle(breakdown: &[DailyVehicleCost]) -> Vec<VehicleCost> {
    let mut totals: BTreeMap<i64, (String, f64)> = BTreeMap::new();
    for row in breakdown {
        let slot = totals
            .entry(row.vehicle_id)
            .or_insert_with(|| (row.label.clone(), 0.0));
        slot.1 += row.total_cost;
    }
    let mut costs: Vec<VehicleCost> = totals
        .into_iter()
        .map(|(vehicle_id, (label, total_cost))| VehicleCost {
            vehicle_id,
            label,
            total_cost,
        })
        .collect();
    costs.sort_by(|a, b| a.label.cmp(&b.label).then(a.vehicle_id.cmp(&b.vehicle_id)));
    costs
}

fn last_mileage(vehicles: &[Vehicle], entries: &[ServiceEntry]) -> Vec<LastMileage> {
    let mut rows: Vec<LastMileage> = vehicles
        .iter()
        .map(|v| LastMileage {
            vehicle_id: v.id,
            label: v.label(),
            mileage: entries
                .iter()
                .filter(|e| e.vehicle_id == v.id)
                .filter_map(|e| e.mileage)
                .max()
                .unwrap_or(0),
        })
        .collect();
    rows.sort_by(|a, b| a.label.cmp(&b.label).then(a.vehicle_id.cmp(&b.vehicle_id)));
    rows
}

fn whole_months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() - from.year()) as i64 * 12 + (to.month() as i64 - from.month() as i64)
}

fn tco(entries: &[ServiceEntry], fuel: &[FuelLog], today: NaiveDate) -> Tco {
    let total_cost: f64 = entries.iter().map(|e| e.cost.unwrap_or(0.0)).sum::<f64>()
        + fuel.iter().map(|f| f.total_cost).sum::<f64>();

    // Mileage range is taken over the whole fleet, not per vehicle, so two
    // cars at 10k and 200k read as 190k km travelled.
    let mileages = entries.iter().filter_map(|e| e.mileage);
    let km = match (mileages.clone().min(), mileages.max()) {
        (Some(min), Some(max)) => (max - min).max(0),
        _ => 0,
    };

    let months = entries
        .iter()
        .map(|e| e.date)
        .min()
        .map_or(0, |first| whole_months_between(first, today).max(1));

    Tco {
        total_cost,
        months,
        km,
        cost_per_km: (km > 0).then(|| total_cost / km as f64),
        cost_per_month: (months > 0).then(|| total_cost / months as f64),
    }
}

fn fuel_stats(vehicles: &[Vehicle], fuel: &[FuelLog]) -> Vec<FuelStats> {
    let mut rows: Vec<FuelStats> = vehicles
        .iter()
        .map(|v| {
            let logs: Vec<&FuelLog> = fuel.iter().filter(|f| f.vehicle_id == v.id).collect();
            let total_liters: f64 = logs.iter().map(|f| f.liters).sum();
            let odometers = logs.iter().filter_map(|f| f.odometer);
            let distance_km = match (odometers.clone().min(), odometers.max()) {
                (Some(min), Some(max)) => (max - min).max(0),
                _ => 0,
            };
            let avg_l_100km = (total_liters > 0.0 && distance_km > 0)
                .then(|| total_liters * 100.0 / distance_km as f64);

            FuelStats {
                vehicle_id: v.id,
                label: v.label(),
                total_liters,
                distance_km,
                avg_l_100km,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.label.cmp(&b.label).then(a.vehicle_id.cmp(&b.vehicle_id)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn vehicle(id: i64, make: &str, model: &str) -> Vehicle {
        Vehicle {
            id,
            owner_id: 1,
            make: make.into(),
            model: model.into(),
            year: None,
            fuel: None,
            reg_plate: None,
            created_at: Utc::now(),
        }
    }

    fn entry(vehicle_id: i64, day: NaiveDate, mileage: Option<i64>, cost: Option<f64>) -> ServiceEntry {
        ServiceEntry {
            id: 0,
            vehicle_id,
            date: day,
            mileage,
            service_type: "Service".into(),
            description: None,
            cost,
            attachment: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn fill(vehicle_id: i64, day: NaiveDate, liters: f64, odometer: Option<i64>, cost: f64) -> FuelLog {
        FuelLog {
            id: 0,
            vehicle_id,
            date: day,
            liters,
            price_per_liter: 0.0,
            total_cost: cost,
            odometer,
            full_tank: true,
            created_at: Utc::now(),
        }
    }

    fn fixture() -> (Vec<Vehicle>, Vec<ServiceEntry>, Vec<FuelLog>) {
        let vehicles = vec![vehicle(1, "Skoda", "Octavia"), vehicle(2, "Audi", "A4")];
        let entries = vec![
            entry(1, date(2024, 1, 10), Some(100_000), Some(500.0)),
            entry(1, date(2024, 3, 5), Some(110_000), None),
            entry(2, date(2024, 3, 5), Some(20_000), Some(250.0)),
        ];
        let fuel = vec![
            fill(1, date(2024, 2, 1), 40.0, Some(10_000), 240.0),
            fill(1, date(2024, 3, 5), 38.0, Some(10_500), 228.0),
            fill(1, date(2024, 4, 1), 35.0, Some(11_200), 210.0),
        ];
        (vehicles, entries, fuel)
    }

    #[test]
    fn test_statistics_are_idempotent() {
        let (vehicles, entries, fuel) = fixture();
        let today = date(2024, 6, 1);
        let first = serde_json::to_string(&compute_statistics(&vehicles, &entries, &fuel, today, None)).unwrap();
        let second = serde_json::to_string(&compute_statistics(&vehicles, &entries, &fuel, today, None)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_by_day_sums_to_tco() {
        let (vehicles, entries, fuel) = fixture();
        let stats = compute_statistics(&vehicles, &entries, &fuel, date(2024, 6, 1), None);
        let by_day_total: f64 = stats.by_day.iter().map(|d| d.total_cost).sum();
        assert!((by_day_total - stats.tco.total_cost).abs() < 1e-9);
        assert!((stats.tco.total_cost - 1428.0).abs() < 1e-9);

        let vehicle_total: f64 = stats.vehicle_costs.iter().map(|v| v.total_cost).sum();
        assert!((vehicle_total - stats.tco.total_cost).abs() < 1e-9);
    }

    #[test]
    fn test_by_day_ordering_and_fuel_only_days() {
        let (vehicles, entries, fuel) = fixture();
        let stats = compute_statistics(&vehicles, &entries, &fuel, date(2024, 6, 1), None);
        let days: Vec<NaiveDate> = stats.by_day.iter().map(|d| d.date).collect();
        assert_eq!(
            days,
            vec![date(2024, 1, 10), date(2024, 2, 1), date(2024, 3, 5), date(2024, 4, 1)]
        );
        // 2024-03-05: null service cost + 250 service + 228 fuel
        assert_eq!(stats.by_day[2].total_cost, 478.0);
    }

    #[test]
    fn test_null_cost_day_still_listed() {
        let vehicles = vec![vehicle(1, "Fiat", "Panda")];
        let entries = vec![entry(1, date(2024, 5, 1), None, None)];
        let stats = compute_statistics(&vehicles, &entries, &[], date(2024, 6, 1), None);
        assert_eq!(stats.by_day.len(), 1);
        assert_eq!(stats.by_day[0].total_cost, 0.0);
    }

    #[test]
    fn test_fuel_economy() {
        let (vehicles, entries, fuel) = fixture();
        let stats = compute_statistics(&vehicles, &entries, &fuel, date(2024, 6, 1), None);
        let skoda = stats.fuel_stats.iter().find(|f| f.vehicle_id == 1).unwrap();
        assert_eq!(skoda.distance_km, 1200);
        assert_eq!(skoda.total_liters, 113.0);
        assert!((skoda.avg_l_100km.unwrap() - 9.4167).abs() < 1e-4);

        let audi = stats.fuel_stats.iter().find(|f| f.vehicle_id == 2).unwrap();
        assert_eq!(audi.total_liters, 0.0);
        assert_eq!(audi.avg_l_100km, None);
    }

    #[test]
    fn test_tco_km_spans_whole_fleet() {
        let (vehicles, entries, fuel) = fixture();
        let stats = compute_statistics(&vehicles, &entries, &fuel, date(2024, 6, 1), None);
        // min across both cars is the Audi's 20k, max is the Skoda's 110k
        assert_eq!(stats.tco.km, 90_000);
        assert_eq!(stats.tco.months, 5);
        assert!((stats.tco.cost_per_month.unwrap() - 1428.0 / 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_service_entries() {
        let vehicles = vec![vehicle(1, "Fiat", "Panda")];
        let fuel = vec![fill(1, date(2024, 5, 1), 30.0, None, 180.0)];
        let stats = compute_statistics(&vehicles, &[], &fuel, date(2024, 6, 1), None);
        assert_eq!(stats.tco.months, 0);
        assert_eq!(stats.tco.cost_per_month, None);
        assert_eq!(stats.tco.km, 0);
        assert_eq!(stats.tco.cost_per_km, None);
        assert_eq!(stats.tco.total_cost, 180.0);
        assert_eq!(stats.last_mileage[0].mileage, 0);
    }

    #[test]
    fn test_months_is_at_least_one() {
        let vehicles = vec![vehicle(1, "Fiat", "Panda")];
        let entries = vec![entry(1, date(2024, 6, 1), None, Some(100.0))];
        let stats = compute_statistics(&vehicles, &entries, &[], date(2024, 6, 20), None);
        assert_eq!(stats.tco.months, 1);
    }

    #[test]
    fn test_since_cutoff_limits_series_only() {
        let (vehicles, entries, fuel) = fixture();
        let stats = compute_statistics(&vehicles, &entries, &fuel, date(2024, 6, 1), Some(date(2024, 3, 1)));
        assert_eq!(stats.by_day.first().map(|d| d.date), Some(date(2024, 3, 5)));
        assert!((stats.tco.total_cost - 1428.0).abs() < 1e-9);

        let skoda = stats.vehicle_costs.iter().find(|v| v.vehicle_id == 1).unwrap();
        assert_eq!(skoda.total_cost, 228.0 + 210.0);
    }

    #[test]
    fn test_last_mileage_ordered_by_label() {
        let (vehicles, entries, fuel) = fixture();
        let stats = compute_statistics(&vehicles, &entries, &fuel, date(2024, 6, 1), None);
        let labels: Vec<&str> = stats.last_mileage.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Audi A4", "Skoda Octavia"]);
        assert_eq!(stats.last_mileage[1].mileage, 110_000);
    }
}
