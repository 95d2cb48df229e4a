//! Domain models for Garage

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::patch::{lenient, Patch};

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Registration input
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

// ========== Vehicles ==========

/// A vehicle owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub owner_id: i64,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    /// Fuel type as entered (e.g. "Diesel", "LPG+petrol")
    pub fuel: Option<String>,
    pub reg_plate: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    /// Display label used in statistics: make, model and plate
    pub fn label(&self) -> String {
        vehicle_label(&self.make, &self.model, self.reg_plate.as_deref())
    }
}

/// Build the "make model plate" label, skipping empty parts
pub fn vehicle_label(make: &str, model: &str, reg_plate: Option<&str>) -> String {
    [make, model, reg_plate.unwrap_or("")]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// New vehicle for creation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVehicle {
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    pub year: Option<i32>,
    pub fuel: Option<String>,
    pub reg_plate: Option<String>,
}

// ========== Service entries ==========

/// A service or repair performed on a vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub id: i64,
    pub vehicle_id: i64,
    pub date: NaiveDate,
    pub mileage: Option<i64>,
    pub service_type: String,
    pub description: Option<String>,
    pub cost: Option<f64>,
    /// Stored attachment file name (relative to the uploads directory)
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// New service entry for creation
#[derive(Debug, Clone, Default)]
pub struct NewServiceEntry {
    pub vehicle_id: Option<i64>,
    /// Defaults to today when not given
    pub date: Option<NaiveDate>,
    pub mileage: Option<i64>,
    pub service_type: String,
    pub description: Option<String>,
    pub cost: Option<f64>,
    pub attachment: Option<String>,
}

/// Partial update of a service entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceEntryPatch {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub mileage: Patch<i64>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub cost: Patch<f64>,
}

impl ServiceEntryPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.mileage.is_missing()
            && self.service_type.is_none()
            && self.description.is_missing()
            && self.cost.is_missing()
    }
}

/// Filters for listing service entries
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub vehicle_id: Option<i64>,
    /// Case-insensitive substring match on service type or description
    pub query: Option<String>,
}

// ========== Reminders ==========

/// A user reminder, optionally tied to a vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub owner_id: i64,
    pub vehicle_id: Option<i64>,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub due_mileage: Option<i64>,
    /// Stored only; no notification is ever sent
    pub notify_email: bool,
    pub notify_before_days: i64,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A reminder as listed, with its read-time due flag
#[derive(Debug, Clone, Serialize)]
pub struct ReminderView {
    #[serde(flatten)]
    pub reminder: Reminder,
    pub is_due: bool,
}

/// New reminder for creation
#[derive(Debug, Clone, Deserialize)]
pub struct NewReminder {
    pub vehicle_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub due_mileage: Option<i64>,
    #[serde(default)]
    pub notify_email: bool,
    #[serde(default = "default_notify_before_days")]
    pub notify_before_days: i64,
}

fn default_notify_before_days() -> i64 {
    7
}

impl Default for NewReminder {
    fn default() -> Self {
        Self {
            vehicle_id: None,
            title: String::new(),
            due_date: None,
            due_mileage: None,
            notify_email: false,
            notify_before_days: default_notify_before_days(),
        }
    }
}

/// Partial update of a reminder
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReminderPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub due_date: Patch<NaiveDate>,
    #[serde(default)]
    pub due_mileage: Patch<i64>,
    #[serde(default)]
    pub notify_email: Option<bool>,
    #[serde(default)]
    pub notify_before_days: Option<i64>,
    #[serde(default)]
    pub completed_at: Patch<DateTime<Utc>>,
}

impl ReminderPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.due_date.is_missing()
            && self.due_mileage.is_missing()
            && self.notify_email.is_none()
            && self.notify_before_days.is_none()
            && self.completed_at.is_missing()
    }
}

// ========== Service schedules ==========

/// A recurring service definition with derived next-due point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSchedule {
    pub id: i64,
    pub owner_id: i64,
    pub vehicle_id: Option<i64>,
    /// Label such as "Oil change"
    pub kind: String,
    pub interval_months: Option<i64>,
    pub interval_km: Option<i64>,
    pub last_service_date: Option<NaiveDate>,
    pub last_service_mileage: Option<i64>,
    pub next_due_date: Option<NaiveDate>,
    pub next_due_mileage: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// New schedule for creation
///
/// Numeric and date fields are parsed leniently: malformed values mean
/// "not provided".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSchedule {
    pub vehicle_id: Option<i64>,
    #[serde(default)]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub interval_months: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub interval_km: Option<i64>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub last_service_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub last_service_mileage: Option<i64>,
    /// Explicit override of the derived due date
    #[serde(default, deserialize_with = "lenient::date")]
    pub next_due_date: Option<NaiveDate>,
    /// Explicit override of the derived due mileage
    #[serde(default, deserialize_with = "lenient::int")]
    pub next_due_mileage: Option<i64>,
}

/// Partial update of a schedule
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchedulePatch {
    #[serde(default, deserialize_with = "lenient::int_patch")]
    pub vehicle_id: Patch<i64>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::int_patch")]
    pub interval_months: Patch<i64>,
    #[serde(default, deserialize_with = "lenient::int_patch")]
    pub interval_km: Patch<i64>,
    #[serde(default, deserialize_with = "lenient::date_patch")]
    pub last_service_date: Patch<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::int_patch")]
    pub last_service_mileage: Patch<i64>,
    #[serde(default, deserialize_with = "lenient::date_patch")]
    pub next_due_date: Patch<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::int_patch")]
    pub next_due_mileage: Patch<i64>,
}

impl SchedulePatch {
    pub fn is_empty(&self) -> bool {
        self.vehicle_id.is_missing()
            && self.kind.is_none()
            && self.interval_months.is_missing()
            && self.interval_km.is_missing()
            && self.last_service_date.is_missing()
            && self.last_service_mileage.is_missing()
            && self.next_due_date.is_missing()
            && self.next_due_mileage.is_missing()
    }
}

// ========== Fuel ==========

/// One fill-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelLog {
    pub id: i64,
    pub vehicle_id: i64,
    pub date: NaiveDate,
    pub liters: f64,
    pub price_per_liter: f64,
    pub total_cost: f64,
    pub odometer: Option<i64>,
    pub full_tank: bool,
    pub created_at: DateTime<Utc>,
}

/// New fill-up for creation
#[derive(Debug, Clone, Deserialize)]
pub struct NewFuelLog {
    pub vehicle_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub liters: Option<f64>,
    #[serde(default)]
    pub price_per_liter: f64,
    /// Defaults to `liters * price_per_liter`
    pub total_cost: Option<f64>,
    pub odometer: Option<i64>,
    #[serde(default = "default_full_tank")]
    pub full_tank: bool,
}

fn default_full_tank() -> bool {
    true
}

// ========== Trips ==========

/// A journey made with a vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub vehicle_id: i64,
    pub date: NaiveDate,
    pub distance_km: f64,
    pub start_odometer: Option<i64>,
    pub end_odometer: Option<i64>,
    pub purpose: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New trip for creation
#[derive(Debug, Clone, Deserialize)]
pub struct NewTrip {
    pub vehicle_id: Option<i64>,
    pub date: Option<NaiveDate>,
    /// Defaults to the odometer delta when both readings are given
    pub distance_km: Option<f64>,
    pub start_odometer: Option<i64>,
    pub end_odometer: Option<i64>,
    pub purpose: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_label_skips_empty_parts() {
        assert_eq!(vehicle_label("Skoda", "Octavia", Some("WX1234Y")), "Skoda Octavia WX1234Y");
        assert_eq!(vehicle_label("Skoda", "Octavia", None), "Skoda Octavia");
        assert_eq!(vehicle_label("Skoda", "Octavia", Some("  ")), "Skoda Octavia");
    }

    #[test]
    fn test_new_schedule_parses_leniently() {
        let body: NewSchedule = serde_json::from_str(
            r#"{"kind": "Oil", "interval_km": "15000", "interval_months": "often",
                "last_service_date": "not a date", "last_service_mileage": 50000}"#,
        )
        .unwrap();
        assert_eq!(body.interval_km, Some(15000));
        assert_eq!(body.interval_months, None);
        assert_eq!(body.last_service_date, None);
        assert_eq!(body.last_service_mileage, Some(50000));
    }

    #[test]
    fn test_reminder_view_flattens() {
        let view = ReminderView {
            reminder: Reminder {
                id: 1,
                owner_id: 1,
                vehicle_id: None,
                title: "Insurance".into(),
                due_date: NaiveDate::from_ymd_opt(2024, 5, 1),
                due_mileage: None,
                notify_email: false,
                notify_before_days: 7,
                created_at: Utc::now(),
                completed_at: None,
            },
            is_due: true,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["title"], "Insurance");
        assert_eq!(json["due_date"], "2024-05-01");
        assert_eq!(json["is_due"], true);
    }

    #[test]
    fn test_empty_patches() {
        assert!(SchedulePatch::default().is_empty());
        assert!(ReminderPatch::default().is_empty());
        assert!(ServiceEntryPatch::default().is_empty());

        let patch: SchedulePatch = serde_json::from_str(r#"{"interval_km": 10000}"#).unwrap();
        assert!(!patch.is_empty());
    }
}
