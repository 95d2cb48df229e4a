//! Service schedule commands

use anyhow::Result;
use chrono::Local;
use garage_core::db::Database;
use garage_core::models::NewSchedule;

use super::resolve_user;

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn cmd_schedules_list(db: &Database, email: &str) -> Result<()> {
    let user = resolve_user(db, email)?;
    let schedules = db.list_schedules(user.id)?;

    if schedules.is_empty() {
        println!("No schedules found.");
        return Ok(());
    }

    let today = Local::now().date_naive();
    println!();
    println!("🔧 Service Schedules");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:>4}  {:<24} {:>8} {:>9}  {:<12} {:>10}",
        "ID", "Kind", "Months", "Km", "Next date", "Next km"
    );
    for s in schedules {
        let overdue = s.next_due_date.is_some_and(|d| d <= today);
        println!(
            "   {:>4}  {:<24} {:>8} {:>9}  {:<12} {:>10}{}",
            s.id,
            super::truncate(&s.kind, 24),
            or_dash(s.interval_months),
            or_dash(s.interval_km),
            or_dash(s.next_due_date),
            or_dash(s.next_due_mileage),
            if overdue { "  ⚠️  due" } else { "" }
        );
    }

    Ok(())
}

pub fn cmd_schedules_add(db: &Database, email: &str, input: &NewSchedule) -> Result<()> {
    let user = resolve_user(db, email)?;
    let schedule = db.create_schedule(user.id, input)?;

    println!("✅ Added schedule \"{}\" (id {})", schedule.kind, schedule.id);
    match (schedule.next_due_date, schedule.next_due_mileage) {
        (None, None) => println!("   Next due: unknown (add a last service date or mileage)"),
        (date, mileage) => println!(
            "   Next due: {} / {} km",
            or_dash(date),
            or_dash(mileage)
        ),
    }
    Ok(())
}
