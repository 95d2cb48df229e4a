//! Reminder commands

use anyhow::Result;
use chrono::Local;
use garage_core::db::Database;

use super::resolve_user;

pub fn cmd_reminders_list(db: &Database, email: &str) -> Result<()> {
    let user = resolve_user(db, email)?;
    let reminders = db.list_reminders(user.id, Local::now().date_naive())?;

    if reminders.is_empty() {
        println!("✅ No reminders.");
        return Ok(());
    }

    println!();
    println!("⏰ Reminders");
    println!("   ─────────────────────────────────────────────");
    for view in reminders {
        let r = &view.reminder;
        let icon = if r.completed_at.is_some() {
            "✔️ "
        } else if view.is_due {
            "⚠️ "
        } else {
            "  "
        };
        let due = match (r.due_date, r.due_mileage) {
            (Some(d), Some(km)) => format!("{} or {} km", d, km),
            (Some(d), None) => d.to_string(),
            (None, Some(km)) => format!("{} km", km),
            (None, None) => "no due date".to_string(),
        };
        println!("   {} {:>4}  {} ({})", icon, r.id, r.title, due);
    }

    Ok(())
}
