//! Statistics command

use anyhow::Result;
use chrono::Local;
use garage_core::db::Database;

use super::{parse_date_arg, resolve_user};

fn money(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

pub fn cmd_stats(db: &Database, email: &str, since: Option<&str>, json: bool) -> Result<()> {
    let user = resolve_user(db, email)?;
    let since = parse_date_arg(since, "--since")?;
    let stats = db.statistics(user.id, Local::now().date_naive(), since)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!("📊 Statistics");
    if let Some(since) = since {
        println!("   Since {}", since);
    }
    println!("   ─────────────────────────────────────────────");
    println!("   Total cost:      {:.2}", stats.tco.total_cost);
    println!("   Months covered:  {}", stats.tco.months);
    println!("   Distance:        {} km", stats.tco.km);
    println!("   Cost per km:     {}", money(stats.tco.cost_per_km));
    println!("   Cost per month:  {}", money(stats.tco.cost_per_month));

    if !stats.vehicle_costs.is_empty() {
        println!();
        println!("   💸 By vehicle");
        for v in &stats.vehicle_costs {
            println!("      {:<30} {:>10.2}", v.label, v.total_cost);
        }
    }

    if !stats.last_mileage.is_empty() {
        println!();
        println!("   🛣️  Last recorded mileage");
        for m in &stats.last_mileage {
            println!("      {:<30} {:>10} km", m.label, m.mileage);
        }
    }

    if !stats.fuel_stats.is_empty() {
        println!();
        println!("   ⛽ Fuel");
        for f in &stats.fuel_stats {
            let avg = f
                .avg_l_100km
                .map(|a| format!("{:.2} l/100km", a))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "      {:<30} {:>8.1} l over {} km ({})",
                f.label, f.total_liters, f.distance_km, avg
            );
        }
    }

    println!();
    Ok(())
}
