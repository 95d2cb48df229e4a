//! Vehicle commands

use anyhow::Result;
use garage_core::db::Database;
use garage_core::models::NewVehicle;

use super::resolve_user;

pub fn cmd_vehicles_list(db: &Database, email: &str) -> Result<()> {
    let user = resolve_user(db, email)?;
    let vehicles = db.list_vehicles(user.id)?;

    if vehicles.is_empty() {
        println!("No vehicles found. Add one with:");
        println!("  garage vehicles --user {} add --make Toyota --model Corolla", email);
        return Ok(());
    }

    println!();
    println!("🚗 Vehicles");
    println!("   ─────────────────────────────────────────────");
    for vehicle in vehicles {
        let year = vehicle
            .year
            .map(|y| format!(" ({})", y))
            .unwrap_or_default();
        let fuel = vehicle
            .fuel
            .as_deref()
            .map(|f| format!(" - {}", f))
            .unwrap_or_default();
        println!("   {:>4}  {}{}{}", vehicle.id, vehicle.label(), year, fuel);
    }

    Ok(())
}

pub fn cmd_vehicles_add(db: &Database, email: &str, input: &NewVehicle) -> Result<()> {
    let user = resolve_user(db, email)?;
    let vehicle = db.create_vehicle(user.id, input)?;
    println!("✅ Added {} (id {})", vehicle.label(), vehicle.id);
    Ok(())
}
