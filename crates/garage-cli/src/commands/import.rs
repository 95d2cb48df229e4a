//! CSV export and import commands

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use garage_core::db::Database;

use super::resolve_user;

pub fn cmd_export(db: &Database, email: &str, output: Option<PathBuf>) -> Result<()> {
    let user = resolve_user(db, email)?;
    let csv = db.export_entries_csv(user.id)?;
    let rows = csv.lines().count().saturating_sub(1);

    match output {
        Some(path) => {
            let mut file = File::create(&path)
                .with_context(|| format!("Failed to create file: {}", path.display()))?;
            file.write_all(csv.as_bytes())?;
            eprintln!("📤 Exported {} entries to {}", rows, path.display());
        }
        None => {
            print!("{}", csv);
        }
    }

    Ok(())
}

pub fn cmd_import(db: &Database, email: &str, file: &Path) -> Result<()> {
    let user = resolve_user(db, email)?;
    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;

    println!("📥 Importing service entries from {}...", file.display());
    let stats = db.import_entries_csv(user.id, BufReader::new(csv_file))?;

    println!("✅ Imported: {}", stats.imported);
    if stats.skipped > 0 {
        println!("   ⚠️  Skipped: {} (invalid rows or unknown vehicles)", stats.skipped);
    }
    Ok(())
}
