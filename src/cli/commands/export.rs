//! Export command: database rows to `<dir>/<slug>.json`.

use colored::Colorize;

use crate::config::Settings;
use crate::error::Result;
use crate::storage::SqliteStorage;
use crate::sync::Exporter;

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or any dashboard fails
/// to export.
pub fn execute(settings: &Settings, json: bool, quiet: bool) -> Result<()> {
    let storage = SqliteStorage::open(&settings.db_path)?;
    let exporter = Exporter::new(&storage, settings.export_dir.clone());
    let stats = exporter.export()?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "database": settings.db_path.display().to_string(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }
    if quiet {
        return Ok(());
    }

    if stats.is_empty() {
        println!("No dashboards in {}.", settings.db_path.display());
        return Ok(());
    }

    for file in &stats.files {
        println!(
            "  {} {} {}",
            "✓".green(),
            file.path.display(),
            format!("({})", file.title).dimmed()
        );
    }
    println!();
    println!(
        "Exported {} dashboards to {}",
        stats.total(),
        exporter.output_dir().display()
    );
    Ok(())
}
