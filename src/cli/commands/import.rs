//! Import command: JSON files back into the database.

use colored::Colorize;

use crate::config::Settings;
use crate::error::Result;
use crate::storage::SqliteStorage;
use crate::sync::{BackupManager, ImportSummary, Importer, ItemOutcome, ItemStatus};

/// Execute the import command.
///
/// The database bytes are captured for the run backup before the connection
/// is opened.
///
/// # Errors
///
/// Returns the first error the import hits. Dashboards updated before it stay
/// updated; the run backup path is logged when one was written.
pub fn execute(settings: &Settings, items: &[String], json: bool, quiet: bool) -> Result<()> {
    let backup = BackupManager::capture(&settings.db_path)?;
    let storage = SqliteStorage::open(&settings.db_path)?;
    let mut importer = Importer::new(&storage, backup);

    let summary = match importer.import(settings.mode, items) {
        Ok(summary) => summary,
        Err(e) => {
            if let Some(path) = importer.backup_path() {
                tracing::warn!(backup = %path.display(), "Import aborted after changes, restore from backup if needed");
            }
            return Err(e);
        }
    };

    if json {
        let output = serde_json::json!({
            "success": true,
            "database": settings.db_path.display().to_string(),
            "summary": summary,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else if !quiet {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &ImportSummary) {
    for item in &summary.items {
        print_item(item);
    }
    if !summary.items.is_empty() {
        println!();
    }
    if let Some(backup) = &summary.backup {
        println!("Original db file backed up to {}", backup.display());
    }
    println!(
        "SQLite DB has {} dashboards, there were {} JSONs to import, imported {}",
        summary.database_records, summary.input_documents, summary.imported
    );
}

fn print_item(item: &ItemOutcome) {
    let path = item.path.display();
    match item.status {
        ItemStatus::Unchanged => {
            println!("  {} {} {}", "=".dimmed(), path, "unchanged".dimmed());
            print_sidecar(item);
        }
        ItemStatus::Skipped => {
            println!(
                "  {} {} {}",
                "!".yellow(),
                path,
                item.reason.as_deref().unwrap_or("skipped").yellow()
            );
        }
        ItemStatus::Updated => {
            println!("  {} {} (id {}, uid {})", "✓".green(), path, item.id, item.uid);
            if item.old_title != item.new_title {
                println!("      title: '{}' -> '{}'", item.old_title, item.new_title);
            }
            if item.old_slug != item.new_slug {
                println!("      slug:  '{}' -> '{}'", item.old_slug, item.new_slug);
            }
            if item.content_changed {
                println!("      data:  {} -> {} bytes", item.old_bytes, item.new_bytes);
            }
            if let Some(tags) = &item.tags {
                if !tags.insert.is_empty() {
                    println!("      tags:  +{}", tags.insert.join(",").green());
                }
                if !tags.delete.is_empty() {
                    println!("      tags:  -{}", tags.delete.join(",").red());
                }
            }
            print_sidecar(item);
        }
    }
}

fn print_sidecar(item: &ItemOutcome) {
    if let Some(sidecar) = &item.sidecar {
        println!("      {}", format!("previous JSON in {}", sidecar.display()).dimmed());
    }
}
