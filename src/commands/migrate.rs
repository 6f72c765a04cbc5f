use std::path::Path;

use colored::Colorize;

use crate::error::Result;
use crate::migrator::Migrator;
use crate::output::{Format, print_json, version_list};
use crate::store::files::DataStore;
use crate::store::migration::{FileMigrationOptions, FileMigrationSummary, migrate_file};

pub fn run(
    path: &Path,
    target: Option<&str>,
    dry_run: bool,
    backup: bool,
    format: Format,
) -> Result<()> {
    let store = DataStore::open(path)?;
    let options = FileMigrationOptions {
        target,
        dry_run,
        backup,
    };
    let (_, summary) = migrate_file(&store, &Migrator::builtin(), options)?;
    print_summary(&summary, format)
}

fn print_summary(summary: &FileMigrationSummary, format: Format) -> Result<()> {
    let report = &summary.report;

    match format {
        Format::Json => print_json(summary)?,
        Format::Pretty => {
            let mode = if summary.dry_run { "dry-run" } else { "apply" };
            println!(
                "{} {}",
                "migrate".bold(),
                format!("({mode})").dimmed()
            );
            println!("  {} {}", "file:".dimmed(), summary.path);
            println!(
                "  {} {} -> {}",
                "version:".dimmed(),
                report.from_version,
                report.to_version
            );
            println!("  {} {}", "steps:".dimmed(), version_list(&report.applied));

            if !report.changed() {
                println!("\n{}", "Already current; nothing to do.".green());
            } else if summary.written {
                println!("\n{}", "Migration applied".green().bold());
                if let Some(backup) = &summary.backup_path {
                    println!("  {} {}", "backup:".dimmed(), backup);
                }
            } else {
                println!("\n{}", "Migration validated; dry-run made no changes.".green());
            }
        }
        Format::Minimal => {
            println!(
                "from={} to={} steps={} written={} dry_run={}",
                report.from_version,
                report.to_version,
                report.applied.len(),
                summary.written,
                summary.dry_run
            );
        }
    }

    Ok(())
}
