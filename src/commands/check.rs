use std::path::Path;

use colored::Colorize;

use crate::error::Result;
use crate::introspect::MigrationInfo;
use crate::migrator::Migrator;
use crate::output::{Format, print_json, version_list};
use crate::store::files::DataStore;

pub fn run(path: &Path, format: Format) -> Result<()> {
    let document = DataStore::open(path)?.read()?;
    let info = Migrator::builtin().migration_info(&document)?;
    print_info(&info, format)
}

fn print_info(info: &MigrationInfo, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(info)?,
        Format::Pretty => {
            let status = if info.needs_migration {
                "needs migration".yellow().bold()
            } else {
                "up to date".green().bold()
            };
            println!("{status}");
            println!("  {} {}", "current:".dimmed(), info.current_version);
            println!("  {} {}", "target:".dimmed(), info.target_version);
            println!("  {} {}", "pending:".dimmed(), version_list(&info.pending));
        }
        Format::Minimal => {
            println!(
                "current={} target={} needs_migration={} pending={}",
                info.current_version,
                info.target_version,
                info.needs_migration,
                info.pending.len()
            );
        }
    }

    Ok(())
}
