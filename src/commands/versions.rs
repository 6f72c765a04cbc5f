use colored::Colorize;
use serde::Serialize;

use crate::build_info;
use crate::error::Result;
use crate::migrator::Migrator;
use crate::output::{Format, print_json, version_list};

#[derive(Debug, Serialize)]
struct VersionsReport {
    app_version: &'static str,
    baseline_version: &'static str,
    latest_available: Option<&'static str>,
    migrations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    git_sha: Option<&'static str>,
}

pub fn run(format: Format) -> Result<()> {
    let migrator = Migrator::builtin();
    let report = VersionsReport {
        app_version: migrator.app_version(),
        baseline_version: migrator.baseline(),
        latest_available: migrator.latest_available(),
        migrations: migrator
            .steps()
            .iter()
            .map(|step| step.version.to_string())
            .collect(),
        git_sha: build_info::git_sha(),
    };

    match format {
        Format::Json => print_json(&report)?,
        Format::Pretty => {
            println!("{} {}", "taskdata".bold(), report.app_version);
            if let Some(sha) = report.git_sha {
                println!("  {} {}", "build:".dimmed(), sha);
            }
            println!("  {} {}", "baseline:".dimmed(), report.baseline_version);
            println!(
                "  {} {}",
                "latest migration:".dimmed(),
                report.latest_available.unwrap_or("-")
            );
            println!("  {} {}", "migrations:".dimmed(), version_list(&report.migrations));
        }
        Format::Minimal => {
            println!(
                "app={} baseline={} latest={} migrations={}",
                report.app_version,
                report.baseline_version,
                report.latest_available.unwrap_or("-"),
                report.migrations.len()
            );
        }
    }

    Ok(())
}
