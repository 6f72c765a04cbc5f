use std::path::Path;

use colored::Colorize;
use serde_json::json;

use crate::error::{Error, Result, SchemaError, Violation};
use crate::output::Format;
use crate::schema;
use crate::store::files::DataStore;

/// Check a data file against the current schema without migrating it.
pub fn run(path: &Path, format: Format) -> Result<()> {
    let document = DataStore::open(path)?.read()?;
    let violations = schema::check(&document);

    print_violations(path, &violations, format)?;

    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::Schema(SchemaError { violations }))
    }
}

fn print_violations(path: &Path, violations: &[Violation], format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let items: Vec<_> = violations
                .iter()
                .map(|v| json!({"path": v.path, "message": v.message}))
                .collect();
            println!(
                "{}",
                serde_json::to_string(&json!({
                    "path": path.display().to_string(),
                    "valid": violations.is_empty(),
                    "violations": items,
                }))?
            );
        }
        Format::Pretty => {
            if violations.is_empty() {
                println!("{} {}", " ok ".green(), path.display());
            } else {
                println!(
                    "{} {} ({} violations)",
                    " ERR".red().bold(),
                    path.display(),
                    violations.len()
                );
                for violation in violations {
                    println!("  - {}: {}", violation.path.dimmed(), violation.message.red());
                }
            }
        }
        Format::Minimal => {
            println!(
                "valid={} violations={}",
                violations.is_empty(),
                violations.len()
            );
        }
    }

    Ok(())
}
