use serde::Serialize;

use crate::error::Result;
use crate::migrator::{MigrationReport, Migrator};
use crate::schema::ValidatedDocument;
use crate::store::files::DataStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct FileMigrationOptions<'t> {
    pub target: Option<&'t str>,
    pub dry_run: bool,
    pub backup: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileMigrationSummary {
    pub path: String,
    pub dry_run: bool,
    pub written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
    #[serde(flatten)]
    pub report: MigrationReport,
}

/// Lock, read, migrate and (unless dry-running or already current) rewrite a
/// data file. The file on disk is only replaced after the whole migration,
/// including schema validation, has succeeded.
pub fn migrate_file(
    store: &DataStore,
    migrator: &Migrator<'_>,
    options: FileMigrationOptions<'_>,
) -> Result<(ValidatedDocument, FileMigrationSummary)> {
    let lock = store.lock()?;

    let document = store.read()?;
    let (validated, report) = migrator.migrate_with_report(&document, options.target)?;

    let mut written = false;
    let mut backup_path = None;
    if report.changed() && !options.dry_run {
        let tag = options.backup.then_some(report.from_version.as_str());
        backup_path = store
            .replace(validated.as_value(), tag)?
            .map(|p| p.display().to_string());
        written = true;
    }

    lock.release()?;

    Ok((
        validated,
        FileMigrationSummary {
            path: store.path().display().to_string(),
            dry_run: options.dry_run,
            written,
            backup_path,
            report,
        },
    ))
}
