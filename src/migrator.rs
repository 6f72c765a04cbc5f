//! Staged, all-or-nothing migration of data-file documents.
//!
//! A [`Migrator`] walks the registry in ascending order from the first step
//! newer than the document's version, applies each transform to an owned
//! copy, stamps the step's version after it succeeds, and hands the result to
//! the schema validator. The caller's document is only ever borrowed, so any
//! failure leaves it exactly as it was and no intermediate state escapes.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::build_info::APP_VERSION;
use crate::error::{MigrationCause, MigrationError};
use crate::json::{kind_name, version_field};
use crate::migrations::{self, BASELINE_VERSION, MIGRATIONS, MigrationStep};
use crate::schema::{self, ValidatedDocument};
use crate::version;

#[derive(Debug, Clone, Copy)]
pub struct Migrator<'a> {
    steps: &'a [MigrationStep],
    app_version: &'a str,
    baseline: &'a str,
}

/// What a migration run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub from_version: String,
    pub to_version: String,
    pub applied: Vec<String>,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

impl Migrator<'static> {
    /// Migrator over the shipped registry, capped at this build's version.
    pub fn builtin() -> Self {
        Self::new(MIGRATIONS)
    }
}

impl Default for Migrator<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> Migrator<'a> {
    /// `steps` must already be strictly ascending by version.
    pub fn new(steps: &'a [MigrationStep]) -> Self {
        debug_assert!(
            migrations::is_strictly_ascending(steps),
            "migration steps must be strictly ascending"
        );
        Self {
            steps,
            app_version: APP_VERSION,
            baseline: BASELINE_VERSION,
        }
    }

    pub fn with_app_version(mut self, app_version: &'a str) -> Self {
        self.app_version = app_version;
        self
    }

    pub fn with_baseline(mut self, baseline: &'a str) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn steps(&self) -> &'a [MigrationStep] {
        self.steps
    }

    pub fn app_version(&self) -> &'a str {
        self.app_version
    }

    pub fn baseline(&self) -> &'a str {
        self.baseline
    }

    /// Newest registered step not above the application version.
    pub fn latest_available(&self) -> Option<&'a str> {
        migrations::latest_available(self.steps, self.app_version)
    }

    /// Version a default migration run aims for.
    pub fn target_version(&self) -> &'a str {
        self.latest_available().unwrap_or(self.app_version)
    }

    /// The document's own `version`, or the legacy baseline when it has none.
    pub fn current_version<'d>(&self, document: &'d Value) -> Result<&'d str, MigrationError>
    where
        'a: 'd,
    {
        input_object(document)?;
        Ok(version_field(document).unwrap_or(self.baseline))
    }

    /// Requested targets never exceed the default target.
    pub(crate) fn resolve_target<'r>(&self, requested: Option<&'r str>) -> &'r str
    where
        'a: 'r,
    {
        let default = self.target_version();
        match requested {
            Some(target) if version::less_than(target, default) => target,
            _ => default,
        }
    }

    pub fn migrate(&self, document: &Value) -> Result<ValidatedDocument, MigrationError> {
        self.migrate_to(document, None)
    }

    /// Migrate no further than `target` (clamped to the default target).
    pub fn migrate_to(
        &self,
        document: &Value,
        target: Option<&str>,
    ) -> Result<ValidatedDocument, MigrationError> {
        self.migrate_with_report(document, target)
            .map(|(validated, _)| validated)
    }

    pub fn migrate_with_report(
        &self,
        document: &Value,
        target: Option<&str>,
    ) -> Result<(ValidatedDocument, MigrationReport), MigrationError> {
        let original = input_object(document)?;
        let current = self.current_version(document)?;
        let target = self.resolve_target(target);
        let failed = |cause: MigrationCause| MigrationError::Failed {
            from_version: current.to_string(),
            cause,
        };

        let Some(start) = migrations::first_newer_than(self.steps, current) else {
            debug!(version = current, "no migration registered past document version");
            let validated = schema::validate(document.clone()).map_err(|err| {
                warn!(version = current, error = %err, "unmigrated document failed validation");
                failed(err.into())
            })?;
            return Ok((validated, unchanged_report(current)));
        };

        let mut working = original.clone();
        let mut applied = Vec::new();

        for step in &self.steps[start..] {
            if version::greater_than(step.version, target) {
                break;
            }

            let input = Value::Object(std::mem::take(&mut working));
            let output = (step.transform)(input).map_err(|source| {
                warn!(step = step.version, error = %source, "migration step failed");
                failed(MigrationCause::Step {
                    version: step.version.to_string(),
                    source,
                })
            })?;

            working = match output {
                Value::Object(next) => next,
                other => {
                    warn!(
                        step = step.version,
                        found = kind_name(&other),
                        "migration step returned a non-object"
                    );
                    return Err(failed(MigrationCause::NotAnObject {
                        version: step.version.to_string(),
                        found: kind_name(&other),
                    }));
                }
            };
            working.insert("version".into(), Value::String(step.version.to_string()));
            applied.push(step.version.to_string());
            debug!(step = step.version, "applied migration step");
        }

        let validated = schema::validate(Value::Object(working)).map_err(|err| {
            warn!(from = current, error = %err, "migrated document failed validation");
            failed(err.into())
        })?;

        let report = MigrationReport {
            from_version: current.to_string(),
            to_version: applied.last().cloned().unwrap_or_else(|| current.to_string()),
            applied,
        };
        if report.changed() {
            info!(
                from = %report.from_version,
                to = %report.to_version,
                steps = report.applied.len(),
                "migrated document"
            );
        }

        Ok((validated, report))
    }
}

fn input_object(document: &Value) -> Result<&Map<String, Value>, MigrationError> {
    document
        .as_object()
        .ok_or_else(|| MigrationError::InvalidInput(kind_name(document)))
}

fn unchanged_report(current: &str) -> MigrationReport {
    MigrationReport {
        from_version: current.to_string(),
        to_version: current.to_string(),
        applied: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use serde_json::json;

    fn add_marker(value: Value) -> Result<Value, TransformError> {
        let mut map = crate::json::into_object(value)?;
        let mut seen = map
            .get("seen")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        seen.push(map.get("version").cloned().unwrap_or(Value::Null));
        map.insert("seen".into(), Value::Array(seen));
        Ok(Value::Object(map))
    }

    const STEPS: &[MigrationStep] = &[
        MigrationStep::new("v1.0.0", add_marker),
        MigrationStep::new("v1.1.0", add_marker),
        MigrationStep::new("v2.0.0", add_marker),
    ];

    fn base() -> Value {
        json!({"tasks": [], "projects": [], "labels": []})
    }

    fn migrator() -> Migrator<'static> {
        Migrator::new(STEPS)
            .with_app_version("v9.0.0")
            .with_baseline("v0.1.0")
    }

    #[test]
    fn steps_observe_the_previous_stamp() {
        let (out, report) = migrator().migrate_with_report(&base(), None).unwrap();
        assert_eq!(
            out.as_value()["seen"],
            json!([null, "v1.0.0", "v1.1.0"])
        );
        assert_eq!(out.version(), Some("v2.0.0"));
        assert_eq!(report.applied, vec!["v1.0.0", "v1.1.0", "v2.0.0"]);
        assert_eq!(report.from_version, "v0.1.0");
    }

    #[test]
    fn resumes_after_document_version() {
        let mut doc = base();
        doc["version"] = json!("v1.0.0");
        let (_, report) = migrator().migrate_with_report(&doc, None).unwrap();
        assert_eq!(report.applied, vec!["v1.1.0", "v2.0.0"]);
    }

    #[test]
    fn explicit_target_stops_early() {
        let out = migrator().migrate_to(&base(), Some("v1.1.0")).unwrap();
        assert_eq!(out.version(), Some("v1.1.0"));
    }

    #[test]
    fn explicit_target_is_clamped_to_latest_available() {
        let capped = migrator().with_app_version("v1.5.0");
        assert_eq!(capped.resolve_target(Some("v5.0.0")), "v1.1.0");
        let out = capped.migrate_to(&base(), Some("v5.0.0")).unwrap();
        assert_eq!(out.version(), Some("v1.1.0"));
    }

    #[test]
    fn app_version_ceiling_skips_unreleased_steps() {
        let out = migrator()
            .with_app_version("v1.9.9")
            .migrate(&base())
            .unwrap();
        assert_eq!(out.version(), Some("v1.1.0"));
    }

    #[test]
    fn target_falls_back_to_app_version_for_empty_registry() {
        let empty = Migrator::new(&[]).with_app_version("v3.0.0");
        assert_eq!(empty.latest_available(), None);
        assert_eq!(empty.target_version(), "v3.0.0");
        assert_eq!(empty.migrate(&base()).unwrap().as_value(), &base());
    }

    #[test]
    fn target_below_current_runs_no_steps_but_validates() {
        let doc = json!({"version": "v1.0.0", "tasks": []});
        let err = migrator().migrate_to(&doc, Some("v0.5.0")).unwrap_err();
        assert!(matches!(
            err.cause(),
            Some(MigrationCause::Schema(_))
        ));
        assert_eq!(err.from_version(), Some("v1.0.0"));
    }

    #[test]
    fn non_string_version_falls_back_to_baseline() {
        let mut doc = base();
        doc["version"] = json!(2);
        assert_eq!(migrator().current_version(&doc).unwrap(), "v0.1.0");
    }

    #[test]
    fn current_version_rejects_non_objects() {
        assert!(matches!(
            migrator().current_version(&json!("v1")),
            Err(MigrationError::InvalidInput("string"))
        ));
    }
}
