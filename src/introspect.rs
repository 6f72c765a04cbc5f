//! Read-only questions about a document's migration state.

use serde::Serialize;
use serde_json::Value;

use crate::error::MigrationError;
use crate::migrations;
use crate::migrator::Migrator;
use crate::version;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationInfo {
    pub current_version: String,
    pub target_version: String,
    pub needs_migration: bool,
    /// Step versions a default run would apply, in order.
    pub pending: Vec<String>,
}

impl<'a> Migrator<'a> {
    /// True when a registered step newer than the document's version is
    /// available. Does not validate the document.
    pub fn needs_migration(&self, document: &Value) -> Result<bool, MigrationError> {
        let current = self.current_version(document)?;
        Ok(self
            .latest_available()
            .is_some_and(|latest| version::less_than(current, latest)))
    }

    pub fn migration_info(&self, document: &Value) -> Result<MigrationInfo, MigrationError> {
        let current = self.current_version(document)?;
        let target = self.target_version();

        Ok(MigrationInfo {
            current_version: current.to_string(),
            target_version: target.to_string(),
            needs_migration: self.needs_migration(document)?,
            pending: self
                .pending_steps(current, target)
                .map(|step| step.version.to_string())
                .collect(),
        })
    }

    fn pending_steps(
        &self,
        current: &str,
        target: &str,
    ) -> impl Iterator<Item = &'a migrations::MigrationStep> {
        let start = migrations::first_newer_than(self.steps(), current).unwrap_or(self.steps().len());
        let target = target.to_string();
        self.steps()[start..]
            .iter()
            .take_while(move |step| !version::greater_than(step.version, &target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::migrations::MigrationStep;
    use serde_json::json;

    fn identity(value: Value) -> Result<Value, TransformError> {
        Ok(value)
    }

    const STEPS: &[MigrationStep] = &[
        MigrationStep::new("v0.3.0", identity),
        MigrationStep::new("v0.4.0", identity),
        MigrationStep::new("v0.5.0", identity),
    ];

    fn migrator() -> Migrator<'static> {
        Migrator::new(STEPS).with_app_version("v0.4.7")
    }

    #[test]
    fn legacy_document_needs_migration() {
        let doc = json!({"tasks": "not validated here"});
        assert!(migrator().needs_migration(&doc).unwrap());

        let info = migrator().migration_info(&doc).unwrap();
        assert_eq!(
            info,
            MigrationInfo {
                current_version: "v0.2.0".into(),
                target_version: "v0.4.0".into(),
                needs_migration: true,
                pending: vec!["v0.3.0".into(), "v0.4.0".into()],
            }
        );
    }

    #[test]
    fn current_document_needs_nothing() {
        for version in ["v0.4.0", "v0.4", "v0.5.0"] {
            let doc = json!({"version": version});
            assert!(!migrator().needs_migration(&doc).unwrap(), "{version}");
            assert!(migrator().migration_info(&doc).unwrap().pending.is_empty());
        }
    }

    #[test]
    fn empty_registry_never_needs_migration() {
        let empty = Migrator::new(&[]).with_app_version("v1.0.0");
        let info = empty.migration_info(&json!({})).unwrap();
        assert!(!info.needs_migration);
        assert_eq!(info.target_version, "v1.0.0");
    }

    #[test]
    fn non_object_input_is_rejected() {
        assert!(matches!(
            migrator().needs_migration(&json!(null)),
            Err(MigrationError::InvalidInput("null"))
        ));
        assert!(migrator().migration_info(&json!([1])).is_err());
    }

    #[test]
    fn introspection_does_not_touch_the_document() {
        let doc = json!({"version": "v0.2.0", "ordering": {"projects": ["p"]}});
        let before = doc.clone();
        let _ = migrator().migration_info(&doc).unwrap();
        assert_eq!(doc, before);
    }
}
