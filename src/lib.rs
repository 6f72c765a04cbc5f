//! Versioned migration of task data files.
//!
//! A data file of any historical shape is upgraded one registered step at a
//! time by [`Migrator`], then checked by [`schema::validate`] before anything
//! else may use it. Failures are all-or-nothing: the caller's document is
//! never modified and no partially migrated document is returned.

pub mod build_info;
pub mod commands;
pub mod error;
pub mod introspect;
pub mod json;
pub mod migrations;
pub mod migrator;
pub mod model;
pub mod output;
pub mod schema;
pub mod store;
pub mod version;

pub use error::{Error, MigrationCause, MigrationError, Result, SchemaError, TransformError};
pub use introspect::MigrationInfo;
pub use migrations::{MIGRATIONS, MigrationStep};
pub use migrator::{MigrationReport, Migrator};
pub use schema::ValidatedDocument;
