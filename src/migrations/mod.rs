//! Registry of shipped data-file migrations.
//!
//! Each step upgrades a document to exactly the version it is registered
//! under. Entries are listed in ascending version order and are never
//! re-sorted at runtime. Once a version has been released its transform must
//! not change: fix forward with a new step instead.

use serde_json::Value;

use crate::error::TransformError;
use crate::version;

mod v0_3_0;
mod v0_3_1;
mod v0_4_0;

/// Pure function from one document shape to the next.
pub type Transform = fn(Value) -> Result<Value, TransformError>;

#[derive(Debug, Clone, Copy)]
pub struct MigrationStep {
    pub version: &'static str,
    pub transform: Transform,
}

impl MigrationStep {
    pub const fn new(version: &'static str, transform: Transform) -> Self {
        Self { version, transform }
    }
}

/// Version assumed for documents written before the `version` field existed.
pub const BASELINE_VERSION: &str = "v0.2.0";

pub static MIGRATIONS: &[MigrationStep] = &[
    MigrationStep::new("v0.3.0", v0_3_0::migrate),
    MigrationStep::new("v0.3.1", v0_3_1::migrate),
    MigrationStep::new("v0.4.0", v0_4_0::migrate),
];

/// Newest registered version not above `ceiling`.
///
/// Stops at the first step past the ceiling; the list is sorted, so nothing
/// after it can qualify.
pub fn latest_available<'a>(steps: &'a [MigrationStep], ceiling: &str) -> Option<&'a str> {
    let mut latest = None;
    for step in steps {
        if version::greater_than(step.version, ceiling) {
            break;
        }
        latest = Some(step.version);
    }
    latest
}

/// Index of the first step strictly newer than `current`.
pub fn first_newer_than(steps: &[MigrationStep], current: &str) -> Option<usize> {
    steps
        .iter()
        .position(|step| version::greater_than(step.version, current))
}

/// True when versions strictly ascend with no duplicates.
pub fn is_strictly_ascending(steps: &[MigrationStep]) -> bool {
    steps
        .windows(2)
        .all(|pair| version::less_than(pair[0].version, pair[1].version))
}
