use std::fmt;

use thiserror::Error;

/// Failure raised by a registered migration transform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransformError(pub String);

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// One violated schema constraint, addressed by a JSON-pointer-like path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("document failed schema validation: {}", join_violations(.violations))]
pub struct SchemaError {
    pub violations: Vec<Violation>,
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Why a migration run was abandoned.
#[derive(Debug, Error)]
pub enum MigrationCause {
    #[error("migration {version} failed: {source}")]
    Step {
        version: String,
        #[source]
        source: TransformError,
    },

    #[error("migration {version} returned {found}, expected an object")]
    NotAnObject { version: String, found: &'static str },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Outward-facing engine error. Every failure after input validation is
/// collapsed into `Failed`, carrying the version the document started at.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("data must be a JSON object, got {0}")]
    InvalidInput(&'static str),

    #[error("failed to migrate data from {from_version}: {cause}")]
    Failed {
        from_version: String,
        #[source]
        cause: MigrationCause,
    },
}

impl MigrationError {
    pub fn from_version(&self) -> Option<&str> {
        match self {
            Self::InvalidInput(_) => None,
            Self::Failed { from_version, .. } => Some(from_version),
        }
    }

    pub fn cause(&self) -> Option<&MigrationCause> {
        match self {
            Self::InvalidInput(_) => None,
            Self::Failed { cause, .. } => Some(cause),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("data file '{0}' not found")]
    FileNotFound(String),

    #[error("locked by another process: {0}")]
    Locked(String),

    #[error("atomic write failed: {0}")]
    Swap(String),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileNotFound(_) => "file_not_found",
            Self::Locked(_) => "locked",
            Self::Swap(_) => "swap_failed",
            Self::Migration(MigrationError::InvalidInput(_)) => "invalid_input",
            Self::Migration(MigrationError::Failed { cause, .. }) => match cause {
                MigrationCause::Schema(_) => "schema_invalid",
                MigrationCause::Step { .. } | MigrationCause::NotAnObject { .. } => {
                    "migration_failed"
                }
            },
            Self::Schema(_) => "schema_invalid",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
