//! Domain error types.

use super::models::ModelFamily;

/// Numerical failures raised while fitting or applying a regressor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("model has not been fitted yet")]
    NotFitted,

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("invalid alpha value: {0}")]
    InvalidAlpha(f64),

    #[error("matrix is not positive definite")]
    SingularMatrix,

    #[error("cannot fit on an empty design matrix")]
    EmptyInput,
}

/// Top-level error type for fxstudy.
#[derive(Debug, thiserror::Error)]
pub enum StudyError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to read dataset {path}: {reason}")]
    DataRead { path: String, reason: String },

    #[error("invalid value {value:?} in column {column} at row {row}")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("duplicate date {0} in dataset")]
    DuplicateDate(chrono::NaiveDate),

    #[error("column not found: {0}")]
    ColumnMissing(String),

    #[error("unknown feature {feature} in bag {bag}")]
    UnknownFeature { bag: String, feature: String },

    #[error("cannot draw {size} features from {available} candidates")]
    NotEnoughFeatures { size: usize, available: usize },

    #[error("insufficient rows: have {rows}, need at least {minimum}")]
    InsufficientRows { rows: usize, minimum: usize },

    #[error("{family} fit failed for bag {bag} in window {window}: {source}")]
    Model {
        bag: String,
        family: ModelFamily,
        window: usize,
        #[source]
        source: ModelError,
    },

    #[error("failed to write report {path}: {reason}")]
    Report { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StudyError> for std::process::ExitCode {
    fn from(err: &StudyError) -> Self {
        let code: u8 = match err {
            StudyError::Io(_) | StudyError::Report { .. } => 1,
            StudyError::ConfigParse { .. }
            | StudyError::ConfigMissing { .. }
            | StudyError::ConfigInvalid { .. } => 2,
            StudyError::DataRead { .. }
            | StudyError::InvalidCell { .. }
            | StudyError::DuplicateDate(_)
            | StudyError::ColumnMissing(_)
            | StudyError::UnknownFeature { .. }
            | StudyError::NotEnoughFeatures { .. } => 3,
            StudyError::Model { .. } => 4,
            StudyError::InsufficientRows { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
