//! Error kinds for the recorder. Startup kinds are fatal; per-tick kinds
//! are logged and the tick is skipped.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatError {
    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    #[error("cannot open store at {}: {source}", .path.display())]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("schema error: {0}")]
    SchemaError(String),

    #[error("failed to get {metric} stats: {reason}")]
    MetricUnavailable { metric: &'static str, reason: String },

    #[error("failed to insert stats: {0}")]
    WriteFailure(#[source] sqlx::Error),
}

impl StatError {
    pub(crate) fn metric(metric: &'static str, reason: impl Into<String>) -> Self {
        StatError::MetricUnavailable {
            metric,
            reason: reason.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StatError::InvalidInterval(_)
                | StatError::StoreUnavailable { .. }
                | StatError::SchemaError(_)
        )
    }
}

pub type Result<T, E = StatError> = std::result::Result<T, E>;
