use std::path::PathBuf;

use thiserror::Error;

use crate::state::{BetCategory, SourceMode};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("incomplete input: {0}")]
    InputIncomplete(String),

    #[error("home and away teams cannot be the same ({0})")]
    SameTeamSelected(String),

    #[error("indicators unavailable: {0}")]
    IndicatorUnavailable(String),

    #[error("no head-to-head history between {home} and {away}")]
    NoHistoryData { home: String, away: String },

    #[error("no history record at index {index} (history has {len} records)")]
    RecordNotFound { index: usize, len: usize },

    #[error("{category} is not supported with {mode} data")]
    UnsupportedCategory {
        category: BetCategory,
        mode: SourceMode,
    },

    #[error("history file {path}: {source}")]
    HistoryIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history file {path} is not valid: {source}")]
    HistoryFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl AnalysisError {
    /// Validation failures the caller can fix by changing the selection.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AnalysisError::InputIncomplete(_) | AnalysisError::SameTeamSelected(_)
        )
    }

    pub(crate) fn unavailable(err: anyhow::Error) -> Self {
        AnalysisError::IndicatorUnavailable(format!("{err:#}"))
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
