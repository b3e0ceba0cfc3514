//! Error types for the aggregation pipeline

use thiserror::Error;
use tokio::task::JoinError;

/// Ways a pipeline run can fail.
///
/// None of these depend on record content; every record is countable.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid pipeline configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("Pipeline cancelled before completion")]
    Cancelled,

    #[error("{stage} task failed: {source}")]
    TaskFailed {
        stage: &'static str,
        #[source]
        source: JoinError,
    },
}

impl PipelineError {
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub fn task_failed(stage: &'static str, source: JoinError) -> Self {
        Self::TaskFailed { stage, source }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
