use thiserror::Error;

/// Fatal-tier errors. Per-target failures are `BuildOutcome`s, not errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Authentication failed: {0}")]
    Authentication(#[source] sisense::SisenseError),

    #[error("Invalid run plan: {0}")]
    InvalidPlan(#[from] cubeflow_core::CoreError),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
