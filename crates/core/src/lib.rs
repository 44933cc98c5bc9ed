//! Domain types for cubeflow.
//!
//! This crate holds the vocabulary shared by the orchestrator and the
//! vendor client: build targets and modes, build outcomes with the
//! terminal-status normalization, and declarative run plans. No I/O.

pub mod domain;
pub mod error;

pub use domain::credential::AccessToken;
pub use domain::outcome::BuildOutcome;
pub use domain::plan::{GroupPolicy, PlanGroup, RunPlan, DEFAULT_MAX_LOOPS};
pub use domain::target::{BuildHandle, BuildMode, BuildTarget};
pub use error::CoreError;
