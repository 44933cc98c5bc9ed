use std::sync::Arc;
use std::time::Instant;

use cubeflow_core::{AccessToken, BuildHandle, BuildOutcome, BuildTarget};
use sisense::{SisenseClient, SisenseError};
use tracing::{debug, info, warn};

use crate::config::RunnerConfig;
use crate::error::{OrchestratorError, Result};
use crate::notify::Notifier;

/// Body marker the vendor emits on 400 briefly after a build starts,
/// before its backend has indexed the build record.
const TRANSIENT_400_MARKER: &str = "Data source not found for build id";

/// Triggers builds and polls them to a terminal outcome.
///
/// Holds the credential for the duration of one run. Trigger and polling
/// failures are classified into `BuildOutcome`s and never propagated; the
/// only fatal path is authentication in `connect`.
pub struct BuildRunner {
    client: SisenseClient,
    token: AccessToken,
    config: RunnerConfig,
    notifier: Arc<dyn Notifier>,
}

impl BuildRunner {
    pub fn new(
        client: SisenseClient,
        token: AccessToken,
        config: RunnerConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            token,
            config,
            notifier,
        }
    }

    /// Log in and build a runner around the fresh credential.
    pub async fn connect(
        client: SisenseClient,
        username: &str,
        password: &str,
        config: RunnerConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let token = client
            .login(username, password)
            .await
            .map_err(OrchestratorError::Authentication)?;
        Ok(Self::new(client, token, config, notifier))
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    /// Trigger one build.
    ///
    /// Any HTTP error status or transport failure yields `None` so the
    /// caller can continue with its remaining targets; the failure is logged
    /// and reported to the sink.
    pub async fn trigger(&self, target: &BuildTarget) -> Option<BuildHandle> {
        info!(
            cube = target.display_name(),
            datamodel_id = %target.datamodel_id,
            mode = target.mode.as_str(),
            "Triggering build"
        );

        match self
            .client
            .start_build(&self.token, &target.datamodel_id, target.mode)
            .await
        {
            Ok(handle) => {
                info!(cube = target.display_name(), build_id = %handle, "Build triggered");
                Some(handle)
            }
            Err(e) => {
                warn!(cube = target.display_name(), error = %e, "Trigger failed");
                self.notifier
                    .notify(&format!(
                        "Trigger failed for {}: {}",
                        target.display_name(),
                        e
                    ))
                    .await;
                None
            }
        }
    }

    /// Poll one build until it reaches a terminal state.
    ///
    /// Policy:
    /// - a recognized terminal status ends the loop with its outcome;
    /// - 400 with the "data source not found" marker and 404 are start-up
    ///   noise and keep the loop polling;
    /// - any other error status, or a transport failure, is `PollingError`
    ///   immediately;
    /// - an unrecognized status counts as still running, bounded by the
    ///   deadline.
    pub async fn wait(&self, target: &BuildTarget, handle: &BuildHandle) -> BuildOutcome {
        let deadline = Instant::now() + self.config.build_timeout;
        info!(cube = target.display_name(), build_id = %handle, "Waiting for build");

        loop {
            match self.client.build_status(&self.token, handle).await {
                Ok(status) => {
                    let raw = status.raw_status().unwrap_or("UNKNOWN");
                    if let Some(outcome) = BuildOutcome::from_terminal_status(raw) {
                        info!(
                            cube = target.display_name(),
                            build_id = %handle,
                            raw_status = raw,
                            outcome = outcome.as_str(),
                            "Build finished"
                        );
                        return outcome;
                    }
                    debug!(build_id = %handle, raw_status = raw, "Build still running");
                }
                Err(e) if is_transient(&e) => {
                    debug!(build_id = %handle, error = %e, "Build not visible yet, retrying");
                }
                Err(e) => {
                    warn!(build_id = %handle, error = %e, "Status poll failed");
                    return BuildOutcome::PollingError;
                }
            }

            if Instant::now() > deadline {
                warn!(
                    cube = target.display_name(),
                    build_id = %handle,
                    timeout_secs = self.config.build_timeout.as_secs(),
                    "Build timed out"
                );
                return BuildOutcome::TimedOut;
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

fn is_transient(error: &SisenseError) -> bool {
    match error.status() {
        Some(404) => true,
        Some(400) => error
            .body()
            .is_some_and(|body| body.contains(TRANSIENT_400_MARKER)),
        _ => false,
    }
}
