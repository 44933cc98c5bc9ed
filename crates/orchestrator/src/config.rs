use std::time::Duration;

/// Polling settings, constructed once at process start and passed into the
/// runner by reference. There is no module-level mutable configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Fixed interval between status polls.
    pub poll_interval: Duration,
    /// Per-build completion deadline, measured from the start of the wait.
    pub build_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            build_timeout: Duration::from_secs(60 * 60),
        }
    }
}
