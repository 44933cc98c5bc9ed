use std::sync::Arc;

use cubeflow_core::{BuildOutcome, BuildTarget, GroupPolicy, PlanGroup, RunPlan};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::notify::Notifier;
use crate::report::RunReport;
use crate::runner::BuildRunner;

/// Executes a run plan group by group.
///
/// Groups never short-circuit each other: whatever happens inside a group,
/// the planner advances to the next one. "Always build the finalization
/// cubes" is therefore expressed as a trailing group.
pub struct RunPlanner {
    runner: BuildRunner,
    notifier: Arc<dyn Notifier>,
    /// Per-run override of every loop group's iteration cap.
    loop_cap: Option<u32>,
}

impl RunPlanner {
    pub fn new(runner: BuildRunner, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            runner,
            notifier,
            loop_cap: None,
        }
    }

    pub fn with_loop_cap(mut self, cap: Option<u32>) -> Self {
        self.loop_cap = cap;
        self
    }

    pub async fn execute(&self, plan: &RunPlan) -> Result<RunReport> {
        plan.validate()?;

        let run_id = Uuid::new_v4();
        info!(
            %run_id,
            groups = plan.groups.len(),
            targets = plan.target_count(),
            "Starting run"
        );
        let mut report = RunReport::new(run_id);

        for group in &plan.groups {
            info!(
                group = group.display_name(),
                policy = group.policy.as_str(),
                "Starting group"
            );
            match group.policy {
                GroupPolicy::Parallel => self.run_parallel(group, &mut report).await,
                GroupPolicy::Sequential => self.run_sequential(group, &mut report).await,
                GroupPolicy::Loop => self.run_loop(group, &mut report).await,
            }
        }

        info!(%run_id, succeeded = report.succeeded(), attempted = report.attempted(), "Run finished");
        self.notifier.notify(&report.summary()).await;
        Ok(report)
    }

    /// Trigger every target first, then wait on each in trigger order. The
    /// remote builds overlap on the vendor side; we poll them one at a time.
    async fn run_parallel(&self, group: &PlanGroup, report: &mut RunReport) {
        let mut batch = Vec::with_capacity(group.targets.len());
        for target in &group.targets {
            batch.push((target, self.runner.trigger(target).await));
        }

        for (target, handle) in batch {
            match handle {
                Some(handle) => {
                    let outcome = self.runner.wait(target, &handle).await;
                    report.record(target, outcome);
                }
                None => {
                    info!(
                        cube = target.display_name(),
                        "Skipping wait, trigger failed"
                    );
                    report.record(target, BuildOutcome::TriggerFailed);
                }
            }
        }
    }

    /// One target at a time; the first non-success outcome aborts the rest
    /// of the chain.
    async fn run_sequential(&self, group: &PlanGroup, report: &mut RunReport) {
        for target in &group.targets {
            let outcome = self.run_one(target).await;
            report.record(target, outcome);
            if !outcome.is_success() {
                warn!(
                    group = group.display_name(),
                    cube = target.display_name(),
                    outcome = outcome.as_str(),
                    "Chain aborted"
                );
                self.notifier
                    .notify(&format!(
                        "Chain '{}' aborted at {} ({})",
                        group.display_name(),
                        target.display_name(),
                        outcome
                    ))
                    .await;
                break;
            }
        }
    }

    /// Repeat the group's chain until a step does not succeed or the cap is
    /// reached. A non-success step is the "no more new upstream data"
    /// signal, not necessarily an error.
    async fn run_loop(&self, group: &PlanGroup, report: &mut RunReport) {
        let cap = group.iteration_cap(self.loop_cap);
        let mut completed = 0u32;

        'iterations: for iteration in 1..=cap {
            info!(
                group = group.display_name(),
                iteration, cap, "Loop iteration"
            );
            for target in &group.targets {
                let outcome = self.run_one(target).await;
                report.record(target, outcome);
                if !outcome.is_success() {
                    info!(
                        group = group.display_name(),
                        cube = target.display_name(),
                        outcome = outcome.as_str(),
                        "Step did not succeed, stopping loop for this run"
                    );
                    break 'iterations;
                }
            }
            completed += 1;
        }

        info!(
            group = group.display_name(),
            completed, cap, "Loop finished"
        );
        report.record_loop(group.display_name(), completed, cap);
    }

    async fn run_one(&self, target: &BuildTarget) -> BuildOutcome {
        match self.runner.trigger(target).await {
            Some(handle) => self.runner.wait(target, &handle).await,
            None => BuildOutcome::TriggerFailed,
        }
    }
}
