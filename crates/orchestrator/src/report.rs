use cubeflow_core::{BuildOutcome, BuildTarget};
use uuid::Uuid;

/// Outcome of one attempted target. Targets skipped by a short-circuited
/// chain get no entry at all.
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub label: String,
    pub datamodel_id: String,
    pub outcome: BuildOutcome,
}

/// Result of one bounded-iteration loop group.
#[derive(Debug, Clone)]
pub struct LoopTally {
    pub group: String,
    /// Iterations in which every step succeeded.
    pub completed: u32,
    pub cap: u32,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub entries: Vec<TargetReport>,
    pub loops: Vec<LoopTally>,
}

impl RunReport {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            entries: Vec::new(),
            loops: Vec::new(),
        }
    }

    pub fn record(&mut self, target: &BuildTarget, outcome: BuildOutcome) {
        self.entries.push(TargetReport {
            label: target.display_name().to_string(),
            datamodel_id: target.datamodel_id.clone(),
            outcome,
        });
    }

    pub fn record_loop(&mut self, group: impl Into<String>, completed: u32, cap: u32) {
        self.loops.push(LoopTally {
            group: group.into(),
            completed,
            cap,
        });
    }

    pub fn attempted(&self) -> usize {
        self.entries.len()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_success()).count()
    }

    /// Human-readable summary for the notification sink and the console.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Run {}: {}/{} builds succeeded",
            self.run_id,
            self.succeeded(),
            self.attempted()
        )];
        for entry in &self.entries {
            let mark = if entry.outcome.is_success() { "ok" } else { "FAIL" };
            lines.push(format!(
                "  [{}] {}: {}",
                mark, entry.label, entry.outcome
            ));
        }
        for tally in &self.loops {
            lines.push(format!(
                "  loop '{}': {}/{} full iterations",
                tally.group, tally.completed, tally.cap
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeflow_core::BuildMode;

    #[test]
    fn test_summary_counts_and_lines() {
        let mut report = RunReport::new(Uuid::new_v4());
        report.record(
            &BuildTarget::new("a", BuildMode::Full).with_label("Calls"),
            BuildOutcome::Succeeded,
        );
        report.record(
            &BuildTarget::new("b", BuildMode::Full),
            BuildOutcome::TriggerFailed,
        );
        report.record_loop("accumulate", 2, 3);

        assert_eq!(report.attempted(), 2);
        assert_eq!(report.succeeded(), 1);

        let summary = report.summary();
        assert!(summary.contains("1/2 builds succeeded"));
        assert!(summary.contains("[ok] Calls: succeeded"));
        assert!(summary.contains("[FAIL] b: trigger_failed"));
        assert!(summary.contains("loop 'accumulate': 2/3 full iterations"));
    }
}
