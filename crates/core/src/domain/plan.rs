use serde::{Deserialize, Serialize};

use crate::domain::target::BuildTarget;
use crate::error::CoreError;

/// Default iteration cap for loop groups when the plan does not set one.
pub const DEFAULT_MAX_LOOPS: u32 = 5;

/// How the targets inside one plan group are sequenced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupPolicy {
    /// Trigger every target first, then wait on each in trigger order.
    /// One target's failure never blocks another's trigger or wait.
    #[default]
    Parallel,
    /// Trigger and wait one target at a time; any non-success outcome
    /// aborts the rest of the chain.
    Sequential,
    /// Repeat the group's target chain until a step does not succeed or
    /// the iteration cap is reached.
    Loop,
}

impl GroupPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parallel => "parallel",
            Self::Sequential => "sequential",
            Self::Loop => "loop",
        }
    }
}

/// One group of build targets sharing a sequencing policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanGroup {
    pub name: Option<String>,
    #[serde(default)]
    pub policy: GroupPolicy,
    /// Iteration cap for `Loop` groups. Ignored by other policies.
    pub max_iterations: Option<u32>,
    pub targets: Vec<BuildTarget>,
}

impl PlanGroup {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed group")
    }

    /// Effective iteration cap for a loop group. The per-run override from
    /// the environment wins over the plan file, then the plan file over the
    /// default.
    pub fn iteration_cap(&self, run_override: Option<u32>) -> u32 {
        run_override
            .or(self.max_iterations)
            .unwrap_or(DEFAULT_MAX_LOOPS)
    }
}

/// A declared run: ordered groups, executed front to back.
///
/// Groups never short-circuit each other: a failure inside one group does
/// not prevent later groups from running. Fixed finalization builds are
/// therefore expressed as a trailing group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPlan {
    pub groups: Vec<PlanGroup>,
}

impl RunPlan {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.groups.is_empty() {
            return Err(CoreError::Validation("plan has no groups".to_string()));
        }
        for group in &self.groups {
            if group.targets.is_empty() {
                return Err(CoreError::Validation(format!(
                    "group '{}' has no targets",
                    group.display_name()
                )));
            }
            if group.policy == GroupPolicy::Loop && group.max_iterations == Some(0) {
                return Err(CoreError::Validation(format!(
                    "loop group '{}' has max_iterations = 0",
                    group.display_name()
                )));
            }
        }
        Ok(())
    }

    pub fn target_count(&self) -> usize {
        self.groups.iter().map(|g| g.targets.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::target::BuildMode;

    fn target(id: &str) -> BuildTarget {
        BuildTarget::new(id, BuildMode::Full)
    }

    fn group(policy: GroupPolicy, targets: Vec<BuildTarget>) -> PlanGroup {
        PlanGroup {
            name: None,
            policy,
            max_iterations: None,
            targets,
        }
    }

    #[test]
    fn test_empty_plan_is_invalid() {
        let plan = RunPlan { groups: vec![] };
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_empty_group_is_invalid() {
        let plan = RunPlan {
            groups: vec![group(GroupPolicy::Parallel, vec![])],
        };
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_zero_iteration_loop_is_invalid() {
        let mut loop_group = group(GroupPolicy::Loop, vec![target("a")]);
        loop_group.max_iterations = Some(0);
        let plan = RunPlan {
            groups: vec![loop_group],
        };
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_iteration_cap_precedence() {
        let mut loop_group = group(GroupPolicy::Loop, vec![target("a")]);
        assert_eq!(loop_group.iteration_cap(None), DEFAULT_MAX_LOOPS);

        loop_group.max_iterations = Some(3);
        assert_eq!(loop_group.iteration_cap(None), 3);
        assert_eq!(loop_group.iteration_cap(Some(7)), 7);
    }

    #[test]
    fn test_plan_parses_from_toml() {
        let plan: RunPlan = toml::from_str(
            r#"
            [[groups]]
            name = "fast cubes"
            policy = "parallel"
            targets = [
                { datamodel_id = "c0c863ec", mode = "full" },
                { datamodel_id = "64a0ca4c" },
            ]

            [[groups]]
            policy = "loop"
            max_iterations = 3
            targets = [
                { datamodel_id = "5ccf6f64", label = "Calls" },
                { datamodel_id = "bf49122f", label = "Cumulative" },
            ]

            [[groups]]
            name = "finalize"
            policy = "sequential"
            targets = [{ datamodel_id = "4d35c342" }]
            "#,
        )
        .unwrap();

        plan.validate().unwrap();
        assert_eq!(plan.groups.len(), 3);
        assert_eq!(plan.target_count(), 5);
        assert_eq!(plan.groups[0].policy, GroupPolicy::Parallel);
        assert_eq!(plan.groups[1].iteration_cap(None), 3);
        assert_eq!(plan.groups[1].targets[0].display_name(), "Calls");
        assert_eq!(plan.groups[2].policy, GroupPolicy::Sequential);
    }
}
