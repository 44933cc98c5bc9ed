use serde::{Deserialize, Serialize};

/// Terminal classification of one build attempt.
///
/// Produced exactly once per triggered build. A target whose trigger call
/// fails is recorded as `TriggerFailed` and is never polled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BuildOutcome {
    Succeeded,
    Failed,
    Cancelled,
    TimedOut,
    TriggerFailed,
    PollingError,
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timed_out",
            Self::TriggerFailed => "trigger_failed",
            Self::PollingError => "polling_error",
        }
    }

    /// Map a raw status string from the vendor to an outcome.
    ///
    /// The vocabulary is fixed and matched case-insensitively. `None` means
    /// the status is not terminal; the waiter treats it as still running and
    /// relies on its deadline to bound the loop.
    pub fn from_terminal_status(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "SUCCEEDED" | "SUCCESS" | "DONE" | "COMPLETED" => Some(Self::Succeeded),
            "FAILED" | "FAILURE" | "ERROR" => Some(Self::Failed),
            "CANCELLED" | "CANCELED" => Some(Self::Cancelled),
            "TIMEOUT" => Some(Self::TimedOut),
            _ => None,
        }
    }
}

impl std::fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_vocabulary() {
        for raw in ["SUCCEEDED", "SUCCESS", "DONE", "COMPLETED"] {
            assert_eq!(
                BuildOutcome::from_terminal_status(raw),
                Some(BuildOutcome::Succeeded),
                "raw status {raw}"
            );
        }
    }

    #[test]
    fn test_failure_vocabulary() {
        for raw in ["FAILED", "FAILURE", "ERROR"] {
            assert_eq!(
                BuildOutcome::from_terminal_status(raw),
                Some(BuildOutcome::Failed)
            );
        }
        assert_eq!(
            BuildOutcome::from_terminal_status("CANCELLED"),
            Some(BuildOutcome::Cancelled)
        );
        assert_eq!(
            BuildOutcome::from_terminal_status("CANCELED"),
            Some(BuildOutcome::Cancelled)
        );
        assert_eq!(
            BuildOutcome::from_terminal_status("TIMEOUT"),
            Some(BuildOutcome::TimedOut)
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(
            BuildOutcome::from_terminal_status("succeeded"),
            Some(BuildOutcome::Succeeded)
        );
        assert_eq!(
            BuildOutcome::from_terminal_status("Succeeded"),
            Some(BuildOutcome::Succeeded)
        );
        assert_eq!(
            BuildOutcome::from_terminal_status("fAiLeD"),
            Some(BuildOutcome::Failed)
        );
    }

    #[test]
    fn test_unknown_status_is_not_terminal() {
        assert_eq!(BuildOutcome::from_terminal_status("BUILDING"), None);
        assert_eq!(BuildOutcome::from_terminal_status("PENDING"), None);
        assert_eq!(BuildOutcome::from_terminal_status(""), None);
    }

    #[test]
    fn test_is_success() {
        assert!(BuildOutcome::Succeeded.is_success());
        assert!(!BuildOutcome::Failed.is_success());
        assert!(!BuildOutcome::TriggerFailed.is_success());
        assert!(!BuildOutcome::TimedOut.is_success());
    }
}
