//! Phase execution and gate enumerations, plus the result records the
//! conductor accumulates as it runs each phase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateCondition {
    /// All validators run for the gate phase must pass.
    AllPass,
    /// Validators tagged critical (the compliance phase's failures) must
    /// all pass; non-critical failures are allowed through.
    CriticalPass,
    /// Pass rate must meet or exceed a configured threshold.
    Threshold,
    /// Never passes on its own; requires an explicit `approve_gate` call.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Initializing,
    Active,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseType {
    Definition,
    Analysis,
    Integration,
    Verification,
    Output,
    Custom,
}

/// Result of running a single phase end to end: dependency check, hull
/// synthesis hook (hull phase only), input contract, validator pipeline,
/// output contract, gate evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub phase_name: String,
    pub status: PhaseStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub validators_run: u32,
    #[serde(default)]
    pub validators_passed: u32,
    #[serde(default)]
    pub validators_failed: u32,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl PhaseResult {
    pub fn new(phase_name: impl Into<String>, status: PhaseStatus) -> Self {
        PhaseResult {
            phase_name: phase_name.into(),
            status,
            started_at: None,
            completed_at: None,
            validators_run: 0,
            validators_passed: 0,
            validators_failed: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn duration_s(&self) -> f64 {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => (end - start).num_milliseconds() as f64 / 1000.0,
            _ => 0.0,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        if self.validators_run == 0 {
            0.0
        } else {
            self.validators_passed as f64 / self.validators_run as f64
        }
    }
}

/// Result of evaluating a gate phase's gate condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateResult {
    pub gate_name: String,
    pub condition: GateCondition,
    pub passed: bool,
    pub evaluated_at: Option<DateTime<Utc>>,
    pub threshold: Option<f64>,
    pub actual_value: Option<f64>,
    #[serde(default)]
    pub blocking_failures: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_rate_is_zero_with_no_validators_run() {
        let result = PhaseResult::new("mission", PhaseStatus::Completed);
        assert_eq!(result.pass_rate(), 0.0);
    }

    #[test]
    fn pass_rate_divides_passed_by_run() {
        let mut result = PhaseResult::new("hull", PhaseStatus::Completed);
        result.validators_run = 4;
        result.validators_passed = 3;
        assert_eq!(result.pass_rate(), 0.75);
    }

    #[test]
    fn duration_zero_without_both_timestamps() {
        let result = PhaseResult::new("hull", PhaseStatus::Running);
        assert_eq!(result.duration_s(), 0.0);
    }

    #[test]
    fn enums_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&GateCondition::CriticalPass).unwrap(),
            "\"critical_pass\""
        );
        assert_eq!(
            serde_json::to_string(&PhaseStatus::Blocked).unwrap(),
            "\"blocked\""
        );
    }
}
