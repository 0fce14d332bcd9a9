//! The kernel meta-validator: inspects `kernel.status`,
//! `kernel.phase_history`, and `kernel.gate_status` after (or
//! independently of) the main pipeline, and writes
//! `kernel.validation_summary`/`kernel.validation_complete`.
//!
//! Critical phases are `compliance` and `stability`; a missing one is a
//! warning finding, not a hard failure — only a failed gate or an error
//! finding fails the validator outright.

use keelmark_schema::normalize_path;
use keelmark_state::StateStore;
use keelmark_types::{
    KernelResult, Severity, ValidationFinding, ValidationResult, ValidatorState,
};
use serde_json::json;

use crate::validator_trait::Validator;

const TOTAL_PHASES: usize = 13;
const CRITICAL_PHASES: [&str; 2] = ["compliance", "stability"];

#[derive(Debug, Default)]
pub struct KernelValidator;

impl KernelValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for KernelValidator {
    fn id(&self) -> &str {
        "kernel/orchestrator"
    }

    fn read_paths(&self) -> Vec<String> {
        vec![
            "kernel.status".to_string(),
            "kernel.phase_history".to_string(),
            "kernel.gate_status".to_string(),
        ]
    }

    fn write_paths(&self) -> Vec<String> {
        vec![
            "kernel.validation_summary".to_string(),
            "kernel.validation_complete".to_string(),
        ]
    }

    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult> {
        let mut result = ValidationResult::new(self.id());

        let kernel_status = store.get("kernel.status");
        if kernel_status.is_none() || kernel_status == Some(serde_json::Value::Null) {
            result.add_finding(ValidationFinding::new(
                "kern-001",
                Severity::Warning,
                "kernel status not set - pipeline may not have run",
            ));
        }

        let completed_phases: Vec<String> = store
            .get(&normalize_path("kernel.phase_history"))
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();

        if completed_phases.len() < TOTAL_PHASES {
            result.add_finding(ValidationFinding::new(
                "kern-002",
                Severity::Info,
                format!(
                    "pipeline incomplete: {}/{TOTAL_PHASES} phases",
                    completed_phases.len()
                ),
            ));
        }

        let gate_status: std::collections::HashMap<String, bool> = store
            .get("kernel.gate_status")
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        let failed_gates: Vec<String> = gate_status
            .into_iter()
            .filter(|(_, passed)| !passed)
            .map(|(name, _)| name)
            .collect();
        if !failed_gates.is_empty() {
            result.add_finding(ValidationFinding::new(
                "kern-003",
                Severity::Error,
                format!("failed gates: {}", failed_gates.join(", ")),
            ));
        }

        for phase in CRITICAL_PHASES {
            if !completed_phases.iter().any(|p| p == phase) {
                result.add_finding(ValidationFinding::new(
                    format!("kern-004-{phase}"),
                    Severity::Warning,
                    format!("critical phase not completed: {phase}"),
                ));
            }
        }

        result.finalize();

        let summary = json!({
            "completed_phases": completed_phases.len(),
            "total_phases": TOTAL_PHASES,
            "failed_gates": failed_gates,
            "kernel_status": kernel_status,
            "findings": result.findings.len(),
            "errors": result.error_count(),
            "warnings": result.warning_count(),
        });
        store.set_internal("kernel.validation_summary", summary, self.id())?;
        store.set_internal(
            "kernel.validation_complete",
            json!(result.error_count() == 0),
            self.id(),
        )?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keelmark_types::DesignState;

    fn store() -> StateStore {
        StateStore::new(DesignState::new("d1"))
    }

    #[test]
    fn empty_kernel_state_warns_and_reports_incomplete() {
        let mut s = store();
        let result = KernelValidator::new().run(&mut s).unwrap();
        assert_eq!(result.state, ValidatorState::Warning);
        assert!(s.get("kernel.validation_summary").is_some());
        assert_eq!(s.get("kernel.validation_complete"), Some(json!(true)));
    }

    #[test]
    fn failed_gate_fails_the_validator() {
        let mut s = store();
        s.set_internal(
            "kernel.gate_status",
            json!({"compliance": false}),
            "test",
        )
        .unwrap();
        let result = KernelValidator::new().run(&mut s).unwrap();
        assert_eq!(result.state, ValidatorState::Failed);
        assert_eq!(s.get("kernel.validation_complete"), Some(json!(false)));
    }

    #[test]
    fn complete_pipeline_with_all_critical_phases_passes() {
        let mut s = store();
        let all_phases: Vec<&str> = vec![
            "mission", "hull", "structure", "propulsion", "weight", "stability",
            "loading", "arrangement", "compliance", "production", "cost",
            "optimization", "reporting",
        ];
        s.set_internal("kernel.phase_history", json!(all_phases), "test")
            .unwrap();
        s.set_internal("kernel.status", json!("completed"), "test")
            .unwrap();
        let result = KernelValidator::new().run(&mut s).unwrap();
        assert_eq!(result.state, ValidatorState::Passed);
    }
}
