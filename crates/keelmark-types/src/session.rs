//! Session state: the single record of "what has this design run through
//! and what did it produce", owned exclusively by the conductor.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::phase::{GateResult, PhaseResult, PhaseStatus, SessionStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    pub design_id: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub current_phase: Option<String>,
    #[serde(default)]
    pub completed_phases: Vec<String>,
    #[serde(default)]
    pub phase_results: HashMap<String, PhaseResult>,
    #[serde(default)]
    pub gate_results: HashMap<String, GateResult>,
    #[serde(default)]
    pub total_validators_run: u32,
    #[serde(default)]
    pub total_validators_passed: u32,
}

impl SessionState {
    pub fn new(session_id: impl Into<String>, design_id: impl Into<String>) -> Self {
        let now = Utc::now();
        SessionState {
            session_id: session_id.into(),
            design_id: design_id.into(),
            status: SessionStatus::Initializing,
            created_at: now,
            updated_at: now,
            current_phase: None,
            completed_phases: Vec::new(),
            phase_results: HashMap::new(),
            gate_results: HashMap::new(),
            total_validators_run: 0,
            total_validators_passed: 0,
        }
    }

    pub fn add_phase_result(&mut self, result: PhaseResult) {
        self.total_validators_run += result.validators_run;
        self.total_validators_passed += result.validators_passed;
        if result.status == PhaseStatus::Completed
            && !self.completed_phases.contains(&result.phase_name)
        {
            self.completed_phases.push(result.phase_name.clone());
        }
        self.phase_results.insert(result.phase_name.clone(), result);
        self.updated_at = Utc::now();
    }

    pub fn add_gate_result(&mut self, result: GateResult) {
        self.gate_results.insert(result.gate_name.clone(), result);
        self.updated_at = Utc::now();
    }

    pub fn overall_pass_rate(&self) -> f64 {
        if self.total_validators_run == 0 {
            0.0
        } else {
            self.total_validators_passed as f64 / self.total_validators_run as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::GateCondition;

    #[test]
    fn add_phase_result_tracks_completed_phases_once() {
        let mut session = SessionState::new("s1", "d1");
        let mut result = PhaseResult::new("mission", PhaseStatus::Completed);
        result.validators_run = 2;
        result.validators_passed = 2;
        session.add_phase_result(result.clone());
        session.add_phase_result(result);
        assert_eq!(session.completed_phases, vec!["mission".to_string()]);
        assert_eq!(session.total_validators_run, 4);
    }

    #[test]
    fn overall_pass_rate_aggregates_across_phases() {
        let mut session = SessionState::new("s1", "d1");
        let mut hull = PhaseResult::new("hull", PhaseStatus::Completed);
        hull.validators_run = 4;
        hull.validators_passed = 3;
        session.add_phase_result(hull);
        assert_eq!(session.overall_pass_rate(), 0.75);
    }

    #[test]
    fn add_gate_result_records_by_name() {
        let mut session = SessionState::new("s1", "d1");
        session.add_gate_result(GateResult {
            gate_name: "compliance".to_string(),
            condition: GateCondition::CriticalPass,
            passed: true,
            evaluated_at: None,
            threshold: None,
            actual_value: None,
            blocking_failures: Vec::new(),
        });
        assert!(session.gate_results.contains_key("compliance"));
    }
}
