//! Result of checking a phase's input or output contract. The contract
//! declaration itself (`required_inputs`/`required_outputs`) lives in
//! `keelmark-registry` alongside the rest of the phase definition.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractResult {
    pub phase_name: String,
    pub satisfied: bool,
    /// Paths that were required but resolved to `MISSING` or `null`.
    /// Named `missing_outputs` regardless of whether this came from an
    /// input or output check, matching how both directions report back
    /// through the same shape.
    pub missing_outputs: Vec<String>,
    pub message: Option<String>,
}

impl ContractResult {
    pub fn satisfied(phase_name: impl Into<String>) -> Self {
        ContractResult {
            phase_name: phase_name.into(),
            satisfied: true,
            missing_outputs: Vec::new(),
            message: None,
        }
    }

    pub fn missing(phase_name: impl Into<String>, missing: Vec<String>, direction: &str) -> Self {
        let phase_name = phase_name.into();
        let message = format!(
            "phase {phase_name} missing required {direction}: {missing:?}"
        );
        ContractResult {
            phase_name,
            satisfied: false,
            missing_outputs: missing,
            message: Some(message),
        }
    }
}
