//! Phase input/output contract checking: every required path must
//! resolve to a non-`MISSING`, non-null value, or the phase is blocked
//! (before it runs) or failed (after it runs). A required path that
//! isn't in the schema at all is a bug in the contract definition, not a
//! data problem, and is surfaced immediately as
//! `KernelError::ContractDefinitionError` rather than folded into the
//! missing-paths list.

use keelmark_schema::normalize_path;
use keelmark_state::{Fetched, StateStore};
use keelmark_types::{ContractResult, KernelError, KernelResult};

pub fn check_inputs(
    phase_name: &str,
    required_inputs: &[String],
    store: &StateStore,
) -> KernelResult<ContractResult> {
    check_paths(phase_name, required_inputs, store, "INPUTS")
}

pub fn check_outputs(
    phase_name: &str,
    required_outputs: &[String],
    store: &StateStore,
) -> KernelResult<ContractResult> {
    check_paths(phase_name, required_outputs, store, "OUTPUTS")
}

fn check_paths(
    phase_name: &str,
    paths: &[String],
    store: &StateStore,
    direction: &str,
) -> KernelResult<ContractResult> {
    let mut missing = Vec::new();
    let mut invalid = Vec::new();

    for path in paths {
        let canonical = normalize_path(path);
        match store.get_strict(&canonical) {
            Err(KernelError::InvalidPath { .. }) => {
                invalid.push(format!("{path} (CONTRACT BUG: not in schema)"));
            }
            Err(other) => return Err(other),
            Ok(Fetched::Missing) => missing.push(canonical),
            Ok(Fetched::Present(_)) => {}
        }
    }

    if !invalid.is_empty() {
        return Err(KernelError::ContractDefinitionError {
            phase: phase_name.to_string(),
            paths: invalid,
        });
    }

    if missing.is_empty() {
        Ok(ContractResult::satisfied(phase_name))
    } else {
        Ok(ContractResult::missing(phase_name, missing, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keelmark_types::DesignState;
    use serde_json::json;

    #[test]
    fn satisfied_when_all_required_paths_are_present() {
        let mut state = DesignState::new("d1");
        state.hull.loa = Some(20.0);
        let store = StateStore::new(state);
        let result = check_inputs("hull", &["hull.loa".to_string()], &store).unwrap();
        assert!(result.satisfied);
    }

    #[test]
    fn missing_required_input_blocks_the_phase() {
        let store = StateStore::new(DesignState::new("d1"));
        let result = check_inputs("hull", &["hull.loa".to_string()], &store).unwrap();
        assert!(!result.satisfied);
        assert_eq!(result.missing_outputs, vec!["hull.loa".to_string()]);
    }

    #[test]
    fn contract_naming_an_unschemed_path_is_a_definition_error() {
        let store = StateStore::new(DesignState::new("d1"));
        let err = check_outputs("hull", &["hull.not_a_real_field".to_string()], &store).unwrap_err();
        assert!(matches!(err, KernelError::ContractDefinitionError { .. }));
    }

    #[test]
    fn alias_in_contract_path_resolves_before_checking() {
        let mut state = DesignState::new("d1");
        state.stability.gm_transverse_m = Some(1.2);
        let store = StateStore::new(state);
        let result = check_outputs("stability", &["stability.gm".to_string()], &store).unwrap();
        assert!(result.satisfied);
    }

    #[test]
    fn set_to_explicit_null_still_counts_as_missing() {
        let mut state = DesignState::new("d1");
        state.hull.extra.insert("some_future_field".to_string(), json!(null));
        let store = StateStore::new(state);
        let result = check_inputs("hull", &["hull.extra.some_future_field".to_string()], &store).unwrap();
        assert!(!result.satisfied);
    }
}
