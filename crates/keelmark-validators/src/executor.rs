//! The pipeline executor: runs a phase's declared validators in
//! dependency order, retrying an infrastructure failure exactly once, and
//! rolls the per-validator results into one phase-level summary.
//!
//! Only an exception raised from `run` is retried; a validator that
//! reports a `failed` result never is.

use keelmark_state::StateStore;
use keelmark_types::{KernelError, ValidationResult, ValidatorState};

use crate::validator_trait::ValidatorRegistry;

/// Aggregated outcome of running every validator a phase declares.
#[derive(Debug, Clone, Default)]
pub struct PhaseValidationSummary {
    pub validators_run: u32,
    pub validators_passed: u32,
    pub validators_failed: u32,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub results: Vec<ValidationResult>,
}

/// Runs `validator_ids` (a phase's declared validator list) against
/// `store` in dependency order. A validator not present in `registry` is
/// recorded as a warning and skipped rather than failing the whole phase.
pub fn run_phase_validators(
    registry: &ValidatorRegistry,
    validator_ids: &[String],
    store: &mut StateStore,
) -> PhaseValidationSummary {
    let ordered = topological_order(registry, validator_ids);
    let mut summary = PhaseValidationSummary::default();

    for id in ordered {
        let Some(validator) = registry.get(&id) else {
            summary
                .warnings
                .push(format!("validator not registered: {id}"));
            continue;
        };

        summary.validators_run += 1;

        let outcome = run_with_retry(validator, store);
        match outcome {
            Ok(result) => {
                match result.state {
                    ValidatorState::Passed | ValidatorState::Warning => {
                        summary.validators_passed += 1;
                    }
                    ValidatorState::Failed | ValidatorState::Error => {
                        summary.validators_failed += 1;
                        if let Some(msg) = &result.error_message {
                            summary.errors.push(format!("{id}: {msg}"));
                        }
                        for finding in &result.findings {
                            if finding.severity >= keelmark_types::Severity::Error {
                                summary
                                    .errors
                                    .push(format!("{id}/{}: {}", finding.finding_id, finding.message));
                            }
                        }
                    }
                    ValidatorState::Pending | ValidatorState::Running => {
                        // A validator that returns without finalizing its own
                        // result is an infrastructure bug, not a data failure.
                        summary.validators_failed += 1;
                        summary
                            .errors
                            .push(format!("{id}: validator returned a non-terminal state"));
                    }
                }
                for finding in &result.findings {
                    if finding.severity == keelmark_types::Severity::Warning {
                        summary.warnings.push(format!("{id}/{}: {}", finding.finding_id, finding.message));
                    }
                }
                summary.results.push(result);
            }
            Err(err) => {
                summary.validators_failed += 1;
                summary.errors.push(format!("{id}: {err}"));
            }
        }
    }

    summary
}

/// A fatal infrastructure error is retried exactly once; a validator
/// reporting `failed`/`error` inside a successfully-returned result is
/// never retried.
fn run_with_retry(
    validator: &dyn crate::validator_trait::Validator,
    store: &mut StateStore,
) -> Result<ValidationResult, KernelError> {
    match validator.run(store) {
        Ok(result) => Ok(result),
        Err(_first_error) => validator.run(store),
    }
}

/// Kahn's algorithm over a phase's validator list plus whatever
/// `depends_on` edges those validators declare. Validators absent from
/// `registry` (and therefore with no declared edges) sort to the end in
/// their original order; they get reported as "not registered" by the
/// caller rather than dropped silently.
fn topological_order(registry: &ValidatorRegistry, ids: &[String]) -> Vec<String> {
    use std::collections::{HashMap, HashSet, VecDeque};

    let known: Vec<String> = ids.iter().filter(|id| registry.contains(id)).cloned().collect();
    let mut indegree: HashMap<String, usize> = known.iter().map(|id| (id.clone(), 0)).collect();
    let mut dependents: HashMap<String, Vec<String>> = HashMap::new();

    for id in &known {
        let Some(validator) = registry.get(id) else { continue };
        for dep in validator.depends_on() {
            if known.contains(&dep) {
                *indegree.get_mut(id).unwrap() += 1;
                dependents.entry(dep).or_default().push(id.clone());
            }
        }
    }

    let mut queue: VecDeque<String> = known
        .iter()
        .filter(|id| indegree[*id] == 0)
        .cloned()
        .collect();
    let mut out = Vec::with_capacity(known.len());
    let mut seen: HashSet<String> = HashSet::new();

    while let Some(id) = queue.pop_front() {
        if !seen.insert(id.clone()) {
            continue;
        }
        if let Some(deps) = dependents.get(&id) {
            for dependent in deps.clone() {
                let entry = indegree.get_mut(&dependent).unwrap();
                *entry = entry.saturating_sub(1);
                if *entry == 0 {
                    queue.push_back(dependent);
                }
            }
        }
        out.push(id);
    }

    // A cycle (or any validator missed by the above) falls back to
    // declared order rather than dropping it from the phase run.
    for id in &known {
        if !out.contains(id) {
            out.push(id.clone());
        }
    }

    // Validators the registry doesn't know about are appended last so the
    // caller can still report them as unregistered.
    for id in ids {
        if !registry.contains(id) && !out.contains(id) {
            out.push(id.clone());
        }
    }

    out
}
