//! The conductor: owns the state store, the transaction manager,
//! the phase registry, the validator registry, and the hull synthesizer,
//! and is the only thing that runs a phase end to end.
//!
//! Each phase run proceeds through a fixed sequence: dependency check,
//! hull-synthesis hook, input contract, validator pipeline, output
//! contract, gate evaluation — in that order, each step able to stop the
//! phase short without raising. `keelmark-transactions`' own doc comment
//! says the caller owns `design_version` and the commit/rollback history
//! entries; this is that caller.

use std::collections::HashMap;
use std::collections::HashSet;

use chrono::Utc;
use keelmark_registry::{PhaseDefinition, PhaseRegistry};
use keelmark_state::StateStore;
use keelmark_synthesis::HullSynthesizer;
use keelmark_transactions::{Transaction, TransactionManager};
use keelmark_types::{
    DesignState, GateCondition, GateResult, HullFamily, KernelError, KernelResult,
    PhaseMetadataRecord, PhaseResult, PhaseStatus, SessionState, SessionStatus, SynthesisRequest,
    SynthesisResult,
};
use keelmark_validators::{check_inputs, check_outputs, run_phase_validators, KernelValidator, Validator, ValidatorRegistry};
use serde_json::{json, Value};

/// Dimensions the hull phase's own input contract requires; if any of
/// these is missing or null when the hull phase starts, synthesis runs
/// first to seed them.
const HULL_REQUIRED_DIMS: [&str; 4] = ["hull.lwl", "hull.beam", "hull.draft", "hull.cb"];

/// Snapshot of the conductor's state handed back by [`Conductor::get_status_summary`].
/// Not a `keelmark-types` record — this is purely a read-side view for a
/// CLI or caller to print, not anything that round-trips through the
/// design state itself.
#[derive(Debug, Clone)]
pub struct StatusSummary {
    pub session_id: String,
    pub design_id: String,
    pub status: SessionStatus,
    pub current_phase: Option<String>,
    pub completed_phases: Vec<String>,
    pub total_phases: usize,
    pub overall_pass_rate: f64,
    pub gate_results: HashMap<String, GateResult>,
    pub kernel_validation_complete: bool,
    pub design_version: u64,
}

pub struct Conductor {
    store: StateStore,
    transactions: TransactionManager,
    registry: PhaseRegistry,
    validators: ValidatorRegistry,
    synthesizer: HullSynthesizer,
    session: SessionState,
    manual_approvals: HashSet<String>,
}

impl Conductor {
    pub fn new() -> Self {
        let mut validators = ValidatorRegistry::new();
        keelmark_validators::register_builtin(&mut validators);

        Conductor {
            store: StateStore::new(DesignState::new("")),
            transactions: TransactionManager::new(),
            registry: PhaseRegistry::new(),
            validators,
            synthesizer: HullSynthesizer::new(),
            session: SessionState::new("", ""),
            manual_approvals: HashSet::new(),
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    // ---- session lifecycle -------------------------------------------------

    /// Starts a fresh design and session, replacing whatever the conductor
    /// was previously holding. `keelmark-core` owns exactly one session per
    /// conductor, matching the single-session-type resolution in the
    /// grounding ledger.
    pub fn create_session(&mut self, design_id: &str) -> &SessionState {
        self.store = StateStore::new(DesignState::new(design_id));
        self.transactions = TransactionManager::new();
        self.manual_approvals.clear();

        let session_id = format!("sess-{design_id}-{}", Utc::now().timestamp_millis());
        self.session = SessionState::new(session_id.clone(), design_id);
        self.session.status = SessionStatus::Active;

        self.store
            .set_internal("kernel.status", json!("active"), "conductor")
            .ok();
        self.store
            .set_internal("kernel.current_session", json!(session_id), "conductor")
            .ok();

        &self.session
    }

    /// Replaces the conductor's state store with one built from an
    /// already-persisted design, for resuming a session across process
    /// restarts. The session record itself is not reconstructed from the
    /// design — callers that need session continuity hold onto the
    /// `SessionState` separately (see `keelmark-events` for the JSONL
    /// mirror this is read alongside).
    pub fn load_design(&mut self, state: DesignState) {
        self.store = StateStore::new(state);
    }

    pub fn design_state(&self) -> &DesignState {
        self.store.state()
    }

    /// Restores a previously persisted session alongside a [`load_design`]
    /// call, for a host process that re-creates its `Conductor` on every
    /// invocation (the CLI). Manual gate approvals are replayed from the
    /// session's gate results so a later `run_phase` still sees them.
    ///
    /// [`load_design`]: Conductor::load_design
    pub fn load_session(&mut self, session: SessionState) {
        self.manual_approvals = session
            .gate_results
            .values()
            .filter(|g| g.condition == GateCondition::Manual && g.passed)
            .map(|g| g.gate_name.clone())
            .collect();
        self.session = session;
    }

    // ---- transactions --------------------------------------------------------

    pub fn begin_transaction(&mut self) -> KernelResult<String> {
        self.transactions.begin(self.store.state())
    }

    pub fn commit_transaction(&mut self, txn_id: &str) -> KernelResult<Transaction> {
        let txn = self.transactions.commit(txn_id)?;
        self.store.bump_design_version();
        self.store.record_transaction_commit(&txn.id, "conductor");
        Ok(txn)
    }

    pub fn rollback_transaction(&mut self, txn_id: &str) -> KernelResult<Transaction> {
        let (txn, snapshot) = self.transactions.rollback(txn_id)?;
        self.store.restore(snapshot);
        self.store.record_transaction_rollback(&txn.id, "conductor");
        Ok(txn)
    }

    pub fn in_transaction(&self) -> bool {
        self.transactions.in_transaction()
    }

    pub fn design_version(&self) -> u64 {
        self.store.design_version()
    }

    // ---- path-addressed reads/writes -----------------------------------------

    pub fn get(&self, path: &str) -> Option<Value> {
        self.store.get(path)
    }

    /// Writes a single path, threading the conductor's own transaction
    /// state through to the mutation gate and mirroring the write onto the
    /// active transaction's change log if one is open.
    pub fn set(&mut self, path: &str, value: Value, source: &str) -> KernelResult<Value> {
        let in_txn = self.transactions.in_transaction();
        let old_value = self.store.set(path, value.clone(), source, in_txn)?;
        if let Some(txn) = self.transactions.active_transaction() {
            let txn_id = txn.id.clone();
            self.transactions
                .record_change(&txn_id, path, old_value.clone(), value, source)?;
        }
        Ok(old_value)
    }

    // ---- internal phase-state bookkeeping ------------------------------------

    pub fn _set_phase_state_internal(&mut self, phase: &str, value: Value) {
        self.store.set_phase_state(phase, value);
    }

    pub fn _get_phase_states_internal(&self) -> &HashMap<String, Value> {
        self.store.get_phase_states()
    }

    // ---- phase execution ------------------------------------------------------

    /// Runs one phase end to end. Never returns `Err` for an ordinary
    /// blocked/failed outcome — those are represented in the returned
    /// `PhaseResult`'s status. `Err` is reserved for programmer-error
    /// conditions (an unknown phase name, a contract naming an unschemed
    /// path) that no amount of retrying fixes.
    pub fn run_phase(&mut self, name: &str) -> KernelResult<PhaseResult> {
        let phase = self
            .registry
            .get_phase(name)
            .cloned()
            .ok_or_else(|| KernelError::NotFound {
                kind: "phase",
                name: name.to_string(),
            })?;

        for dep in &phase.depends_on {
            if !self.session.completed_phases.contains(dep) {
                let mut result = PhaseResult::new(phase.name.clone(), PhaseStatus::Blocked);
                result.started_at = Some(Utc::now());
                result.completed_at = Some(Utc::now());
                result
                    .errors
                    .push(format!("dependency '{dep}' has not completed"));
                self.finish_phase_result(&phase, result.clone());
                return Ok(result);
            }
        }

        let mut result = PhaseResult::new(phase.name.clone(), PhaseStatus::Running);
        result.started_at = Some(Utc::now());

        if phase.name == "hull" && self.hull_dimensions_missing() {
            let synth = match self.derive_synthesis_request() {
                Ok(request) => self.run_synthesis_internal(&request),
                Err(err) => {
                    result.status = PhaseStatus::Failed;
                    result.completed_at = Some(Utc::now());
                    result.errors.push(err.to_string());
                    self.finish_phase_result(&phase, result.clone());
                    return Ok(result);
                }
            };
            if !synth.is_usable {
                result.status = PhaseStatus::Failed;
                result.completed_at = Some(Utc::now());
                result.errors.push(format!(
                    "hull synthesis did not produce usable dimensions: {}",
                    synth.message.unwrap_or_default()
                ));
                self.finish_phase_result(&phase, result.clone());
                return Ok(result);
            }
        }

        let input_check = check_inputs(&phase.name, &phase.contract.required_inputs, &self.store)?;
        if !input_check.satisfied {
            result.status = PhaseStatus::Blocked;
            result.completed_at = Some(Utc::now());
            result.errors.push(input_check.message.unwrap_or_default());
            self.finish_phase_result(&phase, result.clone());
            return Ok(result);
        }

        let summary = run_phase_validators(&self.validators, &phase.validators, &mut self.store);
        result.validators_run = summary.validators_run;
        result.validators_passed = summary.validators_passed;
        result.validators_failed = summary.validators_failed;
        result.warnings.extend(summary.warnings);
        result.errors.extend(summary.errors);

        let output_check = check_outputs(&phase.name, &phase.contract.required_outputs, &self.store)?;
        if !output_check.satisfied {
            result.status = PhaseStatus::Failed;
            result.errors.push(output_check.message.unwrap_or_default());
        } else {
            result.status = PhaseStatus::Completed;
        }
        result.completed_at = Some(Utc::now());

        if phase.is_gate && result.status == PhaseStatus::Completed {
            let gate_result = self.evaluate_gate(&phase, &result);
            if !gate_result.passed {
                result.status = PhaseStatus::Failed;
                result
                    .errors
                    .push(format!("gate '{}' did not pass", phase.name));
            }
            self.record_gate(&phase, gate_result);
        }

        self.finish_phase_result(&phase, result.clone());
        Ok(result)
    }

    pub fn run_all_phases(&mut self, stop_on_failure: bool) -> KernelResult<Vec<PhaseResult>> {
        let order: Vec<String> = self
            .registry
            .get_phases_in_order()
            .into_iter()
            .map(|p| p.name.clone())
            .collect();
        self.run_named_phases(&order, stop_on_failure)
    }

    pub fn run_to_phase(&mut self, name: &str) -> KernelResult<Vec<PhaseResult>> {
        let order: Vec<String> = self
            .registry
            .get_phases_in_order()
            .into_iter()
            .map(|p| p.name.clone())
            .collect();
        let Some(end) = order.iter().position(|n| n == name) else {
            return Err(KernelError::NotFound {
                kind: "phase",
                name: name.to_string(),
            });
        };
        self.run_named_phases(&order[..=end], true)
    }

    pub fn run_from_phase(&mut self, name: &str) -> KernelResult<Vec<PhaseResult>> {
        let order: Vec<String> = self
            .registry
            .get_phases_in_order()
            .into_iter()
            .map(|p| p.name.clone())
            .collect();
        let Some(start) = order.iter().position(|n| n == name) else {
            return Err(KernelError::NotFound {
                kind: "phase",
                name: name.to_string(),
            });
        };
        self.run_named_phases(&order[start..], true)
    }

    fn run_named_phases(&mut self, names: &[String], stop_on_failure: bool) -> KernelResult<Vec<PhaseResult>> {
        let mut results = Vec::with_capacity(names.len());
        for name in names {
            let result = self.run_phase(name)?;
            let failed = matches!(result.status, PhaseStatus::Failed | PhaseStatus::Blocked);
            results.push(result);
            if failed && stop_on_failure {
                break;
            }
        }
        Ok(results)
    }

    pub fn approve_gate(&mut self, name: &str) -> KernelResult<GateResult> {
        let phase = self
            .registry
            .get_phase(name)
            .cloned()
            .ok_or_else(|| KernelError::NotFound {
                kind: "phase",
                name: name.to_string(),
            })?;
        if !phase.is_gate {
            return Err(KernelError::InvalidRequest {
                message: format!("phase '{name}' is not a gate"),
            });
        }

        self.manual_approvals.insert(phase.name.clone());
        let gate_result = GateResult {
            gate_name: phase.name.clone(),
            condition: phase.gate_condition,
            passed: true,
            evaluated_at: Some(Utc::now()),
            threshold: Some(phase.gate_threshold),
            actual_value: None,
            blocking_failures: Vec::new(),
        };
        self.record_gate(&phase, gate_result.clone());
        self.store.record_gate_approved(&phase.name, "operator");

        if let Some(mut stored) = self.session.phase_results.get(&phase.name).cloned() {
            if stored.status == PhaseStatus::Failed {
                stored.status = PhaseStatus::Completed;
                self.session.add_phase_result(stored);
            }
        }

        Ok(gate_result)
    }

    pub fn get_status_summary(&mut self) -> StatusSummary {
        let kernel_validation_complete = KernelValidator::new()
            .run(&mut self.store)
            .map(|r| r.error_count() == 0)
            .unwrap_or(false);

        StatusSummary {
            session_id: self.session.session_id.clone(),
            design_id: self.session.design_id.clone(),
            status: self.session.status,
            current_phase: self.session.current_phase.clone(),
            completed_phases: self.session.completed_phases.clone(),
            total_phases: self.registry.get_phases_in_order().len(),
            overall_pass_rate: self.session.overall_pass_rate(),
            gate_results: self.session.gate_results.clone(),
            kernel_validation_complete,
            design_version: self.store.design_version(),
        }
    }

    // ---- hull synthesis ---------------------------------------------------

    pub fn synthesize(&mut self, request: &SynthesisRequest) -> SynthesisResult {
        self.run_synthesis_internal(request)
    }

    fn run_synthesis_internal(&mut self, request: &SynthesisRequest) -> SynthesisResult {
        let hull_validator_ids = self
            .registry
            .get_phase("hull")
            .map(|p| p.validators.clone())
            .unwrap_or_default();
        let validators = &self.validators;
        self.synthesizer.synthesize(request, &mut self.store, |store| {
            run_phase_validators(validators, &hull_validator_ids, store)
        })
    }

    fn hull_dimensions_missing(&self) -> bool {
        HULL_REQUIRED_DIMS
            .iter()
            .any(|path| !matches!(self.store.get(path), Some(v) if !v.is_null()))
    }

    fn derive_synthesis_request(&self) -> KernelResult<SynthesisRequest> {
        let max_speed_kts = self
            .store
            .get("mission.max_speed_kts")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| KernelError::InvalidRequest {
                message: "mission.max_speed_kts is required before hull synthesis can run".to_string(),
            })?;

        let hull_family = self
            .store
            .get("hull.hull_family")
            .and_then(|v| v.as_str().and_then(HullFamily::from_str))
            .unwrap_or(HullFamily::Patrol);

        let mut request = SynthesisRequest::new(hull_family, max_speed_kts);
        request.loa_m = self.store.get("mission.loa_m").and_then(|v| v.as_f64());
        request.crew_count = self
            .store
            .get("mission.crew_count")
            .and_then(|v| v.as_u64())
            .map(|v| v as u32);
        request.range_nm = self.store.get("mission.range_nm").and_then(|v| v.as_f64());
        request.gm_min_m = self.store.get("mission.gm_required_m").and_then(|v| v.as_f64());
        Ok(request)
    }

    // ---- gate evaluation ---------------------------------------------------

    fn evaluate_gate(&self, phase: &PhaseDefinition, result: &PhaseResult) -> GateResult {
        let (passed, actual_value, blocking_failures) = match phase.gate_condition {
            GateCondition::AllPass => {
                let passed = result.validators_failed == 0;
                let blocking = if passed {
                    Vec::new()
                } else {
                    vec!["one or more validators failed".to_string()]
                };
                (passed, Some(result.pass_rate()), blocking)
            }
            GateCondition::CriticalPass => {
                let fail_count = self
                    .store
                    .get("compliance.fail_count")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0);
                let passed = fail_count == 0;
                let blocking = if passed {
                    Vec::new()
                } else {
                    vec![format!("{fail_count} compliance failure(s) outstanding")]
                };
                (passed, Some(fail_count as f64), blocking)
            }
            GateCondition::Threshold => {
                let rate = result.pass_rate();
                let passed = rate >= phase.gate_threshold;
                let blocking = if passed {
                    Vec::new()
                } else {
                    vec![format!(
                        "pass rate {rate:.2} below threshold {:.2}",
                        phase.gate_threshold
                    )]
                };
                (passed, Some(rate), blocking)
            }
            GateCondition::Manual => {
                let passed = self.manual_approvals.contains(&phase.name);
                let blocking = if passed {
                    Vec::new()
                } else {
                    vec!["awaiting manual approval".to_string()]
                };
                (passed, None, blocking)
            }
        };

        GateResult {
            gate_name: phase.name.clone(),
            condition: phase.gate_condition,
            passed,
            evaluated_at: Some(Utc::now()),
            threshold: Some(phase.gate_threshold),
            actual_value,
            blocking_failures,
        }
    }

    fn record_gate(&mut self, phase: &PhaseDefinition, gate_result: GateResult) {
        self.session.add_gate_result(gate_result.clone());

        let mut gate_status: HashMap<String, bool> = self
            .store
            .get("kernel.gate_status")
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        gate_status.insert(phase.name.clone(), gate_result.passed);
        self.store
            .set_internal("kernel.gate_status", json!(gate_status), "conductor")
            .ok();
    }

    fn finish_phase_result(&mut self, phase: &PhaseDefinition, result: PhaseResult) {
        if matches!(result.status, PhaseStatus::Blocked | PhaseStatus::Failed) {
            self.store.record_error(
                "phase_failure",
                &format!(
                    "phase '{}' ended as {:?}: {}",
                    phase.name,
                    result.status,
                    result.errors.join("; ")
                ),
                "conductor",
            );
        }

        self.session.current_phase = Some(phase.name.clone());
        self.session.add_phase_result(result.clone());

        let mut phase_history: Vec<String> = self
            .store
            .get("kernel.phase_history")
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        if result.status == PhaseStatus::Completed && !phase_history.contains(&phase.name) {
            phase_history.push(phase.name.clone());
            self.store
                .set_internal("kernel.phase_history", json!(phase_history), "conductor")
                .ok();
        }
        self.store
            .set_internal("kernel.current_phase", json!(phase.name), "conductor")
            .ok();

        let status_str = phase_status_label(result.status);
        self.store
            .set_phase_state(&phase.name, json!({"status": status_str}));

        let metadata = PhaseMetadataRecord {
            state: status_str.to_string(),
            entered_at: result.started_at.map(|t| t.to_rfc3339()),
            entered_by: Some("conductor".to_string()),
            gate_conditions_passed: Vec::new(),
            gate_conditions_failed: Vec::new(),
            invalidated_by_phase: None,
            approval_comment: None,
            approved_by: None,
            approved_at: None,
        };
        self.store
            .set_internal(
                &format!("phase_metadata.{}", phase.name),
                serde_json::to_value(&metadata).unwrap_or(Value::Null),
                "conductor",
            )
            .ok();

        let total_phases = self.registry.get_phases_in_order().len();
        if self.session.completed_phases.len() == total_phases {
            self.session.status = SessionStatus::Completed;
            self.store
                .set_internal("kernel.status", json!("completed"), "conductor")
                .ok();
        }
    }
}

impl Default for Conductor {
    fn default() -> Self {
        Self::new()
    }
}

fn phase_status_label(status: PhaseStatus) -> &'static str {
    match status {
        PhaseStatus::Pending => "pending",
        PhaseStatus::Running => "running",
        PhaseStatus::Completed => "completed",
        PhaseStatus::Failed => "failed",
        PhaseStatus::Skipped => "skipped",
        PhaseStatus::Blocked => "blocked",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded_conductor() -> Conductor {
        let mut c = Conductor::new();
        c.create_session("d1");
        c
    }

    /// S1: a refinable write is blocked outside a transaction and allowed
    /// inside one.
    #[test]
    fn s1_refinable_write_requires_a_transaction() {
        let mut c = seeded_conductor();
        let err = c.set("hull.loa", json!(24.0), "agent").unwrap_err();
        assert!(matches!(err, KernelError::MutationEnforcement { .. }));

        let txn_id = c.begin_transaction().unwrap();
        c.set("hull.loa", json!(24.0), "agent").unwrap();
        assert_eq!(c.get("hull.loa"), Some(json!(24.0)));
        c.commit_transaction(&txn_id).unwrap();
        assert_eq!(c.design_version(), 1);
    }

    /// S2: running the hull phase with mission requirements set but no
    /// hull dimensions seeds them via synthesis and completes the phase.
    #[test]
    fn s2_hull_phase_runs_synthesis_when_dimensions_are_missing() {
        let mut c = seeded_conductor();
        let txn_id = c.begin_transaction().unwrap();
        c.set("mission.max_speed_kts", json!(22.0), "agent").unwrap();
        c.commit_transaction(&txn_id).unwrap();

        let mission_result = c.run_phase("mission").unwrap();
        assert_eq!(mission_result.status, PhaseStatus::Completed);

        let hull_result = c.run_phase("hull").unwrap();
        assert_eq!(hull_result.status, PhaseStatus::Completed);
        assert!(c.get("hull.lwl").and_then(|v| v.as_f64()).unwrap() > 0.0);
        assert!(c.get("hull.displacement_m3").and_then(|v| v.as_f64()).unwrap() > 0.0);
    }

    /// S3: a phase blocked on an incomplete dependency never runs its
    /// validators.
    #[test]
    fn s3_dependency_not_completed_blocks_the_phase() {
        let mut c = seeded_conductor();
        let result = c.run_phase("hull").unwrap();
        assert_eq!(result.status, PhaseStatus::Blocked);
        assert_eq!(result.validators_run, 0);
    }

    fn run_through_compliance(c: &mut Conductor, required_gm: f64) {
        let txn_id = c.begin_transaction().unwrap();
        c.set("mission.max_speed_kts", json!(18.0), "agent").unwrap();
        c.set("mission.gm_required_m", json!(required_gm), "agent")
            .unwrap();
        c.commit_transaction(&txn_id).unwrap();

        for phase in ["mission", "hull", "structure", "propulsion", "weight", "stability", "loading"] {
            c.run_phase(phase).unwrap();
        }
    }

    /// S4: the compliance gate fails the phase when GM does not clear the
    /// requirement, and the failure is visible on the result and the gate
    /// record.
    #[test]
    fn s4_compliance_gate_fails_when_gm_is_insufficient() {
        let mut c = seeded_conductor();
        run_through_compliance(&mut c, 50.0);

        let result = c.run_phase("compliance").unwrap();
        assert_eq!(result.status, PhaseStatus::Failed);
        let summary = c.get_status_summary();
        let gate = summary.gate_results.get("compliance").unwrap();
        assert!(!gate.passed);
    }

    /// S5: a manual gate only passes after an explicit approval.
    #[test]
    fn s5_manual_gate_requires_explicit_approval() {
        let mut c = seeded_conductor();
        run_through_compliance(&mut c, 0.1);
        c.run_phase("compliance").unwrap();

        let phase = PhaseDefinition {
            name: "manual_gate".to_string(),
            description: "test-only manual gate".to_string(),
            phase_type: keelmark_types::PhaseType::Verification,
            order: 99,
            depends_on: Vec::new(),
            validators: Vec::new(),
            is_gate: true,
            gate_condition: GateCondition::Manual,
            gate_threshold: 1.0,
            state_namespace: "optimization".to_string(),
            contract: Default::default(),
        };
        let mut result = PhaseResult::new("manual_gate", PhaseStatus::Completed);
        result.completed_at = Some(Utc::now());

        let before = c.evaluate_gate(&phase, &result);
        assert!(!before.passed);

        c.manual_approvals.insert("manual_gate".to_string());
        let after = c.evaluate_gate(&phase, &result);
        assert!(after.passed);
    }

    /// S6: alias normalization resolves before the write lands.
    #[test]
    fn s6_alias_normalizes_onto_the_canonical_path() {
        let mut c = seeded_conductor();
        let txn_id = c.begin_transaction().unwrap();
        c.set("mission.max_speed_knots", json!(20.0), "agent").unwrap();
        c.commit_transaction(&txn_id).unwrap();
        assert_eq!(c.get("mission.max_speed_kts"), Some(json!(20.0)));
    }

    /// S7: the design round-trips through `load_design` unchanged.
    #[test]
    fn s7_design_round_trips_through_load_design() {
        let mut c = seeded_conductor();
        let txn_id = c.begin_transaction().unwrap();
        c.set("hull.loa", json!(30.0), "agent").unwrap();
        c.commit_transaction(&txn_id).unwrap();

        let exported = c.design_state().clone();
        let mut fresh = Conductor::new();
        fresh.load_design(exported.clone());
        assert_eq!(fresh.get("hull.loa"), Some(json!(30.0)));
    }

    #[test]
    fn unknown_phase_name_is_not_found() {
        let mut c = seeded_conductor();
        let err = c.run_phase("no-such-phase").unwrap_err();
        assert!(matches!(err, KernelError::NotFound { .. }));
    }

    #[test]
    fn run_all_phases_stops_at_the_first_blocked_phase_by_default() {
        let mut c = seeded_conductor();
        let results = c.run_all_phases(true).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].phase_name, "mission");
    }

    #[test]
    fn run_to_phase_executes_only_the_prefix() {
        let mut c = seeded_conductor();
        let txn_id = c.begin_transaction().unwrap();
        c.set("mission.max_speed_kts", json!(20.0), "agent").unwrap();
        c.commit_transaction(&txn_id).unwrap();

        let results = c.run_to_phase("hull").unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results.last().unwrap().phase_name, "hull");
    }

    #[test]
    fn approve_gate_rejects_a_non_gate_phase() {
        let mut c = seeded_conductor();
        let err = c.approve_gate("mission").unwrap_err();
        assert!(matches!(err, KernelError::InvalidRequest { .. }));
    }

    #[test]
    fn load_session_replays_manual_gate_approvals() {
        let mut c = seeded_conductor();
        run_through_compliance(&mut c, 0.1);
        c.run_phase("compliance").unwrap();

        let phase = PhaseDefinition {
            name: "manual_gate".to_string(),
            description: "test-only manual gate".to_string(),
            phase_type: keelmark_types::PhaseType::Verification,
            order: 99,
            depends_on: Vec::new(),
            validators: Vec::new(),
            is_gate: true,
            gate_condition: GateCondition::Manual,
            gate_threshold: 1.0,
            state_namespace: "optimization".to_string(),
            contract: Default::default(),
        };
        c.manual_approvals.insert("manual_gate".to_string());
        let mut result = PhaseResult::new("manual_gate", PhaseStatus::Completed);
        result.completed_at = Some(Utc::now());
        let gate_result = c.evaluate_gate(&phase, &result);
        c.record_gate(&phase, gate_result);

        let exported_session = c.session().clone();
        let mut fresh = Conductor::new();
        fresh.load_session(exported_session);
        assert!(fresh.manual_approvals.contains("manual_gate"));
    }

    #[test]
    fn get_status_summary_runs_the_kernel_validator() {
        let mut c = seeded_conductor();
        let summary = c.get_status_summary();
        assert_eq!(summary.design_id, "d1");
        assert_eq!(summary.total_phases, 13);
    }
}
