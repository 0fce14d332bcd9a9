//! [`StateStore`]: path-addressed reads and writes over a [`DesignState`].
//!
//! Reads go through a full `serde_json::to_value` round-trip of the state
//! — safe, since a plain-data struct can't fail to serialize, and it gives
//! every one of the 27 sections uniform dotted-path navigation for free.
//! Writes are narrower: a per-section dispatch lands each value on its
//! named field (so a bad value can only ever corrupt the field it targets,
//! never the whole state), falling back to the section's open `extra` map
//! for anything the schema hasn't named yet.

use std::collections::HashMap;

use chrono::Utc;
use keelmark_schema::{is_refinable, is_valid_path, normalize_path};
use keelmark_types::{
    DesignState, GzPoint, HistoryAction, HistoryEntry, KernelError, KernelResult,
};
use serde_json::Value;

/// The result of a strict path lookup: distinguishes "the path resolves to
/// `null`" from "nothing is there at all". [`StateStore::get`] collapses
/// both to `None`; callers that need the distinction use
/// [`StateStore::get_strict`] directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Present(Value),
    Missing,
}

impl Fetched {
    pub fn into_option(self) -> Option<Value> {
        match self {
            Fetched::Present(v) => Some(v),
            Fetched::Missing => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Fetched::Present(_))
    }
}

#[derive(Debug, Clone)]
pub struct StateStore {
    state: DesignState,
}

impl StateStore {
    pub fn new(state: DesignState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &DesignState {
        &self.state
    }

    pub fn into_state(self) -> DesignState {
        self.state
    }

    /// Strict lookup: resolves aliases, then navigates the full JSON
    /// representation of the design. Expects the raw (possibly informal)
    /// path; aliases are resolved internally. Fails with `InvalidPath` if
    /// the (normalized) path does not resolve through the schema; a
    /// schema-valid field that has never been assigned serializes to
    /// `null`, which collapses to `Fetched::Missing` rather than
    /// `Present(Value::Null)` — `MISSING` must be disjoint from every
    /// field's default, and `null` is never a real default here.
    pub fn get_strict(&self, path: &str) -> KernelResult<Fetched> {
        let canonical = normalize_path(path);
        if !is_valid_path(&canonical) {
            return Err(KernelError::InvalidPath { path: canonical });
        }
        let root = self.as_value();
        Ok(match navigate(&root, &canonical) {
            None | Some(Value::Null) => Fetched::Missing,
            Some(value) => Fetched::Present(value.clone()),
        })
    }

    /// Permissive lookup: an invalid path or an unassigned field both just
    /// yield `None`, same as the caller's own default would. Unlike
    /// `get_strict`, this never raises.
    pub fn get(&self, path: &str) -> Option<Value> {
        self.get_strict(path).ok().and_then(Fetched::into_option)
    }

    pub fn exists(&self, path: &str) -> KernelResult<bool> {
        Ok(self.get_strict(path)?.is_present())
    }

    /// Write a single path. `source` identifies the writer for the history
    /// log and for the mutation-enforcement error; `in_transaction` is
    /// supplied by the caller (`keelmark-core`, which owns the active
    /// transaction), not derived here. Returns the value the path held
    /// before the write, `Value::Null` if it held nothing.
    pub fn set(
        &mut self,
        path: &str,
        value: Value,
        source: &str,
        in_transaction: bool,
    ) -> KernelResult<Value> {
        let canonical = normalize_path(path);
        if !is_valid_path(&canonical) {
            return Err(KernelError::InvalidPath { path: canonical });
        }
        if is_refinable(&canonical) && !in_transaction {
            return Err(KernelError::MutationEnforcement {
                path: canonical,
                source: source.to_string(),
            });
        }

        let old_value = self.get(&canonical).unwrap_or(Value::Null);
        self.write(&canonical, value.clone())?;
        self.touch_updated_at();
        self.state.history.push(HistoryEntry {
            timestamp: Utc::now(),
            source: source.to_string(),
            action: HistoryAction::Set {
                path: canonical,
                old_value: old_value.clone(),
                new_value: value,
            },
        });
        Ok(old_value)
    }

    /// Write a single path bypassing the mutation gate entirely. For
    /// kernel-owned writes — a phase writing its own computed outputs, a
    /// validator recording a finding — not for anything a user or agent
    /// action plan would call directly.
    pub fn set_internal(&mut self, path: &str, value: Value, source: &str) -> KernelResult<Value> {
        let canonical = normalize_path(path);
        if !is_valid_path(&canonical) {
            return Err(KernelError::InvalidPath { path: canonical });
        }

        let old_value = self.get(&canonical).unwrap_or(Value::Null);
        self.write(&canonical, value.clone())?;
        self.touch_updated_at();
        self.state.history.push(HistoryEntry {
            timestamp: Utc::now(),
            source: source.to_string(),
            action: HistoryAction::Set {
                path: canonical,
                old_value: old_value.clone(),
                new_value: value,
            },
        });
        Ok(old_value)
    }

    /// Apply several writes as one unit: every path is validated and
    /// gate-checked before anything is written, so a patch never leaves
    /// the design half-updated. Logs a single `Patch` history entry rather
    /// than one `Set` per path.
    pub fn patch(
        &mut self,
        updates: &[(String, Value)],
        source: &str,
        in_transaction: bool,
    ) -> KernelResult<Vec<String>> {
        let mut canonical_updates = Vec::with_capacity(updates.len());
        for (path, value) in updates {
            let canonical = normalize_path(path);
            if !is_valid_path(&canonical) {
                return Err(KernelError::InvalidPath { path: canonical });
            }
            if is_refinable(&canonical) && !in_transaction {
                return Err(KernelError::MutationEnforcement {
                    path: canonical,
                    source: source.to_string(),
                });
            }
            canonical_updates.push((canonical, value.clone()));
        }

        let mut touched = Vec::with_capacity(canonical_updates.len());
        for (canonical, value) in canonical_updates {
            self.write(&canonical, value)?;
            touched.push(canonical);
        }

        self.touch_updated_at();
        self.state.history.push(HistoryEntry {
            timestamp: Utc::now(),
            source: source.to_string(),
            action: HistoryAction::Patch {
                paths_modified: touched.clone(),
            },
        });
        Ok(touched)
    }

    /// Phase output bookkeeping (`phase_states`) bypasses the generic path
    /// dispatch entirely — it is keyed by phase name, not a schema path,
    /// and only the conductor writes it.
    pub fn set_phase_state(&mut self, phase: &str, value: Value) {
        self.state.phase_states.insert(phase.to_string(), value);
        self.touch_updated_at();
    }

    pub fn get_phase_state(&self, phase: &str) -> Option<&Value> {
        self.state.phase_states.get(phase)
    }

    pub fn get_phase_states(&self) -> &HashMap<String, Value> {
        &self.state.phase_states
    }

    /// Leaf-level diff against another design, dotted-path keyed.
    /// Sequences (`gz_curve`, `phase_history`, ...) are compared as whole
    /// values, not element-by-element.
    pub fn diff(&self, other: &DesignState) -> Vec<(String, Value, Value)> {
        let a = self.as_value();
        let b = serde_json::to_value(other).unwrap_or(Value::Null);
        let mut changes = Vec::new();
        diff_values("", &a, &b, &mut changes);
        changes
    }

    pub fn validate(&self) -> Vec<String> {
        self.state.validate()
    }

    pub fn summary(&self) -> String {
        self.state.summary()
    }

    pub fn snapshot(&self) -> DesignState {
        self.state.deep_copy()
    }

    pub fn restore(&mut self, snapshot: DesignState) {
        self.state = snapshot;
    }

    pub fn to_dict(&self) -> Value {
        self.as_value()
    }

    pub fn from_dict(value: Value) -> anyhow::Result<DesignState> {
        Ok(serde_json::from_value(value)?)
    }

    fn as_value(&self) -> Value {
        serde_json::to_value(&self.state).unwrap_or(Value::Null)
    }

    fn touch_updated_at(&mut self) {
        self.state.updated_at = Some(Utc::now().to_rfc3339());
    }

    /// Advances the design version counter. Called exactly once per
    /// committed transaction by whoever owns the transaction lifecycle
    /// (`keelmark-core`'s `Conductor`) — never by `set`/`patch` themselves,
    /// so a design's version only moves at commit, never on every write.
    pub fn bump_design_version(&mut self) -> u64 {
        self.state.design_version += 1;
        self.state.design_version
    }

    pub fn design_version(&self) -> u64 {
        self.state.design_version
    }

    /// Records the history entries transactions, gate approvals, and
    /// recovered errors leave behind. `StateStore` never decides *when*
    /// these happen — `keelmark-core` calls these at the matching point in
    /// the transaction/gate lifecycle.
    pub fn record_transaction_commit(&mut self, txn_id: &str, source: &str) {
        self.push_history(source, HistoryAction::TransactionCommit {
            txn_id: txn_id.to_string(),
        });
    }

    pub fn record_transaction_rollback(&mut self, txn_id: &str, source: &str) {
        self.push_history(source, HistoryAction::TransactionRollback {
            txn_id: txn_id.to_string(),
        });
    }

    pub fn record_gate_approved(&mut self, phase: &str, source: &str) {
        self.push_history(source, HistoryAction::GateApproved {
            phase: phase.to_string(),
        });
    }

    /// Every recovered condition (a blocked/failed phase, a non-convergent
    /// synthesis run) writes a record here with `source = "kernel/<component>"`
    /// per the uniform error-handling policy; nothing is swallowed silently.
    pub fn record_error(&mut self, kind: &str, message: &str, source: &str) {
        self.push_history(source, HistoryAction::Error {
            kind: kind.to_string(),
            message: message.to_string(),
        });
    }

    fn push_history(&mut self, source: &str, action: HistoryAction) {
        self.state.history.push(HistoryEntry {
            timestamp: Utc::now(),
            source: source.to_string(),
            action,
        });
        self.touch_updated_at();
    }

    fn write(&mut self, path: &str, value: Value) -> KernelResult<()> {
        let mut parts = path.splitn(2, '.');
        let section = parts.next().unwrap_or(path);
        let rest = parts.next();

        match section {
            "mission" => write_mission(&mut self.state, rest, value),
            "hull" => write_hull(&mut self.state, rest, value),
            "propulsion" => write_propulsion(&mut self.state, rest, value),
            "weight" => write_weight(&mut self.state, rest, value),
            "stability" => write_stability(&mut self.state, rest, value),
            "compliance" => write_compliance(&mut self.state, rest, value),
            "kernel" => write_kernel(&mut self.state, rest, value),
            other => {
                if let Some(extra) = open_section_extra_mut(&mut self.state, other) {
                    write_extra(extra, rest, value);
                    Ok(())
                } else {
                    write_top_level(&mut self.state, other, rest, value, path)
                }
            }
        }
    }
}

fn navigate<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        if segment == "extra" {
            continue;
        }
        current = current.get(segment)?;
    }
    Some(current)
}

fn diff_values(prefix: &str, a: &Value, b: &Value, out: &mut Vec<(String, Value, Value)>) {
    match (a, b) {
        (Value::Object(ao), Value::Object(bo)) => {
            let mut keys: Vec<&String> = ao.keys().chain(bo.keys()).collect();
            keys.sort();
            keys.dedup();
            for key in keys {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                let av = ao.get(key).unwrap_or(&Value::Null);
                let bv = bo.get(key).unwrap_or(&Value::Null);
                diff_values(&path, av, bv, out);
            }
        }
        _ => {
            if a != b {
                out.push((prefix.to_string(), a.clone(), b.clone()));
            }
        }
    }
}

fn value_to_opt_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn value_to_opt_f64(value: Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn value_to_opt_u32(value: Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().map(|v| v as u32),
        _ => None,
    }
}

fn value_to_u32(value: Value) -> u32 {
    value_to_opt_u32(value).unwrap_or(0)
}

fn value_to_bool(value: Value) -> bool {
    matches!(value, Value::Bool(true))
}

/// Splits a section-relative field path into its leading key and whatever
/// sits under an explicit `extra.` prefix, so `hull.extra.foo` and a bare
/// unknown `hull.foo` land in the same place.
fn split_extra<'a>(field: &'a str) -> (&'a str, Option<&'a str>) {
    let mut parts = field.splitn(2, '.');
    let key = parts.next().unwrap_or(field);
    if key == "extra" {
        ("extra", parts.next())
    } else {
        (key, None)
    }
}

fn write_extra(extra: &mut HashMap<String, Value>, rest: Option<&str>, value: Value) {
    let Some(field) = rest else { return };
    let (key, extra_key) = split_extra(field);
    match extra_key {
        Some(k) => {
            extra.insert(k.to_string(), value);
        }
        None if key == "extra" => {
            if let Value::Object(map) = value {
                *extra = map.into_iter().collect();
            }
        }
        None => {
            extra.insert(key.to_string(), value);
        }
    }
}

fn write_mission(state: &mut DesignState, rest: Option<&str>, value: Value) -> KernelResult<()> {
    let Some(field) = rest else { return Ok(()) };
    let (key, _) = split_extra(field);
    if key == "extra" {
        write_extra(&mut state.mission.extra, Some(field), value);
        return Ok(());
    }
    match key {
        "vessel_type" => state.mission.vessel_type = value_to_opt_string(value),
        "max_speed_kts" => state.mission.max_speed_kts = value_to_opt_f64(value),
        "cruise_speed_kts" => state.mission.cruise_speed_kts = value_to_opt_f64(value),
        "range_nm" => state.mission.range_nm = value_to_opt_f64(value),
        "crew_count" => state.mission.crew_count = value_to_opt_u32(value),
        "cargo_capacity_mt" => state.mission.cargo_capacity_mt = value_to_opt_f64(value),
        "gm_required_m" => state.mission.gm_required_m = value_to_opt_f64(value),
        "loa_m" => state.mission.loa_m = value_to_opt_f64(value),
        other => {
            state.mission.extra.insert(other.to_string(), value);
        }
    }
    Ok(())
}

fn write_hull(state: &mut DesignState, rest: Option<&str>, value: Value) -> KernelResult<()> {
    let Some(field) = rest else { return Ok(()) };
    let (key, _) = split_extra(field);
    if key == "extra" {
        write_extra(&mut state.hull.extra, Some(field), value);
        return Ok(());
    }
    match key {
        "loa" => state.hull.loa = value_to_opt_f64(value),
        "lwl" => state.hull.lwl = value_to_opt_f64(value),
        "beam" => state.hull.beam = value_to_opt_f64(value),
        "beam_wl" => state.hull.beam_wl = value_to_opt_f64(value),
        "draft" => state.hull.draft = value_to_opt_f64(value),
        "depth" => state.hull.depth = value_to_opt_f64(value),
        "cb" => state.hull.cb = value_to_opt_f64(value),
        "cp" => state.hull.cp = value_to_opt_f64(value),
        "cm" => state.hull.cm = value_to_opt_f64(value),
        "cwp" => state.hull.cwp = value_to_opt_f64(value),
        "displacement_m3" => state.hull.displacement_m3 = value_to_opt_f64(value),
        "displacement_kg" => state.hull.displacement_kg = value_to_opt_f64(value),
        "displacement_mt" => state.hull.displacement_mt = value_to_opt_f64(value),
        "hull_type" => state.hull.hull_type = value_to_opt_string(value),
        "hull_family" => state.hull.hull_family = value_to_opt_string(value),
        "deadrise_deg" => state.hull.deadrise_deg = value_to_opt_f64(value),
        other => {
            state.hull.extra.insert(other.to_string(), value);
        }
    }
    Ok(())
}

fn write_propulsion(state: &mut DesignState, rest: Option<&str>, value: Value) -> KernelResult<()> {
    let Some(field) = rest else { return Ok(()) };
    let (key, _) = split_extra(field);
    if key == "extra" {
        write_extra(&mut state.propulsion.extra, Some(field), value);
        return Ok(());
    }
    match key {
        "num_engines" => state.propulsion.num_engines = value_to_u32(value),
        "num_propellers" => state.propulsion.num_propellers = value_to_u32(value),
        "total_installed_power_kw" => {
            state.propulsion.total_installed_power_kw = value_to_opt_f64(value)
        }
        other => {
            state.propulsion.extra.insert(other.to_string(), value);
        }
    }
    Ok(())
}

fn write_weight(state: &mut DesignState, rest: Option<&str>, value: Value) -> KernelResult<()> {
    let Some(field) = rest else { return Ok(()) };
    let (key, _) = split_extra(field);
    if key == "extra" {
        write_extra(&mut state.weight.extra, Some(field), value);
        return Ok(());
    }
    match key {
        "lightship_weight_mt" => state.weight.lightship_weight_mt = value_to_opt_f64(value),
        "full_load_displacement_mt" => {
            state.weight.full_load_displacement_mt = value_to_opt_f64(value)
        }
        other => {
            state.weight.extra.insert(other.to_string(), value);
        }
    }
    Ok(())
}

fn write_stability(state: &mut DesignState, rest: Option<&str>, value: Value) -> KernelResult<()> {
    let Some(field) = rest else { return Ok(()) };
    let (key, _) = split_extra(field);
    if key == "extra" {
        write_extra(&mut state.stability.extra, Some(field), value);
        return Ok(());
    }
    match key {
        "gm_transverse_m" => state.stability.gm_transverse_m = value_to_opt_f64(value),
        "gz_curve" => {
            state.stability.gz_curve =
                serde_json::from_value::<Vec<GzPoint>>(value).unwrap_or_default()
        }
        other => {
            state.stability.extra.insert(other.to_string(), value);
        }
    }
    Ok(())
}

fn write_compliance(state: &mut DesignState, rest: Option<&str>, value: Value) -> KernelResult<()> {
    let Some(field) = rest else { return Ok(()) };
    let (key, _) = split_extra(field);
    if key == "extra" {
        write_extra(&mut state.compliance.extra, Some(field), value);
        return Ok(());
    }
    match key {
        "fail_count" => state.compliance.fail_count = value_to_u32(value),
        "status" => state.compliance.status = value_to_opt_string(value),
        other => {
            state.compliance.extra.insert(other.to_string(), value);
        }
    }
    Ok(())
}

fn write_kernel(state: &mut DesignState, rest: Option<&str>, value: Value) -> KernelResult<()> {
    let Some(field) = rest else { return Ok(()) };
    let (key, _) = split_extra(field);
    if key == "extra" {
        write_extra(&mut state.kernel.extra, Some(field), value);
        return Ok(());
    }
    match key {
        "status" => state.kernel.status = value_to_opt_string(value),
        "current_phase" => state.kernel.current_phase = value_to_opt_string(value),
        "phase_history" => {
            state.kernel.phase_history =
                serde_json::from_value::<Vec<String>>(value).unwrap_or_default()
        }
        "gate_status" => {
            state.kernel.gate_status =
                serde_json::from_value::<HashMap<String, bool>>(value).unwrap_or_default()
        }
        "validation_summary" => state.kernel.validation_summary = Some(value),
        "validation_complete" => state.kernel.validation_complete = value_to_bool(value),
        "current_session" => state.kernel.current_session = value_to_opt_string(value),
        other => {
            state.kernel.extra.insert(other.to_string(), value);
        }
    }
    Ok(())
}

/// Every one of the 20 sections with no named fields yet: the whole
/// section lives in its open `extra` map.
fn open_section_extra_mut<'a>(
    state: &'a mut DesignState,
    section: &str,
) -> Option<&'a mut HashMap<String, Value>> {
    Some(match section {
        "structural_design" => &mut state.structural_design.extra,
        "structural_loads" => &mut state.structural_loads.extra,
        "loading" => &mut state.loading.extra,
        "arrangement" => &mut state.arrangement.extra,
        "production" => &mut state.production.extra,
        "cost" => &mut state.cost.extra,
        "optimization" => &mut state.optimization.extra,
        "reports" => &mut state.reports.extra,
        "analysis" => &mut state.analysis.extra,
        "performance" => &mut state.performance.extra,
        "systems" => &mut state.systems.extra,
        "outfitting" => &mut state.outfitting.extra,
        "environmental" => &mut state.environmental.extra,
        "deck_equipment" => &mut state.deck_equipment.extra,
        "vision" => &mut state.vision.extra,
        "resistance" => &mut state.resistance.extra,
        "seakeeping" => &mut state.seakeeping.extra,
        "maneuvering" => &mut state.maneuvering.extra,
        "electrical" => &mut state.electrical.extra,
        "safety" => &mut state.safety.extra,
        _ => return None,
    })
}

fn write_top_level(
    state: &mut DesignState,
    first: &str,
    rest: Option<&str>,
    value: Value,
    full_path: &str,
) -> KernelResult<()> {
    match (first, rest) {
        ("design_name", None) => state.design_name = value_to_opt_string(value),
        ("created_by", None) => state.created_by = value_to_opt_string(value),
        ("version", None) => {
            if let Some(s) = value_to_opt_string(value) {
                state.version = s;
            }
        }
        ("metadata", Some(key)) => {
            state.metadata.insert(key.to_string(), value);
        }
        ("agents", Some(key)) => {
            state.agents.insert(key.to_string(), value);
        }
        ("orchestration", Some(key)) => {
            state.orchestration.insert(key.to_string(), value);
        }
        ("locked_parameters", None) => {
            if let Value::Array(items) = value {
                state.locked_parameters = items.into_iter().filter_map(value_to_opt_string).collect();
            }
        }
        ("phase_metadata", Some(phase)) => {
            if let Ok(record) = serde_json::from_value(value) {
                state.phase_metadata.insert(phase.to_string(), record);
            }
        }
        ("phase_states", Some(phase)) => {
            state.phase_states.insert(phase.to_string(), value);
        }
        _ => return Err(KernelError::InvalidPath { path: full_path.to_string() }),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keelmark_types::DesignState;
    use serde_json::json;

    fn store() -> StateStore {
        StateStore::new(DesignState::new("d1"))
    }

    #[test]
    fn unset_named_field_is_strictly_missing() {
        let s = store();
        assert_eq!(s.get_strict("hull.loa").unwrap(), Fetched::Missing);
        assert_eq!(s.get("hull.loa"), None);
    }

    #[test]
    fn get_on_unknown_path_raises_invalid_path() {
        let s = store();
        let err = s.get_strict("hull.not_a_field").unwrap_err();
        assert!(matches!(err, KernelError::InvalidPath { .. }));
        // non-strict get is permissive: no error, just the caller's default.
        assert_eq!(s.get("hull.not_a_field"), None);
    }

    #[test]
    fn exists_raises_invalid_path_for_an_unschemed_path() {
        let s = store();
        assert!(matches!(
            s.exists("hull.not_a_field"),
            Err(KernelError::InvalidPath { .. })
        ));
        assert_eq!(s.exists("hull.loa"), Ok(false));
    }

    #[test]
    fn set_internal_writes_a_named_hull_field() {
        let mut s = store();
        s.set_internal("hull.loa", json!(24.5), "test").unwrap();
        assert_eq!(s.get("hull.loa"), Some(json!(24.5)));
    }

    #[test]
    fn set_refinable_path_without_transaction_is_rejected() {
        let mut s = store();
        let err = s.set("hull.loa", json!(24.5), "agent", false).unwrap_err();
        assert!(matches!(err, KernelError::MutationEnforcement { .. }));
    }

    #[test]
    fn set_refinable_path_inside_transaction_succeeds() {
        let mut s = store();
        s.set("hull.loa", json!(24.5), "agent", true).unwrap();
        assert_eq!(s.get("hull.loa"), Some(json!(24.5)));
    }

    #[test]
    fn set_computed_output_path_never_requires_a_transaction() {
        let mut s = store();
        s.set("weight.lightship_weight_mt", json!(120.0), "weight_phase", false)
            .unwrap();
        assert_eq!(s.get("weight.lightship_weight_mt"), Some(json!(120.0)));
    }

    #[test]
    fn set_invalid_path_is_rejected() {
        let mut s = store();
        let err = s.set("hull.not_a_field", json!(1.0), "test", true).unwrap_err();
        assert!(matches!(err, KernelError::InvalidPath { .. }));
    }

    #[test]
    fn alias_resolves_before_the_gate_check() {
        let mut s = store();
        s.set("mission.max_speed_knots", json!(22.0), "agent", true)
            .unwrap();
        assert_eq!(s.get("mission.max_speed_kts"), Some(json!(22.0)));
    }

    #[test]
    fn open_section_write_lands_in_extra() {
        let mut s = store();
        s.set_internal("systems.hvac_load_kw", json!(14.0), "systems_phase")
            .unwrap();
        assert_eq!(s.get("systems.hvac_load_kw"), Some(json!(14.0)));
    }

    #[test]
    fn set_records_a_history_entry() {
        let mut s = store();
        s.set_internal("hull.loa", json!(10.0), "test").unwrap();
        assert_eq!(s.state().history.len(), 1);
        match &s.state().history[0].action {
            HistoryAction::Set { path, new_value, .. } => {
                assert_eq!(path, "hull.loa");
                assert_eq!(new_value, &json!(10.0));
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn patch_validates_every_path_before_writing_any() {
        let mut s = store();
        let updates = vec![
            ("hull.loa".to_string(), json!(30.0)),
            ("hull.not_a_field".to_string(), json!(1.0)),
        ];
        let err = s.patch(&updates, "test", true).unwrap_err();
        assert!(matches!(err, KernelError::InvalidPath { .. }));
        assert_eq!(s.get("hull.loa"), None);
    }

    #[test]
    fn patch_logs_one_aggregate_entry() {
        let mut s = store();
        let updates = vec![
            ("hull.loa".to_string(), json!(30.0)),
            ("hull.beam".to_string(), json!(8.0)),
        ];
        s.patch(&updates, "test", true).unwrap();
        assert_eq!(s.state().history.len(), 1);
        match &s.state().history[0].action {
            HistoryAction::Patch { paths_modified } => {
                assert_eq!(paths_modified.len(), 2);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn phase_state_round_trips() {
        let mut s = store();
        s.set_phase_state("hull", json!({"confidence": 0.9}));
        assert_eq!(
            s.get_phase_state("hull"),
            Some(&json!({"confidence": 0.9}))
        );
    }

    #[test]
    fn diff_reports_only_changed_leaves() {
        let mut s = store();
        let before = s.snapshot();
        s.set_internal("hull.loa", json!(20.0), "test").unwrap();
        let changes = s.diff(&before);
        assert!(changes.iter().any(|(path, _, _)| path == "hull.loa"));
    }

    #[test]
    fn snapshot_restore_undoes_writes() {
        let mut s = store();
        let snapshot = s.snapshot();
        s.set_internal("hull.loa", json!(20.0), "test").unwrap();
        s.restore(snapshot);
        assert_eq!(s.get("hull.loa"), None);
    }

    #[test]
    fn to_dict_from_dict_round_trips() {
        let mut s = store();
        s.set_internal("hull.loa", json!(20.0), "test").unwrap();
        let dict = s.to_dict();
        let back = StateStore::from_dict(dict).unwrap();
        assert_eq!(back.hull.loa, Some(20.0));
    }
}
