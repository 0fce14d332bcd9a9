//! # Registry
//!
//! The static phase dependency DAG: thirteen [`PhaseDefinition`]s,
//! each naming its order, dependencies, validators, gate condition, the
//! design-state section it owns, and the contract the conductor checks
//! before and after it runs.
//!
//! The DAG itself never changes at runtime — [`PhaseRegistry::new`]
//! validates it once at construction (no cycles, every dependency target
//! exists, orders strictly increasing across edges) and panics if that
//! ever stops holding, the same way a corrupt built-in constant would.

use std::collections::{BTreeSet, HashMap, VecDeque};

use keelmark_types::{GateCondition, PhaseType};

/// Required-input and required-output paths the contract checker
/// evaluates before and after a phase runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseContractSpec {
    pub required_inputs: Vec<String>,
    pub required_outputs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseDefinition {
    pub name: String,
    pub description: String,
    pub phase_type: PhaseType,
    pub order: u32,
    pub depends_on: Vec<String>,
    pub validators: Vec<String>,
    pub is_gate: bool,
    pub gate_condition: GateCondition,
    pub gate_threshold: f64,
    pub state_namespace: String,
    pub contract: PhaseContractSpec,
}

fn phase(
    name: &str,
    description: &str,
    phase_type: PhaseType,
    order: u32,
    depends_on: &[&str],
    validators: &[&str],
    state_namespace: &str,
    contract: PhaseContractSpec,
) -> PhaseDefinition {
    PhaseDefinition {
        name: name.to_string(),
        description: description.to_string(),
        phase_type,
        order,
        depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
        validators: validators.iter().map(|s| s.to_string()).collect(),
        is_gate: false,
        gate_condition: GateCondition::AllPass,
        gate_threshold: 1.0,
        state_namespace: state_namespace.to_string(),
        contract,
    }
}

fn contract(inputs: &[&str], outputs: &[&str]) -> PhaseContractSpec {
    PhaseContractSpec {
        required_inputs: inputs.iter().map(|s| s.to_string()).collect(),
        required_outputs: outputs.iter().map(|s| s.to_string()).collect(),
    }
}

/// The thirteen built-in phases, in dependency order.
fn default_phases() -> Vec<PhaseDefinition> {
    vec![
        phase(
            "mission",
            "Mission requirements and configuration",
            PhaseType::Definition,
            1,
            &[],
            &["mission/requirements"],
            "mission",
            contract(&[], &["mission.vessel_type"]),
        ),
        phase(
            "hull",
            "Hull form definition and hydrostatics",
            PhaseType::Analysis,
            2,
            &["mission"],
            &["hull/form", "physics/hydrostatics"],
            "hull",
            contract(
                &["hull.lwl", "hull.beam", "hull.draft", "hull.cb"],
                &["hull.displacement_m3"],
            ),
        ),
        phase(
            "structure",
            "Structural design and analysis",
            PhaseType::Analysis,
            3,
            &["hull"],
            &["structure/scantlings"],
            "structural_design",
            contract(&["hull.displacement_m3"], &["structural_design"]),
        ),
        phase(
            "propulsion",
            "Propulsion system sizing",
            PhaseType::Analysis,
            4,
            &["hull"],
            &["propulsion/sizing"],
            "propulsion",
            contract(&["hull.displacement_m3"], &["propulsion.total_installed_power_kw"]),
        ),
        phase(
            "weight",
            "Weight estimation",
            PhaseType::Analysis,
            5,
            &["hull", "structure", "propulsion"],
            &["weight/estimation"],
            "weight",
            contract(
                &["structural_design", "propulsion.total_installed_power_kw"],
                &["weight.lightship_weight_mt"],
            ),
        ),
        phase(
            "stability",
            "Stability analysis",
            PhaseType::Analysis,
            6,
            &["weight"],
            &["stability/intact_gm", "stability/gz_curve"],
            "stability",
            contract(&["weight.lightship_weight_mt"], &["stability.gm_transverse_m"]),
        ),
        phase(
            "loading",
            "Loading conditions",
            PhaseType::Integration,
            7,
            &["weight", "stability"],
            &["loading/computer"],
            "loading",
            contract(
                &["weight.lightship_weight_mt", "stability.gm_transverse_m"],
                &["loading"],
            ),
        ),
        phase(
            "arrangement",
            "General arrangement",
            PhaseType::Integration,
            8,
            &["hull"],
            &["arrangement/generator"],
            "arrangement",
            contract(&["hull.displacement_m3"], &["arrangement"]),
        ),
        {
            let mut p = phase(
                "compliance",
                "Regulatory compliance verification",
                PhaseType::Verification,
                9,
                &["stability", "loading"],
                &["compliance/regulatory"],
                "compliance",
                contract(
                    &["stability.gm_transverse_m", "loading"],
                    &["compliance.status"],
                ),
            );
            p.is_gate = true;
            p.gate_condition = GateCondition::CriticalPass;
            p
        },
        phase(
            "production",
            "Production planning",
            PhaseType::Verification,
            10,
            &["structure", "weight"],
            &["production/planning"],
            "production",
            contract(&["structural_design", "weight.lightship_weight_mt"], &["production"]),
        ),
        phase(
            "cost",
            "Cost estimation",
            PhaseType::Verification,
            11,
            &["production"],
            &["cost/estimation"],
            "cost",
            contract(&["production"], &["cost"]),
        ),
        phase(
            "optimization",
            "Design optimization",
            PhaseType::Output,
            12,
            &["cost", "compliance"],
            &["optimization/design"],
            "optimization",
            contract(&["cost", "compliance.status"], &["optimization"]),
        ),
        phase(
            "reporting",
            "Report generation",
            PhaseType::Output,
            13,
            &["compliance", "cost"],
            &["reporting/generator"],
            "reports",
            contract(&["compliance.status", "cost"], &["reports"]),
        ),
    ]
}

/// Registry of phase definitions and their dependency DAG.
#[derive(Debug, Clone)]
pub struct PhaseRegistry {
    phases: HashMap<String, PhaseDefinition>,
}

impl PhaseRegistry {
    /// Builds the registry from the thirteen built-in phase definitions
    /// and validates the DAG. Panics if the built-in table is ever edited
    /// into an invalid shape — this is a programmer error, not a runtime
    /// condition callers should handle.
    pub fn new() -> Self {
        let mut phases = HashMap::new();
        for def in default_phases() {
            phases.insert(def.name.clone(), def);
        }
        let registry = Self { phases };
        registry
            .validate_dag()
            .expect("built-in phase DAG must be acyclic with every dependency target present");
        registry
    }

    pub fn get_phase(&self, name: &str) -> Option<&PhaseDefinition> {
        self.phases.get(name)
    }

    pub fn get_phases_in_order(&self) -> Vec<&PhaseDefinition> {
        let mut phases: Vec<&PhaseDefinition> = self.phases.values().collect();
        phases.sort_by_key(|p| p.order);
        phases
    }

    pub fn get_phases_for_namespace(&self, namespace: &str) -> Vec<&PhaseDefinition> {
        self.phases
            .values()
            .filter(|p| p.state_namespace == namespace)
            .collect()
    }

    pub fn get_gate_phases(&self) -> Vec<&PhaseDefinition> {
        self.phases.values().filter(|p| p.is_gate).collect()
    }

    /// Transitive dependencies of `phase_name`, breadth-first.
    pub fn get_dependencies(&self, phase_name: &str) -> Vec<String> {
        let Some(phase) = self.phases.get(phase_name) else {
            return Vec::new();
        };

        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<String> = phase.depends_on.iter().cloned().collect();
        while let Some(dep) = queue.pop_front() {
            if seen.insert(dep.clone()) {
                if let Some(dep_phase) = self.phases.get(&dep) {
                    queue.extend(dep_phase.depends_on.iter().cloned());
                }
            }
        }
        seen.into_iter().collect()
    }

    /// Direct dependents of `phase_name` (phases that name it in
    /// `depends_on`), not transitive.
    pub fn get_dependents(&self, phase_name: &str) -> Vec<String> {
        let mut dependents: Vec<String> = self
            .phases
            .values()
            .filter(|p| p.depends_on.iter().any(|d| d == phase_name))
            .map(|p| p.name.clone())
            .collect();
        dependents.sort();
        dependents
    }

    /// Kahn's algorithm over the phase DAG: returns execution order on
    /// success, an error naming the cycle (or the missing dependency
    /// target) otherwise.
    pub fn validate_dag(&self) -> Result<Vec<String>, String> {
        let names: BTreeSet<&String> = self.phases.keys().collect();

        for def in self.phases.values() {
            for dep in &def.depends_on {
                if !self.phases.contains_key(dep) {
                    return Err(format!(
                        "phase '{}' depends on unknown phase '{}'",
                        def.name, dep
                    ));
                }
                let dep_order = self.phases[dep].order;
                if dep_order >= def.order {
                    return Err(format!(
                        "phase '{}' (order {}) must come after its dependency '{}' (order {})",
                        def.name, def.order, dep, dep_order
                    ));
                }
            }
        }

        let mut indegree: HashMap<&str, usize> = HashMap::new();
        for name in &names {
            let count = self.phases[name.as_str()].depends_on.len();
            indegree.insert(name.as_str(), count);
        }

        let mut ready: BTreeSet<&str> = indegree
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(name, _)| *name)
            .collect();

        let mut out = Vec::with_capacity(names.len());
        while let Some(name) = ready.iter().next().copied() {
            ready.remove(name);
            out.push(name.to_string());

            for dependent in self.get_dependents(name) {
                let entry = indegree.get_mut(dependent.as_str()).expect("known phase");
                *entry = entry.saturating_sub(1);
                if *entry == 0 {
                    ready.insert(self.phases[&dependent].name.as_str());
                }
            }
        }

        if out.len() != names.len() {
            return Err("phase dependency graph contains a cycle".to_string());
        }
        Ok(out)
    }
}

impl Default for PhaseRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_registry_has_thirteen_phases() {
        let registry = PhaseRegistry::new();
        assert_eq!(registry.phases.len(), 13);
    }

    #[test]
    fn phases_in_order_are_monotonically_increasing() {
        let registry = PhaseRegistry::new();
        let orders: Vec<u32> = registry.get_phases_in_order().iter().map(|p| p.order).collect();
        let mut sorted = orders.clone();
        sorted.sort();
        assert_eq!(orders, sorted);
    }

    #[test]
    fn only_compliance_is_a_gate() {
        let registry = PhaseRegistry::new();
        let gates = registry.get_gate_phases();
        assert_eq!(gates.len(), 1);
        assert_eq!(gates[0].name, "compliance");
        assert_eq!(gates[0].gate_condition, GateCondition::CriticalPass);
    }

    #[test]
    fn hull_depends_on_mission() {
        let registry = PhaseRegistry::new();
        let hull = registry.get_phase("hull").unwrap();
        assert_eq!(hull.depends_on, vec!["mission".to_string()]);
    }

    #[test]
    fn weight_transitive_dependencies_include_mission() {
        let registry = PhaseRegistry::new();
        let deps = registry.get_dependencies("weight");
        assert!(deps.contains(&"mission".to_string()));
        assert!(deps.contains(&"hull".to_string()));
        assert!(deps.contains(&"structure".to_string()));
        assert!(deps.contains(&"propulsion".to_string()));
    }

    #[test]
    fn hull_dependents_include_structure_and_propulsion_and_arrangement() {
        let registry = PhaseRegistry::new();
        let dependents = registry.get_dependents("hull");
        assert!(dependents.contains(&"structure".to_string()));
        assert!(dependents.contains(&"propulsion".to_string()));
        assert!(dependents.contains(&"arrangement".to_string()));
    }

    #[test]
    fn namespace_lookup_finds_owning_phase() {
        let registry = PhaseRegistry::new();
        let owners = registry.get_phases_for_namespace("structural_design");
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].name, "structure");
    }

    #[test]
    fn validate_dag_succeeds_on_the_built_in_table() {
        let registry = PhaseRegistry::new();
        let order = registry.validate_dag().unwrap();
        assert_eq!(order.len(), 13);
        let mission_pos = order.iter().position(|n| n == "mission").unwrap();
        let hull_pos = order.iter().position(|n| n == "hull").unwrap();
        assert!(mission_pos < hull_pos);
    }
}
