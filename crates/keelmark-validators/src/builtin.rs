//! Generic, structural-level validators for every id a built-in phase
//! declares. These are sanity/presence checks and coarse placeholder
//! estimates, not naval-engineering formulae — real hydrostatics,
//! structural, and powering models are out of scope; each estimate below
//! is a simple scaling placeholder so the pipeline has something real to
//! run end to end, and is named `*_estimate`/`rom_*` to make that explicit
//! to a caller reading the state.
//!
//! Each follows the same shape as [`crate::kernel_validator::KernelValidator`]:
//! read declared paths, build findings, `finalize()`, write declared
//! outputs through `set_internal` since these are phase-computed values,
//! never user-refinable ones.

use keelmark_state::StateStore;
use keelmark_types::{
    GzPoint, KernelResult, Severity, ValidationFinding, ValidationResult,
};
use serde_json::json;

use crate::validator_trait::{Validator, ValidatorRegistry};

/// Registers one validator per built-in phase's declared validator id.
pub fn register_builtin(registry: &mut ValidatorRegistry) {
    registry.register(Box::new(MissionRequirements));
    registry.register(Box::new(HullForm));
    registry.register(Box::new(PhysicsHydrostatics));
    registry.register(Box::new(StructureScantlings));
    registry.register(Box::new(PropulsionSizing));
    registry.register(Box::new(WeightEstimation));
    registry.register(Box::new(StabilityIntactGm));
    registry.register(Box::new(StabilityGzCurve));
    registry.register(Box::new(LoadingComputer));
    registry.register(Box::new(ArrangementGenerator));
    registry.register(Box::new(ComplianceRegulatory));
    registry.register(Box::new(ProductionPlanning));
    registry.register(Box::new(CostEstimation));
    registry.register(Box::new(OptimizationDesign));
    registry.register(Box::new(ReportingGenerator));
}

fn get_f64(store: &StateStore, path: &str) -> Option<f64> {
    store.get(path).and_then(|v| v.as_f64())
}

struct MissionRequirements;

impl Validator for MissionRequirements {
    fn id(&self) -> &str {
        "mission/requirements"
    }

    fn read_paths(&self) -> Vec<String> {
        vec!["mission.max_speed_kts".to_string(), "mission.vessel_type".to_string()]
    }

    fn write_paths(&self) -> Vec<String> {
        vec!["mission.vessel_type".to_string()]
    }

    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult> {
        let mut result = ValidationResult::new(self.id());

        match get_f64(store, "mission.max_speed_kts") {
            Some(v) if v > 0.0 => {}
            _ => result.add_finding(ValidationFinding::new(
                "mis-001",
                Severity::Critical,
                "mission.max_speed_kts must be set and positive before the hull phase can run",
            )),
        }

        if store.get("mission.vessel_type").is_none() {
            let derived = store
                .get("hull.hull_family")
                .and_then(|v| v.as_str().map(|s| s.to_string()))
                .unwrap_or_else(|| "multirole".to_string());
            store.set_internal("mission.vessel_type", json!(derived), self.id())?;
        }

        result.finalize();
        Ok(result)
    }
}

struct HullForm;

impl Validator for HullForm {
    fn id(&self) -> &str {
        "hull/form"
    }

    fn read_paths(&self) -> Vec<String> {
        vec![
            "hull.lwl".to_string(),
            "hull.beam".to_string(),
            "hull.draft".to_string(),
            "hull.cb".to_string(),
        ]
    }

    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult> {
        let mut result = ValidationResult::new(self.id());

        for path in ["hull.lwl", "hull.beam", "hull.draft", "hull.cb"] {
            match get_f64(store, path) {
                Some(v) if v > 0.0 => {}
                _ => result.add_finding(ValidationFinding::new(
                    format!("hul-{path}"),
                    Severity::Critical,
                    format!("{path} must be present and positive"),
                )),
            }
        }

        if let (Some(lwl), Some(beam)) = (get_f64(store, "hull.lwl"), get_f64(store, "hull.beam")) {
            if beam > 0.0 {
                let ratio = lwl / beam;
                if !(2.5..=16.0).contains(&ratio) {
                    result.add_finding(ValidationFinding::new(
                        "hul-ratio",
                        Severity::Warning,
                        format!("LWL/beam ratio {ratio:.2} is outside the plausible 2.5-16 range"),
                    ));
                }
            }
        }

        result.finalize();
        Ok(result)
    }
}

struct PhysicsHydrostatics;

impl Validator for PhysicsHydrostatics {
    fn id(&self) -> &str {
        "physics/hydrostatics"
    }

    fn read_paths(&self) -> Vec<String> {
        vec!["hull.displacement_m3".to_string(), "hull.displacement_kg".to_string()]
    }

    fn write_paths(&self) -> Vec<String> {
        vec!["hull.displacement_kg".to_string(), "hull.displacement_mt".to_string()]
    }

    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult> {
        const SEAWATER_DENSITY_KG_M3: f64 = 1025.0;
        let mut result = ValidationResult::new(self.id());

        let Some(volume) = get_f64(store, "hull.displacement_m3") else {
            result.add_finding(ValidationFinding::new(
                "phy-001",
                Severity::Critical,
                "hull.displacement_m3 is required before hydrostatics can be checked",
            ));
            result.finalize();
            return Ok(result);
        };

        let expected_kg = volume * SEAWATER_DENSITY_KG_M3;
        match get_f64(store, "hull.displacement_kg") {
            Some(actual) if (actual - expected_kg).abs() / expected_kg.max(1.0) < 0.05 => {}
            Some(actual) => result.add_finding(ValidationFinding::new(
                "phy-002",
                Severity::Warning,
                format!(
                    "hull.displacement_kg {actual:.0} diverges from volume-derived {expected_kg:.0} by more than 5%"
                ),
            )),
            None => {
                store.set_internal("hull.displacement_kg", json!(expected_kg), self.id())?;
                store.set_internal(
                    "hull.displacement_mt",
                    json!(expected_kg / 1000.0),
                    self.id(),
                )?;
            }
        }

        result.finalize();
        Ok(result)
    }
}

struct StructureScantlings;

impl Validator for StructureScantlings {
    fn id(&self) -> &str {
        "structure/scantlings"
    }

    fn read_paths(&self) -> Vec<String> {
        vec!["hull.displacement_mt".to_string()]
    }

    fn write_paths(&self) -> Vec<String> {
        vec!["structural_design.extra".to_string()]
    }

    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult> {
        let mut result = ValidationResult::new(self.id());

        match get_f64(store, "hull.displacement_mt") {
            Some(displacement) => {
                let steel_mass_fraction_estimate = displacement * 0.30;
                store.set_internal(
                    "structural_design.steel_mass_fraction_estimate_mt",
                    json!(steel_mass_fraction_estimate),
                    self.id(),
                )?;
            }
            None => result.add_finding(ValidationFinding::new(
                "str-001",
                Severity::Error,
                "hull.displacement_mt is required before a scantlings estimate can be produced",
            )),
        }

        result.finalize();
        Ok(result)
    }
}

struct PropulsionSizing;

impl Validator for PropulsionSizing {
    fn id(&self) -> &str {
        "propulsion/sizing"
    }

    fn read_paths(&self) -> Vec<String> {
        vec!["hull.displacement_mt".to_string(), "mission.max_speed_kts".to_string()]
    }

    fn write_paths(&self) -> Vec<String> {
        vec!["propulsion.total_installed_power_kw".to_string()]
    }

    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult> {
        let mut result = ValidationResult::new(self.id());

        let displacement = get_f64(store, "hull.displacement_mt");
        let speed = get_f64(store, "mission.max_speed_kts");

        match (displacement, speed) {
            (Some(displacement), Some(speed)) => {
                let power_estimate_kw = displacement * speed * 1.8;
                store.set_internal(
                    "propulsion.total_installed_power_kw",
                    json!(power_estimate_kw),
                    self.id(),
                )?;
            }
            _ => result.add_finding(ValidationFinding::new(
                "pro-001",
                Severity::Error,
                "hull.displacement_mt and mission.max_speed_kts are both required to size propulsion",
            )),
        }

        result.finalize();
        Ok(result)
    }
}

struct WeightEstimation;

impl Validator for WeightEstimation {
    fn id(&self) -> &str {
        "weight/estimation"
    }

    fn read_paths(&self) -> Vec<String> {
        vec!["hull.displacement_mt".to_string()]
    }

    fn write_paths(&self) -> Vec<String> {
        vec![
            "weight.lightship_weight_mt".to_string(),
            "weight.full_load_displacement_mt".to_string(),
        ]
    }

    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult> {
        let mut result = ValidationResult::new(self.id());

        match get_f64(store, "hull.displacement_mt") {
            Some(displacement) => {
                let lightship_estimate = displacement * 0.65;
                store.set_internal(
                    "weight.lightship_weight_mt",
                    json!(lightship_estimate),
                    self.id(),
                )?;
                store.set_internal(
                    "weight.full_load_displacement_mt",
                    json!(displacement),
                    self.id(),
                )?;
            }
            None => result.add_finding(ValidationFinding::new(
                "wgt-001",
                Severity::Error,
                "hull.displacement_mt is required before a weight estimate can be produced",
            )),
        }

        result.finalize();
        Ok(result)
    }
}

struct StabilityIntactGm;

impl Validator for StabilityIntactGm {
    fn id(&self) -> &str {
        "stability/intact_gm"
    }

    fn read_paths(&self) -> Vec<String> {
        vec!["hull.beam".to_string(), "mission.gm_required_m".to_string()]
    }

    fn write_paths(&self) -> Vec<String> {
        vec!["stability.gm_transverse_m".to_string()]
    }

    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult> {
        let mut result = ValidationResult::new(self.id());

        let Some(beam) = get_f64(store, "hull.beam") else {
            result.add_finding(ValidationFinding::new(
                "sta-001",
                Severity::Error,
                "hull.beam is required before a GM estimate can be produced",
            ));
            result.finalize();
            return Ok(result);
        };

        let gm_estimate = beam / 9.0;
        store.set_internal("stability.gm_transverse_m", json!(gm_estimate), self.id())?;

        let required = get_f64(store, "mission.gm_required_m").unwrap_or(0.5);
        if gm_estimate < required {
            result.add_finding(ValidationFinding::new(
                "sta-002",
                Severity::Error,
                format!("estimated GM {gm_estimate:.2}m is below the required {required:.2}m"),
            ));
        }

        result.finalize();
        Ok(result)
    }
}

struct StabilityGzCurve;

impl Validator for StabilityGzCurve {
    fn id(&self) -> &str {
        "stability/gz_curve"
    }

    fn read_paths(&self) -> Vec<String> {
        vec!["stability.gm_transverse_m".to_string()]
    }

    fn write_paths(&self) -> Vec<String> {
        vec!["stability.gz_curve".to_string()]
    }

    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult> {
        let mut result = ValidationResult::new(self.id());

        match get_f64(store, "stability.gm_transverse_m") {
            Some(gm) => {
                // Placeholder righting-arm shape: rises linearly from GM's
                // small-angle slope, peaks near 40 degrees, vanishes at 90.
                let curve: Vec<GzPoint> = [0.0, 10.0, 20.0, 30.0, 40.0, 60.0, 90.0]
                    .into_iter()
                    .map(|heel_deg: f64| {
                        let peak_factor = 1.0 - ((heel_deg - 40.0).abs() / 60.0).min(1.0);
                        GzPoint {
                            heel_deg,
                            gz_m: (gm * heel_deg.to_radians().sin() * 2.0 * peak_factor).max(0.0),
                        }
                    })
                    .collect();
                store.set_internal("stability.gz_curve", json!(curve), self.id())?;
            }
            None => result.add_finding(ValidationFinding::new(
                "gzc-001",
                Severity::Error,
                "stability.gm_transverse_m is required before a GZ curve can be produced",
            )),
        }

        result.finalize();
        Ok(result)
    }
}

struct LoadingComputer;

impl Validator for LoadingComputer {
    fn id(&self) -> &str {
        "loading/computer"
    }

    fn read_paths(&self) -> Vec<String> {
        vec![
            "weight.lightship_weight_mt".to_string(),
            "stability.gm_transverse_m".to_string(),
        ]
    }

    fn write_paths(&self) -> Vec<String> {
        vec!["loading.extra".to_string()]
    }

    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult> {
        let mut result = ValidationResult::new(self.id());

        let lightship = get_f64(store, "weight.lightship_weight_mt");
        let gm = get_f64(store, "stability.gm_transverse_m");

        match (lightship, gm) {
            (Some(lightship), Some(gm)) => {
                store.set_internal(
                    "loading.design_draft_condition",
                    json!({
                        "displacement_mt": lightship,
                        "gm_transverse_m": gm,
                    }),
                    self.id(),
                )?;
            }
            _ => result.add_finding(ValidationFinding::new(
                "ldg-001",
                Severity::Error,
                "weight and stability outputs are both required before a loading condition can be computed",
            )),
        }

        result.finalize();
        Ok(result)
    }
}

struct ArrangementGenerator;

impl Validator for ArrangementGenerator {
    fn id(&self) -> &str {
        "arrangement/generator"
    }

    fn read_paths(&self) -> Vec<String> {
        vec!["hull.depth".to_string(), "hull.displacement_m3".to_string()]
    }

    fn write_paths(&self) -> Vec<String> {
        vec!["arrangement.extra".to_string()]
    }

    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult> {
        let mut result = ValidationResult::new(self.id());

        match get_f64(store, "hull.depth") {
            Some(depth) => {
                let deck_count_estimate = ((depth / 2.4).floor().max(1.0)) as u64;
                store.set_internal(
                    "arrangement.deck_count_estimate",
                    json!(deck_count_estimate),
                    self.id(),
                )?;
            }
            None => result.add_finding(ValidationFinding::new(
                "arr-001",
                Severity::Error,
                "hull.depth is required before a deck-count estimate can be produced",
            )),
        }

        result.finalize();
        Ok(result)
    }
}

struct ComplianceRegulatory;

impl Validator for ComplianceRegulatory {
    fn id(&self) -> &str {
        "compliance/regulatory"
    }

    fn read_paths(&self) -> Vec<String> {
        vec!["stability.gm_transverse_m".to_string(), "mission.gm_required_m".to_string()]
    }

    fn write_paths(&self) -> Vec<String> {
        vec!["compliance.fail_count".to_string(), "compliance.status".to_string()]
    }

    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult> {
        let mut result = ValidationResult::new(self.id());

        let gm = get_f64(store, "stability.gm_transverse_m");
        let required = get_f64(store, "mission.gm_required_m").unwrap_or(0.5);

        let fail_count = match gm {
            Some(gm) if gm >= required => 0,
            Some(_) => 1,
            None => 1,
        };

        store.set_internal("compliance.fail_count", json!(fail_count), self.id())?;
        store.set_internal(
            "compliance.status",
            json!(if fail_count == 0 { "pass" } else { "fail" }),
            self.id(),
        )?;

        if fail_count > 0 {
            result.add_finding(ValidationFinding::new(
                "cpl-001",
                Severity::Critical,
                "intact stability GM does not meet the required minimum",
            ));
        }

        result.finalize();
        Ok(result)
    }
}

struct ProductionPlanning;

impl Validator for ProductionPlanning {
    fn id(&self) -> &str {
        "production/planning"
    }

    fn read_paths(&self) -> Vec<String> {
        vec!["weight.lightship_weight_mt".to_string()]
    }

    fn write_paths(&self) -> Vec<String> {
        vec!["production.extra".to_string()]
    }

    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult> {
        let mut result = ValidationResult::new(self.id());

        match get_f64(store, "weight.lightship_weight_mt") {
            Some(lightship) => {
                let build_weeks_estimate = (lightship / 15.0).max(8.0);
                store.set_internal(
                    "production.build_weeks_estimate",
                    json!(build_weeks_estimate),
                    self.id(),
                )?;
            }
            None => result.add_finding(ValidationFinding::new(
                "prd-001",
                Severity::Error,
                "weight.lightship_weight_mt is required before a build schedule can be estimated",
            )),
        }

        result.finalize();
        Ok(result)
    }
}

struct CostEstimation;

impl Validator for CostEstimation {
    fn id(&self) -> &str {
        "cost/estimation"
    }

    fn read_paths(&self) -> Vec<String> {
        vec!["weight.lightship_weight_mt".to_string()]
    }

    fn write_paths(&self) -> Vec<String> {
        vec!["cost.extra".to_string()]
    }

    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult> {
        const ROM_USD_PER_TONNE: f64 = 42_000.0;
        let mut result = ValidationResult::new(self.id());

        match get_f64(store, "weight.lightship_weight_mt") {
            Some(lightship) => {
                store.set_internal(
                    "cost.rom_cost_usd",
                    json!(lightship * ROM_USD_PER_TONNE),
                    self.id(),
                )?;
            }
            None => result.add_finding(ValidationFinding::new(
                "cst-001",
                Severity::Error,
                "weight.lightship_weight_mt is required before a rough-order-of-magnitude cost can be produced",
            )),
        }

        result.finalize();
        Ok(result)
    }
}

struct OptimizationDesign;

impl Validator for OptimizationDesign {
    fn id(&self) -> &str {
        "optimization/design"
    }

    fn read_paths(&self) -> Vec<String> {
        vec!["cost.rom_cost_usd".to_string(), "compliance.status".to_string()]
    }

    fn write_paths(&self) -> Vec<String> {
        vec!["optimization.extra".to_string()]
    }

    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult> {
        let mut result = ValidationResult::new(self.id());

        let status = store
            .get("compliance.status")
            .and_then(|v| v.as_str().map(|s| s.to_string()));

        store.set_internal(
            "optimization.status",
            json!(if status.as_deref() == Some("pass") {
                "evaluated"
            } else {
                "blocked_on_compliance"
            }),
            self.id(),
        )?;

        result.finalize();
        Ok(result)
    }
}

struct ReportingGenerator;

impl Validator for ReportingGenerator {
    fn id(&self) -> &str {
        "reporting/generator"
    }

    fn read_paths(&self) -> Vec<String> {
        vec!["compliance.status".to_string(), "cost.rom_cost_usd".to_string()]
    }

    fn write_paths(&self) -> Vec<String> {
        vec!["reports.extra".to_string()]
    }

    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult> {
        let mut result = ValidationResult::new(self.id());

        store.set_internal(
            "reports.sections_included",
            json!(["mission", "hull", "stability", "compliance", "cost"]),
            self.id(),
        )?;

        result.finalize();
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
    fn registry_carries_all_fifteen_builtin_ids() {
        let mut registry = ValidatorRegistry::new();
        register_builtin(&mut registry);
        for id in [
            "mission/requirements",
            "hull/form",
            "physics/hydrostatics",
            "structure/scantlings",
            "propulsion/sizing",
            "weight/estimation",
            "stability/intact_gm",
            "stability/gz_curve",
            "loading/computer",
            "arrangement/generator",
            "compliance/regulatory",
            "production/planning",
            "cost/estimation",
            "optimization/design",
            "reporting/generator",
        ] {
            assert!(registry.contains(id), "missing builtin validator: {id}");
        }
    }

    #[test]
    fn mission_requirements_derives_a_default_vessel_type() {
        let mut s = store();
        s.set_internal("mission.max_speed_kts", json!(22.0), "test").unwrap();
        let result = MissionRequirements.run(&mut s).unwrap();
        assert_eq!(result.state, keelmark_types::ValidatorState::Passed);
        assert_eq!(s.get("mission.vessel_type"), Some(json!("multirole")));
    }

    #[test]
    fn mission_requirements_flags_missing_speed() {
        let mut s = store();
        let result = MissionRequirements.run(&mut s).unwrap();
        assert_eq!(result.state, keelmark_types::ValidatorState::Failed);
    }

    #[test]
    fn hull_form_passes_on_complete_positive_dimensions() {
        let mut s = store();
        s.set_internal("hull.lwl", json!(20.0), "test").unwrap();
        s.set_internal("hull.beam", json!(5.0), "test").unwrap();
        s.set_internal("hull.draft", json!(1.5), "test").unwrap();
        s.set_internal("hull.cb", json!(0.45), "test").unwrap();
        let result = HullForm.run(&mut s).unwrap();
        assert_eq!(result.state, keelmark_types::ValidatorState::Passed);
    }

    #[test]
    fn physics_hydrostatics_derives_mass_from_volume_when_absent() {
        let mut s = store();
        s.set_internal("hull.displacement_m3", json!(100.0), "test").unwrap();
        let result = PhysicsHydrostatics.run(&mut s).unwrap();
        assert_eq!(result.state, keelmark_types::ValidatorState::Passed);
        assert_eq!(s.get("hull.displacement_kg"), Some(json!(102_500.0)));
    }

    #[test]
    fn compliance_regulatory_fails_when_gm_below_required() {
        let mut s = store();
        s.set_internal("stability.gm_transverse_m", json!(0.2), "test").unwrap();
        s.set_internal("mission.gm_required_m", json!(0.5), "test").unwrap();
        let result = ComplianceRegulatory.run(&mut s).unwrap();
        assert_eq!(result.state, keelmark_types::ValidatorState::Failed);
        assert_eq!(s.get("compliance.fail_count"), Some(json!(1)));
        assert_eq!(s.get("compliance.status"), Some(json!("fail")));
    }

    #[test]
    fn compliance_regulatory_passes_when_gm_meets_requirement() {
        let mut s = store();
        s.set_internal("stability.gm_transverse_m", json!(0.8), "test").unwrap();
        s.set_internal("mission.gm_required_m", json!(0.5), "test").unwrap();
        let result = ComplianceRegulatory.run(&mut s).unwrap();
        assert_eq!(result.state, keelmark_types::ValidatorState::Passed);
        assert_eq!(s.get("compliance.fail_count"), Some(json!(0)));
    }

    #[test]
    fn full_weight_to_cost_chain_produces_values() {
        let mut s = store();
        s.set_internal("hull.displacement_mt", json!(150.0), "test").unwrap();
        WeightEstimation.run(&mut s).unwrap();
        assert_eq!(s.get("weight.lightship_weight_mt"), Some(json!(97.5)));
        CostEstimation.run(&mut s).unwrap();
        assert_eq!(s.get("cost.rom_cost_usd"), Some(json!(97.5 * 42_000.0)));
    }
}
