//! The unified design state: 27 sections plus identity, phase tracking,
//! and history. Mirrors a ship design document that accumulates detail as
//! phases run, rather than a request/response payload.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Section names in declaration order. Used by the schema crate to
/// validate top-level path segments and by [`DesignState::get_section`].
pub const SECTION_NAMES: [&str; 27] = [
    "mission",
    "hull",
    "structural_design",
    "structural_loads",
    "propulsion",
    "weight",
    "stability",
    "loading",
    "arrangement",
    "compliance",
    "production",
    "cost",
    "optimization",
    "reports",
    "kernel",
    "analysis",
    "performance",
    "systems",
    "outfitting",
    "environmental",
    "deck_equipment",
    "vision",
    "resistance",
    "seakeeping",
    "maneuvering",
    "electrical",
    "safety",
];

/// Design state schema version, bumped whenever a section gains a new
/// named field that callers should be able to rely on.
pub const DESIGN_STATE_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionConfig {
    pub vessel_type: Option<String>,
    pub max_speed_kts: Option<f64>,
    pub cruise_speed_kts: Option<f64>,
    pub range_nm: Option<f64>,
    pub crew_count: Option<u32>,
    pub cargo_capacity_mt: Option<f64>,
    pub gm_required_m: Option<f64>,
    pub loa_m: Option<f64>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HullState {
    pub loa: Option<f64>,
    pub lwl: Option<f64>,
    pub beam: Option<f64>,
    pub beam_wl: Option<f64>,
    pub draft: Option<f64>,
    pub depth: Option<f64>,
    pub cb: Option<f64>,
    pub cp: Option<f64>,
    pub cm: Option<f64>,
    pub cwp: Option<f64>,
    pub displacement_m3: Option<f64>,
    pub displacement_kg: Option<f64>,
    pub displacement_mt: Option<f64>,
    pub hull_type: Option<String>,
    pub hull_family: Option<String>,
    pub deadrise_deg: Option<f64>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GzPoint {
    pub heel_deg: f64,
    pub gz_m: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropulsionState {
    #[serde(default)]
    pub num_engines: u32,
    #[serde(default)]
    pub num_propellers: u32,
    pub total_installed_power_kw: Option<f64>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightEstimate {
    pub lightship_weight_mt: Option<f64>,
    pub full_load_displacement_mt: Option<f64>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StabilityState {
    pub gm_transverse_m: Option<f64>,
    #[serde(default)]
    pub gz_curve: Vec<GzPoint>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceState {
    #[serde(default)]
    pub fail_count: u32,
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KernelState {
    pub status: Option<String>,
    pub current_phase: Option<String>,
    #[serde(default)]
    pub phase_history: Vec<String>,
    #[serde(default)]
    pub gate_status: HashMap<String, bool>,
    pub validation_summary: Option<Value>,
    #[serde(default)]
    pub validation_complete: bool,
    pub current_session: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Macro would hide these from a reader skimming the section list; the
/// sections below carry no named fields yet, only the open catch-all.
macro_rules! open_section {
    ($name:ident) => {
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            #[serde(flatten)]
            pub extra: HashMap<String, Value>,
        }
    };
}

open_section!(StructuralDesign);
open_section!(StructuralLoads);
open_section!(LoadingState);
open_section!(ArrangementState);
open_section!(ProductionState);
open_section!(CostState);
open_section!(OptimizationState);
open_section!(ReportsState);
open_section!(AnalysisState);
open_section!(PerformanceState);
open_section!(SystemsState);
open_section!(OutfittingState);
open_section!(EnvironmentalState);
open_section!(DeckEquipmentState);
open_section!(VisionState);
open_section!(ResistanceState);
open_section!(SeakeepingState);
open_section!(ManeuveringState);
open_section!(ElectricalState);
open_section!(SafetyState);

/// Per-phase bookkeeping: what state the phase is in, who entered it,
/// and which gate conditions it has or hasn't satisfied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseMetadataRecord {
    pub state: String,
    pub entered_at: Option<String>,
    pub entered_by: Option<String>,
    #[serde(default)]
    pub gate_conditions_passed: Vec<String>,
    #[serde(default)]
    pub gate_conditions_failed: Vec<String>,
    pub invalidated_by_phase: Option<String>,
    pub approval_comment: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: Option<String>,
}

/// A single entry appended to [`DesignState::history`]; tagged on `action`
/// so the JSONL mirror in `keelmark-events` round-trips cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HistoryAction {
    Set {
        path: String,
        old_value: Value,
        new_value: Value,
    },
    Patch {
        paths_modified: Vec<String>,
    },
    TransactionCommit {
        txn_id: String,
    },
    TransactionRollback {
        txn_id: String,
    },
    GateApproved {
        phase: String,
    },
    Error {
        kind: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub source: String,
    #[serde(flatten)]
    pub action: HistoryAction,
}

/// The unified design state container holding all 27 sections plus
/// identity, phase tracking, and history. Path-addressed rather than
/// field-addressed: most callers reach it through `keelmark-state`'s
/// `StateStore`, not through these fields directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignState {
    pub design_id: String,
    pub design_name: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub design_version: u64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub created_by: Option<String>,

    #[serde(default)]
    pub mission: MissionConfig,
    #[serde(default)]
    pub hull: HullState,
    #[serde(default)]
    pub structural_design: StructuralDesign,
    #[serde(default)]
    pub structural_loads: StructuralLoads,
    #[serde(default)]
    pub propulsion: PropulsionState,
    #[serde(default)]
    pub weight: WeightEstimate,
    #[serde(default)]
    pub stability: StabilityState,
    #[serde(default)]
    pub loading: LoadingState,
    #[serde(default)]
    pub arrangement: ArrangementState,
    #[serde(default)]
    pub compliance: ComplianceState,
    #[serde(default)]
    pub production: ProductionState,
    #[serde(default)]
    pub cost: CostState,
    #[serde(default)]
    pub optimization: OptimizationState,
    #[serde(default)]
    pub reports: ReportsState,
    #[serde(default)]
    pub kernel: KernelState,
    #[serde(default)]
    pub analysis: AnalysisState,
    #[serde(default)]
    pub performance: PerformanceState,
    #[serde(default)]
    pub systems: SystemsState,
    #[serde(default)]
    pub outfitting: OutfittingState,
    #[serde(default)]
    pub environmental: EnvironmentalState,
    #[serde(default)]
    pub deck_equipment: DeckEquipmentState,
    #[serde(default)]
    pub vision: VisionState,
    #[serde(default)]
    pub resistance: ResistanceState,
    #[serde(default)]
    pub seakeeping: SeakeepingState,
    #[serde(default)]
    pub maneuvering: ManeuveringState,
    #[serde(default)]
    pub electrical: ElectricalState,
    #[serde(default)]
    pub safety: SafetyState,

    #[serde(default)]
    pub phase_states: HashMap<String, Value>,
    #[serde(default)]
    pub phase_metadata: HashMap<String, PhaseMetadataRecord>,
    #[serde(default)]
    pub agents: HashMap<String, Value>,
    #[serde(default)]
    pub orchestration: HashMap<String, Value>,
    #[serde(default)]
    pub decisions: Vec<Value>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// Serialized as a sorted `Vec` (not a set) so round-trips are
    /// deterministic byte-for-byte.
    #[serde(default)]
    pub locked_parameters: std::collections::BTreeSet<String>,
}

fn default_version() -> String {
    DESIGN_STATE_VERSION.to_string()
}

impl Default for DesignState {
    fn default() -> Self {
        DesignState {
            design_id: String::new(),
            design_name: None,
            version: default_version(),
            design_version: 0,
            created_at: None,
            updated_at: None,
            created_by: None,
            mission: MissionConfig::default(),
            hull: HullState::default(),
            structural_design: StructuralDesign::default(),
            structural_loads: StructuralLoads::default(),
            propulsion: PropulsionState::default(),
            weight: WeightEstimate::default(),
            stability: StabilityState::default(),
            loading: LoadingState::default(),
            arrangement: ArrangementState::default(),
            compliance: ComplianceState::default(),
            production: ProductionState::default(),
            cost: CostState::default(),
            optimization: OptimizationState::default(),
            reports: ReportsState::default(),
            kernel: KernelState::default(),
            analysis: AnalysisState::default(),
            performance: PerformanceState::default(),
            systems: SystemsState::default(),
            outfitting: OutfittingState::default(),
            environmental: EnvironmentalState::default(),
            deck_equipment: DeckEquipmentState::default(),
            vision: VisionState::default(),
            resistance: ResistanceState::default(),
            seakeeping: SeakeepingState::default(),
            maneuvering: ManeuveringState::default(),
            electrical: ElectricalState::default(),
            safety: SafetyState::default(),
            phase_states: HashMap::new(),
            phase_metadata: HashMap::new(),
            agents: HashMap::new(),
            orchestration: HashMap::new(),
            decisions: Vec::new(),
            metadata: HashMap::new(),
            history: Vec::new(),
            locked_parameters: std::collections::BTreeSet::new(),
        }
    }
}

impl DesignState {
    /// Build a fresh, empty design with a generated id. Callers that need
    /// a stable id (tests, fixtures) should set `design_id` explicitly
    /// instead.
    pub fn new(design_id: impl Into<String>) -> Self {
        DesignState {
            design_id: design_id.into(),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Internal consistency checks that cut across sections (hull
    /// dimension ordering, coefficient bounds, weight and speed
    /// consistency). Distinct from per-path schema validity, which lives
    /// in `keelmark-schema`.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.design_id.is_empty() {
            errors.push("design_id is required".to_string());
        }

        if let (Some(loa), Some(lwl)) = (self.hull.loa, self.hull.lwl) {
            if lwl > loa {
                errors.push("lwl cannot exceed loa".to_string());
            }
        }
        if let (Some(beam), Some(beam_wl)) = (self.hull.beam, self.hull.beam_wl) {
            if beam_wl > beam {
                errors.push("beam_wl cannot exceed beam".to_string());
            }
        }
        if let (Some(draft), Some(depth)) = (self.hull.draft, self.hull.depth) {
            if draft > depth {
                errors.push("draft cannot exceed depth".to_string());
            }
        }

        for (name, coeff) in [
            ("cb", self.hull.cb),
            ("cp", self.hull.cp),
            ("cm", self.hull.cm),
            ("cwp", self.hull.cwp),
        ] {
            if let Some(c) = coeff {
                if !(0.0..=1.0).contains(&c) {
                    errors.push(format!("hull.{name} must be between 0 and 1"));
                }
            }
        }

        if let (Some(lightship), Some(full_load)) = (
            self.weight.lightship_weight_mt,
            self.weight.full_load_displacement_mt,
        ) {
            if lightship > full_load {
                errors.push("lightship_weight cannot exceed full_load_displacement".to_string());
            }
        }

        if let Some(gm) = self.stability.gm_transverse_m {
            if gm < 0.0 {
                errors.push(
                    "stability.gm_transverse_m cannot be negative (would indicate instability)"
                        .to_string(),
                );
            }
        }

        if let (Some(max_speed), Some(cruise)) =
            (self.mission.max_speed_kts, self.mission.cruise_speed_kts)
        {
            if cruise > max_speed {
                errors.push("cruise_speed cannot exceed max_speed".to_string());
            }
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Deep copy by round-tripping through JSON, same approach the
    /// original took with `copy.deepcopy(self.to_dict())`.
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    pub fn summary(&self) -> String {
        format!(
            "Design: {} ({})\nVersion: {}\nCreated: {}\n\nMission:\n  Type: {}\n  Max Speed: {} kts\n  Range: {} nm\n\nHull:\n  LOA: {} m\n  Beam: {} m\n  Draft: {} m\n\nPropulsion:\n  Power: {} kW\n  Engines: {}\n\nWeight:\n  Lightship: {} MT\n  Full Load: {} MT",
            self.design_name.as_deref().unwrap_or("Unnamed"),
            self.design_id,
            self.version,
            self.created_at.as_deref().unwrap_or("unknown"),
            self.mission.vessel_type.as_deref().unwrap_or("Not set"),
            fmt_opt(self.mission.max_speed_kts),
            fmt_opt(self.mission.range_nm),
            fmt_opt(self.hull.loa),
            fmt_opt(self.hull.beam),
            fmt_opt(self.hull.draft),
            fmt_opt(self.propulsion.total_installed_power_kw),
            self.propulsion.num_engines,
            fmt_opt(self.weight.lightship_weight_mt),
            fmt_opt(self.weight.full_load_displacement_mt),
        )
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) => x.to_string(),
        None => "Not set".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_has_empty_design_id() {
        let state = DesignState::default();
        assert_eq!(state.design_id, "");
        assert_eq!(state.design_version, 0);
    }

    #[test]
    fn validate_flags_lwl_exceeding_loa() {
        let mut state = DesignState::new("d1");
        state.hull.loa = Some(20.0);
        state.hull.lwl = Some(25.0);
        let errors = state.validate();
        assert!(errors.iter().any(|e| e.contains("lwl cannot exceed loa")));
    }

    #[test]
    fn validate_flags_out_of_range_coefficient() {
        let mut state = DesignState::new("d1");
        state.hull.cb = Some(1.4);
        let errors = state.validate();
        assert!(errors.iter().any(|e| e.contains("hull.cb")));
    }

    #[test]
    fn validate_accepts_empty_state_except_missing_id() {
        let state = DesignState::default();
        let errors = state.validate();
        assert_eq!(errors, vec!["design_id is required".to_string()]);
    }

    #[test]
    fn section_names_cover_all_27() {
        assert_eq!(SECTION_NAMES.len(), 27);
    }

    #[test]
    fn round_trips_through_json() {
        let mut state = DesignState::new("d1");
        state.hull.loa = Some(30.0);
        state.kernel.phase_history.push("mission".to_string());
        let json = serde_json::to_string(&state).unwrap();
        let back: DesignState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }

    #[test]
    fn unknown_fields_in_a_section_round_trip_via_flatten() {
        let json = serde_json::json!({
            "design_id": "d1",
            "hull": { "loa": 10.0, "some_future_field": 42 },
        });
        let state: DesignState = serde_json::from_value(json).unwrap();
        assert_eq!(state.hull.loa, Some(10.0));
        assert_eq!(
            state.hull.extra.get("some_future_field"),
            Some(&serde_json::json!(42))
        );
        let back = serde_json::to_value(&state).unwrap();
        assert_eq!(back["hull"]["some_future_field"], serde_json::json!(42));
    }
}
