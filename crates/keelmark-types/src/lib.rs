//! # Types
//!
//! Core domain types for the keelmark design kernel: the 27-section
//! design state, phase/gate/session records, validator results, contract
//! results, and the vocabulary shared with the hull synthesis engine.
//!
//! ## Serialization
//!
//! Every type here round-trips through `serde_json` losslessly — the
//! whole-state JSON blob persisted by `keelmark-state` is exactly this
//! crate's [`DesignState`] serialized, nothing more.
//!
//! ## Stability
//!
//! `DesignState`'s 27 section structs only ever gain fields; existing
//! fields are not renamed or removed, so on-disk designs from older
//! kernel versions still deserialize.

mod contract;
mod design_state;
mod error;
mod phase;
mod session;
mod synthesis;
mod validator;

pub use contract::ContractResult;
pub use design_state::{
    ArrangementState, AnalysisState, ComplianceState, CostState, DeckEquipmentState,
    DesignState, ElectricalState, EnvironmentalState, GzPoint, HistoryAction, HistoryEntry,
    HullState, KernelState, LoadingState, ManeuveringState, MissionConfig, OptimizationState,
    OutfittingState, PerformanceState, PhaseMetadataRecord, ProductionState, PropulsionState,
    ReportsState, ResistanceState, SafetyState, SeakeepingState, StabilityState,
    StructuralDesign, StructuralLoads, SystemsState, VisionState, WeightEstimate,
    DESIGN_STATE_VERSION, SECTION_NAMES,
};
pub use error::{KernelError, KernelResult};
pub use phase::{GateCondition, GateResult, PhaseResult, PhaseStatus, PhaseType, SessionStatus};
pub use session::SessionState;
pub use synthesis::{
    HullFamily, ProposalSource, SynthesisProposal, SynthesisRequest, SynthesisResult,
    TerminationReason,
};
pub use validator::{Severity, ValidationFinding, ValidationResult, ValidatorState};
