//! # Core
//!
//! Wires the design kernel's microcrates into one [`Conductor`]: state
//! store, transaction manager, phase registry, validator pipeline, and
//! hull synthesizer, driven through the single `run_phase` algorithm that
//! decides whether a phase is blocked, runs, fails its output contract,
//! or clears its gate.
//!
//! [`orchestrator`] layers a thinner facade (`run_full_pipeline`,
//! `run_single_phase`, `get_status_summary`) over a [`Conductor`] plus a
//! [`keelmark_registry::PhaseRegistry`] for callers that only need the
//! common entry points, not the lower-level phase-by-phase control.

mod conductor;
mod orchestrator;

pub use conductor::{Conductor, StatusSummary};
pub use orchestrator::ValidationOrchestrator;
