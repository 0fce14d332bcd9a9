//! A thin convenience facade over [`Conductor`] for callers that only
//! want "run everything" or "run one phase and tell me where things
//! stand" without touching transactions or gate approval directly.
//!
//! Pure composition: every method here is a short sequence of
//! `Conductor` calls, with no state or semantics of its own.

use keelmark_types::{KernelResult, PhaseResult};

use crate::conductor::{Conductor, StatusSummary};

pub struct ValidationOrchestrator {
    conductor: Conductor,
}

impl ValidationOrchestrator {
    pub fn new() -> Self {
        ValidationOrchestrator {
            conductor: Conductor::new(),
        }
    }

    pub fn conductor(&self) -> &Conductor {
        &self.conductor
    }

    pub fn conductor_mut(&mut self) -> &mut Conductor {
        &mut self.conductor
    }

    pub fn start_design(&mut self, design_id: &str) {
        self.conductor.create_session(design_id);
    }

    /// Runs every phase in dependency order, stopping at the first
    /// blocked or failed phase.
    pub fn run_full_pipeline(&mut self) -> KernelResult<Vec<PhaseResult>> {
        self.conductor.run_all_phases(true)
    }

    /// Runs a single named phase and returns its result.
    pub fn run_single_phase(&mut self, name: &str) -> KernelResult<PhaseResult> {
        self.conductor.run_phase(name)
    }

    pub fn get_status_summary(&mut self) -> StatusSummary {
        self.conductor.get_status_summary()
    }
}

impl Default for ValidationOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}
