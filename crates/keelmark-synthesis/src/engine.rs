//! The bounded propose -> validate -> mutate loop itself. Uses validators
//! as scoring functions, with guaranteed termination and a fallback path.
//!
//! Running the hull phase's validator pipeline is the caller's concern
//! (`keelmark-core`'s conductor owns the phase registry and the pipeline
//! executor) — this engine takes a closure that runs one hull-phase pass
//! and hands back its `PhaseValidationSummary`, so this crate never
//! depends on the conductor.

use keelmark_state::StateStore;
use keelmark_types::{
    HullFamily, ProposalSource, SynthesisProposal, SynthesisRequest, SynthesisResult,
    TerminationReason,
};
use keelmark_validators::{aggregate, PhaseValidationSummary};

use crate::convergence::ConvergenceCriteria;
use crate::fallback::create_fallback_proposal;
use crate::lock::{SynthesisLock, HULL_PATHS};
use crate::mutate::{mutate, MutationSignals};
use crate::priors::family_prior;

const LOCK_OWNER: &str = "synthesizer";

pub struct HullSynthesizer {
    criteria: ConvergenceCriteria,
}

impl HullSynthesizer {
    pub fn new() -> Self {
        Self {
            criteria: ConvergenceCriteria::default(),
        }
    }

    pub fn with_criteria(criteria: ConvergenceCriteria) -> Self {
        Self { criteria }
    }

    /// Runs the bounded loop. `run_hull_phase` executes the hull phase's
    /// validator pipeline against `store` exactly as the conductor would
    /// for any other phase, and is called once per iteration after this
    /// engine writes the current proposal under the synthesis lock.
    pub fn synthesize(
        &self,
        request: &SynthesisRequest,
        store: &mut StateStore,
        mut run_hull_phase: impl FnMut(&mut StateStore) -> PhaseValidationSummary,
    ) -> SynthesisResult {
        if let Err(err) = request.validate() {
            return self.fallback_result(request, Some(err.to_string()));
        }

        let prior = family_prior(request.hull_family);
        let gm_required = request.gm_min_m.unwrap_or(prior.gm_min_m);

        let mut proposal = initial_proposal(request, prior);
        let mut history: Vec<f64> = Vec::new();
        let mut lock = SynthesisLock::new();

        for iteration in 0..request.max_iterations {
            let write_result = lock
                .acquire(LOCK_OWNER)
                .and_then(|()| write_proposal(&mut lock, store, &proposal));
            lock.release(LOCK_OWNER).ok();
            if write_result.is_err() {
                return self.fallback_result(request, Some("hull write under lock failed".to_string()));
            }

            let summary = run_hull_phase(store);
            let outcome = aggregate(&summary);
            history.push(outcome.score);

            proposal.score = outcome.score;

            let gm_actual = store
                .get("stability.gm_transverse_m")
                .and_then(|v| v.as_f64());

            if let Some(reason) = self.criteria.is_converged(
                outcome.score,
                outcome.validators_passed,
                outcome.worst_severity,
                gm_actual,
                gm_required,
                &history,
            ) {
                let termination = match reason {
                    crate::convergence::ConvergenceReason::ScoreAndGmMet => TerminationReason::Converged,
                    crate::convergence::ConvergenceReason::Plateaued => TerminationReason::Plateaued,
                };
                return SynthesisResult {
                    proposal,
                    termination,
                    iterations_run: iteration + 1,
                    is_usable: true,
                    message: None,
                };
            }

            let signals = MutationSignals {
                gm_actual,
                gm_required,
                displacement_over_target: false,
                capacity_shortage: !outcome.all_passed && outcome.score < self.criteria.min_score,
                resistance_excess: false,
            };
            proposal = mutate(&proposal, signals, prior, iteration + 1);
        }

        let usable = proposal.score >= self.criteria.soft_floor;
        if usable {
            SynthesisResult {
                proposal,
                termination: TerminationReason::MaxIterations,
                iterations_run: request.max_iterations,
                is_usable: true,
                message: Some(format!(
                    "max iterations reached with score {:.1} above soft floor",
                    proposal.score
                )),
            }
        } else {
            self.fallback_result(
                request,
                Some(format!(
                    "max iterations reached with score {:.1} below soft floor {:.1}",
                    proposal.score, self.criteria.soft_floor
                )),
            )
        }
    }

    fn fallback_result(&self, request: &SynthesisRequest, message: Option<String>) -> SynthesisResult {
        let prior = family_prior(request.hull_family);
        let proposal = create_fallback_proposal(prior, request.max_speed_kts.max(f64::EPSILON), request.loa_m);
        SynthesisResult {
            proposal,
            termination: TerminationReason::MaxIterations,
            iterations_run: 0,
            is_usable: true,
            message,
        }
    }
}

impl Default for HullSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

fn initial_proposal(request: &SynthesisRequest, prior: crate::priors::FamilyPrior) -> SynthesisProposal {
    const GRAVITY_M_S2: f64 = 9.81;
    const KTS_TO_MS: f64 = 0.5144;

    let lwl = match request.loa_m {
        Some(loa) => loa * 0.95,
        None => {
            let speed_ms = request.max_speed_kts * KTS_TO_MS;
            (speed_ms / prior.froude_design).powi(2) / GRAVITY_M_S2
        }
    };
    let beam = lwl / prior.lwl_beam;
    let draft = beam / prior.beam_draft;
    let depth = draft * 1.6;
    let displacement_m3 = lwl * beam * draft * prior.cb;

    SynthesisProposal {
        iteration: 0,
        source: ProposalSource::Prior,
        loa_m: request.loa_m.unwrap_or(lwl / 0.95),
        lwl_m: lwl,
        beam_m: beam,
        draft_m: draft,
        depth_m: depth,
        cb: prior.cb,
        cp: prior.cp,
        cm: prior.cm,
        cwp: prior.cwp,
        displacement_m3,
        score: 0.0,
        confidence: 0.7,
    }
}

fn write_proposal(
    lock: &mut SynthesisLock,
    store: &mut StateStore,
    proposal: &SynthesisProposal,
) -> Result<(), keelmark_types::KernelError> {
    let displacement_kg = proposal.displacement_m3 * 1025.0;
    let params: Vec<(&str, serde_json::Value)> = HULL_PATHS
        .iter()
        .zip([
            serde_json::json!(proposal.lwl_m),
            serde_json::json!(proposal.beam_m),
            serde_json::json!(proposal.draft_m),
            serde_json::json!(proposal.cb),
            serde_json::json!(proposal.cp),
            serde_json::json!(proposal.cm),
            serde_json::json!(proposal.cwp),
            serde_json::json!(proposal.displacement_m3),
            serde_json::json!(displacement_kg),
            serde_json::json!(displacement_kg / 1000.0),
        ])
        .map(|(path, value)| (*path, value))
        .collect();
    lock.write_hull_params(store, &params, LOCK_OWNER)
}
