//! The deterministic mutation step: nudges a proposal's dimensions and
//! coefficients based on the prior iteration's validation findings, then
//! clamps into the family's admissible ranges so the result is always a
//! complete, writable proposal.
//!
//! Beam moves up if GM falls short, draft moves down if displacement
//! overshoots, and Cb moves toward whichever family bound relieves the
//! binding constraint.

use keelmark_types::{ProposalSource, SynthesisProposal};

use crate::priors::FamilyPrior;

const BEAM_STEP: f64 = 1.03;
const DRAFT_STEP: f64 = 0.97;
const CB_STEP: f64 = 0.02;

/// Signals extracted from the prior iteration's validator findings that
/// the mutation step reacts to. The conductor-side caller derives these
/// from the phase's actual validation results; this module only knows
/// how to react to them.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationSignals {
    pub gm_actual: Option<f64>,
    pub gm_required: f64,
    pub displacement_over_target: bool,
    pub capacity_shortage: bool,
    pub resistance_excess: bool,
}

pub fn mutate(
    prior_proposal: &SynthesisProposal,
    signals: MutationSignals,
    prior: FamilyPrior,
    next_iteration: u32,
) -> SynthesisProposal {
    let mut beam = prior_proposal.beam_m;
    let mut draft = prior_proposal.draft_m;
    let mut cb = prior_proposal.cb;

    if let Some(gm_actual) = signals.gm_actual {
        if gm_actual < signals.gm_required {
            beam *= BEAM_STEP;
        }
    }
    if signals.displacement_over_target {
        draft *= DRAFT_STEP;
    }
    if signals.capacity_shortage {
        cb += CB_STEP;
    }
    if signals.resistance_excess {
        cb -= CB_STEP;
    }
    cb = cb.clamp(prior.cb_min, prior.cb_max);

    let depth = draft * 1.6;
    let displacement_m3 = prior_proposal.lwl_m * beam * draft * cb;

    SynthesisProposal {
        iteration: next_iteration,
        source: ProposalSource::Mutated,
        loa_m: prior_proposal.loa_m,
        lwl_m: prior_proposal.lwl_m,
        beam_m: beam,
        draft_m: draft,
        depth_m: depth,
        cb,
        cp: prior_proposal.cp,
        cm: prior_proposal.cm,
        cwp: prior_proposal.cwp,
        displacement_m3,
        score: 0.0,
        confidence: prior_proposal.confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priors::family_prior;
    use keelmark_types::HullFamily;

    fn base_proposal() -> SynthesisProposal {
        SynthesisProposal {
            iteration: 0,
            source: ProposalSource::Prior,
            loa_m: 21.0,
            lwl_m: 20.0,
            beam_m: 4.0,
            draft_m: 1.4,
            depth_m: 2.24,
            cb: 0.45,
            cp: 0.62,
            cm: 0.82,
            cwp: 0.72,
            displacement_m3: 50.4,
            score: 60.0,
            confidence: 0.7,
        }
    }

    #[test]
    fn short_gm_increases_beam() {
        let prior = family_prior(HullFamily::Patrol);
        let signals = MutationSignals {
            gm_actual: Some(0.3),
            gm_required: 0.5,
            ..Default::default()
        };
        let next = mutate(&base_proposal(), signals, prior, 1);
        assert!(next.beam_m > base_proposal().beam_m);
        assert_eq!(next.source, ProposalSource::Mutated);
    }

    #[test]
    fn displacement_overshoot_decreases_draft() {
        let prior = family_prior(HullFamily::Patrol);
        let signals = MutationSignals {
            displacement_over_target: true,
            ..Default::default()
        };
        let next = mutate(&base_proposal(), signals, prior, 1);
        assert!(next.draft_m < base_proposal().draft_m);
    }

    #[test]
    fn cb_never_leaves_the_family_range() {
        let prior = family_prior(HullFamily::Planing);
        let mut proposal = base_proposal();
        proposal.cb = prior.cb_max;
        let signals = MutationSignals {
            capacity_shortage: true,
            ..Default::default()
        };
        let next = mutate(&proposal, signals, prior, 1);
        assert!(next.cb <= prior.cb_max);
    }
}
