//! The guaranteed-terminating fallback: an estimator-only proposal built
//! straight from the family prior, with no validator call, used when the
//! loop cannot otherwise converge.

use keelmark_types::{ProposalSource, SynthesisProposal};

use crate::priors::FamilyPrior;

const GRAVITY_M_S2: f64 = 9.81;
const KTS_TO_MS: f64 = 0.5144;

/// Always complete and always usable; this is the floor the loop can
/// never fail to reach.
pub fn create_fallback_proposal(
    prior: FamilyPrior,
    max_speed_kts: f64,
    loa_m: Option<f64>,
) -> SynthesisProposal {
    let lwl = match loa_m {
        Some(loa) => loa * 0.95,
        None => {
            let speed_ms = max_speed_kts * KTS_TO_MS;
            (speed_ms / prior.froude_design).powi(2) / GRAVITY_M_S2
        }
    };
    let beam = lwl / prior.lwl_beam;
    let draft = beam / prior.beam_draft;
    let depth = draft * 1.6;
    let displacement_m3 = lwl * beam * draft * prior.cb;

    SynthesisProposal {
        iteration: 0,
        source: ProposalSource::Fallback,
        loa_m: loa_m.unwrap_or(lwl / 0.95),
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
        confidence: 0.3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priors::family_prior;
    use keelmark_types::HullFamily;

    #[test]
    fn fallback_proposal_is_always_complete() {
        let prior = family_prior(HullFamily::Patrol);
        let proposal = create_fallback_proposal(prior, 22.0, None);
        assert!(proposal.lwl_m > 0.0);
        assert!(proposal.beam_m > 0.0);
        assert!(proposal.draft_m > 0.0);
        assert!(proposal.depth_m > 0.0);
        assert!(proposal.displacement_m3 > 0.0);
        assert_eq!(proposal.confidence, 0.3);
        assert_eq!(proposal.source, ProposalSource::Fallback);
    }

    #[test]
    fn loa_supplied_pins_lwl_to_ninety_five_percent() {
        let prior = family_prior(HullFamily::Ferry);
        let proposal = create_fallback_proposal(prior, 18.0, Some(40.0));
        assert!((proposal.lwl_m - 38.0).abs() < 1e-9);
    }
}
