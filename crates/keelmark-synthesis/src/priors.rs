//! Static per-hull-family prior ratios the synthesis loop starts from and
//! clamps mutations against.

use keelmark_types::HullFamily;

/// L/B, B/T ratios, form coefficients, design Froude number, and the
/// minimum GM a hull of this family needs to be considered stable, plus
/// the admissible Cb range the mutation step clamps into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FamilyPrior {
    pub lwl_beam: f64,
    pub beam_draft: f64,
    pub cb: f64,
    pub cp: f64,
    pub cm: f64,
    pub cwp: f64,
    pub froude_design: f64,
    pub gm_min_m: f64,
    pub cb_min: f64,
    pub cb_max: f64,
}

pub fn family_prior(family: HullFamily) -> FamilyPrior {
    match family {
        HullFamily::Patrol => FamilyPrior {
            lwl_beam: 5.5,
            beam_draft: 3.0,
            cb: 0.45,
            cp: 0.62,
            cm: 0.82,
            cwp: 0.72,
            froude_design: 0.90,
            gm_min_m: 0.5,
            cb_min: 0.38,
            cb_max: 0.52,
        },
        HullFamily::Workboat => FamilyPrior {
            lwl_beam: 4.5,
            beam_draft: 2.8,
            cb: 0.55,
            cp: 0.68,
            cm: 0.88,
            cwp: 0.78,
            froude_design: 0.45,
            gm_min_m: 0.5,
            cb_min: 0.45,
            cb_max: 0.62,
        },
        HullFamily::Ferry => FamilyPrior {
            lwl_beam: 5.0,
            beam_draft: 3.2,
            cb: 0.55,
            cp: 0.70,
            cm: 0.92,
            cwp: 0.80,
            froude_design: 0.65,
            gm_min_m: 0.75,
            cb_min: 0.45,
            cb_max: 0.65,
        },
        HullFamily::Planing => FamilyPrior {
            lwl_beam: 4.0,
            beam_draft: 5.0,
            cb: 0.42,
            cp: 0.60,
            cm: 0.75,
            cwp: 0.70,
            froude_design: 1.2,
            gm_min_m: 0.35,
            cb_min: 0.35,
            cb_max: 0.55,
        },
        HullFamily::Catamaran => FamilyPrior {
            lwl_beam: 12.0,
            beam_draft: 3.0,
            cb: 0.42,
            cp: 0.62,
            cm: 0.78,
            cwp: 0.72,
            froude_design: 0.75,
            gm_min_m: 0.5,
            cb_min: 0.35,
            cb_max: 0.55,
        },
    }
}
