//! Shared hull synthesis types. The priors table and the propose/mutate
//! loop itself live in `keelmark-synthesis`; this crate only carries the
//! vocabulary other crates (conductor, CLI) need to talk about a
//! synthesis run without depending on the engine.

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, KernelResult};

/// Default bound on propose/validate/mutate iterations before the loop
/// gives up and returns the estimator-only fallback.
pub const DEFAULT_MAX_ITERATIONS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HullFamily {
    Patrol,
    Workboat,
    Ferry,
    Planing,
    Catamaran,
}

impl HullFamily {
    pub const ALL: [HullFamily; 5] = [
        HullFamily::Patrol,
        HullFamily::Workboat,
        HullFamily::Ferry,
        HullFamily::Planing,
        HullFamily::Catamaran,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HullFamily::Patrol => "patrol",
            HullFamily::Workboat => "workboat",
            HullFamily::Ferry => "ferry",
            HullFamily::Planing => "planing",
            HullFamily::Catamaran => "catamaran",
        }
    }

    pub fn from_str(s: &str) -> Option<HullFamily> {
        HullFamily::ALL.into_iter().find(|f| f.as_str() == s.to_lowercase())
    }
}

/// Where a synthesis proposal's numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalSource {
    /// Straight from the family prior ratios, iteration 0.
    Prior,
    /// Produced by the deterministic mutation step.
    Mutated,
    /// The loop exhausted its iteration cap; this is the estimator-only
    /// fallback, not a validated design.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    Converged,
    Plateaued,
    MaxIterations,
}

/// Request to synthesize a starting hull from mission requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub hull_family: HullFamily,
    pub max_speed_kts: f64,
    /// Length overall if the caller wants to pin it; otherwise the
    /// synthesizer derives it from the Froude-based speed/length
    /// relationship for the family.
    pub loa_m: Option<f64>,
    pub crew_count: Option<u32>,
    pub range_nm: Option<f64>,
    /// Falls back to the family's `gm_min_m` prior when unset.
    pub gm_min_m: Option<f64>,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

impl SynthesisRequest {
    pub fn new(hull_family: HullFamily, max_speed_kts: f64) -> Self {
        Self {
            hull_family,
            max_speed_kts,
            loa_m: None,
            crew_count: None,
            range_nm: None,
            gm_min_m: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// A request with a non-positive speed or a sub-one iteration cap can
    /// never produce a usable proposal, so it's rejected before synthesis
    /// ever starts rather than failing inside the loop.
    pub fn validate(&self) -> KernelResult<()> {
        if self.max_speed_kts <= 0.0 {
            return Err(KernelError::InvalidRequest {
                message: format!("max_speed_kts must be > 0, got {}", self.max_speed_kts),
            });
        }
        if self.max_iterations < 1 {
            return Err(KernelError::InvalidRequest {
                message: format!("max_iterations must be >= 1, got {}", self.max_iterations),
            });
        }
        Ok(())
    }
}

/// A single hull dimension/coefficient proposal produced by one
/// iteration of the synthesis loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisProposal {
    pub iteration: u32,
    pub source: ProposalSource,
    pub loa_m: f64,
    pub lwl_m: f64,
    pub beam_m: f64,
    pub draft_m: f64,
    pub depth_m: f64,
    pub cb: f64,
    pub cp: f64,
    pub cm: f64,
    pub cwp: f64,
    pub displacement_m3: f64,
    pub score: f64,
    pub confidence: f64,
}

/// Final result of a synthesis run: the winning (or fallback) proposal
/// plus why the loop stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub proposal: SynthesisProposal,
    pub termination: TerminationReason,
    pub iterations_run: u32,
    /// `false` only for the `Fallback` estimator-only proposal; callers
    /// must check this before writing the proposal into the design state
    /// without further validator review.
    pub is_usable: bool,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hull_family_round_trips_through_str() {
        for family in HullFamily::ALL {
            assert_eq!(HullFamily::from_str(family.as_str()), Some(family));
        }
    }

    #[test]
    fn unknown_family_string_is_none() {
        assert_eq!(HullFamily::from_str("trimaran"), None);
    }

    #[test]
    fn family_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&HullFamily::Catamaran).unwrap(),
            "\"catamaran\""
        );
    }

    #[test]
    fn new_request_defaults_max_iterations_to_fifteen() {
        let req = SynthesisRequest::new(HullFamily::Patrol, 18.0);
        assert_eq!(req.max_iterations, 15);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        let req = SynthesisRequest::new(HullFamily::Patrol, 0.0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn zero_max_iterations_is_rejected() {
        let mut req = SynthesisRequest::new(HullFamily::Ferry, 20.0);
        req.max_iterations = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn request_without_max_iterations_field_deserializes_to_default() {
        let json = serde_json::json!({
            "hull_family": "workboat",
            "max_speed_kts": 12.0,
        });
        let req: SynthesisRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.max_iterations, 15);
    }
}
