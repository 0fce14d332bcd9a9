//! # Hull Synthesis
//!
//! The bounded propose -> validate -> mutate loop that seeds
//! `hull.*` principal dimensions and coefficients from a mission request
//! and a hull-family prior before the hull phase's own validators run.
//!
//! Runs under an exclusive [`lock::SynthesisLock`] over the hull-write
//! paths, uses the same validator pipeline and [`keelmark_validators::aggregate`]
//! scoring every other phase uses, and is guaranteed to terminate: either
//! by converging, by plateauing above the soft floor, by exhausting its
//! iteration cap above the soft floor, or by falling back to an
//! estimator-only proposal.

mod convergence;
mod engine;
mod fallback;
mod lock;
mod mutate;
mod priors;

pub use convergence::{ConvergenceCriteria, ConvergenceReason};
pub use engine::HullSynthesizer;
pub use fallback::create_fallback_proposal;
pub use lock::{SynthesisLock, HULL_PATHS};
pub use mutate::{mutate, MutationSignals};
pub use priors::{family_prior, FamilyPrior};
