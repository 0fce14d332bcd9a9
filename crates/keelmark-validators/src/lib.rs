//! # Validators
//!
//! The validation stack that runs inside each phase: the [`Validator`]
//! trait itself, a [`contracts`] module checking a phase's input
//! and output contracts, a pipeline [`executor`] that runs a
//! phase's declared validators in dependency order with a single-retry
//! policy for infrastructure errors, an [`aggregator`] that rolls per-
//! validator results into one phase-level outcome, and the
//! [`kernel_validator`] meta-validator that checks the pipeline itself
//! ran to completion, and [`builtin`]'s generic per-phase validators.

mod aggregator;
mod builtin;
mod contracts;
mod executor;
mod kernel_validator;
mod validator_trait;

pub use aggregator::{aggregate, AggregatedOutcome};
pub use builtin::register_builtin;
pub use contracts::{check_inputs, check_outputs};
pub use executor::{run_phase_validators, PhaseValidationSummary};
pub use kernel_validator::KernelValidator;
pub use validator_trait::{Validator, ValidatorRegistry};
