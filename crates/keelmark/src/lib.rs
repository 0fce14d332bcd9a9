//! # Keelmark
//!
//! A design kernel for early-stage ship design: a path-addressed state
//! store, transaction-gated mutation, a thirteen-phase dependency-ordered
//! pipeline with a compliance gate, and a bounded propose/validate/mutate
//! hull synthesis loop, wired together by a [`core::Conductor`].
//!
//! ## Modules
//!
//! - [`types`] — domain types: the 27-section design state, phase/gate/
//!   session records, validator results, synthesis request/result
//! - [`schema`] — static path schema, alias table, refinable-path set
//! - [`state`] — `StateStore` (path-addressed get/set/patch) and atomic
//!   on-disk persistence
//! - [`transactions`] — `TransactionManager` and the mutation gate
//! - [`registry`] — the thirteen built-in phases and their dependency DAG
//! - [`validators`] — the validator trait, pipeline executor, contract
//!   checker, and built-in per-phase validators
//! - [`synthesis`] — the hull synthesis engine
//! - [`core`] — `Conductor` and the `ValidationOrchestrator` facade
//! - [`events`] — JSON-Lines mirror of a design's history
//! - [`config`] — TOML runtime configuration
//!
//! ## CLI
//!
//! For command-line usage, see the `keelmark-cli` crate.

pub use keelmark_config as config;
pub use keelmark_core as core;
pub use keelmark_events as events;
pub use keelmark_registry as registry;
pub use keelmark_schema as schema;
pub use keelmark_state as state;
pub use keelmark_synthesis as synthesis;
pub use keelmark_transactions as transactions;
pub use keelmark_types as types;
pub use keelmark_validators as validators;

#[cfg(test)]
mod tests {
    use crate::core::Conductor;

    #[test]
    fn conductor_is_reachable_through_the_aggregator() {
        let mut conductor = Conductor::new();
        conductor.create_session("d1");
        assert_eq!(conductor.design_state().design_id, "d1");
    }
}
