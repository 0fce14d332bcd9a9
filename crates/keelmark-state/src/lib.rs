//! # State
//!
//! The path-addressed, schema-strict, alias-resolving facade over
//! [`keelmark_types::DesignState`]: [`StateStore`] is the only thing in the
//! workspace that writes into a design directly. Every other crate reaches
//! the design through its `get`/`set`/`patch` methods.
//!
//! `StateStore` itself enforces nothing about transactions — it takes an
//! explicit `in_transaction` flag from the caller on every refinable write
//! and returns [`keelmark_types::KernelError::MutationEnforcement`] when a
//! refinable path is written without one. Deciding *whether* a transaction
//! is active is `keelmark-transactions`' job; `StateStore` does not hold a
//! reference to a transaction manager, so the two crates never need to
//! borrow each other. A higher-level facade (`keelmark-core`) owns both and
//! threads the flag through.
//!
//! Atomic on-disk persistence lives in [`persist::DesignFile`], a thin
//! temp-file-plus-rename wrapper independent of `StateStore` itself.

mod persist;
mod store;

pub use persist::DesignFile;
pub use store::{Fetched, StateStore};
