//! # Transactions
//!
//! The single-active-transaction manager and mutation-gate bookkeeping:
//! at most one [`Transaction`] is active at a time — `begin` while active
//! raises `keelmark_types::KernelError::TxnInProgress`, full stop.
//!
//! This crate never touches a live `keelmark_types::DesignState` directly.
//! `begin` takes a snapshot passed in by the caller; `commit`/`rollback`
//! hand a [`Transaction`] (and, on rollback, the original snapshot) back
//! out. `keelmark-core` is the only place that owns both a `StateStore`
//! and a `TransactionManager` and wires them together.

mod manager;

pub use manager::TransactionManager;
pub use manager::{Savepoint, StateChange, Transaction, TransactionStatus};
