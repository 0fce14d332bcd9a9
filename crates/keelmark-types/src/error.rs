use thiserror::Error;

/// The kernel's uniform error taxonomy. Every variant carries the path
/// and/or source context that a caller needs to act on it; no variant
/// overlaps another's meaning.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
    /// The schema does not declare this path.
    #[error("invalid path: {path}")]
    InvalidPath { path: String },

    /// A refinable path was written with no active transaction.
    #[error(
        "mutation enforcement: refinable path '{path}' written by '{source}' outside a transaction; \
         wrap the write in begin/commit (see the ActionPlan protocol)"
    )]
    MutationEnforcement { path: String, source: String },

    /// `begin` was called while another transaction is already active.
    #[error("transaction already in progress: {active_id}")]
    TxnInProgress { active_id: String },

    /// A phase contract names a path that is not in the schema. This is a
    /// programmer error in the contract definition, not a data problem.
    #[error("phase '{phase}' contract has invalid paths: {paths:?}")]
    ContractDefinitionError { phase: String, paths: Vec<String> },

    /// Synthesis lock acquired, released, or written to out of turn.
    #[error("synthesis lock error: {message} (owner: {owner:?})")]
    SynthesisLockError {
        message: String,
        owner: Option<String>,
    },

    /// An infrastructure exception was raised from inside a validator's
    /// `run`, distinct from the validator reporting a failed result.
    #[error("validator '{validator_id}' raised an infrastructure error: {message}")]
    ValidatorError {
        validator_id: String,
        message: String,
    },

    /// The synthesis lock received a write missing one of the required
    /// hull dimensions; nothing was committed.
    #[error("incomplete hull write attempted by '{owner}': missing {missing:?}")]
    IncompletePartialWrite { owner: String, missing: Vec<String> },

    /// A named phase, gate, validator, or session does not exist.
    #[error("unknown {kind}: {name}")]
    NotFound { kind: &'static str, name: String },

    /// A caller-constructed request (a synthesis request, a CLI argument
    /// bundle) failed its own field-level validation before it ever
    /// touched the state store.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

pub type KernelResult<T> = Result<T, KernelError>;
