//! The `Validator` trait every phase-level check implements, plus a
//! registry keyed by validator id (`"hull/form"`, `"stability/intact_gm"`,
//! ...) matching the ids named in `keelmark-registry`'s phase
//! definitions.

use std::collections::HashMap;

use keelmark_state::StateStore;
use keelmark_types::{KernelResult, ValidationResult};

/// A single check run against the design state within a phase. Declares
/// which paths it reads and writes so the executor can order validators
/// that declare a dependency on one another.
pub trait Validator: Send + Sync {
    fn id(&self) -> &str;

    fn read_paths(&self) -> Vec<String> {
        Vec::new()
    }

    fn write_paths(&self) -> Vec<String> {
        Vec::new()
    }

    /// Other validator ids that must run (and complete) before this one.
    /// Empty for the overwhelming majority of validators.
    fn depends_on(&self) -> Vec<String> {
        Vec::new()
    }

    /// Runs the check. A `Result::Err` here is an infrastructure failure
    /// (the validator itself blew up), distinct from the validator
    /// reporting `ValidatorState::Failed` inside a successfully-returned
    /// `ValidationResult`.
    fn run(&self, store: &mut StateStore) -> KernelResult<ValidationResult>;
}

#[derive(Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Box<dyn Validator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, validator: Box<dyn Validator>) {
        self.validators.insert(validator.id().to_string(), validator);
    }

    pub fn get(&self, id: &str) -> Option<&dyn Validator> {
        self.validators.get(id).map(|v| v.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.validators.contains_key(id)
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keelmark_types::ValidatorState;

    struct StubValidator {
        id: String,
    }

    impl Validator for StubValidator {
        fn id(&self) -> &str {
            &self.id
        }

        fn run(&self, _store: &mut StateStore) -> KernelResult<ValidationResult> {
            let mut result = ValidationResult::new(self.id.clone());
            result.state = ValidatorState::Passed;
            Ok(result)
        }
    }

    #[test]
    fn register_then_get_round_trips() {
        let mut registry = ValidatorRegistry::new();
        registry.register(Box::new(StubValidator {
            id: "hull/form".to_string(),
        }));
        assert!(registry.contains("hull/form"));
        assert!(registry.get("hull/form").is_some());
        assert!(registry.get("missing/id").is_none());
    }
}
