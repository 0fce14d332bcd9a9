//! Exclusive write lease over the hull-dimension paths, held for the
//! duration of one synthesis call.
//!
//! A `SynthesisLock` is a per-design-state instance (owned by whoever
//! drives synthesis), never a module-level singleton, so two design
//! states never contend over the same lock object.

use keelmark_state::StateStore;
use keelmark_types::KernelError;
use serde_json::Value;

/// The full set of paths a hull write must supply atomically. Writing a
/// subset is rejected outright; nothing under the lock is ever partially
/// committed.
pub const HULL_PATHS: [&str; 10] = [
    "hull.lwl",
    "hull.beam",
    "hull.draft",
    "hull.cb",
    "hull.cp",
    "hull.cm",
    "hull.cwp",
    "hull.displacement_m3",
    "hull.displacement_kg",
    "hull.displacement_mt",
];

/// `lwl`, `beam`, and `draft` must always be present in a hull write;
/// everything else in `HULL_PATHS` may be supplied or left for a later
/// write under the same lock hold.
const REQUIRED_ON_WRITE: [&str; 3] = ["hull.lwl", "hull.beam", "hull.draft"];

pub struct SynthesisLock {
    owner: Option<String>,
}

impl SynthesisLock {
    pub fn new() -> Self {
        Self { owner: None }
    }

    pub fn is_locked(&self) -> bool {
        self.owner.is_some()
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn acquire(&mut self, owner: &str) -> Result<(), KernelError> {
        if let Some(current) = &self.owner {
            return Err(KernelError::SynthesisLockError {
                message: format!("lock already held by '{current}'"),
                owner: Some(current.clone()),
            });
        }
        self.owner = Some(owner.to_string());
        Ok(())
    }

    pub fn release(&mut self, owner: &str) -> Result<(), KernelError> {
        match &self.owner {
            Some(current) if current == owner => {
                self.owner = None;
                Ok(())
            }
            Some(current) => Err(KernelError::SynthesisLockError {
                message: format!("release by '{owner}' does not match owner '{current}'"),
                owner: Some(current.clone()),
            }),
            None => Err(KernelError::SynthesisLockError {
                message: "lock is not held".to_string(),
                owner: None,
            }),
        }
    }

    /// Writes `params` (a subset of `HULL_PATHS`, dotted path -> value)
    /// into `store` as one atomic group. The lock must already be held
    /// by `owner`; a write missing any of `lwl, beam, draft` is rejected
    /// before anything is committed.
    pub fn write_hull_params(
        &self,
        store: &mut StateStore,
        params: &[(&str, Value)],
        owner: &str,
    ) -> Result<(), KernelError> {
        match &self.owner {
            Some(current) if current == owner => {}
            Some(current) => {
                return Err(KernelError::SynthesisLockError {
                    message: format!("write by '{owner}' does not match lock owner '{current}'"),
                    owner: Some(current.clone()),
                });
            }
            None => {
                return Err(KernelError::SynthesisLockError {
                    message: "write attempted with no lock held".to_string(),
                    owner: None,
                });
            }
        }

        let missing: Vec<String> = REQUIRED_ON_WRITE
            .iter()
            .filter(|req| !params.iter().any(|(path, _)| path == *req))
            .map(|s| s.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(KernelError::IncompletePartialWrite {
                owner: owner.to_string(),
                missing,
            });
        }

        let source = format!("synthesis:{owner}");
        for (path, value) in params {
            store.set_internal(path, value.clone(), &source)?;
        }
        Ok(())
    }
}

impl Default for SynthesisLock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keelmark_types::DesignState;
    use serde_json::json;

    fn store() -> StateStore {
        StateStore::new(DesignState::new("d1"))
    }

    #[test]
    fn second_acquire_before_release_fails() {
        let mut lock = SynthesisLock::new();
        lock.acquire("synthesizer").unwrap();
        let err = lock.acquire("other").unwrap_err();
        assert!(matches!(err, KernelError::SynthesisLockError { .. }));
    }

    #[test]
    fn acquire_after_release_succeeds() {
        let mut lock = SynthesisLock::new();
        lock.acquire("synthesizer").unwrap();
        lock.release("synthesizer").unwrap();
        assert!(lock.acquire("synthesizer").is_ok());
    }

    #[test]
    fn release_by_non_owner_fails() {
        let mut lock = SynthesisLock::new();
        lock.acquire("synthesizer").unwrap();
        assert!(lock.release("someone-else").is_err());
    }

    #[test]
    fn write_missing_required_dimension_is_rejected_and_nothing_is_committed() {
        let mut lock = SynthesisLock::new();
        let mut s = store();
        lock.acquire("synthesizer").unwrap();
        let err = lock
            .write_hull_params(&mut s, &[("hull.lwl", json!(20.0))], "synthesizer")
            .unwrap_err();
        assert!(matches!(err, KernelError::IncompletePartialWrite { .. }));
        assert!(matches!(s.get("hull.lwl"), None | Some(Value::Null)));
    }

    #[test]
    fn complete_write_commits_all_params() {
        let mut lock = SynthesisLock::new();
        let mut s = store();
        lock.acquire("synthesizer").unwrap();
        lock.write_hull_params(
            &mut s,
            &[
                ("hull.lwl", json!(20.0)),
                ("hull.beam", json!(5.0)),
                ("hull.draft", json!(1.5)),
                ("hull.cb", json!(0.45)),
            ],
            "synthesizer",
        )
        .unwrap();
        assert_eq!(s.get("hull.lwl"), Some(json!(20.0)));
        assert_eq!(s.get("hull.cb"), Some(json!(0.45)));
    }
}
