//! Transaction lifecycle: `begin` snapshots the caller's state, `commit`
//! discards the snapshot and hands back the recorded change list,
//! `rollback` hands the snapshot back for the caller to restore.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use keelmark_types::{DesignState, KernelError, KernelResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Active,
    Committed,
    RolledBack,
}

/// One write observed inside an active transaction. Mirrored onto
/// `Transaction::changes` as it happens, so a caller can preview a diff
/// without re-running `StateStore::diff` against a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub path: String,
    pub old_value: Value,
    pub new_value: Value,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

/// A named point within the active transaction's change list that
/// `rollback_to_savepoint` can truncate back to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Savepoint {
    pub name: String,
    pub change_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub status: TransactionStatus,
    pub started_at: DateTime<Utc>,
    pub changes: Vec<StateChange>,
    pub savepoints: Vec<Savepoint>,
}

/// At most one active transaction. `begin`/`commit`/`rollback` never see
/// a `StateStore` — the caller hands a snapshot in and takes one back out.
#[derive(Debug, Default)]
pub struct TransactionManager {
    active: Option<Transaction>,
    snapshot: Option<DesignState>,
    savepoint_snapshots: HashMap<String, DesignState>,
    next_id: u64,
}

impl TransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_transaction(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_transaction(&self) -> Option<&Transaction> {
        self.active.as_ref()
    }

    pub fn begin(&mut self, current_state: &DesignState) -> KernelResult<String> {
        if let Some(txn) = &self.active {
            return Err(KernelError::TxnInProgress {
                active_id: txn.id.clone(),
            });
        }
        self.next_id += 1;
        let id = format!("txn-{:06}", self.next_id);
        self.snapshot = Some(current_state.clone());
        self.active = Some(Transaction {
            id: id.clone(),
            status: TransactionStatus::Active,
            started_at: Utc::now(),
            changes: Vec::new(),
            savepoints: Vec::new(),
        });
        Ok(id)
    }

    pub fn record_change(
        &mut self,
        txn_id: &str,
        path: &str,
        old_value: Value,
        new_value: Value,
        source: &str,
    ) -> KernelResult<()> {
        let txn = self.require_active(txn_id)?;
        txn.changes.push(StateChange {
            path: path.to_string(),
            old_value,
            new_value,
            source: source.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Ends the transaction successfully. The caller is responsible for
    /// bumping `design_version` and recording the `transaction_commit`
    /// history entry on its `StateStore` — this manager only clears its
    /// own bookkeeping.
    pub fn commit(&mut self, txn_id: &str) -> KernelResult<Transaction> {
        let mut txn = self.take_active(txn_id)?;
        txn.status = TransactionStatus::Committed;
        self.snapshot = None;
        self.savepoint_snapshots.clear();
        Ok(txn)
    }

    /// Ends the transaction unsuccessfully, handing back the snapshot
    /// captured at `begin` for the caller to restore onto its
    /// `StateStore`. `design_version` is untouched on either side.
    pub fn rollback(&mut self, txn_id: &str) -> KernelResult<(Transaction, DesignState)> {
        let mut txn = self.take_active(txn_id)?;
        txn.status = TransactionStatus::RolledBack;
        let snapshot = self
            .snapshot
            .take()
            .expect("a snapshot is always present while a transaction is active");
        self.savepoint_snapshots.clear();
        Ok((txn, snapshot))
    }

    pub fn create_savepoint(
        &mut self,
        txn_id: &str,
        name: &str,
        current_state: &DesignState,
    ) -> KernelResult<()> {
        let txn = self.require_active(txn_id)?;
        let change_index = txn.changes.len();
        txn.savepoints.push(Savepoint {
            name: name.to_string(),
            change_index,
        });
        self.savepoint_snapshots
            .insert(name.to_string(), current_state.clone());
        Ok(())
    }

    /// Truncates the transaction's change list back to the savepoint and
    /// hands back the state snapshot taken when it was created, for the
    /// caller to restore. The transaction itself stays active.
    pub fn rollback_to_savepoint(&mut self, txn_id: &str, name: &str) -> KernelResult<DesignState> {
        let snapshot = self
            .savepoint_snapshots
            .get(name)
            .cloned()
            .ok_or_else(|| KernelError::NotFound {
                kind: "savepoint",
                name: name.to_string(),
            })?;
        let txn = self.require_active(txn_id)?;
        let pos = txn
            .savepoints
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| KernelError::NotFound {
                kind: "savepoint",
                name: name.to_string(),
            })?;
        let change_index = txn.savepoints[pos].change_index;
        txn.changes.truncate(change_index);
        txn.savepoints.truncate(pos + 1);
        Ok(snapshot)
    }

    fn require_active(&mut self, txn_id: &str) -> KernelResult<&mut Transaction> {
        match &mut self.active {
            Some(txn) if txn.id == txn_id => Ok(txn),
            _ => Err(KernelError::NotFound {
                kind: "transaction",
                name: txn_id.to_string(),
            }),
        }
    }

    fn take_active(&mut self, txn_id: &str) -> KernelResult<Transaction> {
        match &self.active {
            Some(txn) if txn.id == txn_id => Ok(self.active.take().unwrap()),
            _ => Err(KernelError::NotFound {
                kind: "transaction",
                name: txn_id.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn begin_while_active_is_rejected() {
        let mut mgr = TransactionManager::new();
        let state = DesignState::new("d1");
        mgr.begin(&state).unwrap();
        let err = mgr.begin(&state).unwrap_err();
        assert!(matches!(err, KernelError::TxnInProgress { .. }));
    }

    #[test]
    fn commit_clears_the_active_marker() {
        let mut mgr = TransactionManager::new();
        let state = DesignState::new("d1");
        let id = mgr.begin(&state).unwrap();
        assert!(mgr.in_transaction());
        mgr.commit(&id).unwrap();
        assert!(!mgr.in_transaction());
    }

    #[test]
    fn rollback_hands_back_the_original_snapshot() {
        let mut mgr = TransactionManager::new();
        let mut state = DesignState::new("d1");
        state.hull.loa = Some(10.0);
        let id = mgr.begin(&state).unwrap();
        let (txn, snapshot) = mgr.rollback(&id).unwrap();
        assert_eq!(txn.status, TransactionStatus::RolledBack);
        assert_eq!(snapshot.hull.loa, Some(10.0));
        assert!(!mgr.in_transaction());
    }

    #[test]
    fn record_change_appends_to_the_active_transaction() {
        let mut mgr = TransactionManager::new();
        let state = DesignState::new("d1");
        let id = mgr.begin(&state).unwrap();
        mgr.record_change(&id, "hull.loa", json!(null), json!(20.0), "agent")
            .unwrap();
        let txn = mgr.active_transaction().unwrap();
        assert_eq!(txn.changes.len(), 1);
        assert_eq!(txn.changes[0].path, "hull.loa");
    }

    #[test]
    fn unknown_transaction_id_is_not_found() {
        let mut mgr = TransactionManager::new();
        let err = mgr.commit("no-such-txn").unwrap_err();
        assert!(matches!(err, KernelError::NotFound { .. }));
    }

    #[test]
    fn savepoint_rollback_truncates_changes_but_stays_active() {
        let mut mgr = TransactionManager::new();
        let state = DesignState::new("d1");
        let id = mgr.begin(&state).unwrap();
        mgr.record_change(&id, "hull.loa", json!(null), json!(20.0), "agent")
            .unwrap();
        mgr.create_savepoint(&id, "before-beam", &state).unwrap();
        mgr.record_change(&id, "hull.beam", json!(null), json!(7.0), "agent")
            .unwrap();
        mgr.rollback_to_savepoint(&id, "before-beam").unwrap();
        let txn = mgr.active_transaction().unwrap();
        assert_eq!(txn.changes.len(), 1);
        assert!(mgr.in_transaction());
    }

    #[test]
    fn rollback_to_unknown_savepoint_is_not_found() {
        let mut mgr = TransactionManager::new();
        let state = DesignState::new("d1");
        let id = mgr.begin(&state).unwrap();
        let err = mgr.rollback_to_savepoint(&id, "nope").unwrap_err();
        assert!(matches!(err, KernelError::NotFound { .. }));
    }
}
