//! Optimistic mutation modeled as an explicit three-state transaction.
//!
//! The rollback snapshot is captured when the transaction begins, before
//! the mutation is issued. While pending, the visible value is the
//! optimistic one; a failed write rolls back to the snapshot. Both
//! `commit` and `roll_back` are single-shot.

/// State of an optimistic transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnState {
    Pending,
    Committed,
    RolledBack,
}

/// An in-flight optimistic update of a value of type `T`.
#[derive(Debug, Clone)]
pub struct Optimistic<T: Clone> {
    snapshot: T,
    value: T,
    state: TxnState,
}

impl<T: Clone> Optimistic<T> {
    /// Begin a transaction: capture `current` as the rollback snapshot and
    /// show `optimistic` as the visible value.
    pub fn begin(current: T, optimistic: T) -> Self {
        Self {
            snapshot: current,
            value: optimistic,
            state: TxnState::Pending,
        }
    }

    pub fn state(&self) -> TxnState {
        self.state
    }

    /// The value the UI should show right now.
    pub fn visible(&self) -> &T {
        match self.state {
            TxnState::Pending | TxnState::Committed => &self.value,
            TxnState::RolledBack => &self.snapshot,
        }
    }

    /// Mark the remote write as confirmed. No-op after resolution.
    pub fn commit(&mut self) {
        if self.state == TxnState::Pending {
            self.state = TxnState::Committed;
        }
    }

    /// Revert to the pre-mutation snapshot. No-op after resolution.
    pub fn roll_back(&mut self) {
        if self.state == TxnState::Pending {
            self.state = TxnState::RolledBack;
        }
    }

    /// Consume the transaction, yielding the final value.
    pub fn into_value(self) -> T {
        match self.state {
            TxnState::RolledBack => self.snapshot,
            _ => self.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_shows_optimistic_value() {
        let txn = Optimistic::begin(false, true);
        assert_eq!(txn.state(), TxnState::Pending);
        assert!(*txn.visible());
    }

    #[test]
    fn rollback_restores_snapshot() {
        let mut txn = Optimistic::begin(3, 4);
        txn.roll_back();
        assert_eq!(txn.state(), TxnState::RolledBack);
        assert_eq!(*txn.visible(), 3);
        assert_eq!(txn.into_value(), 3);
    }

    #[test]
    fn commit_keeps_optimistic_value() {
        let mut txn = Optimistic::begin(3, 4);
        txn.commit();
        assert_eq!(txn.state(), TxnState::Committed);
        assert_eq!(txn.into_value(), 4);
    }

    #[test]
    fn resolution_is_single_shot() {
        let mut txn = Optimistic::begin(3, 4);
        txn.commit();
        txn.roll_back();
        assert_eq!(txn.state(), TxnState::Committed);

        let mut txn = Optimistic::begin(3, 4);
        txn.roll_back();
        txn.commit();
        assert_eq!(txn.state(), TxnState::RolledBack);
    }
}
