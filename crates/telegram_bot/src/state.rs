use std::{collections::HashMap, sync::Arc};

use engine::{Amount, ExpenseLine, ExpenseSet};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Where a user is inside a conversational flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlowState {
    #[default]
    Idle,
    AwaitingIncome,
    Category1,
    Expenses1,
    Category2,
    Expenses2,
    Category3,
    Expenses3,
}

impl FlowState {
    pub fn is_idle(self) -> bool {
        self == FlowState::Idle
    }

    /// Zero-based expense slot the state collects data for.
    pub(crate) fn slot(self) -> Option<usize> {
        match self {
            FlowState::Category1 | FlowState::Expenses1 => Some(0),
            FlowState::Category2 | FlowState::Expenses2 => Some(1),
            FlowState::Category3 | FlowState::Expenses3 => Some(2),
            FlowState::Idle | FlowState::AwaitingIncome => None,
        }
    }
}

/// A single value collected mid-flow.
#[derive(Clone, Debug, PartialEq)]
pub enum PendingField {
    Category { slot: usize, label: String },
    Expense { slot: usize, amount: Amount },
    Skipped { slot: usize },
}

/// Data collected by the expense flow, committed only as a whole.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PendingData {
    expenses: ExpenseSet,
}

impl PendingData {
    pub fn merge(&mut self, field: PendingField) {
        match field {
            PendingField::Category { slot, label } => {
                if let Some(line) = self.expenses.get_mut(slot) {
                    line.category = Some(label);
                }
            }
            PendingField::Expense { slot, amount } => {
                if let Some(line) = self.expenses.get_mut(slot) {
                    line.amount = amount.value();
                }
            }
            PendingField::Skipped { slot } => {
                if let Some(line) = self.expenses.get_mut(slot) {
                    *line = ExpenseLine::skipped();
                }
            }
        }
    }

    pub fn category(&self, slot: usize) -> Option<&str> {
        self.expenses.get(slot)?.category.as_deref()
    }

    pub fn expenses(&self) -> &ExpenseSet {
        &self.expenses
    }

    pub fn into_expenses(self) -> ExpenseSet {
        self.expenses
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserSession {
    pub state: FlowState,
    pub pending: PendingData,
}

/// Per-user conversation state.
///
/// Each user owns a slot guarded by its own lock: [`SessionStore::lock`]
/// serializes the handling of one user's messages while other users proceed
/// in parallel. Slots of idle users are dropped on [`SessionStore::release`],
/// so only users with a flow in progress stay resident.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<UserSession>>>>>,
}

impl SessionStore {
    async fn slot(&self, user_id: &str) -> Arc<Mutex<UserSession>> {
        let mut guard = self.inner.lock().await;
        guard
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(UserSession::default())))
            .clone()
    }

    /// Takes the user's lock. Dropping the guard releases it; handing it to
    /// [`SessionStore::release`] also forgets the slot once the user is idle.
    pub async fn lock(&self, user_id: &str) -> SessionGuard {
        SessionGuard {
            user_id: user_id.to_string(),
            session: self.slot(user_id).await.lock_owned().await,
        }
    }

    /// Unlocks `guard` and drops the user's slot if the session is idle and
    /// no other message of that user is waiting for it.
    pub async fn release(&self, guard: SessionGuard) {
        if !guard.state().is_idle() {
            return;
        }

        // Clones of a slot are only handed out under the map lock, so a
        // strong count of one after unlocking means nobody is queued on it.
        let mut slots = self.inner.lock().await;
        let SessionGuard { user_id, session } = guard;
        drop(session);
        if slots
            .get(&user_id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&user_id);
        }
    }

    /// Snapshot of the user's session (idle if the user is unknown).
    pub async fn get(&self, user_id: &str) -> UserSession {
        let slot = self.inner.lock().await.get(user_id).cloned();
        match slot {
            Some(slot) => slot.lock().await.clone(),
            None => UserSession::default(),
        }
    }

    /// Number of users with a resident session.
    pub async fn resident(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn set_state(&self, user_id: &str, state: FlowState) {
        let mut guard = self.lock(user_id).await;
        guard.set_state(state);
        self.release(guard).await;
    }

    pub async fn merge_data(&self, user_id: &str, field: PendingField) {
        self.lock(user_id).await.merge_data(field);
    }

    pub async fn clear(&self, user_id: &str) {
        let mut guard = self.lock(user_id).await;
        guard.clear();
        self.release(guard).await;
    }
}

/// Exclusive access to one user's session.
pub struct SessionGuard {
    user_id: String,
    session: OwnedMutexGuard<UserSession>,
}

impl SessionGuard {
    pub fn state(&self) -> FlowState {
        self.session.state
    }

    pub fn session(&self) -> &UserSession {
        &self.session
    }

    pub fn set_state(&mut self, state: FlowState) {
        self.session.state = state;
    }

    pub fn merge_data(&mut self, field: PendingField) {
        self.session.pending.merge(field);
    }

    /// Back to idle, dropping anything collected so far.
    pub fn clear(&mut self) {
        *self.session = UserSession::default();
    }

    pub(crate) fn replace(&mut self, session: UserSession) {
        *self.session = session;
    }
}
