//! Income and expense flows.
//!
//! `classify` validates raw text against the current state, `transition` is a
//! pure function over `(state, event)`, and [`FormEngine`] runs the resulting
//! commit against the ledger before the next session is stored.

use engine::{Amount, EngineError, ExpenseSet, Ledger};

use crate::{
    parsing::{ValidationError, is_skip, parse_amount, parse_label},
    reply::{Keyboard, Reply},
    state::{FlowState, PendingField, SessionGuard, UserSession},
    texts,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Income,
    Expenses,
}

/// Validated input for a state transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Begin(Flow),
    Amount(Amount),
    Label(String),
    Skip,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no active flow")]
    NoActiveFlow,
    /// `Begin` outside idle. The router hands every message of an active
    /// flow to [`FormEngine::input`], so only direct callers of
    /// [`FormEngine::begin`] or [`transition`] see this.
    #[error("another flow is in progress")]
    Busy,
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
}

/// Ledger write produced by a terminal transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Commit {
    Income(Amount),
    Expenses(ExpenseSet),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub session: UserSession,
    pub commit: Option<Commit>,
}

impl Transition {
    fn to(session: UserSession) -> Self {
        Self {
            session,
            commit: None,
        }
    }

    fn with_commit(mut self, commit: Commit) -> Self {
        self.commit = Some(commit);
        self
    }
}

/// Turns raw text into an [`Event`] for `state`.
///
/// The skip sentinel is only meaningful at the optional category steps;
/// anywhere else it is treated as ordinary text.
pub fn classify(state: FlowState, text: &str) -> Result<Event, FlowError> {
    match state {
        FlowState::Idle => Err(FlowError::NoActiveFlow),
        FlowState::AwaitingIncome
        | FlowState::Expenses1
        | FlowState::Expenses2
        | FlowState::Expenses3 => Ok(Event::Amount(parse_amount(text)?)),
        FlowState::Category1 => Ok(Event::Label(parse_label(text)?)),
        FlowState::Category2 | FlowState::Category3 => {
            if is_skip(text) {
                Ok(Event::Skip)
            } else {
                Ok(Event::Label(parse_label(text)?))
            }
        }
    }
}

/// Pure transition function over `(current state, event)`.
pub fn transition(session: &UserSession, event: Event) -> Result<Transition, FlowError> {
    let state = session.state;
    let mut next = session.clone();

    let step = |mut next: UserSession, field: PendingField, to: FlowState| {
        next.pending.merge(field);
        next.state = to;
        Transition::to(next)
    };

    match (state, event) {
        (FlowState::Idle, Event::Begin(Flow::Income)) => Ok(Transition::to(UserSession {
            state: FlowState::AwaitingIncome,
            ..UserSession::default()
        })),
        (FlowState::Idle, Event::Begin(Flow::Expenses)) => Ok(Transition::to(UserSession {
            state: FlowState::Category1,
            ..UserSession::default()
        })),
        (_, Event::Begin(_)) => Err(FlowError::Busy),
        (FlowState::Idle, _) => Err(FlowError::NoActiveFlow),

        (FlowState::AwaitingIncome, Event::Amount(amount)) => {
            Ok(Transition::to(UserSession::default()).with_commit(Commit::Income(amount)))
        }

        (
            current @ (FlowState::Category1 | FlowState::Category2 | FlowState::Category3),
            Event::Label(label),
        ) => {
            let Some(slot) = current.slot() else {
                return Err(FlowError::InvalidTransition(format!("{current:?}")));
            };
            let to = match current {
                FlowState::Category1 => FlowState::Expenses1,
                FlowState::Category2 => FlowState::Expenses2,
                _ => FlowState::Expenses3,
            };
            Ok(step(next, PendingField::Category { slot, label }, to))
        }

        (FlowState::Category2, Event::Skip) => Ok(step(
            next,
            PendingField::Skipped { slot: 1 },
            FlowState::Category3,
        )),
        (FlowState::Category3, Event::Skip) => {
            next.pending.merge(PendingField::Skipped { slot: 2 });
            Ok(commit_expenses(next))
        }

        (FlowState::Expenses1, Event::Amount(amount)) => Ok(step(
            next,
            PendingField::Expense { slot: 0, amount },
            FlowState::Category2,
        )),
        (FlowState::Expenses2, Event::Amount(amount)) => Ok(step(
            next,
            PendingField::Expense { slot: 1, amount },
            FlowState::Category3,
        )),
        (FlowState::Expenses3, Event::Amount(amount)) => {
            next.pending.merge(PendingField::Expense { slot: 2, amount });
            Ok(commit_expenses(next))
        }

        (state, event) => Err(FlowError::InvalidTransition(format!(
            "{event:?} in {state:?}"
        ))),
    }
}

fn commit_expenses(collected: UserSession) -> Transition {
    let expenses = collected.pending.into_expenses();
    Transition::to(UserSession::default()).with_commit(Commit::Expenses(expenses))
}

/// Prompt shown when the user enters `session.state`.
pub(crate) fn prompt(session: &UserSession) -> Reply {
    let category = |slot| session.pending.category(slot).unwrap_or_default();
    match session.state {
        FlowState::Idle => Reply::new(texts::BUDGET_MENU).with_keyboard(Keyboard::BudgetMenu),
        FlowState::AwaitingIncome => {
            Reply::new(texts::INCOME_PROMPT).with_keyboard(Keyboard::Remove)
        }
        FlowState::Category1 => Reply::new(texts::CATEGORY1_PROMPT).with_keyboard(Keyboard::Remove),
        FlowState::Category2 => Reply::new(texts::CATEGORY2_PROMPT).with_keyboard(Keyboard::Skip),
        FlowState::Category3 => Reply::new(texts::CATEGORY3_PROMPT).with_keyboard(Keyboard::Skip),
        FlowState::Expenses1 => {
            Reply::new(texts::expenses_prompt(category(0))).with_keyboard(Keyboard::Remove)
        }
        FlowState::Expenses2 => {
            Reply::new(texts::expenses_prompt(category(1))).with_keyboard(Keyboard::Remove)
        }
        FlowState::Expenses3 => {
            Reply::new(texts::expenses_prompt(category(2))).with_keyboard(Keyboard::Remove)
        }
    }
}

/// Runs flow transitions for one user and commits finished flows.
#[derive(Clone, Debug)]
pub struct FormEngine {
    ledger: Ledger,
}

/// Who sent the message being handled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sender {
    pub user_id: String,
    pub display_name: String,
}

impl FormEngine {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Enters `flow` from idle; a session already in a flow is left as is.
    pub fn begin(&self, session: &mut SessionGuard, flow: Flow) -> Reply {
        match transition(session.session(), Event::Begin(flow)) {
            Ok(next) => {
                tracing::debug!("{flow:?} flow started");
                session.replace(next.session);
                prompt(session.session())
            }
            Err(_) => Reply::new(texts::FLOW_BUSY),
        }
    }

    /// Feeds one message to the active flow.
    ///
    /// Invalid input re-prompts without touching the session; a failed commit
    /// leaves the session as it was so the same input can be sent again.
    pub async fn input(&self, session: &mut SessionGuard, sender: &Sender, text: &str) -> Reply {
        let current = session.session().clone();
        let step = classify(current.state, text).and_then(|event| transition(&current, event));

        let next = match step {
            Ok(next) => next,
            Err(err) => return self.reject(&current, err),
        };

        let reply = match &next.commit {
            None => None,
            Some(commit) => match self.commit(sender, commit).await {
                Ok(reply) => Some(reply),
                Err(err) => {
                    tracing::error!(
                        "commit for user {} failed in {:?}: {err}",
                        sender.user_id,
                        current.state
                    );
                    return Reply::new(texts::STORAGE_FAILURE);
                }
            },
        };

        tracing::debug!(
            "user {}: {:?} -> {:?}",
            sender.user_id,
            current.state,
            next.session.state
        );
        session.replace(next.session);
        reply.unwrap_or_else(|| prompt(session.session()))
    }

    async fn commit(&self, sender: &Sender, commit: &Commit) -> Result<Reply, EngineError> {
        match commit {
            Commit::Income(amount) => {
                self.ledger
                    .add_income(&sender.user_id, &sender.display_name, *amount)
                    .await?;
                Ok(Reply::new(texts::income_added(*amount)).with_keyboard(Keyboard::BudgetMenu))
            }
            Commit::Expenses(expenses) => {
                self.ledger
                    .set_expenses(&sender.user_id, &sender.display_name, expenses)
                    .await?;
                Ok(Reply::new(texts::EXPENSES_SAVED).with_keyboard(Keyboard::BudgetMenu))
            }
        }
    }

    fn reject(&self, current: &UserSession, err: FlowError) -> Reply {
        tracing::debug!("input rejected in {:?}: {err}", current.state);
        match err {
            FlowError::NoActiveFlow => {
                Reply::new(texts::NO_ACTIVE_FLOW).with_keyboard(Keyboard::BudgetMenu)
            }
            FlowError::Busy => Reply::new(texts::FLOW_BUSY),
            FlowError::Validation(_) | FlowError::InvalidTransition(_) => {
                let text = match current.state {
                    FlowState::Category1 | FlowState::Category2 | FlowState::Category3 => {
                        texts::LABEL_REPROMPT
                    }
                    _ => texts::AMOUNT_REPROMPT,
                };
                Reply::new(text).with_keyboard(prompt(current).keyboard)
            }
        }
    }
}
