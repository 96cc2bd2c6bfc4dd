//! Turns one incoming text into one reply.

use std::sync::Arc;

use engine::{EngineError, Ledger, compute_balance};

use crate::{
    commands::Command,
    flow::{Flow, FormEngine, Sender},
    parsing::{is_skip, parse_amount},
    rates::{self, RateFetcher},
    reply::{Keyboard, Reply},
    router::{Route, Trigger, route},
    state::SessionStore,
    texts, tips,
};

/// Conversation core shared by every update handler.
#[derive(Clone)]
pub struct Conversation {
    sessions: SessionStore,
    forms: FormEngine,
    rates: Arc<dyn RateFetcher>,
}

impl Conversation {
    pub fn new(ledger: Ledger, rates: Arc<dyn RateFetcher>) -> Self {
        Self {
            sessions: SessionStore::default(),
            forms: FormEngine::new(ledger),
            rates,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handles one message. Messages of the same user are processed one at a
    /// time, in arrival order; different users never wait for each other.
    ///
    /// The user's lock is held until the reply is ready, including the rate
    /// lookup, which is bounded by the fetcher's own timeout.
    pub async fn handle(&self, sender: &Sender, text: &str) -> Reply {
        let mut session = self.sessions.lock(&sender.user_id).await;

        let reply = match route(session.state(), text) {
            Route::Command(Command::Start) => {
                session.clear();
                Reply::new(texts::GREETING).with_keyboard(Keyboard::MainMenu)
            }
            Route::Command(Command::Help) => Reply::new(texts::help_text()),
            Route::Command(Command::Cancel) => {
                let text = if session.state().is_idle() {
                    texts::MAIN_MENU
                } else {
                    tracing::info!(
                        "user {} cancelled flow in {:?}",
                        sender.user_id,
                        session.state()
                    );
                    texts::CANCELLED
                };
                session.clear();
                Reply::new(text).with_keyboard(Keyboard::MainMenu)
            }
            Route::FlowInput(input) => self.forms.input(&mut session, sender, input).await,
            Route::Trigger(Trigger::AddIncome) => self.forms.begin(&mut session, Flow::Income),
            Route::Trigger(Trigger::AddExpenses) => {
                self.forms.begin(&mut session, Flow::Expenses)
            }
            Route::Trigger(trigger) => self.menu(sender, trigger).await,
            Route::Idle(input) => idle_reply(input),
        };

        self.sessions.release(session).await;
        reply
    }

    async fn menu(&self, sender: &Sender, trigger: Trigger) -> Reply {
        match trigger {
            Trigger::MainMenu => Reply::new(texts::MAIN_MENU).with_keyboard(Keyboard::MainMenu),
            Trigger::Budget => Reply::new(texts::BUDGET_MENU).with_keyboard(Keyboard::BudgetMenu),
            Trigger::Tips => Reply::new(tips::random_tip()),
            Trigger::Rates => match rates::rub_summary(self.rates.as_ref()).await {
                Ok(text) => Reply::new(text),
                Err(err) => {
                    tracing::warn!("rate fetch failed: {err}");
                    Reply::new(texts::RATES_FAILURE)
                }
            },
            Trigger::ShowBalance => self.balance(sender).await,
            Trigger::AddIncome | Trigger::AddExpenses => {
                Reply::new(texts::BUDGET_MENU).with_keyboard(Keyboard::BudgetMenu)
            }
        }
    }

    async fn balance(&self, sender: &Sender) -> Reply {
        match self.forms.ledger().record(&sender.user_id).await {
            Ok(record) => Reply::new(texts::balance(&compute_balance(&record))),
            Err(EngineError::AbsentRecord(_)) => {
                Reply::new(texts::NO_DATA).with_keyboard(Keyboard::BudgetMenu)
            }
            Err(err) => {
                tracing::error!("balance for user {} failed: {err}", sender.user_id);
                Reply::new(texts::LOAD_FAILURE)
            }
        }
    }
}

fn idle_reply(input: &str) -> Reply {
    if parse_amount(input).is_ok() || is_skip(input) {
        Reply::new(texts::NO_ACTIVE_FLOW).with_keyboard(Keyboard::BudgetMenu)
    } else {
        Reply::new(texts::UNKNOWN).with_keyboard(Keyboard::MainMenu)
    }
}
