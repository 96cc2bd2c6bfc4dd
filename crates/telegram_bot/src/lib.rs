//! Telegram bot.
//!
//! Users record income and up to three categorized expenses through short
//! conversational flows, and query the resulting balance. The flow logic lives
//! in [`Conversation`] and is independent of Telegram; this crate root only
//! wires it into a teloxide dispatcher.

use std::sync::Arc;

use engine::Ledger;
use teloxide::{prelude::*, utils::command::BotCommands};

pub mod commands;
mod conversation;
pub mod flow;
mod handlers;
mod parsing;
pub mod rates;
mod reply;
pub mod router;
pub mod state;
pub mod texts;
mod tips;
mod ui;

pub use conversation::Conversation;
pub use flow::{FormEngine, Sender};
pub use parsing::ValidationError;
pub use rates::{HttpRateFetcher, RateError, RateFetcher};
pub use reply::{Keyboard, Reply};
pub use state::{FlowState, SessionStore, UserSession};
pub use tips::TIPS;

#[derive(Clone)]
pub struct ConfigParameters {
    allowed_users: Option<Vec<UserId>>,
    conversation: Conversation,
}

pub struct Bot {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    conversation: Conversation,
}

impl Bot {
    pub fn new(
        token: &str,
        allowed_users: Option<Vec<UserId>>,
        conversation: Conversation,
    ) -> Result<Self, String> {
        if token.trim().is_empty() {
            return Err("telegram token is empty".to_string());
        }

        Ok(Self {
            token: token.to_string(),
            allowed_users,
            conversation,
        })
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);
        if let Err(err) = bot.set_my_commands(commands::Command::bot_commands()).await {
            tracing::warn!("failed to register bot commands: {err}");
        }

        let parameters = ConfigParameters {
            allowed_users: self.allowed_users.clone(),
            conversation: self.conversation.clone(),
        };

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    ledger: Option<Ledger>,
    rates: Option<Arc<dyn RateFetcher>>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn allowed_users(mut self, allowed_users: Vec<UserId>) -> BotBuilder {
        if !allowed_users.is_empty() {
            self.allowed_users = Some(allowed_users);
        }
        self
    }

    pub fn ledger(mut self, ledger: Ledger) -> BotBuilder {
        self.ledger = Some(ledger);
        self
    }

    pub fn rates(mut self, rates: Arc<dyn RateFetcher>) -> BotBuilder {
        self.rates = Some(rates);
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        let ledger = self.ledger.ok_or("missing ledger")?;
        let rates = self.rates.ok_or("missing rate fetcher")?;
        Bot::new(
            &self.token,
            self.allowed_users,
            Conversation::new(ledger, rates),
        )
    }
}
