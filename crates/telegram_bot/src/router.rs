//! Single dispatch table for incoming text.
//!
//! Precedence, evaluated top to bottom:
//! 1. slash commands (`/start`, `/help`, `/cancel`)
//! 2. input for the active flow, if any
//! 3. menu triggers
//! 4. idle text (stray numbers, skip word, anything else)

use crate::{commands::Command, parsing::normalize, state::FlowState, texts};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    MainMenu,
    Rates,
    Tips,
    Budget,
    AddIncome,
    AddExpenses,
    ShowBalance,
}

/// Menu labels (case-insensitive) with their English aliases.
const TRIGGERS: &[(&[&str], Trigger)] = &[
    (&[texts::BTN_BACK, "меню", "back", "menu"], Trigger::MainMenu),
    (&[texts::BTN_RATES, "currency rates", "rates"], Trigger::Rates),
    (&[texts::BTN_TIPS, "savings tips", "tips"], Trigger::Tips),
    (&[texts::BTN_BUDGET, "budget"], Trigger::Budget),
    (&[texts::BTN_ADD_INCOME, "add income"], Trigger::AddIncome),
    (&[texts::BTN_ADD_EXPENSES, "add expenses"], Trigger::AddExpenses),
    (&[texts::BTN_SHOW_BALANCE, "show balance", "balance"], Trigger::ShowBalance),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route<'a> {
    Command(Command),
    FlowInput(&'a str),
    Trigger(Trigger),
    Idle(&'a str),
}

pub fn route(state: FlowState, text: &str) -> Route<'_> {
    if let Some(cmd) = Command::parse_text(text) {
        return Route::Command(cmd);
    }
    if !state.is_idle() {
        return Route::FlowInput(text);
    }
    match trigger(text) {
        Some(trigger) => Route::Trigger(trigger),
        None => Route::Idle(text),
    }
}

fn trigger(text: &str) -> Option<Trigger> {
    let normalized = normalize(text);
    TRIGGERS
        .iter()
        .find(|(labels, _)| labels.iter().any(|label| label.to_lowercase() == normalized))
        .map(|(_, trigger)| *trigger)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_labels_are_case_insensitive() {
        assert_eq!(
            route(FlowState::Idle, "ДОБАВИТЬ ДОХОД"),
            Route::Trigger(Trigger::AddIncome)
        );
        assert_eq!(
            route(FlowState::Idle, "  add   expenses "),
            Route::Trigger(Trigger::AddExpenses)
        );
        assert_eq!(
            route(FlowState::Idle, "Show Balance"),
            Route::Trigger(Trigger::ShowBalance)
        );
        assert_eq!(route(FlowState::Idle, "Курсы валют"), Route::Trigger(Trigger::Rates));
    }

    #[test]
    fn flow_input_wins_over_menu_triggers() {
        assert_eq!(
            route(FlowState::Category1, "Бюджет"),
            Route::FlowInput("Бюджет")
        );
        assert_eq!(
            route(FlowState::AwaitingIncome, "add income"),
            Route::FlowInput("add income")
        );
    }

    #[test]
    fn commands_win_over_flow_input() {
        assert_eq!(
            route(FlowState::Expenses2, "/cancel"),
            Route::Command(Command::Cancel)
        );
        assert_eq!(route(FlowState::Idle, "/start"), Route::Command(Command::Start));
    }

    #[test]
    fn unknown_idle_text() {
        assert_eq!(route(FlowState::Idle, "500"), Route::Idle("500"));
        assert_eq!(route(FlowState::Idle, "hello"), Route::Idle("hello"));
    }

    #[test]
    fn every_trigger_is_reachable() {
        for (labels, expected) in TRIGGERS {
            for label in *labels {
                assert_eq!(trigger(label), Some(*expected), "{label}");
            }
        }
    }
}
