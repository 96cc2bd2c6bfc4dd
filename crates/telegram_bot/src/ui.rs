use teloxide::types::{KeyboardButton, KeyboardMarkup, KeyboardRemove, ReplyMarkup};

use crate::{reply::Keyboard, texts};

fn rows(labels: &[&[&str]]) -> KeyboardMarkup {
    KeyboardMarkup::new(
        labels
            .iter()
            .map(|row| row.iter().map(|label| KeyboardButton::new(*label)).collect::<Vec<_>>())
            .collect::<Vec<_>>(),
    )
    .resize_keyboard()
}

pub(crate) fn render_main_menu() -> KeyboardMarkup {
    rows(&[&[texts::BTN_RATES, texts::BTN_TIPS], &[texts::BTN_BUDGET]])
}

pub(crate) fn render_budget_menu() -> KeyboardMarkup {
    rows(&[
        &[texts::BTN_ADD_INCOME, texts::BTN_ADD_EXPENSES],
        &[texts::BTN_SHOW_BALANCE],
        &[texts::BTN_BACK],
    ])
}

pub(crate) fn render_skip() -> KeyboardMarkup {
    rows(&[&[texts::BTN_SKIP]]).one_time_keyboard()
}

/// Telegram markup for a reply, `None` to leave the current keyboard.
pub(crate) fn markup(keyboard: Keyboard) -> Option<ReplyMarkup> {
    match keyboard {
        Keyboard::Unchanged => None,
        Keyboard::MainMenu => Some(ReplyMarkup::Keyboard(render_main_menu())),
        Keyboard::BudgetMenu => Some(ReplyMarkup::Keyboard(render_budget_menu())),
        Keyboard::Skip => Some(ReplyMarkup::Keyboard(render_skip())),
        Keyboard::Remove => Some(ReplyMarkup::KeyboardRemove(KeyboardRemove::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(kb: &KeyboardMarkup) -> Vec<String> {
        kb.keyboard
            .iter()
            .flatten()
            .map(|button| button.text.clone())
            .collect()
    }

    #[test]
    fn budget_menu_has_the_three_actions() {
        let labels = labels(&render_budget_menu());
        for expected in [
            texts::BTN_ADD_INCOME,
            texts::BTN_ADD_EXPENSES,
            texts::BTN_SHOW_BALANCE,
        ] {
            assert!(labels.iter().any(|l| l == expected), "{expected}");
        }
    }

    #[test]
    fn unchanged_sends_no_markup() {
        assert!(markup(Keyboard::Unchanged).is_none());
        assert!(matches!(
            markup(Keyboard::Remove),
            Some(ReplyMarkup::KeyboardRemove(_))
        ));
    }
}
