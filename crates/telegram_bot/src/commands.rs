//! Slash commands

use teloxide::utils::command::BotCommands;

/// Commands that work in any state.
#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "Главное меню.")]
    Start,
    #[command(description = "Показать справку.")]
    Help,
    #[command(description = "Отменить текущий ввод.")]
    Cancel,
}

impl Command {
    /// Parses `/cmd` or `/cmd@botname`, ignoring anything after the first space.
    pub(crate) fn parse_text(text: &str) -> Option<Command> {
        let head = text.trim().split_whitespace().next()?;
        let name = head.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        match name.to_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "cancel" => Some(Command::Cancel),
            _ => None,
        }
    }
}
