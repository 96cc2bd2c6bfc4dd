/// Keyboard to attach to a reply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Keyboard {
    /// Leave whatever keyboard the user currently sees.
    #[default]
    Unchanged,
    MainMenu,
    BudgetMenu,
    /// Single "skip" button, shown at the optional category steps.
    Skip,
    Remove,
}

/// Transport-independent answer to one incoming message.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Keyboard,
}

impl Reply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::Unchanged,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = keyboard;
        self
    }
}
