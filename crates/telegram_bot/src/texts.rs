//! User-facing strings.

use engine::{Amount, BalanceResult, format_money};

pub const BTN_RATES: &str = "Курсы валют";
pub const BTN_TIPS: &str = "Советы по экономии";
pub const BTN_BUDGET: &str = "Бюджет";
pub const BTN_ADD_INCOME: &str = "Добавить доход";
pub const BTN_ADD_EXPENSES: &str = "Добавить расходы";
pub const BTN_SHOW_BALANCE: &str = "Показать баланс";
pub const BTN_BACK: &str = "Назад";
pub const BTN_SKIP: &str = "Пропустить";

pub const GREETING: &str = "Привет! Я — твой Финансовый помощник. Я помогу тебе следить за курсами валют, вести финансовые отчеты и планировать бюджет.";
pub const MAIN_MENU: &str = "Выберите раздел в меню.";
pub const BUDGET_MENU: &str = "Бюджет: добавьте доход, расходы или посмотрите баланс.";
pub const UNKNOWN: &str = "Не понимаю эту команду. Выберите действие в меню или отправьте /help.";
pub const TEXT_ONLY: &str = "Я понимаю только текстовые сообщения.";
pub const CANCELLED: &str = "Ввод отменён, ничего не сохранено.";

pub const INCOME_PROMPT: &str = "Введите сумму дохода:";
pub const AMOUNT_REPROMPT: &str = "Сумма должна быть неотрицательным числом, например 1500 или 99.90. Попробуйте ещё раз:";
pub const CATEGORY1_PROMPT: &str = "Введите категорию первой траты:";
pub const CATEGORY2_PROMPT: &str = "Введите вторую категорию или нажмите «Пропустить»:";
pub const CATEGORY3_PROMPT: &str = "Введите третью категорию или нажмите «Пропустить»:";
pub const LABEL_REPROMPT: &str = "Категория не может быть пустой. Попробуйте ещё раз:";
pub const EXPENSES_SAVED: &str = "Расходы успешно сохранены!";

pub const NO_ACTIVE_FLOW: &str = "Чтобы записать сумму, сначала выберите «Добавить доход» или «Добавить расходы» в разделе «Бюджет».";
pub const FLOW_BUSY: &str = "Сначала завершите текущий ввод или отправьте /cancel.";
pub const NO_DATA: &str = "Данных пока нет. Добавьте доход или расходы в разделе «Бюджет».";
pub const STORAGE_FAILURE: &str = "Не удалось сохранить данные. Отправьте то же сообщение ещё раз чуть позже.";
pub const RATES_FAILURE: &str = "Не удалось получить курсы валют. Попробуйте позже.";
pub const LOAD_FAILURE: &str = "Не удалось загрузить данные. Попробуйте позже.";

pub fn help_text() -> String {
    format!(
        "{GREETING}\n\nРазделы меню:\n• {BTN_RATES} — курсы USD и EUR к рублю\n• {BTN_TIPS} — случайный совет\n• {BTN_BUDGET} — доходы, расходы и баланс\n\nКоманды:\n/start — главное меню\n/help — эта справка\n/cancel — отменить текущий ввод"
    )
}

pub fn income_added(amount: Amount) -> String {
    format!("Доход {amount} добавлен.")
}

pub fn expenses_prompt(category: &str) -> String {
    format!("Сколько потрачено на «{category}»?")
}

pub fn balance(result: &BalanceResult) -> String {
    format!(
        "Ваш баланс: {}\nДоход: {}\nРасходы: {}",
        format_money(result.balance),
        format_money(result.income),
        format_money(result.total_expenses)
    )
}
