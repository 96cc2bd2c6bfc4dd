use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use engine::{EngineError, Ledger, RetryPolicy};
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, Statement};
use telegram_bot::{
    Conversation, FlowState, FormEngine, Keyboard, RateError, RateFetcher, Reply, SessionStore,
    Sender, TIPS, flow::Flow, texts,
};

struct StubRates(Option<(f64, f64)>);

#[async_trait]
impl RateFetcher for StubRates {
    async fn fetch_rate(&self, base: &str, quote: &str) -> Result<f64, RateError> {
        let missing = || RateError::MissingQuote {
            base: base.to_string(),
            quote: quote.to_string(),
        };
        let (usd, eur) = self.0.ok_or_else(missing)?;
        match base {
            "USD" => Ok(usd),
            "EUR" => Ok(eur),
            _ => Err(missing()),
        }
    }
}

/// Answers after a delay and remembers that it did.
#[derive(Default)]
struct SlowRates {
    answered: AtomicBool,
}

#[async_trait]
impl RateFetcher for SlowRates {
    async fn fetch_rate(&self, _base: &str, _quote: &str) -> Result<f64, RateError> {
        tokio::time::sleep(Duration::from_millis(150)).await;
        self.answered.store(true, Ordering::SeqCst);
        Ok(90.0)
    }
}

async fn conversation_with(rates: StubRates) -> (Conversation, sea_orm::DatabaseConnection) {
    let (ledger, db) = ledger().await;
    (Conversation::new(ledger, Arc::new(rates)), db)
}

async fn ledger() -> (Ledger, sea_orm::DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder()
        .database(db.clone())
        .retry(RetryPolicy::no_retry())
        .build()
        .unwrap();
    (ledger, db)
}

async fn conversation() -> Conversation {
    conversation_with(StubRates(Some((92.456, 100.5)))).await.0
}

fn anna() -> Sender {
    Sender {
        user_id: "1001".to_string(),
        display_name: "Anna K".to_string(),
    }
}

async fn say(conv: &Conversation, sender: &Sender, texts: &[&str]) -> Vec<Reply> {
    let mut replies = Vec::new();
    for text in texts {
        replies.push(conv.handle(sender, text).await);
    }
    replies
}

fn ledger_of(db: &sea_orm::DatabaseConnection) -> Ledger {
    Ledger::builder().database(db.clone()).build().unwrap()
}

#[tokio::test]
async fn income_then_expenses_then_balance() {
    let (conv, db) = conversation_with(StubRates(None)).await;
    let user = anna();

    let replies = say(&conv, &user, &["add income", "500"]).await;
    assert_eq!(replies[0].text, texts::INCOME_PROMPT);
    assert_eq!(replies[1].text, "Доход 500.00 добавлен.");

    let replies = say(
        &conv,
        &user,
        &["add expenses", "Food", "100", "Transport", "50", "пропустить"],
    )
    .await;
    assert_eq!(replies[0].text, texts::CATEGORY1_PROMPT);
    assert_eq!(replies[2].text, texts::CATEGORY2_PROMPT);
    assert_eq!(replies[2].keyboard, Keyboard::Skip);
    assert_eq!(replies[5].text, texts::EXPENSES_SAVED);
    assert_eq!(conv.sessions().get("1001").await.state, FlowState::Idle);

    let record = ledger_of(&db).record("1001").await.unwrap();
    assert_eq!(record.income, 500.0);
    assert_eq!(record.display_name, "Anna K");
    assert_eq!(record.expenses[0].category.as_deref(), Some("Food"));
    assert_eq!(record.expenses[0].amount, 100.0);
    assert_eq!(record.expenses[1].category.as_deref(), Some("Transport"));
    assert_eq!(record.expenses[1].amount, 50.0);
    assert_eq!(record.expenses[2].category, None);
    assert_eq!(record.expenses[2].amount, 0.0);

    let reply = conv.handle(&user, "show balance").await;
    assert_eq!(
        reply.text,
        "Ваш баланс: 350.00\nДоход: 500.00\nРасходы: 150.00"
    );
}

#[tokio::test]
async fn fresh_user_has_no_data() {
    let conv = conversation().await;
    let reply = conv.handle(&anna(), "Показать баланс").await;
    assert_eq!(reply.text, texts::NO_DATA);
}

#[tokio::test]
async fn income_is_additive() {
    let (conv, db) = conversation_with(StubRates(None)).await;
    let user = anna();
    say(&conv, &user, &["add income", "500", "add income", "300"]).await;

    let record = ledger_of(&db).record("1001").await.unwrap();
    assert_eq!(record.income, 800.0);
}

#[tokio::test]
async fn invalid_income_reprompts_without_mutation() {
    let (conv, db) = conversation_with(StubRates(None)).await;
    let user = anna();

    let replies = say(&conv, &user, &["add income", "abc", "   "]).await;
    assert_eq!(replies[1].text, texts::AMOUNT_REPROMPT);
    assert_eq!(replies[2].text, texts::AMOUNT_REPROMPT);
    assert_eq!(
        conv.sessions().get("1001").await.state,
        FlowState::AwaitingIncome
    );

    let err = ledger_of(&db).record("1001").await.unwrap_err();
    assert!(matches!(err, EngineError::AbsentRecord(_)));
}

#[tokio::test]
async fn second_expense_submission_overwrites_the_first() {
    let (conv, db) = conversation_with(StubRates(None)).await;
    let user = anna();

    say(
        &conv,
        &user,
        &["add expenses", "Food", "100", "Transport", "50", "Rent", "700"],
    )
    .await;
    say(&conv, &user, &["add expenses", "Books", "20", "skip", "skip"]).await;

    let record = ledger_of(&db).record("1001").await.unwrap();
    assert_eq!(record.expenses[0].category.as_deref(), Some("Books"));
    assert_eq!(record.expenses[0].amount, 20.0);
    assert!(record.expenses[1].is_skipped());
    assert_eq!(record.expenses[1].amount, 0.0);
    assert!(record.expenses[2].is_skipped());
    assert_eq!(record.expenses[2].amount, 0.0);
}

#[tokio::test]
async fn blank_category_keeps_state() {
    let conv = conversation().await;
    let user = anna();

    let replies = say(&conv, &user, &["add expenses", "  "]).await;
    assert_eq!(replies[1].text, texts::LABEL_REPROMPT);
    assert_eq!(conv.sessions().get("1001").await.state, FlowState::Category1);
}

#[tokio::test]
async fn numbers_without_a_flow_are_not_recorded() {
    let (conv, db) = conversation_with(StubRates(None)).await;
    let user = anna();

    let reply = conv.handle(&user, "250").await;
    assert_eq!(reply.text, texts::NO_ACTIVE_FLOW);
    let reply = conv.handle(&user, "пропустить").await;
    assert_eq!(reply.text, texts::NO_ACTIVE_FLOW);

    let err = ledger_of(&db).record("1001").await.unwrap_err();
    assert!(matches!(err, EngineError::AbsentRecord(_)));
}

#[tokio::test]
async fn unknown_text_shows_main_menu() {
    let conv = conversation().await;
    let reply = conv.handle(&anna(), "hello there").await;
    assert_eq!(reply.text, texts::UNKNOWN);
    assert_eq!(reply.keyboard, Keyboard::MainMenu);
}

#[tokio::test]
async fn abandoned_flow_blocks_menu_until_cancel() {
    let (conv, db) = conversation_with(StubRates(None)).await;
    let user = anna();

    say(&conv, &user, &["add expenses", "Food"]).await;
    // still inside the expense flow: the menu label is taken as an amount
    let reply = conv.handle(&user, "add income").await;
    assert_eq!(reply.text, texts::AMOUNT_REPROMPT);
    assert_eq!(conv.sessions().get("1001").await.state, FlowState::Expenses1);

    let reply = conv.handle(&user, "/cancel").await;
    assert_eq!(reply.text, texts::CANCELLED);
    assert_eq!(conv.sessions().get("1001").await.state, FlowState::Idle);

    say(&conv, &user, &["add income", "10"]).await;
    let record = ledger_of(&db).record("1001").await.unwrap();
    assert_eq!(record.income, 10.0);
    assert!(record.expenses.iter().all(|line| line.is_skipped()));
}

#[tokio::test]
async fn start_resets_the_session() {
    let conv = conversation().await;
    let user = anna();

    say(&conv, &user, &["add income"]).await;
    let reply = conv.handle(&user, "/start").await;
    assert_eq!(reply.text, texts::GREETING);
    assert_eq!(reply.keyboard, Keyboard::MainMenu);
    assert_eq!(conv.sessions().get("1001").await.state, FlowState::Idle);
}

#[tokio::test]
async fn storage_failure_keeps_flow_state_for_retry() {
    let (conv, db) = conversation_with(StubRates(None)).await;
    let user = anna();
    say(&conv, &user, &["add income"]).await;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "DROP TABLE ledgers".to_string(),
    ))
    .await
    .unwrap();

    let reply = conv.handle(&user, "500").await;
    assert_eq!(reply.text, texts::STORAGE_FAILURE);
    assert_eq!(
        conv.sessions().get("1001").await.state,
        FlowState::AwaitingIncome
    );
}

#[tokio::test]
async fn rates_reply_has_two_lines() {
    let conv = conversation().await;
    let reply = conv.handle(&anna(), "Курсы валют").await;
    assert_eq!(reply.text, "1 USD - 92.46 RUB\n1 EUR - 100.50 RUB");
}

#[tokio::test]
async fn rates_failure_is_a_fixed_message() {
    let (conv, _db) = conversation_with(StubRates(None)).await;
    let reply = conv.handle(&anna(), "currency rates").await;
    assert_eq!(reply.text, texts::RATES_FAILURE);
}

#[tokio::test]
async fn tips_come_from_the_list() {
    let conv = conversation().await;
    let reply = conv.handle(&anna(), "Советы по экономии").await;
    assert!(TIPS.contains(&reply.text.as_str()));
}

#[tokio::test]
async fn budget_menu_offers_the_sub_actions() {
    let conv = conversation().await;
    let reply = conv.handle(&anna(), "бюджет").await;
    assert_eq!(reply.text, texts::BUDGET_MENU);
    assert_eq!(reply.keyboard, Keyboard::BudgetMenu);
}

#[tokio::test]
async fn users_progress_independently() {
    let (conv, db) = conversation_with(StubRates(None)).await;
    let anna = anna();
    let boris = Sender {
        user_id: "2002".to_string(),
        display_name: "Boris".to_string(),
    };

    conv.handle(&anna, "add expenses").await;
    conv.handle(&boris, "add income").await;
    conv.handle(&anna, "Food").await;
    conv.handle(&boris, "42").await;

    assert_eq!(conv.sessions().get("1001").await.state, FlowState::Expenses1);
    assert_eq!(conv.sessions().get("2002").await.state, FlowState::Idle);

    let ledger = ledger_of(&db);
    assert_eq!(ledger.record("2002").await.unwrap().income, 42.0);
    assert!(ledger.record("1001").await.is_err());
}

#[tokio::test]
async fn same_user_messages_are_serialized() {
    let (conv, db) = conversation_with(StubRates(None)).await;
    let user = anna();

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..10 {
        let conv = conv.clone();
        let user = user.clone();
        tasks.spawn(async move {
            conv.handle(&user, "add income").await;
            conv.handle(&user, "5").await
        });
    }
    let deadline = Duration::from_secs(10);
    while let Some(result) = tokio::time::timeout(deadline, tasks.join_next())
        .await
        .unwrap()
    {
        result.unwrap();
    }

    let income = ledger_of(&db).record("1001").await.unwrap().income;
    assert!(income <= 50.0);
    assert_eq!(income % 5.0, 0.0);
    assert_eq!(conv.sessions().get("1001").await.state, FlowState::Idle);
}

#[tokio::test]
async fn huge_income_is_rejected() {
    let (conv, db) = conversation_with(StubRates(None)).await;
    let user = anna();

    let replies = say(&conv, &user, &["add income", "1e308", "1e13"]).await;
    assert_eq!(replies[1].text, texts::AMOUNT_REPROMPT);
    assert_eq!(replies[2].text, texts::AMOUNT_REPROMPT);
    assert!(ledger_of(&db).record("1001").await.is_err());

    say(&conv, &user, &["1e12", "add income", "1e12"]).await;
    let record = ledger_of(&db).record("1001").await.unwrap();
    assert_eq!(record.income, 2e12);
    let reply = conv.handle(&user, "show balance").await;
    assert!(reply.text.starts_with("Ваш баланс: 2000000000000.00"));
}

#[tokio::test]
async fn later_messages_wait_for_a_pending_rate_reply() {
    let (ledger, db) = ledger().await;
    let rates = Arc::new(SlowRates::default());
    let conv = Conversation::new(ledger, rates.clone());
    let user = anna();

    let pending = {
        let conv = conv.clone();
        let user = user.clone();
        tokio::spawn(async move { conv.handle(&user, "currency rates").await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;

    let replies = say(&conv, &user, &["add income", "5"]).await;
    assert!(rates.answered.load(Ordering::SeqCst));
    assert_eq!(replies[1].text, "Доход 5.00 добавлен.");

    let first = pending.await.unwrap();
    assert!(first.text.starts_with("1 USD - 90.00 RUB"));
    assert_eq!(ledger_of(&db).record("1001").await.unwrap().income, 5.0);
}

#[tokio::test]
async fn finished_conversations_leave_no_session_behind() {
    let conv = conversation().await;
    let user = anna();

    say(&conv, &user, &["/start", "tips", "add income"]).await;
    assert_eq!(conv.sessions().resident().await, 1);

    conv.handle(&user, "10").await;
    assert_eq!(conv.sessions().resident().await, 0);

    say(&conv, &user, &["add expenses", "Food", "/cancel"]).await;
    assert_eq!(conv.sessions().resident().await, 0);
}

#[tokio::test]
async fn begin_during_a_flow_is_refused() {
    let (ledger, _db) = ledger().await;
    let forms = FormEngine::new(ledger);
    let sessions = SessionStore::default();
    sessions.set_state("1001", FlowState::Expenses2).await;

    let mut session = sessions.lock("1001").await;
    let reply = forms.begin(&mut session, Flow::Income);
    assert_eq!(reply.text, texts::FLOW_BUSY);
    assert_eq!(session.state(), FlowState::Expenses2);
}
