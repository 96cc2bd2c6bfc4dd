use std::{sync::Arc, time::Duration};

use engine::{Ledger, RetryPolicy};
use migration::{Migrator, MigratorTrait};
use settings::Database;
use telegram_bot::HttpRateFetcher;
use teloxide::types::UserId;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "finpal={level},telegram_bot={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let Some(telegram) = settings.telegram else {
        tracing::error!("missing [telegram] settings, nothing to run");
        return Ok(());
    };

    // Storage problems at startup are the only fatal errors.
    let db = parse_database(&settings.database).await?;
    let retry = RetryPolicy::default()
        .with_attempts(settings.storage.attempts)
        .with_delay(Duration::from_millis(settings.storage.delay_ms));
    let ledger = Ledger::builder().database(db).retry(retry).build()?;

    let rates = HttpRateFetcher::new(
        &settings.rates.url,
        Duration::from_secs(settings.rates.timeout_secs),
    )?;

    tracing::info!("Found telegram settings...");
    let bot = telegram_bot::Bot::builder()
        .token(&telegram.token)
        .allowed_users(telegram.allowed_users.into_iter().map(UserId).collect())
        .ledger(ledger)
        .rates(Arc::new(rates))
        .build()?;
    bot.run().await;

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
