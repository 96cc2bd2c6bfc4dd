//! Ledger engine.
//!
//! Keeps one row per user with the accumulated income and the three most
//! recently submitted expense slots, and derives balances from it.

use sea_orm::{
    ActiveValue, DatabaseConnection, EntityTrait, QueryOrder,
    sea_query::{Expr, OnConflict},
};

pub use amount::{Amount, format_money, round2};
pub use balance::{BalanceResult, compute_balance};
pub use error::EngineError;
pub use record::{ExpenseLine, ExpenseSet, LedgerRecord};
pub use retry::RetryPolicy;

mod amount;
mod balance;
mod error;
mod ledgers;
mod record;
mod retry;

type ResultEngine<T> = Result<T, EngineError>;

/// Persistent per-user ledger.
///
/// Every mutation is a single upsert statement, so concurrent calls for the
/// same user never lose updates.
#[derive(Clone, Debug)]
pub struct Ledger {
    database: DatabaseConnection,
    retry: RetryPolicy,
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    /// Creates an empty record for `user_id` if none exists.
    pub async fn ensure_user(&self, user_id: &str, display_name: &str) -> ResultEngine<()> {
        let model = new_row(user_id, display_name);
        self.retry
            .run("ensure_user", || {
                let model = model.clone();
                async move {
                    ledgers::Entity::insert(model)
                        .on_conflict(
                            OnConflict::column(ledgers::Column::UserId)
                                .do_nothing()
                                .to_owned(),
                        )
                        .exec_without_returning(&self.database)
                        .await
                }
            })
            .await?;
        Ok(())
    }

    /// Adds `delta` to the user's income, creating the record if absent.
    pub async fn add_income(
        &self,
        user_id: &str,
        display_name: &str,
        delta: Amount,
    ) -> ResultEngine<()> {
        let delta = delta.value();
        let mut model = new_row(user_id, display_name);
        model.income = ActiveValue::Set(delta);

        self.retry
            .run("add_income", || {
                let model = model.clone();
                async move {
                    ledgers::Entity::insert(model)
                        .on_conflict(
                            OnConflict::column(ledgers::Column::UserId)
                                .value(
                                    ledgers::Column::Income,
                                    Expr::col((ledgers::Entity, ledgers::Column::Income))
                                        .add(delta),
                                )
                                .update_column(ledgers::Column::DisplayName)
                                .to_owned(),
                        )
                        .exec_without_returning(&self.database)
                        .await
                }
            })
            .await?;

        tracing::info!("income +{delta} recorded for user {user_id}");
        Ok(())
    }

    /// Replaces the three expense slots, creating the record if absent.
    pub async fn set_expenses(
        &self,
        user_id: &str,
        display_name: &str,
        expenses: &ExpenseSet,
    ) -> ResultEngine<()> {
        let [first, second, third] = expenses;
        let mut model = new_row(user_id, display_name);
        model.category1 = ActiveValue::Set(first.category.clone());
        model.expenses1 = ActiveValue::Set(Some(first.amount));
        model.category2 = ActiveValue::Set(second.category.clone());
        model.expenses2 = ActiveValue::Set(Some(second.amount));
        model.category3 = ActiveValue::Set(third.category.clone());
        model.expenses3 = ActiveValue::Set(Some(third.amount));

        self.retry
            .run("set_expenses", || {
                let model = model.clone();
                async move {
                    ledgers::Entity::insert(model)
                        .on_conflict(
                            OnConflict::column(ledgers::Column::UserId)
                                .update_columns([
                                    ledgers::Column::DisplayName,
                                    ledgers::Column::Category1,
                                    ledgers::Column::Expenses1,
                                    ledgers::Column::Category2,
                                    ledgers::Column::Expenses2,
                                    ledgers::Column::Category3,
                                    ledgers::Column::Expenses3,
                                ])
                                .to_owned(),
                        )
                        .exec_without_returning(&self.database)
                        .await
                }
            })
            .await?;

        tracing::info!("expenses replaced for user {user_id}");
        Ok(())
    }

    /// Returns the user's record, or [`EngineError::AbsentRecord`] if the
    /// user never submitted anything.
    pub async fn record(&self, user_id: &str) -> ResultEngine<LedgerRecord> {
        let model = self
            .retry
            .run("record", || {
                ledgers::Entity::find_by_id(user_id.to_string()).one(&self.database)
            })
            .await?;

        model
            .map(LedgerRecord::from)
            .ok_or_else(|| EngineError::AbsentRecord(user_id.to_string()))
    }

    /// All records ordered by user id.
    pub async fn records(&self) -> ResultEngine<Vec<LedgerRecord>> {
        let models = self
            .retry
            .run("records", || {
                ledgers::Entity::find()
                    .order_by_asc(ledgers::Column::UserId)
                    .all(&self.database)
            })
            .await?;
        Ok(models.into_iter().map(LedgerRecord::from).collect())
    }
}

fn new_row(user_id: &str, display_name: &str) -> ledgers::ActiveModel {
    ledgers::ActiveModel {
        user_id: ActiveValue::Set(user_id.to_string()),
        display_name: ActiveValue::Set(display_name.to_string()),
        income: ActiveValue::Set(0.0),
        category1: ActiveValue::Set(None),
        expenses1: ActiveValue::Set(None),
        category2: ActiveValue::Set(None),
        expenses2: ActiveValue::Set(None),
        category3: ActiveValue::Set(None),
        expenses3: ActiveValue::Set(None),
    }
}

#[derive(Debug, Default)]
pub struct LedgerBuilder {
    database: Option<DatabaseConnection>,
    retry: RetryPolicy,
}

impl LedgerBuilder {
    /// Pass the database connection
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = Some(db);
        self
    }

    /// Retry policy for storage calls
    pub fn retry(mut self, retry: RetryPolicy) -> LedgerBuilder {
        self.retry = retry;
        self
    }

    /// Construct `Ledger`
    pub fn build(self) -> ResultEngine<Ledger> {
        let database = self
            .database
            .ok_or_else(|| EngineError::MissingConfig("database connection".to_string()))?;
        Ok(Ledger {
            database,
            retry: self.retry,
        })
    }
}
