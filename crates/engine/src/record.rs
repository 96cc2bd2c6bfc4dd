use serde::Serialize;

use crate::{Amount, ledgers};

/// One category/amount slot of an expense submission.
///
/// A skipped slot has no category and a zero amount.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExpenseLine {
    pub category: Option<String>,
    pub amount: f64,
}

impl ExpenseLine {
    pub fn new(category: impl Into<String>, amount: Amount) -> Self {
        Self {
            category: Some(category.into()),
            amount: amount.value(),
        }
    }

    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn is_skipped(&self) -> bool {
        self.category.is_none()
    }
}

/// The three expense slots written together by a completed expense flow.
pub type ExpenseSet = [ExpenseLine; 3];

/// Snapshot of a user's ledger row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LedgerRecord {
    pub user_id: String,
    pub display_name: String,
    pub income: f64,
    pub expenses: ExpenseSet,
}

impl From<ledgers::Model> for LedgerRecord {
    fn from(model: ledgers::Model) -> Self {
        let line = |category: Option<String>, amount: Option<f64>| ExpenseLine {
            category,
            amount: amount.unwrap_or(0.0),
        };

        Self {
            user_id: model.user_id,
            display_name: model.display_name,
            income: model.income,
            expenses: [
                line(model.category1, model.expenses1),
                line(model.category2, model.expenses2),
                line(model.category3, model.expenses3),
            ],
        }
    }
}
