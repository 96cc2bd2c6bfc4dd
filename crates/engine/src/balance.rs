//! Balance derived from a ledger snapshot. Nothing here is stored.

use std::fmt;

use crate::{LedgerRecord, amount::format_money};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BalanceResult {
    pub income: f64,
    pub total_expenses: f64,
    pub balance: f64,
}

/// `total_expenses = e1 + e2 + e3`, `balance = income - total_expenses`.
#[must_use]
pub fn compute_balance(record: &LedgerRecord) -> BalanceResult {
    let total_expenses: f64 = record.expenses.iter().map(|line| line.amount).sum();
    BalanceResult {
        income: record.income,
        total_expenses,
        balance: record.income - total_expenses,
    }
}

impl fmt::Display for BalanceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "balance {} (income {}, expenses {})",
            format_money(self.balance),
            format_money(self.income),
            format_money(self.total_expenses)
        )
    }
}
