//! Sums a transaction list into income and expense totals.

use serde::{Deserialize, Serialize};

use crate::{Transaction, TransactionKind};

/// Income and expense totals over a list of transactions.
///
/// Both totals are sums of magnitudes and are never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expenses: f64,
}

impl Totals {
    /// Income minus expenses, negative when more was spent than earned.
    pub fn balance(&self) -> f64 {
        self.total_income - self.total_expenses
    }
}

/// Sum the income and expenses in `transactions`.
///
/// The absolute value of each amount is used, so a negative amount that made
/// it into storage still counts towards the total for its kind.
pub fn aggregate(transactions: &[Transaction]) -> Totals {
    transactions
        .iter()
        .fold(Totals::default(), |mut totals, transaction| {
            let amount = transaction.amount.abs();

            match transaction.kind {
                TransactionKind::Expense => totals.total_expenses += amount,
                TransactionKind::Income => totals.total_income += amount,
            }

            totals
        })
}
