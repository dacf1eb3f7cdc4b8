//! Savings statistics derived from a user's transactions.
//!
//! Everything here is a pure function of a transaction list. Nothing is
//! stored, the statistics are recomputed for every request:
//! - [aggregate] sums income and expenses,
//! - [gamify] turns the savings percentage into points, a tier and a leaderboard position,
//! - [evaluate_achievements] checks the fixed achievement catalog,
//! - [summarize] bundles all of the above for the summary endpoint.

mod achievement;
mod aggregation;
mod gamification;
mod ladder;
mod summary;

pub use achievement::{Achievement, evaluate_achievements};
pub use aggregation::{Totals, aggregate};
pub use gamification::{Gamification, SavingsTier, gamify};
pub use summary::{Summary, get_summary_endpoint, summarize};

#[cfg(test)]
mod test_utils {
    use time::macros::datetime;

    use crate::{Transaction, TransactionKind, Username};

    /// Create an unsaved transaction for testing the pure statistics functions.
    pub(super) fn transaction(kind: TransactionKind, amount: f64) -> Transaction {
        Transaction {
            id: 0,
            owner: Username::new_unchecked("alice"),
            amount,
            kind,
            label: "Test".to_owned(),
            note: None,
            icon: None,
            occurred_at: datetime!(2025-01-01 0:00 UTC),
        }
    }

    pub(super) fn expense(amount: f64) -> Transaction {
        transaction(TransactionKind::Expense, amount)
    }

    pub(super) fn income(amount: f64) -> Transaction {
        transaction(TransactionKind::Income, amount)
    }
}
