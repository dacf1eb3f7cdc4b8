//! The statistics for a user's summary screen and the endpoint that serves them.

use axum::{
    Json,
    extract::State,
};
use serde::Serialize;

use crate::{
    Error, Transaction,
    db::lock_connection,
    extract::PathParams,
    session::session_from_path,
    stats::{Achievement, Gamification, Totals, aggregate, evaluate_achievements, gamify},
    transaction::{TransactionState, list_transactions},
};

/// Everything the client shows on the statistics screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// The income and expense totals.
    #[serde(flatten)]
    pub totals: Totals,
    /// Income minus expenses.
    pub balance: f64,
    /// Points, tier and leaderboard position.
    pub gamification: Gamification,
    /// The achievement catalog with each achievement's unlock state.
    pub achievements: Vec<Achievement>,
    /// How many of [Summary::achievements] are unlocked.
    pub unlocked_count: usize,
}

/// Compute the summary for `transactions`.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let totals = aggregate(transactions);
    let balance = totals.balance();
    let achievements = evaluate_achievements(transactions, balance);
    let unlocked_count = achievements
        .iter()
        .filter(|achievement| achievement.is_unlocked)
        .count();

    Summary {
        totals,
        balance,
        gamification: gamify(transactions),
        achievements,
        unlocked_count,
    }
}

/// A route handler for a user's summary.
pub async fn get_summary_endpoint(
    State(state): State<TransactionState>,
    PathParams(username): PathParams<String>,
) -> Result<Json<Summary>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let session = session_from_path(&username, &connection)?;
    let transactions = list_transactions(&session, &connection)?;

    Ok(Json(summarize(&transactions)))
}

#[cfg(test)]
mod summarize_tests {
    use crate::stats::{
        SavingsTier, summarize,
        test_utils::{expense, income},
    };

    #[test]
    fn empty_summary() {
        let summary = summarize(&[]);

        assert_eq!(summary.totals.total_income, 0.0);
        assert_eq!(summary.totals.total_expenses, 0.0);
        assert_eq!(summary.balance, 0.0);
        assert_eq!(summary.gamification.position, 1);
        assert_eq!(summary.achievements.len(), 4);
        assert_eq!(summary.unlocked_count, 0);
    }

    #[test]
    fn summary_combines_engines() {
        let summary = summarize(&[expense(40.0), income(100.0)]);

        assert_eq!(summary.balance, 60.0);
        assert_eq!(summary.gamification.points, 60.0);
        assert_eq!(summary.gamification.tier, Some(SavingsTier::Expert));
        assert_eq!(summary.unlocked_count, 2);
    }
}
