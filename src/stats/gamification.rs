//! Turns a user's savings into points, a motivational tier and a leaderboard position.
//!
//! The tier and the position use different comparisons at their thresholds:
//! tiers admit scores at or above a threshold while positions need scores
//! strictly above it. A user with exactly 50 points is an expert but is
//! ranked second.

use serde::Serialize;

use crate::{
    Transaction,
    stats::{
        aggregate,
        ladder::{Bound, Ladder},
    },
};

/// Progress towards the next milestone restarts every this many points.
const POINTS_PER_MILESTONE: f64 = 10.0;

/// A motivational bucket chosen from a user's points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SavingsTier {
    /// 50 points or more.
    Expert,
    /// 30 points or more.
    Excellent,
    /// 20 points or more.
    DoingGreat,
    /// 10 points or more.
    GoodStart,
    /// More than zero points.
    KeepGoing,
    /// No points.
    StartSaving,
}

impl SavingsTier {
    /// The message shown to the user for this tier.
    pub fn message(&self) -> &'static str {
        match self {
            SavingsTier::Expert => "Financial expert! 🌟",
            SavingsTier::Excellent => "Excellent saving! 🚀",
            SavingsTier::DoingGreat => "You're doing great! 💪",
            SavingsTier::GoodStart => "Good start! 🌱",
            SavingsTier::KeepGoing => "Keep it up! 👊",
            SavingsTier::StartSaving => "Start saving! 💫",
        }
    }
}

const TIER_LADDER: Ladder<SavingsTier> = Ladder::new(
    &[
        (Bound::AtLeast(50.0), SavingsTier::Expert),
        (Bound::AtLeast(30.0), SavingsTier::Excellent),
        (Bound::AtLeast(20.0), SavingsTier::DoingGreat),
        (Bound::AtLeast(10.0), SavingsTier::GoodStart),
        (Bound::Above(0.0), SavingsTier::KeepGoing),
    ],
    SavingsTier::StartSaving,
);

const POSITION_LADDER: Ladder<u32> = Ladder::new(
    &[
        (Bound::Above(50.0), 1),
        (Bound::Above(30.0), 2),
        (Bound::Above(20.0), 3),
        (Bound::Above(10.0), 8),
    ],
    15,
);

/// The share of income that was not spent, as a percentage.
///
/// Zero when there is no income. Negative when expenses exceed income.
pub(crate) fn savings_percentage(total_income: f64, total_expenses: f64) -> f64 {
    if total_income > 0.0 {
        (total_income - total_expenses) / total_income * 100.0
    } else {
        0.0
    }
}

/// Round `savings_percentage` to two decimal places and clamp it to zero.
///
/// Halfway cases round away from zero, which for the non-negative values
/// that survive the clamp is round half up.
pub(crate) fn round_points(savings_percentage: f64) -> f64 {
    let rounded = (savings_percentage * 100.0).round() / 100.0;

    // Also maps -0.0 and NaN to 0.0.
    if rounded > 0.0 { rounded } else { 0.0 }
}

/// The motivational tier for `points`.
pub(crate) fn tier_for(points: f64) -> SavingsTier {
    TIER_LADDER.find(points)
}

/// The leaderboard position for `points`, where 1 is the best.
pub(crate) fn leaderboard_position(points: f64) -> u32 {
    POSITION_LADDER.find(points)
}

/// A snapshot of a user's progress, recomputed from their transactions on every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gamification {
    /// The rounded savings percentage, never negative.
    pub points: f64,
    /// The motivational tier, absent when the user has no transactions.
    pub tier: Option<SavingsTier>,
    /// The message for [Gamification::tier].
    pub message: Option<&'static str>,
    /// The progress towards the next multiple of ten points, in `[0, 1)`.
    pub progress_fraction: f64,
    /// The user's rank on the leaderboard.
    pub position: u32,
}

impl Gamification {
    /// The snapshot for a user who has not recorded any transactions.
    pub fn baseline() -> Self {
        Self {
            points: 0.0,
            tier: None,
            message: None,
            progress_fraction: 0.0,
            position: 1,
        }
    }

    fn from_points(points: f64) -> Self {
        let tier = tier_for(points);

        Self {
            points,
            tier: Some(tier),
            message: Some(tier.message()),
            progress_fraction: (points % POINTS_PER_MILESTONE) / POINTS_PER_MILESTONE,
            position: leaderboard_position(points),
        }
    }
}

/// Compute the gamification snapshot for `transactions`.
pub fn gamify(transactions: &[Transaction]) -> Gamification {
    if transactions.is_empty() {
        return Gamification::baseline();
    }

    let totals = aggregate(transactions);
    let percentage = savings_percentage(totals.total_income, totals.total_expenses);

    Gamification::from_points(round_points(percentage))
}
