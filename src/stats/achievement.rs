//! The fixed achievement catalog and its unlock conditions.

use serde::Serialize;

use crate::Transaction;

/// An achievement and whether the user has unlocked it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    /// The name of the achievement.
    pub title: &'static str,
    /// How to unlock the achievement.
    pub description: &'static str,
    /// An emoji shown next to the achievement.
    #[serde(rename = "emoji")]
    pub icon: &'static str,
    /// Whether the user meets the unlock condition.
    pub is_unlocked: bool,
}

struct CatalogEntry {
    title: &'static str,
    description: &'static str,
    icon: &'static str,
    unlocked: fn(usize, f64) -> bool,
}

const FINANCIAL_EXPERT_BALANCE: f64 = 1_000_000.0;

const CATALOG: [CatalogEntry; 4] = [
    CatalogEntry {
        title: "First Steps",
        description: "Record your first transaction",
        icon: "🌱",
        unlocked: |count, _| count >= 1,
    },
    CatalogEntry {
        title: "Saver",
        description: "Keep a positive balance",
        icon: "💰",
        unlocked: |_, balance| balance > 0.0,
    },
    CatalogEntry {
        title: "Organized",
        description: "Record 10 transactions",
        icon: "📊",
        unlocked: |count, _| count >= 10,
    },
    CatalogEntry {
        title: "Financial Expert",
        description: "Reach a balance of 1,000,000",
        icon: "🏆",
        unlocked: |_, balance| balance >= FINANCIAL_EXPERT_BALANCE,
    },
];

/// Check every achievement in the catalog against `transactions` and `balance`.
///
/// The achievements are always returned in the same order, locked ones included.
pub fn evaluate_achievements(transactions: &[Transaction], balance: f64) -> Vec<Achievement> {
    let count = transactions.len();

    CATALOG
        .iter()
        .map(|entry| Achievement {
            title: entry.title,
            description: entry.description,
            icon: entry.icon,
            is_unlocked: (entry.unlocked)(count, balance),
        })
        .collect()
}
