//! Builds the prompt for the spending analysis.

use serde::Serialize;
use time::OffsetDateTime;

use crate::{Error, Transaction, TransactionKind};

/// Describes the assistant persona to the language model.
pub const SYSTEM_INSTRUCTION: &str = "You are Cachín, a friendly and modern financial assistant that \
helps young people manage their money better. Your goal is to analyse spending patterns, identify \
areas for improvement and give personalised advice based on their specific habits. Use a casual, fun \
and empathetic tone with emojis, while keeping your financial recommendations professional. Focus on \
finding consumption patterns and suggesting realistic, achievable changes.";

const PREAMBLE: &str = "Hi! 👋 I'm your financial assistant from Cachín, the app that helps you keep \
track of your finances while having fun.

I'll analyse your transactions to give you a personalised report. It will include:

🔍 A detailed analysis of your spending patterns
💰 How your income and expenses are distributed
📊 The categories where you spend the most
🚩 Recurring expenses or patterns to keep an eye on
💡 Specific tips based on your spending habits
🎯 Recommendations to improve your financial health
🌟 Saving opportunities based on your expenses

I'll use casual language and emojis to make it more fun! I won't use markdown.

Here are your transactions to analyse: ";

/// The parts of a transaction that are shared with the language model.
#[derive(Debug, Serialize)]
struct PromptTransaction<'a> {
    amount: f64,
    category: TransactionKind,
    description: Option<&'a str>,
    #[serde(with = "time::serde::rfc3339")]
    datetime: OffsetDateTime,
}

impl<'a> From<&'a Transaction> for PromptTransaction<'a> {
    fn from(transaction: &'a Transaction) -> Self {
        Self {
            amount: transaction.amount,
            category: transaction.kind,
            description: transaction.note.as_deref(),
            datetime: transaction.occurred_at,
        }
    }
}

/// Build the user prompt asking for an analysis of `transactions`.
///
/// The transactions are embedded as pretty-printed JSON in the order given.
///
/// # Errors
///
/// Returns an [Error::JSONSerializationError] if the transactions could not be serialized.
pub fn build_prompt(transactions: &[Transaction]) -> Result<String, Error> {
    let transactions: Vec<PromptTransaction> =
        transactions.iter().map(PromptTransaction::from).collect();

    let json = serde_json::to_string_pretty(&transactions)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(format!("{PREAMBLE}{json}"))
}
