//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::{Error, Session, user::Username};

// ============================================================================
// MODELS
// ============================================================================

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = i64;

/// Whether money was spent or earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money was spent.
    Expense,
    /// Money was earned.
    Income,
}

impl TransactionKind {
    /// The name of the kind as used in the database and the JSON API.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(TransactionKind::Expense),
            "income" => Ok(TransactionKind::Income),
            other => Err(Error::InvalidTransactionKind(other.to_owned())),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The JSON field names are the ones used by the mobile client.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user the transaction belongs to.
    #[serde(rename = "username")]
    pub owner: Username,
    /// The amount of money spent or earned, always stored as a magnitude.
    #[serde(rename = "value")]
    pub amount: f64,
    /// Whether the money was spent or earned.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// A short name for the transaction, e.g. "Lunch".
    #[serde(rename = "name")]
    pub label: String,
    /// Optional details about the transaction.
    #[serde(rename = "description")]
    pub note: Option<String>,
    /// Optional emoji shown next to the transaction.
    #[serde(rename = "emoji")]
    pub icon: Option<String>,
    /// When the transaction happened, in UTC.
    #[serde(rename = "datetime", with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        owner: &Session,
        amount: f64,
        kind: TransactionKind,
        label: &str,
        occurred_at: OffsetDateTime,
    ) -> TransactionBuilder {
        TransactionBuilder {
            owner: owner.username().clone(),
            amount,
            kind,
            label: label.to_owned(),
            note: None,
            icon: None,
            occurred_at,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Optional fields default to `None`, pass the finished builder to
/// [create_transaction] to store it.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The user the transaction belongs to.
    pub owner: Username,

    /// The amount of money spent or earned.
    ///
    /// Must be a finite, non-negative number. The sign is given by `kind`.
    pub amount: f64,

    /// Whether the money was spent or earned.
    pub kind: TransactionKind,

    /// A short name for the transaction.
    ///
    /// Must contain at least one non-whitespace character.
    pub label: String,

    /// Optional details about the transaction.
    pub note: Option<String>,

    /// Optional emoji shown next to the transaction.
    pub icon: Option<String>,

    /// When the transaction happened.
    ///
    /// Converted to UTC when stored so that stored timestamps sort
    /// chronologically.
    pub occurred_at: OffsetDateTime,
}

impl TransactionBuilder {
    /// Set the note for the transaction, blank notes are stored as `None`.
    pub fn note(mut self, note: Option<String>) -> Self {
        self.note = note.filter(|note| !note.trim().is_empty());
        self
    }

    /// Set the icon for the transaction, blank icons are stored as `None`.
    pub fn icon(mut self, icon: Option<String>) -> Self {
        self.icon = icon.filter(|icon| !icon.trim().is_empty());
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyTransactionName] if the label is blank,
/// - or [Error::InvalidAmount] if the amount is negative or not finite,
/// - or [Error::InvalidDateTime] if the date-time cannot be represented in UTC,
/// - or [Error::UnknownUser] if the owner is not a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let label = builder.label.trim();

    if label.is_empty() {
        return Err(Error::EmptyTransactionName);
    }

    if !builder.amount.is_finite() || builder.amount < 0.0 {
        return Err(Error::InvalidAmount(builder.amount));
    }

    let occurred_at = builder
        .occurred_at
        .checked_to_offset(UtcOffset::UTC)
        .ok_or(Error::InvalidDateTime)?;

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (username, amount, kind, label, note, icon, occurred_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, username, amount, kind, label, note, icon, occurred_at",
        )?
        .query_row(
            (
                builder.owner.as_ref(),
                builder.amount,
                builder.kind,
                label,
                builder.note,
                builder.icon,
                occurred_at,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get the transactions of the session's user, most recent first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn list_transactions(
    session: &Session,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, username, amount, kind, label, note, icon, occurred_at
             FROM \"transaction\"
             WHERE username = :username
             ORDER BY occurred_at DESC, id DESC",
        )?
        .query_map(
            &[(":username", session.username().as_ref())],
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Delete the transaction `id` if it belongs to the session's user.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if there is no transaction with `id`
///   owned by the session's user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    session: &Session,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id AND username = :username",
        rusqlite::named_params! {
            ":id": id,
            ":username": session.username().as_ref(),
        },
    )?;

    if rows_affected == 0 {
        Err(Error::DeleteMissingTransaction)
    } else {
        Ok(())
    }
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                amount REAL NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('expense', 'income')),
                label TEXT NOT NULL,
                note TEXT,
                icon TEXT,
                occurred_at TEXT NOT NULL,
                FOREIGN KEY(username) REFERENCES user(username) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Index used when listing a user's transactions.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_username_occurred_at
         ON \"transaction\"(username, occurred_at);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_owner: String = row.get(1)?;
    let amount = row.get(2)?;
    let kind = row.get(3)?;
    let label = row.get(4)?;
    let note = row.get(5)?;
    let icon = row.get(6)?;
    let occurred_at = row.get(7)?;

    Ok(Transaction {
        id,
        owner: Username::new_unchecked(&raw_owner),
        amount,
        kind,
        label,
        note,
        icon,
        occurred_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================
