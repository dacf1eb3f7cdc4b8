//! Cachín is a personal finance tracker for recording income and expenses.
//!
//! This library provides a JSON REST API for a mobile client. Besides storing
//! transactions, it turns a user's transaction history into a savings summary
//! with points, a motivational tier, a leaderboard position and achievements,
//! and can ask a language model for a written analysis of the user's spending.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod analysis;
mod app_state;
mod db;
mod endpoints;
mod extract;
mod logging;
mod routing;
mod session;
mod stats;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use analysis::{
    AnalysisConfig, ChatCompletionsClient, DEFAULT_ANALYSIS_MODEL, DEFAULT_ANALYSIS_URL,
    TextGenerator,
};
pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use session::Session;
pub use stats::{
    Achievement, Gamification, SavingsTier, Summary, Totals, aggregate, evaluate_achievements,
    gamify, summarize,
};
pub use transaction::{
    Transaction, TransactionBuilder, TransactionId, TransactionKind, create_transaction,
};
pub use user::{User, Username, create_user};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required field was missing from the request body.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The username does not satisfy the username format.
    ///
    /// Usernames are 3-20 characters long and only contain lowercase
    /// letters, digits and underscores.
    #[error("\"{0}\" is not a valid username")]
    InvalidUsername(String),

    /// The username is already taken by another user.
    #[error("the username \"{0}\" already exists")]
    DuplicateUsername(String),

    /// The username does not belong to a registered user.
    #[error("the user does not exist")]
    UnknownUser,

    /// An empty string was used as the name of a transaction.
    #[error("transaction name cannot be empty")]
    EmptyTransactionName,

    /// The amount of a transaction was negative or not a finite number.
    ///
    /// Amounts are stored as magnitudes, whether the money was spent or
    /// earned is recorded by the transaction kind.
    #[error("{0} is not a valid transaction amount")]
    InvalidAmount(f64),

    /// The transaction kind was neither "expense" nor "income".
    #[error("\"{0}\" is not a valid transaction type")]
    InvalidTransactionKind(String),

    /// The date-time of a transaction falls outside the supported range once converted to UTC.
    #[error("datetime is out of range")]
    InvalidDateTime,

    /// The request could not be parsed, e.g. a malformed JSON body or path parameter.
    #[error("{0}")]
    InvalidRequest(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a transaction that does not exist or belongs to
    /// another user.
    ///
    /// The two cases are indistinguishable to the client.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// The language model could not produce a spending analysis.
    ///
    /// The string describes the underlying failure and is passed on to the
    /// client as the error details.
    #[error("could not generate the analysis: {0}")]
    AnalysisFailed(String),

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::UnknownUser,
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            // Column conversions wrap our own validation errors, e.g. an
            // unknown transaction kind read back from the database.
            rusqlite::Error::FromSqlConversionFailure(column, sql_type, error) => {
                match error.downcast::<Error>() {
                    Ok(error) => *error,
                    Err(error) => {
                        tracing::error!("could not convert column {column}: {error}");
                        Error::SqlError(rusqlite::Error::FromSqlConversionFailure(
                            column, sql_type, error,
                        ))
                    }
                }
            }
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Error::MissingField(_)
            | Error::EmptyTransactionName
            | Error::InvalidAmount(_)
            | Error::InvalidTransactionKind(_)
            | Error::InvalidDateTime
            | Error::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            Error::InvalidUsername(_) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Invalid username. Use 3-20 characters, only letters, numbers and underscores allowed."
                }),
            ),
            Error::DuplicateUsername(_) => (
                StatusCode::CONFLICT,
                json!({ "error": "Username already exists" }),
            ),
            Error::UnknownUser => (
                StatusCode::NOT_FOUND,
                json!({ "error": "User not found" }),
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "The requested resource could not be found." }),
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Transaction not found or unauthorized" }),
            ),
            Error::AnalysisFailed(details) => {
                tracing::error!("Could not generate analysis: {details}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Could not generate the analysis", "details": details }),
                )
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Something went wrong" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
