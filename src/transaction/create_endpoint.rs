//! Defines the endpoint for creating a new transaction.

use axum::{
    Json,
    extract::State,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error, Session,
    db::lock_connection,
    extract::{JsonBody, PathParams},
    session::session_from_path,
    transaction::{
        Transaction, TransactionBuilder, TransactionKind, TransactionState,
        core::create_transaction,
    },
};

/// The request body for creating a transaction.
///
/// Every field is optional so that missing fields can be reported with
/// a helpful error message instead of a generic deserialization error.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TransactionForm {
    /// The amount of money spent or earned.
    #[serde(rename = "value")]
    pub amount: Option<f64>,
    /// Either "expense" or "income".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// A short name for the transaction.
    #[serde(rename = "name")]
    pub label: Option<String>,
    /// Optional details about the transaction.
    #[serde(rename = "description")]
    pub note: Option<String>,
    /// Optional emoji shown next to the transaction.
    #[serde(rename = "emoji")]
    pub icon: Option<String>,
    /// When the transaction happened as an RFC 3339 date-time.
    #[serde(
        rename = "datetime",
        default,
        with = "time::serde::rfc3339::option"
    )]
    pub occurred_at: Option<OffsetDateTime>,
}

impl TransactionForm {
    /// Check that the required fields are present and build a transaction for `session`'s user.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::MissingField] if the amount, type, name or date-time is missing,
    /// - or [Error::InvalidTransactionKind] if the type is not "expense" or "income".
    pub fn into_builder(self, session: &Session) -> Result<TransactionBuilder, Error> {
        let amount = self.amount.ok_or(Error::MissingField("value"))?;
        let kind: TransactionKind = self.kind.ok_or(Error::MissingField("type"))?.parse()?;
        let label = self.label.ok_or(Error::MissingField("name"))?;
        let occurred_at = self.occurred_at.ok_or(Error::MissingField("datetime"))?;

        Ok(
            Transaction::build(session, amount, kind, &label, occurred_at)
                .note(self.note)
                .icon(self.icon),
        )
    }
}

/// A route handler for creating a new transaction, responds with the stored transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    PathParams(username): PathParams<String>,
    JsonBody(form): JsonBody<TransactionForm>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let session = session_from_path(&username, &connection)?;

    let transaction = create_transaction(form.into_builder(&session)?, &connection)
        .inspect_err(|error| tracing::debug!("could not create transaction: {error}"))?;

    Ok(Json(transaction))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        Error, endpoints,
        endpoints::format_endpoint,
        test_utils::{create_test_user, get_test_connection},
        transaction::{
            Transaction, TransactionKind, TransactionState, create_transaction_endpoint,
            create_endpoint::TransactionForm,
        },
    };

    fn get_test_server() -> TestServer {
        let connection = get_test_connection();
        create_test_user("alice", &connection);
        let state = TransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    fn alices_transactions() -> String {
        format_endpoint(endpoints::TRANSACTIONS, &[("username", "alice")])
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let server = get_test_server();

        let response = server
            .post(&alices_transactions())
            .json(&json!({
                "value": 25.5,
                "type": "expense",
                "name": "Groceries",
                "description": "Weekly shop",
                "emoji": "🛒",
                "datetime": "2025-03-01T10:00:00-03:00",
            }))
            .await;

        response.assert_status_ok();
        let transaction = response.json::<Transaction>();
        assert_eq!(transaction.id, 1);
        assert_eq!(transaction.owner.as_ref(), "alice");
        assert_eq!(transaction.amount, 25.5);
        assert_eq!(transaction.kind, TransactionKind::Expense);
        assert_eq!(transaction.label, "Groceries");
        assert_eq!(transaction.note.as_deref(), Some("Weekly shop"));
        assert_eq!(transaction.icon.as_deref(), Some("🛒"));
        assert_eq!(transaction.occurred_at, datetime!(2025-03-01 13:00 UTC));
    }

    #[tokio::test]
    async fn create_fails_for_unknown_user() {
        let server = get_test_server();

        let response = server
            .post(&format_endpoint(endpoints::TRANSACTIONS, &[("username", "bob")]))
            .json(&json!({
                "value": 1.0,
                "type": "income",
                "name": "Gift",
                "datetime": "2025-03-01T10:00:00Z",
            }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_fails_on_unknown_kind() {
        let server = get_test_server();

        let response = server
            .post(&alices_transactions())
            .json(&json!({
                "value": 1.0,
                "type": "refund",
                "name": "Gift",
                "datetime": "2025-03-01T10:00:00Z",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_fails_on_missing_name() {
        let server = get_test_server();

        let response = server
            .post(&alices_transactions())
            .json(&json!({
                "value": 1.0,
                "type": "income",
                "datetime": "2025-03-01T10:00:00Z",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "name is required" }));
    }

    #[tokio::test]
    async fn create_fails_on_negative_amount() {
        let server = get_test_server();

        let response = server
            .post(&alices_transactions())
            .json(&json!({
                "value": -3.0,
                "type": "expense",
                "name": "Coffee",
                "datetime": "2025-03-01T10:00:00Z",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_fails_when_utc_date_time_is_out_of_range() {
        let server = get_test_server();

        let response = server
            .post(&alices_transactions())
            .json(&json!({
                "value": 1.0,
                "type": "expense",
                "name": "New Year's Eve",
                "datetime": "9999-12-31T23:00:00-02:00",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "datetime is out of range" }));
    }

    #[tokio::test]
    async fn create_fails_on_malformed_datetime() {
        let server = get_test_server();

        let response = server
            .post(&alices_transactions())
            .json(&json!({
                "value": 1.0,
                "type": "expense",
                "name": "Coffee",
                "datetime": "yesterday",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<serde_json::Value>()["error"].is_string());
    }

    #[test]
    fn form_requires_amount() {
        let connection = get_test_connection();
        let session = create_test_user("alice", &connection);
        let form = TransactionForm {
            kind: Some("expense".to_owned()),
            label: Some("Coffee".to_owned()),
            occurred_at: Some(datetime!(2025-03-01 10:00 UTC)),
            ..Default::default()
        };

        assert_eq!(
            form.into_builder(&session),
            Err(Error::MissingField("value"))
        );
    }
}
