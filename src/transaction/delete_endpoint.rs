//! Defines the endpoint for deleting a transaction.

use axum::{
    Json,
    extract::State,
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    db::lock_connection,
    extract::PathParams,
    session::session_from_path,
    transaction::{TransactionId, TransactionState, delete_transaction},
};

/// The response body for a successful deletion.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// A confirmation message for the client.
    pub message: String,
}

/// A route handler for deleting one of a user's transactions.
///
/// Unknown users get the same 404 response as a missing or foreign transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    PathParams((username, transaction_id)): PathParams<(String, TransactionId)>,
) -> Result<Json<DeleteResponse>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let session = session_from_path(&username, &connection).map_err(|error| match error {
        Error::UnknownUser => Error::DeleteMissingTransaction,
        error => error,
    })?;

    delete_transaction(transaction_id, &session, &connection)?;
    tracing::info!("Deleted transaction {transaction_id} for {}", session.username());

    Ok(Json(DeleteResponse {
        message: "Transaction deleted successfully".to_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::delete};
    use axum_test::TestServer;
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        Session, Username,
        endpoints::{self, format_endpoint},
        test_utils::{create_test_user, get_test_connection},
        transaction::{
            Transaction, TransactionKind, TransactionState, create_transaction,
            delete_endpoint::DeleteResponse, delete_transaction_endpoint, list_transactions,
        },
    };

    fn get_test_server() -> (TestServer, TransactionState) {
        let connection = get_test_connection();
        let session = create_test_user("alice", &connection);
        create_transaction(
            Transaction::build(
                &session,
                4.5,
                TransactionKind::Expense,
                "Coffee",
                datetime!(2025-02-01 09:00 UTC),
            ),
            &connection,
        )
        .unwrap();
        create_test_user("bob", &connection);

        let state = TransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
            .with_state(state.clone());

        let server = TestServer::new(app).expect("Could not create test server.");

        (server, state)
    }

    fn transaction_endpoint(username: &str, transaction_id: &str) -> String {
        format_endpoint(
            endpoints::TRANSACTION,
            &[("username", username), ("transaction_id", transaction_id)],
        )
    }

    #[tokio::test]
    async fn owner_can_delete_transaction() {
        let (server, state) = get_test_server();

        let response = server.delete(&transaction_endpoint("alice", "1")).await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<DeleteResponse>().message,
            "Transaction deleted successfully"
        );
        let connection = state.db_connection.lock().unwrap();
        let session = Session::log_in(Username::new_unchecked("alice"), &connection).unwrap();
        assert!(list_transactions(&session, &connection).unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_user_cannot_delete_transaction() {
        let (server, _) = get_test_server();

        let response = server.delete(&transaction_endpoint("bob", "1")).await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({ "error": "Transaction not found or unauthorized" }));
    }

    #[tokio::test]
    async fn missing_transaction_and_unknown_user_look_the_same() {
        let (server, _) = get_test_server();

        let missing = server.delete(&transaction_endpoint("alice", "42")).await;
        let unknown_user = server.delete(&transaction_endpoint("mallory", "1")).await;

        missing.assert_status(StatusCode::NOT_FOUND);
        unknown_user.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(missing.text(), unknown_user.text());
    }
}
