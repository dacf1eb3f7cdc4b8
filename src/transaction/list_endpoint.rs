//! Defines the endpoint for listing a user's transactions.

use axum::{
    Json,
    extract::State,
};

use crate::{
    Error,
    db::lock_connection,
    extract::PathParams,
    session::session_from_path,
    transaction::{Transaction, TransactionState, core::list_transactions},
};

/// A route handler for listing a user's transactions, most recent first.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    PathParams(username): PathParams<String>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let session = session_from_path(&username, &connection)?;

    list_transactions(&session, &connection).map(Json)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use time::macros::datetime;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{create_test_user, get_test_connection},
        transaction::{
            Transaction, TransactionKind, TransactionState, create_transaction,
            list_transactions_endpoint,
        },
    };

    fn get_test_server() -> TestServer {
        let connection = get_test_connection();
        let session = create_test_user("alice", &connection);
        for (kind, label, occurred_at) in [
            (TransactionKind::Expense, "Rent", datetime!(2025-02-01 09:00 UTC)),
            (TransactionKind::Income, "Salary", datetime!(2025-02-15 09:00 UTC)),
        ] {
            create_transaction(
                Transaction::build(&session, 100.0, kind, label, occurred_at),
                &connection,
            )
            .unwrap();
        }
        create_test_user("bob", &connection);

        let state = TransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route(endpoints::TRANSACTIONS, get(list_transactions_endpoint))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn lists_transactions_newest_first() {
        let server = get_test_server();

        let response = server
            .get(&format_endpoint(endpoints::TRANSACTIONS, &[("username", "Alice")]))
            .await;

        response.assert_status_ok();
        let labels: Vec<String> = response
            .json::<Vec<Transaction>>()
            .into_iter()
            .map(|transaction| transaction.label)
            .collect();
        assert_eq!(labels, ["Salary", "Rent"].map(String::from));
    }

    #[tokio::test]
    async fn lists_nothing_for_user_without_transactions() {
        let server = get_test_server();

        let response = server
            .get(&format_endpoint(endpoints::TRANSACTIONS, &[("username", "bob")]))
            .await;

        response.assert_status_ok();
        assert!(response.json::<Vec<Transaction>>().is_empty());
    }

    #[tokio::test]
    async fn list_fails_for_unknown_user() {
        let server = get_test_server();

        let response = server
            .get(&format_endpoint(endpoints::TRANSACTIONS, &[("username", "carol")]))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
