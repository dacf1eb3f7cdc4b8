//! Application router configuration.

use std::time::Duration;

use axum::{
    Router,
    http::{
        HeaderName, Method,
        header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE},
    },
    routing::{delete, get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::{
    AppState, Error,
    analysis::get_analysis_endpoint,
    endpoints,
    session::log_in_endpoint,
    stats::get_summary_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, list_transactions_endpoint,
    },
    user::{get_user_exists_endpoint, register_user_endpoint},
};

/// How long browsers may cache the response to a CORS preflight request.
const CORS_MAX_AGE: Duration = Duration::from_secs(86400);

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::USERS, post(register_user_endpoint))
        .route(endpoints::USER, get(get_user_exists_endpoint))
        .route(endpoints::LOG_IN, post(log_in_endpoint))
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .route(endpoints::ANALYSIS, get(get_analysis_endpoint))
        .fallback(get_404_not_found)
        .layer(cors_layer())
        .with_state(state)
}

/// Allow requests from any origin, e.g. the mobile client during development.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([CONTENT_LENGTH, HeaderName::from_static("x-requested-with")])
        .max_age(CORS_MAX_AGE)
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
