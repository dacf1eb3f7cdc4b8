//! Defines the endpoint for a user's spending analysis.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    analysis::{SYSTEM_INSTRUCTION, TextGenerator, build_prompt},
    db::lock_connection,
    extract::PathParams,
    session::session_from_path,
    transaction::list_transactions,
};

/// The state needed to analyse a user's spending.
#[derive(Debug, Clone)]
pub struct AnalysisState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The service that writes the analysis.
    pub text_generator: Arc<dyn TextGenerator>,
}

impl FromRef<AppState> for AnalysisState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            text_generator: state.text_generator.clone(),
        }
    }
}

/// The response body for [get_analysis_endpoint].
#[derive(Debug, Serialize, Deserialize)]
pub struct Analysis {
    /// The generated analysis.
    pub analysis: String,
}

/// A route handler that asks the text generator for an analysis of a user's transactions.
pub async fn get_analysis_endpoint(
    State(state): State<AnalysisState>,
    PathParams(username): PathParams<String>,
) -> Result<Json<Analysis>, Error> {
    // The lock must be released before waiting on the text generator.
    let prompt = {
        let connection = lock_connection(&state.db_connection)?;
        let session = session_from_path(&username, &connection)?;
        let transactions = list_transactions(&session, &connection)?;

        build_prompt(&transactions)?
    };

    let analysis = state
        .text_generator
        .generate(SYSTEM_INSTRUCTION, &prompt)
        .await?;

    Ok(Json(Analysis { analysis }))
}
