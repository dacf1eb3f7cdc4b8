//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, TextGenerator, db::initialize};

/// The state of the REST server.
///
/// Each feature extracts the parts it needs through its own state type, e.g.
/// `UserState`, which implement `FromRef<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The service that writes spending analyses.
    pub text_generator: Arc<dyn TextGenerator>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        text_generator: Arc<dyn TextGenerator>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            text_generator,
        })
    }
}
