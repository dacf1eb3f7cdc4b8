#![allow(missing_docs)]

pub(crate) mod http;

pub(crate) use http::parse_json;
use rusqlite::Connection;

use crate::{Session, db::initialize, user::Username};

/// An in-memory database with the tables created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");

    connection
}

/// Register `username` and return a session for them.
pub(crate) fn create_test_user(username: &str, connection: &Connection) -> Session {
    let user = crate::create_user(Username::new_unchecked(username), connection)
        .expect("Could not create test user.");

    Session::from(user)
}
