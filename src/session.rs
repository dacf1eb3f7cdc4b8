//! Sessions tie requests to a registered user.
//!
//! There are no credentials in this app, logging in only checks that the
//! username is registered. What a [Session] adds is that store functions
//! scoped to a user take a session instead of a raw username, so a handler
//! must have checked the user exists before it can touch their data.

use axum::{Json, extract::State};
use rusqlite::Connection;
#[cfg(test)]
use serde::Deserialize;
use serde::Serialize;

use crate::{
    Error,
    db::lock_connection,
    extract::JsonBody,
    user::{User, UserState, Username, UsernameForm, user_exists},
};

/// Proof that a username belongs to a registered user.
///
/// Obtained through [Session::log_in] or by registering a new user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub struct Session {
    username: Username,
}

impl Session {
    /// Start a session for `username`.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::UnknownUser] if `username` is not registered,
    /// - or [Error::SqlError] if there is some other SQL error.
    pub fn log_in(username: Username, connection: &Connection) -> Result<Self, Error> {
        if user_exists(&username, connection)? {
            Ok(Self { username })
        } else {
            Err(Error::UnknownUser)
        }
    }

    /// The username of the user this session belongs to.
    pub fn username(&self) -> &Username {
        &self.username
    }
}

impl From<User> for Session {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
        }
    }
}

/// Start a session for a username taken from a request path.
///
/// Malformed usernames cannot be registered, so they are reported as [Error::UnknownUser].
pub(crate) fn session_from_path(
    raw_username: &str,
    connection: &Connection,
) -> Result<Session, Error> {
    let username = Username::new(raw_username).map_err(|_| Error::UnknownUser)?;

    Session::log_in(username, connection)
}

/// A route handler for logging in, responds with the session on success.
pub async fn log_in_endpoint(
    State(state): State<UserState>,
    JsonBody(form): JsonBody<UsernameForm>,
) -> Result<Json<Session>, Error> {
    let username = form.username()?;

    let connection = lock_connection(&state.db_connection)?;
    let session = Session::log_in(username, &connection)?;

    tracing::debug!("Started session for {}", session.username());

    Ok(Json(session))
}
