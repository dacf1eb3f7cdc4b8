//! Usernames, the user table and the endpoints for registering and looking up users.

use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, Session,
    db::lock_connection,
    extract::{JsonBody, PathParams},
};

const USERNAME_MIN_LENGTH: usize = 3;
const USERNAME_MAX_LENGTH: usize = 20;

/// A validated username.
///
/// Usernames are trimmed and lowercased, 3-20 characters long, and only
/// contain ASCII lowercase letters, digits and underscores.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Normalise and validate a username.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidUsername] if `raw` does
    /// not satisfy the username format after trimming and lowercasing.
    pub fn new(raw: &str) -> Result<Self, Error> {
        let username = raw.trim().to_lowercase();

        let length_is_valid =
            (USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&username.chars().count());
        let characters_are_valid = username
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

        if length_is_valid && characters_are_valid {
            Ok(Self(username))
        } else {
            Err(Error::InvalidUsername(raw.to_owned()))
        }
    }

    /// Create a username without validation.
    ///
    /// The caller should ensure that the string satisfies the username format.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the format
    /// invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(username: &str) -> Self {
        Self(username.to_owned())
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Username::new(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// A user of the application.
///
/// Users are identified by their username alone, there is no credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The user's unique username.
    pub username: Username,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                username TEXT PRIMARY KEY NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// This function will return a:
/// - [Error::DuplicateUsername] if the username is already taken,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(username: Username, connection: &Connection) -> Result<User, Error> {
    connection
        .execute("INSERT INTO user (username) VALUES (?1)", (username.as_ref(),))
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code:
                        rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                        | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateUsername(username.to_string()),
            error => error.into(),
        })?;

    Ok(User { username })
}

/// Check whether `username` belongs to a registered user.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn user_exists(username: &Username, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM user WHERE username = ?1)",
            (username.as_ref(),),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// The state needed to register and look up users.
#[derive(Debug, Clone)]
pub struct UserState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for endpoints that take a username.
#[derive(Debug, Serialize, Deserialize)]
pub struct UsernameForm {
    /// The raw username as typed by the user.
    #[serde(default)]
    pub username: Option<String>,
}

impl UsernameForm {
    /// Validate the username in the form.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingField] if the username is missing or blank and
    /// [Error::InvalidUsername] if it does not satisfy the username format.
    pub fn username(&self) -> Result<Username, Error> {
        match self.username.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Username::new(raw),
            _ => Err(Error::MissingField("username")),
        }
    }
}

/// The response body for [get_user_exists_endpoint].
#[derive(Debug, Serialize, Deserialize)]
pub struct UserExists {
    /// Whether a user with the requested username is registered.
    pub exists: bool,
}

/// A route handler that reports whether a username is registered.
///
/// Malformed usernames cannot be registered, so they are reported as not existing.
pub async fn get_user_exists_endpoint(
    State(state): State<UserState>,
    PathParams(username): PathParams<String>,
) -> Result<Json<UserExists>, Error> {
    let Ok(username) = Username::new(&username) else {
        return Ok(Json(UserExists { exists: false }));
    };

    let connection = lock_connection(&state.db_connection)?;
    let exists = user_exists(&username, &connection)?;

    Ok(Json(UserExists { exists }))
}

/// A route handler for registering a new user, responds with a session for the new user.
pub async fn register_user_endpoint(
    State(state): State<UserState>,
    JsonBody(form): JsonBody<UsernameForm>,
) -> Result<Json<Session>, Error> {
    let username = form.username()?;

    let connection = lock_connection(&state.db_connection)?;
    let user = create_user(username, &connection).inspect_err(|error| {
        tracing::debug!("could not register user: {error}");
    })?;

    tracing::info!("Registered user {}", user.username);

    Ok(Json(Session::from(user)))
}
