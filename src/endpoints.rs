//! The API endpoints URIs.
//!
//! For endpoints that take parameters, e.g., '/api/users/{username}', use [format_endpoint].

/// The route for registering users.
pub const USERS: &str = "/api/users";
/// The route for checking whether a user exists.
pub const USER: &str = "/api/users/{username}";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/log_in";
/// The route to list and create a user's transactions.
pub const TRANSACTIONS: &str = "/api/users/{username}/transactions";
/// The route to delete one of a user's transactions.
pub const TRANSACTION: &str = "/api/users/{username}/transactions/{transaction_id}";
/// The route for a user's totals, points and achievements.
pub const SUMMARY: &str = "/api/users/{username}/summary";
/// The route for a language model's analysis of a user's spending.
pub const ANALYSIS: &str = "/api/users/{username}/analysis";

/// Replace each parameter in `endpoint_path` with its value from `params`.
///
/// A parameter is a name enclosed in braces, e.g. '{username}' in
/// '/api/users/{username}'. Parameters missing from `params` are left as is.
pub fn format_endpoint(endpoint_path: &str, params: &[(&str, &str)]) -> String {
    params
        .iter()
        .fold(endpoint_path.to_owned(), |path, (name, value)| {
            path.replace(&format!("{{{name}}}"), value)
        })
}
