//! Session payloads and auth wire types. Tokens are held as `SecretString` so
//! they stay out of `Debug` output; request structs borrow secrets only for the
//! duration of a call and must never be logged.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Last-known identity of the logged in user. Fields the server adds beyond
/// `username` and `email` are kept in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    #[must_use]
    pub fn named(username: &str) -> Self {
        Self {
            username: username.to_string(),
            email: None,
            extra: Map::new(),
        }
    }

    /// Builds the cached identity from the user fields of a login response,
    /// recording `username` when the server does not echo it back.
    pub(crate) fn from_login_fields(username: &str, mut fields: Map<String, Value>) -> Self {
        fields
            .entry("username")
            .or_insert_with(|| Value::String(username.to_string()));

        serde_json::from_value(Value::Object(fields)).unwrap_or_else(|_| Self::named(username))
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub user: Option<User>,
}

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct LoginResponse {
    pub access: String,
    pub refresh: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct RefreshResponse {
    pub access: String,
}

#[derive(Serialize)]
pub(crate) struct SignUpRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct PasswordRequest<'a> {
    pub password: &'a str,
}
