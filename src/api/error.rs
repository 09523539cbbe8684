use crate::session::StorageError;
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Maximum number of characters of a server detail surfaced to callers.
const MAX_DETAIL_CHARS: usize = 200;

pub const NETWORK_DETAIL: &str =
    "Unable to reach the server. Please check that the backend is running.";
pub const TIMEOUT_DETAIL: &str = "Request timed out. Please try again.";
pub const MISSING_CREDENTIALS_DETAIL: &str = "Authentication credentials were not provided.";

/// Normalized failure of a remote call. Every variant carries a human readable
/// `detail`, and the whole error serializes as `{ "detail": ... }` so callers
/// never branch on transport versus application failures to show a message.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ApiError {
    /// 401 from the server, or no credentials stored locally.
    #[error("{detail}")]
    Auth { detail: String },
    /// Any other 4xx; `payload` keeps the raw body (field errors and so on).
    #[error("{detail}")]
    Validation {
        status: u16,
        detail: String,
        payload: Value,
    },
    /// No response was received.
    #[error("{detail}")]
    Network { detail: String },
    #[error("{detail}")]
    Unknown { detail: String },
    /// The local session file could not be written.
    #[error("{detail}")]
    Storage { detail: String },
}

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub detail: &'a str,
}

impl ApiError {
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Auth { detail }
            | Self::Validation { detail, .. }
            | Self::Network { detail }
            | Self::Unknown { detail }
            | Self::Storage { detail } => detail,
        }
    }

    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    #[must_use]
    pub fn body(&self) -> ErrorBody<'_> {
        ErrorBody {
            detail: self.detail(),
        }
    }

    pub(crate) fn missing_credentials() -> Self {
        Self::Auth {
            detail: MISSING_CREDENTIALS_DETAIL.to_string(),
        }
    }

    /// Maps a non-2xx response into the taxonomy. The server's `detail` (or
    /// first `non_field_errors` entry) wins over `fallback`.
    pub(crate) fn from_response(status: u16, body: &[u8], fallback: &str) -> Self {
        let payload: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        let detail = server_detail(&payload).unwrap_or_else(|| fallback.to_string());

        match status {
            401 => Self::Auth { detail },
            400..=499 => Self::Validation {
                status,
                detail,
                payload,
            },
            _ => Self::Unknown { detail },
        }
    }
}

impl Serialize for ApiError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body().serialize(serializer)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self::Storage {
            detail: format!("Failed to update the local session: {err}"),
        }
    }
}

fn server_detail(payload: &Value) -> Option<String> {
    let raw = payload.get("detail").and_then(Value::as_str).or_else(|| {
        payload
            .get("non_field_errors")
            .and_then(|errors| errors.get(0))
            .and_then(Value::as_str)
    })?;

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_DETAIL_CHARS).collect())
    }
}
