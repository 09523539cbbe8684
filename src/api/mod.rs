//! HTTP helpers for the contest API with consistent error handling. Feature
//! clients (session, contests, problems) use these helpers so request setup and
//! failure normalization live in one place. The helpers do not store tokens;
//! they only attach the bearer token a caller hands them.

pub mod config;
pub mod error;

pub use config::ApiConfig;
pub use error::ApiError;

use anyhow::Result;
use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info_span, Instrument};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(APP_USER_AGENT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fetches JSON, optionally with a bearer token.
    ///
    /// # Errors
    /// Returns a normalized `ApiError` for transport failures and non-2xx responses.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&SecretString>,
        fallback: &str,
    ) -> Result<T, ApiError> {
        self.execute(Method::GET, path, bearer, fallback, |builder| builder)
            .await
    }

    /// Fetches JSON with query parameters.
    ///
    /// # Errors
    /// Returns a normalized `ApiError` for transport failures and non-2xx responses.
    pub async fn get_json_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
        bearer: Option<&SecretString>,
        fallback: &str,
    ) -> Result<T, ApiError> {
        self.execute(Method::GET, path, bearer, fallback, |builder| {
            builder.query(query)
        })
        .await
    }

    /// Posts a JSON body and parses the JSON response.
    ///
    /// # Errors
    /// Returns a normalized `ApiError` for transport failures and non-2xx responses.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&SecretString>,
        fallback: &str,
    ) -> Result<T, ApiError> {
        self.execute(Method::POST, path, bearer, fallback, |builder| {
            builder.json(body)
        })
        .await
    }

    /// Sends a DELETE, with a JSON body when one is given.
    ///
    /// # Errors
    /// Returns a normalized `ApiError` for transport failures and non-2xx responses.
    pub async fn delete_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
        bearer: Option<&SecretString>,
        fallback: &str,
    ) -> Result<T, ApiError> {
        self.execute(Method::DELETE, path, bearer, fallback, |builder| match body {
            Some(body) => builder.json(body),
            None => builder,
        })
        .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&SecretString>,
        fallback: &str,
        build_request: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<T, ApiError> {
        let url = self.config.endpoint(path);
        let span = info_span!("api.request", http.method = %method, url = %url);

        let mut builder = build_request(self.http.request(method, &url));
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token.expose_secret());
        }

        let response = builder
            .send()
            .instrument(span.clone())
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let body = response
            .bytes()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        if status.is_success() {
            decode_body(&body)
        } else {
            debug!(status = status.as_u16(), url = %url, "request failed");
            Err(ApiError::from_response(status.as_u16(), &body, fallback))
        }
    }
}

/// Maps transport errors into `ApiError::Network` with timeout detection.
fn map_request_error(err: reqwest::Error) -> ApiError {
    debug!("request error: {err}");

    if err.is_timeout() {
        ApiError::Network {
            detail: error::TIMEOUT_DETAIL.to_string(),
        }
    } else if err.is_builder() {
        ApiError::Unknown {
            detail: format!("Failed to build request: {err}"),
        }
    } else {
        ApiError::Network {
            detail: error::NETWORK_DETAIL.to_string(),
        }
    }
}

/// Decodes a success body; an empty body decodes as JSON `null`.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        body
    };

    serde_json::from_slice(body).map_err(|err| ApiError::Unknown {
        detail: format!("Failed to decode response: {err}"),
    })
}
