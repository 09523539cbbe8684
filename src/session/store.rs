//! Session store: the single source of truth for "is somebody logged in" and
//! which tokens to send. It wraps the auth endpoints, persists their results
//! through a `SessionRepository`, and centralizes the refresh-and-retry-once
//! pattern every authenticated call goes through.
//!
//! Flow Overview: `login` persists access token, refresh token and user in one
//! write. Authenticated calls send the access token; on a 401 they exchange the
//! refresh token once (single-flight across concurrent callers) and retry. If
//! the refresh itself is rejected the local session is cleared.
//!
//! Token material must never be logged.

use crate::{
    api::{ApiClient, ApiError},
    session::{
        repository::{SessionRepository, StorageError},
        types::{
            LoginRequest, LoginResponse, PasswordRequest, RefreshRequest, RefreshResponse,
            Session, SignUpRequest, User,
        },
    },
};
use secrecy::{ExposeSecret, SecretString};
use serde::{
    de::{DeserializeOwned, IgnoredAny},
    Serialize,
};
use std::{
    future::Future,
    sync::atomic::{AtomicU64, Ordering},
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

const LOGIN_PATH: &str = "/auth/login/";
const REFRESH_PATH: &str = "/auth/login/refresh/";
const PROFILE_PATH: &str = "/auth/profile/";
const SIGNUP_PATH: &str = "/auth/signup/";
const DELETE_PATH: &str = "/auth/delete/";

const LOGIN_FALLBACK: &str = "An error occurred during login";
const REFRESH_FALLBACK: &str = "An error occurred while refreshing token";
const PROFILE_FALLBACK: &str = "An error occurred while getting user profile";
const SIGNUP_FALLBACK: &str = "An error occurred during signup";
const DELETE_FALLBACK: &str = "An error occurred while deleting account";

pub struct SessionStore<R> {
    api: ApiClient,
    repository: R,
    // Bumped after every completed refresh; waiters compare it to what they saw
    // before queueing to detect that someone refreshed on their behalf.
    refresh_generation: AtomicU64,
    last_refresh: Mutex<Option<Result<SecretString, ApiError>>>,
}

impl<R: SessionRepository> SessionStore<R> {
    #[must_use]
    pub fn new(api: ApiClient, repository: R) -> Self {
        Self {
            api,
            repository,
            refresh_generation: AtomicU64::new(0),
            last_refresh: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Logs in and persists both tokens and the user payload in one write.
    ///
    /// # Errors
    /// Returns the server's error detail unchanged, or `ApiError::Storage` if
    /// the session could not be persisted (nothing is persisted in that case).
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<Session, ApiError> {
        let request = LoginRequest {
            username,
            password: password.expose_secret(),
        };
        let response: LoginResponse = self
            .api
            .post_json(LOGIN_PATH, &request, None, LOGIN_FALLBACK)
            .await?;

        let user = User::from_login_fields(username, response.fields);
        let user_json = serde_json::to_string(&user).map_err(StorageError::from)?;

        self.repository.set(&[
            (ACCESS_TOKEN_KEY, response.access.as_str()),
            (REFRESH_TOKEN_KEY, response.refresh.as_str()),
            (USER_KEY, user_json.as_str()),
        ])?;

        info!(username = %user.username, "logged in");

        Ok(Session {
            access_token: SecretString::from(response.access),
            refresh_token: SecretString::from(response.refresh),
            user: Some(user),
        })
    }

    /// Forgets the local session. Safe to call when already logged out.
    ///
    /// # Errors
    /// Returns `ApiError::Storage` if the backing store cannot be written.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.repository
            .clear(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY])?;
        info!("logged out");
        Ok(())
    }

    /// Returns the cached user without a network call; unreadable data counts
    /// as no session.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        let raw = self.repository.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!("Ignoring unreadable cached user: {}", err);
                None
            }
        }
    }

    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        self.repository.get(ACCESS_TOKEN_KEY).map(SecretString::from)
    }

    #[must_use]
    pub fn session(&self) -> Option<Session> {
        Some(Session {
            access_token: self.access_token()?,
            refresh_token: self
                .repository
                .get(REFRESH_TOKEN_KEY)
                .map(SecretString::from)?,
            user: self.current_user(),
        })
    }

    /// Exchanges the refresh token for a new access token and persists only the
    /// access token. Concurrent callers share one in-flight exchange.
    ///
    /// # Errors
    /// Returns `ApiError::Auth` if no refresh token is stored or the server
    /// rejects it; the stored refresh token is left untouched on failure.
    pub async fn refresh_token(&self) -> Result<SecretString, ApiError> {
        let observed = self.refresh_generation.load(Ordering::Acquire);
        let mut last = self.last_refresh.lock().await;

        if self.refresh_generation.load(Ordering::Acquire) != observed {
            if let Some(outcome) = last.as_ref() {
                debug!("reusing refresh completed while waiting");
                return outcome.clone();
            }
        }

        let outcome = self.exchange_refresh_token().await;
        *last = Some(outcome.clone());
        self.refresh_generation.fetch_add(1, Ordering::AcqRel);

        outcome
    }

    #[instrument(skip(self))]
    async fn exchange_refresh_token(&self) -> Result<SecretString, ApiError> {
        let refresh = self
            .repository
            .get(REFRESH_TOKEN_KEY)
            .map(SecretString::from)
            .ok_or_else(ApiError::missing_credentials)?;

        let request = RefreshRequest {
            refresh: refresh.expose_secret(),
        };
        let response: RefreshResponse = self
            .api
            .post_json(REFRESH_PATH, &request, None, REFRESH_FALLBACK)
            .await?;

        self.repository
            .set(&[(ACCESS_TOKEN_KEY, response.access.as_str())])?;

        info!("access token refreshed");

        Ok(SecretString::from(response.access))
    }

    /// Runs `op` with the current access token. A 401 triggers one refresh and
    /// one retry; if the refresh is rejected too, the local session is cleared.
    ///
    /// # Errors
    /// Returns `ApiError::Auth` when no token is stored, otherwise whatever the
    /// operation or the refresh returned.
    pub async fn authorized<T, F, Fut>(&self, op: F) -> Result<T, ApiError>
    where
        F: Fn(SecretString) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let token = self
            .access_token()
            .ok_or_else(ApiError::missing_credentials)?;

        match op(token).await {
            Err(err) if err.is_auth() => {
                debug!("access token rejected, refreshing");
                let token = match self.refresh_token().await {
                    Ok(token) => token,
                    Err(refresh_err) => {
                        if refresh_err.is_auth() {
                            warn!("refresh token rejected, clearing session");
                            self.logout()?;
                        }
                        return Err(refresh_err);
                    }
                };
                op(token).await
            }
            other => other,
        }
    }

    /// Authenticated GET through `authorized`.
    ///
    /// # Errors
    /// See [`SessionStore::authorized`].
    pub async fn get_authorized<T: DeserializeOwned>(
        &self,
        path: &str,
        fallback: &str,
    ) -> Result<T, ApiError> {
        self.authorized(move |token| async move {
            self.api.get_json(path, Some(&token), fallback).await
        })
        .await
    }

    /// Authenticated GET with query parameters through `authorized`.
    ///
    /// # Errors
    /// See [`SessionStore::authorized`].
    pub async fn get_authorized_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
        fallback: &str,
    ) -> Result<T, ApiError> {
        self.authorized(move |token| async move {
            self.api
                .get_json_with_query(path, query, Some(&token), fallback)
                .await
        })
        .await
    }

    /// Authenticated POST through `authorized`.
    ///
    /// # Errors
    /// See [`SessionStore::authorized`].
    pub async fn post_authorized<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<T, ApiError> {
        self.authorized(move |token| async move {
            self.api.post_json(path, body, Some(&token), fallback).await
        })
        .await
    }

    /// Authenticated DELETE through `authorized`.
    ///
    /// # Errors
    /// See [`SessionStore::authorized`].
    pub async fn delete_authorized<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
        fallback: &str,
    ) -> Result<T, ApiError> {
        self.authorized(move |token| async move {
            self.api.delete_json(path, body, Some(&token), fallback).await
        })
        .await
    }

    /// Fetches the extended profile of the logged in user.
    ///
    /// # Errors
    /// Returns `ApiError::Auth` without a network call when no token is stored.
    #[instrument(skip(self))]
    pub async fn user_profile(&self) -> Result<User, ApiError> {
        self.get_authorized(PROFILE_PATH, PROFILE_FALLBACK).await
    }

    /// Registers a new account. Does not log in.
    ///
    /// # Errors
    /// Field errors surface as `ApiError::Validation` with the raw payload.
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<User, ApiError> {
        let request = SignUpRequest {
            username,
            email,
            password: password.expose_secret(),
        };
        let user: User = self
            .api
            .post_json(SIGNUP_PATH, &request, None, SIGNUP_FALLBACK)
            .await?;

        info!(username = %user.username, "account created");

        Ok(user)
    }

    /// Deletes the account on the server. Local state is kept; callers follow
    /// up with [`SessionStore::logout`].
    ///
    /// # Errors
    /// Returns the normalized server error, e.g. a wrong password.
    #[instrument(skip(self, password))]
    pub async fn delete_account(&self, password: &SecretString) -> Result<(), ApiError> {
        let request = PasswordRequest {
            password: password.expose_secret(),
        };
        let _: IgnoredAny = self
            .delete_authorized(DELETE_PATH, Some(&request), DELETE_FALLBACK)
            .await?;

        info!("account deleted");

        Ok(())
    }
}
