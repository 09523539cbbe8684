use crate::{
    api::{ApiClient, ApiConfig},
    session::{FileRepository, SessionStore},
};
use anyhow::{Context, Result};
use std::{env, path::PathBuf, time::Duration};

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub session_file: PathBuf,
    pub timeout: Option<Duration>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, session_file: PathBuf) -> Self {
        Self {
            api_url,
            session_file,
            timeout: None,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the session store backed by the session file.
    ///
    /// # Errors
    /// Returns an error if the API URL is invalid or the HTTP client cannot be built.
    pub fn session_store(&self) -> Result<SessionStore<FileRepository>> {
        let config = ApiConfig::new(&self.api_url, self.timeout)?;
        let api = ApiClient::new(config)?;
        Ok(SessionStore::new(
            api,
            FileRepository::new(self.session_file.clone()),
        ))
    }
}

/// `$HOME/.config/contestant/session.json`
///
/// # Errors
/// Returns an error when `HOME` is not set.
pub fn default_session_file() -> Result<PathBuf> {
    let home = env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .context("HOME is not set, pass --session-file")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("contestant")
        .join("session.json"))
}
