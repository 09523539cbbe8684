pub mod bank;
pub mod contest;
pub mod session;

use crate::cli::globals::GlobalArgs;
use anyhow::Result;
use serde::Serialize;

#[derive(Debug)]
pub enum Action {
    Session {
        globals: GlobalArgs,
        command: session::Command,
    },
    Contest {
        globals: GlobalArgs,
        command: contest::Command,
    },
    Bank {
        globals: GlobalArgs,
        command: bank::Command,
    },
}

impl Action {
    /// Execute the action.
    ///
    /// # Errors
    /// Returns the API error of the underlying call; its message is the
    /// server's `detail`.
    pub async fn execute(self) -> Result<()> {
        match self {
            Self::Session { globals, command } => session::execute(&globals, command).await,
            Self::Contest { globals, command } => contest::execute(&globals, command).await,
            Self::Bank { globals, command } => bank::execute(&globals, command).await,
        }
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
