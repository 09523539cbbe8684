use crate::{
    cli::{actions::print_json, globals::GlobalArgs},
    session::{SessionRepository, SessionStore},
};
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub enum Command {
    Login {
        username: String,
        password: SecretString,
    },
    SignUp {
        username: String,
        email: String,
        password: SecretString,
    },
    Logout,
    WhoAmI,
    Profile,
    Refresh,
    DeleteAccount {
        password: SecretString,
    },
}

/// Execute a session command against the session file in `globals`.
///
/// # Errors
/// Returns the normalized API error or a storage failure.
pub async fn execute(globals: &GlobalArgs, command: Command) -> Result<()> {
    let store = globals.session_store()?;
    for line in run(&store, command).await? {
        println!("{line}");
    }
    Ok(())
}

async fn run<R: SessionRepository>(
    store: &SessionStore<R>,
    command: Command,
) -> Result<Vec<String>> {
    let lines = match command {
        Command::Login { username, password } => {
            let session = store.login(&username, &password).await?;
            let name = session.user.map_or(username, |user| user.username);
            vec![format!("Logged in as {name}")]
        }
        Command::SignUp {
            username,
            email,
            password,
        } => {
            let user = store.sign_up(&username, &email, &password).await?;
            vec![format!("Account {} created, log in to continue", user.username)]
        }
        Command::Logout => {
            store.logout()?;
            vec!["Logged out".to_string()]
        }
        Command::WhoAmI => match store.current_user() {
            Some(user) => vec![user.username],
            None => vec!["Not logged in".to_string()],
        },
        Command::Profile => {
            let user = store.user_profile().await?;
            print_json(&user)?;
            Vec::new()
        }
        Command::Refresh => {
            store.refresh_token().await?;
            vec!["Access token refreshed".to_string()]
        }
        Command::DeleteAccount { password } => {
            store.delete_account(&password).await?;
            store.logout()?;
            vec!["Account deleted".to_string()]
        }
    };
    Ok(lines)
}
