use clap::{Arg, Command};

pub const ARG_USERNAME: &str = "username";
pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";

fn password_arg() -> Arg {
    Arg::new(ARG_PASSWORD)
        .long(ARG_PASSWORD)
        .short('p')
        .help("Account password")
        .env("CONTESTANT_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

fn username_arg() -> Arg {
    Arg::new(ARG_USERNAME)
        .long(ARG_USERNAME)
        .short('u')
        .help("Account username")
        .env("CONTESTANT_USERNAME")
        .required(true)
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new("login")
                .about("Log in and store the session")
                .arg(username_arg())
                .arg(password_arg()),
        )
        .subcommand(
            Command::new("signup")
                .about("Create an account")
                .arg(username_arg())
                .arg(
                    Arg::new(ARG_EMAIL)
                        .long(ARG_EMAIL)
                        .short('e')
                        .help("Account email")
                        .required(true),
                )
                .arg(password_arg()),
        )
        .subcommand(Command::new("logout").about("Forget the stored session"))
        .subcommand(Command::new("whoami").about("Show the cached user"))
        .subcommand(Command::new("profile").about("Fetch the profile of the logged in user"))
        .subcommand(Command::new("refresh").about("Exchange the refresh token for a new access token"))
        .subcommand(
            Command::new("delete-account")
                .about("Delete the account on the server and log out")
                .arg(password_arg()),
        )
}
