//! Maps parsed command-line matches to an [`Action`].

use crate::{
    cli::{
        actions::{bank, contest, session, Action},
        commands::{
            self,
            bank::{ARG_QUESTION, ARG_TITLE},
            contest::{
                ARG_ANSWER, ARG_CONTEST_ID, ARG_DESCRIPTION, ARG_DURATION_MINUTES, ARG_GENRE,
                ARG_KIND, ARG_NAME, ARG_ORDER, ARG_PAGE, ARG_PROBLEM_ID, ARG_START, ARG_USERNAME,
            },
            session::{ARG_EMAIL, ARG_PASSWORD, ARG_USERNAME as ARG_LOGIN_USERNAME},
        },
        globals::{default_session_file, GlobalArgs},
    },
    contest::{ContestListKind, NewContest},
    problem::NewProblem,
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

fn required<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Result<T> {
    matches
        .get_one::<T>(id)
        .cloned()
        .with_context(|| format!("missing required argument: {id}"))
}

fn password(matches: &ArgMatches) -> Result<SecretString> {
    required::<String>(matches, ARG_PASSWORD).map(SecretString::from)
}

fn genre_ids(matches: &ArgMatches) -> Vec<i64> {
    matches
        .get_many::<i64>(ARG_GENRE)
        .map(|values| values.copied().collect())
        .unwrap_or_default()
}

fn global_args(matches: &ArgMatches) -> Result<GlobalArgs> {
    let api_url = required::<String>(matches, commands::ARG_API_URL)?;
    let session_file = match matches.get_one::<PathBuf>(commands::ARG_SESSION_FILE) {
        Some(path) => path.clone(),
        None => default_session_file()?,
    };
    let timeout = matches
        .get_one::<u64>(commands::ARG_TIMEOUT_SECONDS)
        .copied()
        .map(Duration::from_secs);

    Ok(GlobalArgs::new(api_url, session_file).with_timeout(timeout))
}

fn session_command(name: &str, matches: &ArgMatches) -> Result<Option<session::Command>> {
    let command = match name {
        "login" => session::Command::Login {
            username: required(matches, ARG_LOGIN_USERNAME)?,
            password: password(matches)?,
        },
        "signup" => session::Command::SignUp {
            username: required(matches, ARG_LOGIN_USERNAME)?,
            email: required(matches, ARG_EMAIL)?,
            password: password(matches)?,
        },
        "logout" => session::Command::Logout,
        "whoami" => session::Command::WhoAmI,
        "profile" => session::Command::Profile,
        "refresh" => session::Command::Refresh,
        "delete-account" => session::Command::DeleteAccount {
            password: password(matches)?,
        },
        _ => return Ok(None),
    };
    Ok(Some(command))
}

fn contest_command(name: &str, matches: &ArgMatches) -> Result<Option<contest::Command>> {
    let contest_id = || required::<i64>(matches, ARG_CONTEST_ID);

    let command = match name {
        "contests" => contest::Command::List {
            kind: required::<ContestListKind>(matches, ARG_KIND)?,
            page: required(matches, ARG_PAGE)?,
        },
        "contest" => contest::Command::Show {
            contest_id: contest_id()?,
        },
        "create-contest" => {
            let start = required::<String>(matches, ARG_START)?;
            let starting_time = OffsetDateTime::parse(&start, &Rfc3339)
                .with_context(|| format!("invalid --start, expected RFC 3339: {start}"))?;
            let minutes = required::<u64>(matches, ARG_DURATION_MINUTES)?;
            let duration = minutes
                .checked_mul(60)
                .ok_or_else(|| anyhow!("--duration-minutes is too large"))?;

            contest::Command::Create(NewContest {
                name: required(matches, ARG_NAME)?,
                description: required(matches, ARG_DESCRIPTION)?,
                starting_time,
                duration,
                genre_ids: genre_ids(matches),
            })
        }
        "delete-contest" => contest::Command::Delete {
            contest_id: contest_id()?,
        },
        "register" => contest::Command::Register {
            contest_id: contest_id()?,
        },
        "unregister" => contest::Command::Unregister {
            contest_id: contest_id()?,
        },
        "problems" => contest::Command::Problems {
            contest_id: contest_id()?,
        },
        "problem" => contest::Command::Problem {
            contest_id: contest_id()?,
            order: required(matches, ARG_ORDER)?,
        },
        "add-problems" => contest::Command::AddProblems {
            contest_id: contest_id()?,
            problem_ids: matches
                .get_many::<i64>(ARG_PROBLEM_ID)
                .map(|values| values.copied().collect())
                .unwrap_or_default(),
        },
        "remove-problem" => contest::Command::RemoveProblem {
            contest_id: contest_id()?,
            problem_id: required(matches, ARG_PROBLEM_ID)?,
        },
        "submit" => contest::Command::Submit {
            contest_id: contest_id()?,
            order: required(matches, ARG_ORDER)?,
            answer: required(matches, ARG_ANSWER)?,
        },
        "leaderboard" => contest::Command::Leaderboard {
            contest_id: contest_id()?,
        },
        "rank" => contest::Command::Rank {
            contest_id: contest_id()?,
            username: matches.get_one::<String>(ARG_USERNAME).cloned(),
        },
        _ => return Ok(None),
    };
    Ok(Some(command))
}

fn bank_command(matches: &ArgMatches) -> Result<bank::Command> {
    match matches.subcommand() {
        Some(("list", sub)) => Ok(bank::Command::List {
            page: required(sub, ARG_PAGE)?,
        }),
        Some(("create", sub)) => Ok(bank::Command::Create(NewProblem {
            title: required(sub, ARG_TITLE)?,
            question: required(sub, ARG_QUESTION)?,
            answer: required(sub, ARG_ANSWER)?,
            genre_ids: genre_ids(sub),
        })),
        Some(("submit", sub)) => Ok(bank::Command::Submit {
            problem_id: required(sub, ARG_PROBLEM_ID)?,
            answer: required(sub, ARG_ANSWER)?,
        }),
        Some(("submissions", sub)) => Ok(bank::Command::Submissions {
            problem_id: required(sub, ARG_PROBLEM_ID)?,
        }),
        _ => Err(anyhow!("missing bank subcommand")),
    }
}

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or malformed.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let globals = global_args(matches)?;

    let Some((name, sub)) = matches.subcommand() else {
        return Err(anyhow!("missing subcommand"));
    };

    if name == "bank" {
        return Ok(Action::Bank {
            globals,
            command: bank_command(sub)?,
        });
    }

    if let Some(command) = session_command(name, sub)? {
        return Ok(Action::Session { globals, command });
    }

    if let Some(command) = contest_command(name, sub)? {
        return Ok(Action::Contest { globals, command });
    }

    Err(anyhow!("unknown subcommand: {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use time::macros::datetime;

    fn dispatch(args: &[&str]) -> Result<Action> {
        temp_env::with_vars(
            [
                ("CONTESTANT_API_URL", None::<&str>),
                ("CONTESTANT_SESSION_FILE", Some("/tmp/contestant-test.json")),
                ("CONTESTANT_TIMEOUT_SECONDS", None),
                ("CONTESTANT_PASSWORD", None),
                ("CONTESTANT_USERNAME", None),
            ],
            || {
                let mut argv = vec!["contestant"];
                argv.extend_from_slice(args);
                let matches = commands::new().try_get_matches_from(argv)?;
                handler(&matches)
            },
        )
    }

    #[test]
    fn login_carries_credentials() -> Result<()> {
        let action = dispatch(&["login", "-u", "ada", "-p", "hunter2", "--timeout-seconds", "3"])?;
        let Action::Session { globals, command } = action else {
            return Err(anyhow!("expected a session action"));
        };
        assert_eq!(globals.api_url, "http://localhost:8000");
        assert_eq!(globals.session_file, PathBuf::from("/tmp/contestant-test.json"));
        assert_eq!(globals.timeout, Some(Duration::from_secs(3)));
        let session::Command::Login { username, password } = command else {
            return Err(anyhow!("expected login"));
        };
        assert_eq!(username, "ada");
        assert_eq!(password.expose_secret(), "hunter2");
        Ok(())
    }

    #[test]
    fn create_contest_converts_minutes_to_seconds() -> Result<()> {
        let action = dispatch(&[
            "create-contest",
            "--name",
            "Weekly",
            "--start",
            "2025-03-01T12:00:00Z",
            "--duration-minutes",
            "90",
            "--genre",
            "2",
        ])?;
        let Action::Contest {
            command: contest::Command::Create(new_contest),
            ..
        } = action
        else {
            return Err(anyhow!("expected create-contest"));
        };
        assert_eq!(new_contest.duration, 5400);
        assert_eq!(new_contest.starting_time, datetime!(2025-03-01 12:00 UTC));
        assert_eq!(new_contest.genre_ids, vec![2]);
        assert_eq!(new_contest.description, "");
        Ok(())
    }

    #[test]
    fn create_contest_rejects_bad_start() {
        let result = dispatch(&[
            "create-contest",
            "--name",
            "Weekly",
            "--start",
            "tomorrow",
            "--duration-minutes",
            "90",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rank_defaults_to_no_username() -> Result<()> {
        let action = dispatch(&["rank", "7"])?;
        assert!(matches!(
            action,
            Action::Contest {
                command: contest::Command::Rank {
                    contest_id: 7,
                    username: None
                },
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn remove_problem_dispatches() -> Result<()> {
        let action = dispatch(&["remove-problem", "7", "12"])?;
        assert!(matches!(
            action,
            Action::Contest {
                command: contest::Command::RemoveProblem {
                    contest_id: 7,
                    problem_id: 12
                },
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn bank_list_dispatches() -> Result<()> {
        let action = dispatch(&["bank", "list", "--page", "3"])?;
        assert!(matches!(
            action,
            Action::Bank {
                command: bank::Command::List { page: 3 },
                ..
            }
        ));
        Ok(())
    }
}
