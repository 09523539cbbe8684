use crate::contest::ContestListKind;
use clap::{Arg, ArgAction, Command};

pub const ARG_CONTEST_ID: &str = "contest-id";
pub const ARG_ORDER: &str = "order";
pub const ARG_ANSWER: &str = "answer";
pub const ARG_KIND: &str = "kind";
pub const ARG_PAGE: &str = "page";
pub const ARG_NAME: &str = "name";
pub const ARG_DESCRIPTION: &str = "description";
pub const ARG_START: &str = "start";
pub const ARG_DURATION_MINUTES: &str = "duration-minutes";
pub const ARG_GENRE: &str = "genre";
pub const ARG_PROBLEM_ID: &str = "problem-id";
pub const ARG_USERNAME: &str = "username";

fn contest_id_arg() -> Arg {
    Arg::new(ARG_CONTEST_ID)
        .help("Contest id")
        .required(true)
        .value_parser(clap::value_parser!(i64))
}

fn order_arg() -> Arg {
    Arg::new(ARG_ORDER)
        .help("Problem position within the contest")
        .required(true)
        .value_parser(clap::value_parser!(u32))
}

pub(crate) fn page_arg() -> Arg {
    Arg::new(ARG_PAGE)
        .long(ARG_PAGE)
        .help("Page number")
        .default_value("1")
        .value_parser(clap::value_parser!(u32).range(1..))
}

pub(crate) fn genre_arg() -> Arg {
    Arg::new(ARG_GENRE)
        .long(ARG_GENRE)
        .help("Genre id, repeatable")
        .action(ArgAction::Append)
        .value_parser(clap::value_parser!(i64))
}

fn single(name: &'static str, about: &'static str) -> Command {
    Command::new(name).about(about).arg(contest_id_arg())
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new("contests")
                .about("List contests with their status and countdown")
                .arg(
                    Arg::new(ARG_KIND)
                        .long(ARG_KIND)
                        .short('k')
                        .help("future, active or completed")
                        .default_value("active")
                        .value_parser(clap::value_parser!(ContestListKind)),
                )
                .arg(page_arg()),
        )
        .subcommand(single("contest", "Show one contest"))
        .subcommand(
            Command::new("create-contest")
                .about("Create a contest")
                .arg(
                    Arg::new(ARG_NAME)
                        .long(ARG_NAME)
                        .help("Contest name")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_DESCRIPTION)
                        .long(ARG_DESCRIPTION)
                        .help("Contest description")
                        .default_value(""),
                )
                .arg(
                    Arg::new(ARG_START)
                        .long(ARG_START)
                        .help("Start instant, RFC 3339, e.g. 2025-03-01T12:00:00Z")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_DURATION_MINUTES)
                        .long(ARG_DURATION_MINUTES)
                        .help("Contest length in minutes")
                        .required(true)
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(genre_arg()),
        )
        .subcommand(single("delete-contest", "Delete a contest you created"))
        .subcommand(single("register", "Register for a contest"))
        .subcommand(single("unregister", "Withdraw a registration"))
        .subcommand(single("problems", "List the problems of a contest"))
        .subcommand(
            Command::new("problem")
                .about("Show one contest problem")
                .arg(contest_id_arg())
                .arg(order_arg()),
        )
        .subcommand(
            Command::new("add-problems")
                .about("Attach problems from the bank to a contest")
                .arg(contest_id_arg())
                .arg(
                    Arg::new(ARG_PROBLEM_ID)
                        .help("Problem ids")
                        .required(true)
                        .num_args(1..)
                        .value_parser(clap::value_parser!(i64)),
                ),
        )
        .subcommand(
            Command::new("remove-problem")
                .about("Detach a problem from a contest")
                .arg(contest_id_arg())
                .arg(
                    Arg::new(ARG_PROBLEM_ID)
                        .help("Problem id")
                        .required(true)
                        .value_parser(clap::value_parser!(i64)),
                ),
        )
        .subcommand(
            Command::new("submit")
                .about("Submit an answer to a contest problem")
                .arg(contest_id_arg())
                .arg(order_arg())
                .arg(
                    Arg::new(ARG_ANSWER)
                        .help("Answer")
                        .required(true)
                        .allow_hyphen_values(true),
                ),
        )
        .subcommand(single("leaderboard", "Show the top of the leaderboard"))
        .subcommand(
            Command::new("rank")
                .about("Show the rank of a user, the logged in user by default")
                .arg(contest_id_arg())
                .arg(Arg::new(ARG_USERNAME).help("Username")),
        )
}
