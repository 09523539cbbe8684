use crate::cli::commands::contest::{genre_arg, page_arg, ARG_ANSWER, ARG_PROBLEM_ID};
use clap::{Arg, Command};

pub const ARG_TITLE: &str = "title";
pub const ARG_QUESTION: &str = "question";

fn problem_id_arg() -> Arg {
    Arg::new(ARG_PROBLEM_ID)
        .help("Problem id")
        .required(true)
        .value_parser(clap::value_parser!(i64))
}

#[must_use]
pub fn with_subcommand(command: Command) -> Command {
    command.subcommand(
        Command::new("bank")
            .about("Practice problems outside of contests")
            .subcommand_required(true)
            .subcommand(Command::new("list").about("List problems").arg(page_arg()))
            .subcommand(
                Command::new("create")
                    .about("Add a problem to the bank")
                    .arg(
                        Arg::new(ARG_TITLE)
                            .long(ARG_TITLE)
                            .help("Problem title")
                            .required(true),
                    )
                    .arg(
                        Arg::new(ARG_QUESTION)
                            .long(ARG_QUESTION)
                            .help("Problem statement")
                            .required(true),
                    )
                    .arg(
                        Arg::new(ARG_ANSWER)
                            .long(ARG_ANSWER)
                            .help("Expected answer")
                            .required(true),
                    )
                    .arg(genre_arg()),
            )
            .subcommand(
                Command::new("submit")
                    .about("Submit a practice answer")
                    .arg(problem_id_arg())
                    .arg(
                        Arg::new(ARG_ANSWER)
                            .help("Answer")
                            .required(true)
                            .allow_hyphen_values(true),
                    ),
            )
            .subcommand(
                Command::new("submissions")
                    .about("List your submissions to a problem")
                    .arg(problem_id_arg()),
            ),
    )
}
