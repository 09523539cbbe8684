use crate::{
    cli::globals::GlobalArgs,
    problem::{self, NewProblem, Problem, Submission},
    session::{SessionRepository, SessionStore},
};
use anyhow::Result;

#[derive(Debug)]
pub enum Command {
    List { page: u32 },
    Create(NewProblem),
    Submit { problem_id: i64, answer: String },
    Submissions { problem_id: i64 },
}

/// Execute a problem bank command.
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
        Command::List { page } => {
            let problems = problem::list_problems(store, page).await?;
            let mut lines: Vec<String> = problems.results.iter().map(problem_line).collect();
            if problems.next.is_some() {
                lines.push(format!("More results: --page {}", page.saturating_add(1)));
            }
            lines
        }
        Command::Create(new_problem) => {
            let created = problem::create_problem(store, &new_problem).await?;
            vec![format!("Created problem #{}: {}", created.id, created.title)]
        }
        Command::Submit { problem_id, answer } => {
            let submission = problem::submit(store, problem_id, &answer).await?;
            vec![submission_line(&submission)]
        }
        Command::Submissions { problem_id } => problem::submissions(store, problem_id)
            .await?
            .iter()
            .map(submission_line)
            .collect(),
    };
    Ok(lines)
}

fn problem_line(problem: &Problem) -> String {
    if problem.genre.is_empty() {
        return format!("#{} {}", problem.id, problem.title);
    }
    let genres: Vec<&str> = problem.genre.iter().map(|g| g.name.as_str()).collect();
    format!("#{} {} [{}]", problem.id, problem.title, genres.join(", "))
}

fn submission_line(submission: &Submission) -> String {
    let id = submission
        .id
        .map_or_else(|| "-".to_string(), |id| format!("#{id}"));
    let content = submission.content.as_deref().unwrap_or("");
    match &submission.evaluation_status {
        Some(status) => format!("{id} {content} ({status})"),
        None => format!("{id} {content}"),
    }
}
