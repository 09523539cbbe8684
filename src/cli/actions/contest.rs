use crate::{
    api::ApiError,
    cli::{actions::print_json, globals::GlobalArgs},
    contest::{
        client, format_duration_seconds, Contest, ContestListKind, ContestProblem,
        LeaderboardEntry, NewContest, Page,
    },
    session::{SessionRepository, SessionStore},
};
use anyhow::Result;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

#[derive(Debug)]
pub enum Command {
    List { kind: ContestListKind, page: u32 },
    Show { contest_id: i64 },
    Create(NewContest),
    Delete { contest_id: i64 },
    Register { contest_id: i64 },
    Unregister { contest_id: i64 },
    Problems { contest_id: i64 },
    Problem { contest_id: i64, order: u32 },
    AddProblems { contest_id: i64, problem_ids: Vec<i64> },
    RemoveProblem { contest_id: i64, problem_id: i64 },
    Submit { contest_id: i64, order: u32, answer: String },
    Leaderboard { contest_id: i64 },
    Rank { contest_id: i64, username: Option<String> },
}

/// Execute a contest command.
///
/// # Errors
/// Returns the normalized API error or a storage failure.
pub async fn execute(globals: &GlobalArgs, command: Command) -> Result<()> {
    let store = globals.session_store()?;
    for line in run(&store, command, OffsetDateTime::now_utc()).await? {
        println!("{line}");
    }
    Ok(())
}

async fn run<R: SessionRepository>(
    store: &SessionStore<R>,
    command: Command,
    now: OffsetDateTime,
) -> Result<Vec<String>> {
    let lines = match command {
        Command::List { kind, page } => {
            let contests = client::list_contests(store, kind, page).await?;
            let mut lines: Vec<String> = contests
                .results
                .iter()
                .map(|contest| contest_line(contest, now))
                .collect();
            if lines.is_empty() {
                lines.push(format!("No {} contests", kind.as_str()));
            }
            lines.extend(more_pages(&contests, page));
            lines
        }
        Command::Show { contest_id } => {
            let contest = client::contest_details(store, contest_id).await?;
            detail_lines(&contest, now)
        }
        Command::Create(new_contest) => {
            let contest = client::create_contest(store, &new_contest).await?;
            vec![format!("Created contest #{}: {}", contest.id, contest.name)]
        }
        Command::Delete { contest_id } => {
            client::delete_contest(store, contest_id).await?;
            vec![format!("Deleted contest #{contest_id}")]
        }
        Command::Register { contest_id } => {
            let response = client::register(store, contest_id).await?;
            vec![response
                .detail
                .unwrap_or_else(|| format!("Registered for contest #{contest_id}"))]
        }
        Command::Unregister { contest_id } => {
            let response = client::unregister(store, contest_id).await?;
            vec![response
                .detail
                .unwrap_or_else(|| format!("Unregistered from contest #{contest_id}"))]
        }
        Command::Problems { contest_id } => {
            let problems = client::contest_problems(store, contest_id).await?;
            problems
                .results
                .iter()
                .enumerate()
                .map(|(index, problem)| problem_line(index, problem))
                .collect()
        }
        Command::Problem { contest_id, order } => {
            let problem = client::contest_problem(store, contest_id, order).await?;
            vec![problem.title, String::new(), problem.question]
        }
        Command::AddProblems {
            contest_id,
            problem_ids,
        } => {
            let response = client::add_problems(store, contest_id, &problem_ids).await?;
            vec![response.detail.unwrap_or_else(|| {
                format!("Added {} problem(s) to contest #{contest_id}", problem_ids.len())
            })]
        }
        Command::RemoveProblem {
            contest_id,
            problem_id,
        } => {
            client::remove_problem(store, contest_id, problem_id).await?;
            vec![format!("Removed problem #{problem_id} from contest #{contest_id}")]
        }
        Command::Submit {
            contest_id,
            order,
            answer,
        } => {
            let evaluation = client::submit_answer(store, contest_id, order, &answer).await?;
            print_json(&evaluation)?;
            Vec::new()
        }
        Command::Leaderboard { contest_id } => {
            let entries = client::leaderboard(store, contest_id).await?;
            if entries.is_empty() {
                vec!["No submissions yet".to_string()]
            } else {
                entries
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| leaderboard_line(index, entry))
                    .collect()
            }
        }
        Command::Rank {
            contest_id,
            username,
        } => {
            let username = match username {
                Some(username) => username,
                None => store
                    .current_user()
                    .map(|user| user.username)
                    .ok_or_else(ApiError::missing_credentials)?,
            };
            let entry = client::user_rank(store, contest_id, &username).await?;
            vec![leaderboard_line(0, &entry)]
        }
    };
    Ok(lines)
}

fn more_pages<T>(page: &Page<T>, current: u32) -> Option<String> {
    page.next
        .as_ref()
        .map(|_| format!("More results: --page {}", current.saturating_add(1)))
}

/// `#7 Weekly Round 12 (1h 30m) Ends in 0h 30m`
fn contest_line(contest: &Contest, now: OffsetDateTime) -> String {
    format!(
        "#{} {}{} ({}) {}",
        contest.id,
        contest.name,
        registered_tag(contest),
        format_duration_seconds(contest.duration_seconds),
        contest.window().describe_at(now)
    )
}

fn registered_tag(contest: &Contest) -> &'static str {
    if contest.is_registered == Some(true) {
        " [registered]"
    } else {
        ""
    }
}

fn detail_lines(contest: &Contest, now: OffsetDateTime) -> Vec<String> {
    let starts = contest
        .starting_time
        .format(&Rfc3339)
        .unwrap_or_else(|_| contest.starting_time.to_string());

    let mut lines = vec![
        format!("#{} {}{}", contest.id, contest.name, registered_tag(contest)),
        format!("Status:   {}", contest.status_at(now)),
        format!("Starts:   {starts}"),
        format!(
            "Duration: {}",
            format_duration_seconds(contest.duration_seconds)
        ),
        contest.window().describe_at(now),
    ];
    if let Some(creator) = &contest.creator_username {
        lines.push(format!("Creator:  {creator}"));
    }
    if !contest.genres.is_empty() {
        let genres: Vec<&str> = contest.genres.iter().map(|g| g.name.as_str()).collect();
        lines.push(format!("Genres:   {}", genres.join(", ")));
    }
    if !contest.description.is_empty() {
        lines.push(String::new());
        lines.push(contest.description.clone());
    }
    lines
}

fn problem_line(index: usize, problem: &ContestProblem) -> String {
    let order = problem
        .order
        .map_or_else(|| (index + 1).to_string(), |order| order.to_string());
    match problem.points {
        Some(points) => format!("{order}. {} ({points} pts)", problem.title),
        None => format!("{order}. {}", problem.title),
    }
}

fn leaderboard_line(index: usize, entry: &LeaderboardEntry) -> String {
    let rank = entry
        .rank
        .map_or_else(|| (index + 1).to_string(), |rank| rank.to_string());
    let score = entry
        .score
        .map_or_else(|| "-".to_string(), |score| score.to_string());
    format!("{rank}. {} {score}", entry.username)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{ApiClient, ApiConfig},
        session::MemoryRepository,
    };
    use secrecy::SecretString;
    use serde_json::{json, Value};
    use std::net::TcpListener;
    use time::macros::datetime;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn contest(duration: Value) -> Result<Contest> {
        Ok(serde_json::from_value(json!({
            "id": 7,
            "name": "Weekly Round 12",
            "description": "Ten problems",
            "starting_time": "2025-03-01T12:00:00Z",
            "duration": duration,
            "genres": [{"id": 1, "name": "math"}, {"id": 2, "name": "logic"}],
            "creator_username": "ada"
        }))?)
    }

    async fn logged_in(server: &MockServer) -> Result<SessionStore<MemoryRepository>> {
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access": "access-1",
                "refresh": "refresh-1",
                "username": "ada"
            })))
            .mount(server)
            .await;
        let api = ApiClient::new(ApiConfig::new(&server.uri(), None)?)?;
        let store = SessionStore::new(api, MemoryRepository::new());
        store
            .login("ada", &SecretString::from("pw".to_string()))
            .await?;
        Ok(store)
    }

    #[test]
    fn contest_line_shows_countdown() -> Result<()> {
        let contest = contest(json!(5400))?;
        assert_eq!(
            contest_line(&contest, datetime!(2025-03-01 13:00 UTC)),
            "#7 Weekly Round 12 (1h 30m) Ends in 0h 30m"
        );
        assert_eq!(
            contest_line(&contest, datetime!(2025-03-01 11:50 UTC)),
            "#7 Weekly Round 12 (1h 30m) Starts in 0h 10m"
        );
        assert_eq!(
            contest_line(&contest, datetime!(2025-03-02 00:00 UTC)),
            "#7 Weekly Round 12 (1h 30m) Completed"
        );
        Ok(())
    }

    #[test]
    fn details_list_genres_and_creator() -> Result<()> {
        let contest = contest(json!("01:30:00"))?;
        let lines = detail_lines(&contest, datetime!(2025-03-01 12:30 UTC));
        assert!(lines.contains(&"Status:   active".to_string()));
        assert!(lines.contains(&"Starts:   2025-03-01T12:00:00Z".to_string()));
        assert!(lines.contains(&"Genres:   math, logic".to_string()));
        assert!(lines.contains(&"Creator:  ada".to_string()));
        assert_eq!(lines.last(), Some(&"Ten problems".to_string()));
        assert_eq!(lines.first(), Some(&"#7 Weekly Round 12".to_string()));
        Ok(())
    }

    #[test]
    fn registered_contests_are_tagged() -> Result<()> {
        let mut contest = contest(json!(3600))?;
        contest.is_registered = Some(true);
        let now = datetime!(2025-03-01 11:00 UTC);
        assert_eq!(
            contest_line(&contest, now),
            "#7 Weekly Round 12 [registered] (1h 0m) Starts in 1h 0m"
        );
        assert_eq!(
            detail_lines(&contest, now).first(),
            Some(&"#7 Weekly Round 12 [registered]".to_string())
        );

        contest.is_registered = Some(false);
        assert_eq!(
            contest_line(&contest, now),
            "#7 Weekly Round 12 (1h 0m) Starts in 1h 0m"
        );
        Ok(())
    }

    #[test]
    fn leaderboard_falls_back_to_position() -> Result<()> {
        let entry: LeaderboardEntry =
            serde_json::from_value(json!({"username": "ada", "score": 30.0}))?;
        assert_eq!(leaderboard_line(2, &entry), "3. ada 30");
        let entry: LeaderboardEntry =
            serde_json::from_value(json!({"username": "bob", "rank": 1}))?;
        assert_eq!(leaderboard_line(5, &entry), "1. bob -");
        Ok(())
    }

    #[tokio::test]
    async fn list_mentions_next_page() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping list_mentions_next_page: cannot bind localhost");
            return Ok(());
        }

        let server = MockServer::start().await;
        let store = logged_in(&server).await?;
        Mock::given(method("GET"))
            .and(path("/contest/list/active/"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "next": "http://localhost:8000/contest/list/active/?page=2",
                "previous": null,
                "results": [{
                    "id": 7,
                    "name": "Weekly Round 12",
                    "starting_time": "2025-03-01T12:00:00Z",
                    "duration": 3600
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let lines = run(
            &store,
            Command::List {
                kind: ContestListKind::Active,
                page: 1,
            },
            datetime!(2025-03-01 12:30 UTC),
        )
        .await?;
        assert_eq!(
            lines,
            vec![
                "#7 Weekly Round 12 (1h 0m) Ends in 0h 30m",
                "More results: --page 2"
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn rank_defaults_to_current_user() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping rank_defaults_to_current_user: cannot bind localhost");
            return Ok(());
        }

        let server = MockServer::start().await;
        let store = logged_in(&server).await?;
        Mock::given(method("GET"))
            .and(path("/contest/leaderboard/7/user/ada/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "username": "ada",
                "score": 42,
                "rank": 3
            })))
            .expect(1)
            .mount(&server)
            .await;

        let lines = run(
            &store,
            Command::Rank {
                contest_id: 7,
                username: None,
            },
            datetime!(2025-03-01 12:30 UTC),
        )
        .await?;
        assert_eq!(lines, vec!["3. ada 42"]);
        Ok(())
    }

    #[tokio::test]
    async fn rank_without_session_needs_a_username() -> Result<()> {
        let api = ApiClient::new(ApiConfig::new("http://127.0.0.1:9", None)?)?;
        let store = SessionStore::new(api, MemoryRepository::new());
        let result = run(
            &store,
            Command::Rank {
                contest_id: 7,
                username: None,
            },
            datetime!(2025-03-01 12:30 UTC),
        )
        .await;
        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn register_prints_server_detail() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping register_prints_server_detail: cannot bind localhost");
            return Ok(());
        }

        let server = MockServer::start().await;
        let store = logged_in(&server).await?;
        Mock::given(method("POST"))
            .and(path("/contest/register/7/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "detail": "Successfully registered for contest: Weekly Round 12"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let lines = run(
            &store,
            Command::Register { contest_id: 7 },
            datetime!(2025-03-01 11:00 UTC),
        )
        .await?;
        assert_eq!(
            lines,
            vec!["Successfully registered for contest: Weekly Round 12"]
        );
        Ok(())
    }
}
