//! Problem bank and practice submissions outside of contests.

use crate::{
    api::ApiError,
    contest::{
        types::{Listing, Page},
        Genre,
    },
    session::{SessionRepository, SessionStore},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Problem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub genre: Vec<Genre>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize)]
pub struct NewProblem {
    pub title: String,
    pub question: String,
    pub answer: String,
    pub genre_ids: Vec<i64>,
}

/// A practice submission; the server grades it asynchronously and reports
/// `evaluation_status` such as `Correct`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, alias = "answer")]
    pub content: Option<String>,
    #[serde(default)]
    pub evaluation_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize)]
struct ContentRequest<'a> {
    content: &'a str,
}

/// # Errors
/// Returns the normalized API error.
#[instrument(skip(store))]
pub async fn list_problems<R: SessionRepository>(
    store: &SessionStore<R>,
    page: u32,
) -> Result<Page<Problem>, ApiError> {
    let listing: Listing<Problem> = store
        .get_authorized_with_query(
            "/problem/list/",
            &[("page", page)],
            "An error occurred while fetching problems",
        )
        .await?;
    Ok(listing.into())
}

/// # Errors
/// Returns the normalized API error; field errors surface as `Validation`.
#[instrument(skip(store, problem), fields(title = %problem.title))]
pub async fn create_problem<R: SessionRepository>(
    store: &SessionStore<R>,
    problem: &NewProblem,
) -> Result<Problem, ApiError> {
    store
        .post_authorized("/problem/create/", problem, "Failed to create problem")
        .await
}

/// # Errors
/// Returns the normalized API error.
#[instrument(skip(store, answer))]
pub async fn submit<R: SessionRepository>(
    store: &SessionStore<R>,
    problem_id: i64,
    answer: &str,
) -> Result<Submission, ApiError> {
    store
        .post_authorized(
            &format!("/problem/submission/create/{problem_id}/"),
            &ContentRequest { content: answer },
            "An error occurred while submitting the answer",
        )
        .await
}

/// # Errors
/// Returns the normalized API error.
#[instrument(skip(store))]
pub async fn submissions<R: SessionRepository>(
    store: &SessionStore<R>,
    problem_id: i64,
) -> Result<Vec<Submission>, ApiError> {
    let listing: Listing<Submission> = store
        .get_authorized(
            &format!("/problem/submission/list/{problem_id}/"),
            "An error occurred while fetching submissions",
        )
        .await?;
    Ok(Page::from(listing).results)
}
