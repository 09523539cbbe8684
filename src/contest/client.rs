//! Client wrappers for the contest endpoints. Every call is bearer
//! authenticated and goes through `SessionStore` so a stale access token is
//! refreshed once before the call is retried.

use crate::{
    api::ApiError,
    contest::types::{
        Contest, ContestListKind, ContestProblem, DetailResponse, LeaderboardEntry, Listing,
        NewContest, Page,
    },
    session::{SessionRepository, SessionStore},
};
use serde::{de::IgnoredAny, Serialize};
use serde_json::Value;
use tracing::instrument;
use url::Url;

const REGISTRATION_REQUIRED_DETAIL: &str =
    "You must be registered for this contest to view problems.";

#[derive(Serialize)]
struct AnswerRequest<'a> {
    answer: &'a str,
}

#[derive(Serialize)]
struct AddProblemsRequest<'a> {
    problem_ids: &'a [i64],
}

#[derive(Serialize)]
struct EmptyBody {}

/// Lists future, active or completed contests.
///
/// # Errors
/// Returns the normalized API error.
#[instrument(skip(store))]
pub async fn list_contests<R: SessionRepository>(
    store: &SessionStore<R>,
    kind: ContestListKind,
    page: u32,
) -> Result<Page<Contest>, ApiError> {
    let path = format!("/contest/list/{}/", kind.as_str());
    let listing: Listing<Contest> = store
        .get_authorized_with_query(
            &path,
            &[("page", page)],
            "An error occurred while fetching contests",
        )
        .await?;
    Ok(listing.into())
}

/// # Errors
/// Returns the normalized API error.
#[instrument(skip(store))]
pub async fn contest_details<R: SessionRepository>(
    store: &SessionStore<R>,
    contest_id: i64,
) -> Result<Contest, ApiError> {
    store
        .get_authorized(
            &format!("/contest/{contest_id}/"),
            "An error occurred while fetching contest details",
        )
        .await
}

/// Creates a contest; `contest.duration` is in seconds.
///
/// # Errors
/// Returns the normalized API error; field errors surface as `Validation`.
#[instrument(skip(store, contest), fields(name = %contest.name))]
pub async fn create_contest<R: SessionRepository>(
    store: &SessionStore<R>,
    contest: &NewContest,
) -> Result<Contest, ApiError> {
    store
        .post_authorized("/contest/create/", contest, "Failed to create contest")
        .await
}

/// # Errors
/// Returns the normalized API error.
#[instrument(skip(store))]
pub async fn delete_contest<R: SessionRepository>(
    store: &SessionStore<R>,
    contest_id: i64,
) -> Result<(), ApiError> {
    let _: IgnoredAny = store
        .delete_authorized::<EmptyBody, _>(
            &format!("/contest/delete/{contest_id}/"),
            None,
            "An error occurred while deleting contest",
        )
        .await?;
    Ok(())
}

/// Registers the current user; the server refuses once the contest started.
///
/// # Errors
/// Returns the normalized API error.
#[instrument(skip(store))]
pub async fn register<R: SessionRepository>(
    store: &SessionStore<R>,
    contest_id: i64,
) -> Result<DetailResponse, ApiError> {
    store
        .post_authorized(
            &format!("/contest/register/{contest_id}/"),
            &EmptyBody {},
            "An error occurred while registering for contest",
        )
        .await
}

/// # Errors
/// Returns the normalized API error.
#[instrument(skip(store))]
pub async fn unregister<R: SessionRepository>(
    store: &SessionStore<R>,
    contest_id: i64,
) -> Result<DetailResponse, ApiError> {
    store
        .post_authorized(
            &format!("/contest/unregister/{contest_id}/"),
            &EmptyBody {},
            "An error occurred while unregistering from contest",
        )
        .await
}

/// Problems of a contest; only registered users may list them.
///
/// # Errors
/// A 403 maps to a registration-required `Validation` error.
#[instrument(skip(store))]
pub async fn contest_problems<R: SessionRepository>(
    store: &SessionStore<R>,
    contest_id: i64,
) -> Result<Page<ContestProblem>, ApiError> {
    let result: Result<Listing<ContestProblem>, ApiError> = store
        .get_authorized(
            &format!("/contest/problems/list/{contest_id}/"),
            "An error occurred while fetching contest problems",
        )
        .await;

    match result {
        Ok(listing) => Ok(listing.into()),
        Err(ApiError::Validation {
            status: 403,
            payload,
            ..
        }) => Err(ApiError::Validation {
            status: 403,
            detail: REGISTRATION_REQUIRED_DETAIL.to_string(),
            payload,
        }),
        Err(err) => Err(err),
    }
}

/// # Errors
/// Returns the normalized API error.
#[instrument(skip(store))]
pub async fn contest_problem<R: SessionRepository>(
    store: &SessionStore<R>,
    contest_id: i64,
    order: u32,
) -> Result<ContestProblem, ApiError> {
    store
        .get_authorized(
            &format!("/contest/{contest_id}/problems/{order}/"),
            "An error occurred while fetching the problem",
        )
        .await
}

/// Adds existing problems to a contest the current user created.
///
/// # Errors
/// Returns the normalized API error.
#[instrument(skip(store))]
pub async fn add_problems<R: SessionRepository>(
    store: &SessionStore<R>,
    contest_id: i64,
    problem_ids: &[i64],
) -> Result<DetailResponse, ApiError> {
    store
        .post_authorized(
            &format!("/contest/problems/add/{contest_id}/"),
            &AddProblemsRequest { problem_ids },
            "An error occurred while adding problems",
        )
        .await
}

/// Detaches a problem from a contest the current user created.
///
/// # Errors
/// Returns the normalized API error.
#[instrument(skip(store))]
pub async fn remove_problem<R: SessionRepository>(
    store: &SessionStore<R>,
    contest_id: i64,
    problem_id: i64,
) -> Result<(), ApiError> {
    let _: IgnoredAny = store
        .delete_authorized::<EmptyBody, _>(
            &format!("/contest/problems/remove/{contest_id}/{problem_id}/"),
            None,
            "An error occurred while removing the problem",
        )
        .await?;
    Ok(())
}

/// Submits an answer; the evaluation payload is returned as-is.
///
/// # Errors
/// Returns the normalized API error.
#[instrument(skip(store, answer))]
pub async fn submit_answer<R: SessionRepository>(
    store: &SessionStore<R>,
    contest_id: i64,
    order: u32,
    answer: &str,
) -> Result<Value, ApiError> {
    store
        .post_authorized(
            &format!("/contest/{contest_id}/problems/{order}/submit/"),
            &AnswerRequest { answer },
            "An error occurred while submitting the answer",
        )
        .await
}

/// # Errors
/// Returns the normalized API error.
#[instrument(skip(store))]
pub async fn leaderboard<R: SessionRepository>(
    store: &SessionStore<R>,
    contest_id: i64,
) -> Result<Vec<LeaderboardEntry>, ApiError> {
    let listing: Listing<LeaderboardEntry> = store
        .get_authorized(
            &format!("/contest/leaderboard/{contest_id}/top/"),
            "An error occurred while fetching the leaderboard",
        )
        .await?;
    Ok(Page::from(listing).results)
}

/// # Errors
/// Returns the normalized API error.
#[instrument(skip(store))]
pub async fn user_rank<R: SessionRepository>(
    store: &SessionStore<R>,
    contest_id: i64,
    username: &str,
) -> Result<LeaderboardEntry, ApiError> {
    let username = path_segment(username)?;
    store
        .get_authorized(
            &format!("/contest/leaderboard/{contest_id}/user/{username}/"),
            "An error occurred while fetching the user rank",
        )
        .await
}

/// Percent-encodes `raw` as a single URL path segment.
fn path_segment(raw: &str) -> Result<String, ApiError> {
    let build_error = || ApiError::Unknown {
        detail: "Failed to build request".to_string(),
    };
    let mut url = Url::parse("http://localhost/").map_err(|_| build_error())?;
    url.path_segments_mut()
        .map_err(|()| build_error())?
        .pop_if_empty()
        .push(raw);
    Ok(url.path().trim_start_matches('/').to_string())
}
