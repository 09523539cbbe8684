#![allow(clippy::unwrap_used, clippy::expect_used)]

use contestant::{
    api::{ApiClient, ApiConfig, ApiError},
    contest::{client, ContestListKind, ContestStatus},
    session::{MemoryRepository, SessionStore},
};
use secrecy::SecretString;
use serde_json::json;
use std::net::TcpListener;
use time::macros::datetime;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

async fn logged_in(server: &MockServer) -> SessionStore<MemoryRepository> {
    Mock::given(method("POST"))
        .and(path("/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "access-1",
            "refresh": "refresh-1",
            "username": "ada"
        })))
        .mount(server)
        .await;

    let api = ApiClient::new(ApiConfig::new(&server.uri(), None).unwrap()).unwrap();
    let store = SessionStore::new(api, MemoryRepository::new());
    store
        .login("ada", &SecretString::from("pw".to_string()))
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn listing_classifies_each_contest() -> anyhow::Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping listing_classifies_each_contest: cannot bind localhost");
        return Ok(());
    }

    let server = MockServer::start().await;
    let store = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/contest/list/future/"))
        .and(query_param("page", "1"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "name": "Warmup",
                "starting_time": "2025-03-01T12:00:00Z",
                "duration": "01:00:00"
            },
            {
                "id": 2,
                "name": "Marathon",
                "starting_time": "2025-03-01T10:00:00+00:00",
                "duration": 86400
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let page = client::list_contests(&store, ContestListKind::Future, 1).await?;
    assert_eq!(page.count, Some(2));

    let now = datetime!(2025-03-01 11:50 UTC);
    let warmup = &page.results[0];
    assert_eq!(warmup.status_at(now), ContestStatus::Upcoming);
    assert_eq!(warmup.window().describe_at(now), "Starts in 0h 10m");

    let marathon = &page.results[1];
    assert_eq!(marathon.status_at(now), ContestStatus::Active);
    assert_eq!(marathon.window().describe_at(now), "Ends in 22h 10m");
    Ok(())
}

#[tokio::test]
async fn unregistered_user_gets_registration_message() -> anyhow::Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping unregistered_user_gets_registration_message: cannot bind localhost");
        return Ok(());
    }

    let server = MockServer::start().await;
    let store = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/contest/problems/list/7/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "detail": "You do not have permission to perform this action."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client::contest_problems(&store, 7).await.unwrap_err();
    assert_eq!(
        err.detail(),
        "You must be registered for this contest to view problems."
    );
    assert!(matches!(err, ApiError::Validation { status: 403, .. }));
    // forbidden is not an auth failure, the session stays
    assert!(store.session().is_some());
    Ok(())
}

#[tokio::test]
async fn registration_round_trip() -> anyhow::Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping registration_round_trip: cannot bind localhost");
        return Ok(());
    }

    let server = MockServer::start().await;
    let store = logged_in(&server).await;
    Mock::given(method("POST"))
        .and(path("/contest/register/7/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "detail": "Successfully registered for contest: Weekly"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/contest/unregister/7/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Cannot unregister after contest has started"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registered = client::register(&store, 7).await?;
    assert_eq!(
        registered.detail.as_deref(),
        Some("Successfully registered for contest: Weekly")
    );

    let err = client::unregister(&store, 7).await.unwrap_err();
    assert_eq!(err.detail(), "Cannot unregister after contest has started");
    Ok(())
}

#[tokio::test]
async fn submit_returns_evaluation_and_leaderboard_follows() -> anyhow::Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping submit_returns_evaluation_and_leaderboard_follows: cannot bind localhost");
        return Ok(());
    }

    let server = MockServer::start().await;
    let store = logged_in(&server).await;
    Mock::given(method("POST"))
        .and(path("/contest/7/problems/1/submit/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "correct": true,
            "score": 100
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contest/leaderboard/7/top/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"username": "ada", "score": 100, "rank": 1},
            {"username": "bob", "score": 40, "rank": 2}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let evaluation = client::submit_answer(&store, 7, 1, "42").await?;
    assert_eq!(evaluation["correct"], json!(true));

    let board = client::leaderboard(&store, 7).await?;
    assert_eq!(board.len(), 2);
    assert_eq!(board[0].username, "ada");
    assert_eq!(board[0].score, Some(100.0));
    Ok(())
}

#[tokio::test]
async fn remove_problem_sends_authorized_delete() -> anyhow::Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping remove_problem_sends_authorized_delete: cannot bind localhost");
        return Ok(());
    }

    let server = MockServer::start().await;
    let store = logged_in(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/contest/problems/remove/7/12/"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "detail": "Problem removed from contest."
        })))
        .expect(1)
        .mount(&server)
        .await;

    client::remove_problem(&store, 7, 12).await?;
    Ok(())
}

#[tokio::test]
async fn remove_problem_surfaces_server_detail() -> anyhow::Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping remove_problem_surfaces_server_detail: cannot bind localhost");
        return Ok(());
    }

    let server = MockServer::start().await;
    let store = logged_in(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/contest/problems/remove/7/99/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "detail": "Problem not found in this contest."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client::remove_problem(&store, 7, 99).await.unwrap_err();
    assert_eq!(err.to_string(), "Problem not found in this contest.");
    Ok(())
}

#[tokio::test]
async fn user_rank_encodes_username_as_one_segment() -> anyhow::Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping user_rank_encodes_username_as_one_segment: cannot bind localhost");
        return Ok(());
    }

    let server = MockServer::start().await;
    let store = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/contest/leaderboard/7/user/a%2Fb%3F/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "a/b?",
            "score": 10,
            "rank": 4
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entry = client::user_rank(&store, 7, "a/b?").await?;
    assert_eq!(entry.username, "a/b?");
    assert_eq!(entry.rank, Some(4));
    Ok(())
}

#[tokio::test]
async fn logged_out_calls_fail_without_network() -> anyhow::Result<()> {
    // nothing listens on the discard port; an attempted request would be a Network error
    let api = ApiClient::new(ApiConfig::new("http://127.0.0.1:9", None)?)?;
    let store = SessionStore::new(api, MemoryRepository::new());

    let err = client::contest_details(&store, 7).await.unwrap_err();
    assert!(err.is_auth());
    Ok(())
}
