//! # Contestant
//!
//! Client for a contest-hosting API: log in, browse and register for contests,
//! solve problems, and follow leaderboards. The server owns scheduling,
//! evaluation, scoring and token issuance; this crate keeps the client side of
//! the bargain small and testable.
//!
//! ## Core pieces
//!
//! - [`session::SessionStore`] persists the bearer and refresh tokens plus the
//!   cached user through an injectable [`session::SessionRepository`], and runs
//!   every authenticated call through a single refresh-and-retry.
//! - [`contest::ContestWindow`] derives `upcoming / active / completed` and the
//!   remaining time from a contest's start instant and duration in seconds.
//! - [`api::ApiClient`] normalizes every failure into [`api::ApiError`], which
//!   always carries a `detail` message.
//!
//! The `contestant` binary in `src/bin` is a thin command line front end over
//! these modules.

pub mod api;
pub mod cli;
pub mod contest;
pub mod problem;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
