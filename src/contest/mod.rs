//! Contests: payload types, the lifecycle window calculator, and endpoint
//! wrappers.

pub mod client;
pub mod types;
pub mod window;

pub use types::{Contest, ContestListKind, ContestProblem, Genre, LeaderboardEntry, NewContest, Page};
pub use window::{
    format_duration_seconds, format_hours_minutes, ContestStatus, ContestWindow, WindowPhase,
};
