//! Contest lifecycle derived from a start instant and a duration in seconds.
//! Nothing here is cached: every answer is recomputed against the `now` the
//! caller passes, and the client's clock is trusted as-is.
//!
//! The window is half-open, `[start, start + duration)`. A zero-length contest
//! is never active; its start instant already counts as completed.

use serde::Serialize;
use std::fmt;
use time::{Duration, OffsetDateTime};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContestStatus {
    Upcoming,
    Active,
    Completed,
}

impl ContestStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ContestStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Lifecycle state together with the time left until the next transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowPhase {
    Upcoming { starts_in: Duration },
    Active { ends_in: Duration },
    Completed,
}

impl WindowPhase {
    #[must_use]
    pub const fn status(&self) -> ContestStatus {
        match self {
            Self::Upcoming { .. } => ContestStatus::Upcoming,
            Self::Active { .. } => ContestStatus::Active,
            Self::Completed => ContestStatus::Completed,
        }
    }

    #[must_use]
    pub const fn remaining(&self) -> Option<Duration> {
        match self {
            Self::Upcoming { starts_in } => Some(*starts_in),
            Self::Active { ends_in } => Some(*ends_in),
            Self::Completed => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContestWindow {
    start: OffsetDateTime,
    duration_seconds: u64,
}

impl ContestWindow {
    #[must_use]
    pub const fn new(start: OffsetDateTime, duration_seconds: u64) -> Self {
        Self {
            start,
            duration_seconds,
        }
    }

    #[must_use]
    pub const fn start(&self) -> OffsetDateTime {
        self.start
    }

    #[must_use]
    pub const fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    /// End of the window, or `None` when it lies beyond the representable range
    /// (such a window never closes).
    #[must_use]
    pub fn end(&self) -> Option<OffsetDateTime> {
        let seconds = i64::try_from(self.duration_seconds).ok()?;
        self.start.checked_add(Duration::seconds(seconds))
    }

    #[must_use]
    pub fn phase_at(&self, now: OffsetDateTime) -> WindowPhase {
        if now < self.start {
            return WindowPhase::Upcoming {
                starts_in: self.start - now,
            };
        }

        match self.end() {
            Some(end) if now >= end => WindowPhase::Completed,
            Some(end) => WindowPhase::Active { ends_in: end - now },
            None => WindowPhase::Active {
                ends_in: Duration::MAX,
            },
        }
    }

    #[must_use]
    pub fn status_at(&self, now: OffsetDateTime) -> ContestStatus {
        self.phase_at(now).status()
    }

    #[must_use]
    pub fn status(&self) -> ContestStatus {
        self.status_at(OffsetDateTime::now_utc())
    }

    /// Time until start (upcoming) or end (active); `None` once completed.
    #[must_use]
    pub fn remaining_at(&self, now: OffsetDateTime) -> Option<Duration> {
        self.phase_at(now).remaining()
    }

    /// One-line description such as `Starts in 0h 10m` or `Ends in 1h 30m`.
    #[must_use]
    pub fn describe_at(&self, now: OffsetDateTime) -> String {
        match self.phase_at(now) {
            WindowPhase::Upcoming { starts_in } => {
                format!("Starts in {}", format_hours_minutes(starts_in))
            }
            WindowPhase::Active { ends_in } => {
                format!("Ends in {}", format_hours_minutes(ends_in))
            }
            WindowPhase::Completed => "Completed".to_string(),
        }
    }

    #[must_use]
    pub fn describe(&self) -> String {
        self.describe_at(OffsetDateTime::now_utc())
    }
}

/// Renders whole hours and truncated whole minutes, always with the hour part:
/// 90 minutes is `1h 30m`, 10 minutes is `0h 10m`. Negative spans render as zero.
#[must_use]
pub fn format_hours_minutes(span: Duration) -> String {
    let minutes = span.whole_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Same format as [`format_hours_minutes`] for a duration in seconds.
#[must_use]
pub fn format_duration_seconds(seconds: u64) -> String {
    let minutes = seconds / 60;
    format!("{}h {}m", minutes / 60, minutes % 60)
}
