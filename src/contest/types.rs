//! Contest payloads as the API renders them. `duration` is decoded to whole
//! seconds at this boundary whether the server sends an integer or a Django
//! duration string, so nothing past here deals with mixed units.

use crate::contest::window::{ContestStatus, ContestWindow};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contest {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub starting_time: OffsetDateTime,
    #[serde(rename = "duration", deserialize_with = "deserialize_duration_seconds")]
    pub duration_seconds: u64,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub creator_username: Option<String>,
    /// Whether the current user is registered; only sent on authorized reads.
    #[serde(default)]
    pub is_registered: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Contest {
    #[must_use]
    pub const fn window(&self) -> ContestWindow {
        ContestWindow::new(self.starting_time, self.duration_seconds)
    }

    #[must_use]
    pub fn status_at(&self, now: OffsetDateTime) -> ContestStatus {
        self.window().status_at(now)
    }
}

/// Request body for contest creation. `duration` is sent in seconds.
#[derive(Clone, Debug, Serialize)]
pub struct NewContest {
    pub name: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub starting_time: OffsetDateTime,
    pub duration: u64,
    pub genre_ids: Vec<i64>,
}

/// Which listing endpoint to query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContestListKind {
    Future,
    Active,
    Completed,
}

impl ContestListKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Future => "future",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl std::str::FromStr for ContestListKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "future" | "upcoming" => Ok(Self::Future),
            "active" | "ongoing" => Ok(Self::Active),
            "completed" | "past" => Ok(Self::Completed),
            other => Err(format!("unknown contest list: {other}")),
        }
    }
}

/// One page of a listing. Endpoints without pagination decode into a single
/// page with no neighbours.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub count: Option<u64>,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Paginated {
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    Plain(Vec<T>),
}

impl<T> From<Listing<T>> for Page<T> {
    fn from(listing: Listing<T>) -> Self {
        match listing {
            Listing::Paginated {
                count,
                next,
                previous,
                results,
            } => Self {
                count,
                next,
                previous,
                results,
            },
            Listing::Plain(results) => Self {
                count: u64::try_from(results.len()).ok(),
                next: None,
                previous: None,
                results,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ContestProblem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub rank: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Bodies such as `{"detail": "Successfully registered for contest: X"}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct DetailResponse {
    #[serde(default)]
    pub detail: Option<String>,
}

fn deserialize_duration_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Fractional(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seconds(seconds) => Ok(seconds),
        Raw::Fractional(seconds) if seconds.is_finite() && seconds >= 0.0 => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let whole = seconds.trunc() as u64;
            Ok(whole)
        }
        Raw::Fractional(seconds) => Err(de::Error::custom(format!(
            "invalid duration: {seconds}"
        ))),
        Raw::Text(text) => parse_duration_text(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid duration: {text}"))),
    }
}

/// Parses Django's duration rendering, `[D ]HH:MM:SS[.ffffff]`, as well as
/// `MM:SS` and a bare number of seconds. Fractions of a second are dropped;
/// negative durations are rejected.
#[must_use]
pub fn parse_duration_text(text: &str) -> Option<u64> {
    let text = text.trim();
    let (days, clock) = match text.rsplit_once(' ') {
        Some((days, clock)) => {
            // "1 02:00:00" or Python's "1 day, 02:00:00"
            let days = days.split_whitespace().next()?.parse::<u64>().ok()?;
            (days, clock)
        }
        None => (0, text),
    };

    let mut parts = clock.split(':').rev();
    let seconds = parse_whole_seconds(parts.next()?)?;
    let minutes = parts.next().map(str::parse::<u64>).transpose().ok()?.unwrap_or(0);
    let hours = parts.next().map(str::parse::<u64>).transpose().ok()?.unwrap_or(0);
    if parts.next().is_some() {
        return None;
    }

    days.checked_mul(86_400)?
        .checked_add(hours.checked_mul(3600)?)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

fn parse_whole_seconds(raw: &str) -> Option<u64> {
    let whole = raw.split_once('.').map_or(raw, |(whole, _)| whole);
    whole.parse().ok()
}
