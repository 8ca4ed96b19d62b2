use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

use super::matches::MatchStatus;

/// The current status of an event.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Completed,
    Ongoing,
    Upcoming,
    #[default]
    #[strum(disabled)]
    Unknown,
}

/// A single esports event (tournament/league) as shown on the events page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub status: EventStatus,
    pub prize: String,
    pub dates: String,
    pub location: String,
    pub img: String,
}

/// The team credited with a prize-table position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeTeam {
    pub id: String,
    pub name: String,
    pub img: String,
    pub country: String,
}

/// A single row of an event's prize breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    pub position: String,
    pub prize: String,
    pub team: Option<PrizeTeam>,
}

/// A team participating in an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTeam {
    pub id: String,
    pub name: String,
    pub img: String,
    pub seed: Option<String>,
}

/// One side of a match as shown on an event's match list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMatchTeam {
    pub name: String,
    pub region: String,
    /// `None` until the game has actually started; zero and "not yet
    /// played" are distinct states.
    pub score: Option<u32>,
}

/// A match belonging to an event, as listed on the event's matches page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMatch {
    pub id: String,
    pub status: MatchStatus,
    /// UTC start time; `None` when VLR only shows "TBD".
    pub time: Option<DateTime<Utc>>,
    pub eta: Option<String>,
    pub teams: Vec<EventMatchTeam>,
    pub round: String,
    pub stage: String,
}

/// One row of an event's group/standings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventStanding {
    pub group: Option<String>,
    pub logo: String,
    pub team: String,
    pub country: String,
    pub wins: i64,
    pub losses: i64,
    pub ties: i64,
    pub map_difference: i64,
    pub round_difference: i64,
    pub round_delta: i64,
}

/// Full detail for one event, including its match list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetail {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub dates: String,
    pub prize: String,
    pub location: String,
    pub status: EventStatus,
    pub img: String,
    pub prizes: Vec<Prize>,
    pub teams: Vec<EventTeam>,
    pub matches: Vec<EventMatch>,
    pub standings: Vec<EventStanding>,
}
