use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A member of a team's current roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterMember {
    pub id: String,
    pub alias: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub img: String,
}

/// A match a team has yet to play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamUpcomingMatch {
    pub id: String,
    pub event: String,
    pub stage: String,
    pub opponent: String,
    pub eta: String,
    pub date: DateTime<Utc>,
}

/// A match a team has finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamCompletedMatch {
    pub id: String,
    pub event: String,
    pub stage: String,
    pub opponent: String,
    pub score: String,
    pub date: DateTime<Utc>,
}

/// Complete team profile data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    /// Lowercased, whitespace-collapsed form used as the upsert key.
    pub normalized_name: String,
    pub tag: String,
    pub img: String,
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub country: String,
    pub rank: u32,
    pub region: String,
    pub roster: Vec<RosterMember>,
    pub upcoming: Vec<TeamUpcomingMatch>,
    pub completed: Vec<TeamCompletedMatch>,
}
