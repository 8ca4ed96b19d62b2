use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

/// Lifecycle state of a match, taken verbatim from upstream text.
///
/// `Tbd` means "start time unknown" rather than a distinct lifecycle stage;
/// VLR uses it interchangeably with upcoming for unscheduled games.
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
pub enum MatchStatus {
    Upcoming,
    Live,
    Ongoing,
    Completed,
    Tbd,
    #[default]
    #[strum(disabled)]
    Unknown,
}

/// One side of a match in the summary list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchTeam {
    pub name: String,
    /// `None` for games that have not started; never conflated with 0.
    pub score: Option<u32>,
}

/// A match as shown on the site-wide match list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub id: String,
    pub team1: MatchTeam,
    pub team2: MatchTeam,
    pub status: MatchStatus,
    /// UTC start time; `None` when the time is still TBD.
    pub time: Option<DateTime<Utc>>,
    pub event: String,
    /// Backfilled from the name->id lookup table when available.
    pub event_id: Option<String>,
    pub series: String,
}

/// A team as shown in the match detail header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetailTeam {
    pub name: String,
    pub img: String,
}

/// The event block of a match detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: String,
    pub img: String,
    pub series: String,
    pub stage: String,
    pub date: String,
    pub patch: Option<String>,
}

/// A stream or VOD link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchVideos {
    pub streams: Vec<Video>,
    pub vods: Vec<Video>,
}

/// Which slot won a round, inferred from cumulative scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundWinner {
    Team1,
    Team2,
    Unknown,
}

/// Which side the winning team was playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundSide {
    Attack,
    Defense,
}

/// How a round ended, derived from the win-indicator icon filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinType {
    Elimination,
    #[serde(rename = "Time out")]
    TimeOut,
    Defused,
    #[serde(rename = "Spiked out")]
    SpikedOut,
    #[serde(rename = "Not Played")]
    NotPlayed,
}

/// The outcome of a single round within a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub round_number: u32,
    pub round_score: String,
    pub winner: RoundWinner,
    pub side: Option<RoundSide>,
    pub win_type: WinType,
}

/// An agent pick shown on a scoreboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub title: String,
    pub img: String,
}

/// One player's per-map performance statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreboardRow {
    pub name: String,
    pub team: String,
    pub agents: Vec<Agent>,
    pub acs: i64,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub adr: i64,
    pub headshot_percent: i64,
}

/// The score of one team on one map; `None` before the map is played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapTeamScore {
    pub name: String,
    pub score: Option<u32>,
}

/// Round-by-round and scoreboard data for one map of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub map: String,
    pub teams: Vec<MapTeamScore>,
    pub members: Vec<ScoreboardRow>,
    pub rounds: Vec<Round>,
}

/// A past meeting between the two teams of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousEncounter {
    pub match_id: String,
    pub teams: Vec<MatchTeam>,
}

/// Full details of a single match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetail {
    pub id: String,
    pub teams: Vec<MatchDetailTeam>,
    pub score: String,
    pub note: String,
    pub bans: Vec<String>,
    pub event: MatchEvent,
    pub videos: MatchVideos,
    pub data: Vec<MapData>,
    pub previous_encounters: Vec<PreviousEncounter>,
}
