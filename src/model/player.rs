use serde::{Deserialize, Serialize};

/// Per-agent performance statistics from a player's overview table.
///
/// All numeric fields go through the lossy text-to-number conversion, so a
/// `0` can mean either a genuine zero or upstream garbage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    pub name: String,
    pub img: String,
    pub count: i64,
    pub percent: f64,
    pub rounds: i64,
    pub rating: f64,
    pub acs: f64,
    pub kd: f64,
    pub adr: f64,
    pub kast: f64,
    pub kpr: f64,
    pub apr: f64,
    pub fkpr: f64,
    pub fdpr: f64,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub first_kills: i64,
    pub first_deaths: i64,
}

/// A team reference from a player's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerTeam {
    pub id: String,
    pub name: String,
    pub img: String,
}

/// Complete player profile data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    /// In-game alias; always present on a profile page.
    pub alias: String,
    pub name: String,
    pub img: String,
    pub country: String,
    pub twitter: Option<String>,
    pub twitch: Option<String>,
    pub current_team: Option<PlayerTeam>,
    pub past_teams: Vec<PlayerTeam>,
    pub total_winnings: Option<f64>,
    pub agents: Vec<AgentStats>,
}
