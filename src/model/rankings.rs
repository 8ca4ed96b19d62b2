use serde::{Deserialize, Serialize};

/// One team's position in a regional ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRanking {
    pub id: String,
    pub name: String,
    pub logo: String,
    /// Positional rank from the source listing, not recomputed.
    pub rank: u32,
    pub points: u32,
    pub country: String,
}

/// The ranking table for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub region: String,
    pub teams: Vec<TeamRanking>,
}
