use serde::{Deserialize, Serialize};

/// One team's row in a circuit standings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub id: String,
    pub name: String,
    pub logo: String,
    /// 1-based position in the source listing.
    pub rank: u32,
    pub points: u32,
    pub country: String,
}

/// The standings for one regional circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitStanding {
    pub region: String,
    pub teams: Vec<TeamStanding>,
}

/// Championship-points standings for one VCT year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standings {
    pub year: i32,
    pub circuits: Vec<CircuitStanding>,
}
