use serde::{Deserialize, Serialize};

use super::Position;

/// A selection right in one draft. Consumed exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPick {
    pub pick_id: String,
    /// Draft year
    pub season: u32,
    pub round: u32,
    pub original_team_id: u32,
    pub current_team_id: u32,
    /// Known once the draft order is set
    pub overall_pick: Option<u32>,
    pub used_by_player_id: Option<String>,
}

impl DraftPick {
    pub fn new(season: u32, round: u32, team_id: u32) -> Self {
        Self {
            pick_id: Self::make_id(season, round, team_id),
            season,
            round,
            original_team_id: team_id,
            current_team_id: team_id,
            overall_pick: None,
            used_by_player_id: None,
        }
    }

    pub fn make_id(season: u32, round: u32, original_team_id: u32) -> String {
        format!("pick_{}_r{}_t{}", season, round, original_team_id)
    }

    pub fn is_used(&self) -> bool {
        self.used_by_player_id.is_some()
    }

    pub fn description(&self) -> String {
        match self.overall_pick {
            Some(overall) => format!("{} round {} (#{})", self.season, self.round, overall),
            None => format!("{} round {}", self.season, self.round),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftProspect {
    pub prospect_id: String,
    pub season: u32,
    pub first_name: String,
    pub last_name: String,
    pub position: Position,
    pub overall: u8,
    pub potential: u8,
    pub age: u8,
    pub projected_round: u32,
    pub drafted: bool,
}

impl DraftProspect {
    pub fn upside(&self) -> u8 {
        self.potential.saturating_sub(self.overall)
    }
}
