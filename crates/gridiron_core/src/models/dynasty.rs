use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::offseason::OffseasonPhase;

/// One save-game. Every persisted row hangs off `dynasty_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dynasty {
    pub dynasty_id: String,
    pub name: String,
    pub user_team_id: u32,
    pub start_season: u32,
    pub created_at: String,
}

impl Dynasty {
    pub fn new(name: impl Into<String>, user_team_id: u32, start_season: u32) -> Self {
        Self {
            dynasty_id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            user_team_id,
            start_season,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_user_team(&self, team_id: u32) -> bool {
        self.user_team_id == team_id
    }
}

/// Date and phase, always written together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynastyState {
    pub dynasty_id: String,
    pub current_date: NaiveDate,
    /// Season whose offseason is running
    pub season: u32,
    pub current_phase: OffseasonPhase,
}
