use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::personality::GMArchetype;

pub const LEAGUE_TEAMS: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Conference {
    AFC,
    NFC,
}

impl Conference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conference::AFC => "AFC",
            Conference::NFC => "NFC",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "AFC" => Some(Conference::AFC),
            "NFC" => Some(Conference::NFC),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub team_id: u32,
    pub name: String,
    pub abbreviation: String,
    pub conference: Conference,
    pub division: String,
    pub gm_archetype: GMArchetype,
}

/// Final or in-progress record for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team_id: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: u32,
    pub points_against: u32,
    /// Positive for a winning streak, negative for a losing streak
    pub streak: i32,
}

impl TeamStanding {
    pub fn new(team_id: u32) -> Self {
        Self { team_id, wins: 0, losses: 0, ties: 0, points_for: 0, points_against: 0, streak: 0 }
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// Ties count as half a win.
    pub fn win_pct(&self) -> f64 {
        let games = self.games_played();
        if games == 0 {
            return 0.0;
        }
        (self.wins as f64 + 0.5 * self.ties as f64) / games as f64
    }

    pub fn point_differential(&self) -> i64 {
        self.points_for as i64 - self.points_against as i64
    }
}

/// Where a team sits in the playoff picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayoffPosition {
    Contender,
    Bubble,
    Eliminated,
}

/// Snapshot of one team's season situation, rebuilt for each evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamContext {
    pub team_id: u32,
    pub season: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub streak: i32,
    pub cap_space: i64,
    pub playoff_position: PlayoffPosition,
    pub last_trade_date: Option<NaiveDate>,
}

impl TeamContext {
    /// Context for a team with no games played.
    pub fn neutral(team_id: u32, season: u32, cap_space: i64) -> Self {
        Self {
            team_id,
            season,
            wins: 0,
            losses: 0,
            ties: 0,
            streak: 0,
            cap_space,
            playoff_position: PlayoffPosition::Bubble,
            last_trade_date: None,
        }
    }

    pub fn losing_streak(&self) -> u32 {
        if self.streak < 0 {
            self.streak.unsigned_abs()
        } else {
            0
        }
    }

    pub fn is_contender(&self) -> bool {
        self.playoff_position == PlayoffPosition::Contender
    }

    pub fn days_since_last_trade(&self, today: NaiveDate) -> Option<i64> {
        self.last_trade_date.map(|d| (today - d).num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_pct_counts_ties_as_half() {
        let standing = TeamStanding { wins: 8, losses: 8, ties: 1, ..TeamStanding::new(1) };
        assert!((standing.win_pct() - 8.5 / 17.0).abs() < 1e-9);
        assert_eq!(TeamStanding::new(2).win_pct(), 0.0);
    }

    #[test]
    fn test_losing_streak() {
        let mut ctx = TeamContext::neutral(4, 2025, 10_000_000);
        ctx.streak = -4;
        assert_eq!(ctx.losing_streak(), 4);
        ctx.streak = 2;
        assert_eq!(ctx.losing_streak(), 0);
    }
}
