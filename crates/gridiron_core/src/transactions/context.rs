//! Per-day league snapshot and the team contexts derived from it.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::cap::SalaryCapCalculator;
use crate::config::SalaryCapConfig;
use crate::db::{league, transaction_log};
use crate::error::Result;
use crate::models::{PlayoffPosition, TeamContext, TeamStanding};
use crate::offseason::{OffseasonCalendar, OffseasonPhase};

pub const REGULAR_SEASON_GAMES: u32 = 17;
/// Wins that usually earn a playoff berth.
const PLAYOFF_WIN_LINE: u32 = 10;

/// What the transaction manager needs to know about the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueState {
    /// Contract year in force for cap and contract math
    pub season: u32,
    /// Season whose record describes each team's situation
    pub standings_season: u32,
    /// Next draft to be held
    pub draft_season: u32,
    pub trade_deadline: NaiveDate,
    pub trades_open: bool,
    pub user_team_id: Option<u32>,
}

impl LeagueState {
    /// Offseason of `calendar.season()`: the new league year is in force and
    /// teams are judged on the season just finished.
    pub fn offseason(
        calendar: &OffseasonCalendar,
        phase: OffseasonPhase,
        user_team_id: Option<u32>,
    ) -> Self {
        let league_year = calendar.league_year();
        Self {
            season: league_year,
            standings_season: calendar.season(),
            draft_season: league_year,
            trade_deadline: calendar::trade_deadline(league_year),
            trades_open: phase.allows_trades(),
            user_team_id,
        }
    }

    pub fn regular_season(season: u32, user_team_id: Option<u32>) -> Self {
        Self {
            season,
            standings_season: season,
            draft_season: season + 1,
            trade_deadline: calendar::trade_deadline(season),
            trades_open: true,
            user_team_id,
        }
    }

    pub fn is_user_team(&self, team_id: u32) -> bool {
        self.user_team_id == Some(team_id)
    }
}

/// Contender once on pace for the playoff line, eliminated once it is out
/// of reach.
pub fn playoff_position(standing: &TeamStanding) -> PlayoffPosition {
    let played = standing.games_played();
    if played == 0 {
        return PlayoffPosition::Bubble;
    }
    let remaining = REGULAR_SEASON_GAMES.saturating_sub(played);
    if standing.wins + remaining < PLAYOFF_WIN_LINE {
        return PlayoffPosition::Eliminated;
    }
    let pace = standing.win_pct() * REGULAR_SEASON_GAMES as f64;
    if pace >= PLAYOFF_WIN_LINE as f64 {
        PlayoffPosition::Contender
    } else {
        PlayoffPosition::Bubble
    }
}

/// Rebuild a team's context from standings, the cap ledger and the
/// transaction log.
pub fn build_team_context(
    conn: &Connection,
    dynasty_id: &str,
    team_id: u32,
    state: &LeagueState,
    cap: &SalaryCapConfig,
) -> Result<TeamContext> {
    let standing = league::get_standing(conn, dynasty_id, state.standings_season, team_id)?
        .unwrap_or_else(|| TeamStanding::new(team_id));
    let cap_space =
        SalaryCapCalculator::new(conn, dynasty_id, cap.clone()).cap_space(team_id, state.season)?;

    Ok(TeamContext {
        team_id,
        season: state.season,
        wins: standing.wins,
        losses: standing.losses,
        ties: standing.ties,
        streak: standing.streak,
        cap_space,
        playoff_position: playoff_position(&standing),
        last_trade_date: transaction_log::last_trade_date(conn, dynasty_id, team_id)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OffseasonConfig;

    fn record(wins: u32, losses: u32) -> TeamStanding {
        TeamStanding { wins, losses, ..TeamStanding::new(1) }
    }

    #[test]
    fn test_playoff_position() {
        assert_eq!(playoff_position(&TeamStanding::new(1)), PlayoffPosition::Bubble);
        assert_eq!(playoff_position(&record(7, 2)), PlayoffPosition::Contender);
        assert_eq!(playoff_position(&record(5, 5)), PlayoffPosition::Bubble);
        // 2 wins with 5 to play cannot reach 10
        assert_eq!(playoff_position(&record(2, 10)), PlayoffPosition::Eliminated);
        assert_eq!(playoff_position(&record(12, 5)), PlayoffPosition::Contender);
    }

    #[test]
    fn test_offseason_state_uses_new_league_year() {
        let calendar = OffseasonCalendar::new(2025, &OffseasonConfig::default());
        let state = LeagueState::offseason(&calendar, OffseasonPhase::FreeAgencyOpen, Some(4));
        assert_eq!(state.season, 2026);
        assert_eq!(state.standings_season, 2025);
        assert_eq!(state.draft_season, 2026);
        assert!(state.trades_open);
        assert!(state.is_user_team(4));

        let draft_day = LeagueState::offseason(&calendar, OffseasonPhase::Draft, None);
        assert!(!draft_day.trades_open);
    }
}
