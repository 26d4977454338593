//! Draft order from final standings and the playoff bracket.
//!
//! Non-playoff teams pick first, worst record first. Playoff teams follow
//! grouped by the round they went out in, and the champion picks last.
//! Inside a group the worse record picks earlier; point differential and
//! then team id break ties.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::db::{draft, league};
use crate::error::{DynastyError, Result};
use crate::events::{playoff_prefix, EventStore, GameEvent, PlayoffRound, SimEvent};
use crate::models::{TeamStanding, LEAGUE_TEAMS};

/// Final regular-season standings for a season.
pub trait StandingsProvider {
    fn standings(
        &self,
        conn: &Connection,
        dynasty_id: &str,
        season: u32,
    ) -> Result<Vec<TeamStanding>>;
}

/// Playoff results for a season, `None` when none were recorded.
pub trait BracketProvider {
    fn bracket(
        &self,
        conn: &Connection,
        dynasty_id: &str,
        season: u32,
    ) -> Result<Option<PlayoffBracket>>;
}

/// Standings rows persisted for the dynasty.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseStandings;

impl StandingsProvider for DatabaseStandings {
    fn standings(
        &self,
        conn: &Connection,
        dynasty_id: &str,
        season: u32,
    ) -> Result<Vec<TeamStanding>> {
        league::season_standings(conn, dynasty_id, season)
    }
}

/// Playoff game events stored under `playoff_<season>_...` ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventBracket;

impl BracketProvider for EventBracket {
    fn bracket(
        &self,
        conn: &Connection,
        dynasty_id: &str,
        season: u32,
    ) -> Result<Option<PlayoffBracket>> {
        let games: Vec<GameEvent> = EventStore::new(conn, dynasty_id)
            .by_prefix(&playoff_prefix(season))?
            .into_iter()
            .filter_map(|record| match record.event {
                SimEvent::Game(game) => Some(game),
                _ => None,
            })
            .collect();
        if games.is_empty() {
            return Ok(None);
        }
        Ok(Some(PlayoffBracket::from_games(season, games)))
    }
}

/// Fixed standings, for callers that compute them elsewhere.
#[derive(Debug, Clone, Default)]
pub struct StaticStandings(pub Vec<TeamStanding>);

impl StandingsProvider for StaticStandings {
    fn standings(&self, _: &Connection, _: &str, _: u32) -> Result<Vec<TeamStanding>> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone)]
pub struct StaticBracket(pub PlayoffBracket);

impl BracketProvider for StaticBracket {
    fn bracket(&self, _: &Connection, _: &str, _: u32) -> Result<Option<PlayoffBracket>> {
        Ok(Some(self.0.clone()))
    }
}

/// Playoff games of one season grouped by round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayoffBracket {
    pub season: u32,
    pub rounds: BTreeMap<PlayoffRound, Vec<GameEvent>>,
}

impl PlayoffBracket {
    pub fn new(season: u32) -> Self {
        Self { season, rounds: BTreeMap::new() }
    }

    /// Regular-season games and games from other seasons are ignored.
    pub fn from_games(season: u32, games: impl IntoIterator<Item = GameEvent>) -> Self {
        let mut bracket = Self::new(season);
        for game in games {
            bracket.add_game(game);
        }
        bracket
    }

    pub fn add_game(&mut self, game: GameEvent) {
        if game.season != self.season {
            return;
        }
        if let Some(round) = game.round {
            self.rounds.entry(round).or_default().push(game);
        }
    }

    /// Every round has its full slate of decided games.
    pub fn is_complete(&self) -> bool {
        PlayoffRound::ALL.iter().all(|round| {
            self.rounds.get(round).is_some_and(|games| {
                games.len() == round.game_count() && games.iter().all(|g| g.winner().is_some())
            })
        })
    }

    pub fn losers(&self, round: PlayoffRound) -> Vec<u32> {
        self.rounds
            .get(&round)
            .map(|games| games.iter().filter_map(GameEvent::loser).collect())
            .unwrap_or_default()
    }

    pub fn champion(&self) -> Option<u32> {
        self.rounds.get(&PlayoffRound::SuperBowl)?.first()?.winner()
    }

    pub fn playoff_teams(&self) -> BTreeSet<u32> {
        self.rounds
            .values()
            .flatten()
            .flat_map(|g| [g.home_team_id, g.away_team_id])
            .collect()
    }
}

pub struct DraftOrderCalculator;

impl DraftOrderCalculator {
    /// Both inputs are present and usable.
    pub fn can_calculate(standings: &[TeamStanding], bracket: Option<&PlayoffBracket>) -> bool {
        standings.len() == LEAGUE_TEAMS as usize && bracket.is_some_and(PlayoffBracket::is_complete)
    }

    /// Team ids in first-round order.
    pub fn calculate(standings: &[TeamStanding], bracket: &PlayoffBracket) -> Result<Vec<u32>> {
        if standings.len() != LEAGUE_TEAMS as usize {
            return Err(DynastyError::InvalidParameter(format!(
                "draft order needs {} standings, got {}",
                LEAGUE_TEAMS,
                standings.len()
            )));
        }
        if !bracket.is_complete() {
            return Err(DynastyError::InvalidParameter(format!(
                "playoff bracket for {} is incomplete",
                bracket.season
            )));
        }

        let by_team: HashMap<u32, &TeamStanding> =
            standings.iter().map(|s| (s.team_id, s)).collect();
        let sort_group = |mut group: Vec<u32>| -> Vec<u32> {
            group.sort_by(|a, b| {
                let (sa, sb) = (by_team.get(a), by_team.get(b));
                let pct = |s: Option<&&TeamStanding>| s.map(|s| s.win_pct()).unwrap_or(0.0);
                let diff =
                    |s: Option<&&TeamStanding>| s.map(|s| s.point_differential()).unwrap_or(0);
                pct(sa).total_cmp(&pct(sb)).then(diff(sa).cmp(&diff(sb))).then(a.cmp(b))
            });
            group
        };

        let playoff = bracket.playoff_teams();
        let missed: Vec<u32> = standings
            .iter()
            .map(|s| s.team_id)
            .filter(|id| !playoff.contains(id))
            .collect();
        let mut order = sort_group(missed);
        for round in PlayoffRound::ALL {
            order.extend(sort_group(bracket.losers(round)));
        }
        if let Some(champion) = bracket.champion() {
            order.push(champion);
        }

        let distinct: BTreeSet<u32> = order.iter().copied().collect();
        if order.len() != LEAGUE_TEAMS as usize || distinct.len() != order.len() {
            return Err(DynastyError::InvariantViolation(format!(
                "draft order has {} slots for {} distinct teams",
                order.len(),
                distinct.len()
            )));
        }
        Ok(order)
    }

    /// Number every pick of `season` from the first-round order. Traded
    /// picks keep the slot of their original team.
    pub fn assign_overall_picks(
        conn: &Connection,
        dynasty_id: &str,
        season: u32,
        order: &[u32],
    ) -> Result<usize> {
        let slot: HashMap<u32, u32> =
            order.iter().enumerate().map(|(i, &team)| (team, i as u32)).collect();
        let teams = order.len() as u32;
        let mut assigned = 0;
        for pick in draft::season_picks(conn, dynasty_id, season)? {
            let Some(&index) = slot.get(&pick.original_team_id) else {
                continue;
            };
            let overall = (pick.round - 1) * teams + index + 1;
            draft::set_overall_pick(conn, dynasty_id, &pick.pick_id, overall)?;
            assigned += 1;
        }
        Ok(assigned)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{bracket, standings};
    use super::*;

    #[test]
    fn test_gating() {
        assert!(!DraftOrderCalculator::can_calculate(&[], None));
        assert!(!DraftOrderCalculator::can_calculate(&standings(), None));
        assert!(!DraftOrderCalculator::can_calculate(&standings()[..20], Some(&bracket(2025))));

        let mut partial = bracket(2025);
        partial.rounds.remove(&PlayoffRound::SuperBowl);
        assert!(!DraftOrderCalculator::can_calculate(&standings(), Some(&partial)));
        assert!(DraftOrderCalculator::can_calculate(&standings(), Some(&bracket(2025))));
    }

    #[test]
    fn test_order_puts_champion_last() {
        let order = DraftOrderCalculator::calculate(&standings(), &bracket(2025)).unwrap();
        assert_eq!(order.len(), 32);
        assert_eq!(order.last(), Some(&32));
        assert_eq!(order[30], 31);
        // Worst record picks first
        assert_eq!(order[0], 1);
        let playoff = bracket(2025).playoff_teams();
        assert!(order[..order.len() - playoff.len()].iter().all(|t| !playoff.contains(t)));
    }

    #[test]
    fn test_wrong_season_games_are_ignored() {
        let mut b = bracket(2025);
        let stray = GameEvent {
            season: 2024,
            week: None,
            round: Some(PlayoffRound::SuperBowl),
            home_team_id: 1,
            away_team_id: 2,
            home_score: 10,
            away_score: 3,
        };
        b.add_game(stray);
        assert!(b.is_complete());
        assert_eq!(b.champion(), Some(32));
    }
}
