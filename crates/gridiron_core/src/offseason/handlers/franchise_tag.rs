//! Franchise tags.
//!
//! A tag is a one-year, fully guaranteed contract for the league year at the
//! position's tag value. A team may tag one player per league year.

use chrono::NaiveDate;
use rusqlite::Connection;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::PhaseContext;
use crate::config::DynastyConfig;
use crate::db::{league, roster};
use crate::error::{DynastyError, Result};
use crate::events::{EventRecord, FranchiseTagEvent, SimEvent};
use crate::models::{CapEventType, Contract, Position, TransactionType};
use crate::offseason::{OffseasonCalendar, OffseasonPhase};
use crate::personality::{DecisionContext, DecisionInputs, PlayerProfile};

/// AI teams tag only candidates at or above this adjusted probability.
pub const TAG_PROBABILITY_THRESHOLD: f64 = 0.5;

/// An expiring player a team could tag, priced for the new league year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FranchiseTagCandidate {
    pub player_id: String,
    pub name: String,
    pub position: String,
    pub overall: u8,
    pub age: u8,
    pub current_aav: i64,
    /// What the open market would pay
    pub market_aav: i64,
    pub tag_cost: i64,
    /// Personality-adjusted worth of keeping the player at the tag price
    pub tag_value_score: f64,
    pub tag_probability: f64,
}

pub struct FranchiseTagManager<'a> {
    conn: &'a Connection,
    dynasty_id: &'a str,
    config: &'a DynastyConfig,
    calendar: &'a OffseasonCalendar,
}

impl<'a> FranchiseTagManager<'a> {
    pub fn new(
        conn: &'a Connection,
        dynasty_id: &'a str,
        config: &'a DynastyConfig,
        calendar: &'a OffseasonCalendar,
    ) -> Self {
        Self { conn, dynasty_id, config, calendar }
    }

    pub fn from_context(ctx: &PhaseContext<'a>) -> Self {
        Self::new(ctx.conn, ctx.dynasty_id, ctx.config, ctx.calendar)
    }

    fn context(&self, date: NaiveDate) -> PhaseContext<'a> {
        PhaseContext {
            conn: self.conn,
            dynasty_id: self.dynasty_id,
            config: self.config,
            calendar: self.calendar,
            user_team_id: None,
            date,
            standings: None,
            bracket: None,
        }
    }

    pub fn tag_cost(&self, position: Position) -> i64 {
        self.context(self.calendar.super_bowl()).market().calculate_franchise_tag_value(position)
    }

    /// Untagged players whose contract ends with the finished season, best
    /// tag value first.
    pub fn get_franchise_tag_candidates(&self, team_id: u32) -> Result<Vec<FranchiseTagCandidate>> {
        let ctx = self.context(self.calendar.start_of(OffseasonPhase::FranchiseTagPeriod));
        let market = ctx.market();
        let modifiers = ctx.modifiers();
        let archetype = league::team_archetype(self.conn, self.dynasty_id, team_id)?;
        let team = ctx.team_context(team_id)?;

        let mut candidates: Vec<FranchiseTagCandidate> =
            roster::expiring_contracts(self.conn, self.dynasty_id, ctx.season(), Some(team_id))?
                .into_iter()
                .filter(|entry| !entry.is_franchise_tagged())
                .map(|entry| {
                    let p = &entry.player;
                    let tag_cost = market.calculate_franchise_tag_value(p.position);
                    let market_aav = market
                        .calculate_player_value(p.position, p.overall, p.age, p.years_pro)
                        .aav;
                    let ratio = if tag_cost > 0 {
                        market_aav as f64 / tag_cost as f64
                    } else {
                        0.0
                    };
                    let probability = ((ratio - 0.5) * 2.0).clamp(0.0, 1.0);
                    let adjusted = modifiers.apply(
                        DecisionInputs::new(
                            DecisionContext::FranchiseTag,
                            PlayerProfile::from(p),
                            ratio,
                            tag_cost as f64,
                            probability,
                        ),
                        archetype,
                        &team,
                    );
                    FranchiseTagCandidate {
                        player_id: p.player_id.clone(),
                        name: p.full_name(),
                        position: p.position.as_str().to_string(),
                        overall: p.overall,
                        age: p.age,
                        current_aav: entry.contract.as_ref().map(|c| c.aav).unwrap_or(0),
                        market_aav,
                        tag_cost,
                        tag_value_score: adjusted.value,
                        tag_probability: adjusted.probability,
                    }
                })
                .collect();

        candidates.sort_by(|a, b| {
            b.tag_value_score
                .total_cmp(&a.tag_value_score)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });
        Ok(candidates)
    }

    /// Replace the player's expiring deal with a one-year tag contract.
    fn has_tag(&self, team_id: u32, league_year: u32) -> Result<bool> {
        let tag = roster::franchise_tag_for_team(self.conn, self.dynasty_id, team_id, league_year)?;
        Ok(tag.is_some())
    }

    pub fn apply_tag(
        &self,
        team_id: u32,
        player_id: &str,
        date: NaiveDate,
    ) -> Result<FranchiseTagEvent> {
        let ctx = self.context(date);
        let league_year = ctx.league_year();
        if self.has_tag(team_id, league_year)? {
            return Err(DynastyError::DuplicateFranchiseTag { team_id, season: league_year });
        }

        let player = roster::get_player(self.conn, self.dynasty_id, player_id)?;
        let expiring = roster::active_contract(self.conn, self.dynasty_id, player_id)?
            .filter(|c| c.team_id == team_id && c.is_expiring(ctx.season()) && !c.is_franchise_tag)
            .ok_or_else(|| {
                DynastyError::InvalidParameter(format!(
                    "player {} has no expiring contract with team {}",
                    player_id, team_id
                ))
            })?;

        let tag_cost = self.tag_cost(player.position);
        let contract = Contract {
            contract_id: uuid::Uuid::new_v4().to_string(),
            player_id: player_id.to_string(),
            team_id,
            start_season: league_year,
            end_season: league_year,
            years: 1,
            total_value: tag_cost,
            aav: tag_cost,
            guaranteed: tag_cost,
            signing_bonus: 0,
            is_franchise_tag: true,
        };
        let cap = ctx.cap();
        cap.validate_signing(team_id, league_year, &contract)?;

        roster::deactivate_contract(self.conn, self.dynasty_id, &expiring.contract_id)?;
        roster::insert_contract(self.conn, self.dynasty_id, &contract)?;
        cap.record_cap_event(
            team_id,
            league_year,
            CapEventType::FranchiseTag,
            tag_cost,
            date,
            &format!("Franchise tag on {}", player.full_name()),
        )?;
        ctx.log(
            TransactionType::FranchiseTag,
            team_id,
            Some(player_id),
            serde_json::json!({ "position": player.position.as_str(), "tag_cost": tag_cost }),
        )?;

        let event = FranchiseTagEvent {
            team_id,
            player_id: player_id.to_string(),
            position: player.position,
            tag_cost,
            league_year,
        };
        ctx.events().insert(&EventRecord::new(date, SimEvent::FranchiseTag(event.clone())))?;
        tracing::info!(team_id, player_id, tag_cost, "Franchise tag applied");
        Ok(event)
    }

    /// Each AI team without a tag this league year tags its best candidate
    /// that clears the threshold and fits under the cap.
    pub fn run_ai_tags(&self, date: NaiveDate, user_team_id: Option<u32>) -> Result<u32> {
        let ctx = self.context(date);
        let league_year = ctx.league_year();
        let cap = ctx.cap();
        let mut tagged = 0;

        for team in league::list_teams(self.conn, self.dynasty_id)? {
            if user_team_id == Some(team.team_id) || self.has_tag(team.team_id, league_year)? {
                continue;
            }
            let space = cap.cap_space(team.team_id, league_year)?;
            let choice = self
                .get_franchise_tag_candidates(team.team_id)?
                .into_iter()
                .find(|c| c.tag_probability >= TAG_PROBABILITY_THRESHOLD && c.tag_cost <= space);
            if let Some(candidate) = choice {
                self.apply_tag(team.team_id, &candidate.player_id, date)?;
                tagged += 1;
            }
        }
        Ok(tagged)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::Database;
    use crate::offseason::handlers::fixtures::seeded_league;
    use crate::models::Player;
    use crate::valuation::calculate_franchise_tag_value;

    /// Put an elite quarterback in the last year of his deal on `team_id`.
    pub(crate) fn add_expiring_qb(
        db: &Database,
        dynasty_id: &str,
        team_id: u32,
        season: u32,
    ) -> String {
        let player = Player {
            player_id: "qb_elite".into(),
            team_id: Some(team_id),
            first_name: "Franchise".into(),
            last_name: "Passer".into(),
            position: Position::QB,
            overall: 97,
            potential: 98,
            age: 28,
            years_pro: 6,
        };
        roster::insert_player(db.conn(), dynasty_id, &player).unwrap();
        let contract = Contract {
            contract_id: "qb_elite_rookie_ext".into(),
            player_id: player.player_id.clone(),
            team_id,
            start_season: season - 3,
            end_season: season,
            years: 4,
            total_value: 100_000_000,
            aav: 25_000_000,
            guaranteed: 40_000_000,
            signing_bonus: 20_000_000,
            is_franchise_tag: false,
        };
        roster::insert_contract(db.conn(), dynasty_id, &contract).unwrap();
        player.player_id
    }

    #[test]
    fn test_elite_qb_is_a_candidate() {
        let config = DynastyConfig::testing();
        let (db, d) = seeded_league(&config, 2025);
        let player_id = add_expiring_qb(&db, &d.dynasty_id, 2, 2025);
        let calendar = OffseasonCalendar::new(2025, &config.offseason);
        let manager = FranchiseTagManager::new(db.conn(), &d.dynasty_id, &config, &calendar);

        let candidates = manager.get_franchise_tag_candidates(2).unwrap();
        let qb = candidates.iter().find(|c| c.player_id == player_id).unwrap();
        assert_eq!(qb.tag_cost, calculate_franchise_tag_value("quarterback").unwrap());
        assert!(qb.tag_value_score >= 0.0);
        assert!(qb.market_aav > qb.current_aav);
        assert!(candidates.iter().all(|c| (0.0..=1.0).contains(&c.tag_probability)));
    }

    #[test]
    fn test_second_tag_is_rejected() {
        let config = DynastyConfig::testing();
        let (db, d) = seeded_league(&config, 2025);
        let player_id = add_expiring_qb(&db, &d.dynasty_id, 2, 2025);
        let calendar = OffseasonCalendar::new(2025, &config.offseason);
        let manager = FranchiseTagManager::new(db.conn(), &d.dynasty_id, &config, &calendar);
        let deadline = calendar.franchise_tag_deadline();

        let event = manager.apply_tag(2, &player_id, deadline).unwrap();
        assert_eq!(event.league_year, 2026);
        let tag = roster::franchise_tag_for_team(db.conn(), &d.dynasty_id, 2, 2026)
            .unwrap()
            .unwrap();
        assert_eq!(tag.aav, event.tag_cost);
        assert_eq!(tag.guaranteed, event.tag_cost);

        let other = manager
            .get_franchise_tag_candidates(2)
            .unwrap()
            .into_iter()
            .next()
            .map(|c| c.player_id)
            .unwrap();
        let again = manager.apply_tag(2, &other, deadline);
        assert!(matches!(
            again,
            Err(DynastyError::DuplicateFranchiseTag { team_id: 2, season: 2026 })
        ));
        // The tagged player is no longer a candidate
        let candidates = manager.get_franchise_tag_candidates(2).unwrap();
        assert!(candidates.iter().all(|c| c.player_id != player_id));
    }

    #[test]
    fn test_ai_tags_skip_user_team() {
        let config = DynastyConfig::testing();
        let (db, d) = seeded_league(&config, 2025);
        add_expiring_qb(&db, &d.dynasty_id, 1, 2025);
        let calendar = OffseasonCalendar::new(2025, &config.offseason);
        let manager = FranchiseTagManager::new(db.conn(), &d.dynasty_id, &config, &calendar);
        let deadline = calendar.franchise_tag_deadline();

        let tagged = manager.run_ai_tags(deadline, Some(1)).unwrap();
        let user_tag = roster::franchise_tag_for_team(db.conn(), &d.dynasty_id, 1, 2026).unwrap();
        assert!(user_tag.is_none());
        // Idempotent once every willing team has its tag
        assert_eq!(manager.run_ai_tags(deadline, Some(1)).unwrap(), 0);
        assert!(tagged <= 31);
    }
}
