//! Free agency: agreements during the negotiating window, the market
//! opening, and daily AI signings.
//!
//! Players take an offer at or above their asking price. The ask starts at
//! 90% of market value and drops a point a day once the market is open, so
//! thrifty front offices still fill their rosters late in the window.

use rand::seq::SliceRandom;
use std::collections::HashSet;

use super::PhaseContext;
use crate::db::{league, roster, transaction_log};
use crate::error::{DynastyError, Result};
use crate::events::{EventRecord, SigningEvent, SimEvent};
use crate::models::{Contract, FaOffer, OfferStatus, Player, TeamContext, TransactionType};
use crate::needs::{TeamNeeds, TeamNeedsAnalyzer};
use crate::offseason::OffseasonPhase;
use crate::personality::{
    DecisionContext, DecisionInputs, GMArchetype, PersonalityModifiers, PlayerProfile,
};
use crate::valuation::{ContractValue, MarketValueCalculator};

const OPENING_ASK: f64 = 0.9;
const ASK_DECAY_PER_DAY: f64 = 0.01;
const ASK_FLOOR: f64 = 0.5;
/// Interest a team keeps in positions it does not need.
const BASE_INTEREST: f64 = 0.25;

/// Share of market value a free agent accepts after `days_open` days.
pub fn asking_share(days_open: i64) -> f64 {
    (OPENING_ASK - ASK_DECAY_PER_DAY * days_open.max(0) as f64).max(ASK_FLOOR)
}

/// One team's priced interest in one player.
#[derive(Debug, Clone)]
struct Bid {
    score: f64,
    market: ContractValue,
    offer: ContractValue,
}

impl Bid {
    fn accepted(&self, ask: f64) -> bool {
        self.offer.aav as f64 >= self.market.aav as f64 * ask
    }
}

struct Bidder<'c> {
    market: MarketValueCalculator,
    modifiers: PersonalityModifiers,
    archetype: GMArchetype,
    context: &'c TeamContext,
    minimum_salary: i64,
}

impl Bidder<'_> {
    fn bid(&self, player: &Player, needs: &TeamNeeds) -> Bid {
        let market = self.market.calculate_player_value(
            player.position,
            player.overall,
            player.age,
            player.years_pro,
        );
        let adjusted = self.modifiers.apply(
            DecisionInputs::new(
                DecisionContext::FreeAgency,
                PlayerProfile::from(player),
                MarketValueCalculator::rating_curve(player.overall) * 100.0,
                market.aav as f64,
                0.5,
            ),
            self.archetype,
            self.context,
        );
        let asked = (adjusted.aav.round() as i64).max(self.minimum_salary);
        let offer = self.market.reprice(&market, asked);
        let score = adjusted.value * (BASE_INTEREST + needs.weight(player.position));
        Bid { score, market, offer }
    }
}

fn bidder<'c>(
    ctx: &PhaseContext<'_>,
    team_id: u32,
    context: &'c TeamContext,
) -> Result<Bidder<'c>> {
    Ok(Bidder {
        market: ctx.market(),
        modifiers: ctx.modifiers(),
        archetype: league::team_archetype(ctx.conn, ctx.dynasty_id, team_id)?,
        context,
        minimum_salary: ctx.config.salary_cap.league_minimum_salary,
    })
}

/// Players the team keeps into the new league year.
fn returning_players(ctx: &PhaseContext<'_>, team_id: u32) -> Result<Vec<Player>> {
    Ok(roster::team_roster(ctx.conn, ctx.dynasty_id, team_id)?
        .into_iter()
        .filter(|e| e.contract.as_ref().is_some_and(|c| c.covers(ctx.league_year())))
        .map(|e| e.player)
        .collect())
}

pub(super) fn record_signing(ctx: &PhaseContext<'_>, contract: &Contract) -> Result<()> {
    let event = SigningEvent {
        team_id: contract.team_id,
        player_id: contract.player_id.clone(),
        aav: contract.aav,
        years: contract.years,
        guaranteed: contract.guaranteed,
        league_year: contract.start_season,
    };
    ctx.events().insert(&EventRecord::new(ctx.date, SimEvent::Signing(event)))?;
    Ok(())
}

/// Each AI team reaches agreements with its top targets among other teams'
/// expiring players. A player takes the first agreement only, and a team
/// that already has agreements this league year is left alone.
pub fn record_tampering_offers(ctx: &PhaseContext<'_>) -> Result<u32> {
    let league_year = ctx.league_year();
    let targets_per_team = ctx.config.offseason.tampering_targets_per_team as usize;
    let pool = roster::expiring_contracts(ctx.conn, ctx.dynasty_id, ctx.season(), None)?;
    let cap = ctx.cap();

    let (conn, dynasty_id) = (ctx.conn, ctx.dynasty_id);
    let mut claimed: HashSet<String> = HashSet::new();
    for entry in &pool {
        let player_id = &entry.player.player_id;
        if transaction_log::offer_for_player(conn, dynasty_id, player_id, league_year)?.is_some() {
            claimed.insert(player_id.clone());
        }
    }

    let mut teams = ctx.ai_teams()?;
    teams.shuffle(&mut ctx.rng("tampering"));
    let mut recorded = 0;

    for team in teams {
        if transaction_log::offer_count_for_team(conn, dynasty_id, team.team_id, league_year)? > 0 {
            continue;
        }
        let context = ctx.team_context(team.team_id)?;
        let bidder = bidder(ctx, team.team_id, &context)?;
        let needs = TeamNeedsAnalyzer::analyze(&returning_players(ctx, team.team_id)?);
        let mut budget = cap.cap_space(team.team_id, league_year)?;

        let mut bids: Vec<(&Player, Bid)> = pool
            .iter()
            .filter(|e| e.contract.as_ref().is_some_and(|c| c.team_id != team.team_id))
            .filter(|e| !claimed.contains(&e.player.player_id))
            .filter(|e| needs.weight(e.player.position) > 0.0)
            .map(|e| (&e.player, bidder.bid(&e.player, &needs)))
            .filter(|(_, bid)| bid.accepted(asking_share(0)))
            .collect();
        bids.sort_by(|a, b| {
            b.1.score
                .total_cmp(&a.1.score)
                .then_with(|| a.0.player_id.cmp(&b.0.player_id))
        });

        let mut agreed = 0;
        for (player, bid) in bids {
            if agreed >= targets_per_team {
                break;
            }
            let hit = bid.offer.first_year_cap_hit();
            if hit > budget {
                continue;
            }
            let offer = FaOffer {
                offer_id: uuid::Uuid::new_v4().to_string(),
                team_id: team.team_id,
                player_id: player.player_id.clone(),
                season: league_year,
                aav: bid.offer.aav,
                years: bid.offer.years,
                guaranteed: bid.offer.guaranteed,
                signing_bonus: bid.offer.signing_bonus,
                status: OfferStatus::Pending,
            };
            if transaction_log::insert_offer(conn, dynasty_id, &offer)? {
                claimed.insert(player.player_id.clone());
                budget -= hit;
                agreed += 1;
                recorded += 1;
            }
        }
    }
    tracing::info!(league_year, recorded, "Negotiating window agreements recorded");
    Ok(recorded)
}

/// New league year: untagged expiring deals end and the window's agreements
/// are executed where still legal. Returns `(expired, signed)`.
pub fn open_market(ctx: &PhaseContext<'_>) -> Result<(u32, u32)> {
    let league_year = ctx.league_year();

    let mut expired = 0;
    for entry in roster::expiring_contracts(ctx.conn, ctx.dynasty_id, ctx.season(), None)? {
        let Some(contract) = entry.contract else {
            continue;
        };
        roster::deactivate_contract(ctx.conn, ctx.dynasty_id, &contract.contract_id)?;
        roster::set_player_team(ctx.conn, ctx.dynasty_id, &entry.player.player_id, None)?;
        ctx.log(
            TransactionType::ContractExpired,
            contract.team_id,
            Some(&entry.player.player_id),
            serde_json::json!({ "aav": contract.aav, "end_season": contract.end_season }),
        )?;
        expired += 1;
    }

    let mut signed = 0;
    for offer in transaction_log::pending_offers(ctx.conn, ctx.dynasty_id, league_year)? {
        let player = roster::get_player(ctx.conn, ctx.dynasty_id, &offer.player_id)?;
        let roster_size = roster::roster_count(ctx.conn, ctx.dynasty_id, offer.team_id)?;
        let roster_full = roster_size >= ctx.config.roster.offseason_max;
        let contract = Contract {
            contract_id: uuid::Uuid::new_v4().to_string(),
            player_id: offer.player_id.clone(),
            team_id: offer.team_id,
            start_season: league_year,
            end_season: league_year + offer.years - 1,
            years: offer.years,
            total_value: offer.aav * offer.years as i64,
            aav: offer.aav,
            guaranteed: offer.guaranteed,
            signing_bonus: offer.signing_bonus,
            is_franchise_tag: false,
        };

        let status = if !player.is_free_agent() || roster_full {
            OfferStatus::Rejected
        } else {
            match ctx.sign_contract(&contract, TransactionType::Signing) {
                Ok(()) => {
                    record_signing(ctx, &contract)?;
                    signed += 1;
                    OfferStatus::Accepted
                }
                Err(DynastyError::CapViolation { .. }) => OfferStatus::Rejected,
                Err(e) => return Err(e),
            }
        };
        transaction_log::set_offer_status(ctx.conn, ctx.dynasty_id, &offer.offer_id, status)?;
    }

    tracing::info!(league_year, expired, signed, "Free agency opened");
    Ok((expired, signed))
}

/// Each AI team signs up to the daily limit, most wanted player first.
/// Teams with no positional need only sign while below the regular-season
/// roster size.
pub fn sign_free_agents(ctx: &PhaseContext<'_>) -> Result<u32> {
    let mut pool = roster::free_agents(ctx.conn, ctx.dynasty_id)?;
    if pool.is_empty() {
        return Ok(0);
    }
    let league_year = ctx.league_year();
    let limit = ctx.config.offseason.max_signings_per_team_per_day;
    let opened = ctx.calendar.start_of(OffseasonPhase::FreeAgencyOpen);
    let days_open = (ctx.date - opened).num_days();
    let ask = asking_share(days_open);
    let cap = ctx.cap();

    let mut teams = ctx.ai_teams()?;
    teams.shuffle(&mut ctx.rng("free_agency"));
    let mut signed = 0;

    for team in teams {
        let context = ctx.team_context(team.team_id)?;
        let bidder = bidder(ctx, team.team_id, &context)?;
        let mut players = roster::team_players(ctx.conn, ctx.dynasty_id, team.team_id)?;

        for _ in 0..limit {
            if players.len() as u32 >= ctx.config.roster.offseason_max || pool.is_empty() {
                break;
            }
            let needs = TeamNeedsAnalyzer::analyze(&players);
            let below_floor = (players.len() as u32) < ctx.config.roster.regular_season_max;
            let space = cap.cap_space(team.team_id, league_year)?;

            let best = pool
                .iter()
                .enumerate()
                .filter(|(_, p)| below_floor || needs.weight(p.position) > 0.0)
                .map(|(i, p)| (i, bidder.bid(p, &needs)))
                .filter(|(_, bid)| bid.accepted(ask) && bid.offer.first_year_cap_hit() <= space)
                .max_by(|a, b| a.1.score.total_cmp(&b.1.score).then_with(|| b.0.cmp(&a.0)));
            let Some((index, bid)) = best else {
                break;
            };

            let mut player = pool.remove(index);
            let contract = bid.offer.to_contract(&player.player_id, team.team_id, league_year);
            match ctx.sign_contract(&contract, TransactionType::Signing) {
                Ok(()) => {
                    record_signing(ctx, &contract)?;
                    player.team_id = Some(team.team_id);
                    players.push(player);
                    signed += 1;
                }
                Err(DynastyError::CapViolation { .. }) => {
                    pool.insert(index, player);
                    break;
                }
                Err(e) => return Err(e),
            }
        }
    }

    if signed > 0 {
        tracing::debug!(date = %ctx.date, signed, ask, "Free agent signings");
    }
    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DynastyConfig;
    use crate::offseason::handlers::fixtures::{context, seeded_league};
    use crate::offseason::OffseasonCalendar;

    #[test]
    fn test_asking_share_decays_to_floor() {
        assert!((asking_share(0) - 0.9).abs() < 1e-9);
        assert!((asking_share(10) - 0.8).abs() < 1e-9);
        assert_eq!(asking_share(400), ASK_FLOOR);
        assert_eq!(asking_share(-3), asking_share(0));
    }

    #[test]
    fn test_window_agreements_execute_when_market_opens() {
        let config = DynastyConfig::testing();
        let (db, d) = seeded_league(&config, 2025);
        let calendar = OffseasonCalendar::new(2025, &config.offseason);
        let window = calendar.start_of(OffseasonPhase::FreeAgencyLegalTampering);
        let ctx = context(db.conn(), &d.dynasty_id, &config, &calendar, window);

        let recorded = record_tampering_offers(&ctx).unwrap();
        assert!(recorded > 0);
        assert!(recorded <= 31 * config.offseason.tampering_targets_per_team);
        // Second pass finds every team already has agreements
        assert_eq!(record_tampering_offers(&ctx).unwrap(), 0);
        let user_offers = transaction_log::offer_count_for_team(db.conn(), &d.dynasty_id, 1, 2026);
        assert_eq!(user_offers.unwrap(), 0);

        let open = calendar.start_of(OffseasonPhase::FreeAgencyOpen);
        let ctx = context(db.conn(), &d.dynasty_id, &config, &calendar, open);
        let (expired, signed) = open_market(&ctx).unwrap();
        assert!(expired > 0);
        assert!(signed > 0 && signed <= recorded);
        let pending = transaction_log::pending_offers(db.conn(), &d.dynasty_id, 2026).unwrap();
        assert!(pending.is_empty());
        let expiring = roster::expiring_contracts(db.conn(), &d.dynasty_id, 2025, None).unwrap();
        assert!(expiring.is_empty());

        // Opening again changes nothing
        assert_eq!(open_market(&ctx).unwrap(), (0, 0));
    }

    #[test]
    fn test_daily_signings_respect_limit_and_cap() {
        let config = DynastyConfig::testing();
        let (db, d) = seeded_league(&config, 2025);
        let calendar = OffseasonCalendar::new(2025, &config.offseason);
        let open = calendar.start_of(OffseasonPhase::FreeAgencyOpen);
        let ctx = context(db.conn(), &d.dynasty_id, &config, &calendar, open);
        open_market(&ctx).unwrap();

        let before: Vec<u32> =
            (1..=32).map(|t| roster::roster_count(db.conn(), &d.dynasty_id, t).unwrap()).collect();
        let signed = sign_free_agents(&ctx).unwrap();
        assert!(signed > 0);
        assert!(signed <= 31 * config.offseason.max_signings_per_team_per_day);

        let cap = ctx.cap();
        for team_id in 1..=32u32 {
            let after = roster::roster_count(db.conn(), &d.dynasty_id, team_id).unwrap();
            let gained = after - before[team_id as usize - 1];
            assert!(gained <= config.offseason.max_signings_per_team_per_day);
            if team_id == 1 {
                assert_eq!(gained, 0);
            }
            if gained > 0 {
                assert!(cap.cap_space(team_id, 2026).unwrap() >= 0);
            }
        }
        let events = ctx.events().count(Some(crate::events::EventType::Signing)).unwrap();
        assert_eq!(events, signed as usize);
    }
}
