//! Draft class scouting, the draft itself and undrafted free agents.

use fxhash::FxHasher;
use rand::seq::SliceRandom;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use super::free_agency::record_signing;
use super::PhaseContext;
use crate::db::{draft, league, roster};
use crate::error::{DynastyError, Result};
use crate::events::{DraftSelectionEvent, EventRecord, ScoutingEvent, SimEvent};
use crate::league::LeagueGenerator;
use crate::models::{Contract, DraftPick, DraftProspect, Player, TeamContext, TransactionType};
use crate::needs::TeamNeedsAnalyzer;
use crate::offseason::draft_order::{DraftOrderCalculator, PlayoffBracket};
use crate::personality::{
    DecisionContext, DecisionInputs, GMArchetype, PersonalityModifiers, PlayerProfile,
};
use crate::valuation::MarketValueCalculator;

pub const DRAFT_ORDER_PENDING: &str = "Draft order cannot yet be calculated";

/// Prospects an AI team looks at for each selection.
const BOARD_DEPTH: usize = 32;
/// Prospects named in the scouting report.
const SCOUTING_REPORT_SIZE: usize = 10;

fn class_seed(seed: u64, dynasty_id: &str, season: u32) -> u64 {
    let mut hasher = FxHasher::default();
    seed.hash(&mut hasher);
    dynasty_id.hash(&mut hasher);
    season.hash(&mut hasher);
    hasher.finish()
}

/// Scout the league year's class and make sure every team owns its picks
/// for this draft and the next. Does nothing once the class exists.
pub fn prepare_draft(ctx: &PhaseContext<'_>) -> Result<String> {
    let season = ctx.league_year();
    if draft::prospect_count(ctx.conn, ctx.dynasty_id, season)? > 0 {
        return Ok(format!("{} draft class already scouted", season));
    }

    let rounds = ctx.config.draft.rounds;
    let class = LeagueGenerator::new(class_seed(ctx.config.seed, ctx.dynasty_id, season))
        .generate_draft_class(season, ctx.config.draft.class_size, rounds);
    for prospect in &class {
        draft::insert_prospect(ctx.conn, ctx.dynasty_id, prospect)?;
    }
    let report = ScoutingEvent {
        season,
        class_size: class.len(),
        top_prospect_ids: class
            .iter()
            .take(SCOUTING_REPORT_SIZE)
            .map(|p| p.prospect_id.clone())
            .collect(),
    };
    ctx.events().insert(&EventRecord::new(ctx.date, SimEvent::Scouting(report)))?;

    let mut picks = 0;
    for team in league::list_teams(ctx.conn, ctx.dynasty_id)? {
        for draft_season in [season, season + 1] {
            for round in 1..=rounds {
                let pick = DraftPick::new(draft_season, round, team.team_id);
                if draft::insert_pick(ctx.conn, ctx.dynasty_id, &pick)? {
                    picks += 1;
                }
            }
        }
    }

    tracing::info!(season, prospects = class.len(), picks, "Draft class scouted");
    Ok(format!("Scouted {} prospects for the {} draft, {} new picks", class.len(), season, picks))
}

fn rookie_contract(
    market: &MarketValueCalculator,
    player: &Player,
    team_id: u32,
    season: u32,
) -> Contract {
    market
        .calculate_player_value(player.position, player.overall, player.age, 0)
        .to_contract(&player.player_id, team_id, season)
}

fn rookie(prospect: &DraftProspect, team_id: u32) -> Player {
    Player {
        player_id: prospect.prospect_id.clone(),
        team_id: Some(team_id),
        first_name: prospect.first_name.clone(),
        last_name: prospect.last_name.clone(),
        position: prospect.position,
        overall: prospect.overall,
        potential: prospect.potential,
        age: prospect.age,
        years_pro: 0,
    }
}

/// Index into `pool` of the prospect the team takes: need, board value and
/// the GM's appetite for upside, among the best few available.
fn choose_prospect(
    pool: &[DraftProspect],
    roster: &[Player],
    archetype: GMArchetype,
    context: &TeamContext,
    modifiers: &PersonalityModifiers,
) -> usize {
    let needs = TeamNeedsAnalyzer::analyze(roster);
    pool.iter()
        .take(BOARD_DEPTH)
        .enumerate()
        .map(|(i, prospect)| {
            let board = prospect.overall as f64 + 0.5 * prospect.upside() as f64;
            let profile = PlayerProfile::from(prospect);
            let inputs = DecisionInputs::new(DecisionContext::Draft, profile, board, 0.0, 0.5);
            let adjusted = modifiers.apply(inputs, archetype, context);
            (i, adjusted.value * (1.0 + needs.weight(prospect.position)))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn select(
    ctx: &PhaseContext<'_>,
    pick: &DraftPick,
    prospect: &DraftProspect,
    market: &MarketValueCalculator,
) -> Result<Player> {
    let overall_pick = pick.overall_pick.ok_or_else(|| {
        DynastyError::InvariantViolation(format!("pick {} has no draft slot", pick.pick_id))
    })?;
    let team_id = pick.current_team_id;
    let player = rookie(prospect, team_id);

    roster::insert_player(ctx.conn, ctx.dynasty_id, &player)?;
    let contract = rookie_contract(market, &player, team_id, pick.season);
    ctx.register_contract(&contract, TransactionType::DraftSelection)?;
    draft::mark_pick_used(ctx.conn, ctx.dynasty_id, &pick.pick_id, &player.player_id)?;
    draft::mark_prospect_drafted(ctx.conn, ctx.dynasty_id, &prospect.prospect_id)?;

    let event = DraftSelectionEvent {
        season: pick.season,
        round: pick.round,
        overall_pick,
        pick_id: pick.pick_id.clone(),
        team_id,
        prospect_id: prospect.prospect_id.clone(),
    };
    ctx.events().insert(&EventRecord::new(ctx.date, SimEvent::DraftSelection(event)))?;
    Ok(player)
}

/// Run every remaining selection of the league year's draft once the order
/// can be set. Returns the selections made and a status line.
pub fn run_draft_if_ready(ctx: &PhaseContext<'_>) -> Result<(u32, String)> {
    let season = ctx.league_year();
    let pending = || -> Result<(u32, String)> { Ok((0, DRAFT_ORDER_PENDING.to_string())) };

    if draft_complete(ctx)? {
        return Ok((0, format!("{} draft complete", season)));
    }
    let (Some(standings_provider), Some(bracket_provider)) = (ctx.standings, ctx.bracket) else {
        return pending();
    };
    let standings = standings_provider.standings(ctx.conn, ctx.dynasty_id, ctx.season())?;
    let bracket = bracket_provider.bracket(ctx.conn, ctx.dynasty_id, ctx.season())?;
    let complete = |b: &PlayoffBracket| DraftOrderCalculator::can_calculate(&standings, Some(b));
    let Some(bracket) = bracket.filter(complete) else {
        return pending();
    };

    let order = DraftOrderCalculator::calculate(&standings, &bracket)?;
    DraftOrderCalculator::assign_overall_picks(ctx.conn, ctx.dynasty_id, season, &order)?;

    let mut picks: Vec<DraftPick> = draft::season_picks(ctx.conn, ctx.dynasty_id, season)?
        .into_iter()
        .filter(|p| !p.is_used())
        .collect();
    picks.sort_by_key(|p| (p.overall_pick.unwrap_or(u32::MAX), p.round, p.original_team_id));

    let market = ctx.market();
    let modifiers = ctx.modifiers();
    let mut pool = draft::available_prospects(ctx.conn, ctx.dynasty_id, season)?;
    let mut rosters: HashMap<u32, Vec<Player>> = HashMap::new();
    let mut profiles: HashMap<u32, (GMArchetype, TeamContext)> = HashMap::new();
    let mut made = 0;

    for pick in picks {
        if pool.is_empty() {
            break;
        }
        let team_id = pick.current_team_id;
        if let Entry::Vacant(slot) = rosters.entry(team_id) {
            slot.insert(roster::team_players(ctx.conn, ctx.dynasty_id, team_id)?);
        }
        let index = if ctx.is_user_team(team_id) {
            0
        } else {
            if let Entry::Vacant(slot) = profiles.entry(team_id) {
                let archetype = league::team_archetype(ctx.conn, ctx.dynasty_id, team_id)?;
                slot.insert((archetype, ctx.team_context(team_id)?));
            }
            let (archetype, context) = &profiles[&team_id];
            choose_prospect(&pool, &rosters[&team_id], *archetype, context, &modifiers)
        };

        let prospect = pool.remove(index);
        let player = select(ctx, &pick, &prospect, &market)?;
        rosters.entry(team_id).or_default().push(player);
        made += 1;
    }

    tracing::info!(season, selections = made, "Draft held");
    Ok((made, format!("{} draft: {} selections made", season, made)))
}

/// Whether every pick of the league year's draft has been used.
pub fn draft_complete(ctx: &PhaseContext<'_>) -> Result<bool> {
    let picks = draft::season_picks(ctx.conn, ctx.dynasty_id, ctx.league_year())?;
    Ok(picks.iter().all(DraftPick::is_used))
}

/// After the draft window: hold any selections the order kept back, then
/// let AI teams sign what is left. Nothing goes undrafted while picks remain.
pub fn close_draft(ctx: &PhaseContext<'_>) -> Result<(u32, String)> {
    let (selections, _) = run_draft_if_ready(ctx)?;
    if !draft_complete(ctx)? {
        return Ok((0, DRAFT_ORDER_PENDING.to_string()));
    }
    let signed = sign_undrafted_prospects(ctx)?;
    let message = if selections > 0 {
        format!("{} late selections, {} undrafted free agents signed", selections, signed)
    } else {
        format!("{} undrafted free agents signed", signed)
    };
    Ok((selections + signed, message))
}

/// AI teams take turns signing the best remaining prospect at a position
/// of need until they reach the offseason roster limit or the pool runs dry.
/// Signs nobody until the draft is complete.
pub fn sign_undrafted_prospects(ctx: &PhaseContext<'_>) -> Result<u32> {
    let season = ctx.league_year();
    if !draft_complete(ctx)? {
        tracing::warn!(season, "Draft still open, undrafted signings held");
        return Ok(0);
    }
    let mut pool = draft::available_prospects(ctx.conn, ctx.dynasty_id, season)?;
    if pool.is_empty() {
        return Ok(0);
    }
    let market = ctx.market();
    let cap = ctx.cap();
    let minimum = ctx.config.salary_cap.league_minimum_salary;
    let limit = ctx.config.roster.offseason_max;

    let mut teams = ctx.ai_teams()?;
    teams.shuffle(&mut ctx.rng("undrafted"));
    let mut open: Vec<(u32, Vec<Player>)> = Vec::new();
    for team in teams {
        let players = roster::team_players(ctx.conn, ctx.dynasty_id, team.team_id)?;
        if (players.len() as u32) < limit {
            open.push((team.team_id, players));
        }
    }

    let mut signed = 0;
    loop {
        let mut progressed = false;
        for (team_id, players) in open.iter_mut() {
            if pool.is_empty() || players.len() as u32 >= limit {
                continue;
            }
            let needs = TeamNeedsAnalyzer::analyze(players.iter());
            let index = pool.iter().position(|p| needs.weight(p.position) > 0.0).unwrap_or(0);
            let player = rookie(&pool[index], *team_id);
            let value = market.reprice(
                &market.calculate_player_value(player.position, player.overall, player.age, 0),
                minimum,
            );
            if !cap.can_afford(*team_id, season, value.first_year_cap_hit())? {
                continue;
            }

            let prospect = pool.remove(index);
            roster::insert_player(ctx.conn, ctx.dynasty_id, &player)?;
            let contract = value.to_contract(&player.player_id, *team_id, season);
            ctx.register_contract(&contract, TransactionType::UndraftedSigning)?;
            record_signing(ctx, &contract)?;
            draft::mark_prospect_drafted(ctx.conn, ctx.dynasty_id, &prospect.prospect_id)?;
            players.push(player);
            signed += 1;
            progressed = true;
        }
        if !progressed {
            break;
        }
    }

    tracing::info!(season, signed, "Undrafted free agents signed");
    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DynastyConfig;
    use crate::events::EventType;
    use crate::offseason::draft_order::{fixtures, StaticBracket, StaticStandings};
    use crate::offseason::handlers::fixtures::{context, seeded_league};
    use crate::offseason::{OffseasonCalendar, OffseasonPhase};

    #[test]
    fn test_prepare_draft_is_idempotent() {
        let config = DynastyConfig::testing();
        let (db, d) = seeded_league(&config, 2025);
        let calendar = OffseasonCalendar::new(2025, &config.offseason);
        let ctx = context(db.conn(), &d.dynasty_id, &config, &calendar, calendar.super_bowl());

        prepare_draft(&ctx).unwrap();
        prepare_draft(&ctx).unwrap();
        assert_eq!(draft::prospect_count(db.conn(), &d.dynasty_id, 2026).unwrap(), 224);
        assert_eq!(ctx.events().count(Some(EventType::Scouting)).unwrap(), 1);
        assert_eq!(draft::season_picks(db.conn(), &d.dynasty_id, 2027).unwrap().len(), 32 * 7);
    }

    #[test]
    fn test_draft_waits_for_order() {
        let config = DynastyConfig::testing();
        let (db, d) = seeded_league(&config, 2025);
        let calendar = OffseasonCalendar::new(2025, &config.offseason);
        let date = calendar.start_of(OffseasonPhase::Draft);
        let ctx = context(db.conn(), &d.dynasty_id, &config, &calendar, date);
        prepare_draft(&ctx).unwrap();

        let (made, message) = run_draft_if_ready(&ctx).unwrap();
        assert_eq!(made, 0);
        assert_eq!(message, DRAFT_ORDER_PENDING);
        assert_eq!(draft::available_prospects(db.conn(), &d.dynasty_id, 2026).unwrap().len(), 224);
    }

    #[test]
    fn test_full_draft_consumes_every_pick_once() {
        let config = DynastyConfig::testing();
        let (db, d) = seeded_league(&config, 2025);
        let calendar = OffseasonCalendar::new(2025, &config.offseason);
        let standings = StaticStandings(fixtures::standings());
        let bracket = StaticBracket(fixtures::bracket(2025));
        let date = calendar.start_of(OffseasonPhase::Draft);
        let mut ctx = context(db.conn(), &d.dynasty_id, &config, &calendar, date);
        ctx.standings = Some(&standings);
        ctx.bracket = Some(&bracket);
        prepare_draft(&ctx).unwrap();
        let best = draft::available_prospects(db.conn(), &d.dynasty_id, 2026).unwrap().remove(0);

        let (made, _) = run_draft_if_ready(&ctx).unwrap();
        assert_eq!(made, 224);
        let picks = draft::season_picks(db.conn(), &d.dynasty_id, 2026).unwrap();
        assert!(picks.iter().all(DraftPick::is_used));
        // Team 1 has the worst record and is auto-picked best available
        let first = picks.iter().find(|p| p.overall_pick == Some(1)).unwrap();
        assert_eq!(first.current_team_id, 1);
        assert_eq!(first.used_by_player_id.as_deref(), Some(best.prospect_id.as_str()));
        let champion_first = picks.iter().find(|p| p.overall_pick == Some(32)).unwrap();
        assert_eq!(champion_first.original_team_id, 32);

        assert_eq!(ctx.events().count(Some(EventType::DraftSelection)).unwrap(), 224);
        let again = run_draft_if_ready(&ctx).unwrap();
        assert_eq!(again.0, 0);
        assert_eq!(ctx.events().count(Some(EventType::DraftSelection)).unwrap(), 224);
    }

    #[test]
    fn test_undrafted_prospects_fill_rosters() {
        let mut config = DynastyConfig::testing();
        config.draft.class_size = 300;
        let (db, d) = seeded_league(&config, 2025);
        let calendar = OffseasonCalendar::new(2025, &config.offseason);
        let standings = StaticStandings(fixtures::standings());
        let bracket = StaticBracket(fixtures::bracket(2025));
        let date = calendar.start_of(OffseasonPhase::PostDraft);
        let mut ctx = context(db.conn(), &d.dynasty_id, &config, &calendar, date);
        ctx.standings = Some(&standings);
        ctx.bracket = Some(&bracket);
        prepare_draft(&ctx).unwrap();
        run_draft_if_ready(&ctx).unwrap();
        assert_eq!(draft::available_prospects(db.conn(), &d.dynasty_id, 2026).unwrap().len(), 76);

        let signed = sign_undrafted_prospects(&ctx).unwrap();
        assert!(signed > 0);
        assert!(draft::available_prospects(db.conn(), &d.dynasty_id, 2026).unwrap().len() < 76);
        assert_eq!(roster::roster_count(db.conn(), &d.dynasty_id, 1).unwrap(), 53);
        for team_id in 2..=32 {
            let count = roster::roster_count(db.conn(), &d.dynasty_id, team_id).unwrap();
            assert!(count <= config.roster.offseason_max);
        }
    }

    #[test]
    fn test_no_undrafted_signings_while_picks_remain() {
        let mut config = DynastyConfig::testing();
        config.draft.class_size = 300;
        let (db, d) = seeded_league(&config, 2025);
        let calendar = OffseasonCalendar::new(2025, &config.offseason);
        let standings = StaticStandings(fixtures::standings());
        let bracket = StaticBracket(fixtures::bracket(2025));
        let date = calendar.start_of(OffseasonPhase::PostDraft);
        let mut ctx = context(db.conn(), &d.dynasty_id, &config, &calendar, date);
        prepare_draft(&ctx).unwrap();

        assert_eq!(sign_undrafted_prospects(&ctx).unwrap(), 0);
        let (count, message) = close_draft(&ctx).unwrap();
        assert_eq!((count, message.as_str()), (0, DRAFT_ORDER_PENDING));
        assert_eq!(draft::available_prospects(db.conn(), &d.dynasty_id, 2026).unwrap().len(), 300);

        // Results turn up after the window: the draft goes first, then the leftovers
        ctx.standings = Some(&standings);
        ctx.bracket = Some(&bracket);
        let (count, message) = close_draft(&ctx).unwrap();
        assert!(count > 224);
        assert!(message.starts_with("224 late selections"));
        let picks = draft::season_picks(db.conn(), &d.dynasty_id, 2026).unwrap();
        assert!(picks.iter().all(DraftPick::is_used));
    }
}
