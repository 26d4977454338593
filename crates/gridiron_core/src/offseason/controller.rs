//! Day-by-day driver of the offseason.
//!
//! Every `advance_day` is one SQL transaction: the phase hooks, the AI trade
//! pass and the new date and phase are committed together or not at all.

use rusqlite::Connection;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::draft_order::{
    BracketProvider, DatabaseStandings, DraftOrderCalculator, EventBracket, StandingsProvider,
};
use super::handlers::{
    FranchiseTagCandidate, FranchiseTagManager, PhaseContext, PhaseHandler, PhaseHook, PhaseResult,
};
use super::{OffseasonCalendar, OffseasonPhase};
use crate::calendar::{format_date, Calendar};
use crate::config::DynastyConfig;
use crate::db::{dynasty, Database};
use crate::error::Result;
use crate::models::DynastyState;
use crate::transactions::{LeagueState, TransactionAIManager};

/// Longest run `advance_to_phase` makes before giving up.
const MAX_ADVANCE_DAYS: u32 = 400;

/// Outcome of one simulated day. Plain data for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AdvanceDayResult {
    /// Date after the advance, `YYYY-MM-DD`
    pub new_date: String,
    /// Always zero in the offseason
    pub games_played: u32,
    pub results: Vec<PhaseResult>,
    pub current_phase: OffseasonPhase,
    pub phase_changed: bool,
    pub new_phase: Option<OffseasonPhase>,
    pub success: bool,
    pub message: String,
}

impl AdvanceDayResult {
    fn failure(state: Option<&DynastyState>, message: String) -> Self {
        Self {
            new_date: state.map(|s| format_date(s.current_date)).unwrap_or_default(),
            games_played: 0,
            results: Vec::new(),
            current_phase: state.map(|s| s.current_phase).unwrap_or(OffseasonPhase::PostSuperBowl),
            phase_changed: false,
            new_phase: None,
            success: false,
            message,
        }
    }
}

pub struct OffseasonController {
    db: Database,
    dynasty_id: String,
    config: DynastyConfig,
    standings_provider: Option<Box<dyn StandingsProvider>>,
    bracket_provider: Option<Box<dyn BracketProvider>>,
}

impl OffseasonController {
    pub fn new(db: Database, dynasty_id: impl Into<String>, config: DynastyConfig) -> Result<Self> {
        config.validate()?;
        let dynasty_id = dynasty_id.into();
        dynasty::get_dynasty(db.conn(), &dynasty_id)?;
        Ok(Self { db, dynasty_id, config, standings_provider: None, bracket_provider: None })
    }

    pub fn with_standings_provider(mut self, provider: impl StandingsProvider + 'static) -> Self {
        self.standings_provider = Some(Box::new(provider));
        self
    }

    pub fn with_bracket_provider(mut self, provider: impl BracketProvider + 'static) -> Self {
        self.bracket_provider = Some(Box::new(provider));
        self
    }

    /// Read standings rows and playoff game events from the dynasty's own tables.
    pub fn load_providers_from_database(self) -> Self {
        self.with_standings_provider(DatabaseStandings).with_bracket_provider(EventBracket)
    }

    pub fn dynasty_id(&self) -> &str {
        &self.dynasty_id
    }

    pub fn config(&self) -> &DynastyConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    pub fn state(&self) -> Result<DynastyState> {
        dynasty::load_state(self.db.conn(), &self.dynasty_id)
    }

    pub fn calendar(&self) -> Result<OffseasonCalendar> {
        Ok(OffseasonCalendar::new(self.state()?.season, &self.config.offseason))
    }

    /// Whether both providers are attached and their data is complete.
    pub fn can_calculate_draft_order(&self) -> Result<bool> {
        let providers = (&self.standings_provider, &self.bracket_provider);
        let (Some(standings), Some(bracket)) = providers else {
            return Ok(false);
        };
        let season = self.state()?.season;
        let standings = standings.standings(self.db.conn(), &self.dynasty_id, season)?;
        let bracket = bracket.bracket(self.db.conn(), &self.dynasty_id, season)?;
        Ok(DraftOrderCalculator::can_calculate(&standings, bracket.as_ref()))
    }

    pub fn franchise_tag_candidates(&self, team_id: u32) -> Result<Vec<FranchiseTagCandidate>> {
        let calendar = self.calendar()?;
        FranchiseTagManager::new(self.db.conn(), &self.dynasty_id, &self.config, &calendar)
            .get_franchise_tag_candidates(team_id)
    }

    /// Reset the clock to the Super Bowl of `season` and run the first
    /// phase's entry hook.
    pub fn begin_offseason(&mut self, season: u32) -> Result<Vec<PhaseResult>> {
        let Self { db, dynasty_id, config, standings_provider, bracket_provider } = self;
        let dynasty_id = dynasty_id.as_str();
        let config = &*config;
        let standings = standings_provider.as_deref();
        let bracket = bracket_provider.as_deref();

        db.transaction(|tx| {
            let calendar = OffseasonCalendar::new(season, &config.offseason);
            let user_team_id = dynasty::get_dynasty(tx, dynasty_id)?.user_team_id;
            let ctx = PhaseContext {
                conn: tx,
                dynasty_id,
                config,
                calendar: &calendar,
                user_team_id: Some(user_team_id),
                date: calendar.super_bowl(),
                standings,
                bracket,
            };
            let handler = PhaseHandler::for_phase(OffseasonPhase::PostSuperBowl);
            let results = vec![handler.on_enter(&ctx)?, handler.on_day(&ctx)?];
            dynasty::save_state(
                tx,
                &DynastyState {
                    dynasty_id: dynasty_id.to_string(),
                    current_date: calendar.super_bowl(),
                    season,
                    current_phase: OffseasonPhase::PostSuperBowl,
                },
            )?;
            tracing::info!(dynasty_id, season, "Offseason started");
            Ok(results)
        })
    }

    /// Advance one day. Never fails: errors roll the day back and come back
    /// as `success == false` with the state left where it was.
    pub fn advance_day(&mut self) -> AdvanceDayResult {
        let Self { db, dynasty_id, config, standings_provider, bracket_provider } = self;
        let dynasty_id = dynasty_id.as_str();
        let config = &*config;
        let standings = standings_provider.as_deref();
        let bracket = bracket_provider.as_deref();

        match db.transaction(|tx| advance(tx, dynasty_id, config, standings, bracket)) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(dynasty_id, error = %e, "Day advance rolled back");
                let state = dynasty::load_state(db.conn(), dynasty_id).ok();
                AdvanceDayResult::failure(state.as_ref(), e.to_string())
            }
        }
    }

    /// Advance up to `days` days, stopping after the first failure.
    pub fn advance_days(&mut self, days: u32) -> Vec<AdvanceDayResult> {
        let mut results = Vec::new();
        for _ in 0..days {
            let result = self.advance_day();
            let failed = !result.success;
            results.push(result);
            if failed {
                break;
            }
        }
        results
    }

    /// Advance until the dynasty reaches `target`. Stops after the first
    /// failed day, which is the last element returned.
    pub fn advance_to_phase(&mut self, target: OffseasonPhase) -> Result<Vec<AdvanceDayResult>> {
        let mut results = Vec::new();
        for _ in 0..MAX_ADVANCE_DAYS {
            if self.state()?.current_phase >= target {
                break;
            }
            let result = self.advance_day();
            let failed = !result.success;
            results.push(result);
            if failed {
                break;
            }
        }
        Ok(results)
    }
}

fn advance(
    conn: &Connection,
    dynasty_id: &str,
    config: &DynastyConfig,
    standings: Option<&dyn StandingsProvider>,
    bracket: Option<&dyn BracketProvider>,
) -> Result<AdvanceDayResult> {
    let state = dynasty::load_state(conn, dynasty_id)?;
    let user_team_id = dynasty::get_dynasty(conn, dynasty_id)?.user_team_id;
    let calendar = OffseasonCalendar::new(state.season, &config.offseason);
    let date = Calendar::new(state.current_date).advance_day();
    let previous = state.current_phase;
    let phase = previous.max(calendar.phase_for(date));

    let ctx = PhaseContext {
        conn,
        dynasty_id,
        config,
        calendar: &calendar,
        user_team_id: Some(user_team_id),
        date,
        standings,
        bracket,
    };

    let mut results = Vec::new();
    for entered in previous.span_to(phase) {
        let result = PhaseHandler::for_phase(entered).on_enter(&ctx)?;
        tracing::info!(phase = %entered, "{}", result.message);
        results.push(result);
    }
    results.push(PhaseHandler::for_phase(phase).on_day(&ctx)?);

    if phase.allows_trades() {
        let league = LeagueState::offseason(&calendar, phase, Some(user_team_id));
        let outcomes = TransactionAIManager::new(conn, dynasty_id, config).run_day(date, &league)?;
        let executed = outcomes.iter().filter(|o| o.is_executed()).count() as u32;
        if executed > 0 {
            results.push(
                PhaseResult::new(phase, PhaseHook::Trades, format!("{} trades executed", executed))
                    .with_transactions(executed),
            );
        }
    }

    dynasty::save_state(conn, &DynastyState { current_date: date, current_phase: phase, ..state })?;

    let phase_changed = phase != previous;
    let message = match results.last() {
        Some(last) if !phase_changed => last.message.clone(),
        _ => format!("Entered {}", phase),
    };
    tracing::debug!(dynasty_id, date = %date, phase = %phase, phase_changed, "Day advanced");
    Ok(AdvanceDayResult {
        new_date: format_date(date),
        games_played: 0,
        results,
        current_phase: phase,
        phase_changed,
        new_phase: phase_changed.then_some(phase),
        success: true,
        message,
    })
}
