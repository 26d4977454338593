//! Per-phase offseason work.
//!
//! Each phase has an entry hook and a daily hook. Hooks are idempotent: a
//! hook that runs again finds its earlier writes and adds nothing, so a day
//! that was rolled back can simply be replayed.

pub mod draft;
pub mod franchise_tag;
pub mod free_agency;
pub mod roster_moves;

use chrono::NaiveDate;
use rand_chacha::ChaCha8Rng;
use rusqlite::Connection;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::draft_order::{BracketProvider, StandingsProvider};
use super::{OffseasonCalendar, OffseasonPhase};
use crate::cap::SalaryCapCalculator;
use crate::config::DynastyConfig;
use crate::db::{league, roster, transaction_log};
use crate::error::Result;
use crate::events::EventStore;
use crate::models::{CapEventType, Contract, Team, TeamContext, TransactionRecord, TransactionType};
use crate::personality::PersonalityModifiers;
use crate::transactions::{build_team_context, daily_rng, LeagueState};
use crate::valuation::MarketValueCalculator;

pub use draft::{
    close_draft, draft_complete, prepare_draft, run_draft_if_ready, sign_undrafted_prospects,
    DRAFT_ORDER_PENDING,
};
pub use franchise_tag::{FranchiseTagCandidate, FranchiseTagManager};
pub use free_agency::{open_market, record_tampering_offers, sign_free_agents};
pub use roster_moves::{release_cap_casualties, trim_rosters, CutCandidate};

/// Which hook produced a [`PhaseResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseHook {
    Enter,
    Day,
    Trades,
}

/// What one hook did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PhaseResult {
    pub phase: OffseasonPhase,
    pub hook: PhaseHook,
    pub message: String,
    /// Roster transactions written by the hook
    pub transactions: u32,
}

impl PhaseResult {
    pub fn new(phase: OffseasonPhase, hook: PhaseHook, message: impl Into<String>) -> Self {
        Self { phase, hook, message: message.into(), transactions: 0 }
    }

    pub fn with_transactions(mut self, transactions: u32) -> Self {
        self.transactions = transactions;
        self
    }
}

/// Everything a hook may read or write for one simulated day.
pub struct PhaseContext<'a> {
    pub conn: &'a Connection,
    pub dynasty_id: &'a str,
    pub config: &'a DynastyConfig,
    pub calendar: &'a OffseasonCalendar,
    pub user_team_id: Option<u32>,
    pub date: NaiveDate,
    pub standings: Option<&'a dyn StandingsProvider>,
    pub bracket: Option<&'a dyn BracketProvider>,
}

impl<'a> PhaseContext<'a> {
    /// Season whose offseason this is.
    pub fn season(&self) -> u32 {
        self.calendar.season()
    }

    /// Season that new contracts, tags and the draft belong to.
    pub fn league_year(&self) -> u32 {
        self.calendar.league_year()
    }

    pub fn is_user_team(&self, team_id: u32) -> bool {
        self.user_team_id == Some(team_id)
    }

    /// Teams run by the AI, in id order.
    pub fn ai_teams(&self) -> Result<Vec<Team>> {
        Ok(league::list_teams(self.conn, self.dynasty_id)?
            .into_iter()
            .filter(|t| !self.is_user_team(t.team_id))
            .collect())
    }

    pub fn cap(&self) -> SalaryCapCalculator<'a> {
        SalaryCapCalculator::new(self.conn, self.dynasty_id, self.config.salary_cap.clone())
    }

    pub fn market(&self) -> MarketValueCalculator {
        MarketValueCalculator::new(self.config.salary_cap.clone(), self.league_year())
    }

    pub fn modifiers(&self) -> PersonalityModifiers {
        PersonalityModifiers::new(self.market().aav_ceiling() as f64)
    }

    pub fn events(&self) -> EventStore<'a> {
        EventStore::new(self.conn, self.dynasty_id)
    }

    pub fn team_context(&self, team_id: u32) -> Result<TeamContext> {
        let phase = self.calendar.phase_for(self.date);
        let state = LeagueState::offseason(self.calendar, phase, self.user_team_id);
        build_team_context(self.conn, self.dynasty_id, team_id, &state, &self.config.salary_cap)
    }

    /// Seeded per dynasty, day and purpose.
    pub fn rng(&self, purpose: &str) -> ChaCha8Rng {
        daily_rng(self.config.seed, &format!("{}/{}", self.dynasty_id, purpose), self.date)
    }

    pub fn log(
        &self,
        tx_type: TransactionType,
        team_id: u32,
        player_id: Option<&str>,
        details: serde_json::Value,
    ) -> Result<()> {
        transaction_log::log_transaction(
            self.conn,
            self.dynasty_id,
            &TransactionRecord {
                season: self.league_year(),
                date: self.date,
                tx_type,
                team_id,
                other_team_id: None,
                player_id: player_id.map(str::to_string),
                details,
            },
        )
    }

    /// Cap check, then [`Self::register_contract`].
    pub fn sign_contract(&self, contract: &Contract, tx_type: TransactionType) -> Result<()> {
        self.cap().validate_signing(contract.team_id, self.league_year(), contract)?;
        self.register_contract(contract, tx_type)
    }

    /// Make `contract` the player's active deal and put them on its team.
    /// Rookie contracts come through here without a cap check.
    pub fn register_contract(&self, contract: &Contract, tx_type: TransactionType) -> Result<()> {
        let player_id = contract.player_id.as_str();
        if let Some(previous) = roster::active_contract(self.conn, self.dynasty_id, player_id)? {
            roster::deactivate_contract(self.conn, self.dynasty_id, &previous.contract_id)?;
        }
        roster::insert_contract(self.conn, self.dynasty_id, contract)?;
        roster::set_player_team(self.conn, self.dynasty_id, player_id, Some(contract.team_id))?;
        self.cap().record_cap_event(
            contract.team_id,
            self.league_year(),
            CapEventType::Signing,
            contract.cap_hit(self.league_year()),
            self.date,
            &format!("{} {}", tx_type.as_str(), contract.player_id),
        )?;
        self.log(
            tx_type,
            contract.team_id,
            Some(&contract.player_id),
            serde_json::json!({
                "aav": contract.aav,
                "years": contract.years,
                "guaranteed": contract.guaranteed,
            }),
        )
    }
}

/// Hooks keyed by phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseHandler {
    PostSuperBowl,
    FranchiseTagPeriod,
    PreFreeAgency,
    FreeAgencyLegalTampering,
    FreeAgencyOpen,
    Draft,
    PostDraft,
    RosterCuts,
    Complete,
}

impl PhaseHandler {
    pub fn for_phase(phase: OffseasonPhase) -> Self {
        match phase {
            OffseasonPhase::PostSuperBowl => PhaseHandler::PostSuperBowl,
            OffseasonPhase::FranchiseTagPeriod => PhaseHandler::FranchiseTagPeriod,
            OffseasonPhase::PreFreeAgency => PhaseHandler::PreFreeAgency,
            OffseasonPhase::FreeAgencyLegalTampering => PhaseHandler::FreeAgencyLegalTampering,
            OffseasonPhase::FreeAgencyOpen => PhaseHandler::FreeAgencyOpen,
            OffseasonPhase::Draft => PhaseHandler::Draft,
            OffseasonPhase::PostDraft => PhaseHandler::PostDraft,
            OffseasonPhase::RosterCuts => PhaseHandler::RosterCuts,
            OffseasonPhase::Complete => PhaseHandler::Complete,
        }
    }

    pub fn phase(&self) -> OffseasonPhase {
        match self {
            PhaseHandler::PostSuperBowl => OffseasonPhase::PostSuperBowl,
            PhaseHandler::FranchiseTagPeriod => OffseasonPhase::FranchiseTagPeriod,
            PhaseHandler::PreFreeAgency => OffseasonPhase::PreFreeAgency,
            PhaseHandler::FreeAgencyLegalTampering => OffseasonPhase::FreeAgencyLegalTampering,
            PhaseHandler::FreeAgencyOpen => OffseasonPhase::FreeAgencyOpen,
            PhaseHandler::Draft => OffseasonPhase::Draft,
            PhaseHandler::PostDraft => OffseasonPhase::PostDraft,
            PhaseHandler::RosterCuts => OffseasonPhase::RosterCuts,
            PhaseHandler::Complete => OffseasonPhase::Complete,
        }
    }

    /// Runs once when the dynasty moves into the phase, including phases
    /// passed over in a single step.
    pub fn on_enter(&self, ctx: &PhaseContext<'_>) -> Result<PhaseResult> {
        let phase = self.phase();
        let result = |message: String, count: u32| -> Result<PhaseResult> {
            Ok(PhaseResult::new(phase, PhaseHook::Enter, message).with_transactions(count))
        };
        match self {
            PhaseHandler::PostSuperBowl => {
                let prepared = prepare_draft(ctx)?;
                result(prepared, 0)
            }
            PhaseHandler::FranchiseTagPeriod => {
                let deadline = ctx.calendar.franchise_tag_deadline();
                result(format!("Franchise tag window open until {}", deadline), 0)
            }
            PhaseHandler::PreFreeAgency => {
                // Tags missed on the deadline day are applied before cap work
                let tags = FranchiseTagManager::from_context(ctx)
                    .run_ai_tags(ctx.date, ctx.user_team_id)?;
                let cuts = release_cap_casualties(ctx)?;
                let message = format!("{} late franchise tags, {} cap casualties", tags, cuts);
                result(message, tags + cuts)
            }
            PhaseHandler::FreeAgencyLegalTampering => {
                let offers = record_tampering_offers(ctx)?;
                result(format!("{} agreements in principle", offers), 0)
            }
            PhaseHandler::FreeAgencyOpen => {
                let (expired, signed) = open_market(ctx)?;
                result(
                    format!("{} contracts expired, {} agreements executed", expired, signed),
                    expired + signed,
                )
            }
            PhaseHandler::Draft => {
                let (picks, message) = run_draft_if_ready(ctx)?;
                result(message, picks)
            }
            PhaseHandler::PostDraft => {
                let (count, message) = close_draft(ctx)?;
                result(message, count)
            }
            PhaseHandler::RosterCuts => result(
                format!(
                    "Rosters must be at {} by {}",
                    ctx.config.roster.regular_season_max,
                    ctx.calendar.roster_cut_deadline()
                ),
                0,
            ),
            PhaseHandler::Complete => {
                let cuts = trim_rosters(ctx)?;
                result(format!("Offseason complete, {} final cuts", cuts), cuts)
            }
        }
    }

    /// Runs on every day spent in the phase, entry day included.
    pub fn on_day(&self, ctx: &PhaseContext<'_>) -> Result<PhaseResult> {
        let phase = self.phase();
        let result = |message: String, count: u32| -> Result<PhaseResult> {
            Ok(PhaseResult::new(phase, PhaseHook::Day, message).with_transactions(count))
        };
        match self {
            PhaseHandler::PostSuperBowl => result(prepare_draft(ctx)?, 0),
            PhaseHandler::FranchiseTagPeriod
                if ctx.date == ctx.calendar.franchise_tag_deadline() =>
            {
                let tags = FranchiseTagManager::from_context(ctx)
                    .run_ai_tags(ctx.date, ctx.user_team_id)?;
                result(format!("Franchise tag deadline: {} players tagged", tags), tags)
            }
            PhaseHandler::FreeAgencyOpen => {
                let signed = sign_free_agents(ctx)?;
                result(format!("{} free agents signed", signed), signed)
            }
            PhaseHandler::Draft => {
                let (picks, message) = run_draft_if_ready(ctx)?;
                result(message, picks)
            }
            // A draft held back by a missing order still runs once results arrive
            PhaseHandler::PostDraft => {
                if draft_complete(ctx)? {
                    return result(format!("{} day", phase), 0);
                }
                let (count, message) = close_draft(ctx)?;
                result(message, count)
            }
            PhaseHandler::RosterCuts if ctx.date == ctx.calendar.roster_cut_deadline() => {
                let cuts = trim_rosters(ctx)?;
                result(format!("Roster cut deadline: {} players released", cuts), cuts)
            }
            PhaseHandler::Complete => {
                result("Offseason complete; ready for the regular season".to_string(), 0)
            }
            _ => result(format!("{} day", phase), 0),
        }
    }
}
