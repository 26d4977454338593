//! Daily AI trade activity.
//!
//! Each AI team rolls once per day against its trade probability. A team
//! that hits looks for partners in a seeded random order and negotiates the
//! generated proposals until one is accepted or the attempt budget runs
//! out. Everything after the roll is deterministic.

use chrono::NaiveDate;
use fxhash::FxHasher;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

use super::context::{build_team_context, LeagueState};
use crate::calendar;
use crate::config::DynastyConfig;
use crate::db::{draft, league, roster, transaction_log};
use crate::error::{DynastyError, Result};
use crate::events::TradeEvent;
use crate::models::{PlayoffPosition, TeamContext, TransactionType};
use crate::needs::TeamNeedsAnalyzer;
use crate::personality::{GMArchetype, PersonalityModifiers};
use crate::trade::{
    NegotiationResult, NegotiatorEngine, TradeEvaluator, TradeExecutor, TradeParticipant,
    TradeProposalGenerator, TradeValueCalculator,
};
use crate::valuation::MarketValueCalculator;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    Cooldown,
    DailyLimit,
    NoCapSpace,
    NoTradeableAssets,
    NoProposal,
    ExecutionFailed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionOutcome {
    Skipped {
        team_id: u32,
        reason: SkipReason,
    },
    /// A negotiation ran; accepted results are executed by `run_day`
    Negotiated {
        team_id: u32,
        partner_team_id: u32,
        result: NegotiationResult,
    },
    Executed {
        team_id: u32,
        partner_team_id: u32,
        trade: TradeEvent,
    },
}

impl TransactionOutcome {
    pub fn team_id(&self) -> u32 {
        match self {
            TransactionOutcome::Skipped { team_id, .. }
            | TransactionOutcome::Negotiated { team_id, .. }
            | TransactionOutcome::Executed { team_id, .. } => *team_id,
        }
    }

    pub fn is_executed(&self) -> bool {
        matches!(self, TransactionOutcome::Executed { .. })
    }
}

/// Daily RNG reproducible per dynasty and date.
pub fn daily_rng(seed: u64, dynasty_id: &str, date: NaiveDate) -> ChaCha8Rng {
    let mut hasher = FxHasher::default();
    seed.hash(&mut hasher);
    dynasty_id.hash(&mut hasher);
    calendar::format_date(date).hash(&mut hasher);
    ChaCha8Rng::seed_from_u64(hasher.finish())
}

pub struct TransactionAIManager<'a> {
    conn: &'a Connection,
    dynasty_id: &'a str,
    config: &'a DynastyConfig,
}

impl<'a> TransactionAIManager<'a> {
    pub fn new(conn: &'a Connection, dynasty_id: &'a str, config: &'a DynastyConfig) -> Self {
        Self { conn, dynasty_id, config }
    }

    fn in_cooldown(&self, context: &TeamContext, date: NaiveDate) -> bool {
        context
            .days_since_last_trade(date)
            .is_some_and(|days| days < self.config.transactions.trade_cooldown_days)
    }

    /// Chance in `[0, 1]` that the team looks for a trade on `date`.
    pub fn trade_probability(
        &self,
        context: &TeamContext,
        archetype: GMArchetype,
        date: NaiveDate,
        trade_deadline: NaiveDate,
    ) -> f64 {
        let cfg = &self.config.transactions;
        if date > trade_deadline || self.in_cooldown(context, date) {
            return 0.0;
        }

        let mut probability = cfg.base_daily_probability;
        match context.playoff_position {
            PlayoffPosition::Contender => probability *= cfg.playoff_push_multiplier,
            PlayoffPosition::Eliminated => probability *= cfg.eliminated_multiplier,
            PlayoffPosition::Bubble => {}
        }
        if context.losing_streak() >= cfg.losing_streak_threshold {
            probability *= cfg.losing_streak_multiplier;
        }
        if (trade_deadline - date).num_days() <= cfg.deadline_window_days {
            probability *= cfg.deadline_multiplier;
        }
        let traits = PersonalityModifiers::effective_traits(archetype, context);
        probability *= PersonalityModifiers::trade_probability_multiplier(&traits);
        probability.clamp(0.0, 1.0)
    }

    /// Roster and picks are only loaded for teams that get involved.
    fn participant(
        &self,
        context: &TeamContext,
        archetype: GMArchetype,
        state: &LeagueState,
    ) -> Result<TradeParticipant> {
        let roster = roster::team_roster(self.conn, self.dynasty_id, context.team_id)?;
        let needs = TeamNeedsAnalyzer::analyze(roster.iter().map(|e| &e.player));
        let picks = draft::team_available_picks(
            self.conn,
            self.dynasty_id,
            context.team_id,
            state.draft_season,
        )?;
        Ok(TradeParticipant { context: context.clone(), archetype, needs, roster, picks })
    }

    fn ensure_participant(
        &self,
        built: &mut HashMap<u32, TradeParticipant>,
        teams: &BTreeMap<u32, (GMArchetype, TeamContext)>,
        team_id: u32,
        state: &LeagueState,
    ) -> Result<()> {
        if built.contains_key(&team_id) {
            return Ok(());
        }
        if let Some((archetype, context)) = teams.get(&team_id) {
            built.insert(team_id, self.participant(context, *archetype, state)?);
        }
        Ok(())
    }

    /// Decide the day's AI trades without writing anything.
    ///
    /// Returns no outcomes at all once trades are closed or the deadline has
    /// passed. The user's team never proposes and is never a partner.
    pub fn evaluate_day(
        &self,
        date: NaiveDate,
        state: &LeagueState,
    ) -> Result<Vec<TransactionOutcome>> {
        if !state.trades_open || date > state.trade_deadline {
            return Ok(Vec::new());
        }
        let cfg = &self.config.transactions;

        let market = MarketValueCalculator::new(self.config.salary_cap.clone(), state.season);
        let calculator =
            TradeValueCalculator::new(market.clone()).with_draft_season(state.draft_season);
        let generator = TradeProposalGenerator::new(
            calculator.clone(),
            &self.config.negotiation,
            cfg.max_proposals_per_attempt,
        );
        let evaluator = TradeEvaluator::new(
            PersonalityModifiers::new(market.aav_ceiling() as f64),
            self.config.negotiation.clone(),
        );
        let negotiator = NegotiatorEngine::new(&evaluator, &calculator);

        let mut teams: BTreeMap<u32, (GMArchetype, TeamContext)> = BTreeMap::new();
        let mut done_today: HashMap<u32, u32> = HashMap::new();
        for team in league::list_teams(self.conn, self.dynasty_id)? {
            if state.is_user_team(team.team_id) {
                continue;
            }
            let trades = transaction_log::count_transactions_on(
                self.conn,
                self.dynasty_id,
                team.team_id,
                date,
                TransactionType::Trade,
            )?;
            done_today.insert(team.team_id, trades);
            let context = build_team_context(
                self.conn,
                self.dynasty_id,
                team.team_id,
                state,
                &self.config.salary_cap,
            )?;
            teams.insert(team.team_id, (team.gm_archetype, context));
        }

        let mut rng = daily_rng(self.config.seed, self.dynasty_id, date);
        let rolls: Vec<(u32, f64)> = teams.keys().map(|&id| (id, rng.gen::<f64>())).collect();
        let limit = cfg.max_transactions_per_team_per_day;
        let mut built: HashMap<u32, TradeParticipant> = HashMap::new();
        let mut outcomes = Vec::new();

        for (team_id, roll) in rolls {
            let (archetype, context) = &teams[&team_id];
            let skip = |reason| TransactionOutcome::Skipped { team_id, reason };

            if done_today.get(&team_id).copied().unwrap_or(0) >= limit {
                outcomes.push(skip(SkipReason::DailyLimit));
                continue;
            }
            if self.in_cooldown(context, date) {
                outcomes.push(skip(SkipReason::Cooldown));
                continue;
            }
            if context.cap_space <= 0 {
                outcomes.push(skip(SkipReason::NoCapSpace));
                continue;
            }
            let probability =
                self.trade_probability(context, *archetype, date, state.trade_deadline);
            if roll >= probability {
                continue;
            }
            self.ensure_participant(&mut built, &teams, team_id, state)?;
            if !built[&team_id].has_tradeable_assets(&calculator) {
                outcomes.push(skip(SkipReason::NoTradeableAssets));
                continue;
            }

            let mut partners: Vec<u32> = teams
                .iter()
                .filter(|&(&id, _)| id != team_id)
                .filter(|&(id, _)| done_today.get(id).copied().unwrap_or(0) < limit)
                .filter(|&(_, (_, partner))| !self.in_cooldown(partner, date))
                .map(|(&id, _)| id)
                .collect();
            partners.shuffle(&mut rng);

            let mut budget = cfg.max_proposals_per_attempt;
            let mut last: Option<(u32, NegotiationResult)> = None;
            'partners: for partner_id in partners {
                self.ensure_participant(&mut built, &teams, partner_id, state)?;
                let (proposer, partner) = (&built[&team_id], &built[&partner_id]);
                for proposal in generator.generate(proposer, partner, &mut rng) {
                    if budget == 0 {
                        break 'partners;
                    }
                    budget -= 1;
                    let result = negotiator.negotiate(proposal, proposer, partner);
                    let accepted = result.outcome.is_accepted();
                    last = Some((partner_id, result));
                    if accepted {
                        break 'partners;
                    }
                }
            }

            match last {
                Some((partner_team_id, result)) => {
                    if result.outcome.is_accepted() {
                        *done_today.entry(team_id).or_default() += 1;
                        *done_today.entry(partner_team_id).or_default() += 1;
                    }
                    tracing::debug!(
                        team_id,
                        partner_team_id,
                        iterations = result.iterations,
                        accepted = result.outcome.is_accepted(),
                        "AI trade negotiation finished"
                    );
                    outcomes.push(TransactionOutcome::Negotiated {
                        team_id,
                        partner_team_id,
                        result,
                    });
                }
                None => outcomes.push(skip(SkipReason::NoProposal)),
            }
        }

        Ok(outcomes)
    }

    /// [`Self::evaluate_day`] plus execution of every accepted trade. Run it
    /// inside the day's SQL transaction.
    pub fn run_day(
        &self,
        date: NaiveDate,
        state: &LeagueState,
    ) -> Result<Vec<TransactionOutcome>> {
        let executor =
            TradeExecutor::new(self.conn, self.dynasty_id, self.config.salary_cap.clone());
        let mut outcomes = Vec::new();
        for outcome in self.evaluate_day(date, state)? {
            let TransactionOutcome::Negotiated {
                team_id,
                partner_team_id,
                result,
            } = &outcome
            else {
                outcomes.push(outcome);
                continue;
            };
            if !result.outcome.is_accepted() {
                outcomes.push(outcome);
                continue;
            }
            match executor.execute(result.outcome.proposal(), state.season, date) {
                Ok(trade) => outcomes.push(TransactionOutcome::Executed {
                    team_id: *team_id,
                    partner_team_id: *partner_team_id,
                    trade,
                }),
                // Rejected before anything was written
                Err(
                    e @ (DynastyError::CapViolation { .. }
                    | DynastyError::InvariantViolation(_)
                    | DynastyError::DraftPickReused { .. }),
                ) => {
                    tracing::warn!(team_id = *team_id, "AI trade not executed: {}", e);
                    outcomes.push(TransactionOutcome::Skipped {
                        team_id: *team_id,
                        reason: SkipReason::ExecutionFailed(e.to_string()),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(outcomes)
    }
}
