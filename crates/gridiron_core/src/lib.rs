//! # gridiron_core - Football Dynasty Offseason Engine
//!
//! Drives the offseason of a 32-team professional football league from the
//! Super Bowl to roster cuts, one simulated day at a time.
//!
//! ## Features
//! - Deterministic AI front offices (same seed, dynasty and date = same moves)
//! - Contract valuation from positional benchmarks and a convex rating curve
//! - Trade proposal, evaluation and negotiation shaped by GM archetypes
//! - Salary cap accounting with prorated bonuses and dead money
//! - SQLite persistence with one transaction per simulated day
//! - JSON API for easy integration with a presentation layer

// Dynasty APIs thread connection, dynasty, config and dates through most calls
#![allow(clippy::too_many_arguments)]

pub mod api;
pub mod calendar;
pub mod cap;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod league;
pub mod models;
pub mod needs;
pub mod offseason;
pub mod personality;
pub mod trade;
pub mod transactions;
pub mod valuation;

// Re-export main API functions
pub use api::{advance_day_json, advance_day_schema_json, franchise_tag_candidates_json};
pub use error::{DynastyError, Result};

pub use cap::{CapSummary, SalaryCapCalculator};
pub use config::DynastyConfig;
pub use db::Database;
pub use events::{EventRecord, EventStore, EventType, SimEvent};
pub use league::{LeagueGenerator, LeagueSummary};
pub use models::{
    Contract, DraftPick, DraftProspect, Dynasty, DynastyState, Player, Position, Team, TeamContext,
};
pub use needs::{TeamNeeds, TeamNeedsAnalyzer};
pub use offseason::{
    AdvanceDayResult, FranchiseTagCandidate, FranchiseTagManager, OffseasonCalendar,
    OffseasonController, OffseasonPhase, PhaseResult,
};
pub use personality::{GMArchetype, PersonalityModifiers};
pub use trade::{
    NegotiationOutcome, NegotiatorEngine, TradeEvaluator, TradeProposal, TradeProposalGenerator,
};
pub use transactions::{TransactionAIManager, TransactionOutcome};
pub use valuation::{
    calculate_franchise_tag_value, calculate_player_value, ContractValue, MarketValueCalculator,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
