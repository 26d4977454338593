//! AI-driven trade activity between non-user teams.

pub mod context;
pub mod manager;

pub use context::{build_team_context, playoff_position, LeagueState};
pub use manager::{daily_rng, SkipReason, TransactionAIManager, TransactionOutcome};
