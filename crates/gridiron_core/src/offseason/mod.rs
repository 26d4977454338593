//! The offseason state machine: phases, their calendar, the per-phase
//! handlers and the controller that advances the dynasty one day at a time.

pub mod calendar;
pub mod controller;
pub mod draft_order;
pub mod handlers;
pub mod phase;

pub use calendar::OffseasonCalendar;
pub use controller::{AdvanceDayResult, OffseasonController};
pub use draft_order::{
    BracketProvider, DatabaseStandings, DraftOrderCalculator, EventBracket, PlayoffBracket,
    StandingsProvider, StaticBracket, StaticStandings,
};
pub use handlers::{
    FranchiseTagCandidate, FranchiseTagManager, PhaseContext, PhaseHandler, PhaseHook, PhaseResult,
};
pub use phase::OffseasonPhase;
