//! Trade valuation, proposal generation, negotiation and execution.

pub mod evaluator;
pub mod executor;
pub mod generator;
pub mod negotiator;
pub mod proposal;
pub mod value_calculator;

pub use evaluator::{TradeDecision, TradeDecisionType, TradeEvaluator};
pub use executor::TradeExecutor;
pub use generator::{TradeParticipant, TradeProposalGenerator};
pub use negotiator::{NegotiationOutcome, NegotiationResult, NegotiatorEngine};
pub use proposal::{
    AssetDetail, AssetKind, FairnessRating, ProposalStatus, TradeAsset, TradeProposal,
};
pub use value_calculator::TradeValueCalculator;
