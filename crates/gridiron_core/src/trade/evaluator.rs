//! Deterministic accept / reject / counter decisions.

use serde::{Deserialize, Serialize};

use super::generator::TradeParticipant;
use super::proposal::{AssetDetail, TradeAsset, TradeProposal};
use crate::config::NegotiationConfig;
use crate::personality::{DecisionContext, DecisionInputs, PersonalityModifiers};

/// How much a positional need inflates a player's worth to the evaluator.
const NEED_WEIGHT: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeDecisionType {
    Accept,
    Reject,
    Counter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDecision {
    pub decision: TradeDecisionType,
    /// Perceived value received divided by perceived value sent
    pub perceived_ratio: f64,
    pub rationale: String,
}

#[derive(Debug, Clone)]
pub struct TradeEvaluator {
    modifiers: PersonalityModifiers,
    config: NegotiationConfig,
}

impl TradeEvaluator {
    pub fn new(modifiers: PersonalityModifiers, config: NegotiationConfig) -> Self {
        Self { modifiers, config }
    }

    pub fn config(&self) -> &NegotiationConfig {
        &self.config
    }

    /// Worth of one asset through the team's personality and needs.
    pub fn perceived_value(&self, asset: &TradeAsset, team: &TradeParticipant) -> f64 {
        match &asset.detail {
            AssetDetail::Player { profile, .. } => {
                let inputs =
                    DecisionInputs::new(DecisionContext::Trade, *profile, asset.value, 0.0, 0.0);
                let adjusted = self.modifiers.apply(inputs, team.archetype, &team.context);
                adjusted.value * (1.0 + NEED_WEIGHT * team.needs.weight(profile.position))
            }
            AssetDetail::DraftPick { .. } => {
                let traits = PersonalityModifiers::effective_traits(team.archetype, &team.context);
                asset.value * PersonalityModifiers::pick_value_multiplier(&traits)
            }
        }
    }

    /// `(received, sent)` in perceived points from `team`'s side.
    pub fn perceived_totals(
        &self,
        proposal: &TradeProposal,
        team: &TradeParticipant,
    ) -> (f64, f64) {
        let (received, sent) = proposal.sides_for(team.team_id());
        let sum = |assets: &[TradeAsset]| -> f64 {
            assets.iter().map(|a| self.perceived_value(a, team)).sum()
        };
        (sum(received), sum(sent))
    }

    pub fn perceived_ratio(&self, proposal: &TradeProposal, team: &TradeParticipant) -> f64 {
        let (received, sent) = self.perceived_totals(proposal, team);
        if sent <= 0.0 {
            return if received > 0.0 { f64::INFINITY } else { 1.0 };
        }
        received / sent
    }

    /// Same proposal, archetype and context always give the same decision.
    pub fn evaluate(&self, proposal: &TradeProposal, team: &TradeParticipant) -> TradeDecision {
        let team_id = team.team_id();
        let ratio = self.perceived_ratio(proposal, team);

        let (received, sent) = proposal.sides_for(team_id);
        let net_cap: i64 = received.iter().map(TradeAsset::cap_hit).sum::<i64>()
            - sent.iter().map(TradeAsset::cap_hit).sum::<i64>();
        if net_cap > 0 && net_cap > team.context.cap_space {
            return TradeDecision {
                decision: TradeDecisionType::Reject,
                perceived_ratio: ratio,
                rationale: format!(
                    "Team {} cannot absorb ${} in cap (space ${})",
                    team_id, net_cap, team.context.cap_space
                ),
            };
        }

        let (decision, rationale) = if ratio >= self.config.accept_threshold {
            (
                TradeDecisionType::Accept,
                format!("{} GM values the return at {:.2}x", team.archetype, ratio),
            )
        } else if ratio >= self.config.counter_floor {
            (
                TradeDecisionType::Counter,
                format!("{} GM sees {:.2}x and wants more", team.archetype, ratio),
            )
        } else {
            (
                TradeDecisionType::Reject,
                format!("{} GM rejects a {:.2}x return", team.archetype, ratio),
            )
        };
        TradeDecision { decision, perceived_ratio: ratio, rationale }
    }
}
