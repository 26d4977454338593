//! Bounded counter-offer loop.
//!
//! Each round the responding side evaluates the current terms. A counter
//! adds the cheapest asset from the other side that closes the perceived
//! gap, or drops one of the responder's own assets when nothing can be
//! added. The loop ends on accept, reject, repeated terms, an impossible
//! counter or the iteration bound. The last three are a stalemate.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::evaluator::{TradeDecisionType, TradeEvaluator};
use super::generator::TradeParticipant;
use super::proposal::{ProposalStatus, TradeAsset, TradeProposal};
use super::value_calculator::TradeValueCalculator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NegotiationOutcome {
    Accepted { proposal: TradeProposal },
    Rejected { proposal: TradeProposal, reason: String },
    /// No convergent counter within the bound. An expected result, not an error.
    Stalemate { proposal: TradeProposal, reason: String },
}

impl NegotiationOutcome {
    pub fn proposal(&self) -> &TradeProposal {
        match self {
            NegotiationOutcome::Accepted { proposal }
            | NegotiationOutcome::Rejected { proposal, .. }
            | NegotiationOutcome::Stalemate { proposal, .. } => proposal,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, NegotiationOutcome::Accepted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationResult {
    pub outcome: NegotiationOutcome,
    /// Evaluations performed
    pub iterations: u32,
    /// Every set of terms put on the table, first to last
    pub history: Vec<TradeProposal>,
}

pub struct NegotiatorEngine<'a> {
    evaluator: &'a TradeEvaluator,
    calculator: &'a TradeValueCalculator,
    max_iterations: u32,
}

impl<'a> NegotiatorEngine<'a> {
    pub fn new(evaluator: &'a TradeEvaluator, calculator: &'a TradeValueCalculator) -> Self {
        let max_iterations = evaluator.config().max_iterations.max(1);
        Self { evaluator, calculator, max_iterations }
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn negotiate(
        &self,
        proposal: TradeProposal,
        proposer: &TradeParticipant,
        receiver: &TradeParticipant,
    ) -> NegotiationResult {
        let mut current = proposal;
        let mut history = vec![current.clone()];
        let mut seen = HashSet::from([current.terms_key()]);
        let (mut responder, mut other) = (receiver, proposer);

        for iteration in 1..=self.max_iterations {
            let decision = self.evaluator.evaluate(&current, responder);
            tracing::debug!(
                proposal_id = %current.proposal_id,
                team = responder.team_id(),
                iteration,
                ratio = decision.perceived_ratio,
                "negotiation step: {:?}",
                decision.decision
            );

            match decision.decision {
                TradeDecisionType::Accept => {
                    current.status = ProposalStatus::Accepted;
                    let outcome = NegotiationOutcome::Accepted { proposal: current };
                    return self.finish(outcome, iteration, history);
                }
                TradeDecisionType::Reject => {
                    current.status = ProposalStatus::Rejected;
                    let outcome = NegotiationOutcome::Rejected {
                        proposal: current,
                        reason: decision.rationale,
                    };
                    return self.finish(outcome, iteration, history);
                }
                TradeDecisionType::Counter => {
                    let Some(mut counter) = self.counter(&current, responder, other) else {
                        current.status = ProposalStatus::Stalemate;
                        let team_id = responder.team_id();
                        let outcome = NegotiationOutcome::Stalemate {
                            proposal: current,
                            reason: format!("team {} has no counter left to make", team_id),
                        };
                        return self.finish(outcome, iteration, history);
                    };
                    if !seen.insert(counter.terms_key()) {
                        current.status = ProposalStatus::Stalemate;
                        let outcome = NegotiationOutcome::Stalemate {
                            proposal: current,
                            reason: "terms repeated".to_string(),
                        };
                        return self.finish(outcome, iteration, history);
                    }
                    counter.status = ProposalStatus::Countered;
                    history.push(counter.clone());
                    counter.status = ProposalStatus::Proposed;
                    current = counter;
                    std::mem::swap(&mut responder, &mut other);
                }
            }
        }

        current.status = ProposalStatus::Stalemate;
        let outcome = NegotiationOutcome::Stalemate {
            proposal: current,
            reason: format!("no agreement after {} rounds", self.max_iterations),
        };
        self.finish(outcome, self.max_iterations, history)
    }

    fn finish(
        &self,
        outcome: NegotiationOutcome,
        iterations: u32,
        history: Vec<TradeProposal>,
    ) -> NegotiationResult {
        NegotiationResult { outcome, iterations, history }
    }

    /// Terms that improve `responder`'s perceived ratio, or `None`.
    fn counter(
        &self,
        current: &TradeProposal,
        responder: &TradeParticipant,
        other: &TradeParticipant,
    ) -> Option<TradeProposal> {
        let threshold = self.evaluator.config().accept_threshold;
        let (received, sent) = self.evaluator.perceived_totals(current, responder);
        let gap = sent * threshold - received;
        if gap <= 0.0 {
            return None;
        }

        let candidates: Vec<(TradeAsset, f64)> = other
            .tradeable_assets(self.calculator)
            .into_iter()
            .filter(|a| !current.contains_asset(&a.asset_id))
            .map(|a| {
                let worth = self.evaluator.perceived_value(&a, responder);
                (a, worth)
            })
            .filter(|(_, worth)| *worth > 0.0)
            .collect();

        // Cheapest asset that closes the gap, else the largest that narrows it
        let addition = candidates
            .iter()
            .filter(|(_, worth)| *worth >= gap)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .or_else(|| candidates.iter().max_by(|a, b| a.1.total_cmp(&b.1)))
            .map(|(asset, _)| asset.clone());

        let mut next = current.clone();
        next.iteration += 1;
        let responder_is_proposer = responder.team_id() == current.proposing_team_id;

        if let Some(asset) = addition {
            if responder_is_proposer {
                next.requested.push(asset);
            } else {
                next.offered.push(asset);
            }
            return Some(next);
        }

        // Nothing to ask for: withdraw the responder's cheapest outgoing asset
        let own = if responder_is_proposer { &mut next.offered } else { &mut next.requested };
        if own.len() < 2 {
            return None;
        }
        let cheapest = own
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.value.total_cmp(&b.1.value))
            .map(|(i, _)| i)?;
        own.remove(cheapest);
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NegotiationConfig, SalaryCapConfig};
    use crate::models::{DraftPick, TeamContext};
    use crate::needs::TeamNeeds;
    use crate::personality::{GMArchetype, PersonalityModifiers};
    use crate::valuation::MarketValueCalculator;

    fn calculator() -> TradeValueCalculator {
        TradeValueCalculator::new(MarketValueCalculator::new(SalaryCapConfig::default(), 2026))
    }

    fn evaluator() -> TradeEvaluator {
        TradeEvaluator::new(PersonalityModifiers::new(70_000_000.0), NegotiationConfig::default())
    }

    fn team(team_id: u32, picks: Vec<DraftPick>) -> TradeParticipant {
        TradeParticipant {
            context: TeamContext::neutral(team_id, 2026, 100_000_000),
            archetype: GMArchetype::Balanced,
            needs: TeamNeeds::default(),
            roster: Vec::new(),
            picks,
        }
    }

    fn picks(team_id: u32, season: u32) -> Vec<DraftPick> {
        (1..=7).map(|round| DraftPick::new(season, round, team_id)).collect()
    }

    #[test]
    fn test_counter_closes_small_gap() {
        let calc = calculator();
        let eval = evaluator();
        let proposer = team(1, picks(1, 2026));
        let receiver = team(2, picks(2, 2027));
        let mut top_ten = DraftPick::new(2026, 1, 2);
        top_ten.overall_pick = Some(10);
        // 1000 points for 1300: receiver counters, proposer trims, receiver accepts
        let offered = vec![calc.pick_asset(&proposer.picks[0])];
        let requested = vec![calc.pick_asset(&top_ten)];
        let proposal = TradeProposal::new(1, 2, offered, requested);

        let result = NegotiatorEngine::new(&eval, &calc).negotiate(proposal, &proposer, &receiver);
        let NegotiationOutcome::Accepted { proposal } = &result.outcome else {
            panic!("expected agreement, got {:?}", result.outcome);
        };
        assert_eq!(result.iterations, 3);
        assert_eq!(proposal.offered.len(), 2);
        assert_eq!(proposal.requested.len(), 2);
        assert_eq!(result.history.len(), 3);
        assert_eq!(proposal.status, ProposalStatus::Accepted);
    }

    #[test]
    fn test_terminates_without_assets() {
        let calc = calculator();
        let eval = evaluator();
        let proposer = team(1, Vec::new());
        let receiver = team(2, Vec::new());
        let proposal = TradeProposal::new(
            1,
            2,
            vec![calc.pick_asset(&DraftPick::new(2026, 2, 1))],
            vec![calc.pick_asset(&DraftPick::new(2026, 1, 2))],
        );
        let result = NegotiatorEngine::new(&eval, &calc).negotiate(proposal, &proposer, &receiver);
        // 420 vs 1000 points is below the counter floor
        assert!(matches!(result.outcome, NegotiationOutcome::Rejected { .. }));
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_stalemate_when_no_counter_exists() {
        let calc = calculator();
        let eval = evaluator();
        let proposer = team(1, Vec::new());
        let receiver = team(2, Vec::new());
        // 840 vs 1000 points: counter range, but the proposer has nothing to add
        let proposal = TradeProposal::new(
            1,
            2,
            vec![calc.pick_asset(&DraftPick::new(2026, 1, 1))],
            vec![calc.pick_asset(&DraftPick::new(2026, 1, 2))],
        );
        let mut proposal = proposal;
        proposal.offered[0].value = 840.0;
        proposal.requested[0].value = 1000.0;
        let result = NegotiatorEngine::new(&eval, &calc).negotiate(proposal, &proposer, &receiver);
        assert!(matches!(result.outcome, NegotiationOutcome::Stalemate { .. }));
    }
}
