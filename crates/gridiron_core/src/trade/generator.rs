//! Candidate trade proposals between two teams.

use rand::seq::SliceRandom;
use rand::Rng;

use super::proposal::{TradeAsset, TradeProposal};
use super::value_calculator::TradeValueCalculator;
use crate::config::NegotiationConfig;
use crate::models::{DraftPick, RosterEntry, TeamContext};
use crate::needs::{requirement, NeedUrgency, TeamNeeds, STARTER_QUALITY};
use crate::personality::GMArchetype;

/// Everything the trade engine needs to know about one side.
#[derive(Debug, Clone)]
pub struct TradeParticipant {
    pub context: TeamContext,
    pub archetype: GMArchetype,
    pub needs: TeamNeeds,
    pub roster: Vec<RosterEntry>,
    /// Unused picks the team owns
    pub picks: Vec<DraftPick>,
}

impl TradeParticipant {
    pub fn team_id(&self) -> u32 {
        self.context.team_id
    }

    /// Players and picks this team would part with, most valuable first.
    ///
    /// Starters at positions the team still needs are never offered, nor are
    /// franchise-tagged players.
    pub fn tradeable_assets(&self, calculator: &TradeValueCalculator) -> Vec<TradeAsset> {
        let mut assets: Vec<TradeAsset> = Vec::new();
        for entry in &self.roster {
            if entry.is_franchise_tagged() || !self.is_expendable(entry) {
                continue;
            }
            assets.push(calculator.player_asset(&entry.player, entry.contract.as_ref()));
        }
        let open_picks = self.picks.iter().filter(|p| !p.is_used());
        assets.extend(open_picks.map(|p| calculator.pick_asset(p)));
        assets.sort_by(by_value);
        assets
    }

    pub fn has_tradeable_assets(&self, calculator: &TradeValueCalculator) -> bool {
        !self.tradeable_assets(calculator).is_empty()
    }

    fn is_expendable(&self, entry: &RosterEntry) -> bool {
        let position = entry.player.position;
        if self.needs.urgency(position) >= NeedUrgency::Medium {
            return false;
        }
        // Keep the starters; depth behind them is available
        let depth_rank = self
            .roster
            .iter()
            .filter(|e| e.player.position == position)
            .filter(|e| {
                (e.player.overall, std::cmp::Reverse(&e.player.player_id))
                    > (entry.player.overall, std::cmp::Reverse(&entry.player.player_id))
            })
            .count() as u32;
        depth_rank >= requirement(position).starters
    }
}

/// Most valuable first, ties by asset id.
fn by_value(a: &TradeAsset, b: &TradeAsset) -> std::cmp::Ordering {
    b.value.total_cmp(&a.value).then_with(|| a.asset_id.cmp(&b.asset_id))
}

pub struct TradeProposalGenerator {
    calculator: TradeValueCalculator,
    band_min: f64,
    band_max: f64,
    max_proposals: usize,
}

impl TradeProposalGenerator {
    pub fn new(
        calculator: TradeValueCalculator,
        negotiation: &NegotiationConfig,
        max_proposals: usize,
    ) -> Self {
        Self {
            calculator,
            band_min: negotiation.fairness_min,
            band_max: negotiation.fairness_max,
            max_proposals,
        }
    }

    pub fn calculator(&self) -> &TradeValueCalculator {
        &self.calculator
    }

    /// Proposals from `proposer` to `partner`, each inside the fairness band.
    ///
    /// Targets are partner starters at positions where the proposer has a
    /// High or Critical need and the partner does not. Randomness only picks
    /// which targets are tried.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        proposer: &TradeParticipant,
        partner: &TradeParticipant,
        rng: &mut R,
    ) -> Vec<TradeProposal> {
        let wanted = proposer.needs.positions_at_least(NeedUrgency::High);
        if wanted.is_empty() {
            return Vec::new();
        }

        let mut targets: Vec<TradeAsset> = partner
            .roster
            .iter()
            .filter(|e| wanted.contains(&e.player.position))
            .filter(|e| partner.needs.urgency(e.player.position) < NeedUrgency::High)
            .filter(|e| e.player.overall >= STARTER_QUALITY && !e.is_franchise_tagged())
            .map(|e| self.calculator.player_asset(&e.player, e.contract.as_ref()))
            .collect();
        targets.sort_by(by_value);
        targets.truncate(self.max_proposals * 2);
        targets.shuffle(rng);

        let pool = proposer.tradeable_assets(&self.calculator);
        targets
            .into_iter()
            .filter_map(|target| {
                let offer = self.assemble_offer(target.value, &pool)?;
                Some(TradeProposal::new(proposer.team_id(), partner.team_id(), offer, vec![target]))
            })
            .take(self.max_proposals)
            .collect()
    }

    /// Greedy package worth between `target / band_max` and `target / band_min`.
    pub fn assemble_offer(&self, target: f64, pool: &[TradeAsset]) -> Option<Vec<TradeAsset>> {
        if target <= 0.0 {
            return None;
        }
        let floor = target / self.band_max;
        let ceiling = target / self.band_min;

        let mut offer = Vec::new();
        let mut total = 0.0;
        for asset in pool {
            if total >= floor {
                break;
            }
            if asset.value > 0.0 && total + asset.value <= ceiling {
                total += asset.value;
                offer.push(asset.clone());
            }
        }
        (total >= floor).then_some(offer)
    }
}
