use serde::{Deserialize, Serialize};

use crate::personality::PlayerProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetKind {
    Player,
    DraftPick,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetDetail {
    Player {
        profile: PlayerProfile,
        contract_id: Option<String>,
        /// Cap hit in the trade season
        cap_hit: i64,
    },
    DraftPick {
        season: u32,
        round: u32,
        overall_pick: Option<u32>,
    },
}

/// One player or pick changing hands, valued in trade points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeAsset {
    /// Player id or pick id
    pub asset_id: String,
    pub owner_team_id: u32,
    pub description: String,
    pub value: f64,
    pub detail: AssetDetail,
}

impl TradeAsset {
    pub fn kind(&self) -> AssetKind {
        match self.detail {
            AssetDetail::Player { .. } => AssetKind::Player,
            AssetDetail::DraftPick { .. } => AssetKind::DraftPick,
        }
    }

    pub fn cap_hit(&self) -> i64 {
        match self.detail {
            AssetDetail::Player { cap_hit, .. } => cap_hit,
            AssetDetail::DraftPick { .. } => 0,
        }
    }

    pub fn profile(&self) -> Option<&PlayerProfile> {
        match &self.detail {
            AssetDetail::Player { profile, .. } => Some(profile),
            AssetDetail::DraftPick { .. } => None,
        }
    }
}

pub fn total_value(assets: &[TradeAsset]) -> f64 {
    assets.iter().map(|a| a.value).sum()
}

/// Negotiation state of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    Proposed,
    Countered,
    Accepted,
    Rejected,
    Stalemate,
}

impl ProposalStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProposalStatus::Accepted | ProposalStatus::Rejected | ProposalStatus::Stalemate
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FairnessRating {
    /// Within 5% either way
    Balanced,
    /// Inside the acceptable band
    Fair,
    Lopsided,
    VeryLopsided,
}

impl FairnessRating {
    pub fn from_ratio(ratio: f64, band_min: f64, band_max: f64) -> Self {
        if !ratio.is_finite() || ratio <= 0.0 {
            return FairnessRating::VeryLopsided;
        }
        if (0.95..=1.05).contains(&ratio) {
            FairnessRating::Balanced
        } else if (band_min..=band_max).contains(&ratio) {
            FairnessRating::Fair
        } else if (band_min * band_min..=band_max * band_max).contains(&ratio) {
            FairnessRating::Lopsided
        } else {
            FairnessRating::VeryLopsided
        }
    }

    pub fn is_acceptable(&self) -> bool {
        matches!(self, FairnessRating::Balanced | FairnessRating::Fair)
    }
}

/// Assets moving between exactly two teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeProposal {
    pub proposal_id: String,
    pub proposing_team_id: u32,
    pub receiving_team_id: u32,
    /// Proposer to receiver
    pub offered: Vec<TradeAsset>,
    /// Receiver to proposer
    pub requested: Vec<TradeAsset>,
    pub status: ProposalStatus,
    /// Number of counters applied so far
    pub iteration: u32,
}

impl TradeProposal {
    pub fn new(
        proposing_team_id: u32,
        receiving_team_id: u32,
        offered: Vec<TradeAsset>,
        requested: Vec<TradeAsset>,
    ) -> Self {
        Self {
            proposal_id: uuid::Uuid::new_v4().to_string(),
            proposing_team_id,
            receiving_team_id,
            offered,
            requested,
            status: ProposalStatus::Proposed,
            iteration: 0,
        }
    }

    pub fn offered_value(&self) -> f64 {
        total_value(&self.offered)
    }

    pub fn requested_value(&self) -> f64 {
        total_value(&self.requested)
    }

    /// Value the proposer receives divided by value it sends.
    pub fn fairness_ratio(&self) -> f64 {
        let sent = self.offered_value();
        let received = self.requested_value();
        if sent <= 0.0 {
            return if received <= 0.0 { 1.0 } else { f64::INFINITY };
        }
        received / sent
    }

    pub fn fairness_rating(&self, band_min: f64, band_max: f64) -> FairnessRating {
        FairnessRating::from_ratio(self.fairness_ratio(), band_min, band_max)
    }

    pub fn involves(&self, team_id: u32) -> bool {
        self.proposing_team_id == team_id || self.receiving_team_id == team_id
    }

    pub fn contains_asset(&self, asset_id: &str) -> bool {
        self.offered.iter().chain(&self.requested).any(|a| a.asset_id == asset_id)
    }

    /// `(received, sent)` assets from `team_id`'s side.
    pub fn sides_for(&self, team_id: u32) -> (&[TradeAsset], &[TradeAsset]) {
        if team_id == self.proposing_team_id {
            (&self.requested, &self.offered)
        } else {
            (&self.offered, &self.requested)
        }
    }

    /// Order-independent fingerprint of the terms, for repeat detection.
    pub fn terms_key(&self) -> (Vec<String>, Vec<String>) {
        let ids = |assets: &[TradeAsset]| {
            let mut ids: Vec<String> = assets.iter().map(|a| a.asset_id.clone()).collect();
            ids.sort();
            ids
        };
        (ids(&self.offered), ids(&self.requested))
    }

    pub fn summary(&self) -> String {
        let names = |assets: &[TradeAsset]| {
            assets.iter().map(|a| a.description.as_str()).collect::<Vec<_>>().join(", ")
        };
        format!(
            "Team {} sends [{}] to team {} for [{}]",
            self.proposing_team_id,
            names(&self.offered),
            self.receiving_team_id,
            names(&self.requested)
        )
    }
}
