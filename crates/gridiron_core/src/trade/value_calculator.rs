//! Trade point values for players and draft picks.
//!
//! Picks follow the classic Jimmy Johnson chart (3000 points for the first
//! overall pick). Player values are scaled onto the same range so a prime
//! elite quarterback is worth roughly a top-three pick.

use crate::models::{Contract, DraftPick, Player};
use crate::personality::PlayerProfile;
use crate::valuation::{benchmark, MarketValueCalculator};

use super::proposal::{AssetDetail, TradeAsset};

/// Points for overall picks 1 through 128.
const PICK_CHART: [f64; 128] = [
    3000.0, 2600.0, 2200.0, 1800.0, 1700.0, 1600.0, 1500.0, 1400.0, // 1-8
    1350.0, 1300.0, 1250.0, 1200.0, 1150.0, 1100.0, 1050.0, 1000.0, // 9-16
    950.0, 900.0, 875.0, 850.0, 800.0, 780.0, 760.0, 740.0, // 17-24
    720.0, 700.0, 680.0, 660.0, 640.0, 620.0, 600.0, 590.0, // 25-32
    580.0, 560.0, 550.0, 540.0, 530.0, 520.0, 510.0, 500.0, // 33-40
    490.0, 480.0, 470.0, 460.0, 450.0, 440.0, 430.0, 420.0, // 41-48
    410.0, 400.0, 390.0, 380.0, 370.0, 360.0, 350.0, 340.0, // 49-56
    330.0, 320.0, 310.0, 300.0, 292.0, 284.0, 276.0, 270.0, // 57-64
    265.0, 260.0, 255.0, 250.0, 245.0, 240.0, 235.0, 230.0, // 65-72
    225.0, 220.0, 215.0, 210.0, 205.0, 200.0, 195.0, 190.0, // 73-80
    185.0, 180.0, 175.0, 170.0, 165.0, 160.0, 155.0, 150.0, // 81-88
    145.0, 140.0, 136.0, 132.0, 128.0, 124.0, 120.0, 116.0, // 89-96
    112.0, 108.0, 104.0, 100.0, 96.0, 92.0, 88.0, 86.0, // 97-104
    84.0, 82.0, 80.0, 78.0, 76.0, 74.0, 72.0, 70.0, // 105-112
    68.0, 66.0, 64.0, 62.0, 60.0, 58.0, 56.0, 54.0, // 113-120
    52.0, 50.0, 49.0, 48.0, 47.0, 46.0, 45.0, 44.0, // 121-128
];

/// Last pick of a seven-round, 32-team draft.
const LAST_PICK: u32 = 224;
const TAIL_FLOOR: f64 = 2.0;

const PLAYER_SCALE: f64 = 1800.0;
const PLAYER_RATING_FLOOR: f64 = 50.0;
const PLAYER_RATING_SPAN: f64 = 45.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TradeValueCalculator {
    market: MarketValueCalculator,
    /// Picks in later drafts lose this share per year
    future_discount: f64,
    teams: u32,
    /// Next draft to be held; picks in this draft are undiscounted
    draft_season: u32,
}

impl TradeValueCalculator {
    pub fn new(market: MarketValueCalculator) -> Self {
        let draft_season = market.season();
        Self { market, future_discount: 0.15, teams: 32, draft_season }
    }

    /// During the regular season the next draft belongs to the following year.
    pub fn with_draft_season(mut self, draft_season: u32) -> Self {
        self.draft_season = draft_season;
        self
    }

    pub fn season(&self) -> u32 {
        self.market.season()
    }

    /// Chart value for an overall pick number.
    pub fn chart_value(overall: u32) -> f64 {
        match overall {
            0 => PICK_CHART[0],
            1..=128 => PICK_CHART[overall as usize - 1],
            129..=LAST_PICK => {
                let last = PICK_CHART[127];
                let step = (last - TAIL_FLOOR) / (LAST_PICK - 128) as f64;
                last - step * (overall - 128) as f64
            }
            _ => 1.0,
        }
    }

    /// Pick number used before the draft order is known: middle of the round.
    pub fn estimated_overall(&self, round: u32) -> u32 {
        round.saturating_sub(1) * self.teams + self.teams / 2
    }

    pub fn pick_value(&self, pick: &DraftPick) -> f64 {
        let overall = pick.overall_pick.unwrap_or_else(|| self.estimated_overall(pick.round));
        let years_out = pick.season.saturating_sub(self.draft_season);
        Self::chart_value(overall) * (1.0 - self.future_discount).powi(years_out as i32)
    }

    pub fn player_value(&self, profile: &PlayerProfile, contract: Option<&Contract>) -> f64 {
        let b = benchmark(profile.position);
        let rating =
            ((profile.overall as f64 - PLAYER_RATING_FLOOR) / PLAYER_RATING_SPAN).clamp(0.0, 1.0);
        let base = rating.powi(2) * PLAYER_SCALE * b.trade_multiplier;

        let age_factor = if profile.age <= b.peak_age {
            1.0 + 0.03 * (b.peak_age - profile.age).min(4) as f64
        } else {
            (1.0 - 1.5 * b.decline_rate).powi((profile.age - b.peak_age) as i32).max(0.15)
        };

        base * age_factor * self.contract_factor(profile, contract)
    }

    /// Above 1 when the player is paid less than market, below when overpaid.
    pub fn contract_factor(&self, profile: &PlayerProfile, contract: Option<&Contract>) -> f64 {
        let Some(contract) = contract else {
            return 1.0;
        };
        let PlayerProfile { position, overall, age, years_pro, .. } = *profile;
        let market = self.market.calculate_player_value(position, overall, age, years_pro);
        let market = market.aav as f64;
        if market <= 0.0 {
            return 1.0;
        }
        let surplus = ((market - contract.aav as f64) / market).clamp(-0.5, 0.5);
        let control = 1.0 + 0.02 * contract.years_remaining(self.season()).min(4) as f64;
        (1.0 + 0.4 * surplus) * control
    }

    pub fn player_asset(&self, player: &Player, contract: Option<&Contract>) -> TradeAsset {
        let profile = PlayerProfile::from(player);
        TradeAsset {
            asset_id: player.player_id.clone(),
            owner_team_id: player.team_id.unwrap_or_default(),
            description: format!("{} {} ({})", player.position, player.full_name(), player.overall),
            value: self.player_value(&profile, contract),
            detail: AssetDetail::Player {
                profile,
                contract_id: contract.map(|c| c.contract_id.clone()),
                cap_hit: contract.map(|c| c.cap_hit(self.season())).unwrap_or(0),
            },
        }
    }

    pub fn pick_asset(&self, pick: &DraftPick) -> TradeAsset {
        TradeAsset {
            asset_id: pick.pick_id.clone(),
            owner_team_id: pick.current_team_id,
            description: format!(
                "{} pick (from team {})",
                pick.description(),
                pick.original_team_id
            ),
            value: self.pick_value(pick),
            detail: AssetDetail::DraftPick {
                season: pick.season,
                round: pick.round,
                overall_pick: pick.overall_pick,
            },
        }
    }
}
