//! Personality modifiers applied to every AI front-office decision.
//!
//! The same bias functions feed franchise tags, free agency, the draft,
//! roster cuts and trades, so an archetype leans the same way everywhere:
//! a GM who prefers veterans values them more when tagging, signing,
//! drafting (readier prospects), keeping and trading.

use serde::{Deserialize, Serialize};

use super::{GMArchetype, GMTraits};
use crate::models::{DraftProspect, Player, PlayoffPosition, Position, TeamContext};

/// Shift applied to time-horizon traits by playoff position.
const CONTEXT_SHIFT: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionContext {
    FranchiseTag,
    FreeAgency,
    Draft,
    RosterCut,
    Trade,
}

impl DecisionContext {
    pub const ALL: [DecisionContext; 5] = [
        DecisionContext::FranchiseTag,
        DecisionContext::FreeAgency,
        DecisionContext::Draft,
        DecisionContext::RosterCut,
        DecisionContext::Trade,
    ];
}

/// The player attributes a personality reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub position: Position,
    pub overall: u8,
    pub potential: u8,
    pub age: u8,
    pub years_pro: u8,
}

impl PlayerProfile {
    pub fn upside(&self) -> u8 {
        self.potential.saturating_sub(self.overall)
    }
}

impl From<&Player> for PlayerProfile {
    fn from(p: &Player) -> Self {
        Self {
            position: p.position,
            overall: p.overall,
            potential: p.potential,
            age: p.age,
            years_pro: p.years_pro,
        }
    }
}

impl From<&DraftProspect> for PlayerProfile {
    fn from(p: &DraftProspect) -> Self {
        Self {
            position: p.position,
            overall: p.overall,
            potential: p.potential,
            age: p.age,
            years_pro: 0,
        }
    }
}

/// Inputs to a single decision before and after personality is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionInputs {
    pub context: DecisionContext,
    pub player: PlayerProfile,
    /// Worth of the target (trade points, keep value, draft score)
    pub value: f64,
    /// Money at stake per year, dollars
    pub aav: f64,
    /// Likelihood of acting. For roster cuts this is the cut likelihood.
    pub probability: f64,
}

impl DecisionInputs {
    pub fn new(
        context: DecisionContext,
        player: PlayerProfile,
        value: f64,
        aav: f64,
        probability: f64,
    ) -> Self {
        Self { context, player, value, aav, probability }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonalityModifiers {
    /// Largest AAV any adjusted offer may reach
    aav_ceiling: f64,
}

impl PersonalityModifiers {
    pub fn new(aav_ceiling: f64) -> Self {
        Self { aav_ceiling: aav_ceiling.max(0.0) }
    }

    /// Archetype traits shifted by the team's playoff position.
    pub fn effective_traits(archetype: GMArchetype, context: &TeamContext) -> GMTraits {
        let mut traits = archetype.traits();
        let shift = match context.playoff_position {
            PlayoffPosition::Contender => CONTEXT_SHIFT,
            PlayoffPosition::Bubble => 0.0,
            PlayoffPosition::Eliminated => -CONTEXT_SHIFT,
        };
        traits.veteran_preference = (traits.veteran_preference + shift).clamp(0.0, 1.0);
        traits.draft_pick_preference = (traits.draft_pick_preference - shift).clamp(0.0, 1.0);
        traits
    }

    /// In `[0.8, 1.2]`; above 1 for veterans when the GM prefers veterans.
    pub fn age_bias(traits: &GMTraits, age: u8) -> f64 {
        let centered = ((age as f64 - 27.0) / 5.0).clamp(-1.0, 1.0);
        1.0 + 0.4 * (traits.veteran_preference - 0.5) * centered
    }

    /// In `[0.8, 1.2]`; rewards ratings above 80 for star-hungry GMs.
    pub fn star_bias(traits: &GMTraits, overall: u8) -> f64 {
        let centered = ((overall as f64 - 80.0) / 15.0).clamp(-1.0, 1.0);
        1.0 + 0.4 * (traits.star_premium - 0.5) * centered
    }

    /// In `[0.7, 1.3]`; rewards development headroom for risk-tolerant GMs.
    pub fn upside_bias(traits: &GMTraits, upside: u8) -> f64 {
        1.0 + 0.04 * (traits.risk_tolerance - 0.5) * upside.min(15) as f64
    }

    /// Premium on players already on the roster.
    pub fn loyalty_bias(traits: &GMTraits) -> f64 {
        1.0 + 0.4 * (traits.loyalty - 0.5)
    }

    /// Willingness to pay above market.
    pub fn spend_bias(traits: &GMTraits) -> f64 {
        1.0 + 0.3 * (traits.cap_aggressiveness - 0.5)
    }

    pub fn pick_value_multiplier(traits: &GMTraits) -> f64 {
        1.0 + 0.6 * (traits.draft_pick_preference - 0.5)
    }

    pub fn trade_probability_multiplier(traits: &GMTraits) -> f64 {
        0.5 + traits.trade_frequency
    }

    /// Combined age and rating lens shared by every context.
    pub fn player_lens(traits: &GMTraits, player: &PlayerProfile) -> f64 {
        Self::age_bias(traits, player.age) * Self::star_bias(traits, player.overall)
    }

    pub fn apply(
        &self,
        inputs: DecisionInputs,
        archetype: GMArchetype,
        context: &TeamContext,
    ) -> DecisionInputs {
        let traits = Self::effective_traits(archetype, context);
        let lens = Self::player_lens(&traits, &inputs.player);
        let spend = Self::spend_bias(&traits);

        let (value_mult, probability_mult, aav_mult) = match inputs.context {
            DecisionContext::FranchiseTag => {
                let keep = lens * Self::loyalty_bias(&traits);
                (keep, keep * spend, 1.0)
            }
            DecisionContext::FreeAgency => {
                let star = Self::star_bias(&traits, inputs.player.overall);
                (lens, lens * spend, spend * (1.0 + 0.5 * (star - 1.0)))
            }
            DecisionContext::Draft => {
                let upside = Self::upside_bias(&traits, inputs.player.upside());
                (lens * upside, lens * upside, 1.0)
            }
            DecisionContext::RosterCut => {
                let keep = lens * Self::loyalty_bias(&traits);
                (keep, 1.0 / keep, 1.0)
            }
            DecisionContext::Trade => (lens, Self::trade_probability_multiplier(&traits), 1.0),
        };

        DecisionInputs {
            value: non_negative(inputs.value * value_mult),
            probability: unit(inputs.probability * probability_mult),
            aav: non_negative(inputs.aav * aav_mult).min(self.aav_ceiling),
            ..inputs
        }
    }
}

fn non_negative(x: f64) -> f64 {
    if x.is_finite() {
        x.max(0.0)
    } else {
        0.0
    }
}

fn unit(x: f64) -> f64 {
    if x.is_finite() {
        x.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
