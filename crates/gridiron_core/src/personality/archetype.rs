//! General-manager archetypes.
//!
//! Each archetype maps to a fixed [`GMTraits`] profile. Traits are read-only
//! for the life of a dynasty.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DynastyError;

/// Personality profile of a team's front office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GMArchetype {
    #[default]
    Balanced,
    WinNow,
    Rebuilder,
    Loyal,
    Ruthless,
    Aggressive,
    Conservative,
}

/// Decision axes, each in `[0, 1]` with 0.5 as neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GMTraits {
    /// Extra weight on elite-rated players
    pub star_premium: f64,
    /// Preference for proven veterans over youth
    pub veteran_preference: f64,
    /// Willingness to spend to the cap
    pub cap_aggressiveness: f64,
    /// Attachment to players already on the roster
    pub loyalty: f64,
    /// Appetite for unproven upside
    pub risk_tolerance: f64,
    /// Value placed on draft capital
    pub draft_pick_preference: f64,
    /// How often the GM looks for trades
    pub trade_frequency: f64,
}

impl GMTraits {
    pub const NEUTRAL: GMTraits = GMTraits {
        star_premium: 0.5,
        veteran_preference: 0.5,
        cap_aggressiveness: 0.5,
        loyalty: 0.5,
        risk_tolerance: 0.5,
        draft_pick_preference: 0.5,
        trade_frequency: 0.5,
    };
}

impl GMArchetype {
    pub const ALL: [GMArchetype; 7] = [
        GMArchetype::Balanced,
        GMArchetype::WinNow,
        GMArchetype::Rebuilder,
        GMArchetype::Loyal,
        GMArchetype::Ruthless,
        GMArchetype::Aggressive,
        GMArchetype::Conservative,
    ];

    pub const fn traits(&self) -> GMTraits {
        match self {
            GMArchetype::Balanced => GMTraits::NEUTRAL,
            GMArchetype::WinNow => GMTraits {
                star_premium: 0.80,
                veteran_preference: 0.85,
                cap_aggressiveness: 0.80,
                loyalty: 0.40,
                risk_tolerance: 0.40,
                draft_pick_preference: 0.20,
                trade_frequency: 0.70,
            },
            GMArchetype::Rebuilder => GMTraits {
                star_premium: 0.40,
                veteran_preference: 0.15,
                cap_aggressiveness: 0.30,
                loyalty: 0.30,
                risk_tolerance: 0.80,
                draft_pick_preference: 0.90,
                trade_frequency: 0.60,
            },
            GMArchetype::Loyal => GMTraits {
                star_premium: 0.50,
                veteran_preference: 0.60,
                cap_aggressiveness: 0.50,
                loyalty: 0.90,
                risk_tolerance: 0.40,
                draft_pick_preference: 0.50,
                trade_frequency: 0.25,
            },
            GMArchetype::Ruthless => GMTraits {
                star_premium: 0.60,
                veteran_preference: 0.30,
                cap_aggressiveness: 0.60,
                loyalty: 0.10,
                risk_tolerance: 0.60,
                draft_pick_preference: 0.60,
                trade_frequency: 0.75,
            },
            GMArchetype::Aggressive => GMTraits {
                star_premium: 0.75,
                veteran_preference: 0.50,
                cap_aggressiveness: 0.85,
                loyalty: 0.40,
                risk_tolerance: 0.75,
                draft_pick_preference: 0.40,
                trade_frequency: 0.90,
            },
            GMArchetype::Conservative => GMTraits {
                star_premium: 0.40,
                veteran_preference: 0.50,
                cap_aggressiveness: 0.20,
                loyalty: 0.60,
                risk_tolerance: 0.20,
                draft_pick_preference: 0.60,
                trade_frequency: 0.30,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GMArchetype::Balanced => "balanced",
            GMArchetype::WinNow => "win_now",
            GMArchetype::Rebuilder => "rebuilder",
            GMArchetype::Loyal => "loyal",
            GMArchetype::Ruthless => "ruthless",
            GMArchetype::Aggressive => "aggressive",
            GMArchetype::Conservative => "conservative",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GMArchetype::Balanced => "Weighs every option evenly",
            GMArchetype::WinNow => "Trades the future for proven veterans and stars",
            GMArchetype::Rebuilder => "Hoards picks and young upside",
            GMArchetype::Loyal => "Keeps and re-signs homegrown players",
            GMArchetype::Ruthless => "Cuts or moves anyone whose value slips",
            GMArchetype::Aggressive => "Spends to the cap and deals constantly",
            GMArchetype::Conservative => "Protects cap flexibility and avoids risk",
        }
    }
}

impl fmt::Display for GMArchetype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GMArchetype {
    type Err = DynastyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GMArchetype::ALL
            .into_iter()
            .find(|a| a.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| DynastyError::InvalidParameter(format!("unknown GM archetype '{}'", s)))
    }
}
