use serde::{Deserialize, Serialize};

use super::Position;
use crate::error::{DynastyError, Result};

/// Seasons over which a signing bonus is prorated at most.
pub const MAX_BONUS_PRORATION_YEARS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: String,
    /// `None` while the player is a free agent
    pub team_id: Option<u32>,
    pub first_name: String,
    pub last_name: String,
    pub position: Position,
    pub overall: u8,
    pub potential: u8,
    pub age: u8,
    pub years_pro: u8,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_free_agent(&self) -> bool {
        self.team_id.is_none()
    }

    /// Remaining development headroom.
    pub fn upside(&self) -> u8 {
        self.potential.saturating_sub(self.overall)
    }
}

/// A player contract. Money is in whole dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub contract_id: String,
    pub player_id: String,
    pub team_id: u32,
    pub start_season: u32,
    pub end_season: u32,
    pub years: u32,
    pub total_value: i64,
    pub aav: i64,
    pub guaranteed: i64,
    pub signing_bonus: i64,
    pub is_franchise_tag: bool,
}

impl Contract {
    /// Reject contracts that could not exist in the league.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(DynastyError::InvariantViolation(msg));

        if self.years == 0 || self.end_season + 1 != self.start_season + self.years {
            return fail(format!(
                "contract {} spans {}-{} but lists {} years",
                self.contract_id, self.start_season, self.end_season, self.years
            ));
        }
        if self.total_value < 0 || self.aav < 0 || self.guaranteed < 0 || self.signing_bonus < 0 {
            return fail(format!("contract {} has negative money", self.contract_id));
        }
        if self.guaranteed > self.total_value {
            return fail(format!(
                "contract {} guarantees {} of {}",
                self.contract_id, self.guaranteed, self.total_value
            ));
        }
        if self.signing_bonus > self.guaranteed {
            return fail(format!(
                "contract {} signing bonus {} exceeds guarantee {}",
                self.contract_id, self.signing_bonus, self.guaranteed
            ));
        }
        if self.is_franchise_tag && self.years != 1 {
            return fail(format!("franchise tag {} must be one year", self.contract_id));
        }
        Ok(())
    }

    pub fn covers(&self, season: u32) -> bool {
        season >= self.start_season && season <= self.end_season
    }

    pub fn is_expiring(&self, season: u32) -> bool {
        self.end_season == season
    }

    pub fn years_remaining(&self, season: u32) -> u32 {
        if season > self.end_season {
            0
        } else {
            self.end_season - season.max(self.start_season) + 1
        }
    }

    fn proration_years(&self) -> u32 {
        self.years.clamp(1, MAX_BONUS_PRORATION_YEARS)
    }

    fn yearly_proration(&self) -> i64 {
        self.signing_bonus / self.proration_years() as i64
    }

    /// Base salary plus prorated bonus charged in `season`.
    pub fn cap_hit(&self, season: u32) -> i64 {
        if !self.covers(season) {
            return 0;
        }
        let base = (self.total_value - self.signing_bonus) / self.years as i64;
        let prorated = if season - self.start_season < self.proration_years() {
            self.yearly_proration()
        } else {
            0
        };
        base + prorated
    }

    /// Bonus proration still unpaid from `season` onward; accelerates on release.
    pub fn remaining_bonus_proration(&self, season: u32) -> i64 {
        let last_prorated = self.start_season + self.proration_years() - 1;
        if season > last_prorated {
            return 0;
        }
        let first = season.max(self.start_season);
        (last_prorated - first + 1) as i64 * self.yearly_proration()
    }
}

/// A rostered player with the contract that binds them, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub player: Player,
    pub contract: Option<Contract>,
}

impl RosterEntry {
    pub fn cap_hit(&self, season: u32) -> i64 {
        self.contract.as_ref().map(|c| c.cap_hit(season)).unwrap_or(0)
    }

    pub fn is_franchise_tagged(&self) -> bool {
        self.contract.as_ref().is_some_and(|c| c.is_franchise_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(years: u32, total: i64, guaranteed: i64, bonus: i64) -> Contract {
        Contract {
            contract_id: "c1".into(),
            player_id: "p1".into(),
            team_id: 1,
            start_season: 2025,
            end_season: 2025 + years - 1,
            years,
            total_value: total,
            aav: total / years as i64,
            guaranteed,
            signing_bonus: bonus,
            is_franchise_tag: false,
        }
    }

    #[test]
    fn test_cap_hit_prorates_bonus() {
        let c = contract(4, 40_000_000, 20_000_000, 8_000_000);
        // base 8M per year + 2M proration
        assert_eq!(c.cap_hit(2025), 10_000_000);
        assert_eq!(c.cap_hit(2028), 10_000_000);
        assert_eq!(c.cap_hit(2029), 0);
    }

    #[test]
    fn test_remaining_proration_after_two_years() {
        let c = contract(4, 40_000_000, 20_000_000, 8_000_000);
        assert_eq!(c.remaining_bonus_proration(2027), 4_000_000);
        assert_eq!(c.remaining_bonus_proration(2030), 0);
    }

    #[test]
    fn test_validate_rejects_bonus_above_guarantee() {
        let c = contract(3, 30_000_000, 5_000_000, 6_000_000);
        assert!(matches!(c.validate(), Err(DynastyError::InvariantViolation(_))));
        assert!(contract(3, 30_000_000, 10_000_000, 6_000_000).validate().is_ok());
    }

    #[test]
    fn test_years_remaining() {
        let c = contract(3, 30_000_000, 10_000_000, 3_000_000);
        assert_eq!(c.years_remaining(2025), 3);
        assert_eq!(c.years_remaining(2027), 1);
        assert!(c.is_expiring(2027));
        assert_eq!(c.years_remaining(2028), 0);
    }
}
