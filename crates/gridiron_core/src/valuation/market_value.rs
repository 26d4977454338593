//! Market value of a player contract.
//!
//! Pure functions of player attributes and the static benchmark tables.
//! Every output is clamped: AAV sits between the league minimum and the
//! single-contract ceiling, `guaranteed <= total_value` and
//! `signing_bonus <= guaranteed`.

use serde::{Deserialize, Serialize};

use super::benchmarks::benchmark;
use crate::config::SalaryCapConfig;
use crate::error::{DynastyError, Result};
use crate::models::player::MAX_BONUS_PRORATION_YEARS;
use crate::models::{Contract, ParsePositionError, Position};

/// Rookie-scale deals run four seasons.
pub const ROOKIE_CONTRACT_YEARS: u32 = 4;

const RATING_FLOOR: f64 = 40.0;
const RATING_SPAN: f64 = 59.0;
const RATING_EXPONENT: f64 = 2.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractValue {
    pub aav: i64,
    pub total_value: i64,
    pub years: u32,
    pub guaranteed: i64,
    pub guarantee_percentage: f64,
    pub signing_bonus: i64,
}

impl ContractValue {
    pub fn to_contract(&self, player_id: &str, team_id: u32, start_season: u32) -> Contract {
        Contract {
            contract_id: uuid::Uuid::new_v4().to_string(),
            player_id: player_id.to_string(),
            team_id,
            start_season,
            end_season: start_season + self.years - 1,
            years: self.years,
            total_value: self.total_value,
            aav: self.aav,
            guaranteed: self.guaranteed,
            signing_bonus: self.signing_bonus,
            is_franchise_tag: false,
        }
    }

    /// Cap charge in the contract's first season.
    pub fn first_year_cap_hit(&self) -> i64 {
        let years = self.years.max(1) as i64;
        let proration = years.min(MAX_BONUS_PRORATION_YEARS as i64);
        (self.total_value - self.signing_bonus) / years + self.signing_bonus / proration
    }

    /// Rebuild the contract terms around a different AAV, keeping ratios.
    fn with_aav(&self, aav: i64) -> ContractValue {
        let total_value = aav * self.years as i64;
        let guaranteed = (total_value as f64 * self.guarantee_percentage).round() as i64;
        let bonus_share = if self.guaranteed > 0 {
            self.signing_bonus as f64 / self.guaranteed as f64
        } else {
            0.0
        };
        let signing_bonus = ((guaranteed as f64 * bonus_share).round() as i64).min(guaranteed);
        ContractValue { aav, total_value, guaranteed, signing_bonus, ..self.clone() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketValueCalculator {
    cap: SalaryCapConfig,
    season: u32,
}

impl Default for MarketValueCalculator {
    fn default() -> Self {
        let cap = SalaryCapConfig::default();
        let season = cap.base_season;
        Self { cap, season }
    }
}

impl MarketValueCalculator {
    pub fn new(cap: SalaryCapConfig, season: u32) -> Self {
        Self { cap, season }
    }

    pub fn season(&self) -> u32 {
        self.season
    }

    pub fn aav_ceiling(&self) -> i64 {
        self.cap.max_contract_aav(self.season)
    }

    /// `value` with its AAV moved to `aav`, held between the league minimum
    /// and the single-contract ceiling.
    pub fn reprice(&self, value: &ContractValue, aav: i64) -> ContractValue {
        let minimum = self.cap.league_minimum_salary;
        value.with_aav(aav.clamp(minimum, self.aav_ceiling().max(minimum)))
    }

    /// Normalized rating in `[0, 1]`.
    pub fn rating_curve(overall: u8) -> f64 {
        ((overall as f64 - RATING_FLOOR) / RATING_SPAN).clamp(0.0, 1.0)
    }

    pub fn age_factor(position: Position, age: u8, years_pro: u8) -> f64 {
        let b = benchmark(position);
        if age > b.peak_age {
            (1.0 - b.decline_rate).powi((age - b.peak_age) as i32).max(0.25)
        } else if age < 25 && years_pro >= 3 {
            1.0 + 0.02 * (25 - age) as f64
        } else {
            1.0
        }
    }

    /// Rookie scale, restricted, then open market.
    pub fn experience_factor(years_pro: u8) -> f64 {
        match years_pro {
            0..=2 => 0.55,
            3 => 0.80,
            _ => 1.0,
        }
    }

    pub fn contract_years(age: u8, years_pro: u8) -> u32 {
        if years_pro <= 2 {
            return ROOKIE_CONTRACT_YEARS;
        }
        match age {
            0..=26 => 5,
            27..=29 => 4,
            30..=31 => 3,
            32..=33 => 2,
            _ => 1,
        }
    }

    pub fn calculate_player_value(
        &self,
        position: Position,
        overall: u8,
        age: u8,
        years_pro: u8,
    ) -> ContractValue {
        let b = benchmark(position);
        let minimum = self.cap.league_minimum_salary;
        let ceiling = self.aav_ceiling().max(minimum);

        let n = Self::rating_curve(overall);
        let base = minimum as f64 + (b.elite_aav - minimum).max(0) as f64 * n.powf(RATING_EXPONENT);
        let raw_aav = base
            * Self::age_factor(position, age, years_pro)
            * Self::experience_factor(years_pro);
        let aav = round_to_thousand(raw_aav).clamp(minimum, ceiling);

        let years = Self::contract_years(age, years_pro);
        let total_value = aav * years as i64;

        let age_penalty = 0.05 * age.saturating_sub(30) as f64;
        let guarantee_percentage = (0.25 + 0.45 * n - age_penalty).clamp(0.10, 0.80);
        let guaranteed =
            ((total_value as f64 * guarantee_percentage).round() as i64).min(total_value);
        let signing_bonus =
            ((guaranteed as f64 * (0.35 + 0.25 * n)).round() as i64).clamp(0, guaranteed);

        ContractValue { aav, total_value, years, guaranteed, guarantee_percentage, signing_bonus }
    }

    /// Average of the five largest salaries at the position.
    pub fn calculate_franchise_tag_value(&self, position: Position) -> i64 {
        let top = &benchmark(position).top_five_salaries;
        let average = top.iter().sum::<i64>() / top.len() as i64;
        average.clamp(0, self.aav_ceiling())
    }
}

fn round_to_thousand(value: f64) -> i64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    ((value / 1_000.0).round() * 1_000.0) as i64
}

/// [`MarketValueCalculator::calculate_player_value`] with default cap settings.
pub fn calculate_player_value(
    position: Position,
    overall: u8,
    age: u8,
    years_pro: u8,
) -> ContractValue {
    MarketValueCalculator::default().calculate_player_value(position, overall, age, years_pro)
}

/// Franchise tag number for a position given by name, e.g. `"quarterback"`.
pub fn calculate_franchise_tag_value(position: &str) -> Result<i64> {
    let position: Position = position
        .parse()
        .map_err(|e: ParsePositionError| DynastyError::InvalidParameter(e.to_string()))?;
    Ok(MarketValueCalculator::default().calculate_franchise_tag_value(position))
}
