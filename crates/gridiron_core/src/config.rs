//! # Dynasty Configuration
//!
//! All tuning constants for the offseason engine in one place.
//!
//! ## Usage
//! ```rust
//! use gridiron_core::config::DynastyConfig;
//!
//! let config = DynastyConfig::default();
//! let busy = DynastyConfig::aggressive_league();
//! assert!(busy.transactions.base_daily_probability > config.transactions.base_daily_probability);
//! ```
//!
//! A JSON or YAML file can be supplied through `GRIDIRON_CONFIG_PATH`.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

use crate::error::{DynastyError, Result};

pub const CONFIG_PATH_ENV: &str = "GRIDIRON_CONFIG_PATH";

/// Salary cap settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalaryCapConfig {
    /// Cap for `base_season`, in dollars
    pub base_cap: i64,
    pub base_season: u32,
    /// Yearly cap growth (0.05 = 5%)
    pub annual_growth: f64,
    pub league_minimum_salary: i64,
    /// Largest share of the cap a single AAV may take
    pub max_contract_share: f64,
}

impl Default for SalaryCapConfig {
    fn default() -> Self {
        Self {
            base_cap: 279_200_000,
            base_season: 2025,
            annual_growth: 0.05,
            league_minimum_salary: 840_000,
            max_contract_share: 0.25,
        }
    }
}

impl SalaryCapConfig {
    /// Cap for a league year. Seasons before `base_season` use the base cap.
    pub fn cap_for_season(&self, season: u32) -> i64 {
        let years = season.saturating_sub(self.base_season) as i32;
        (self.base_cap as f64 * (1.0 + self.annual_growth).powi(years)).round() as i64
    }

    /// Ceiling on a single contract's AAV.
    pub fn max_contract_aav(&self, season: u32) -> i64 {
        (self.cap_for_season(season) as f64 * self.max_contract_share).round() as i64
    }
}

/// Offseason calendar, as day offsets from the Super Bowl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffseasonConfig {
    pub franchise_tag_offset: i64,
    pub pre_free_agency_offset: i64,
    pub legal_tampering_offset: i64,
    pub free_agency_offset: i64,
    pub draft_offset: i64,
    pub post_draft_offset: i64,
    pub roster_cuts_offset: i64,
    pub complete_offset: i64,
    pub max_signings_per_team_per_day: u32,
    pub tampering_targets_per_team: u32,
}

impl Default for OffseasonConfig {
    fn default() -> Self {
        Self {
            franchise_tag_offset: 9,
            pre_free_agency_offset: 23,
            legal_tampering_offset: 28,
            free_agency_offset: 30,
            draft_offset: 74,
            post_draft_offset: 77,
            roster_cuts_offset: 198,
            complete_offset: 205,
            max_signings_per_team_per_day: 2,
            tampering_targets_per_team: 2,
        }
    }
}

impl OffseasonConfig {
    pub fn offsets(&self) -> [i64; 8] {
        [
            self.franchise_tag_offset,
            self.pre_free_agency_offset,
            self.legal_tampering_offset,
            self.free_agency_offset,
            self.draft_offset,
            self.post_draft_offset,
            self.roster_cuts_offset,
            self.complete_offset,
        ]
    }
}

/// Daily AI transaction trigger settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
    pub base_daily_probability: f64,
    pub playoff_push_multiplier: f64,
    pub losing_streak_threshold: u32,
    pub losing_streak_multiplier: f64,
    pub deadline_window_days: i64,
    pub deadline_multiplier: f64,
    pub eliminated_multiplier: f64,
    pub trade_cooldown_days: i64,
    pub max_transactions_per_team_per_day: u32,
    pub max_proposals_per_attempt: usize,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            base_daily_probability: 0.05,
            playoff_push_multiplier: 1.5,
            losing_streak_threshold: 3,
            losing_streak_multiplier: 1.3,
            deadline_window_days: 14,
            deadline_multiplier: 2.0,
            eliminated_multiplier: 1.2,
            trade_cooldown_days: 7,
            max_transactions_per_team_per_day: 1,
            max_proposals_per_attempt: 3,
        }
    }
}

/// Trade negotiation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    pub max_iterations: u32,
    pub fairness_min: f64,
    pub fairness_max: f64,
    /// Perceived value ratio at which a neutral GM accepts
    pub accept_threshold: f64,
    /// Below this perceived ratio the GM walks away instead of countering
    pub counter_floor: f64,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 6,
            fairness_min: 0.80,
            fairness_max: 1.20,
            accept_threshold: 0.95,
            counter_floor: 0.70,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub offseason_max: u32,
    pub regular_season_max: u32,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self { offseason_max: 90, regular_season_max: 53 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftConfig {
    pub rounds: u32,
    pub teams: u32,
    /// Prospects generated per class (`rounds * teams` by default)
    pub class_size: u32,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self { rounds: 7, teams: 32, class_size: 224 }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynastyConfig {
    /// Seed for generated content and the daily transaction roll
    pub seed: u64,
    pub salary_cap: SalaryCapConfig,
    pub offseason: OffseasonConfig,
    pub transactions: TransactionConfig,
    pub negotiation: NegotiationConfig,
    pub roster: RosterConfig,
    pub draft: DraftConfig,
}

impl Default for DynastyConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED_F00D,
            salary_cap: SalaryCapConfig::default(),
            offseason: OffseasonConfig::default(),
            transactions: TransactionConfig::default(),
            negotiation: NegotiationConfig::default(),
            roster: RosterConfig::default(),
            draft: DraftConfig::default(),
        }
    }
}

impl DynastyConfig {
    /// Busier trade market: more daily attempts, shorter cooldown.
    pub fn aggressive_league() -> Self {
        let mut cfg = Self::default();
        cfg.transactions.base_daily_probability = 0.12;
        cfg.transactions.trade_cooldown_days = 3;
        cfg.transactions.max_proposals_per_attempt = 5;
        cfg.negotiation.max_iterations = 8;
        cfg
    }

    /// Fixed seed and no AI trade attempts.
    pub fn testing() -> Self {
        let mut cfg = Self::default();
        cfg.seed = 42;
        cfg.transactions.base_daily_probability = 0.0;
        cfg
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| DynastyError::Config(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file and validate.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml { Self::from_yaml(&content) } else { Self::from_json(&content) }
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config in '{}'", path.display()))?;
        Ok(config)
    }

    /// Load from `GRIDIRON_CONFIG_PATH`, or defaults when unset.
    pub fn from_env() -> anyhow::Result<Self> {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }

        Self::from_file(path).with_context(|| format!("{CONFIG_PATH_ENV}='{path}'"))
    }

    pub fn validate(&self) -> Result<()> {
        let offsets = self.offseason.offsets();
        if offsets[0] <= 0 || offsets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(DynastyError::Config(format!(
                "offseason offsets must be positive and strictly increasing: {:?}",
                offsets
            )));
        }

        let tx = &self.transactions;
        if !(0.0..=1.0).contains(&tx.base_daily_probability) {
            return Err(DynastyError::Config(format!(
                "base_daily_probability must be within [0, 1], got {}",
                tx.base_daily_probability
            )));
        }
        if tx.max_transactions_per_team_per_day == 0 {
            return Err(DynastyError::Config(
                "max_transactions_per_team_per_day must be at least 1".to_string(),
            ));
        }

        let neg = &self.negotiation;
        if neg.max_iterations == 0 {
            return Err(DynastyError::Config("max_iterations must be at least 1".to_string()));
        }
        if !(neg.fairness_min > 0.0 && neg.fairness_min < 1.0 && neg.fairness_max > 1.0) {
            return Err(DynastyError::Config(format!(
                "fairness band must straddle 1.0, got [{}, {}]",
                neg.fairness_min, neg.fairness_max
            )));
        }
        if neg.counter_floor >= neg.accept_threshold {
            return Err(DynastyError::Config(
                "counter_floor must be below accept_threshold".to_string(),
            ));
        }

        if self.salary_cap.base_cap <= 0 || self.salary_cap.league_minimum_salary <= 0 {
            return Err(DynastyError::Config("salary cap values must be positive".to_string()));
        }
        if self.roster.regular_season_max > self.roster.offseason_max {
            return Err(DynastyError::Config(
                "regular season roster limit exceeds offseason limit".to_string(),
            ));
        }
        if self.draft.rounds == 0 || self.draft.teams == 0 {
            return Err(DynastyError::Config("draft needs at least one round and team".into()));
        }

        Ok(())
    }
}
