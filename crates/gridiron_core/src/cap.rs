//! Salary cap engine.
//!
//! Cap used is the sum of active contract cap hits for the season plus dead
//! money recorded in the cap ledger. Every check that can fail returns
//! [`DynastyError::CapViolation`] before anything is written.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::config::SalaryCapConfig;
use crate::db::{roster, transaction_log};
use crate::error::{DynastyError, Result};
use crate::models::{CapEventType, Contract};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapSummary {
    pub team_id: u32,
    pub season: u32,
    pub cap_limit: i64,
    pub contracts: i64,
    pub dead_money: i64,
    pub cap_space: i64,
}

pub struct SalaryCapCalculator<'a> {
    conn: &'a Connection,
    dynasty_id: &'a str,
    config: SalaryCapConfig,
}

impl<'a> SalaryCapCalculator<'a> {
    pub fn new(conn: &'a Connection, dynasty_id: &'a str, config: SalaryCapConfig) -> Self {
        Self { conn, dynasty_id, config }
    }

    pub fn cap_limit(&self, season: u32) -> i64 {
        self.config.cap_for_season(season)
    }

    pub fn cap_used(&self, team_id: u32, season: u32) -> Result<i64> {
        let contracts: i64 = roster::team_contracts(self.conn, self.dynasty_id, team_id)?
            .iter()
            .map(|c| c.cap_hit(season))
            .sum();
        Ok(contracts + transaction_log::dead_money(self.conn, self.dynasty_id, team_id, season)?)
    }

    /// Negative when the team is over the cap.
    pub fn cap_space(&self, team_id: u32, season: u32) -> Result<i64> {
        Ok(self.cap_limit(season) - self.cap_used(team_id, season)?)
    }

    pub fn summary(&self, team_id: u32, season: u32) -> Result<CapSummary> {
        let contracts: i64 = roster::team_contracts(self.conn, self.dynasty_id, team_id)?
            .iter()
            .map(|c| c.cap_hit(season))
            .sum();
        let dead_money = transaction_log::dead_money(self.conn, self.dynasty_id, team_id, season)?;
        let cap_limit = self.cap_limit(season);
        Ok(CapSummary {
            team_id,
            season,
            cap_limit,
            contracts,
            dead_money,
            cap_space: cap_limit - contracts - dead_money,
        })
    }

    pub fn can_afford(&self, team_id: u32, season: u32, cap_hit: i64) -> Result<bool> {
        Ok(cap_hit <= self.cap_space(team_id, season)?)
    }

    /// Reject a signing whose first-year cap hit does not fit.
    pub fn validate_signing(&self, team_id: u32, season: u32, contract: &Contract) -> Result<()> {
        let required = contract.cap_hit(season.max(contract.start_season));
        let available = self.cap_space(team_id, season)?;
        if required > available {
            return Err(DynastyError::CapViolation { team_id, required, available });
        }
        Ok(())
    }

    /// Both teams must be cap compliant after the swap. A team that takes
    /// on less money than it sends is always allowed.
    pub fn validate_trade(
        &self,
        team_a: u32,
        a_sends: &[Contract],
        team_b: u32,
        b_sends: &[Contract],
        season: u32,
    ) -> Result<()> {
        let total = |contracts: &[Contract]| -> i64 {
            contracts.iter().map(|c| c.cap_hit(season)).sum()
        };
        let a_out = total(a_sends);
        let b_out = total(b_sends);

        for (team_id, incoming, outgoing) in [(team_a, b_out, a_out), (team_b, a_out, b_out)] {
            let net = incoming - outgoing;
            if net <= 0 {
                continue;
            }
            let available = self.cap_space(team_id, season)?;
            if net > available {
                return Err(DynastyError::CapViolation { team_id, required: net, available });
            }
        }
        Ok(())
    }

    /// Cut a player: end the contract, accelerate remaining bonus proration
    /// into dead money and make the player a free agent. Returns dead money.
    pub fn release_player(
        &self,
        team_id: u32,
        player_id: &str,
        season: u32,
        date: NaiveDate,
    ) -> Result<i64> {
        let player = roster::get_player(self.conn, self.dynasty_id, player_id)?;
        if player.team_id != Some(team_id) {
            return Err(DynastyError::InvalidParameter(format!(
                "player {} is not on team {}",
                player_id, team_id
            )));
        }

        let mut dead_money = 0;
        if let Some(contract) = roster::active_contract(self.conn, self.dynasty_id, player_id)? {
            dead_money = contract.remaining_bonus_proration(season);
            roster::deactivate_contract(self.conn, self.dynasty_id, &contract.contract_id)?;
            if dead_money > 0 {
                self.record_cap_event(
                    team_id,
                    season,
                    CapEventType::DeadMoney,
                    dead_money,
                    date,
                    &format!("Released {}", player.full_name()),
                )?;
            }
        }
        roster::set_player_team(self.conn, self.dynasty_id, player_id, None)?;
        log::debug!("Team {} released {} ({} dead money)", team_id, player_id, dead_money);
        Ok(dead_money)
    }

    pub fn record_cap_event(
        &self,
        team_id: u32,
        season: u32,
        event_type: CapEventType,
        amount: i64,
        date: NaiveDate,
        description: &str,
    ) -> Result<()> {
        transaction_log::record_cap_transaction(
            self.conn,
            self.dynasty_id,
            team_id,
            season,
            event_type,
            amount,
            date,
            description,
        )
    }
}
