use chrono::NaiveDate;
use rusqlite::Connection;

use super::proposal::{AssetDetail, TradeAsset, TradeProposal};
use crate::cap::SalaryCapCalculator;
use crate::config::SalaryCapConfig;
use crate::db::{draft, roster, transaction_log};
use crate::error::{DynastyError, Result};
use crate::events::{EventRecord, EventStore, SimEvent, TradeEvent};
use crate::models::{CapEventType, Contract, TransactionRecord, TransactionType};

/// Applies an agreed trade. Run it inside one SQL transaction; any error
/// leaves ownership untouched once the caller rolls back.
pub struct TradeExecutor<'a> {
    conn: &'a Connection,
    dynasty_id: &'a str,
    cap: SalaryCapConfig,
}

impl<'a> TradeExecutor<'a> {
    pub fn new(conn: &'a Connection, dynasty_id: &'a str, cap: SalaryCapConfig) -> Self {
        Self { conn, dynasty_id, cap }
    }

    pub fn execute(
        &self,
        proposal: &TradeProposal,
        season: u32,
        date: NaiveDate,
    ) -> Result<TradeEvent> {
        let from_a = proposal.proposing_team_id;
        let from_b = proposal.receiving_team_id;
        if from_a == from_b {
            return Err(DynastyError::InvalidParameter("a team cannot trade with itself".into()));
        }

        let a_contracts = self.verify_side(&proposal.offered, from_a)?;
        let b_contracts = self.verify_side(&proposal.requested, from_b)?;

        let cap = SalaryCapCalculator::new(self.conn, self.dynasty_id, self.cap.clone());
        cap.validate_trade(from_a, &a_contracts, from_b, &b_contracts, season)?;

        self.transfer(&proposal.offered, from_b)?;
        self.transfer(&proposal.requested, from_a)?;

        let total = |contracts: &[Contract]| -> i64 {
            contracts.iter().map(|c| c.cap_hit(season)).sum()
        };
        let sides = [
            (from_a, total(&b_contracts), total(&a_contracts)),
            (from_b, total(&a_contracts), total(&b_contracts)),
        ];
        let reference = proposal.proposal_id.as_str();
        for (team_id, cap_in, cap_out) in sides {
            let moves = [(CapEventType::TradeIn, cap_in), (CapEventType::TradeOut, -cap_out)];
            for (event_type, amount) in moves.into_iter().filter(|(_, amount)| *amount != 0) {
                cap.record_cap_event(team_id, season, event_type, amount, date, reference)?;
            }
        }

        let event = TradeEvent {
            proposal_id: proposal.proposal_id.clone(),
            proposing_team_id: from_a,
            receiving_team_id: from_b,
            sent: proposal.offered.iter().map(|a| a.description.clone()).collect(),
            received: proposal.requested.iter().map(|a| a.description.clone()).collect(),
            sent_value: proposal.offered_value(),
            received_value: proposal.requested_value(),
        };
        EventStore::new(self.conn, self.dynasty_id)
            .insert(&EventRecord::new(date, SimEvent::Trade(event.clone())))?;

        for (team_id, other) in [(from_a, from_b), (from_b, from_a)] {
            transaction_log::log_transaction(
                self.conn,
                self.dynasty_id,
                &TransactionRecord {
                    season,
                    date,
                    tx_type: TransactionType::Trade,
                    team_id,
                    other_team_id: Some(other),
                    player_id: None,
                    details: serde_json::to_value(&event)?,
                },
            )?;
        }

        tracing::info!("Trade executed: {}", proposal.summary());
        Ok(event)
    }

    /// Every asset must still belong to `owner`; returns the player contracts.
    fn verify_side(&self, assets: &[TradeAsset], owner: u32) -> Result<Vec<Contract>> {
        let (conn, dynasty_id) = (self.conn, self.dynasty_id);
        let mut contracts = Vec::new();
        for asset in assets {
            match &asset.detail {
                AssetDetail::Player { .. } => {
                    let player = roster::get_player(conn, dynasty_id, &asset.asset_id)?;
                    if player.team_id != Some(owner) {
                        return Err(DynastyError::InvariantViolation(format!(
                            "player {} is no longer on team {}",
                            asset.asset_id, owner
                        )));
                    }
                    let contract = roster::active_contract(conn, dynasty_id, &asset.asset_id)?;
                    if let Some(contract) = contract {
                        if contract.is_franchise_tag {
                            return Err(DynastyError::InvariantViolation(format!(
                                "franchise-tagged player {} cannot be traded",
                                asset.asset_id
                            )));
                        }
                        contracts.push(contract);
                    }
                }
                AssetDetail::DraftPick { .. } => {
                    let pick = draft::get_pick(conn, dynasty_id, &asset.asset_id)?;
                    if pick.is_used() {
                        return Err(DynastyError::DraftPickReused { pick_id: pick.pick_id });
                    }
                    if pick.current_team_id != owner {
                        return Err(DynastyError::InvariantViolation(format!(
                            "pick {} is no longer owned by team {}",
                            pick.pick_id, owner
                        )));
                    }
                }
            }
        }
        Ok(contracts)
    }

    fn transfer(&self, assets: &[TradeAsset], to: u32) -> Result<()> {
        let (conn, dynasty_id) = (self.conn, self.dynasty_id);
        for asset in assets {
            match &asset.detail {
                AssetDetail::Player { .. } => {
                    let player_id = asset.asset_id.as_str();
                    roster::set_player_team(conn, dynasty_id, player_id, Some(to))?;
                    if let Some(contract) = roster::active_contract(conn, dynasty_id, player_id)? {
                        roster::move_contract(conn, dynasty_id, &contract.contract_id, to)?;
                    }
                }
                AssetDetail::DraftPick { .. } => {
                    draft::transfer_pick(conn, dynasty_id, &asset.asset_id, to)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{dynasty, Database};
    use crate::events::EventType;
    use crate::models::{DraftPick, Dynasty, Player, Position};
    use crate::offseason::OffseasonPhase;
    use crate::trade::TradeValueCalculator;
    use crate::valuation::MarketValueCalculator;

    fn setup() -> (Database, String) {
        let mut db = Database::open_in_memory().unwrap();
        let d = Dynasty::new("Trades", 1, 2025);
        let start = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        dynasty::create_dynasty(db.conn(), &d, start, OffseasonPhase::Complete).unwrap();
        let id = d.dynasty_id.clone();
        db.transaction(|tx| {
            let player = Player {
                player_id: "wr1".into(),
                team_id: Some(3),
                first_name: "Deep".into(),
                last_name: "Threat".into(),
                position: Position::WR,
                overall: 84,
                potential: 86,
                age: 26,
                years_pro: 4,
            };
            roster::insert_player(tx, &id, &player)?;
            roster::insert_contract(
                tx,
                &id,
                &Contract {
                    contract_id: "c-wr1".into(),
                    player_id: "wr1".into(),
                    team_id: 3,
                    start_season: 2024,
                    end_season: 2026,
                    years: 3,
                    total_value: 30_000_000,
                    aav: 10_000_000,
                    guaranteed: 6_000_000,
                    signing_bonus: 3_000_000,
                    is_franchise_tag: false,
                },
            )?;
            draft::insert_pick(tx, &id, &DraftPick::new(2026, 2, 8))?;
            Ok(())
        })
        .unwrap();
        (db, d.dynasty_id)
    }

    fn proposal(db: &Database, id: &str) -> TradeProposal {
        let market = MarketValueCalculator::new(SalaryCapConfig::default(), 2025);
        let calc = TradeValueCalculator::new(market);
        let player = roster::get_player(db.conn(), id, "wr1").unwrap();
        let contract = roster::active_contract(db.conn(), id, "wr1").unwrap();
        let pick = draft::get_pick(db.conn(), id, &DraftPick::make_id(2026, 2, 8)).unwrap();
        let offered = vec![calc.pick_asset(&pick)];
        let requested = vec![calc.player_asset(&player, contract.as_ref())];
        TradeProposal::new(8, 3, offered, requested)
    }

    fn execute(
        db: &mut Database,
        id: &str,
        trade: &TradeProposal,
        date: NaiveDate,
    ) -> Result<TradeEvent> {
        db.transaction(|tx| {
            TradeExecutor::new(tx, id, SalaryCapConfig::default()).execute(trade, 2025, date)
        })
    }

    #[test]
    fn test_execute_moves_everything() {
        let (mut db, id) = setup();
        let trade = proposal(&db, &id);
        let date = NaiveDate::from_ymd_opt(2025, 10, 14).unwrap();
        execute(&mut db, &id, &trade, date).unwrap();

        assert_eq!(roster::get_player(db.conn(), &id, "wr1").unwrap().team_id, Some(8));
        assert_eq!(roster::active_contract(db.conn(), &id, "wr1").unwrap().unwrap().team_id, 8);
        let pick = draft::get_pick(db.conn(), &id, &DraftPick::make_id(2026, 2, 8)).unwrap();
        assert_eq!(pick.current_team_id, 3);
        assert_eq!(EventStore::new(db.conn(), &id).count(Some(EventType::Trade)).unwrap(), 1);
        assert_eq!(transaction_log::last_trade_date(db.conn(), &id, 3).unwrap(), Some(date));
    }

    #[test]
    fn test_stale_trade_rolls_back() {
        let (mut db, id) = setup();
        let trade = proposal(&db, &id);
        let date = NaiveDate::from_ymd_opt(2025, 10, 14).unwrap();
        execute(&mut db, &id, &trade, date).unwrap();

        // Same terms again: the assets have moved
        let again = execute(&mut db, &id, &trade, date);
        assert!(matches!(again, Err(DynastyError::InvariantViolation(_))));
        assert_eq!(EventStore::new(db.conn(), &id).count(Some(EventType::Trade)).unwrap(), 1);
    }
}
