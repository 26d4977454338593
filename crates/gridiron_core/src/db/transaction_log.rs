//! Transaction log, salary cap ledger and free agency offers.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{DynastyError, Result};
use crate::models::{CapEventType, FaOffer, OfferStatus, TransactionRecord, TransactionType};

// ============================================================================
// Transaction log
// ============================================================================

pub fn log_transaction(
    conn: &Connection,
    dynasty_id: &str,
    record: &TransactionRecord,
) -> Result<()> {
    conn.execute(
        "INSERT INTO transaction_log
            (dynasty_id, season, tx_date, tx_type, team_id, other_team_id, player_id, details)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            dynasty_id,
            record.season,
            record.date,
            record.tx_type.as_str(),
            record.team_id,
            record.other_team_id,
            record.player_id,
            serde_json::to_string(&record.details)?
        ],
    )?;
    Ok(())
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<TransactionRecord> {
    let tx_type: String = row.get(2)?;
    let details: String = row.get(6)?;
    Ok(TransactionRecord {
        season: row.get(0)?,
        date: row.get(1)?,
        tx_type: TransactionType::parse(&tx_type).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("unknown transaction type '{}'", tx_type).into(),
            )
        })?,
        team_id: row.get(3)?,
        other_team_id: row.get(4)?,
        player_id: row.get(5)?,
        details: serde_json::from_str(&details).unwrap_or(serde_json::Value::Null),
    })
}

/// Log rows for a team, oldest first. `None` returns every team.
pub fn transactions(
    conn: &Connection,
    dynasty_id: &str,
    team_id: Option<u32>,
    tx_type: Option<TransactionType>,
) -> Result<Vec<TransactionRecord>> {
    let mut stmt = conn.prepare(
        "SELECT season, tx_date, tx_type, team_id, other_team_id, player_id, details
         FROM transaction_log
         WHERE dynasty_id = ?1 AND (?2 IS NULL OR team_id = ?2) AND (?3 IS NULL OR tx_type = ?3)
         ORDER BY id",
    )?;
    let rows = stmt.query_map(
        params![dynasty_id, team_id, tx_type.map(|t| t.as_str())],
        record_from_row,
    )?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

pub fn count_transactions_on(
    conn: &Connection,
    dynasty_id: &str,
    team_id: u32,
    date: NaiveDate,
    tx_type: TransactionType,
) -> Result<u32> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM transaction_log
         WHERE dynasty_id = ?1 AND team_id = ?2 AND tx_date = ?3 AND tx_type = ?4",
        params![dynasty_id, team_id, date, tx_type.as_str()],
        |row| row.get(0),
    )?)
}

/// Most recent trade the team took part in, on either side.
pub fn last_trade_date(
    conn: &Connection,
    dynasty_id: &str,
    team_id: u32,
) -> Result<Option<NaiveDate>> {
    Ok(conn.query_row(
        "SELECT MAX(tx_date) FROM transaction_log
         WHERE dynasty_id = ?1 AND tx_type = 'TRADE' AND (team_id = ?2 OR other_team_id = ?2)",
        params![dynasty_id, team_id],
        |row| row.get(0),
    )?)
}

// ============================================================================
// Cap ledger
// ============================================================================

#[allow(clippy::too_many_arguments)]
pub fn record_cap_transaction(
    conn: &Connection,
    dynasty_id: &str,
    team_id: u32,
    season: u32,
    event_type: CapEventType,
    amount: i64,
    date: NaiveDate,
    description: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO cap_transactions
            (dynasty_id, team_id, season, event_type, amount, tx_date, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![dynasty_id, team_id, season, event_type.as_str(), amount, date, description],
    )?;
    Ok(())
}

/// Accelerated bonus money charged to `season` for released players.
pub fn dead_money(conn: &Connection, dynasty_id: &str, team_id: u32, season: u32) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM cap_transactions
         WHERE dynasty_id = ?1 AND team_id = ?2 AND season = ?3 AND event_type = 'DEAD_MONEY'",
        params![dynasty_id, team_id, season],
        |row| row.get(0),
    )?)
}

// ============================================================================
// Free agency offers
// ============================================================================

/// Store an offer. One offer per player per league year; later offers lose.
pub fn insert_offer(conn: &Connection, dynasty_id: &str, offer: &FaOffer) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO fa_offers
            (dynasty_id, offer_id, team_id, player_id, season,
             aav, years, guaranteed, signing_bonus, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            dynasty_id,
            offer.offer_id,
            offer.team_id,
            offer.player_id,
            offer.season,
            offer.aav,
            offer.years,
            offer.guaranteed,
            offer.signing_bonus,
            offer.status.as_str()
        ],
    )?;
    Ok(inserted > 0)
}

fn offer_from_row(row: &Row<'_>) -> rusqlite::Result<FaOffer> {
    let status: String = row.get(8)?;
    Ok(FaOffer {
        offer_id: row.get(0)?,
        team_id: row.get(1)?,
        player_id: row.get(2)?,
        season: row.get(3)?,
        aav: row.get(4)?,
        years: row.get(5)?,
        guaranteed: row.get(6)?,
        signing_bonus: row.get(7)?,
        status: OfferStatus::parse(&status).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                8,
                rusqlite::types::Type::Text,
                format!("unknown offer status '{}'", status).into(),
            )
        })?,
    })
}

pub fn pending_offers(conn: &Connection, dynasty_id: &str, season: u32) -> Result<Vec<FaOffer>> {
    let mut stmt = conn.prepare(
        "SELECT offer_id, team_id, player_id, season, aav, years, guaranteed, signing_bonus, status
         FROM fa_offers WHERE dynasty_id = ?1 AND season = ?2 AND status = 'PENDING'
         ORDER BY aav DESC, offer_id",
    )?;
    let rows = stmt.query_map(params![dynasty_id, season], offer_from_row)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

pub fn offer_count_for_team(
    conn: &Connection,
    dynasty_id: &str,
    team_id: u32,
    season: u32,
) -> Result<u32> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM fa_offers WHERE dynasty_id = ?1 AND team_id = ?2 AND season = ?3",
        params![dynasty_id, team_id, season],
        |row| row.get(0),
    )?)
}

pub fn offer_for_player(
    conn: &Connection,
    dynasty_id: &str,
    player_id: &str,
    season: u32,
) -> Result<Option<FaOffer>> {
    Ok(conn
        .query_row(
            "SELECT offer_id, team_id, player_id, season, aav, years, guaranteed,
                    signing_bonus, status
             FROM fa_offers WHERE dynasty_id = ?1 AND player_id = ?2 AND season = ?3",
            params![dynasty_id, player_id, season],
            offer_from_row,
        )
        .optional()?)
}

pub fn set_offer_status(
    conn: &Connection,
    dynasty_id: &str,
    offer_id: &str,
    status: OfferStatus,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE fa_offers SET status = ?3 WHERE dynasty_id = ?1 AND offer_id = ?2",
        params![dynasty_id, offer_id, status.as_str()],
    )?;
    if updated == 0 {
        return Err(DynastyError::NotFound(format!("offer {}", offer_id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{dynasty, Database};
    use crate::models::Dynasty;
    use crate::offseason::OffseasonPhase;

    fn setup() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let d = Dynasty::new("Log", 1, 2025);
        let start = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        dynasty::create_dynasty(db.conn(), &d, start, OffseasonPhase::PostSuperBowl).unwrap();
        (db, d.dynasty_id)
    }

    fn trade(date: NaiveDate, team_id: u32, other: u32) -> TransactionRecord {
        TransactionRecord {
            season: 2025,
            date,
            tx_type: TransactionType::Trade,
            team_id,
            other_team_id: Some(other),
            player_id: None,
            details: serde_json::json!({"assets": 2}),
        }
    }

    #[test]
    fn test_last_trade_date_sees_both_sides() {
        let (db, id) = setup();
        let early = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let late = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap();
        log_transaction(db.conn(), &id, &trade(early, 3, 7)).unwrap();
        log_transaction(db.conn(), &id, &trade(late, 9, 3)).unwrap();

        assert_eq!(last_trade_date(db.conn(), &id, 3).unwrap(), Some(late));
        assert_eq!(last_trade_date(db.conn(), &id, 7).unwrap(), Some(early));
        assert_eq!(last_trade_date(db.conn(), &id, 12).unwrap(), None);
        assert_eq!(transactions(db.conn(), &id, Some(3), None).unwrap().len(), 1);
        let trades_on_late = count_transactions_on(db.conn(), &id, 9, late, TransactionType::Trade);
        assert_eq!(trades_on_late.unwrap(), 1);
    }

    #[test]
    fn test_dead_money_sums_ledger() {
        let (db, id) = setup();
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let entries = [
            (CapEventType::DeadMoney, 3_000_000, "cut"),
            (CapEventType::DeadMoney, 1_500_000, "cut"),
            (CapEventType::Signing, 9_000_000, "sign"),
        ];
        for (event_type, amount, description) in entries {
            record_cap_transaction(db.conn(), &id, 4, 2026, event_type, amount, date, description)
                .unwrap();
        }
        assert_eq!(dead_money(db.conn(), &id, 4, 2026).unwrap(), 4_500_000);
        assert_eq!(dead_money(db.conn(), &id, 4, 2027).unwrap(), 0);
    }

    #[test]
    fn test_one_offer_per_player() {
        let (db, id) = setup();
        let offer = FaOffer {
            offer_id: "o1".into(),
            team_id: 2,
            player_id: "p1".into(),
            season: 2026,
            aav: 5_000_000,
            years: 2,
            guaranteed: 4_000_000,
            signing_bonus: 1_000_000,
            status: OfferStatus::Pending,
        };
        assert!(insert_offer(db.conn(), &id, &offer).unwrap());
        let rival = FaOffer { offer_id: "o2".into(), team_id: 6, ..offer.clone() };
        assert!(!insert_offer(db.conn(), &id, &rival).unwrap());

        set_offer_status(db.conn(), &id, "o1", OfferStatus::Accepted).unwrap();
        assert!(pending_offers(db.conn(), &id, 2026).unwrap().is_empty());
        assert_eq!(offer_for_player(db.conn(), &id, "p1", 2026).unwrap().unwrap().team_id, 2);
    }
}
