//! Players and contracts.
//!
//! A player belongs to at most one team (`players.team_id`) and has at most
//! one active contract, whose `team_id` always matches the player's.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{DynastyError, Result};
use crate::models::{Contract, Player, RosterEntry};

const PLAYER_COLUMNS: &str =
    "player_id, team_id, first_name, last_name, position, overall, potential, age, years_pro";

const CONTRACT_COLUMNS: &str = "contract_id, player_id, team_id, start_season, end_season, years, \
     total_value, aav, guaranteed, signing_bonus, is_franchise_tag";

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
    Ok(Player {
        player_id: row.get(0)?,
        team_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        position: row.get(4)?,
        overall: row.get(5)?,
        potential: row.get(6)?,
        age: row.get(7)?,
        years_pro: row.get(8)?,
    })
}

fn contract_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Contract> {
    Ok(Contract {
        contract_id: row.get(offset)?,
        player_id: row.get(offset + 1)?,
        team_id: row.get(offset + 2)?,
        start_season: row.get(offset + 3)?,
        end_season: row.get(offset + 4)?,
        years: row.get(offset + 5)?,
        total_value: row.get(offset + 6)?,
        aav: row.get(offset + 7)?,
        guaranteed: row.get(offset + 8)?,
        signing_bonus: row.get(offset + 9)?,
        is_franchise_tag: row.get(offset + 10)?,
    })
}

// ============================================================================
// Players
// ============================================================================

pub fn insert_player(conn: &Connection, dynasty_id: &str, player: &Player) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO players (dynasty_id, {PLAYER_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        ),
        params![
            dynasty_id,
            player.player_id,
            player.team_id,
            player.first_name,
            player.last_name,
            player.position,
            player.overall,
            player.potential,
            player.age,
            player.years_pro
        ],
    )?;
    Ok(())
}

pub fn get_player(conn: &Connection, dynasty_id: &str, player_id: &str) -> Result<Player> {
    conn.query_row(
        &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE dynasty_id = ?1 AND player_id = ?2"),
        params![dynasty_id, player_id],
        player_from_row,
    )
    .optional()?
    .ok_or_else(|| DynastyError::NotFound(format!("player {}", player_id)))
}

/// Players on a team, best first.
pub fn team_players(conn: &Connection, dynasty_id: &str, team_id: u32) -> Result<Vec<Player>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players WHERE dynasty_id = ?1 AND team_id = ?2
         ORDER BY overall DESC, player_id"
    ))?;
    let rows = stmt.query_map(params![dynasty_id, team_id], player_from_row)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

pub fn roster_count(conn: &Connection, dynasty_id: &str, team_id: u32) -> Result<u32> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM players WHERE dynasty_id = ?1 AND team_id = ?2",
        params![dynasty_id, team_id],
        |row| row.get(0),
    )?)
}

/// Unsigned players, best first.
pub fn free_agents(conn: &Connection, dynasty_id: &str) -> Result<Vec<Player>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players WHERE dynasty_id = ?1 AND team_id IS NULL
         ORDER BY overall DESC, player_id"
    ))?;
    let rows = stmt.query_map(params![dynasty_id], player_from_row)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

pub fn set_player_team(
    conn: &Connection,
    dynasty_id: &str,
    player_id: &str,
    team_id: Option<u32>,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE players SET team_id = ?3 WHERE dynasty_id = ?1 AND player_id = ?2",
        params![dynasty_id, player_id, team_id],
    )?;
    if updated == 0 {
        return Err(DynastyError::NotFound(format!("player {}", player_id)));
    }
    Ok(())
}

// ============================================================================
// Contracts
// ============================================================================

/// Insert a validated contract as the player's active deal.
pub fn insert_contract(conn: &Connection, dynasty_id: &str, contract: &Contract) -> Result<()> {
    contract.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO contracts (dynasty_id, {CONTRACT_COLUMNS}, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 1)"
        ),
        params![
            dynasty_id,
            contract.contract_id,
            contract.player_id,
            contract.team_id,
            contract.start_season,
            contract.end_season,
            contract.years,
            contract.total_value,
            contract.aav,
            contract.guaranteed,
            contract.signing_bonus,
            contract.is_franchise_tag
        ],
    )?;
    Ok(())
}

pub fn active_contract(
    conn: &Connection,
    dynasty_id: &str,
    player_id: &str,
) -> Result<Option<Contract>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {CONTRACT_COLUMNS} FROM contracts
                 WHERE dynasty_id = ?1 AND player_id = ?2 AND active = 1"
            ),
            params![dynasty_id, player_id],
            |row| contract_from_row(row, 0),
        )
        .optional()?)
}

pub fn team_contracts(conn: &Connection, dynasty_id: &str, team_id: u32) -> Result<Vec<Contract>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONTRACT_COLUMNS} FROM contracts
         WHERE dynasty_id = ?1 AND team_id = ?2 AND active = 1 ORDER BY contract_id"
    ))?;
    let rows = stmt.query_map(params![dynasty_id, team_id], |row| contract_from_row(row, 0))?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

/// Every player on a team paired with their active contract.
pub fn team_roster(conn: &Connection, dynasty_id: &str, team_id: u32) -> Result<Vec<RosterEntry>> {
    team_players(conn, dynasty_id, team_id)?
        .into_iter()
        .map(|player| {
            let contract = active_contract(conn, dynasty_id, &player.player_id)?;
            Ok(RosterEntry { player, contract })
        })
        .collect()
}

pub fn deactivate_contract(conn: &Connection, dynasty_id: &str, contract_id: &str) -> Result<()> {
    let updated = conn.execute(
        "UPDATE contracts SET active = 0 WHERE dynasty_id = ?1 AND contract_id = ?2 AND active = 1",
        params![dynasty_id, contract_id],
    )?;
    if updated == 0 {
        return Err(DynastyError::NotFound(format!("active contract {}", contract_id)));
    }
    Ok(())
}

/// Reassign an active contract to another team (trades).
pub fn move_contract(
    conn: &Connection,
    dynasty_id: &str,
    contract_id: &str,
    team_id: u32,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE contracts SET team_id = ?3
         WHERE dynasty_id = ?1 AND contract_id = ?2 AND active = 1",
        params![dynasty_id, contract_id, team_id],
    )?;
    if updated == 0 {
        return Err(DynastyError::NotFound(format!("active contract {}", contract_id)));
    }
    Ok(())
}

/// Rostered players whose active deal ends with `season`, optionally for one team.
pub fn expiring_contracts(
    conn: &Connection,
    dynasty_id: &str,
    season: u32,
    team_id: Option<u32>,
) -> Result<Vec<RosterEntry>> {
    let mut stmt = conn.prepare(
        "SELECT p.player_id, p.team_id, p.first_name, p.last_name, p.position, p.overall,
                p.potential, p.age, p.years_pro,
                c.contract_id, c.player_id, c.team_id, c.start_season, c.end_season, c.years,
                c.total_value, c.aav, c.guaranteed, c.signing_bonus, c.is_franchise_tag
         FROM contracts c
         JOIN players p ON p.dynasty_id = c.dynasty_id AND p.player_id = c.player_id
         WHERE c.dynasty_id = ?1 AND c.active = 1 AND c.end_season = ?2
           AND (?3 IS NULL OR c.team_id = ?3)
         ORDER BY c.team_id, p.overall DESC, p.player_id",
    )?;
    let rows = stmt.query_map(params![dynasty_id, season, team_id], |row| {
        Ok(RosterEntry {
            player: player_from_row(row)?,
            contract: Some(contract_from_row(row, 9)?),
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

/// The team's franchise-tag contract for `season`, if one was applied.
pub fn franchise_tag_for_team(
    conn: &Connection,
    dynasty_id: &str,
    team_id: u32,
    season: u32,
) -> Result<Option<Contract>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {CONTRACT_COLUMNS} FROM contracts
                 WHERE dynasty_id = ?1 AND team_id = ?2 AND start_season = ?3
                   AND is_franchise_tag = 1"
            ),
            params![dynasty_id, team_id, season],
            |row| contract_from_row(row, 0),
        )
        .optional()?)
}
