use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{DynastyError, Result};
use crate::models::{Dynasty, DynastyState};
use crate::offseason::OffseasonPhase;

/// Insert the dynasty and its initial clock in one go.
pub fn create_dynasty(
    conn: &Connection,
    dynasty: &Dynasty,
    start_date: NaiveDate,
    phase: OffseasonPhase,
) -> Result<()> {
    conn.execute(
        "INSERT INTO dynasties (dynasty_id, name, user_team_id, start_season, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            dynasty.dynasty_id,
            dynasty.name,
            dynasty.user_team_id,
            dynasty.start_season,
            dynasty.created_at
        ],
    )?;
    conn.execute(
        "INSERT INTO dynasty_state (dynasty_id, sim_date, season, current_phase)
         VALUES (?1, ?2, ?3, ?4)",
        params![dynasty.dynasty_id, start_date, dynasty.start_season, phase],
    )?;
    log::info!("Created dynasty '{}' ({})", dynasty.name, dynasty.dynasty_id);
    Ok(())
}

pub fn get_dynasty(conn: &Connection, dynasty_id: &str) -> Result<Dynasty> {
    conn.query_row(
        "SELECT dynasty_id, name, user_team_id, start_season, created_at
         FROM dynasties WHERE dynasty_id = ?1",
        params![dynasty_id],
        |row| {
            Ok(Dynasty {
                dynasty_id: row.get(0)?,
                name: row.get(1)?,
                user_team_id: row.get(2)?,
                start_season: row.get(3)?,
                created_at: row.get(4)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| DynastyError::NotFound(format!("dynasty {}", dynasty_id)))
}

pub fn list_dynasties(conn: &Connection) -> Result<Vec<Dynasty>> {
    let mut stmt = conn.prepare(
        "SELECT dynasty_id, name, user_team_id, start_season, created_at
         FROM dynasties ORDER BY created_at",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Dynasty {
            dynasty_id: row.get(0)?,
            name: row.get(1)?,
            user_team_id: row.get(2)?,
            start_season: row.get(3)?,
            created_at: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

/// Remove a dynasty and, by cascade, every row scoped to it.
pub fn delete_dynasty(conn: &Connection, dynasty_id: &str) -> Result<bool> {
    let removed = conn.execute("DELETE FROM dynasties WHERE dynasty_id = ?1", params![dynasty_id])?;
    if removed > 0 {
        log::info!("Deleted dynasty {}", dynasty_id);
    }
    Ok(removed > 0)
}

pub fn load_state(conn: &Connection, dynasty_id: &str) -> Result<DynastyState> {
    conn.query_row(
        "SELECT dynasty_id, sim_date, season, current_phase
         FROM dynasty_state WHERE dynasty_id = ?1",
        params![dynasty_id],
        |row| {
            Ok(DynastyState {
                dynasty_id: row.get(0)?,
                current_date: row.get(1)?,
                season: row.get(2)?,
                current_phase: row.get(3)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| DynastyError::NotFound(format!("state for dynasty {}", dynasty_id)))
}

/// Persist date, season and phase together.
pub fn save_state(conn: &Connection, state: &DynastyState) -> Result<()> {
    let updated = conn.execute(
        "UPDATE dynasty_state SET sim_date = ?2, season = ?3, current_phase = ?4
         WHERE dynasty_id = ?1",
        params![state.dynasty_id, state.current_date, state.season, state.current_phase],
    )?;
    if updated == 0 {
        return Err(DynastyError::NotFound(format!("state for dynasty {}", state.dynasty_id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_create_load_and_save_state() {
        let db = Database::open_in_memory().unwrap();
        let dynasty = Dynasty::new("Test", 5, 2025);
        let start = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        create_dynasty(db.conn(), &dynasty, start, OffseasonPhase::PostSuperBowl).unwrap();

        let mut state = load_state(db.conn(), &dynasty.dynasty_id).unwrap();
        assert_eq!(state.current_date, start);
        assert_eq!(state.current_phase, OffseasonPhase::PostSuperBowl);

        state.current_phase = OffseasonPhase::Draft;
        save_state(db.conn(), &state).unwrap();
        let reloaded = load_state(db.conn(), &dynasty.dynasty_id).unwrap();
        assert_eq!(reloaded.current_phase, OffseasonPhase::Draft);
    }

    #[test]
    fn test_missing_dynasty_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(get_dynasty(db.conn(), "nope"), Err(DynastyError::NotFound(_))));
        assert!(!delete_dynasty(db.conn(), "nope").unwrap());
    }
}
