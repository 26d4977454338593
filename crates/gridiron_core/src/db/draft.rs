use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{DynastyError, Result};
use crate::models::{DraftPick, DraftProspect};

// ============================================================================
// Picks
// ============================================================================

fn pick_from_row(row: &Row<'_>) -> rusqlite::Result<DraftPick> {
    Ok(DraftPick {
        pick_id: row.get(0)?,
        season: row.get(1)?,
        round: row.get(2)?,
        original_team_id: row.get(3)?,
        current_team_id: row.get(4)?,
        overall_pick: row.get(5)?,
        used_by_player_id: row.get(6)?,
    })
}

const PICK_COLUMNS: &str =
    "pick_id, season, round, original_team_id, current_team_id, overall_pick, used_by_player_id";

/// Insert a pick; an existing pick with the same id is left untouched.
pub fn insert_pick(conn: &Connection, dynasty_id: &str, pick: &DraftPick) -> Result<bool> {
    let inserted = conn.execute(
        &format!(
            "INSERT OR IGNORE INTO draft_picks (dynasty_id, {PICK_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        ),
        params![
            dynasty_id,
            pick.pick_id,
            pick.season,
            pick.round,
            pick.original_team_id,
            pick.current_team_id,
            pick.overall_pick,
            pick.used_by_player_id
        ],
    )?;
    Ok(inserted > 0)
}

pub fn get_pick(conn: &Connection, dynasty_id: &str, pick_id: &str) -> Result<DraftPick> {
    conn.query_row(
        &format!("SELECT {PICK_COLUMNS} FROM draft_picks WHERE dynasty_id = ?1 AND pick_id = ?2"),
        params![dynasty_id, pick_id],
        pick_from_row,
    )
    .optional()?
    .ok_or_else(|| DynastyError::NotFound(format!("draft pick {}", pick_id)))
}

/// Every pick of a draft year, in draft order once set.
pub fn season_picks(conn: &Connection, dynasty_id: &str, season: u32) -> Result<Vec<DraftPick>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PICK_COLUMNS} FROM draft_picks WHERE dynasty_id = ?1 AND season = ?2
         ORDER BY round, COALESCE(overall_pick, 100000), original_team_id"
    ))?;
    let rows = stmt.query_map(params![dynasty_id, season], pick_from_row)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

/// Unused picks a team currently owns, from `from_season` on.
pub fn team_available_picks(
    conn: &Connection,
    dynasty_id: &str,
    team_id: u32,
    from_season: u32,
) -> Result<Vec<DraftPick>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PICK_COLUMNS} FROM draft_picks
         WHERE dynasty_id = ?1 AND current_team_id = ?2 AND season >= ?3
           AND used_by_player_id IS NULL
         ORDER BY season, round, original_team_id"
    ))?;
    let rows = stmt.query_map(params![dynasty_id, team_id, from_season], pick_from_row)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

pub fn set_overall_pick(
    conn: &Connection,
    dynasty_id: &str,
    pick_id: &str,
    overall: u32,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE draft_picks SET overall_pick = ?3 WHERE dynasty_id = ?1 AND pick_id = ?2",
        params![dynasty_id, pick_id, overall],
    )?;
    if updated == 0 {
        return Err(DynastyError::NotFound(format!("draft pick {}", pick_id)));
    }
    Ok(())
}

/// Transfer ownership of an unused pick.
pub fn transfer_pick(
    conn: &Connection,
    dynasty_id: &str,
    pick_id: &str,
    new_owner: u32,
) -> Result<()> {
    let pick = get_pick(conn, dynasty_id, pick_id)?;
    if pick.is_used() {
        return Err(DynastyError::DraftPickReused { pick_id: pick_id.to_string() });
    }
    conn.execute(
        "UPDATE draft_picks SET current_team_id = ?3 WHERE dynasty_id = ?1 AND pick_id = ?2",
        params![dynasty_id, pick_id, new_owner],
    )?;
    Ok(())
}

/// Consume a pick. A pick can only ever be used once.
pub fn mark_pick_used(
    conn: &Connection,
    dynasty_id: &str,
    pick_id: &str,
    player_id: &str,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE draft_picks SET used_by_player_id = ?3
         WHERE dynasty_id = ?1 AND pick_id = ?2 AND used_by_player_id IS NULL",
        params![dynasty_id, pick_id, player_id],
    )?;
    if updated == 0 {
        // Distinguish a missing pick from a reused one
        get_pick(conn, dynasty_id, pick_id)?;
        return Err(DynastyError::DraftPickReused { pick_id: pick_id.to_string() });
    }
    Ok(())
}

// ============================================================================
// Prospects
// ============================================================================

const PROSPECT_COLUMNS: &str = "prospect_id, season, first_name, last_name, position, overall, \
     potential, age, projected_round, drafted";

fn prospect_from_row(row: &Row<'_>) -> rusqlite::Result<DraftProspect> {
    Ok(DraftProspect {
        prospect_id: row.get(0)?,
        season: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        position: row.get(4)?,
        overall: row.get(5)?,
        potential: row.get(6)?,
        age: row.get(7)?,
        projected_round: row.get(8)?,
        drafted: row.get(9)?,
    })
}

pub fn insert_prospect(
    conn: &Connection,
    dynasty_id: &str,
    prospect: &DraftProspect,
) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO draft_prospects (dynasty_id, {PROSPECT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ),
        params![
            dynasty_id,
            prospect.prospect_id,
            prospect.season,
            prospect.first_name,
            prospect.last_name,
            prospect.position,
            prospect.overall,
            prospect.potential,
            prospect.age,
            prospect.projected_round,
            prospect.drafted
        ],
    )?;
    Ok(())
}

pub fn prospect_count(conn: &Connection, dynasty_id: &str, season: u32) -> Result<u32> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM draft_prospects WHERE dynasty_id = ?1 AND season = ?2",
        params![dynasty_id, season],
        |row| row.get(0),
    )?)
}

/// Undrafted prospects of a class, best first.
pub fn available_prospects(
    conn: &Connection,
    dynasty_id: &str,
    season: u32,
) -> Result<Vec<DraftProspect>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROSPECT_COLUMNS} FROM draft_prospects
         WHERE dynasty_id = ?1 AND season = ?2 AND drafted = 0
         ORDER BY overall DESC, potential DESC, prospect_id"
    ))?;
    let rows = stmt.query_map(params![dynasty_id, season], prospect_from_row)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

pub fn mark_prospect_drafted(conn: &Connection, dynasty_id: &str, prospect_id: &str) -> Result<()> {
    let updated = conn.execute(
        "UPDATE draft_prospects SET drafted = 1
         WHERE dynasty_id = ?1 AND prospect_id = ?2 AND drafted = 0",
        params![dynasty_id, prospect_id],
    )?;
    if updated == 0 {
        return Err(DynastyError::InvariantViolation(format!(
            "prospect {} is missing or already drafted",
            prospect_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{dynasty, Database};
    use crate::models::{Dynasty, Position};
    use crate::offseason::OffseasonPhase;
    use chrono::NaiveDate;

    fn setup() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let d = Dynasty::new("Draft", 1, 2025);
        let start = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        dynasty::create_dynasty(db.conn(), &d, start, OffseasonPhase::PostSuperBowl).unwrap();
        (db, d.dynasty_id)
    }

    #[test]
    fn test_pick_is_consumed_once() {
        let (db, id) = setup();
        let pick = DraftPick::new(2026, 1, 12);
        assert!(insert_pick(db.conn(), &id, &pick).unwrap());
        assert!(!insert_pick(db.conn(), &id, &pick).unwrap());

        mark_pick_used(db.conn(), &id, &pick.pick_id, "rookie-1").unwrap();
        let err = mark_pick_used(db.conn(), &id, &pick.pick_id, "rookie-2").unwrap_err();
        assert!(matches!(err, DynastyError::DraftPickReused { .. }));
        assert!(matches!(
            mark_pick_used(db.conn(), &id, "pick_missing", "x"),
            Err(DynastyError::NotFound(_))
        ));
        assert!(transfer_pick(db.conn(), &id, &pick.pick_id, 3).is_err());
    }

    #[test]
    fn test_team_available_picks_follow_ownership() {
        let (db, id) = setup();
        for round in 1..=2 {
            insert_pick(db.conn(), &id, &DraftPick::new(2026, round, 5)).unwrap();
        }
        transfer_pick(db.conn(), &id, &DraftPick::make_id(2026, 2, 5), 9).unwrap();
        assert_eq!(team_available_picks(db.conn(), &id, 5, 2026).unwrap().len(), 1);
        assert_eq!(team_available_picks(db.conn(), &id, 9, 2026).unwrap()[0].original_team_id, 5);
    }

    #[test]
    fn test_prospects_drafted_once() {
        let (db, id) = setup();
        let prospect = DraftProspect {
            prospect_id: "pr1".into(),
            season: 2026,
            first_name: "Top".into(),
            last_name: "Prospect".into(),
            position: Position::DE,
            overall: 74,
            potential: 88,
            age: 21,
            projected_round: 1,
            drafted: false,
        };
        insert_prospect(db.conn(), &id, &prospect).unwrap();
        assert_eq!(available_prospects(db.conn(), &id, 2026).unwrap().len(), 1);
        mark_prospect_drafted(db.conn(), &id, "pr1").unwrap();
        assert!(available_prospects(db.conn(), &id, 2026).unwrap().is_empty());
        assert!(mark_prospect_drafted(db.conn(), &id, "pr1").is_err());
    }
}
