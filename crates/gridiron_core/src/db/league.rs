use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{DynastyError, Result};
use crate::models::{Conference, Team, TeamStanding};
use crate::personality::GMArchetype;

// ============================================================================
// Teams
// ============================================================================

pub fn insert_team(conn: &Connection, dynasty_id: &str, team: &Team) -> Result<()> {
    conn.execute(
        "INSERT INTO teams
             (dynasty_id, team_id, name, abbreviation, conference, division, gm_archetype)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            dynasty_id,
            team.team_id,
            team.name,
            team.abbreviation,
            team.conference.as_str(),
            team.division,
            team.gm_archetype
        ],
    )?;
    Ok(())
}

fn team_from_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    let conference: String = row.get(3)?;
    let conference = Conference::parse(&conference).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown conference '{}'", conference).into(),
        )
    })?;
    Ok(Team {
        team_id: row.get(0)?,
        name: row.get(1)?,
        abbreviation: row.get(2)?,
        conference,
        division: row.get(4)?,
        gm_archetype: row.get(5)?,
    })
}

pub fn get_team(conn: &Connection, dynasty_id: &str, team_id: u32) -> Result<Team> {
    conn.query_row(
        "SELECT team_id, name, abbreviation, conference, division, gm_archetype
         FROM teams WHERE dynasty_id = ?1 AND team_id = ?2",
        params![dynasty_id, team_id],
        team_from_row,
    )
    .optional()?
    .ok_or_else(|| DynastyError::NotFound(format!("team {}", team_id)))
}

/// All teams ordered by id.
pub fn list_teams(conn: &Connection, dynasty_id: &str) -> Result<Vec<Team>> {
    let mut stmt = conn.prepare(
        "SELECT team_id, name, abbreviation, conference, division, gm_archetype
         FROM teams WHERE dynasty_id = ?1 ORDER BY team_id",
    )?;
    let teams = stmt.query_map(params![dynasty_id], team_from_row)?;
    Ok(teams.collect::<rusqlite::Result<_>>()?)
}

/// GM archetype for a team, `Balanced` when the team is unknown.
pub fn team_archetype(conn: &Connection, dynasty_id: &str, team_id: u32) -> Result<GMArchetype> {
    let archetype = conn
        .query_row(
            "SELECT gm_archetype FROM teams WHERE dynasty_id = ?1 AND team_id = ?2",
            params![dynasty_id, team_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(archetype.unwrap_or_default())
}

pub fn set_team_archetype(
    conn: &Connection,
    dynasty_id: &str,
    team_id: u32,
    archetype: GMArchetype,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE teams SET gm_archetype = ?3 WHERE dynasty_id = ?1 AND team_id = ?2",
        params![dynasty_id, team_id, archetype],
    )?;
    if updated == 0 {
        return Err(DynastyError::NotFound(format!("team {}", team_id)));
    }
    Ok(())
}

// ============================================================================
// Standings
// ============================================================================

pub fn upsert_standing(
    conn: &Connection,
    dynasty_id: &str,
    season: u32,
    standing: &TeamStanding,
) -> Result<()> {
    conn.execute(
        "INSERT INTO standings
             (dynasty_id, season, team_id, wins, losses, ties, points_for, points_against, streak)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT (dynasty_id, season, team_id) DO UPDATE SET
            wins = excluded.wins,
            losses = excluded.losses,
            ties = excluded.ties,
            points_for = excluded.points_for,
            points_against = excluded.points_against,
            streak = excluded.streak",
        params![
            dynasty_id,
            season,
            standing.team_id,
            standing.wins,
            standing.losses,
            standing.ties,
            standing.points_for,
            standing.points_against,
            standing.streak
        ],
    )?;
    Ok(())
}

fn standing_from_row(row: &Row<'_>) -> rusqlite::Result<TeamStanding> {
    Ok(TeamStanding {
        team_id: row.get(0)?,
        wins: row.get(1)?,
        losses: row.get(2)?,
        ties: row.get(3)?,
        points_for: row.get(4)?,
        points_against: row.get(5)?,
        streak: row.get(6)?,
    })
}

pub fn get_standing(
    conn: &Connection,
    dynasty_id: &str,
    season: u32,
    team_id: u32,
) -> Result<Option<TeamStanding>> {
    Ok(conn
        .query_row(
            "SELECT team_id, wins, losses, ties, points_for, points_against, streak
             FROM standings WHERE dynasty_id = ?1 AND season = ?2 AND team_id = ?3",
            params![dynasty_id, season, team_id],
            standing_from_row,
        )
        .optional()?)
}

/// Standings for a season ordered by team id. Empty if none were recorded.
pub fn season_standings(
    conn: &Connection,
    dynasty_id: &str,
    season: u32,
) -> Result<Vec<TeamStanding>> {
    let mut stmt = conn.prepare(
        "SELECT team_id, wins, losses, ties, points_for, points_against, streak
         FROM standings WHERE dynasty_id = ?1 AND season = ?2 ORDER BY team_id",
    )?;
    let rows = stmt.query_map(params![dynasty_id, season], standing_from_row)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{dynasty, Database};
    use crate::models::Dynasty;
    use crate::offseason::OffseasonPhase;
    use chrono::NaiveDate;

    fn setup() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let d = Dynasty::new("League", 1, 2025);
        let start = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        dynasty::create_dynasty(db.conn(), &d, start, OffseasonPhase::PostSuperBowl).unwrap();
        (db, d.dynasty_id)
    }

    fn team(team_id: u32, archetype: GMArchetype) -> Team {
        Team {
            team_id,
            name: format!("Team {team_id}"),
            abbreviation: format!("T{team_id:02}"),
            conference: Conference::NFC,
            division: "North".into(),
            gm_archetype: archetype,
        }
    }

    #[test]
    fn test_team_round_trip_and_archetype() {
        let (db, id) = setup();
        insert_team(db.conn(), &id, &team(3, GMArchetype::Ruthless)).unwrap();
        assert_eq!(get_team(db.conn(), &id, 3).unwrap().gm_archetype, GMArchetype::Ruthless);
        assert_eq!(team_archetype(db.conn(), &id, 3).unwrap(), GMArchetype::Ruthless);
        assert_eq!(team_archetype(db.conn(), &id, 30).unwrap(), GMArchetype::Balanced);
    }

    #[test]
    fn test_standing_upsert_replaces_row() {
        let (db, id) = setup();
        let mut standing = TeamStanding::new(7);
        standing.wins = 3;
        upsert_standing(db.conn(), &id, 2025, &standing).unwrap();
        standing.wins = 4;
        standing.streak = -2;
        upsert_standing(db.conn(), &id, 2025, &standing).unwrap();

        let rows = season_standings(db.conn(), &id, 2025).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].wins, 4);
        assert_eq!(rows[0].streak, -2);
        assert!(get_standing(db.conn(), &id, 2024, 7).unwrap().is_none());
    }
}
