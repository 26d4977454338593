//! Database schema.
//!
//! Every dynasty-scoped table references `dynasties` with `ON DELETE CASCADE`.

use rusqlite::Connection;

pub const SCHEMA_VERSION: u32 = 1;

const TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS dynasties (
        dynasty_id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        user_team_id INTEGER NOT NULL,
        start_season INTEGER NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS dynasty_state (
        dynasty_id TEXT PRIMARY KEY REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        sim_date TEXT NOT NULL,
        season INTEGER NOT NULL,
        current_phase TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS teams (
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        team_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        abbreviation TEXT NOT NULL,
        conference TEXT NOT NULL,
        division TEXT NOT NULL,
        gm_archetype TEXT NOT NULL,
        PRIMARY KEY (dynasty_id, team_id)
    )",
    "CREATE TABLE IF NOT EXISTS players (
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        player_id TEXT NOT NULL,
        team_id INTEGER,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        position TEXT NOT NULL,
        overall INTEGER NOT NULL,
        potential INTEGER NOT NULL,
        age INTEGER NOT NULL,
        years_pro INTEGER NOT NULL,
        PRIMARY KEY (dynasty_id, player_id)
    )",
    "CREATE TABLE IF NOT EXISTS contracts (
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        contract_id TEXT NOT NULL,
        player_id TEXT NOT NULL,
        team_id INTEGER NOT NULL,
        start_season INTEGER NOT NULL,
        end_season INTEGER NOT NULL,
        years INTEGER NOT NULL,
        total_value INTEGER NOT NULL,
        aav INTEGER NOT NULL,
        guaranteed INTEGER NOT NULL,
        signing_bonus INTEGER NOT NULL,
        is_franchise_tag INTEGER NOT NULL DEFAULT 0,
        active INTEGER NOT NULL DEFAULT 1,
        PRIMARY KEY (dynasty_id, contract_id),
        FOREIGN KEY (dynasty_id, player_id)
            REFERENCES players(dynasty_id, player_id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS draft_picks (
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        pick_id TEXT NOT NULL,
        season INTEGER NOT NULL,
        round INTEGER NOT NULL,
        original_team_id INTEGER NOT NULL,
        current_team_id INTEGER NOT NULL,
        overall_pick INTEGER,
        used_by_player_id TEXT,
        PRIMARY KEY (dynasty_id, pick_id),
        UNIQUE (dynasty_id, season, round, original_team_id)
    )",
    "CREATE TABLE IF NOT EXISTS draft_prospects (
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        prospect_id TEXT NOT NULL,
        season INTEGER NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        position TEXT NOT NULL,
        overall INTEGER NOT NULL,
        potential INTEGER NOT NULL,
        age INTEGER NOT NULL,
        projected_round INTEGER NOT NULL,
        drafted INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (dynasty_id, prospect_id)
    )",
    "CREATE TABLE IF NOT EXISTS standings (
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        season INTEGER NOT NULL,
        team_id INTEGER NOT NULL,
        wins INTEGER NOT NULL DEFAULT 0,
        losses INTEGER NOT NULL DEFAULT 0,
        ties INTEGER NOT NULL DEFAULT 0,
        points_for INTEGER NOT NULL DEFAULT 0,
        points_against INTEGER NOT NULL DEFAULT 0,
        streak INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (dynasty_id, season, team_id)
    )",
    "CREATE TABLE IF NOT EXISTS events (
        event_id TEXT PRIMARY KEY,
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        event_type TEXT NOT NULL,
        game_id TEXT NOT NULL,
        event_date TEXT NOT NULL,
        status TEXT NOT NULL,
        data TEXT NOT NULL,
        UNIQUE (dynasty_id, event_type, game_id)
    )",
    "CREATE TABLE IF NOT EXISTS transaction_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        season INTEGER NOT NULL,
        tx_date TEXT NOT NULL,
        tx_type TEXT NOT NULL,
        team_id INTEGER NOT NULL,
        other_team_id INTEGER,
        player_id TEXT,
        details TEXT NOT NULL DEFAULT '{}'
    )",
    "CREATE TABLE IF NOT EXISTS cap_transactions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        team_id INTEGER NOT NULL,
        season INTEGER NOT NULL,
        event_type TEXT NOT NULL,
        amount INTEGER NOT NULL,
        tx_date TEXT NOT NULL,
        description TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS fa_offers (
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        offer_id TEXT NOT NULL,
        team_id INTEGER NOT NULL,
        player_id TEXT NOT NULL,
        season INTEGER NOT NULL,
        aav INTEGER NOT NULL,
        years INTEGER NOT NULL,
        guaranteed INTEGER NOT NULL,
        signing_bonus INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'PENDING',
        PRIMARY KEY (dynasty_id, offer_id),
        UNIQUE (dynasty_id, player_id, season)
    )",
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_players_team ON players(dynasty_id, team_id)",
    "CREATE INDEX IF NOT EXISTS idx_contracts_team ON contracts(dynasty_id, team_id, active)",
    "CREATE INDEX IF NOT EXISTS idx_contracts_player ON contracts(dynasty_id, player_id, active)",
    // One franchise tag per team per league year
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_one_tag_per_team
        ON contracts(dynasty_id, team_id, start_season) WHERE is_franchise_tag = 1",
    "CREATE INDEX IF NOT EXISTS idx_picks_owner
        ON draft_picks(dynasty_id, season, current_team_id)",
    "CREATE INDEX IF NOT EXISTS idx_events_type ON events(dynasty_id, event_type)",
    "CREATE INDEX IF NOT EXISTS idx_events_game ON events(dynasty_id, game_id)",
    "CREATE INDEX IF NOT EXISTS idx_tx_log_team ON transaction_log(dynasty_id, team_id, tx_type)",
    "CREATE INDEX IF NOT EXISTS idx_cap_tx_team ON cap_transactions(dynasty_id, team_id, season)",
];

/// Create every table and index. Safe to call on an existing database.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    for ddl in TABLES.iter().chain(INDEXES) {
        conn.execute(ddl, [])?;
    }
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creation() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        let expected_tables =
            ["dynasties", "dynasty_state", "players", "contracts", "events", "fa_offers"];
        for expected in expected_tables {
            assert!(tables.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
    }
}
