use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{EventRecord, EventStatus, EventType};
use crate::error::{DynastyError, Result};

const EVENT_COLUMNS: &str = "event_id, game_id, event_date, status, data";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<EventRecord> {
    let status: String = row.get(3)?;
    let data: String = row.get(4)?;
    let conversion = |idx: usize, msg: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, msg.into())
    };
    Ok(EventRecord {
        event_id: row.get(0)?,
        game_id: row.get(1)?,
        date: row.get(2)?,
        status: EventStatus::parse(&status)
            .ok_or_else(|| conversion(3, format!("unknown event status '{}'", status)))?,
        event: serde_json::from_str(&data).map_err(|e| conversion(4, e.to_string()))?,
    })
}

/// Event persistence scoped to one dynasty.
pub struct EventStore<'a> {
    conn: &'a Connection,
    dynasty_id: &'a str,
}

impl<'a> EventStore<'a> {
    pub fn new(conn: &'a Connection, dynasty_id: &'a str) -> Self {
        Self { conn, dynasty_id }
    }

    /// Insert unless an event with the same type and `game_id` exists.
    /// Returns whether a row was written.
    pub fn insert(&self, record: &EventRecord) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO events
                 (event_id, dynasty_id, event_type, game_id, event_date, status, data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.event_id,
                self.dynasty_id,
                record.event_type().as_str(),
                record.game_id,
                record.date,
                record.status.as_str(),
                serde_json::to_string(&record.event)?
            ],
        )?;
        if inserted == 0 {
            let event_type = record.event_type();
            log::debug!("Skipped duplicate {} event {}", event_type.as_str(), record.game_id);
        }
        Ok(inserted > 0)
    }

    /// Insert a batch, returning how many were new.
    pub fn insert_many<'r>(
        &self,
        records: impl IntoIterator<Item = &'r EventRecord>,
    ) -> Result<usize> {
        let mut written = 0;
        for record in records {
            if self.insert(record)? {
                written += 1;
            }
        }
        Ok(written)
    }

    pub fn get(&self, event_id: &str) -> Result<Option<EventRecord>> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {EVENT_COLUMNS} FROM events WHERE dynasty_id = ?1 AND event_id = ?2"
                ),
                params![self.dynasty_id, event_id],
                record_from_row,
            )
            .optional()?)
    }

    pub fn by_game_id(&self, event_type: EventType, game_id: &str) -> Result<Option<EventRecord>> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {EVENT_COLUMNS} FROM events
                     WHERE dynasty_id = ?1 AND event_type = ?2 AND game_id = ?3"
                ),
                params![self.dynasty_id, event_type.as_str(), game_id],
                record_from_row,
            )
            .optional()?)
    }

    /// Events whose `game_id` starts with `prefix`, by date then id.
    ///
    /// Matches the literal prefix; `_` and `%` are not wildcards here.
    pub fn by_prefix(&self, prefix: &str) -> Result<Vec<EventRecord>> {
        self.query(
            &format!(
                "SELECT {EVENT_COLUMNS} FROM events
                 WHERE dynasty_id = ?1 AND substr(game_id, 1, length(?2)) = ?2
                 ORDER BY event_date, game_id"
            ),
            params![self.dynasty_id, prefix],
        )
    }

    pub fn by_type(&self, event_type: EventType) -> Result<Vec<EventRecord>> {
        self.query(
            &format!(
                "SELECT {EVENT_COLUMNS} FROM events WHERE dynasty_id = ?1 AND event_type = ?2
                 ORDER BY event_date, game_id"
            ),
            params![self.dynasty_id, event_type.as_str()],
        )
    }

    pub fn all(&self) -> Result<Vec<EventRecord>> {
        self.query(
            &format!(
                "SELECT {EVENT_COLUMNS} FROM events WHERE dynasty_id = ?1
                 ORDER BY event_date, game_id"
            ),
            params![self.dynasty_id],
        )
    }

    pub fn count(&self, event_type: Option<EventType>) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM events WHERE dynasty_id = ?1 AND (?2 IS NULL OR event_type = ?2)",
            params![self.dynasty_id, event_type.map(|t| t.as_str())],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Move an event forward through `Scheduled -> Executed -> Completed`.
    /// The payload itself is never updated.
    pub fn update_status(&self, event_id: &str, status: EventStatus) -> Result<()> {
        let current = self
            .get(event_id)?
            .ok_or_else(|| DynastyError::NotFound(format!("event {}", event_id)))?;
        if status < current.status {
            return Err(DynastyError::InvariantViolation(format!(
                "event {} cannot move from {} back to {}",
                event_id,
                current.status.as_str(),
                status.as_str()
            )));
        }
        self.conn.execute(
            "UPDATE events SET status = ?3 WHERE dynasty_id = ?1 AND event_id = ?2",
            params![self.dynasty_id, event_id, status.as_str()],
        )?;
        Ok(())
    }

    /// Remove all but the first row per `(event_type, game_id)`. Returns rows removed.
    ///
    /// The unique index already prevents duplicates; this repairs stores
    /// written before it existed and is a no-op when run again.
    pub fn dedupe_by_game_id(&self) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM events WHERE dynasty_id = ?1 AND rowid NOT IN (
                SELECT MIN(rowid) FROM events WHERE dynasty_id = ?1 GROUP BY event_type, game_id
             )",
            params![self.dynasty_id],
        )?;
        if removed > 0 {
            log::info!("Removed {} duplicate events", removed);
        }
        Ok(removed)
    }

    fn query(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<EventRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, record_from_row)?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{dynasty, Database};
    use crate::events::{playoff_game_id, playoff_prefix, GameEvent, PlayoffRound};
    use crate::models::Dynasty;
    use crate::offseason::OffseasonPhase;
    use chrono::NaiveDate;

    fn setup() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let d = Dynasty::new("Events", 1, 2025);
        let start = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        dynasty::create_dynasty(db.conn(), &d, start, OffseasonPhase::PostSuperBowl).unwrap();
        (db, d.dynasty_id)
    }

    fn wild_card(n: usize) -> EventRecord {
        let game = GameEvent {
            season: 2025,
            week: None,
            round: Some(PlayoffRound::WildCard),
            home_team_id: n as u32,
            away_team_id: n as u32 + 10,
            home_score: 20,
            away_score: 13,
        };
        EventRecord::game(
            playoff_game_id(2025, PlayoffRound::WildCard, n),
            NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            game,
        )
    }

    #[test]
    fn test_duplicate_insert_is_ignored() {
        let (db, id) = setup();
        let store = EventStore::new(db.conn(), &id);
        assert!(store.insert(&wild_card(1)).unwrap());
        assert!(!store.insert(&wild_card(1)).unwrap());
        assert_eq!(store.count(Some(EventType::Game)).unwrap(), 1);
    }

    #[test]
    fn test_prefix_is_literal() {
        let (db, id) = setup();
        let store = EventStore::new(db.conn(), &id);
        store.insert(&wild_card(1)).unwrap();
        // '_' would match any character under LIKE
        let mut other = wild_card(2);
        other.game_id = "playoffX2025_wild_card_2".into();
        store.insert(&other).unwrap();
        assert_eq!(store.by_prefix(&playoff_prefix(2025)).unwrap().len(), 1);
    }

    #[test]
    fn test_status_only_moves_forward() {
        let (db, id) = setup();
        let store = EventStore::new(db.conn(), &id);
        let record = wild_card(3).scheduled();
        store.insert(&record).unwrap();
        store.update_status(&record.event_id, EventStatus::Executed).unwrap();
        assert!(store.update_status(&record.event_id, EventStatus::Scheduled).is_err());
        assert_eq!(store.get(&record.event_id).unwrap().unwrap().status, EventStatus::Executed);
    }

    #[test]
    fn test_other_dynasty_is_invisible() {
        let (db, id) = setup();
        let other = Dynasty::new("Other", 2, 2025);
        let start = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        dynasty::create_dynasty(db.conn(), &other, start, OffseasonPhase::PostSuperBowl).unwrap();

        EventStore::new(db.conn(), &id).insert(&wild_card(1)).unwrap();
        let theirs = EventStore::new(db.conn(), &other.dynasty_id);
        assert!(theirs.all().unwrap().is_empty());
        assert!(theirs.insert(&wild_card(1)).unwrap());
    }
}
