//! SQLite persistence.
//!
//! Repository functions take a `&Connection` so they run unchanged inside a
//! [`rusqlite::Transaction`] (which derefs to `Connection`). Every query is
//! filtered by `dynasty_id`.

pub mod draft;
pub mod dynasty;
pub mod league;
pub mod roster;
pub mod schema;
pub mod transaction_log;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, Transaction};
use std::path::Path;

use crate::error::Result;
use crate::models::Position;
use crate::offseason::OffseasonPhase;
use crate::personality::GMArchetype;

pub use schema::{init_schema, SCHEMA_VERSION};

/// Owns the SQLite connection for one save file.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        init_schema(&conn)?;
        log::debug!("Opened dynasty database at {:?}", path.as_ref());
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` in one SQL transaction: commit on `Ok`, roll back on `Err`.
    pub fn transaction<T>(&mut self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let tx = self.conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

fn text_column<T, E>(
    value: ValueRef<'_>,
    parse: impl FnOnce(&str) -> std::result::Result<T, E>,
) -> FromSqlResult<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    parse(value.as_str()?).map_err(|e| FromSqlError::Other(Box::new(e)))
}

impl ToSql for Position {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Position {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        text_column(value, str::parse)
    }
}

impl ToSql for GMArchetype {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for GMArchetype {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        text_column(value, str::parse)
    }
}

impl ToSql for OffseasonPhase {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for OffseasonPhase {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        text_column(value, str::parse)
    }
}
