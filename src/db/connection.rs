use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::info;

use crate::errors::EnrichError;

pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

// Thread-local connection slots, one per database path.
thread_local! {
    static DB_CONNS: RefCell<HashMap<String, Connection>> = RefCell::new(HashMap::new());
}

#[derive(Clone, Debug)]
pub struct Database {
    path: String,
}

impl Database {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Opens (or reuses) this thread's connection and hands it to the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, EnrichError>
    where
        F: FnOnce(&mut Connection) -> Result<T, EnrichError>,
    {
        DB_CONNS
            .try_with(|cell| {
                let mut slots = cell.borrow_mut();
                if !slots.contains_key(&self.path) {
                    let conn = Connection::open(&self.path)
                        .map_err(|e| EnrichError::DbError(format!("Open DB failed: {e}")))?;
                    conn.pragma_update(None, "foreign_keys", "ON")?;
                    slots.insert(self.path.clone(), conn);
                }
                match slots.get_mut(&self.path) {
                    Some(conn) => f(conn),
                    None => Err(EnrichError::DbError("connection slot missing".into())),
                }
            })
            .map_err(|_| EnrichError::DbError("thread-local connection unavailable".into()))?
    }
}

/// Apply the schema. Every statement is `IF NOT EXISTS`, so this is safe to
/// run on every start.
pub fn init_db(db: &Database, schema_sql: &str) -> Result<(), EnrichError> {
    db.with_conn(|conn| {
        conn.execute_batch(schema_sql)
            .map_err(|e| EnrichError::DbError(format!("Failed to apply schema: {e}")))?;
        Ok(())
    })?;

    info!(path = db.path(), "database initialized");
    Ok(())
}
