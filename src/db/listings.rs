use crate::db::connection::Database;
use crate::domain::fields::{Field, FieldValue};
use crate::errors::{EnrichError, EnrichResult};
use crate::store::ListingStore;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

/// Record store backed by the `listing_fields` table.
#[derive(Clone, Debug)]
pub struct SqliteListingStore {
    db: Database,
}

impl SqliteListingStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Registers a listing id. Idempotent.
    pub fn create_listing(&self, listing_id: i64) -> EnrichResult<()> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO listings (id) VALUES (?1)",
                params![listing_id],
            )?;
            Ok(())
        })
    }

    pub fn listing_exists(&self, listing_id: i64) -> EnrichResult<bool> {
        self.db.with_conn(|conn| listing_exists(conn, listing_id))
    }

    /// All visible fields of a listing, auxiliary trackers excluded.
    pub fn visible_fields(&self, listing_id: i64) -> EnrichResult<Vec<(Field, FieldValue)>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT field_name, value_json FROM listing_fields WHERE listing_id = ?1 ORDER BY field_name",
            )?;
            let rows = stmt.query_map(params![listing_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;

            let mut out = Vec::new();
            for row in rows {
                let (name, json) = row?;
                let Some(field) = Field::from_name(&name) else {
                    warn!(listing_id, field = %name, "skipping unknown stored field");
                    continue;
                };
                if field.is_auxiliary() {
                    continue;
                }
                out.push((field, serde_json::from_str(&json)?));
            }
            Ok(out)
        })
    }
}

fn listing_exists(conn: &Connection, listing_id: i64) -> EnrichResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM listings WHERE id = ?1",
            params![listing_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

impl ListingStore for SqliteListingStore {
    fn exists(&self, listing_id: i64) -> EnrichResult<bool> {
        self.listing_exists(listing_id)
    }

    fn get(&self, listing_id: i64, field: Field) -> EnrichResult<Option<FieldValue>> {
        self.db.with_conn(|conn| {
            let json: Option<String> = conn
                .query_row(
                    "SELECT value_json FROM listing_fields WHERE listing_id = ?1 AND field_name = ?2",
                    params![listing_id, field.name()],
                    |row| row.get(0),
                )
                .optional()?;

            match json {
                Some(json) => Ok(Some(serde_json::from_str(&json)?)),
                None => Ok(None),
            }
        })
    }

    fn set(&self, listing_id: i64, field: Field, value: FieldValue) -> EnrichResult<()> {
        let json = serde_json::to_string(&value)?;
        self.db.with_conn(|conn| {
            if !listing_exists(conn, listing_id)? {
                return Err(EnrichError::NotFound(listing_id));
            }
            conn.execute(
                r#"
                INSERT INTO listing_fields (listing_id, field_name, value_json, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(listing_id, field_name) DO UPDATE SET
                    value_json = excluded.value_json,
                    updated_at = excluded.updated_at
                "#,
                params![listing_id, field.name(), json, Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })
    }

    fn remove(&self, listing_id: i64, field: Field) -> EnrichResult<()> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM listing_fields WHERE listing_id = ?1 AND field_name = ?2",
                params![listing_id, field.name()],
            )?;
            Ok(())
        })
    }
}
