// src/store.rs

use crate::domain::fields::{Field, FieldValue};
use crate::errors::{EnrichError, EnrichResult};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

/// The record store the engine enriches. It owns the listing's lifecycle;
/// the engine only ever reads and writes single named fields.
pub trait ListingStore {
    fn exists(&self, listing_id: i64) -> EnrichResult<bool>;
    fn get(&self, listing_id: i64, field: Field) -> EnrichResult<Option<FieldValue>>;
    fn set(&self, listing_id: i64, field: Field, value: FieldValue) -> EnrichResult<()>;
    /// Drops a stored value. Removing an absent field is not an error.
    fn remove(&self, listing_id: i64, field: Field) -> EnrichResult<()>;
}

impl<S: ListingStore + ?Sized> ListingStore for &S {
    fn exists(&self, listing_id: i64) -> EnrichResult<bool> {
        (**self).exists(listing_id)
    }

    fn get(&self, listing_id: i64, field: Field) -> EnrichResult<Option<FieldValue>> {
        (**self).get(listing_id, field)
    }

    fn set(&self, listing_id: i64, field: Field, value: FieldValue) -> EnrichResult<()> {
        (**self).set(listing_id, field, value)
    }

    fn remove(&self, listing_id: i64, field: Field) -> EnrichResult<()> {
        (**self).remove(listing_id, field)
    }
}

/// A store kept entirely in memory. Used by tests and by callers that
/// enrich a record before persisting it themselves.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<HashMap<(i64, Field), FieldValue>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values for a listing, auxiliary fields included.
    pub fn field_count(&self, listing_id: i64) -> usize {
        self.records
            .lock()
            .map(|records| records.keys().filter(|(id, _)| *id == listing_id).count())
            .unwrap_or(0)
    }
}

impl ListingStore for InMemoryStore {
    /// A listing exists here once any field has been stored for it.
    fn exists(&self, listing_id: i64) -> EnrichResult<bool> {
        Ok(self.field_count(listing_id) > 0)
    }

    fn get(&self, listing_id: i64, field: Field) -> EnrichResult<Option<FieldValue>> {
        let records = self
            .records
            .lock()
            .map_err(|_| EnrichError::DbError("in-memory store lock poisoned".into()))?;
        Ok(records.get(&(listing_id, field)).cloned())
    }

    fn set(&self, listing_id: i64, field: Field, value: FieldValue) -> EnrichResult<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| EnrichError::DbError("in-memory store lock poisoned".into()))?;
        records.insert((listing_id, field), value);
        Ok(())
    }

    fn remove(&self, listing_id: i64, field: Field) -> EnrichResult<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| EnrichError::DbError("in-memory store lock poisoned".into()))?;
        records.remove(&(listing_id, field));
        Ok(())
    }
}

/// Typed access over a [`ListingStore`], scoped to one listing.
///
/// Values are validated here: a field that holds something of the wrong
/// shape reads as absent instead of failing the pass.
pub struct ListingRepository<'a, S: ListingStore + ?Sized> {
    store: &'a S,
    listing_id: i64,
}

impl<'a, S: ListingStore + ?Sized> ListingRepository<'a, S> {
    pub fn new(store: &'a S, listing_id: i64) -> Self {
        Self { store, listing_id }
    }

    pub fn listing_id(&self) -> i64 {
        self.listing_id
    }

    pub fn raw(&self, field: Field) -> EnrichResult<Option<FieldValue>> {
        self.store.get(self.listing_id, field)
    }

    pub fn number(&self, field: Field) -> EnrichResult<Option<f64>> {
        Ok(self.raw(field)?.and_then(|v| v.as_f64()))
    }

    pub fn text(&self, field: Field) -> EnrichResult<Option<String>> {
        Ok(self.raw(field)?.and_then(|v| v.as_text()))
    }

    pub fn date(&self, field: Field) -> EnrichResult<Option<NaiveDate>> {
        Ok(self.raw(field)?.and_then(|v| v.as_date()))
    }

    pub fn set(&self, field: Field, value: impl Into<FieldValue>) -> EnrichResult<()> {
        self.store.set(self.listing_id, field, value.into())
    }

    /// Writes `value` when present; `None` leaves the stored value untouched.
    pub fn set_opt<V: Into<FieldValue>>(&self, field: Field, value: Option<V>) -> EnrichResult<bool> {
        match value {
            Some(v) => {
                self.set(field, v)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Writes `value` when present and removes the stored value when not, so
    /// recomputed fields never keep a stale result.
    pub fn set_or_clear<V: Into<FieldValue>>(&self, field: Field, value: Option<V>) -> EnrichResult<bool> {
        match value {
            Some(v) => {
                self.set(field, v)?;
                Ok(true)
            }
            None => {
                self.store.remove(self.listing_id, field)?;
                Ok(false)
            }
        }
    }
}
