//! Name resolution over the full set of observatories.
//!
//! Canonical identities and aliases share one case-insensitive namespace.
//! The registry is built in one pass and either fully succeeds or returns the
//! first collision; there is no partially loaded state.

use std::collections::HashMap;

use tracing::info;

use super::entry::ObservatoryEntry;
use super::normalize_name;
use super::record::ObservatoryRecord;
use crate::{ClockError, ClockResult};

#[derive(Debug, Clone, Default)]
pub struct ObservatoryRegistry {
    records: Vec<ObservatoryRecord>,
    names: HashMap<String, usize>,
}

impl ObservatoryRegistry {
    /// Loads declarative entries keyed by canonical identity.
    ///
    /// Iteration order of `entries` becomes the order of [`list_all`](Self::list_all).
    ///
    /// # Errors
    ///
    /// [`ClockError::InvalidRecord`] for an entry that cannot become a record,
    /// [`ClockError::DuplicateIdentity`] for any name collision.
    pub fn load<I, K>(entries: I) -> ClockResult<Self>
    where
        I: IntoIterator<Item = (K, ObservatoryEntry)>,
        K: AsRef<str>,
    {
        let records = entries
            .into_iter()
            .map(|(name, entry)| entry.into_record(name.as_ref()))
            .collect::<ClockResult<Vec<_>>>()?;
        Self::from_records(records)
    }

    /// Builds a registry from already constructed records.
    pub fn from_records<I>(records: I) -> ClockResult<Self>
    where
        I: IntoIterator<Item = ObservatoryRecord>,
    {
        let mut registry = Self::default();
        for record in records {
            registry.insert(record)?;
        }

        info!(
            observatories = registry.records.len(),
            names = registry.names.len(),
            "loaded observatory registry"
        );
        Ok(registry)
    }

    fn insert(&mut self, record: ObservatoryRecord) -> ClockResult<()> {
        let index = self.records.len();
        for name in record.names() {
            if let Some(&existing) = self.names.get(name) {
                return Err(ClockError::duplicate_identity(
                    name,
                    self.records[existing].canonical_id(),
                ));
            }
        }
        for name in record.names() {
            self.names.insert(name.to_string(), index);
        }
        self.records.push(record);
        Ok(())
    }

    /// Looks up a canonical identity or alias, ignoring case.
    pub fn resolve(&self, name: &str) -> ClockResult<&ObservatoryRecord> {
        self.names
            .get(&normalize_name(name))
            .map(|&idx| &self.records[idx])
            .ok_or_else(|| ClockError::unknown_observatory(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(&normalize_name(name))
    }

    /// All records in load order. The iterator is `Clone`, so it can be
    /// restarted.
    pub fn list_all(&self) -> std::slice::Iter<'_, ObservatoryRecord> {
        self.records.iter()
    }

    /// Records whose Tempo or ITOA code matches `code`.
    pub fn find_by_code<'a>(
        &'a self,
        code: &'a str,
    ) -> impl Iterator<Item = &'a ObservatoryRecord> + 'a {
        self.records.iter().filter(move |r| r.codes().matches(code))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
