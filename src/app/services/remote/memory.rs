use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use super::{compare_values, Query, Record, RemoteError, RemoteErrorKind, RemoteStore, SortDirection};

#[derive(Default)]
struct Tables {
    rows: HashMap<String, Vec<Record>>,
    unique: HashMap<String, String>,
    next_id: u64,
    failures: VecDeque<RemoteError>,
}

/// In-process store with the same contract as the hosted one.
///
/// Records without an `id` get one assigned on insert. A collection may
/// declare one unique field; inserting a second record with the same value
/// fails with `AlreadyExists` and leaves the table unchanged.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unique(self, collection: &str, field: &str) -> Self {
        self.lock()
            .unique
            .insert(collection.to_string(), field.to_string());
        self
    }

    /// Queue an error for the next call, whatever it is.
    pub fn inject_failure(&self, error: RemoteError) {
        self.lock().failures.push_back(error);
    }

    pub fn count(&self, collection: &str) -> usize {
        self.lock().rows.get(collection).map_or(0, Vec::len)
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // A panic in another holder cannot leave Tables half-written.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_failure(tables: &mut Tables) -> Result<(), RemoteError> {
        match tables.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl RemoteStore for MemoryStore {
    fn select(&self, query: &Query) -> Result<Vec<Record>, RemoteError> {
        let mut tables = self.lock();
        Self::take_failure(&mut tables)?;

        let mut found: Vec<Record> = tables
            .rows
            .get(&query.collection)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();

        if let Some(sort) = &query.sort {
            found.sort_by(|a, b| {
                let ord = match (a.get(&sort.field), b.get(&sort.field)) {
                    (Some(x), Some(y)) => compare_values(x, y).unwrap_or(std::cmp::Ordering::Equal),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                };
                match sort.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    fn insert(&self, collection: &str, mut record: Record) -> Result<Record, RemoteError> {
        let mut tables = self.lock();
        Self::take_failure(&mut tables)?;

        if let Some(field) = tables.unique.get(collection).cloned() {
            let value = record.get(&field).cloned().unwrap_or(Value::Null);
            let clash = tables
                .rows
                .get(collection)
                .is_some_and(|rows| rows.iter().any(|r| r.get(&field) == Some(&value)));
            if clash {
                return Err(RemoteError::new(
                    RemoteErrorKind::AlreadyExists,
                    format!("{collection}.{field}={value} already exists"),
                ));
            }
        }

        if !record.contains_key("id") {
            tables.next_id += 1;
            record.insert("id".to_string(), Value::from(tables.next_id));
        }
        tables
            .rows
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn update(&self, query: &Query, patch: Record) -> Result<Vec<Record>, RemoteError> {
        let mut tables = self.lock();
        Self::take_failure(&mut tables)?;

        let Some(rows) = tables.rows.get_mut(&query.collection) else {
            return Ok(Vec::new());
        };
        let mut updated = Vec::new();
        for row in rows.iter_mut().filter(|r| query.matches(r)) {
            for (key, value) in &patch {
                row.insert(key.clone(), value.clone());
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }
}
