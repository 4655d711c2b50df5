//! Scripted in-memory store for pipeline and retry tests.

#![allow(dead_code)]

use setmeta::store::{
    Enumerator, MetadataReader, MetadataWriter, ObjectIter, StoreError, WriteOptions,
};
use setmeta::{Metadata, ObjectId, canonicalize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Objects with fixed metadata; writes fail a scripted number of times per object.
#[derive(Default)]
pub struct FakeStore {
    keys: Vec<ObjectId>,
    existing: HashMap<ObjectId, Metadata>,
    /// object → failing attempts before a write succeeds (`usize::MAX` = never succeeds).
    failures: HashMap<ObjectId, usize>,
    /// Listing fails after yielding this many keys.
    list_error_after: Option<usize>,
    attempts: Mutex<Vec<ObjectId>>,
    applied: Mutex<HashMap<ObjectId, WriteOptions>>,
}

impl FakeStore {
    pub fn with_objects<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let keys: Vec<ObjectId> = keys.into_iter().map(Into::into).collect();
        let existing = keys
            .iter()
            .map(|k| (k.clone(), Metadata::new()))
            .collect();
        Self {
            keys,
            existing,
            ..Default::default()
        }
    }

    pub fn existing(mut self, object: &str, pairs: &[(&str, &str)]) -> Self {
        self.existing
            .insert(object.to_string(), canonicalize(pairs.iter().copied()));
        self
    }

    /// Listed but gone by the time its metadata is fetched.
    pub fn vanished(mut self, object: &str) -> Self {
        self.existing.remove(object);
        self
    }

    pub fn failing(mut self, object: &str, times: usize) -> Self {
        self.failures.insert(object.to_string(), times);
        self
    }

    pub fn list_error_after(mut self, n: usize) -> Self {
        self.list_error_after = Some(n);
        self
    }

    /// Every write attempt, in order.
    pub fn attempts(&self) -> Vec<ObjectId> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempts_for(&self, object: &str) -> usize {
        self.attempts().iter().filter(|o| *o == object).count()
    }

    pub fn applied(&self, object: &str) -> Option<WriteOptions> {
        self.applied.lock().unwrap().get(object).cloned()
    }

    pub fn applied_count(&self) -> usize {
        self.applied.lock().unwrap().len()
    }
}

impl Enumerator for FakeStore {
    fn enumerate<'a>(&'a self, prefix: &str) -> Result<ObjectIter<'a>, StoreError> {
        let prefix = prefix.to_string();
        let limit = self.list_error_after;
        let mut yielded = 0;
        let mut keys = self.keys.iter().filter(move |k| k.starts_with(&prefix));
        Ok(Box::new(std::iter::from_fn(move || {
            if limit == Some(yielded) {
                yielded += 1;
                return Some(Err(StoreError::Transient("listing interrupted".to_string())));
            }
            if limit.is_some_and(|l| yielded > l) {
                return None;
            }
            yielded += 1;
            keys.next().cloned().map(Ok)
        })))
    }
}

impl MetadataReader for FakeStore {
    fn fetch_existing(&self, object: &str) -> Result<Metadata, StoreError> {
        self.existing
            .get(object)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(object.to_string()))
    }
}

impl MetadataWriter for FakeStore {
    fn apply_metadata(&self, object: &str, options: &WriteOptions) -> Result<(), StoreError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(object.to_string());
            attempts.iter().filter(|o| *o == object).count()
        };
        let fail_times = self.failures.get(object).copied().unwrap_or(0);
        if attempt <= fail_times {
            return Err(StoreError::Transient(format!(
                "write {} attempt {} refused",
                object, attempt
            )));
        }
        self.applied
            .lock()
            .unwrap()
            .insert(object.to_string(), options.clone());
        Ok(())
    }
}
