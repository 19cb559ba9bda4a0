//! Durable key-value storage.
//!
//! RULE: Only the save layer talks to a `KvStore`.
//! Writes are staged until `commit`; a crash before commit leaves the
//! previously committed values in place.

use crate::error::StorageError;
use std::collections::BTreeMap;

mod sqlite;

pub use sqlite::SqliteStore;

/// Namespaced byte store with explicit commit.
pub trait KvStore {
    /// `Ok(None)` when the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError>;
    /// Erasing a missing key is not an error.
    fn erase(&mut self, key: &str) -> Result<(), StorageError>;
    fn erase_all(&mut self) -> Result<(), StorageError>;
    fn commit(&mut self) -> Result<(), StorageError>;
}

/// Uncommitted writes layered over the committed contents.
/// `None` marks a staged erase.
#[derive(Debug, Default, Clone)]
pub(crate) struct WriteSet {
    entries: BTreeMap<String, Option<Vec<u8>>>,
    cleared: bool,
}

pub(crate) enum Staged<'a> {
    Value(&'a [u8]),
    Erased,
    Untouched,
}

impl WriteSet {
    pub(crate) fn lookup(&self, key: &str) -> Staged<'_> {
        match self.entries.get(key) {
            Some(Some(value)) => Staged::Value(value),
            Some(None) => Staged::Erased,
            None if self.cleared => Staged::Erased,
            None => Staged::Untouched,
        }
    }

    pub(crate) fn set(&mut self, key: &str, value: &[u8]) {
        self.entries.insert(key.to_string(), Some(value.to_vec()));
    }

    pub(crate) fn erase(&mut self, key: &str) {
        self.entries.insert(key.to_string(), None);
    }

    pub(crate) fn clear_all(&mut self) {
        self.entries.clear();
        self.cleared = true;
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty() && !self.cleared
    }

    pub(crate) fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&String, &Option<Vec<u8>>)> {
        self.entries.iter()
    }

    /// Hands the staged state to the caller and resets.
    pub(crate) fn take(&mut self) -> (bool, BTreeMap<String, Option<Vec<u8>>>) {
        let cleared = std::mem::take(&mut self.cleared);
        (cleared, std::mem::take(&mut self.entries))
    }
}

/// Which `MemoryStore` operation should fail. Test hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Get,
    Set,
    Commit,
}

/// Process-local store. Used by tests and by hosts that do not persist.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    committed: BTreeMap<String, Vec<u8>>,
    staged:    WriteSet,
    fail_on:   Option<FailOn>,
    commits:   u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `op` fail until cleared with `None`.
    pub fn fail_on(&mut self, op: Option<FailOn>) {
        self.fail_on = op;
    }

    /// Drop everything not yet committed, as a power cut would.
    pub fn power_loss(&mut self) {
        self.staged = WriteSet::default();
    }

    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    /// Overwrite a committed value in place, bypassing staging.
    pub fn poke(&mut self, key: &str, value: Vec<u8>) {
        self.committed.insert(key.to_string(), value);
    }

    fn check(&self, op: FailOn, key: &str) -> Result<(), StorageError> {
        if self.fail_on == Some(op) {
            return Err(StorageError::Backend {
                op:     match op {
                    FailOn::Get    => "get",
                    FailOn::Set    => "set",
                    FailOn::Commit => "commit",
                },
                key:    key.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.check(FailOn::Get, key)?;
        Ok(match self.staged.lookup(key) {
            Staged::Value(v) => Some(v.to_vec()),
            Staged::Erased => None,
            Staged::Untouched => self.committed.get(key).cloned(),
        })
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.check(FailOn::Set, key)?;
        self.staged.set(key, value);
        Ok(())
    }

    fn erase(&mut self, key: &str) -> Result<(), StorageError> {
        self.staged.erase(key);
        Ok(())
    }

    fn erase_all(&mut self) -> Result<(), StorageError> {
        self.staged.clear_all();
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        self.check(FailOn::Commit, "*")?;
        let (cleared, entries) = self.staged.take();
        if cleared {
            self.committed.clear();
        }
        for (key, value) in entries {
            match value {
                Some(v) => { self.committed.insert(key, v); }
                None    => { self.committed.remove(&key); }
            }
        }
        self.commits += 1;
        Ok(())
    }
}
