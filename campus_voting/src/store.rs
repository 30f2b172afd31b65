use std::collections::{BTreeMap, HashMap};

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::records::*;

/// Key-value persistence as the engine sees it: string keys mapping to
/// JSON documents. No transactions and no cross-writer coordination;
/// the last writer wins.
pub trait StorageBackend {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// Backend keeping the whole namespace in memory.
///
/// Test suites run against it directly. The command-line front end
/// loads the state file into one and writes it back once the operation
/// has completed.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> MemoryBackend {
        MemoryBackend {
            entries: HashMap::new(),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Typed access to the four collections and the scalar password key.
///
/// There are no partial updates: every mutation loads the full
/// collection, modifies it in memory and writes the full replacement
/// snapshot back.
#[derive(Debug, Clone)]
pub struct RecordStore<S: StorageBackend> {
    backend: S,
}

impl<S: StorageBackend> RecordStore<S> {
    pub fn new(backend: S) -> RecordStore<S> {
        RecordStore { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn candidates(&self) -> Vec<Candidate> {
        self.load_list(CANDIDATES_KEY)
    }

    pub fn save_candidates(&mut self, candidates: &[Candidate]) {
        self.save_value(CANDIDATES_KEY, &candidates);
    }

    pub fn students(&self) -> Vec<Student> {
        self.load_list(STUDENTS_KEY)
    }

    pub fn save_students(&mut self, students: &[Student]) {
        self.save_value(STUDENTS_KEY, &students);
    }

    pub fn votes(&self) -> Vec<VoteRecord> {
        self.load_list(VOTES_KEY)
    }

    pub fn save_votes(&mut self, votes: &[VoteRecord]) {
        self.save_value(VOTES_KEY, &votes);
    }

    pub fn needs(&self) -> BTreeMap<String, Need> {
        match self.backend.read(NEEDS_KEY) {
            None => BTreeMap::new(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("discarding malformed collection {}: {}", NEEDS_KEY, e);
                BTreeMap::new()
            }),
        }
    }

    pub fn save_needs(&mut self, needs: &BTreeMap<String, Need>) {
        self.save_value(NEEDS_KEY, needs);
    }

    pub fn admin_password(&self) -> Option<String> {
        let raw = self.backend.read(ADMIN_PASS_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn set_admin_password(&mut self, password: &str) {
        self.save_value(ADMIN_PASS_KEY, &password);
    }

    /// Removes the four collections in one call. The password key is
    /// not part of the election data and survives.
    pub fn clear_collections(&mut self) {
        for key in [CANDIDATES_KEY, STUDENTS_KEY, VOTES_KEY, NEEDS_KEY] {
            self.backend.remove(key);
        }
    }

    fn load_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.backend.read(key) {
            None => Vec::new(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("discarding malformed collection {}: {}", key, e);
                Vec::new()
            }),
        }
    }

    fn save_value<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        // Serializing string-keyed maps and plain records cannot fail.
        let raw = serde_json::to_string(value).unwrap();
        self.backend.write(key, raw);
    }
}
