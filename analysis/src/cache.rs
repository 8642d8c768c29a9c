use std::collections::{HashMap, VecDeque};

use crate::record::AnalysisRecord;

/// Default number of positions whose analysis is kept.
pub const DEFAULT_CAPACITY: usize = 64;

/// In-memory analysis records keyed by FEN, bounded by recency.
///
/// A position becomes most-recent when its record is created or when a
/// search for it begins. Once over capacity, the least recent records are
/// evicted, except the one passed as `protect`.
#[derive(Debug, Clone)]
pub struct AnalysisCache {
    records: HashMap<String, AnalysisRecord>,
    recency: VecDeque<String>,
    capacity: usize,
}

impl AnalysisCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: HashMap::new(),
            recency: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, fen: &str) -> Option<&AnalysisRecord> {
        self.records.get(fen)
    }

    /// Record for `fen`, created empty if absent. Marks it most recent.
    pub fn get_or_insert(&mut self, fen: &str) -> &mut AnalysisRecord {
        if !self.records.contains_key(fen) {
            self.records
                .insert(fen.to_string(), AnalysisRecord::new(fen));
            self.recency.push_back(fen.to_string());
            self.evict(Some(fen));
        }
        self.records
            .entry(fen.to_string())
            .or_insert_with(|| AnalysisRecord::new(fen))
    }

    /// Mark `fen` most recently active, if it has a record.
    pub fn touch(&mut self, fen: &str) {
        if let Some(idx) = self.recency.iter().position(|f| f == fen) {
            if let Some(key) = self.recency.remove(idx) {
                self.recency.push_back(key);
            }
        }
    }

    /// Evict least-recent records until within capacity.
    pub fn evict(&mut self, protect: Option<&str>) {
        while self.records.len() > self.capacity {
            let Some(idx) = self
                .recency
                .iter()
                .position(|f| Some(f.as_str()) != protect)
            else {
                break;
            };
            if let Some(key) = self.recency.remove(idx) {
                tracing::trace!(fen = %key, "Evicting analysis record");
                self.records.remove(&key);
            }
        }
    }

    /// Number of entries in the cache.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
