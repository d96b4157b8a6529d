//! Insight Cache
//!
//! Remembers the last insight bundle so re-rendering the same dataset does
//! not call the paid agent again. Holds at most one entry: only one dataset
//! exists at a time.

use crate::model::{DatasetFile, InsightBundle};

/// Identity of a dataset: its file plus the fetch that produced it
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DatasetKey {
    file_name: String,
    generation: u64,
}

impl DatasetKey {
    pub fn new(dataset: &DatasetFile, generation: u64) -> Self {
        Self {
            file_name: dataset.file_name(),
            generation,
        }
    }
}

#[derive(Debug, Default)]
pub struct InsightCache {
    entry: Option<(DatasetKey, InsightBundle)>,
    hits: u64,
    misses: u64,
}

impl InsightCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, key: &DatasetKey) -> Option<&InsightBundle> {
        match &self.entry {
            Some((cached, bundle)) if cached == key => {
                self.hits += 1;
                Some(bundle)
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn put(&mut self, key: DatasetKey, bundle: InsightBundle) {
        self.entry = Some((key, bundle));
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            tracing::debug!("insight cache invalidated");
        }
    }

    pub const fn hits(&self) -> u64 {
        self.hits
    }

    pub const fn misses(&self) -> u64 {
        self.misses
    }
}
