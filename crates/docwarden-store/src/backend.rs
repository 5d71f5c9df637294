//! Document backends.

use crate::error::StoreResult;
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use docwarden_rules::{Document, DocumentPath};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// What a guarded write does to the document slot.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Store this document, replacing any previous version.
    Put(Document),
    /// Remove the document.
    Delete,
    /// Leave the slot untouched.
    Skip,
}

/// Decision callback run against the current document while its slot is
/// locked. Returning an error aborts the write.
///
/// The guard must not call back into the backend.
pub type Guard<'a> = Box<dyn FnOnce(Option<&Document>) -> StoreResult<WriteOp> + Send + 'a>;

/// Document storage backend.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Read a document.
    async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>>;

    /// Run `guard` against the stored document and apply the write it
    /// returns. No other write to `path` can interleave between the two.
    async fn commit(&self, path: &DocumentPath, guard: Guard<'_>) -> StoreResult<()>;

    /// Remove every document, returning how many were removed.
    async fn clear(&self) -> StoreResult<usize>;

    /// Number of stored documents.
    async fn len(&self) -> usize;

    /// Backend statistics.
    async fn stats(&self) -> BackendStats;
}

/// Backend statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackendStats {
    pub documents: u64,
    pub reads: u64,
    pub writes: u64,
    pub rejected: u64,
}

/// In-memory backend on a sharded concurrent map.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: DashMap<DocumentPath, Document>,
    stats: StatsInner,
}

#[derive(Debug, Default)]
struct StatsInner {
    reads: AtomicU64,
    writes: AtomicU64,
    rejected: AtomicU64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply(&self, path: &DocumentPath, op: WriteOp, slot: Entry<'_, DocumentPath, Document>) {
        match (op, slot) {
            (WriteOp::Put(document), Entry::Occupied(mut slot)) => {
                slot.insert(document);
            }
            (WriteOp::Put(document), Entry::Vacant(slot)) => {
                slot.insert(document);
            }
            (WriteOp::Delete, Entry::Occupied(slot)) => {
                slot.remove();
            }
            (WriteOp::Delete, Entry::Vacant(_)) | (WriteOp::Skip, _) => {
                debug!(path = %path, "No change");
                return;
            }
        }
        self.stats.writes.fetch_add(1, Ordering::Relaxed);
        debug!(path = %path, "Document written");
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        self.stats.reads.fetch_add(1, Ordering::Relaxed);
        let document = self.documents.get(path).map(|entry| entry.value().clone());
        debug!(path = %path, found = document.is_some(), "Document read");
        Ok(document)
    }

    async fn commit(&self, path: &DocumentPath, guard: Guard<'_>) -> StoreResult<()> {
        let slot = self.documents.entry(path.clone());
        let current = match &slot {
            Entry::Occupied(occupied) => Some(occupied.get()),
            Entry::Vacant(_) => None,
        };

        match guard(current) {
            Ok(op) => {
                self.apply(path, op, slot);
                Ok(())
            }
            Err(e) => {
                self.stats.rejected.fetch_add(1, Ordering::Relaxed);
                debug!(path = %path, error = %e, "Write rejected");
                Err(e)
            }
        }
    }

    async fn clear(&self) -> StoreResult<usize> {
        let removed = self.documents.len();
        self.documents.clear();
        debug!(removed, "Backend cleared");
        Ok(removed)
    }

    async fn len(&self) -> usize {
        self.documents.len()
    }

    async fn stats(&self) -> BackendStats {
        BackendStats {
            documents: self.documents.len() as u64,
            reads: self.stats.reads.load(Ordering::Relaxed),
            writes: self.stats.writes.load(Ordering::Relaxed),
            rejected: self.stats.rejected.load(Ordering::Relaxed),
        }
    }
}
