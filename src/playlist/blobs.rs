use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::library::{BlobId, FileContent};

#[derive(Debug, Default)]
struct BlobTable {
    next: u64,
    live: HashMap<BlobId, FileContent>,
}

/// Issues and resolves transient locators for local files.
///
/// Shared between the playlist store (which issues and revokes) and the audio
/// thread (which resolves). A revoked id no longer resolves, but a source the
/// audio thread already opened keeps its own copy of the bytes.
#[derive(Debug, Clone, Default)]
pub struct BlobRegistry {
    inner: Arc<Mutex<BlobTable>>,
}

impl BlobRegistry {
    fn table(&self) -> MutexGuard<'_, BlobTable> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn issue(&self, content: FileContent) -> BlobId {
        let mut table = self.table();
        table.next += 1;
        let id = BlobId(table.next);
        table.live.insert(id, content);
        trace!(%id, "issued transient locator");
        id
    }

    /// Release `id`. Returns false when it was already released.
    pub fn revoke(&self, id: BlobId) -> bool {
        let removed = self.table().live.remove(&id).is_some();
        if removed {
            trace!(%id, "revoked transient locator");
        }
        removed
    }

    pub fn resolve(&self, id: BlobId) -> Option<FileContent> {
        self.table().live.get(&id).cloned()
    }

    /// Number of locators currently issued and not yet revoked.
    pub fn live_count(&self) -> usize {
        self.table().live.len()
    }
}
