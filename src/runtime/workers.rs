use std::sync::mpsc::Sender;
use std::thread;

use tracing::debug;

use crate::error::Result;
use crate::playlist::fetch_manifest;
use crate::resource::Location;

/// Result of a manifest fetch, tagged with the request that produced it.
#[derive(Debug)]
pub struct ManifestReply {
    pub generation: u64,
    /// Directory (or URL) the entries are relative to.
    pub base: Location,
    pub result: Result<Vec<String>>,
}

/// Fetches the manifest off the event-loop thread. Only the reply to the
/// latest request is current; older ones are superseded.
pub struct ManifestWorker {
    tx: Sender<ManifestReply>,
    generation: u64,
}

impl ManifestWorker {
    pub fn new(tx: Sender<ManifestReply>) -> Self {
        Self { tx, generation: 0 }
    }

    pub fn request(&mut self, manifest: Location, base: Location) {
        self.generation += 1;
        let generation = self.generation;
        let tx = self.tx.clone();
        debug!(%manifest, generation, "fetching manifest");
        thread::spawn(move || {
            let result = fetch_manifest(&manifest);
            let _ = tx.send(ManifestReply {
                generation,
                base,
                result,
            });
        });
    }

    pub fn is_current(&self, reply: &ManifestReply) -> bool {
        reply.generation == self.generation
    }
}
