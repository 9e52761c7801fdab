//! Owned uploader lifecycle: `init`, `enqueue`, `scan_pending`, `shutdown`.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::config::{Registry, UploaderSettings};
use crate::spool::scan_directory;
use crate::store::DeliveryStore;
use crate::transport::{HttpTransport, Transport};
use crate::types::DeliveryConfig;
use crate::worker::DeliveryWorker;

/// Cheap, cloneable enqueue handle for producer threads.
#[derive(Debug, Clone)]
pub struct UploadHandle {
    store: Arc<DeliveryStore>,
}

impl UploadHandle {
    /// Queues `path` for delivery with a snapshot of `config`.
    ///
    /// Never blocks on I/O. Silently ignored if the path is empty, the output
    /// has no endpoint, or the path is already pending.
    pub fn enqueue(&self, path: impl Into<PathBuf>, config: &DeliveryConfig) -> bool {
        self.store.enqueue(path, config)
    }
}

/// The running upload subsystem.
///
/// Owns the scheduling store and the background worker. Dropping an
/// `Uploader` without calling [`shutdown`](Uploader::shutdown) detaches the
/// worker, which then runs until the runtime stops.
#[derive(Debug)]
pub struct Uploader {
    store: Arc<DeliveryStore>,
    shutdown: CancellationToken,
    worker: JoinHandle<()>,
}

impl Uploader {
    /// Builds the HTTP client and starts the delivery worker.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed (for example
    /// when the TLS backend fails to initialise).
    pub fn init(settings: &UploaderSettings) -> Result<Self, reqwest::Error> {
        let transport = HttpTransport::new(settings)?;
        Ok(Self::with_transport(transport))
    }

    /// Starts the delivery worker using a caller-provided transport.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_transport<T>(transport: T) -> Self
    where
        T: Transport + Send + Sync + 'static,
    {
        let store = Arc::new(DeliveryStore::new());
        let shutdown = CancellationToken::new();
        let worker = DeliveryWorker::new(Arc::clone(&store), transport);
        let worker = tokio::spawn(worker.run(shutdown.clone()));

        Uploader {
            store,
            shutdown,
            worker,
        }
    }

    /// Returns a handle producers can use to enqueue files.
    pub fn handle(&self) -> UploadHandle {
        UploadHandle {
            store: Arc::clone(&self.store),
        }
    }

    /// Returns the scheduling store.
    pub fn store(&self) -> &Arc<DeliveryStore> {
        &self.store
    }

    /// Queues `path` for delivery with a snapshot of `config`.
    pub fn enqueue(&self, path: impl Into<PathBuf>, config: &DeliveryConfig) -> bool {
        self.store.enqueue(path, config)
    }

    /// Re-enqueues undelivered files for every file output that asks for a
    /// startup scan.
    ///
    /// Returns the total number of files enqueued.
    #[instrument(skip_all)]
    pub fn scan_pending(&self, registry: &Registry) -> usize {
        let mut total = 0;
        for config in registry.startup_scan_targets() {
            let found = scan_directory(&self.store, config, &config.base_directory);
            info!(
                dir = %config.base_directory.display(),
                found,
                "Re-queued undelivered recordings"
            );
            total += found;
        }
        total
    }

    /// Stops the worker and waits for it to exit.
    ///
    /// An attempt in progress completes (including renaming, deleting or
    /// rescheduling) before this returns. Tasks still pending are dropped
    /// from memory; their files remain on disk for the next startup scan.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.worker.await {
            error!(error = %e, "Delivery worker terminated abnormally");
        }
    }
}
