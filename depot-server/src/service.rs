//! Transfer service: orchestrates the store, audit log, and event bus
//!
//! Every operation follows the same short sequence: validate, apply the
//! disk effect, create the operation record, append it to the audit log,
//! publish it to observers, respond. A failed validation or effect
//! short-circuits with no record and no broadcast. Downloads record last
//! of all, once the transport reports the byte stream complete.

use tokio::io::AsyncRead;

use depot_common::protocol::FileEntry;
use depot_common::record::{OperationKind, OperationRecord};

use crate::address::extract_ipv4;
use crate::audit::AuditLog;
use crate::events::{EventBus, SubscriberId};
use crate::store::{FileStore, StoreError};

/// Process-scoped service instance, constructed once at startup and shared
/// by reference with every request handler
#[derive(Debug)]
pub struct TransferService {
    store: FileStore,
    audit: AuditLog,
    events: EventBus,
}

impl TransferService {
    /// Assemble the service from its injected collaborators
    #[must_use]
    pub fn new(store: FileStore, audit: AuditLog, events: EventBus) -> Self {
        Self {
            store,
            audit,
            events,
        }
    }

    /// The event bus observers subscribe through
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Store an uploaded byte stream and return the final stored name
    ///
    /// The raw name goes through validation and conflict resolution; the
    /// returned name is the one the file is reachable under. Records and
    /// broadcasts exactly one Uploaded operation on success.
    ///
    /// # Errors
    ///
    /// `InvalidName` or `Io`; neither leaves a record.
    pub async fn upload<R>(
        &self,
        reader: R,
        raw_name: &str,
        peer: &str,
    ) -> Result<String, StoreError>
    where
        R: AsyncRead + Unpin,
    {
        let stored = self.store.save(reader, raw_name).await?;
        self.record(OperationKind::Uploaded, peer, Some(&stored.name))
            .await;
        Ok(stored.name)
    }

    /// List stored files as name + retrieval-locator pairs
    ///
    /// Read-only: produces no record and no broadcast.
    ///
    /// # Errors
    ///
    /// `Io` if the upload directory cannot be read.
    pub async fn list(&self) -> Result<Vec<FileEntry>, StoreError> {
        let files = self.store.list().await?;
        Ok(files
            .iter()
            .map(|file| FileEntry::for_name(&file.name))
            .collect())
    }

    /// Open a stored file for download
    ///
    /// Returns the opened file and its length for the caller to stream.
    /// Nothing is recorded here; the caller reports completion through
    /// [`downloaded`](Self::downloaded) once every byte has been sent, so
    /// an aborted stream (or a file that vanished between resolution and
    /// open) leaves no record and no broadcast.
    ///
    /// # Errors
    ///
    /// `InvalidName`, `NotFound`, or `Io`.
    pub async fn open_download(&self, name: &str) -> Result<(tokio::fs::File, u64), StoreError> {
        let path = self.store.resolve_path(name)?;
        // The file can vanish between resolution and open
        let file = tokio::fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound
            } else {
                StoreError::Io(e.to_string())
            }
        })?;
        let length = file.metadata().await.map_err(StoreError::from)?.len();
        Ok((file, length))
    }

    /// Record a completed download
    ///
    /// Called by the transport once the full byte stream has been written
    /// to the client. Records and broadcasts exactly one Downloaded
    /// operation.
    pub async fn downloaded(&self, name: &str, peer: &str) {
        self.record(OperationKind::Downloaded, peer, Some(name))
            .await;
    }

    /// Delete one stored file
    ///
    /// On success records and broadcasts a Deleted operation. On
    /// `NotFound` nothing is recorded.
    ///
    /// # Errors
    ///
    /// `InvalidName`, `NotFound`, or `Io`.
    pub async fn delete(&self, name: &str, peer: &str) -> Result<(), StoreError> {
        self.store.delete(name).await?;
        self.record(OperationKind::Deleted, peer, Some(name)).await;
        Ok(())
    }

    /// Delete every stored file, returning the count removed
    ///
    /// A count of zero is the "nothing to delete" result: no record, no
    /// broadcast. Any positive count records exactly one DeletedAll
    /// operation.
    ///
    /// # Errors
    ///
    /// `Io`.
    pub async fn delete_all(&self, peer: &str) -> Result<usize, StoreError> {
        let removed = self.store.delete_all().await?;
        if removed > 0 {
            self.record(OperationKind::DeletedAll, peer, None).await;
        }
        Ok(removed)
    }

    /// Register an observer on the event stream
    ///
    /// The Connected record is audited and broadcast to all *other*
    /// observers; the new subscriber never sees its own arrival.
    pub async fn observer_connected(
        &self,
        peer: &str,
    ) -> (
        SubscriberId,
        tokio::sync::mpsc::UnboundedReceiver<OperationRecord>,
    ) {
        let (id, rx) = self.events.subscribe().await;

        let record = OperationRecord::new(OperationKind::Connected, &extract_ipv4(peer), None);
        self.audit.append(&record);
        self.events.publish_except(id, &record).await;

        (id, rx)
    }

    /// Remove an observer from the event stream
    ///
    /// The Disconnected record is audited and broadcast to the remaining
    /// observers.
    pub async fn observer_disconnected(&self, id: SubscriberId, peer: &str) {
        self.events.unsubscribe(id).await;

        let record = OperationRecord::new(OperationKind::Disconnected, &extract_ipv4(peer), None);
        self.audit.append(&record);
        self.events.publish(&record).await;
    }

    /// Append then publish one record for a completed operation
    async fn record(&self, kind: OperationKind, peer: &str, file_name: Option<&str>) {
        let record = OperationRecord::new(kind, &extract_ipv4(peer), file_name);
        self.audit.append(&record);
        self.events.publish(&record).await;
    }
}
