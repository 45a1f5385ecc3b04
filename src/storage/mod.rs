pub mod memory;

use crate::clock::Ticket;
use crate::error::SyncdbError;
use crate::record::{Change, ChangeInfo, ClientInfo, DocInfo, RecordId, SnapshotInfo};
use async_trait::async_trait;

/// The storage contract behind the document server.
///
/// Every method is one logical operation: it opens one transaction, performs
/// its reads and writes, and commits or aborts as a unit; partial writes are
/// never observable. Records crossing this boundary are independent copies;
/// callers may mutate them freely and must call back in to persist.
///
/// Methods are async so a durable backend can suspend; the in-memory engine
/// completes synchronously, and dropping the returned future cancels the
/// operation before it runs.
#[async_trait]
pub trait Database: Send + Sync {
    /// Activates the client registered under `key`, registering it first if
    /// needed. Repeated activation of one key reuses its identifier.
    async fn activate_client(&self, key: &str) -> Result<ClientInfo, SyncdbError>;

    /// Flips the client to deactivated. The record itself survives.
    async fn deactivate_client(&self, client_id: &RecordId) -> Result<ClientInfo, SyncdbError>;

    async fn find_client_info_by_id(&self, client_id: &RecordId)
        -> Result<ClientInfo, SyncdbError>;

    /// Reconciles the persisted client record with the caller's view of a
    /// document after a push-pull exchange. Persisted sequences never regress.
    async fn update_client_info_after_push_pull(
        &self,
        client_info: &ClientInfo,
        doc_info: &DocInfo,
    ) -> Result<(), SyncdbError>;

    /// Looks a document up by key, creating it (owned by `client_info`, at
    /// sequence 0) when missing and `create_if_missing` is set. Creation is
    /// the only side effect of this otherwise-read operation.
    async fn find_doc_info_by_key(
        &self,
        client_info: &ClientInfo,
        key: &str,
        create_if_missing: bool,
    ) -> Result<DocInfo, SyncdbError>;

    /// Appends the changes to the document's log and advances its server
    /// sequence, but only if the stored sequence still equals
    /// `initial_server_seq`; otherwise fails with a conflict and commits
    /// nothing.
    async fn create_change_infos(
        &self,
        doc_info: &DocInfo,
        initial_server_seq: u64,
        changes: &[Change],
    ) -> Result<(), SyncdbError>;

    /// Stored change records with sequences in `from..=to`, ascending. An
    /// empty range is an empty result, never an error.
    async fn find_change_infos_between_server_seqs(
        &self,
        doc_id: &RecordId,
        from: u64,
        to: u64,
    ) -> Result<Vec<ChangeInfo>, SyncdbError>;

    /// Same range, decoded into exchange form.
    async fn find_changes_between_server_seqs(
        &self,
        doc_id: &RecordId,
        from: u64,
        to: u64,
    ) -> Result<Vec<Change>, SyncdbError>;

    /// Stores a full-state capture tagged with the caller's checkpoint
    /// sequence. Touches neither the change log nor the document record.
    async fn create_snapshot_info(
        &self,
        doc_id: &RecordId,
        server_seq: u64,
        snapshot: Vec<u8>,
    ) -> Result<(), SyncdbError>;

    /// The highest-sequence snapshot, or the zero-value sentinel when the
    /// document has none.
    async fn find_last_snapshot_info(
        &self,
        doc_id: &RecordId,
    ) -> Result<SnapshotInfo, SyncdbError>;

    /// Records what `client_info` has synced, then computes the
    /// garbage-collection watermark: the ticket of the lowest sequence any
    /// attached client is still behind on, or the initial sentinel when
    /// nothing may be discarded yet.
    async fn update_and_find_min_synced_ticket(
        &self,
        client_info: &ClientInfo,
        doc_id: &RecordId,
        server_seq: u64,
    ) -> Result<Ticket, SyncdbError>;
}
