use crate::record::RecordId;
use serde::{Deserialize, Serialize};

/// High-water mark of what one client has synced for one document.
///
/// One record per attached (document, client) pair; deleted when the client
/// detaches so it cannot hold back garbage collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncedSeqInfo {
    pub id: RecordId,
    pub doc_id: RecordId,
    pub client_id: RecordId,
    pub server_seq: u64,
}
