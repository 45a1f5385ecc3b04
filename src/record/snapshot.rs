use crate::record::RecordId;
use serde::{Deserialize, Serialize};

/// A point-in-time full-state capture of a document, addressed by the server
/// sequence current when it was taken.
///
/// The default value is the "no snapshot" sentinel: sequence 0, empty state.
/// Callers seeing it replay the change log from the beginning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub id: RecordId,
    pub doc_id: RecordId,
    pub server_seq: u64,
    pub snapshot: Vec<u8>,
    pub created_at_micros: u64,
}
