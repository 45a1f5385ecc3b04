pub mod change;
pub mod client;
pub mod document;
pub mod snapshot;
pub mod synced_seq;

pub use change::{Change, ChangeId, ChangeInfo};
pub use client::{AttachStatus, ClientDocInfo, ClientInfo, ClientStatus};
pub use document::DocInfo;
pub use snapshot::SnapshotInfo;
pub use synced_seq::SyncedSeqInfo;

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Unique identifier of a persisted record.
///
/// Time-ordered and lexicographically sortable (UUIDv7 in simple hex form), so
/// freshly generated identifiers sort after earlier ones. The empty identifier
/// is the zero value used by sentinel records.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn generate() -> RecordId {
        RecordId(Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId(value)
    }
}

pub(crate) fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64
}
