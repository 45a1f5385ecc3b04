use crate::record::RecordId;
use serde::{Deserialize, Serialize};

/// A registered document: its unique key, owning client and the monotonic
/// server sequence counter that is the source of truth for change ordering.
///
/// The counter advances only through the change log's atomic append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocInfo {
    pub id: RecordId,
    pub key: String,
    pub owner: RecordId,
    pub server_seq: u64,
    pub created_at_micros: u64,
    pub updated_at_micros: u64,
    pub accessed_at_micros: u64,
}
