use crate::clock::ActorId;
use crate::record::RecordId;
use serde::{Deserialize, Serialize};

/// Identity a change carries from its actor: the actor's own change counter
/// and the lamport value current when the change was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeId {
    pub client_seq: u32,
    pub lamport: u64,
    pub actor: ActorId,
}

impl ChangeId {
    pub fn new(client_seq: u32, lamport: u64, actor: ActorId) -> ChangeId {
        ChangeId {
            client_seq,
            lamport,
            actor,
        }
    }
}

/// A change as exchanged with the document collaborator.
///
/// Operations are opaque blobs encoded by the producer; this layer stores and
/// returns them unmodified. `server_seq` is zero until the change log assigns
/// a sequence on append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub id: ChangeId,
    pub server_seq: u64,
    pub message: Option<String>,
    pub operations: Vec<Vec<u8>>,
}

impl Change {
    pub fn new(id: ChangeId, message: Option<String>, operations: Vec<Vec<u8>>) -> Change {
        Change {
            id,
            server_seq: 0,
            message,
            operations,
        }
    }
}

/// A committed change record. Immutable once stored; the (document, server
/// sequence) pair is unique and totally ordered within the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInfo {
    pub id: RecordId,
    pub doc_id: RecordId,
    pub server_seq: u64,
    pub actor: ActorId,
    pub client_seq: u32,
    pub lamport: u64,
    pub message: Option<String>,
    pub operations: Vec<Vec<u8>>,
}

impl ChangeInfo {
    /// Decodes the stored record back into the exchange form.
    pub fn to_change(&self) -> Change {
        Change {
            id: ChangeId::new(self.client_seq, self.lamport, self.actor),
            server_seq: self.server_seq,
            message: self.message.clone(),
            operations: self.operations.clone(),
        }
    }
}
