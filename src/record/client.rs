use crate::error::SyncdbError;
use crate::record::RecordId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientStatus {
    Activated,
    Deactivated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachStatus {
    Attached,
    Detached,
}

/// A client's per-document bookkeeping: attachment status plus the highest
/// server sequence it has seen and its own change counter for that document.
///
/// Absence of an entry in [`ClientInfo::documents`] means the client never
/// attached the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDocInfo {
    pub status: AttachStatus,
    pub server_seq: u64,
    pub client_seq: u32,
}

impl ClientDocInfo {
    pub fn attached() -> ClientDocInfo {
        ClientDocInfo {
            status: AttachStatus::Attached,
            server_seq: 0,
            client_seq: 0,
        }
    }

    /// Entry carrying only a status, sequences reset. Installed when a client
    /// reports a detach exchange.
    pub fn with_status(status: AttachStatus) -> ClientDocInfo {
        ClientDocInfo {
            status,
            server_seq: 0,
            client_seq: 0,
        }
    }
}

/// A registered client and its view of every document it ever attached.
///
/// The identifier is stable across re-activation of the same key; records are
/// flipped between statuses, never physically deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub id: RecordId,
    pub key: String,
    pub status: ClientStatus,
    pub created_at_micros: u64,
    pub updated_at_micros: u64,
    pub documents: HashMap<RecordId, ClientDocInfo>,
}

impl ClientInfo {
    /// Whether this copy of the client currently has the document attached.
    /// A client that never attached the document is a malformed exchange, not
    /// a detached one.
    pub fn is_attached(&self, doc_id: &RecordId) -> Result<bool, SyncdbError> {
        let info = self
            .documents
            .get(doc_id)
            .ok_or_else(|| SyncdbError::NeverAttached {
                client_id: self.id.to_string(),
                doc_id: doc_id.to_string(),
            })?;
        Ok(info.status == AttachStatus::Attached)
    }

    pub fn attach_document(&mut self, doc_id: RecordId) {
        self.documents.insert(doc_id, ClientDocInfo::attached());
    }

    pub fn detach_document(&mut self, doc_id: &RecordId) -> Result<(), SyncdbError> {
        let info = self
            .documents
            .get_mut(doc_id)
            .ok_or_else(|| SyncdbError::NeverAttached {
                client_id: self.id.to_string(),
                doc_id: doc_id.to_string(),
            })?;
        info.status = AttachStatus::Detached;
        Ok(())
    }

    /// Raises this copy's checkpoint for the document. Sequences never
    /// regress.
    pub fn update_checkpoint(
        &mut self,
        doc_id: &RecordId,
        server_seq: u64,
        client_seq: u32,
    ) -> Result<(), SyncdbError> {
        let info = self
            .documents
            .get_mut(doc_id)
            .ok_or_else(|| SyncdbError::NeverAttached {
                client_id: self.id.to_string(),
                doc_id: doc_id.to_string(),
            })?;
        info.server_seq = info.server_seq.max(server_seq);
        info.client_seq = info.client_seq.max(client_seq);
        Ok(())
    }
}
