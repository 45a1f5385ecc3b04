mod state;

use crate::clock::{Ticket, MAX_DELIMITER};
use crate::config::SyncdbConfig;
use crate::error::{ResourceType, SyncdbError};
use crate::record::{
    now_micros, AttachStatus, Change, ChangeInfo, ClientDocInfo, ClientInfo, ClientStatus,
    DocInfo, RecordId, SnapshotInfo, SyncedSeqInfo,
};
use crate::storage::Database;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use state::{State, WriteTxn};
use std::collections::HashMap;
use tracing::{debug, warn};

/// In-memory implementation of the storage contract.
///
/// Writers serialize behind a mutex and commit by publishing a new state
/// version; readers clone the published state in O(1) and work against that
/// immutable snapshot, so they never block behind a writer's mutation work and
/// never observe a partial commit.
pub struct MemoryDatabase {
    config: SyncdbConfig,
    writer: Mutex<()>,
    published: RwLock<State>,
}

impl MemoryDatabase {
    pub fn new(config: SyncdbConfig) -> Result<MemoryDatabase, SyncdbError> {
        config.validate()?;
        Ok(MemoryDatabase {
            config,
            writer: Mutex::new(()),
            published: RwLock::new(State::default()),
        })
    }

    fn begin_read(&self) -> State {
        self.published.read().clone()
    }

    fn begin_write(&self) -> WriteTxn<'_> {
        WriteTxn::begin(self.writer.lock(), &self.published)
    }

    /// Records (or clears) the client's synced sequence for the document,
    /// depending on whether the caller still has it attached.
    fn update_synced_seq(
        &self,
        client_info: &ClientInfo,
        doc_id: &RecordId,
        server_seq: u64,
    ) -> Result<(), SyncdbError> {
        let attached = client_info.is_attached(doc_id)?;

        let mut txn = self.begin_write();
        if attached {
            let id = txn
                .state
                .synced_seq_id(doc_id, &client_info.id)
                .cloned()
                .unwrap_or_else(RecordId::generate);
            txn.state.upsert_synced_seq(SyncedSeqInfo {
                id,
                doc_id: doc_id.clone(),
                client_id: client_info.id.clone(),
                server_seq,
            });
        } else {
            txn.state.remove_synced_seq(doc_id, &client_info.id);
        }
        txn.commit();
        Ok(())
    }

    /// Resolves an exact (document, sequence) to the ticket of the change
    /// that produced it, with the max delimiter standing for everything that
    /// change created.
    fn find_ticket_by_server_seq(
        snapshot: &State,
        doc_id: &RecordId,
        server_seq: u64,
    ) -> Result<Ticket, SyncdbError> {
        let info = snapshot
            .change_by_doc_seq(doc_id, server_seq)
            .ok_or_else(|| {
                SyncdbError::not_found(
                    ResourceType::Change,
                    format!("{doc_id}:{server_seq}"),
                )
            })?;
        Ok(Ticket::new(info.lamport, MAX_DELIMITER, info.actor))
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn activate_client(&self, key: &str) -> Result<ClientInfo, SyncdbError> {
        let mut txn = self.begin_write();
        let now = now_micros();

        let client_info = match txn.state.client_by_key(key) {
            Some(existing) => {
                let mut info = existing.clone();
                info.status = ClientStatus::Activated;
                info.updated_at_micros = now;
                info
            }
            None => ClientInfo {
                id: RecordId::generate(),
                key: key.to_string(),
                status: ClientStatus::Activated,
                created_at_micros: now,
                updated_at_micros: now,
                documents: HashMap::new(),
            },
        };

        txn.state.upsert_client(client_info.clone());
        txn.commit();

        debug!(client_id = %client_info.id, key, "activated client");
        Ok(client_info)
    }

    async fn deactivate_client(&self, client_id: &RecordId) -> Result<ClientInfo, SyncdbError> {
        let mut txn = self.begin_write();

        let Some(existing) = txn.state.clients.get(client_id) else {
            return Err(SyncdbError::not_found(
                ResourceType::Client,
                client_id.as_str(),
            ));
        };
        let mut client_info = existing.clone();
        client_info.status = ClientStatus::Deactivated;
        client_info.updated_at_micros = now_micros();

        txn.state.upsert_client(client_info.clone());
        txn.commit();

        debug!(client_id = %client_info.id, "deactivated client");
        Ok(client_info)
    }

    async fn find_client_info_by_id(
        &self,
        client_id: &RecordId,
    ) -> Result<ClientInfo, SyncdbError> {
        let snapshot = self.begin_read();
        snapshot
            .clients
            .get(client_id)
            .cloned()
            .ok_or_else(|| SyncdbError::not_found(ResourceType::Client, client_id.as_str()))
    }

    async fn update_client_info_after_push_pull(
        &self,
        client_info: &ClientInfo,
        doc_info: &DocInfo,
    ) -> Result<(), SyncdbError> {
        let incoming = client_info
            .documents
            .get(&doc_info.id)
            .copied()
            .ok_or_else(|| SyncdbError::NeverAttached {
                client_id: client_info.id.to_string(),
                doc_id: doc_info.id.to_string(),
            })?;
        let attached = incoming.status == AttachStatus::Attached;

        let mut txn = self.begin_write();

        let Some(stored) = txn.state.clients.get(&client_info.id) else {
            return Err(SyncdbError::not_found(
                ResourceType::Client,
                client_info.id.as_str(),
            ));
        };
        let mut loaded = stored.clone();

        let reconciled = if attached {
            let persisted = loaded
                .documents
                .get(&doc_info.id)
                .copied()
                .unwrap_or_else(|| ClientDocInfo::with_status(incoming.status));
            ClientDocInfo {
                status: incoming.status,
                server_seq: persisted.server_seq.max(incoming.server_seq),
                client_seq: persisted.client_seq.max(incoming.client_seq),
            }
        } else {
            ClientDocInfo::with_status(incoming.status)
        };
        loaded.documents.insert(doc_info.id.clone(), reconciled);
        loaded.updated_at_micros = now_micros();

        txn.state.upsert_client(loaded);
        txn.commit();
        Ok(())
    }

    async fn find_doc_info_by_key(
        &self,
        client_info: &ClientInfo,
        key: &str,
        create_if_missing: bool,
    ) -> Result<DocInfo, SyncdbError> {
        let mut txn = self.begin_write();

        if let Some(existing) = txn.state.document_by_key(key) {
            return Ok(existing.clone());
        }
        if !create_if_missing {
            return Err(SyncdbError::not_found(ResourceType::Document, key));
        }

        let now = now_micros();
        let doc_info = DocInfo {
            id: RecordId::generate(),
            key: key.to_string(),
            owner: client_info.id.clone(),
            server_seq: 0,
            created_at_micros: now,
            updated_at_micros: now,
            accessed_at_micros: now,
        };
        txn.state.upsert_document(doc_info.clone());
        txn.commit();

        debug!(doc_id = %doc_info.id, key, owner = %doc_info.owner, "created document");
        Ok(doc_info)
    }

    async fn create_change_infos(
        &self,
        doc_info: &DocInfo,
        initial_server_seq: u64,
        changes: &[Change],
    ) -> Result<(), SyncdbError> {
        let mut txn = self.begin_write();

        let Some(stored) = txn.state.document_by_key(&doc_info.key).cloned() else {
            return Err(SyncdbError::not_found(
                ResourceType::Document,
                doc_info.key.as_str(),
            ));
        };
        if stored.server_seq != initial_server_seq {
            warn!(
                doc_id = %stored.id,
                stored_seq = stored.server_seq,
                initial_server_seq,
                "rejected concurrent push"
            );
            return Err(SyncdbError::Conflict(format!(
                "document '{}': server seq moved from {} to {}",
                stored.id, initial_server_seq, stored.server_seq
            )));
        }

        let mut server_seq = initial_server_seq;
        for change in changes {
            server_seq += 1;
            txn.state.insert_change(ChangeInfo {
                id: RecordId::generate(),
                doc_id: stored.id.clone(),
                server_seq,
                actor: change.id.actor,
                client_seq: change.id.client_seq,
                lamport: change.id.lamport,
                message: change.message.clone(),
                operations: change.operations.clone(),
            });
        }

        let mut updated = stored;
        updated.server_seq = server_seq;
        updated.updated_at_micros = now_micros();
        txn.state.upsert_document(updated);
        txn.commit();

        debug!(
            doc_id = %doc_info.id,
            appended = changes.len(),
            server_seq,
            "appended changes"
        );
        Ok(())
    }

    async fn find_change_infos_between_server_seqs(
        &self,
        doc_id: &RecordId,
        from: u64,
        to: u64,
    ) -> Result<Vec<ChangeInfo>, SyncdbError> {
        let snapshot = self.begin_read();
        Ok(snapshot.change_infos_in_range(doc_id, from, to, self.config.max_scan_changes))
    }

    async fn find_changes_between_server_seqs(
        &self,
        doc_id: &RecordId,
        from: u64,
        to: u64,
    ) -> Result<Vec<Change>, SyncdbError> {
        let infos = self
            .find_change_infos_between_server_seqs(doc_id, from, to)
            .await?;
        Ok(infos.iter().map(ChangeInfo::to_change).collect())
    }

    async fn create_snapshot_info(
        &self,
        doc_id: &RecordId,
        server_seq: u64,
        snapshot: Vec<u8>,
    ) -> Result<(), SyncdbError> {
        let mut txn = self.begin_write();
        txn.state.insert_snapshot(SnapshotInfo {
            id: RecordId::generate(),
            doc_id: doc_id.clone(),
            server_seq,
            snapshot,
            created_at_micros: now_micros(),
        });
        txn.commit();

        debug!(doc_id = %doc_id, server_seq, "stored snapshot");
        Ok(())
    }

    async fn find_last_snapshot_info(
        &self,
        doc_id: &RecordId,
    ) -> Result<SnapshotInfo, SyncdbError> {
        let snapshot = self.begin_read();
        Ok(snapshot
            .last_snapshot_for_doc(doc_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_and_find_min_synced_ticket(
        &self,
        client_info: &ClientInfo,
        doc_id: &RecordId,
        server_seq: u64,
    ) -> Result<Ticket, SyncdbError> {
        self.update_synced_seq(client_info, doc_id, server_seq)?;

        let snapshot = self.begin_read();
        let Some(min_seq) = snapshot.min_synced_seq(doc_id) else {
            return Ok(Ticket::initial());
        };
        if min_seq == 0 {
            return Ok(Ticket::initial());
        }
        Self::find_ticket_by_server_seq(&snapshot, doc_id, min_seq)
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryDatabase;
    use crate::config::SyncdbConfig;
    use crate::error::SyncdbErrorCode;
    use crate::record::ClientStatus;
    use crate::storage::Database;

    fn db() -> MemoryDatabase {
        MemoryDatabase::new(SyncdbConfig::default()).expect("engine")
    }

    #[tokio::test]
    async fn reactivation_reuses_the_identifier() {
        let db = db();
        let first = db.activate_client("alpha").await.expect("first");
        let second = db.activate_client("alpha").await.expect("second");

        assert_eq!(first.id, second.id);
        assert_eq!(second.status, ClientStatus::Activated);
        assert_eq!(first.created_at_micros, second.created_at_micros);
        assert!(second.updated_at_micros >= first.updated_at_micros);
    }

    #[tokio::test]
    async fn distinct_keys_get_distinct_identifiers() {
        let db = db();
        let a = db.activate_client("a").await.expect("a");
        let b = db.activate_client("b").await.expect("b");
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn deactivate_then_reactivate_flips_status_in_place() {
        let db = db();
        let client = db.activate_client("alpha").await.expect("activate");

        let deactivated = db.deactivate_client(&client.id).await.expect("deactivate");
        assert_eq!(deactivated.status, ClientStatus::Deactivated);

        let found = db
            .find_client_info_by_id(&client.id)
            .await
            .expect("find after deactivate");
        assert_eq!(found.status, ClientStatus::Deactivated);

        let reactivated = db.activate_client("alpha").await.expect("reactivate");
        assert_eq!(reactivated.id, client.id);
        assert_eq!(reactivated.status, ClientStatus::Activated);
    }

    #[tokio::test]
    async fn zero_scan_config_is_rejected_at_construction() {
        let err = MemoryDatabase::new(SyncdbConfig::default().with_max_scan_changes(0))
            .err()
            .expect("invalid config");
        assert_eq!(err.code(), SyncdbErrorCode::Validation);
    }
}
