use crate::record::{ChangeInfo, ClientInfo, DocInfo, RecordId, SnapshotInfo, SyncedSeqInfo};
use im::{OrdMap, OrdSet};
use parking_lot::{MutexGuard, RwLock};

/// One version of the whole record store: a primary table per entity plus the
/// secondary indexes kept transactionally consistent with it.
///
/// Built on persistent maps, so cloning a `State` is O(1) structural sharing.
/// A clone serves as the read snapshot and the write-transaction working copy
/// alike.
#[derive(Debug, Clone, Default)]
pub(crate) struct State {
    pub clients: OrdMap<RecordId, ClientInfo>,
    pub clients_by_key: OrdMap<String, RecordId>,

    pub documents: OrdMap<RecordId, DocInfo>,
    pub documents_by_key: OrdMap<String, RecordId>,

    pub changes: OrdMap<RecordId, ChangeInfo>,
    pub changes_by_doc_seq: OrdMap<(RecordId, u64), RecordId>,

    pub snapshots: OrdMap<RecordId, SnapshotInfo>,
    pub snapshots_by_doc_seq: OrdMap<(RecordId, u64), RecordId>,

    pub synced_seqs: OrdMap<RecordId, SyncedSeqInfo>,
    pub synced_by_doc_client: OrdMap<(RecordId, RecordId), RecordId>,
    pub synced_by_doc_seq: OrdMap<(RecordId, u64), OrdSet<RecordId>>,
}

impl State {
    pub fn upsert_client(&mut self, info: ClientInfo) {
        self.clients_by_key.insert(info.key.clone(), info.id.clone());
        self.clients.insert(info.id.clone(), info);
    }

    pub fn client_by_key(&self, key: &str) -> Option<&ClientInfo> {
        self.clients_by_key
            .get(key)
            .and_then(|id| self.clients.get(id))
    }

    pub fn upsert_document(&mut self, info: DocInfo) {
        self.documents_by_key
            .insert(info.key.clone(), info.id.clone());
        self.documents.insert(info.id.clone(), info);
    }

    pub fn document_by_key(&self, key: &str) -> Option<&DocInfo> {
        self.documents_by_key
            .get(key)
            .and_then(|id| self.documents.get(id))
    }

    pub fn insert_change(&mut self, info: ChangeInfo) {
        self.changes_by_doc_seq
            .insert((info.doc_id.clone(), info.server_seq), info.id.clone());
        self.changes.insert(info.id.clone(), info);
    }

    pub fn change_by_doc_seq(&self, doc_id: &RecordId, server_seq: u64) -> Option<&ChangeInfo> {
        self.changes_by_doc_seq
            .get(&(doc_id.clone(), server_seq))
            .and_then(|id| self.changes.get(id))
    }

    /// Ascending scan of a document's change log over `from..=to`, bounded by
    /// `limit` records.
    pub fn change_infos_in_range(
        &self,
        doc_id: &RecordId,
        from: u64,
        to: u64,
        limit: usize,
    ) -> Vec<ChangeInfo> {
        if from > to {
            return Vec::new();
        }
        self.changes_by_doc_seq
            .range((doc_id.clone(), from)..=(doc_id.clone(), to))
            .take(limit)
            .filter_map(|(_, id)| self.changes.get(id).cloned())
            .collect()
    }

    /// A second capture at the same (document, sequence) replaces the first.
    pub fn insert_snapshot(&mut self, info: SnapshotInfo) {
        let key = (info.doc_id.clone(), info.server_seq);
        if let Some(previous) = self.snapshots_by_doc_seq.get(&key).cloned() {
            self.snapshots.remove(&previous);
        }
        self.snapshots_by_doc_seq.insert(key, info.id.clone());
        self.snapshots.insert(info.id.clone(), info);
    }

    pub fn last_snapshot_for_doc(&self, doc_id: &RecordId) -> Option<&SnapshotInfo> {
        self.snapshots_by_doc_seq
            .range((doc_id.clone(), 0)..=(doc_id.clone(), u64::MAX))
            .next_back()
            .and_then(|(_, id)| self.snapshots.get(id))
    }

    pub fn synced_seq_id(&self, doc_id: &RecordId, client_id: &RecordId) -> Option<&RecordId> {
        self.synced_by_doc_client
            .get(&(doc_id.clone(), client_id.clone()))
    }

    pub fn upsert_synced_seq(&mut self, info: SyncedSeqInfo) {
        if let Some(previous) = self.synced_seqs.get(&info.id).cloned() {
            self.unindex_synced_seq(&previous);
        }
        let seq_key = (info.doc_id.clone(), info.server_seq);
        let mut ids = self
            .synced_by_doc_seq
            .get(&seq_key)
            .cloned()
            .unwrap_or_default();
        ids.insert(info.id.clone());
        self.synced_by_doc_seq.insert(seq_key, ids);
        self.synced_by_doc_client
            .insert((info.doc_id.clone(), info.client_id.clone()), info.id.clone());
        self.synced_seqs.insert(info.id.clone(), info);
    }

    pub fn remove_synced_seq(&mut self, doc_id: &RecordId, client_id: &RecordId) {
        let Some(id) = self
            .synced_by_doc_client
            .remove(&(doc_id.clone(), client_id.clone()))
        else {
            return;
        };
        if let Some(previous) = self.synced_seqs.remove(&id) {
            self.unindex_synced_seq(&previous);
        }
    }

    /// Lowest server sequence any client still has recorded for the document.
    pub fn min_synced_seq(&self, doc_id: &RecordId) -> Option<u64> {
        self.synced_by_doc_seq
            .range((doc_id.clone(), 0)..=(doc_id.clone(), u64::MAX))
            .find(|(_, ids)| !ids.is_empty())
            .map(|(key, _)| key.1)
    }

    fn unindex_synced_seq(&mut self, previous: &SyncedSeqInfo) {
        let seq_key = (previous.doc_id.clone(), previous.server_seq);
        let Some(mut ids) = self.synced_by_doc_seq.get(&seq_key).cloned() else {
            return;
        };
        ids.remove(&previous.id);
        if ids.is_empty() {
            self.synced_by_doc_seq.remove(&seq_key);
        } else {
            self.synced_by_doc_seq.insert(seq_key, ids);
        }
    }
}

/// A write transaction: holds the writer lock, mutates a working clone, and
/// publishes it on commit. Dropping the transaction without committing aborts
/// with no observable effect.
pub(crate) struct WriteTxn<'a> {
    _writer: MutexGuard<'a, ()>,
    published: &'a RwLock<State>,
    pub state: State,
}

impl<'a> WriteTxn<'a> {
    pub fn begin(
        writer: MutexGuard<'a, ()>,
        published: &'a RwLock<State>,
    ) -> WriteTxn<'a> {
        let state = published.read().clone();
        WriteTxn {
            _writer: writer,
            published,
            state,
        }
    }

    pub fn commit(self) {
        *self.published.write() = self.state;
    }
}
