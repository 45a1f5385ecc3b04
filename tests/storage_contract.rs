use syncdb::clock::ActorId;
use syncdb::config::SyncdbConfig;
use syncdb::error::{SyncdbError, SyncdbErrorCode};
use syncdb::record::{AttachStatus, Change, ChangeId, ClientInfo, RecordId};
use syncdb::storage::memory::MemoryDatabase;
use syncdb::storage::Database;

fn engine() -> MemoryDatabase {
    MemoryDatabase::new(SyncdbConfig::default()).expect("engine")
}

fn actor_of(client: &ClientInfo) -> ActorId {
    ActorId::from_hex(client.id.as_str()).expect("client id is a valid actor id")
}

fn changes(actor: ActorId, count: u32) -> Vec<Change> {
    (1..=count)
        .map(|i| {
            Change::new(
                ChangeId::new(i, u64::from(i), actor),
                Some(format!("edit {i}")),
                vec![vec![0xAB; 8]],
            )
        })
        .collect()
}

#[tokio::test]
async fn activating_an_unseen_key_twice_reuses_the_identifier() {
    let db = engine();

    let first = db.activate_client("editor-1").await.expect("first");
    let second = db.activate_client("editor-1").await.expect("second");

    assert_eq!(first.id, second.id);
    assert_eq!(first.created_at_micros, second.created_at_micros);
    assert!(second.updated_at_micros >= first.updated_at_micros);
}

#[tokio::test]
async fn deactivating_an_unknown_identifier_is_not_found() {
    let db = engine();
    let err = db
        .deactivate_client(&RecordId::generate())
        .await
        .err()
        .expect("unknown client");
    assert_eq!(err.code(), SyncdbErrorCode::ClientNotFound);
}

#[tokio::test]
async fn finding_a_missing_document_without_creation_is_not_found() {
    let db = engine();
    let client = db.activate_client("editor-1").await.expect("activate");

    let err = db
        .find_doc_info_by_key(&client, "notes.md", false)
        .await
        .err()
        .expect("missing doc");
    assert_eq!(err.code(), SyncdbErrorCode::DocumentNotFound);

    let created = db
        .find_doc_info_by_key(&client, "notes.md", true)
        .await
        .expect("create doc");
    assert_eq!(created.key, "notes.md");
    assert_eq!(created.owner, client.id);
    assert_eq!(created.server_seq, 0);

    let found = db
        .find_doc_info_by_key(&client, "notes.md", false)
        .await
        .expect("find doc");
    assert_eq!(found.id, created.id);
}

#[tokio::test]
async fn appending_changes_advances_the_sequence_by_the_batch_size() {
    let db = engine();
    let client = db.activate_client("editor-1").await.expect("activate");
    let doc = db
        .find_doc_info_by_key(&client, "notes.md", true)
        .await
        .expect("create doc");

    db.create_change_infos(&doc, 0, &changes(actor_of(&client), 3))
        .await
        .expect("first push");

    let doc = db
        .find_doc_info_by_key(&client, "notes.md", false)
        .await
        .expect("reload doc");
    assert_eq!(doc.server_seq, 3);

    let infos = db
        .find_change_infos_between_server_seqs(&doc.id, 1, 100)
        .await
        .expect("scan");
    let seqs: Vec<u64> = infos.iter().map(|c| c.server_seq).collect();
    assert_eq!(seqs, vec![1, 2, 3]);
    assert!(infos.iter().all(|c| c.doc_id == doc.id));
}

#[tokio::test]
async fn a_stale_base_sequence_is_rejected_without_side_effects() {
    let db = engine();
    let client = db.activate_client("editor-1").await.expect("activate");
    let doc = db
        .find_doc_info_by_key(&client, "notes.md", true)
        .await
        .expect("create doc");
    let actor = actor_of(&client);

    db.create_change_infos(&doc, 0, &changes(actor, 3))
        .await
        .expect("first push");

    // Same base again: the counter has moved on, so the whole push fails.
    let err = db
        .create_change_infos(&doc, 0, &changes(actor, 2))
        .await
        .err()
        .expect("stale push");
    assert_eq!(err.code(), SyncdbErrorCode::Conflict);
    assert!(matches!(err, SyncdbError::Conflict(_)));

    let doc = db
        .find_doc_info_by_key(&client, "notes.md", false)
        .await
        .expect("reload doc");
    assert_eq!(doc.server_seq, 3, "rejected push must not advance the counter");
    let infos = db
        .find_change_infos_between_server_seqs(&doc.id, 1, 100)
        .await
        .expect("scan");
    assert_eq!(infos.len(), 3, "rejected push must not append records");
}

#[tokio::test]
async fn range_scans_are_inclusive_ascending_and_empty_safe() {
    let db = engine();
    let client = db.activate_client("editor-1").await.expect("activate");
    let doc = db
        .find_doc_info_by_key(&client, "notes.md", true)
        .await
        .expect("create doc");

    db.create_change_infos(&doc, 0, &changes(actor_of(&client), 10))
        .await
        .expect("push");

    let middle = db
        .find_change_infos_between_server_seqs(&doc.id, 3, 7)
        .await
        .expect("scan 3..=7");
    let seqs: Vec<u64> = middle.iter().map(|c| c.server_seq).collect();
    assert_eq!(seqs, vec![3, 4, 5, 6, 7]);

    let beyond = db
        .find_change_infos_between_server_seqs(&doc.id, 11, 20)
        .await
        .expect("scan past the end");
    assert!(beyond.is_empty());

    let decoded = db
        .find_changes_between_server_seqs(&doc.id, 3, 7)
        .await
        .expect("decoded scan");
    assert_eq!(decoded.len(), 5);
    assert_eq!(decoded[0].server_seq, 3);
    assert_eq!(decoded[0].id.actor, actor_of(&client));
    assert_eq!(decoded[0].operations, vec![vec![0xAB; 8]]);
}

#[tokio::test]
async fn last_snapshot_is_the_highest_sequence_or_the_zero_sentinel() {
    let db = engine();
    let client = db.activate_client("editor-1").await.expect("activate");
    let doc = db
        .find_doc_info_by_key(&client, "notes.md", true)
        .await
        .expect("create doc");

    let none = db
        .find_last_snapshot_info(&doc.id)
        .await
        .expect("sentinel");
    assert_eq!(none.server_seq, 0);
    assert!(none.snapshot.is_empty());
    assert!(none.id.is_nil());

    db.create_snapshot_info(&doc.id, 5, vec![5; 16])
        .await
        .expect("snapshot at 5");
    db.create_snapshot_info(&doc.id, 8, vec![8; 16])
        .await
        .expect("snapshot at 8");

    let last = db.find_last_snapshot_info(&doc.id).await.expect("last");
    assert_eq!(last.server_seq, 8);
    assert_eq!(last.snapshot, vec![8; 16]);
    assert_eq!(last.doc_id, doc.id);
}

#[tokio::test]
async fn push_pull_reconciliation_merges_monotonically() {
    let db = engine();
    let mut client = db.activate_client("editor-1").await.expect("activate");
    let doc = db
        .find_doc_info_by_key(&client, "notes.md", true)
        .await
        .expect("create doc");

    client.attach_document(doc.id.clone());
    db.update_client_info_after_push_pull(&client, &doc)
        .await
        .expect("attach exchange");

    client
        .update_checkpoint(&doc.id, 8, 3)
        .expect("raise checkpoint");
    db.update_client_info_after_push_pull(&client, &doc)
        .await
        .expect("sync exchange");

    // A caller replaying an older view must not roll the record back.
    let mut stale = client.clone();
    let entry = stale.documents.get_mut(&doc.id).expect("entry");
    entry.server_seq = 5;
    entry.client_seq = 1;
    db.update_client_info_after_push_pull(&stale, &doc)
        .await
        .expect("stale exchange");

    let persisted = db
        .find_client_info_by_id(&client.id)
        .await
        .expect("reload client");
    let info = persisted.documents.get(&doc.id).expect("doc entry");
    assert_eq!(info.status, AttachStatus::Attached);
    assert_eq!(info.server_seq, 8);
    assert_eq!(info.client_seq, 3);
}

#[tokio::test]
async fn detaching_keeps_the_entry_with_reset_sequences() {
    let db = engine();
    let mut client = db.activate_client("editor-1").await.expect("activate");
    let doc = db
        .find_doc_info_by_key(&client, "notes.md", true)
        .await
        .expect("create doc");

    client.attach_document(doc.id.clone());
    client.update_checkpoint(&doc.id, 6, 2).expect("checkpoint");
    db.update_client_info_after_push_pull(&client, &doc)
        .await
        .expect("attach exchange");

    client.detach_document(&doc.id).expect("detach");
    db.update_client_info_after_push_pull(&client, &doc)
        .await
        .expect("detach exchange");

    let persisted = db
        .find_client_info_by_id(&client.id)
        .await
        .expect("reload client");
    let info = persisted.documents.get(&doc.id).expect("entry survives");
    assert_eq!(info.status, AttachStatus::Detached);
    assert_eq!(info.server_seq, 0);
    assert_eq!(info.client_seq, 0);
}

#[tokio::test]
async fn push_pull_for_a_never_attached_document_is_rejected() {
    let db = engine();
    let client = db.activate_client("editor-1").await.expect("activate");
    let doc = db
        .find_doc_info_by_key(&client, "notes.md", true)
        .await
        .expect("create doc");

    let err = db
        .update_client_info_after_push_pull(&client, &doc)
        .await
        .err()
        .expect("no attachment entry");
    assert_eq!(err.code(), SyncdbErrorCode::NeverAttached);
}

#[tokio::test]
async fn push_pull_for_a_vanished_client_is_not_found() {
    let db = engine();
    let mut client = db.activate_client("editor-1").await.expect("activate");
    let doc = db
        .find_doc_info_by_key(&client, "notes.md", true)
        .await
        .expect("create doc");

    client.attach_document(doc.id.clone());
    client.id = RecordId::generate();

    let err = db
        .update_client_info_after_push_pull(&client, &doc)
        .await
        .err()
        .expect("client record is gone");
    assert_eq!(err.code(), SyncdbErrorCode::ClientNotFound);
}
