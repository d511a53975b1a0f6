//! Integration tests for duplicate, delete, batches, reads, and trails.

mod helpers;

use arbor_core::error::ErrorKind;
use arbor_core::traits::StorageBackend;
use arbor_core::types::NodeId;
use arbor_database::NodeStore;
use arbor_entity::node::{NewNode, NodeKind};

#[tokio::test]
async fn test_duplicate_folder_deep_copies_records_and_objects() {
    let lib = helpers::TestLibrary::new();
    let f = lib.folder("F", None).await;
    let a = lib.upload("a.txt", "alpha", Some(f.id)).await;
    let s = lib.folder("S", Some(f.id)).await;
    let b = lib.upload("b.txt", "beta", Some(s.id)).await;

    let copy = lib
        .service
        .duplicate(f.id, Some("F copy"), None)
        .await
        .unwrap();

    assert_eq!(copy.name, "F copy");
    assert_eq!(copy.path, "F copy");
    assert!(copy.id != f.id);

    let copied = lib.store.subtree(copy.id).await.unwrap();
    assert_eq!(copied.len(), 4);

    let source_ids: Vec<NodeId> = lib
        .store
        .subtree(f.id)
        .await
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    assert!(copied.iter().all(|n| !source_ids.contains(&n.id)));
    assert!(
        copied
            .iter()
            .all(|n| n.path == "F copy" || n.path.starts_with("F copy/"))
    );

    // Stored basenames and checksums survive the copy.
    let a_copy = copied.iter().find(|n| n.name == "a.txt").unwrap();
    assert_eq!(a_copy.basename(), a.basename());
    assert_eq!(a_copy.checksum_sha256, a.checksum_sha256);
    let bytes = lib.backend.read_bytes(&a_copy.path).await.unwrap();
    assert_eq!(&bytes[..], b"alpha");

    // Mutating the copy leaves the source untouched.
    lib.service.rename(copy.id, "F copy 2").await.unwrap();
    assert_eq!(lib.node(f.id).await.path, "F");
    assert_eq!(lib.node(b.id).await.path, b.path);
    let original = lib.backend.read_bytes(&a.path).await.unwrap();
    assert_eq!(&original[..], b"alpha");
}

#[tokio::test]
async fn test_duplicate_file_lands_next_to_the_source() {
    let lib = helpers::TestLibrary::new();
    let f = lib.folder("F", None).await;
    let file = lib.upload("photo.png", "img", Some(f.id)).await;

    let copy = lib
        .service
        .duplicate(file.id, Some("photo copy.png"), None)
        .await
        .unwrap();

    assert_eq!(copy.parent_id, Some(f.id));
    assert_eq!(copy.path, "F/photo copy.png");
    assert_eq!(copy.checksum_sha256, file.checksum_sha256);
    assert_eq!(copy.size_bytes, file.size_bytes);

    let bytes = lib.backend.read_bytes("F/photo copy.png").await.unwrap();
    assert_eq!(&bytes[..], b"img");
    assert!(lib.backend.exists(&file.path).await.unwrap());
}

#[tokio::test]
async fn test_duplicate_into_an_explicit_target_folder() {
    let lib = helpers::TestLibrary::new();
    let src = lib.folder("Src", None).await;
    let dst = lib.folder("Dst", None).await;
    let file = lib.upload("a.txt", "a", Some(src.id)).await;

    let copy = lib
        .service
        .duplicate(file.id, None, Some(dst.id))
        .await
        .unwrap();

    assert_eq!(copy.parent_id, Some(dst.id));
    assert_eq!(copy.name, "a.txt");
    assert_eq!(copy.path, "Dst/a.txt");
}

#[tokio::test]
async fn test_duplicate_onto_the_source_path_is_refused() {
    let lib = helpers::TestLibrary::new();
    let f = lib.folder("F", None).await;

    let err = lib.service.duplicate(f.id, None, None).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(lib.node(f.id).await.path, "F");
}

#[tokio::test]
async fn test_duplicate_of_a_missing_object_is_record_only() {
    let lib = helpers::TestLibrary::new();
    let file = lib.upload("ghost.txt", "g", None).await;
    lib.backend.delete(&file.path).await.unwrap();

    let copy = lib
        .service
        .duplicate(file.id, Some("ghost copy.txt"), None)
        .await
        .unwrap();

    assert_eq!(copy.name, "ghost copy.txt");
    assert!(!lib.backend.exists(&copy.path).await.unwrap());
}

#[tokio::test]
async fn test_delete_removes_the_whole_subtree() {
    let lib = helpers::TestLibrary::new();
    let f = lib.folder("F", None).await;
    let s = lib.folder("S", Some(f.id)).await;
    let a = lib.upload("a.txt", "a", Some(f.id)).await;
    let b = lib.upload("b.txt", "b", Some(s.id)).await;
    let outside = lib.upload("keep.txt", "k", None).await;

    lib.service.delete(f.id, true).await.unwrap();

    for id in [f.id, s.id, a.id, b.id] {
        assert!(!lib.exists(id).await);
    }
    assert!(lib.exists(outside.id).await);
    assert!(!lib.backend.exists("F").await.unwrap());
    assert!(lib.backend.exists(&outside.path).await.unwrap());
}

#[tokio::test]
async fn test_delete_keeps_objects_when_cascade_is_off() {
    let lib = helpers::TestLibrary::new();
    let f = lib.folder("F", None).await;
    let a = lib.upload("a.txt", "a", Some(f.id)).await;

    lib.service.delete(f.id, false).await.unwrap();

    assert!(!lib.exists(f.id).await);
    assert!(!lib.exists(a.id).await);
    assert!(lib.backend.exists(&a.path).await.unwrap());
}

#[tokio::test]
async fn test_delete_swallows_storage_cleanup_failures() {
    let lib = helpers::TestLibrary::new();
    // A record pointing at a disk this registry does not know.
    let stray = lib
        .store
        .insert(NewNode {
            parent_id: None,
            kind: NodeKind::File,
            name: "stray.bin".to_string(),
            path: "stray.bin".to_string(),
            size_bytes: 1,
            mime_type: None,
            extension: None,
            checksum_sha256: None,
            disk: "retired".to_string(),
            absolute_url: String::new(),
        })
        .await
        .unwrap();

    lib.service.delete(stray.id, true).await.unwrap();

    assert!(!lib.exists(stray.id).await);
}

#[tokio::test]
async fn test_delete_many_reports_per_id_failures() {
    let lib = helpers::TestLibrary::new();
    let a = lib.upload("a.txt", "a", None).await;
    let missing = NodeId::new();

    let report = lib.service.delete_many(&[a.id, missing], true).await;

    assert_eq!(report.attempted, 2);
    assert_eq!(report.succeeded(), 1);
    assert!(report.is_partial());
    assert_eq!(report.failures[0].0, missing);
    assert!(report.failures[0].1.is_not_found());
    assert!(!lib.exists(a.id).await);
}

#[tokio::test]
async fn test_move_many_is_independent_per_id() {
    let lib = helpers::TestLibrary::new();
    let dst = lib.folder("Dst", None).await;
    let a = lib.upload("a.txt", "a", None).await;
    let b = lib.upload("b.txt", "b", None).await;

    let report = lib
        .service
        .move_many(&[a.id, NodeId::new(), b.id], Some(dst.id))
        .await;

    assert_eq!(report.attempted, 3);
    assert_eq!(report.succeeded(), 2);
    assert!(report.is_partial());
    assert_eq!(lib.node(a.id).await.parent_id, Some(dst.id));
    assert_eq!(lib.node(b.id).await.parent_id, Some(dst.id));
}

#[tokio::test]
async fn test_read_file_returns_node_and_content() {
    let lib = helpers::TestLibrary::new();
    let file = lib.upload("a.txt", "alpha", None).await;

    let (node, bytes) = lib.service.read_file(file.id).await.unwrap();

    assert_eq!(node.id, file.id);
    assert_eq!(&bytes[..], b"alpha");
}

#[tokio::test]
async fn test_read_file_refuses_folders() {
    let lib = helpers::TestLibrary::new();
    let f = lib.folder("F", None).await;

    let err = lib.service.read_file(f.id).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_breadcrumbs_walk_root_first() {
    let lib = helpers::TestLibrary::new();
    let a = lib.folder("A", None).await;
    let b = lib.folder("B", Some(a.id)).await;
    let file = lib.upload("c.txt", "c", Some(b.id)).await;

    let trail = lib.service.breadcrumbs(file.id).await.unwrap();

    let names: Vec<&str> = trail.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "c.txt"]);
}
