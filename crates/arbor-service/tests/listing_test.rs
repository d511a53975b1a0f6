//! Integration tests for listing modes and navigation trees.

mod helpers;

use arbor_core::types::Projection;
use arbor_database::ParentFilter;
use arbor_entity::node::NodeKind;
use arbor_service::{ListOptions, ListRequest, Listing};

fn columns(cols: &[&str]) -> Projection {
    Projection::Columns(cols.iter().map(|c| c.to_string()).collect())
}

#[tokio::test]
async fn test_tree_mode_wins_over_pagination_and_limits() {
    let lib = helpers::TestLibrary::new();
    let root = lib.folder("Root", None).await;
    let sub = lib.folder("Sub", Some(root.id)).await;
    lib.upload("deep.txt", "d", Some(sub.id)).await;
    lib.upload("top.txt", "t", None).await;

    let request = ListRequest {
        options: ListOptions {
            tree: true,
            paginate: true,
            limit: Some(1),
            ..ListOptions::default()
        },
        ..ListRequest::default()
    };

    let Listing::Tree(roots) = lib.service.list(&request).await.unwrap() else {
        panic!("expected a tree listing");
    };

    // Every row made it in despite the limit, nested in place.
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0].record.fields["name"], "Root");
    let total: usize = roots.iter().map(|r| r.len()).sum();
    assert_eq!(total, 4);
}

#[tokio::test]
async fn test_tree_projection_keeps_nesting_without_parent_column() {
    let lib = helpers::TestLibrary::new();
    let root = lib.folder("Root", None).await;
    lib.upload("leaf.txt", "l", Some(root.id)).await;

    let request = ListRequest {
        options: ListOptions {
            tree: true,
            projection: columns(&["name"]),
            ..ListOptions::default()
        },
        ..ListRequest::default()
    };

    let listing = lib.service.list(&request).await.unwrap();
    let json = serde_json::to_value(&listing).unwrap();

    assert_eq!(json[0]["name"], "Root");
    assert_eq!(json[0]["children"][0]["name"], "leaf.txt");
    // The id and parent columns are forced back in for assembly.
    assert!(json[0].get("id").is_some());
    // Columns the caller did not ask for stay out.
    assert!(json[0].get("path").is_none());
    assert!(json[0].get("size").is_none());
}

#[tokio::test]
async fn test_paginated_listing_windows_rows_with_metadata() {
    let lib = helpers::TestLibrary::new();
    for name in ["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"] {
        lib.upload(name, "x", None).await;
    }

    let request = ListRequest {
        options: ListOptions {
            limit: Some(2),
            page: 2,
            ..ListOptions::default()
        },
        ..ListRequest::default()
    };

    let Listing::Page(page) = lib.service.list(&request).await.unwrap() else {
        panic!("expected a paginated listing");
    };

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.page, 2);
    assert_eq!(page.page_size, 2);
    assert_eq!(page.total_items, 5);
    assert_eq!(page.total_pages, 3);
    assert!(page.has_next);
    assert!(page.has_previous);
    assert_eq!(page.items[0].fields["name"], "c.txt");
}

#[tokio::test]
async fn test_flat_listing_caps_rows_only_when_positive() {
    let lib = helpers::TestLibrary::new();
    for name in ["a.txt", "b.txt", "c.txt", "d.txt"] {
        lib.upload(name, "x", None).await;
    }

    let capped = ListRequest {
        options: ListOptions {
            paginate: false,
            limit: Some(3),
            ..ListOptions::default()
        },
        ..ListRequest::default()
    };
    let Listing::Flat(rows) = lib.service.list(&capped).await.unwrap() else {
        panic!("expected a flat listing");
    };
    assert_eq!(rows.len(), 3);

    let unbounded = ListRequest {
        options: ListOptions {
            paginate: false,
            limit: Some(-1),
            ..ListOptions::default()
        },
        ..ListRequest::default()
    };
    let Listing::Flat(rows) = lib.service.list(&unbounded).await.unwrap() else {
        panic!("expected a flat listing");
    };
    assert_eq!(rows.len(), 4);
}

#[tokio::test]
async fn test_parent_kind_and_search_filters() {
    let lib = helpers::TestLibrary::new();
    let docs = lib.folder("Docs", None).await;
    lib.upload("report one.pdf", "1", Some(docs.id)).await;
    lib.upload("report two.pdf", "2", Some(docs.id)).await;
    lib.upload("summary.txt", "3", Some(docs.id)).await;
    lib.upload("Report root.pdf", "4", None).await;

    let request = ListRequest {
        parent: ParentFilter::Of(docs.id),
        kind: Some(NodeKind::File),
        search: Some("REPORT".to_string()),
        options: ListOptions {
            paginate: false,
            ..ListOptions::default()
        },
        ..ListRequest::default()
    };

    let Listing::Flat(rows) = lib.service.list(&request).await.unwrap() else {
        panic!("expected a flat listing");
    };

    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| {
        r.fields["name"]
            .as_str()
            .unwrap()
            .to_lowercase()
            .contains("report")
    }));
}

#[tokio::test]
async fn test_folders_tree_is_folders_only_and_honors_excludes() {
    let lib = helpers::TestLibrary::new();
    let a = lib.folder("A", None).await;
    let b = lib.folder("B", Some(a.id)).await;
    lib.folder("C", None).await;
    lib.upload("not-a-folder.txt", "x", None).await;

    let forest = lib.service.folders_tree(Vec::new()).await.unwrap();
    assert_eq!(forest.len(), 2);
    let names: Vec<&str> = forest.iter().map(|e| e.record.name.as_str()).collect();
    assert_eq!(names, vec!["A", "C"]);
    assert_eq!(forest[0].children[0].record.name, "B");

    let trimmed = lib.service.folders_tree(vec![b.id]).await.unwrap();
    assert_eq!(trimmed.len(), 2);
    assert!(trimmed[0].children.is_empty());
}

#[tokio::test]
async fn test_tree_nesting_survives_child_sorting_before_parent() {
    let lib = helpers::TestLibrary::new();
    let zeta = lib.folder("zeta", None).await;
    lib.folder("alpha", Some(zeta.id)).await;

    let request = ListRequest {
        options: ListOptions {
            tree: true,
            ..ListOptions::default()
        },
        ..ListRequest::default()
    };

    let Listing::Tree(roots) = lib.service.list(&request).await.unwrap() else {
        panic!("expected a tree listing");
    };

    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].record.fields["name"], "zeta");
    assert_eq!(roots[0].children[0].record.fields["name"], "alpha");
}
