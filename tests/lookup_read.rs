mod common;

use common::Fixture;
use swiftfuse::fs;

#[tokio::test]
async fn lookup_missing_name_is_not_found() {
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();

    let err = fs::lookup::lookup(&fixture.ctx, &container, &root, "nope.txt").await.unwrap_err();
    assert!(matches!(err, swiftfuse::SwiftFsError::NotFound(_)));
}

#[tokio::test]
async fn resolve_walks_nested_path_components_one_lookup_at_a_time() {
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();
    let dir = fs::mk_dir::mkdir(&fixture.ctx, &container, &root, "a").await.unwrap();
    fs::create::create(&fixture.ctx, &container, &dir, "b.txt").await.unwrap();

    let (resolved_container, node) = fixture.resolve("a/b.txt").await.unwrap();
    assert_eq!(resolved_container, "photos");
    assert_eq!(node.name, "b.txt");
}

#[tokio::test]
async fn resolve_in_multi_container_mode_descends_through_the_container_first() {
    let fixture = Fixture::new().await;
    fixture.client.ensure_container("docs", None).await.unwrap();
    let (container, root) = fixture.resolve("docs").await.unwrap();
    assert_eq!(container, "docs");
    assert!(matches!(root.kind(), swiftfuse::node::NodeKind::Container { .. }));

    fs::create::create(&fixture.ctx, "docs", &root, "readme.md").await.unwrap();
    let (_, found) = fixture.resolve("docs/readme.md").await.unwrap();
    assert_eq!(found.name, "readme.md");
}

#[tokio::test]
async fn getattr_is_a_pure_projection_with_no_storage_call() {
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();
    let node = fs::create::create(&fixture.ctx, &container, &root, "f.txt").await.unwrap();

    let attr = fs::get_attr::getattr(&fixture.ctx, &node);
    assert_eq!(attr.size, 0);
    assert!(!attr.is_dir);
    assert!(!attr.is_symlink);
}
