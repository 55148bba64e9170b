mod common;

use common::Fixture;
use swiftfuse::fs;

#[tokio::test]
async fn xattr_set_get_list_remove_round_trip() {
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();
    let node = fs::create::create(&fixture.ctx, &container, &root, "f.txt").await.unwrap();

    fs::xattr::set_xattr(&fixture.ctx, &container, &node, "user.tag", b"vacation").await.unwrap();
    assert_eq!(fs::xattr::get_xattr(&node, "user.tag"), Some("vacation".to_string()));
    assert_eq!(fs::xattr::list_xattr(&node), vec!["user.tag".to_string()]);

    fs::xattr::remove_xattr(&fixture.ctx, &container, &node, "user.tag").await.unwrap();
    assert_eq!(fs::xattr::get_xattr(&node, "user.tag"), None);
}

#[tokio::test]
async fn removing_an_unset_xattr_is_not_found() {
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();
    let node = fs::create::create(&fixture.ctx, &container, &root, "f.txt").await.unwrap();

    let err = fs::xattr::remove_xattr(&fixture.ctx, &container, &node, "user.missing").await.unwrap_err();
    assert!(matches!(err, swiftfuse::SwiftFsError::NotFound(_)));
}

#[tokio::test]
async fn setattr_mtime_is_ignored_without_extended_attrs() {
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();
    let node = fs::create::create(&fixture.ctx, &container, &root, "f.txt").await.unwrap();

    fs::set_attr::setattr_mtime(&fixture.ctx, &container, &node, 1_700_000_123.0).await.unwrap();
    assert!(node.headers().get(swiftfuse::storage::MTIME_HEADER).is_none());
}

#[tokio::test]
async fn setattr_mtime_rewrites_the_mtime_header_when_extended_attrs_enabled() {
    let fixture = Fixture::with_container_configured("photos", |args| {
        args.readdir_extra_attributes = true;
    })
    .await;
    let (container, root) = fixture.resolve("").await.unwrap();
    let node = fs::create::create(&fixture.ctx, &container, &root, "f.txt").await.unwrap();

    fs::set_attr::setattr_mtime(&fixture.ctx, &container, &node, 1_700_000_123.0).await.unwrap();
    assert_eq!(
        node.headers().get(swiftfuse::storage::MTIME_HEADER),
        Some(&"1700000123".to_string())
    );

    let stub = fixture.client.head_object("photos", "f.txt").await.unwrap();
    assert_eq!(stub.headers.get(swiftfuse::storage::MTIME_HEADER), Some(&"1700000123".to_string()));
}

#[tokio::test]
async fn setattr_mtime_uses_the_hubic_header_when_hubic_times_enabled() {
    let fixture = Fixture::with_container_configured("photos", |args| {
        args.readdir_extra_attributes = true;
        args.hubic_times = true;
    })
    .await;
    let (container, root) = fixture.resolve("").await.unwrap();
    let node = fs::create::create(&fixture.ctx, &container, &root, "f.txt").await.unwrap();

    fs::set_attr::setattr_mtime(&fixture.ctx, &container, &node, 1_700_000_123.0).await.unwrap();
    assert!(node.headers().get(swiftfuse::storage::HUBIC_MTIME_HEADER).is_some());
    assert!(node.headers().get(swiftfuse::storage::MTIME_HEADER).is_none());
}

#[tokio::test]
async fn statfs_reports_unlimited_blocks_without_a_quota() {
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();
    fs::create::create(&fixture.ctx, &container, &root, "a.txt").await.unwrap();

    let stat = fs::statfs(&fixture.ctx).await.unwrap();
    assert_eq!(stat.blocks, u64::MAX);
    assert_eq!(stat.bfree, u64::MAX);
    assert_eq!(stat.bsize, fixture.ctx.config.block_size as u64);
}
