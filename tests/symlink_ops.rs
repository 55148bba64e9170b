mod common;

use common::Fixture;
use swiftfuse::fs;
use swiftfuse::node::NodeKind;

#[tokio::test]
async fn symlink_creates_a_link_sentinel_object_carrying_its_target() {
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();

    let link = fs::symlink::symlink(&fixture.ctx, &container, &root, "shortcut", "/real/target.txt")
        .await
        .unwrap();
    assert!(matches!(link.kind(), NodeKind::Symlink { target } if target == "/real/target.txt"));

    let found = fs::lookup::lookup(&fixture.ctx, &container, &root, "shortcut").await.unwrap();
    assert!(matches!(found.kind(), NodeKind::Symlink { target } if target == "/real/target.txt"));

    let stub = fixture.client.head_object("photos", "shortcut").await.unwrap();
    assert_eq!(stub.content_type, "application/link");
}

#[tokio::test]
async fn link_copies_a_regular_object_as_a_new_name() {
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();
    fs::create::create(&fixture.ctx, &container, &root, "source.txt").await.unwrap();

    let linked = fs::link::link(&fixture.ctx, &container, &root, "source.txt", &container, &root, "alias.txt")
        .await
        .unwrap();
    assert_eq!(linked.name, "alias.txt");
    assert!(fixture.client.head_object("photos", "alias.txt").await.is_ok());
    assert!(fixture.client.head_object("photos", "source.txt").await.is_ok());
}

#[tokio::test]
async fn link_of_a_directory_is_not_supported() {
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();
    fs::mk_dir::mkdir(&fixture.ctx, &container, &root, "adir").await.unwrap();

    let err = fs::link::link(&fixture.ctx, &container, &root, "adir", &container, &root, "bdir")
        .await
        .unwrap_err();
    assert!(matches!(err, swiftfuse::SwiftFsError::NotSupported(_)));
}

#[tokio::test]
async fn link_of_a_segmented_object_across_containers_fails_closed() {
    let fixture = Fixture::new().await;
    fixture.client.ensure_container("a", None).await.unwrap();
    fixture.client.ensure_container("a_segments", None).await.unwrap();
    fixture.client.ensure_container("b", None).await.unwrap();
    let (container_a, dir_a) = fixture.resolve("a").await.unwrap();
    let (container_b, dir_b) = fixture.resolve("b").await.unwrap();

    let node = fs::create::create(&fixture.ctx, &container_a, &dir_a, "big.bin").await.unwrap();
    let handle = fs::open::open(&fixture.ctx, &container_a, &node, fs::open::OpenFlags::Write).await.unwrap();
    let segment_size = fixture.ctx.config.segment_size_bytes() as usize;
    fs::write::write(&fixture.ctx, &handle, &vec![1u8; segment_size + 1]).await.unwrap();
    fs::release::release(&fixture.ctx, handle.id).await.unwrap();

    let err = fs::link::link(&fixture.ctx, &container_a, &dir_a, "big.bin", &container_b, &dir_b, "copy.bin")
        .await
        .unwrap_err();
    assert!(matches!(err, swiftfuse::SwiftFsError::NotSupported(_)));
}
