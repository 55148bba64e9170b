mod common;

use common::Fixture;
use swiftfuse::fs::{self, open::OpenFlags};

#[tokio::test]
async fn rename_moves_a_plain_object_and_updates_the_cache() {
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();
    fs::create::create(&fixture.ctx, &container, &root, "old.txt").await.unwrap();

    fs::rename::rename(&fixture.ctx, &container, &root, "old.txt", &container, &root, "new.txt")
        .await
        .unwrap();

    assert!(fs::lookup::lookup(&fixture.ctx, &container, &root, "old.txt").await.is_err());
    let renamed = fs::lookup::lookup(&fixture.ctx, &container, &root, "new.txt").await.unwrap();
    assert_eq!(renamed.name, "new.txt");
}

#[tokio::test]
async fn rename_of_a_segmented_object_carries_its_manifest_header_to_the_new_name() {
    // Scenario 4 (spec §8): rename within a container for a segmented
    // object must copy the manifest header along with the zero-byte
    // manifest body; the segments themselves are untouched (they're
    // addressed by the unchanged source path baked into the prefix).
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();
    let node = fs::create::create(&fixture.ctx, &container, &root, "big.bin").await.unwrap();

    let segment_size = fixture.ctx.config.segment_size_bytes() as usize;
    let handle = fs::open::open(&fixture.ctx, &container, &node, OpenFlags::Write).await.unwrap();
    fs::write::write(&fixture.ctx, &handle, &vec![3u8; segment_size + 5]).await.unwrap();
    fs::release::release(&fixture.ctx, handle.id).await.unwrap();
    let manifest_header = node.manifest_header().unwrap();

    fs::rename::rename(&fixture.ctx, &container, &root, "big.bin", &container, &root, "renamed.bin")
        .await
        .unwrap();

    let renamed = fs::lookup::lookup(&fixture.ctx, &container, &root, "renamed.bin").await.unwrap();
    assert_eq!(renamed.manifest_header().unwrap(), manifest_header);
    assert_eq!(renamed.size(), segment_size as u64 + 5);

    // The segments themselves still live under the old prefix, untouched.
    let segments = fixture.client.list_objects("photos_segments", "", None, None).await.unwrap();
    assert_eq!(segments.len(), 1);
}

#[tokio::test]
async fn rename_across_containers_is_not_supported() {
    let fixture = Fixture::new().await;
    fixture.client.ensure_container("a", None).await.unwrap();
    fixture.client.ensure_container("b", None).await.unwrap();
    let (container_a, dir_a) = fixture.resolve("a").await.unwrap();
    let (container_b, dir_b) = fixture.resolve("b").await.unwrap();
    fs::create::create(&fixture.ctx, &container_a, &dir_a, "f.txt").await.unwrap();

    let err = fs::rename::rename(&fixture.ctx, &container_a, &dir_a, "f.txt", &container_b, &dir_b, "f.txt")
        .await
        .unwrap_err();
    assert!(matches!(err, swiftfuse::SwiftFsError::NotSupported(_)));
}
