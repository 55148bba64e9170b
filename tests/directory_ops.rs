mod common;

use common::Fixture;
use swiftfuse::fs;
use swiftfuse::node::NodeKind;

#[tokio::test]
async fn mkdir_then_readdir_lists_it_from_root() {
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();

    fs::mk_dir::mkdir(&fixture.ctx, &container, &root, "vacation").await.unwrap();

    let children = fs::readdir::readdir(&fixture.ctx, &container, &root).await.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "vacation");
    assert!(matches!(children[0].kind(), NodeKind::Directory));
}

#[tokio::test]
async fn readdir_root_without_pinned_container_lists_containers_and_hides_segment_containers() {
    let fixture = Fixture::new().await;
    fixture.client.ensure_container("photos", None).await.unwrap();
    fixture.client.ensure_container("photos_segments", None).await.unwrap();
    fixture.client.ensure_container("docs", None).await.unwrap();

    let root = fixture.root();
    let children = fs::readdir::readdir(&fixture.ctx, "", &root).await.unwrap();

    let mut names: Vec<&str> = children.iter().map(|n| n.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["docs", "photos"]);
}

#[tokio::test]
async fn readdir_synthesizes_pseudo_directory_from_delimiter_scan() {
    // No explicit directory marker object, just a nested object path; the
    // delimiter scan must still surface "nested" as a directory entry.
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();
    fs::create::create(&fixture.ctx, &container, &root, "nested/leaf.txt").await.unwrap();

    let children = fs::readdir::readdir(&fixture.ctx, &container, &root).await.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "nested");
    assert!(matches!(children[0].kind(), NodeKind::Directory));
}

#[tokio::test]
async fn rmdir_rejects_non_empty_directory() {
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();
    let dir = fs::mk_dir::mkdir(&fixture.ctx, &container, &root, "vacation").await.unwrap();
    fs::create::create(&fixture.ctx, &container, &dir, "a.jpg").await.unwrap();

    let err = fs::rm_dir::rmdir(&fixture.ctx, &container, &root, "vacation").await.unwrap_err();
    assert!(matches!(err, swiftfuse::SwiftFsError::NotEmpty(_)));
}

#[tokio::test]
async fn rmdir_removes_empty_directory_and_its_cache_entries() {
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();
    fs::mk_dir::mkdir(&fixture.ctx, &container, &root, "empty").await.unwrap();

    fs::rm_dir::rmdir(&fixture.ctx, &container, &root, "empty").await.unwrap();

    let children = fs::readdir::readdir(&fixture.ctx, &container, &root).await.unwrap();
    assert!(children.is_empty());
}

#[tokio::test]
async fn second_lookup_within_ttl_is_served_from_cache() {
    // A second *lookup* within the TTL must be served entirely from the
    // Directory Cache: `lookup` only re-lists when the parent's own cache
    // entry is absent or expired (`DirectoryCache::peek`).
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();
    fs::create::create(&fixture.ctx, &container, &root, "a.txt").await.unwrap();

    // First lookup populates the cache via readdir.
    let found = fs::lookup::lookup(&fixture.ctx, &container, &root, "a.txt").await.unwrap();
    assert_eq!(found.name, "a.txt");

    // Delete the object directly in the backing store, bypassing the
    // cache: a second lookup within the TTL must still see the stale
    // entry, proving it never re-listed.
    fixture.client.delete_object(&container, "a.txt").await.unwrap();

    let found_again = fs::lookup::lookup(&fixture.ctx, &container, &root, "a.txt").await.unwrap();
    assert_eq!(found_again.name, "a.txt");
}

#[tokio::test]
async fn second_readdir_within_ttl_is_served_from_cache() {
    // Scenario 5 (spec §8): a second *readdir* within the TTL must be
    // served entirely from the Directory Cache, not just a second
    // `lookup` (which has its own, separate cache-peek contract).
    let fixture = Fixture::with_container("photos").await;
    let (container, root) = fixture.resolve("").await.unwrap();
    fs::create::create(&fixture.ctx, &container, &root, "a.txt").await.unwrap();

    let first = fs::readdir::readdir(&fixture.ctx, &container, &root).await.unwrap();
    assert_eq!(first.len(), 1);

    // Delete the object directly in the backing store, bypassing the
    // cache: a second readdir within the TTL must still see the stale
    // entry, proving it served the cached listing rather than re-listing.
    fixture.client.delete_object(&container, "a.txt").await.unwrap();

    let second = fs::readdir::readdir(&fixture.ctx, &container, &root).await.unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].name, "a.txt");
}

#[tokio::test]
async fn rmdir_still_deletes_the_marker_when_the_emptiness_check_is_skipped() {
    let fixture = Fixture::with_container_configured("photos", |args| {
        args.transfer_mode = Some(swiftfuse::config::transfer_mode::SKIP_RMDIR);
    })
    .await;
    let (container, root) = fixture.resolve("").await.unwrap();
    let dir = fs::mk_dir::mkdir(&fixture.ctx, &container, &root, "vacation").await.unwrap();
    fs::create::create(&fixture.ctx, &container, &dir, "a.jpg").await.unwrap();

    fs::rm_dir::rmdir(&fixture.ctx, &container, &root, "vacation").await.unwrap();

    assert!(fixture.client.head_object(&container, "vacation/").await.is_err());
}
