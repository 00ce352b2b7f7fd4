use duplex_core::*;

#[tokio::test]
async fn test_load_manifest_resolves_relative_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pairs.csv");
    tokio::fs::write(
        &path,
        "front,back,front_mirror,back_mirror\n\
         cover.png,cover_back.png,,none\n\
         page1.png,,v,\n",
    )
    .await
    .unwrap();

    let collection = load_manifest(&path).await.unwrap();
    assert_eq!(collection.len(), 2);
    assert_eq!(
        collection.get(0).unwrap().front,
        Some(ImageRef::path(dir.path().join("cover.png")))
    );
    assert_eq!(collection.get(1).unwrap().back, None);
    assert_eq!(collection.mirror(1, Side::Front), MirrorMode::Vertical);

    // The pinned `none` suppresses the automatic back mirror
    let stats = calculate_statistics(&collection, &LayoutSettings::default());
    assert_eq!(stats.auto_mirrored_backs, 0);
    assert_eq!(stats.blank_backs, 1);
    assert_eq!(stats.explicit_mirrors, 2);
}

#[tokio::test]
async fn test_load_manifest_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_manifest(dir.path().join("absent.csv")).await;
    assert!(matches!(result, Err(DuplexError::Io(_))));
}

#[test]
fn test_manifest_skips_rows_without_images() {
    let collection = parse_manifest("front,back\n,\na.png,b.png\n", None).unwrap();
    assert_eq!(collection.len(), 1);
}

#[test]
fn test_manifest_blank_front_is_kept() {
    let collection = parse_manifest("front,back\n,b.png\n", None).unwrap();
    assert_eq!(collection.get(0).unwrap().front, None);
    assert_eq!(collection.get(0).unwrap().back, Some(ImageRef::from("b.png")));
}
