//! Upload flows as the history handlers drive them

use bytes::Bytes;
use waypost_store::{
    ContentStore, Encoding, StorageRoot, StoreError, UploadBatch, WriteOptions, BUCKET_IMAGES,
    BUCKET_TMP,
};

#[tokio::test]
async fn test_failed_transaction_removes_staged_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = StorageRoot::new(dir.path());
    let staging = root.bucket(BUCKET_TMP).await.unwrap();

    let name = ContentStore::gen_filename();
    staging
        .write(&name, b"jpeg bytes".as_slice(), WriteOptions::default())
        .await
        .unwrap();
    assert!(staging.stat(&name).await.is_ok());

    // the database insert fails here; compensate
    let simulated: Result<(), &str> = Err("insert failed");
    if simulated.is_err() {
        let _ = staging.unlink(&name).await;
    }

    let err = staging.stat(&name).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_stage_promote_commit() {
    let dir = tempfile::tempdir().unwrap();
    let root = StorageRoot::new(dir.path());
    let scope = root.scope().await.unwrap();

    let mut upload = UploadBatch::new(scope.clone());
    let staged = upload
        .stage(BUCKET_TMP, Bytes::from_static(b"{\"ok\":true}"), Some("draft.json"))
        .await
        .unwrap();
    upload.commit();

    let mut promotion = UploadBatch::new(scope.clone());
    let src = promotion.promote(&staged.src(), BUCKET_IMAGES).await.unwrap();
    promotion.commit();

    let images = root.bucket(BUCKET_IMAGES).await.unwrap();
    let read = images.read(&staged.name, Encoding::Utf8).await.unwrap();
    assert_eq!(read.as_text(), Some("{\"ok\":true}"));
    assert!(scope.exists(&src).await);
    assert!(!scope.exists(&staged.src()).await);
}

#[tokio::test]
async fn test_partial_promotion_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let root = StorageRoot::new(dir.path());
    let scope = root.scope().await.unwrap();

    let mut upload = UploadBatch::new(scope.clone());
    let first = upload.stage(BUCKET_TMP, Bytes::from_static(b"1"), None).await.unwrap();
    upload.commit();

    let mut promotion = UploadBatch::new(scope.clone());
    promotion.promote(&first.src(), BUCKET_IMAGES).await.unwrap();
    let missing = promotion.promote("/tmp/0000", BUCKET_IMAGES).await;
    assert!(missing.is_err());

    let failures = promotion.rollback().await;
    assert!(failures.is_empty());
    assert!(scope.exists(&first.src()).await);
    assert!(!scope.exists(&format!("/images/{}", first.name)).await);
}
