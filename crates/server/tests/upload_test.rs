mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use common::{auth_header, FakeProvider, FakeStorage};
use serde_json::Value;
use std::sync::Arc;

struct Harness {
    server: TestServer,
    pool: sqlx::SqlitePool,
    provider: FakeProvider,
    storage: FakeStorage,
    upload_dir: String,
}

async fn setup() -> Harness {
    let pool = common::setup_test_db().await;
    let provider = FakeProvider::start().await;
    let storage = FakeStorage::start().await;
    let upload_dir = common::temp_upload_dir();

    let config = common::test_config(&provider.verify_url, &storage.url, &upload_dir);
    let state = Arc::new(putry_server::AppState::new(pool.clone(), config));
    let server = TestServer::new(common::create_test_app(state)).unwrap();

    Harness {
        server,
        pool,
        provider,
        storage,
        upload_dir,
    }
}

fn png_form(field: &str, bytes: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(
        field,
        Part::bytes(bytes).file_name("me.PNG").mime_type("image/png"),
    )
}

fn spooled_files(dir: &str) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn upload_avatar_relays_to_storage() {
    let h = setup().await;

    let (user_id, token) =
        common::create_test_user(&h.pool, &h.provider, "alice@test.com", "alice", "member").await;

    let (k, v) = auth_header(&token);
    let res = h
        .server
        .post("/upload-avatar")
        .add_header(k, v)
        .multipart(png_form("avatar", vec![0x89, b'P', b'N', b'G', 1, 2, 3]))
        .await;

    res.assert_status_ok();
    let body: Value = res.json();
    let url = body["url"].as_str().unwrap();
    let prefix = format!("{}/object/public/avatars/avatars/{}-", h.storage.url, user_id);
    assert!(url.starts_with(&prefix), "unexpected url {}", url);
    assert!(url.ends_with(".png"));

    let objects = h.storage.objects();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].bucket, "avatars");
    assert!(objects[0].path.starts_with(&format!("avatars/{}-", user_id)));
    assert_eq!(objects[0].content_type, "image/png");
    assert_eq!(objects[0].size, 7);

    assert_eq!(spooled_files(&h.upload_dir), 0);
}

#[tokio::test]
async fn storage_failure_returns_500_and_cleans_up() {
    let h = setup().await;
    h.storage.fail_uploads();

    let (_, token) =
        common::create_test_user(&h.pool, &h.provider, "alice@test.com", "alice", "member").await;

    let (k, v) = auth_header(&token);
    let res = h
        .server
        .post("/upload-avatar")
        .add_header(k, v)
        .multipart(png_form("avatar", vec![1, 2, 3, 4]))
        .await;

    res.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json();
    assert_eq!(body["error"], "Upload failed");
    assert_eq!(spooled_files(&h.upload_dir), 0);
}

#[tokio::test]
async fn upload_without_avatar_field_returns_400() {
    let h = setup().await;

    let (_, token) =
        common::create_test_user(&h.pool, &h.provider, "alice@test.com", "alice", "member").await;

    let (k, v) = auth_header(&token);
    let res = h
        .server
        .post("/upload-avatar")
        .add_header(k, v)
        .multipart(png_form("picture", vec![1, 2, 3]))
        .await;

    res.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = res.json();
    assert_eq!(body["error"], "No file");
    assert!(h.storage.objects().is_empty());
}

#[tokio::test]
async fn upload_rejects_non_image() {
    let h = setup().await;

    let (_, token) =
        common::create_test_user(&h.pool, &h.provider, "alice@test.com", "alice", "member").await;

    let form = MultipartForm::new().add_part(
        "avatar",
        Part::bytes(b"#!/bin/sh".to_vec())
            .file_name("evil.sh")
            .mime_type("text/x-shellscript"),
    );

    let (k, v) = auth_header(&token);
    let res = h
        .server
        .post("/upload-avatar")
        .add_header(k, v)
        .multipart(form)
        .await;

    res.assert_status(StatusCode::BAD_REQUEST);
    assert!(h.storage.objects().is_empty());
}

#[tokio::test]
async fn upload_too_large_returns_413() {
    let h = setup().await;

    let (_, token) =
        common::create_test_user(&h.pool, &h.provider, "alice@test.com", "alice", "member").await;

    // 1 MiB limit in the test config
    let big = vec![0u8; 1_048_576 + 1024];

    let (k, v) = auth_header(&token);
    let res = h
        .server
        .post("/upload-avatar")
        .add_header(k, v)
        .multipart(png_form("avatar", big))
        .await;

    res.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert!(h.storage.objects().is_empty());
    assert_eq!(spooled_files(&h.upload_dir), 0);
}

#[tokio::test]
async fn upload_requires_auth() {
    let h = setup().await;

    let res = h
        .server
        .post("/upload-avatar")
        .multipart(png_form("avatar", vec![1, 2, 3]))
        .await;

    res.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unconfigured_storage_returns_500() {
    let pool = common::setup_test_db().await;
    let provider = FakeProvider::start().await;
    let state = common::create_test_state(pool.clone(), &provider);
    let upload_dir = state.config.upload_dir.clone();
    let server = TestServer::new(common::create_test_app(state)).unwrap();

    let (_, token) =
        common::create_test_user(&pool, &provider, "alice@test.com", "alice", "member").await;

    let (k, v) = auth_header(&token);
    let res = server
        .post("/upload-avatar")
        .add_header(k, v)
        .multipart(png_form("avatar", vec![1, 2, 3]))
        .await;

    res.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(spooled_files(&upload_dir), 0);
}

#[tokio::test]
async fn banned_user_cannot_upload() {
    let h = setup().await;

    let (user_id, token) =
        common::create_test_user(&h.pool, &h.provider, "alice@test.com", "alice", "member").await;
    common::ban_user(&h.pool, user_id).await;

    let (k, v) = auth_header(&token);
    let res = h
        .server
        .post("/upload-avatar")
        .add_header(k, v)
        .multipart(png_form("avatar", vec![1, 2, 3]))
        .await;

    res.assert_status(StatusCode::FORBIDDEN);
    let body: Value = res.json();
    assert_eq!(body["error"], "Account is banned");
    assert!(h.storage.objects().is_empty());
    assert_eq!(spooled_files(&h.upload_dir), 0);
}
