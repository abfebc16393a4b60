#![allow(dead_code)]

pub mod ws_helpers;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use putry_server::{config::Config, db, routes, AppState};
use serde_json::{json, Value};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TEST_APP_SECRET: &str = "test-app-secret";
pub const TEST_STORAGE_KEY: &str = "test-service-key";

/// Create an in-memory SQLite pool with schema applied.
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(db::connect_options("sqlite::memory:").unwrap())
        .await
        .expect("Failed to create in-memory SQLite pool");

    db::apply_schema(&pool).await.unwrap();
    pool
}

/// Start an axum app on a random local port and return its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", addr.port())
}

// ── Fake identity provider ──

#[derive(Clone, Default)]
struct ProviderState {
    users: Arc<Mutex<HashMap<String, Value>>>,
    calls: Arc<AtomicUsize>,
}

/// Stand-in for the identity provider's verify endpoint. Tokens resolve to
/// whatever user JSON was registered for them; anything else is rejected.
#[derive(Clone)]
pub struct FakeProvider {
    pub verify_url: String,
    state: ProviderState,
}

impl FakeProvider {
    pub async fn start() -> Self {
        let state = ProviderState::default();
        let app = Router::new()
            .route("/api/v1/verify", post(fake_verify))
            .with_state(state.clone());
        let base = serve(app).await;

        Self {
            verify_url: format!("{}/api/v1/verify", base),
            state,
        }
    }

    pub fn register(&self, token: &str, user: Value) {
        self.state
            .users
            .lock()
            .unwrap()
            .insert(token.to_string(), user);
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }
}

async fn fake_verify(
    State(state): State<ProviderState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.calls.fetch_add(1, Ordering::SeqCst);

    let expected = format!("Bearer {}", TEST_APP_SECRET);
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad app secret"})));
    }

    let token = body["token"].as_str().unwrap_or_default();
    let user = state.users.lock().unwrap().get(token).cloned();
    match user {
        Some(user) => (StatusCode::OK, Json(json!({ "user": user }))),
        None => (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid token"}))),
    }
}

/// Provider payload for an email account linked to Google.
pub fn provider_user(provider_id: &str, email: &str, google_name: &str) -> Value {
    json!({
        "id": provider_id,
        "email": { "address": email },
        "google": { "name": google_name, "picture": format!("https://img.test/{}.png", google_name) },
    })
}

// ── Fake object storage ──

#[derive(Clone, Default)]
struct StorageState {
    fail: Arc<AtomicBool>,
    objects: Arc<Mutex<Vec<StoredObject>>>,
}

#[derive(Clone, Debug)]
pub struct StoredObject {
    pub bucket: String,
    pub path: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Clone)]
pub struct FakeStorage {
    pub url: String,
    state: StorageState,
}

impl FakeStorage {
    pub async fn start() -> Self {
        let state = StorageState::default();
        let app = Router::new()
            .route("/object/{bucket}/{*path}", post(fake_store))
            .with_state(state.clone());
        let url = serve(app).await;
        Self { url, state }
    }

    pub fn fail_uploads(&self) {
        self.state.fail.store(true, Ordering::SeqCst);
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.state.objects.lock().unwrap().clone()
    }
}

async fn fake_store(
    State(state): State<StorageState>,
    Path((bucket, path)): Path<(String, String)>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> (StatusCode, Json<Value>) {
    if state.fail.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "disk full"})));
    }

    let expected = format!("Bearer {}", TEST_STORAGE_KEY);
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
    }

    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    state.objects.lock().unwrap().push(StoredObject {
        bucket: bucket.clone(),
        path: path.clone(),
        content_type,
        size: body.len(),
    });

    (StatusCode::OK, Json(json!({ "Key": format!("{}/{}", bucket, path) })))
}

// ── App wiring ──

pub fn test_config(verify_url: &str, storage_url: &str, upload_dir: &str) -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        database_path: ":memory:".into(),
        identity_verify_url: verify_url.into(),
        identity_app_secret: TEST_APP_SECRET.into(),
        storage_url: storage_url.into(),
        storage_bucket: "avatars".into(),
        storage_service_key: TEST_STORAGE_KEY.into(),
        upload_dir: upload_dir.into(),
        max_upload_bytes: 1_048_576,
    }
}

/// A fresh, empty upload directory unique to one test.
pub fn temp_upload_dir() -> String {
    let dir = std::env::temp_dir().join(format!("putry-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.to_string_lossy().into_owned()
}

pub fn create_test_state(pool: SqlitePool, provider: &FakeProvider) -> Arc<AppState> {
    Arc::new(AppState::new(
        pool,
        test_config(&provider.verify_url, "", &temp_upload_dir()),
    ))
}

/// Build a test Axum app with the given state.
pub fn create_test_app(state: Arc<AppState>) -> Router {
    routes::build_router(state)
}

/// Create a user with the given role and register a provider token for them.
/// Returns (user_id, bearer_token).
pub async fn create_test_user(
    pool: &SqlitePool,
    provider: &FakeProvider,
    email: &str,
    name: &str,
    role: &str,
) -> (i64, String) {
    let provider_id = format!("did:privy:{}", uuid::Uuid::new_v4());
    let now = db::now();

    let user_id = sqlx::query_scalar::<_, i64>(
        r#"INSERT INTO users (email, privy_id, name, username, role, badge, banned, created_at)
           VALUES (?, ?, ?, ?, ?, 0, 0, ?)
           RETURNING id"#,
    )
    .bind(email)
    .bind(&provider_id)
    .bind(name)
    .bind(name)
    .bind(role)
    .bind(&now)
    .fetch_one(pool)
    .await
    .unwrap();

    let token = uuid::Uuid::new_v4().to_string();
    provider.register(&token, provider_user(&provider_id, email, name));

    (user_id, token)
}

/// Insert a post directly with an explicit timestamp and counters.
pub async fn insert_post(
    pool: &SqlitePool,
    author_id: i64,
    body: &str,
    channel_id: Option<i64>,
    likes: i64,
    reposts: i64,
    created_at: &str,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        r#"INSERT INTO posts (author_id, body, channel_id, likes, reposts, created_at)
           VALUES (?, ?, ?, ?, ?, ?)
           RETURNING id"#,
    )
    .bind(author_id)
    .bind(body)
    .bind(channel_id)
    .bind(likes)
    .bind(reposts)
    .bind(created_at)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_channel(pool: &SqlitePool, label: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO channels (label, created_at) VALUES (?, ?) RETURNING id",
    )
    .bind(label)
    .bind(db::now())
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_message(pool: &SqlitePool, from: i64, to: i64, body: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        r#"INSERT INTO messages (sender_id, receiver_id, body, created_at)
           VALUES (?, ?, ?, ?)
           RETURNING id"#,
    )
    .bind(from)
    .bind(to)
    .bind(body)
    .bind(db::now())
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Timestamp `hours` in the past, in the stored format.
pub fn hours_ago(hours: i64) -> String {
    db::timestamp(chrono::Utc::now() - chrono::Duration::hours(hours))
}

pub fn auth_header(token: &str) -> (axum::http::HeaderName, axum::http::HeaderValue) {
    (
        axum::http::HeaderName::from_static("authorization"),
        format!("Bearer {}", token).parse().unwrap(),
    )
}

pub async fn ban_user(pool: &SqlitePool, user_id: i64) {
    sqlx::query("UPDATE users SET banned = 1 WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}
