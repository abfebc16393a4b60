pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod storage;
pub mod ws;

use config::Config;
use identity::IdentityClient;
use std::sync::Arc;
use storage::ObjectStore;

pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: Config,
    pub identity: IdentityClient,
    pub storage: ObjectStore,
    pub sessions: Arc<ws::gateway::SessionRegistry>,
}

impl AppState {
    pub fn new(db: sqlx::SqlitePool, config: Config) -> Self {
        let http = reqwest::Client::new();
        let identity = IdentityClient::new(
            http.clone(),
            config.identity_verify_url.clone(),
            config.identity_app_secret.clone(),
        );
        let storage = ObjectStore::new(
            http,
            &config.storage_url,
            &config.storage_bucket,
            &config.storage_service_key,
        );

        Self {
            db,
            config,
            identity,
            storage,
            sessions: Arc::new(ws::gateway::SessionRegistry::new()),
        }
    }
}
