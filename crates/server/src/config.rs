use std::env;

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub identity_verify_url: String,
    pub identity_app_secret: String,
    pub storage_url: String,
    pub storage_bucket: String,
    pub storage_service_key: String,
    pub upload_dir: String,
    pub max_upload_bytes: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./putry.db".into()),
            identity_verify_url: env::var("IDENTITY_VERIFY_URL")
                .unwrap_or_else(|_| "https://auth.privy.io/api/v1/verify".into()),
            identity_app_secret: env::var("IDENTITY_APP_SECRET")
                .expect("IDENTITY_APP_SECRET must be set"),
            storage_url: env::var("STORAGE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            storage_bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "avatars".into()),
            storage_service_key: env::var("STORAGE_SERVICE_KEY").unwrap_or_default(),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| {
                env::temp_dir()
                    .join("putry-uploads")
                    .to_string_lossy()
                    .into_owned()
            }),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5_242_880), // 5MB
        }
    }
}
