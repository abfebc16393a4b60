//! Relay to a Supabase-Storage-style object store.

use std::path::Path;
use tokio_util::io::ReaderStream;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object storage is not configured")]
    NotConfigured,
    #[error("failed to read spooled file: {0}")]
    Io(#[from] std::io::Error),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("storage rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Clone)]
pub struct ObjectStore {
    http: reqwest::Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl ObjectStore {
    pub fn new(http: reqwest::Client, base_url: &str, bucket: &str, service_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            service_key: service_key.to_string(),
        }
    }

    /// Public URL an object is served from once uploaded.
    pub fn public_url(&self, object: &str) -> String {
        format!(
            "{}/object/public/{}/{}",
            self.base_url,
            self.bucket,
            encode_object_path(object)
        )
    }

    /// Stream a local file into the bucket and return its public URL.
    pub async fn upload_file(
        &self,
        object: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<String, StorageError> {
        if self.base_url.is_empty() {
            return Err(StorageError::NotConfigured);
        }

        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let url = format!(
            "{}/object/{}/{}",
            self.base_url,
            self.bucket,
            encode_object_path(object)
        );
        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::CONTENT_LENGTH, len)
            .body(body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(self.public_url(object))
    }
}

/// Percent-encode each path segment, keeping the `/` separators.
fn encode_object_path(object: &str) -> String {
    object
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
