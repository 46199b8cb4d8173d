use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;

/// Stored blob reference handed back to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub name: String,
    pub url: String,
}

/// Directory-backed store for uploaded images.
///
/// Blobs are written under `dir` and addressed as `{public_url}/uploads/{name}`.
#[derive(Debug, Clone)]
pub struct BlobStore {
    dir: PathBuf,
    public_url: String,
}

impl BlobStore {
    pub fn new(dir: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn put(&self, original_name: &str, bytes: &[u8]) -> std::io::Result<StoredBlob> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let name = generate_blob_name(original_name);
        tokio::fs::write(self.dir.join(&name), bytes).await?;

        Ok(StoredBlob {
            url: self.url_for(&name),
            name,
        })
    }

    /// Reads a blob back. `Ok(None)` when the name is unknown or could point
    /// outside the store.
    pub async fn get(&self, name: &str) -> std::io::Result<Option<Vec<u8>>> {
        if !is_plain_name(name) {
            return Ok(None);
        }
        match tokio::fs::read(self.dir.join(name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("{}/uploads/{}", self.public_url, urlencoding::encode(name))
    }
}

/// `<unix millis>-<random below 1e9>-<original file name>`
pub fn generate_blob_name(original_name: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        suffix,
        sanitize_file_name(original_name)
    )
}

// Keeps only the last path component of a client supplied name.
fn sanitize_file_name(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    match last {
        "" | "." | ".." => "upload".to_string(),
        other => other.to_string(),
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}

/// Content type for a served blob, from its extension.
pub fn content_type_for(name: &str) -> mime::Mime {
    let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => mime::IMAGE_PNG,
        Some("jpg" | "jpeg") => mime::IMAGE_JPEG,
        Some("gif") => mime::IMAGE_GIF,
        Some("bmp") => mime::IMAGE_BMP,
        Some("svg") => mime::IMAGE_SVG,
        Some("webp") => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        Some("ico") => "image/x-icon".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}
