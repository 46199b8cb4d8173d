use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_PATH: &str = "sqlite:database.sqlite";
const DEFAULT_UPLOADS_DIR: &str = "uploads";
const DEFAULT_LAYOUT_PATH: &str = "templates/default.html";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// | Env Var            | Default                    |
/// |--------------------|----------------------------|
/// | `HOST`             | `0.0.0.0`                  |
/// | `PORT`             | `3000`                     |
/// | `DATABASE_URL`     | `sqlite:database.sqlite`   |
/// | `UPLOADS_DIR`      | `uploads`                  |
/// | `LAYOUT_PATH`      | `templates/default.html`   |
/// | `PUBLIC_URL`       | `http://localhost:{PORT}`  |
/// | `MAX_UPLOAD_BYTES` | `20971520`                 |
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: String,
    pub uploads_dir: PathBuf,
    pub layout_path: PathBuf,
    /// Base of the URLs handed out for uploaded images.
    pub public_url: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let port = var("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            host: var("HOST")
                .and_then(|h| h.parse().ok())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port,
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            uploads_dir: var("UPLOADS_DIR")
                .unwrap_or_else(|| DEFAULT_UPLOADS_DIR.to_string())
                .into(),
            layout_path: var("LAYOUT_PATH")
                .unwrap_or_else(|| DEFAULT_LAYOUT_PATH.to_string())
                .into(),
            public_url: var("PUBLIC_URL").unwrap_or_else(|| format!("http://localhost:{port}")),
            max_upload_bytes: var("MAX_UPLOAD_BYTES")
                .and_then(|n| n.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
