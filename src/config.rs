//! Environment-driven server configuration.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Runtime settings sourced from the environment, with CLI overrides
/// applied afterwards by the binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub public_dir: PathBuf,
    pub cat_api_key: Option<String>,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    ///
    /// `PORT` falls back to 8000 when unset or unparseable.
    /// `CAT_API_KEY` takes precedence over the legacy `VITE_CAT_API_KEY`;
    /// empty values count as unset.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let public_dir = env::var("NEKO_PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PUBLIC_DIR));

        let cat_api_key = env::var("CAT_API_KEY")
            .ok()
            .or_else(|| env::var("VITE_CAT_API_KEY").ok())
            .filter(|key| !key.trim().is_empty());

        Self {
            port,
            public_dir,
            cat_api_key,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            cat_api_key: None,
        }
    }
}
