//! Static asset serving for the widget bundle.
//!
//! Only plain files under the configured public directory are served; any
//! path component that is not a normal name (`..`, a root, a drive prefix)
//! rejects the request before it touches the filesystem.

use std::path::{Component, Path, PathBuf};

/// Content types for the handful of extensions the widget bundle ships.
pub fn mime_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("map") | Some("json") => "application/json; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// Map a request path onto the public directory, refusing any traversal.
pub fn resolve(public_dir: &Path, request_path: &str) -> Option<PathBuf> {
    let trimmed = request_path.trim_start_matches('/');
    if trimmed.is_empty() {
        return None;
    }

    let relative = Path::new(trimmed);
    if !relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    {
        return None;
    }

    Some(public_dir.join(relative))
}

/// Read a resolved file, returning `None` when it does not exist or is not
/// a regular file.
pub async fn load(path: &Path) -> Option<Vec<u8>> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => {}
        _ => return None,
    }
    tokio::fs::read(path).await.ok()
}
