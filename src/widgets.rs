//! Widget descriptors for host-rendered HTML bundles.
//!
//! A widget is a pre-built HTML/JS snippet the host UI renders to display
//! structured tool output. The markup is produced by the separate widget
//! build pipeline and consumed here as a plain file.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use thiserror::Error;

pub const CAT_WIDGET_TEMPLATE_URI: &str = "ui://widget/cat-gallery.html";
pub const CAT_WIDGET_RELATIVE_PATH: &str = "widget/cat-gallery.html";
pub const WIDGET_MIME_TYPE: &str = "text/html+skybridge";

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("widget asset not found at {path}; build the widget bundle into the public directory first")]
    Missing { path: PathBuf },
    #[error("failed to read widget asset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Immutable widget descriptor, loaded once at process start.
#[derive(Debug, Clone)]
pub struct CatWidget {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub resource_description: &'static str,
    pub template_uri: &'static str,
    /// Status line the host shows while the tool call is running.
    pub invoking: &'static str,
    /// Status line shown once the call completed.
    pub invoked: &'static str,
    pub html: String,
}

impl CatWidget {
    /// The inline cat-gallery carousel.
    pub fn gallery(html: String) -> Self {
        Self {
            id: "cat-gallery",
            title: "Cat gallery widget",
            description: "React-based inline carousel for cat photos",
            resource_description: "React-based inline carousel for cat photos",
            template_uri: CAT_WIDGET_TEMPLATE_URI,
            invoking: "Collecting cats…",
            invoked: "Served the cat gallery",
            html,
        }
    }

    /// Load the gallery widget markup from the public directory.
    pub fn load_gallery(public_dir: &Path) -> Result<Self, WidgetError> {
        let path = public_dir.join(CAT_WIDGET_RELATIVE_PATH);
        let html = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                WidgetError::Missing { path: path.clone() }
            } else {
                WidgetError::Io { path: path.clone(), source }
            }
        })?;
        Ok(Self::gallery(html.trim().to_string()))
    }

    /// Display metadata the host uses to associate tool output with the
    /// widget template.
    pub fn meta(&self) -> Value {
        json!({
            "openai/outputTemplate": self.template_uri,
            "openai/resultCanProduceWidget": true,
            "openai/widgetAccessible": true,
            "openai/toolInvocation/invoking": self.invoking,
            "openai/toolInvocation/invoked": self.invoked,
        })
    }
}
