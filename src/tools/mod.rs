//! Tool registry and call dispatch.
//!
//! Tools are a static mapping built at process start. Dispatch validates
//! arguments against the tool's typed argument struct before any upstream
//! call is made; handlers share no cross-call state.

pub mod gallery;
pub mod interrupt;

use std::sync::Arc;

use serde_json::Value;

use crate::catapi::CatImageSource;
use crate::mcp::{CallToolResult, McpError, Tool};
use crate::widgets::CatWidget;

pub struct ToolRegistry {
    source: Arc<dyn CatImageSource>,
    gallery_widget: Arc<CatWidget>,
}

impl ToolRegistry {
    pub fn new(source: Arc<dyn CatImageSource>, gallery_widget: Arc<CatWidget>) -> Self {
        Self {
            source,
            gallery_widget,
        }
    }

    pub fn list(&self) -> Vec<Tool> {
        vec![
            gallery::descriptor(&self.gallery_widget),
            interrupt::descriptor(),
        ]
    }

    pub async fn call(&self, name: &str, arguments: Value) -> Result<CallToolResult, McpError> {
        // Clients may omit arguments entirely; treat that as an empty object.
        let arguments = if arguments.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            arguments
        };

        match name {
            gallery::NAME => {
                gallery::call(self.source.as_ref(), &self.gallery_widget, arguments).await
            }
            interrupt::NAME => interrupt::call(self.source.as_ref(), arguments).await,
            other => Err(McpError::ToolNotFound(other.to_string())),
        }
    }
}
