//! Resource registry: URI-addressed widget markup.
//!
//! Resources are immutable after construction. Reads return the pre-loaded
//! HTML verbatim, annotated with the widget's display metadata.

use std::sync::Arc;

use crate::mcp::{
    McpError, Resource, ResourceContents, ResourceTemplate, ResourceTemplatesListResult,
    ResourcesListResult, ResourcesReadResult,
};
use crate::widgets::{CatWidget, WIDGET_MIME_TYPE};

pub struct ResourceRegistry {
    widgets: Vec<Arc<CatWidget>>,
}

impl ResourceRegistry {
    pub fn new(widgets: Vec<Arc<CatWidget>>) -> Self {
        Self { widgets }
    }

    pub fn list(&self) -> ResourcesListResult {
        let resources = self
            .widgets
            .iter()
            .map(|widget| Resource {
                uri: widget.template_uri.to_string(),
                name: widget.title.to_string(),
                description: widget.resource_description.to_string(),
                mime_type: WIDGET_MIME_TYPE.to_string(),
                meta: Some(widget.meta()),
            })
            .collect();
        ResourcesListResult { resources }
    }

    pub fn list_templates(&self) -> ResourceTemplatesListResult {
        let resource_templates = self
            .widgets
            .iter()
            .map(|widget| ResourceTemplate {
                uri_template: widget.template_uri.to_string(),
                name: widget.title.to_string(),
                description: widget.resource_description.to_string(),
                mime_type: WIDGET_MIME_TYPE.to_string(),
                meta: Some(widget.meta()),
            })
            .collect();
        ResourceTemplatesListResult { resource_templates }
    }

    pub fn read(&self, uri: &str) -> Result<ResourcesReadResult, McpError> {
        let widget = self
            .widgets
            .iter()
            .find(|widget| widget.template_uri == uri)
            .ok_or_else(|| McpError::ResourceNotFound(uri.to_string()))?;

        Ok(ResourcesReadResult {
            contents: vec![ResourceContents {
                uri: widget.template_uri.to_string(),
                mime_type: WIDGET_MIME_TYPE.to_string(),
                text: widget.html.clone(),
                meta: Some(widget.meta()),
            }],
        })
    }
}
