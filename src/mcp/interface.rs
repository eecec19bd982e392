//! Per-session MCP interface routing protocol methods to handlers.

use std::sync::Arc;

use serde_json::Value;

use super::{
    error::McpError,
    state::{McpState, McpStateMachine},
    types::{
        InitializeParams, InitializeResult, ResourcesCapability, ResourcesReadParams,
        ServerCapabilities, ServerInfo, ToolsCallParams, ToolsCapability, ToolsListResult,
        SUPPORTED_VERSIONS,
    },
};
use crate::resources::ResourceRegistry;
use crate::tools::ToolRegistry;

/// One protocol-server instance. Each SSE session gets its own, so the
/// handshake state of one client never leaks into another.
pub struct McpInterface {
    tools: Arc<ToolRegistry>,
    resources: Arc<ResourceRegistry>,
    state: McpStateMachine,
    server_info: ServerInfo,
}

impl McpInterface {
    pub fn new(tools: Arc<ToolRegistry>, resources: Arc<ResourceRegistry>) -> Self {
        Self {
            tools,
            resources,
            state: McpStateMachine::new(),
            server_info: ServerInfo {
                name: "neko-hub".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    pub fn state(&self) -> &McpStateMachine {
        &self.state
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Route an MCP request to the appropriate handler.
    pub async fn handle(&self, method: &str, params: Value) -> Result<Value, McpError> {
        tracing::debug!(method = %method, "Handling MCP request");

        match method {
            // Lifecycle
            "initialize" => self.handle_initialize(params).await,
            "notifications/initialized" => self.handle_initialized(params).await,

            // Utility
            "ping" => self.handle_ping(params).await,

            // Tools
            "tools/list" => self.handle_tools_list(params).await,
            "tools/call" => self.handle_tools_call(params).await,

            // Resources
            "resources/list" => self.handle_resources_list(params).await,
            "resources/templates/list" => self.handle_resource_templates_list(params).await,
            "resources/read" => self.handle_resources_read(params).await,

            // Notifications
            "notifications/cancelled" => self.handle_cancelled(params).await,

            // Unknown method
            _ => Err(McpError::MethodNotFound(method.to_string())),
        }
    }

    // === Lifecycle Handlers ===

    async fn handle_initialize(&self, params: Value) -> Result<Value, McpError> {
        self.state.require(McpState::Uninitialized)?;

        let params: InitializeParams = serde_json::from_value(params)?;

        if !SUPPORTED_VERSIONS.contains(&params.protocol_version.as_str()) {
            return Err(McpError::UnsupportedVersion(params.protocol_version));
        }

        tracing::info!(
            client = %params.client_info.name,
            client_version = %params.client_info.version,
            protocol_version = %params.protocol_version,
            "MCP initialize request"
        );

        self.state.transition(McpState::Initializing)?;

        let result = InitializeResult {
            protocol_version: params.protocol_version,
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
                resources: Some(ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                }),
            },
            server_info: self.server_info.clone(),
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Completes the handshake; after this the session accepts all methods.
    async fn handle_initialized(&self, _params: Value) -> Result<Value, McpError> {
        self.state.require(McpState::Initializing)?;
        self.state.transition(McpState::Ready)?;

        tracing::debug!("MCP session initialized, now accepting requests");

        // Notifications don't return a result
        Ok(Value::Null)
    }

    // === Utility Handlers ===

    async fn handle_ping(&self, _params: Value) -> Result<Value, McpError> {
        self.state.require_ready()?;
        Ok(serde_json::json!({}))
    }

    // === Tool Handlers ===

    async fn handle_tools_list(&self, _params: Value) -> Result<Value, McpError> {
        self.state.require_ready()?;

        let result = ToolsListResult {
            tools: self.tools.list(),
            next_cursor: None,
        };

        Ok(serde_json::to_value(result)?)
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, McpError> {
        self.state.require_ready()?;

        let params: ToolsCallParams = serde_json::from_value(params)?;
        let result = self.tools.call(&params.name, params.arguments).await?;

        Ok(serde_json::to_value(result)?)
    }

    // === Resource Handlers ===

    async fn handle_resources_list(&self, _params: Value) -> Result<Value, McpError> {
        self.state.require_ready()?;
        Ok(serde_json::to_value(self.resources.list())?)
    }

    async fn handle_resource_templates_list(&self, _params: Value) -> Result<Value, McpError> {
        self.state.require_ready()?;
        Ok(serde_json::to_value(self.resources.list_templates())?)
    }

    async fn handle_resources_read(&self, params: Value) -> Result<Value, McpError> {
        self.state.require_ready()?;

        let params: ResourcesReadParams = serde_json::from_value(params)?;
        Ok(serde_json::to_value(self.resources.read(&params.uri)?)?)
    }

    // === Notification Handlers ===

    /// Tool calls are independent and stateless, so there is nothing
    /// in-flight to cancel; the notification is acknowledged and dropped.
    async fn handle_cancelled(&self, _params: Value) -> Result<Value, McpError> {
        tracing::debug!("Ignoring cancellation notification");
        Ok(Value::Null)
    }
}
