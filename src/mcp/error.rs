//! MCP error types with JSON-RPC error codes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::state::McpStateError;

/// Standard JSON-RPC 2.0 error codes
pub mod codes {
    /// Invalid JSON was received (parse error)
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid Request object
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist / is not available
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameter(s)
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Errors surfaced by the protocol layer.
///
/// Client mistakes (unknown method/tool/resource, bad params, handshake
/// violations) and server-side faults (upstream failures) map onto distinct
/// JSON-RPC codes via [`McpError::code`].
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error("Unsupported protocol version: {0}")]
    UnsupportedVersion(String),
    #[error(transparent)]
    State(#[from] McpStateError),
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error("Unknown tool: {0}")]
    ToolNotFound(String),
    #[error("Unknown resource: {0}")]
    ResourceNotFound(String),
    #[error("{0}")]
    Upstream(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl McpError {
    pub fn code(&self) -> i32 {
        match self {
            McpError::MethodNotFound(_) => codes::METHOD_NOT_FOUND,
            McpError::UnsupportedVersion(_) | McpError::State(_) => codes::INVALID_REQUEST,
            McpError::InvalidParams(_) | McpError::ToolNotFound(_) | McpError::ResourceNotFound(_) => {
                codes::INVALID_PARAMS
            }
            McpError::Upstream(_) | McpError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }
}

impl From<serde_json::Error> for McpError {
    fn from(e: serde_json::Error) -> Self {
        McpError::InvalidParams(e.to_string())
    }
}

/// Wire-format JSON-RPC error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<McpError> for JsonRpcError {
    fn from(e: McpError) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_the_taxonomy() {
        assert_eq!(McpError::MethodNotFound("x".into()).code(), codes::METHOD_NOT_FOUND);
        assert_eq!(McpError::ToolNotFound("x".into()).code(), codes::INVALID_PARAMS);
        assert_eq!(McpError::ResourceNotFound("x".into()).code(), codes::INVALID_PARAMS);
        assert_eq!(McpError::InvalidParams("x".into()).code(), codes::INVALID_PARAMS);
        assert_eq!(McpError::Upstream("x".into()).code(), codes::INTERNAL_ERROR);
    }

    #[test]
    fn converts_to_wire_error() {
        let wire: JsonRpcError = McpError::ToolNotFound("nope".into()).into();
        assert_eq!(wire.code, codes::INVALID_PARAMS);
        assert!(wire.message.contains("nope"));
        assert!(wire.data.is_none());
    }
}
