//! MCP (Model Context Protocol) layer
//!
//! Implements the subset of the MCP 2024-11-05 / 2025-03-26 specifications
//! this server needs: JSON-RPC 2.0 over an SSE session transport, with
//! tools and resources.
//!
//! ## Modules
//!
//! - [`state`] - Protocol state machine (Uninitialized → Initializing → Ready)
//! - [`error`] - MCP error types with JSON-RPC error codes
//! - [`types`] - Protocol types (requests, responses, capabilities)
//! - [`interface`] - Per-session [`McpInterface`] routing methods to handlers

pub mod error;
pub mod interface;
pub mod state;
pub mod types;

pub use error::{codes, JsonRpcError, McpError};
pub use interface::McpInterface;
pub use state::{McpState, McpStateError, McpStateMachine};
pub use types::*;
